use anyhow::Result;
use async_trait::async_trait;
use log::{error, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::access::can_administer;
use crate::entity::{AccountStatus, Identity, IdentityPatch, Role};
use crate::interactor::customer_interactor::{CustomerForm, CustomerInteractor};
use crate::modal::{Dialog, DialogSlot, Severity};
use crate::utils::contains_ignore_case;
use crate::view::customers_view::CustomersView;

pub const ADMIN_REQUIRED: &str = "Administrator access required.";
const MUTATION_FAILED: &str = "The operation could not be completed. Please try again.";

/// Mutation waiting for the administrator's confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerAction {
    Delete(Uuid),
    SetRole(Uuid, Role),
    SetStatus(Uuid, AccountStatus),
}

#[async_trait]
pub trait CustomersPresenter: Send + Sync {
    async fn mount(&mut self) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;
    async fn search(&mut self, text: &str) -> Result<()>;
    async fn clear_filters(&mut self) -> Result<()>;
    async fn edit(&mut self, target: &str) -> Result<()>;
    async fn set_field(&mut self, field: &str, value: &str) -> Result<()>;
    async fn save(&mut self) -> Result<()>;
    async fn request_delete(&mut self, target: &str) -> Result<()>;
    async fn request_role_toggle(&mut self, target: &str) -> Result<()>;
    async fn request_block_toggle(&mut self, target: &str) -> Result<()>;
    /// Runs the pending action of the open dialog, or closes an alert.
    async fn confirm(&mut self) -> Result<()>;
    /// Closes the open dialog, or the editor when no dialog is open.
    async fn cancel(&mut self) -> Result<()>;
    fn customers(&self) -> &[Identity];
    fn visible(&self) -> Vec<&Identity>;
    fn dialog(&self) -> Option<&Dialog<CustomerAction>>;
    fn editor(&self) -> Option<&CustomerForm>;
}

pub struct CustomersPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    viewer: Identity,
    customers: Vec<Identity>,
    search: String,
    dialog: DialogSlot<CustomerAction>,
    editor: Option<(Uuid, CustomerForm)>,
}

impl<I, V> CustomersPresenterImpl<I, V>
where
    I: CustomerInteractor,
    V: CustomersView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, viewer: Identity) -> Self {
        Self {
            interactor,
            view,
            viewer,
            customers: Vec::new(),
            search: String::new(),
            dialog: DialogSlot::default(),
            editor: None,
        }
    }

    fn allowed(&self) -> bool {
        can_administer(Some(&self.viewer))
    }

    fn filtered(&self) -> Vec<&Identity> {
        self.customers
            .iter()
            .filter(|c| {
                self.search.is_empty()
                    || contains_ignore_case(c.full_name.as_deref(), &self.search)
                    || contains_ignore_case(c.email.as_deref(), &self.search)
            })
            .collect()
    }

    /// Row number in the current listing, email or id.
    fn resolve(&self, target: &str) -> Option<Identity> {
        let target = target.trim();
        if let Ok(row) = target.parse::<usize>() {
            return row
                .checked_sub(1)
                .and_then(|index| self.filtered().get(index).map(|c| (*c).clone()));
        }
        self.customers
            .iter()
            .find(|c| {
                c.id.to_string() == target
                    || c.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(target))
            })
            .cloned()
    }

    fn display_name(customer: &Identity) -> String {
        customer
            .full_name
            .clone()
            .or_else(|| customer.email.clone())
            .unwrap_or_else(|| customer.id.to_string())
    }

    fn patch_local(&mut self, id: Uuid, patch: &IdentityPatch) {
        if let Some(customer) = self.customers.iter_mut().find(|c| c.id == id) {
            customer.apply(patch);
        }
    }

    async fn render(&self) -> Result<()> {
        let rows = self.filtered();
        self.view
            .display_customers(&rows, self.customers.len(), &self.search)
            .await
    }

    async fn open_dialog(&mut self, dialog: Dialog<CustomerAction>) -> Result<()> {
        self.dialog.open(dialog);
        match self.dialog.current() {
            Some(dialog) => self.view.display_dialog(dialog).await,
            None => Ok(()),
        }
    }

    async fn alert(&mut self, title: &str, message: String, severity: Severity) -> Result<()> {
        self.open_dialog(Dialog::alert(title, message, severity)).await
    }

    async fn guarded_target(&mut self, target: &str) -> Result<Option<Identity>> {
        if !self.allowed() {
            warn!("{} attempted a customer mutation without rights", self.viewer.id);
            self.view.display_error(ADMIN_REQUIRED.to_string()).await?;
            return Ok(None);
        }
        match self.resolve(target) {
            Some(customer) => Ok(Some(customer)),
            None => {
                self.view
                    .display_error(format!("No customer matches '{}'.", target.trim()))
                    .await?;
                Ok(None)
            }
        }
    }

    async fn run(&mut self, action: CustomerAction) -> Result<()> {
        let result = match action {
            CustomerAction::Delete(id) => self.interactor.delete_customer(id).await,
            CustomerAction::SetRole(id, role) => self.interactor.set_role(id, role).await,
            CustomerAction::SetStatus(id, status) => self.interactor.set_status(id, status).await,
        };

        if let Err(e) = result {
            error!("Customer mutation {:?} failed: {:#}", action, e);
            return self
                .alert("Operation failed", MUTATION_FAILED.to_string(), Severity::Danger)
                .await;
        }

        let (title, message) = match action {
            CustomerAction::Delete(id) => {
                self.customers.retain(|c| c.id != id);
                ("Customer deleted", "The customer profile was removed.".to_string())
            }
            CustomerAction::SetRole(id, role) => {
                self.patch_local(id, &IdentityPatch::role(role));
                ("Role updated", format!("The user is now {}.", role.label()))
            }
            CustomerAction::SetStatus(id, status) => {
                self.patch_local(id, &IdentityPatch::status(status));
                match status {
                    AccountStatus::Blocked => (
                        "User blocked",
                        "The user can no longer access the platform.".to_string(),
                    ),
                    AccountStatus::Active => (
                        "User unblocked",
                        "The user can access the platform again.".to_string(),
                    ),
                }
            }
        };

        self.render().await?;
        self.alert(title, message, Severity::Success).await
    }
}

#[async_trait]
impl<I, V> CustomersPresenter for CustomersPresenterImpl<I, V>
where
    I: CustomerInteractor + Send + Sync,
    V: CustomersView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        if !self.allowed() {
            warn!("{} tried to open the customer list", self.viewer.id);
            return self.view.display_error(ADMIN_REQUIRED.to_string()).await;
        }
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<()> {
        if !self.allowed() {
            return self.view.display_error(ADMIN_REQUIRED.to_string()).await;
        }
        self.view.display_loading().await?;
        match self.interactor.list_customers().await {
            Ok(customers) => {
                self.customers = customers;
                self.render().await
            }
            Err(e) => {
                error!("Failed to load customers: {:#}", e);
                self.view
                    .display_error("Could not load customers. Type `refresh` to try again.".to_string())
                    .await
            }
        }
    }

    async fn search(&mut self, text: &str) -> Result<()> {
        self.search = text.trim().to_string();
        self.render().await
    }

    async fn clear_filters(&mut self) -> Result<()> {
        self.search.clear();
        self.render().await
    }

    async fn edit(&mut self, target: &str) -> Result<()> {
        let Some(customer) = self.guarded_target(target).await? else {
            return Ok(());
        };
        let form = CustomerForm::from_identity(&customer);
        self.view.display_editor(&form).await?;
        self.editor = Some((customer.id, form));
        Ok(())
    }

    async fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        let Some((_, form)) = self.editor.as_mut() else {
            return self
                .view
                .display_error("No customer is being edited. Use `edit <row>` first.".to_string())
                .await;
        };
        let value = value.trim().to_string();
        match field.to_lowercase().as_str() {
            "name" | "full_name" => form.full_name = value,
            "email" => form.email = value,
            "whatsapp" => form.whatsapp = value,
            "telegram" => form.telegram = value,
            other => {
                return self
                    .view
                    .display_error(format!(
                        "Unknown field '{}'. Fields: name, email, whatsapp, telegram.",
                        other
                    ))
                    .await
            }
        }
        let form = form.clone();
        self.view.display_editor(&form).await
    }

    async fn save(&mut self) -> Result<()> {
        let Some((id, form)) = self.editor.clone() else {
            return self
                .view
                .display_error("Nothing to save.".to_string())
                .await;
        };
        if !self.allowed() {
            return self.view.display_error(ADMIN_REQUIRED.to_string()).await;
        }

        match self.interactor.update_customer(id, &form).await {
            Ok(patch) => {
                self.patch_local(id, &patch);
                self.editor = None;
                self.render().await?;
                self.alert(
                    "Customer updated",
                    "The customer details were saved.".to_string(),
                    Severity::Success,
                )
                .await
            }
            Err(e) => {
                error!("Failed to save customer {}: {:#}", id, e);
                self.alert("Operation failed", MUTATION_FAILED.to_string(), Severity::Danger)
                    .await
            }
        }
    }

    async fn request_delete(&mut self, target: &str) -> Result<()> {
        let Some(customer) = self.guarded_target(target).await? else {
            return Ok(());
        };
        self.open_dialog(Dialog::confirm(
            "Delete customer",
            format!(
                "Delete {}? The profile is removed permanently.",
                Self::display_name(&customer)
            ),
            Severity::Danger,
            CustomerAction::Delete(customer.id),
        ))
        .await
    }

    async fn request_role_toggle(&mut self, target: &str) -> Result<()> {
        let Some(customer) = self.guarded_target(target).await? else {
            return Ok(());
        };
        let role = customer.role.toggled();
        self.open_dialog(Dialog::confirm(
            "Change access level",
            format!(
                "Make {} {}? The user must sign in again.",
                Self::display_name(&customer),
                role.label()
            ),
            Severity::Warning,
            CustomerAction::SetRole(customer.id, role),
        ))
        .await
    }

    async fn request_block_toggle(&mut self, target: &str) -> Result<()> {
        let Some(customer) = self.guarded_target(target).await? else {
            return Ok(());
        };
        let status = customer.status.toggled();
        let name = Self::display_name(&customer);
        let dialog = match status {
            AccountStatus::Blocked => Dialog::confirm(
                "Block user",
                format!("{} will lose access to the platform immediately.", name),
                Severity::Danger,
                CustomerAction::SetStatus(customer.id, status),
            ),
            AccountStatus::Active => Dialog::confirm(
                "Unblock user",
                format!("{} will be able to access the platform again.", name),
                Severity::Success,
                CustomerAction::SetStatus(customer.id, status),
            ),
        };
        self.open_dialog(dialog).await
    }

    async fn confirm(&mut self) -> Result<()> {
        if !self.dialog.is_open() {
            return self
                .view
                .display_error("There is nothing to confirm.".to_string())
                .await;
        }
        match self.dialog.confirm() {
            Some(action) => self.run(action).await,
            None => Ok(()),
        }
    }

    async fn cancel(&mut self) -> Result<()> {
        if self.dialog.is_open() {
            self.dialog.dismiss();
        } else {
            self.editor = None;
        }
        self.render().await
    }

    fn customers(&self) -> &[Identity] {
        &self.customers
    }

    fn visible(&self) -> Vec<&Identity> {
        self.filtered()
    }

    fn dialog(&self) -> Option<&Dialog<CustomerAction>> {
        self.dialog.current()
    }

    fn editor(&self) -> Option<&CustomerForm> {
        self.editor.as_ref().map(|(_, form)| form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactor::customer_interactor::CustomerInteractorImpl;
    use crate::supabase::MemoryBackend;
    use crate::view::customers_view::TerminalCustomersView;
    use crate::view::terminal::Terminal;

    struct Fixture {
        backend: Arc<MemoryBackend>,
        terminal: Terminal,
        client: Uuid,
        presenter: CustomersPresenterImpl<CustomerInteractorImpl, TerminalCustomersView>,
    }

    async fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        let admin = backend.add_account("root@atlas.local", "pw", "Root Admin", Role::Admin);
        let client = backend.add_account("bia@atlas.local", "pw", "Bia Lima", Role::Client);
        let terminal = Terminal::buffered();
        let mut presenter = CustomersPresenterImpl::new(
            Arc::new(CustomerInteractorImpl::new(backend.clone())),
            Arc::new(TerminalCustomersView::new(terminal.clone())),
            backend.profile(admin).unwrap(),
        );
        presenter.mount().await.unwrap();
        Fixture {
            backend,
            terminal,
            client,
            presenter,
        }
    }

    #[tokio::test]
    async fn block_requires_confirmation() {
        let mut f = fixture().await;

        f.presenter.request_block_toggle("bia@atlas.local").await.unwrap();
        let dialog = f.presenter.dialog().unwrap();
        assert_eq!(dialog.severity, Severity::Danger);
        assert_eq!(f.backend.profile(f.client).unwrap().status, AccountStatus::Active);

        f.presenter.confirm().await.unwrap();
        assert_eq!(f.backend.profile(f.client).unwrap().status, AccountStatus::Blocked);
        let local = f.presenter.customers().iter().find(|c| c.id == f.client).unwrap();
        assert_eq!(local.status, AccountStatus::Blocked);

        // Success alert is shown and closes on confirm
        assert!(f.presenter.dialog().unwrap().is_alert());
        f.presenter.confirm().await.unwrap();
        assert!(f.presenter.dialog().is_none());
    }

    #[tokio::test]
    async fn cancelled_dialog_changes_nothing() {
        let mut f = fixture().await;
        f.presenter.request_role_toggle("bia@atlas.local").await.unwrap();
        assert_eq!(f.presenter.dialog().unwrap().severity, Severity::Warning);
        f.presenter.cancel().await.unwrap();
        assert!(f.presenter.dialog().is_none());
        assert_eq!(f.backend.profile(f.client).unwrap().role, Role::Client);
    }

    #[tokio::test]
    async fn failed_delete_leaves_list_and_alerts() {
        let mut f = fixture().await;
        f.backend.fail_writes(true);

        f.presenter.request_delete("bia@atlas.local").await.unwrap();
        f.presenter.confirm().await.unwrap();

        assert_eq!(f.presenter.customers().len(), 2);
        let alert = f.presenter.dialog().unwrap();
        assert!(alert.is_alert());
        assert_eq!(alert.severity, Severity::Danger);
        assert!(f.terminal.contains("Operation failed"));
    }

    #[tokio::test]
    async fn delete_removes_row_without_refetch() {
        let mut f = fixture().await;
        f.presenter.request_delete("bia@atlas.local").await.unwrap();
        f.presenter.confirm().await.unwrap();
        assert_eq!(f.presenter.customers().len(), 1);
        assert!(f.backend.profile(f.client).is_none());
    }

    #[tokio::test]
    async fn search_and_row_numbers() {
        let mut f = fixture().await;
        f.presenter.search("LIMA").await.unwrap();
        assert_eq!(f.presenter.visible().len(), 1);

        f.presenter.edit("1").await.unwrap();
        assert_eq!(f.presenter.editor().unwrap().full_name, "Bia Lima");
        f.presenter.set_field("whatsapp", "11987654321").await.unwrap();
        f.presenter.save().await.unwrap();

        assert!(f.presenter.editor().is_none());
        assert_eq!(
            f.backend.profile(f.client).unwrap().whatsapp.as_deref(),
            Some("11987654321")
        );
        assert!(f.terminal.contains("(11) 98765-4321"));
    }

    #[tokio::test]
    async fn non_admin_cannot_load_or_mutate() {
        let backend = Arc::new(MemoryBackend::new());
        let client = backend.add_account("bia@atlas.local", "pw", "Bia Lima", Role::Client);
        let terminal = Terminal::buffered();
        let mut presenter = CustomersPresenterImpl::new(
            Arc::new(CustomerInteractorImpl::new(backend.clone())),
            Arc::new(TerminalCustomersView::new(terminal.clone())),
            backend.profile(client).unwrap(),
        );

        presenter.mount().await.unwrap();
        assert!(presenter.customers().is_empty());
        presenter.request_delete("bia@atlas.local").await.unwrap();
        assert!(presenter.dialog().is_none());
        assert!(terminal.contains(ADMIN_REQUIRED));
    }
}
