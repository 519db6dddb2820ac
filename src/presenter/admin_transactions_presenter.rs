use anyhow::Result;
use async_trait::async_trait;
use log::{error, warn};
use std::sync::Arc;

use crate::access::can_administer;
use crate::entity::{Identity, SwapTransaction, TransactionStatus};
use crate::interactor::admin_transaction_interactor::AdminTransactionInteractor;
use crate::modal::{Dialog, DialogSlot, Severity};
use crate::presenter::customers_presenter::ADMIN_REQUIRED;
use crate::utils::{contains_ignore_case, DateRange};
use crate::view::admin_transactions_view::AdminTransactionsView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionAction {
    Approve(String),
    Reject(String),
}

impl TransactionAction {
    fn target(&self) -> (&str, TransactionStatus) {
        match self {
            TransactionAction::Approve(id) => (id.as_str(), TransactionStatus::Completed),
            TransactionAction::Reject(id) => (id.as_str(), TransactionStatus::Failed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub search: String,
    pub status: Option<TransactionStatus>,
    pub range: DateRange,
}

impl TransactionFilter {
    /// Search covers the id, the customer's name and email, and the wallet.
    pub fn matches(&self, tx: &SwapTransaction) -> bool {
        let search = &self.search;
        let customer = tx.customer.as_ref();
        let matches_search = search.is_empty()
            || contains_ignore_case(Some(tx.id.as_str()), search)
            || contains_ignore_case(customer.and_then(|c| c.full_name.as_deref()), search)
            || contains_ignore_case(customer.and_then(|c| c.email.as_deref()), search)
            || contains_ignore_case(Some(tx.wallet_address.as_str()), search);

        matches_search
            && self.status.map_or(true, |status| tx.status == status)
            && self.range.contains(tx.created_at)
    }
}

#[async_trait]
pub trait AdminTransactionsPresenter: Send + Sync {
    async fn mount(&mut self) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;
    async fn search(&mut self, text: &str) -> Result<()>;
    /// `all` or one of pending, completed, failed
    async fn filter_status(&mut self, text: &str) -> Result<()>;
    async fn set_from(&mut self, text: &str) -> Result<()>;
    async fn set_to(&mut self, text: &str) -> Result<()>;
    async fn clear_filters(&mut self) -> Result<()>;
    async fn request_approve(&mut self, target: &str) -> Result<()>;
    async fn request_reject(&mut self, target: &str) -> Result<()>;
    async fn confirm(&mut self) -> Result<()>;
    async fn cancel(&mut self) -> Result<()>;
    fn transactions(&self) -> &[SwapTransaction];
    fn visible(&self) -> Vec<&SwapTransaction>;
    fn dialog(&self) -> Option<&Dialog<TransactionAction>>;
}

pub struct AdminTransactionsPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    viewer: Identity,
    transactions: Vec<SwapTransaction>,
    filter: TransactionFilter,
    dialog: DialogSlot<TransactionAction>,
}

impl<I, V> AdminTransactionsPresenterImpl<I, V>
where
    I: AdminTransactionInteractor,
    V: AdminTransactionsView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, viewer: Identity) -> Self {
        Self {
            interactor,
            view,
            viewer,
            transactions: Vec::new(),
            filter: TransactionFilter::default(),
            dialog: DialogSlot::default(),
        }
    }

    fn allowed(&self) -> bool {
        can_administer(Some(&self.viewer))
    }

    fn filtered(&self) -> Vec<&SwapTransaction> {
        self.transactions
            .iter()
            .filter(|tx| self.filter.matches(tx))
            .collect()
    }

    /// Row number in the current listing or transaction id.
    fn resolve(&self, target: &str) -> Option<SwapTransaction> {
        let target = target.trim();
        if let Ok(row) = target.parse::<usize>() {
            return row
                .checked_sub(1)
                .and_then(|index| self.filtered().get(index).map(|tx| (*tx).clone()));
        }
        self.transactions
            .iter()
            .find(|tx| tx.id.eq_ignore_ascii_case(target))
            .cloned()
    }

    async fn render(&self) -> Result<()> {
        let rows = self.filtered();
        self.view
            .display_transactions(&rows, &self.transactions, &self.filter)
            .await
    }

    async fn open_dialog(&mut self, dialog: Dialog<TransactionAction>) -> Result<()> {
        self.dialog.open(dialog);
        match self.dialog.current() {
            Some(dialog) => self.view.display_dialog(dialog).await,
            None => Ok(()),
        }
    }

    /// Pending transaction named by `target`, after the usual checks.
    async fn pending_target(&mut self, target: &str) -> Result<Option<SwapTransaction>> {
        if !self.allowed() {
            warn!("{} attempted a transaction status change without rights", self.viewer.id);
            self.view.display_error(ADMIN_REQUIRED.to_string()).await?;
            return Ok(None);
        }
        match self.resolve(target) {
            None => {
                self.view
                    .display_error(format!("No transaction matches '{}'.", target.trim()))
                    .await?;
                Ok(None)
            }
            Some(tx) if tx.status != TransactionStatus::Pending => {
                self.view
                    .display_error(format!("{} is already {}.", tx.id, tx.status))
                    .await?;
                Ok(None)
            }
            Some(tx) => Ok(Some(tx)),
        }
    }
}

#[async_trait]
impl<I, V> AdminTransactionsPresenter for AdminTransactionsPresenterImpl<I, V>
where
    I: AdminTransactionInteractor + Send + Sync,
    V: AdminTransactionsView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        if !self.allowed() {
            warn!("{} tried to open the transaction desk", self.viewer.id);
            return self.view.display_error(ADMIN_REQUIRED.to_string()).await;
        }
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<()> {
        if !self.allowed() {
            return self.view.display_error(ADMIN_REQUIRED.to_string()).await;
        }
        self.view.display_loading().await?;
        match self.interactor.list_all().await {
            Ok(transactions) => {
                self.transactions = transactions;
                self.render().await
            }
            Err(e) => {
                error!("Failed to load transactions: {:#}", e);
                self.view
                    .display_error(
                        "Could not load transactions. Type `refresh` to try again.".to_string(),
                    )
                    .await
            }
        }
    }

    async fn search(&mut self, text: &str) -> Result<()> {
        self.filter.search = text.trim().to_string();
        self.render().await
    }

    async fn filter_status(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            self.filter.status = None;
        } else {
            match text.parse::<TransactionStatus>() {
                Ok(status) => self.filter.status = Some(status),
                Err(e) => return self.view.display_error(e).await,
            }
        }
        self.render().await
    }

    async fn set_from(&mut self, text: &str) -> Result<()> {
        if let Err(e) = self.filter.range.set_start(text) {
            return self.view.display_error(e.to_string()).await;
        }
        self.render().await
    }

    async fn set_to(&mut self, text: &str) -> Result<()> {
        if let Err(e) = self.filter.range.set_end(text) {
            return self.view.display_error(e.to_string()).await;
        }
        self.render().await
    }

    async fn clear_filters(&mut self) -> Result<()> {
        self.filter = TransactionFilter::default();
        self.render().await
    }

    async fn request_approve(&mut self, target: &str) -> Result<()> {
        let Some(tx) = self.pending_target(target).await? else {
            return Ok(());
        };
        self.open_dialog(Dialog::confirm(
            "Confirm approval",
            format!(
                "Mark {} as COMPLETED. Confirm that the funds were sent.",
                tx.id
            ),
            Severity::Success,
            TransactionAction::Approve(tx.id),
        ))
        .await
    }

    async fn request_reject(&mut self, target: &str) -> Result<()> {
        let Some(tx) = self.pending_target(target).await? else {
            return Ok(());
        };
        self.open_dialog(Dialog::confirm(
            "Confirm cancellation",
            format!("{} will be marked as FAILED.", tx.id),
            Severity::Danger,
            TransactionAction::Reject(tx.id),
        ))
        .await
    }

    async fn confirm(&mut self) -> Result<()> {
        if !self.dialog.is_open() {
            return self
                .view
                .display_error("There is nothing to confirm.".to_string())
                .await;
        }
        let Some(action) = self.dialog.confirm() else {
            return Ok(());
        };

        let (id, status) = action.target();
        match self.interactor.update_status(id, status).await {
            // Status changes are confirmed by reading the list back
            Ok(()) => self.refresh().await,
            Err(e) => {
                error!("Failed to update {}: {:#}", id, e);
                self.open_dialog(Dialog::alert(
                    "Operation failed",
                    "The transaction status could not be updated. Please try again.",
                    Severity::Danger,
                ))
                .await
            }
        }
    }

    async fn cancel(&mut self) -> Result<()> {
        self.dialog.dismiss();
        self.render().await
    }

    fn transactions(&self) -> &[SwapTransaction] {
        &self.transactions
    }

    fn visible(&self) -> Vec<&SwapTransaction> {
        self.filtered()
    }

    fn dialog(&self) -> Option<&Dialog<TransactionAction>> {
        self.dialog.current()
    }
}
