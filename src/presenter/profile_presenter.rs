use anyhow::Result;
use async_trait::async_trait;
use log::error;
use std::sync::Arc;

use crate::entity::Identity;
use crate::interactor::profile_interactor::{ProfileForm, ProfileInteractor};
use crate::view::profile_view::ProfileView;

#[async_trait]
pub trait ProfilePresenter: Send + Sync {
    async fn mount(&mut self) -> Result<()>;
    async fn set_field(&mut self, field: &str, value: &str) -> Result<()>;
    /// Returns true once the profile was stored; the caller then re-fetches the identity.
    async fn save(&mut self) -> Result<bool>;
    fn form(&self) -> &ProfileForm;
}

pub struct ProfilePresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    identity: Identity,
    form: ProfileForm,
}

impl<I, V> ProfilePresenterImpl<I, V>
where
    I: ProfileInteractor,
    V: ProfileView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, identity: Identity) -> Self {
        let form = ProfileForm::from_identity(&identity);
        Self {
            interactor,
            view,
            identity,
            form,
        }
    }
}

#[async_trait]
impl<I, V> ProfilePresenter for ProfilePresenterImpl<I, V>
where
    I: ProfileInteractor + Send + Sync,
    V: ProfileView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        self.view.display_profile(&self.identity, &self.form).await
    }

    async fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        let value = value.trim().to_string();
        match field.to_lowercase().as_str() {
            "name" | "full_name" => self.form.full_name = value,
            "whatsapp" => self.form.whatsapp = value,
            "telegram" => self.form.telegram = value,
            "email" => {
                return self
                    .view
                    .display_error("The email address cannot be changed.".to_string())
                    .await
            }
            other => {
                return self
                    .view
                    .display_error(format!(
                        "Unknown field '{}'. Fields: name, whatsapp, telegram.",
                        other
                    ))
                    .await
            }
        }
        self.view.display_profile(&self.identity, &self.form).await
    }

    async fn save(&mut self) -> Result<bool> {
        match self
            .interactor
            .update_profile(self.identity.id, &self.form)
            .await
        {
            Ok(()) => {
                self.view.display_saved().await?;
                Ok(true)
            }
            Err(e) => {
                error!("Failed to update profile {}: {:#}", self.identity.id, e);
                self.view
                    .display_error(format!("Error while updating: {}", e))
                    .await?;
                Ok(false)
            }
        }
    }

    fn form(&self) -> &ProfileForm {
        &self.form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Role;
    use crate::interactor::profile_interactor::ProfileInteractorImpl;
    use crate::supabase::MemoryBackend;
    use crate::view::profile_view::TerminalProfileView;
    use crate::view::terminal::Terminal;

    #[tokio::test]
    async fn email_stays_read_only() {
        let backend = Arc::new(MemoryBackend::new());
        let id = backend.add_account("bia@atlas.local", "pw", "Bia Lima", Role::Client);
        let terminal = Terminal::buffered();
        let mut presenter = ProfilePresenterImpl::new(
            Arc::new(ProfileInteractorImpl::new(backend.clone())),
            Arc::new(TerminalProfileView::new(terminal.clone())),
            backend.profile(id).unwrap(),
        );

        presenter.mount().await.unwrap();
        presenter.set_field("email", "other@atlas.local").await.unwrap();
        presenter.set_field("telegram", "@bia").await.unwrap();
        assert!(presenter.save().await.unwrap());

        let stored = backend.profile(id).unwrap();
        assert_eq!(stored.email.as_deref(), Some("bia@atlas.local"));
        assert_eq!(stored.telegram.as_deref(), Some("@bia"));
        assert!(terminal.contains("cannot be changed"));
    }

    #[tokio::test]
    async fn failed_save_reports_error() {
        let backend = Arc::new(MemoryBackend::new());
        let id = backend.add_account("bia@atlas.local", "pw", "Bia Lima", Role::Client);
        backend.fail_writes(true);
        let terminal = Terminal::buffered();
        let mut presenter = ProfilePresenterImpl::new(
            Arc::new(ProfileInteractorImpl::new(backend.clone())),
            Arc::new(TerminalProfileView::new(terminal.clone())),
            backend.profile(id).unwrap(),
        );

        assert!(!presenter.save().await.unwrap());
        assert!(terminal.contains("Error while updating"));
    }
}
