use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;

use crate::entity::{AppError, SupportLinks};
use crate::interactor::auth_interactor::{AuthInteractor, RegistrationForm};
use crate::view::auth_view::AuthView;

pub const BLOCKED_LOGIN: &str =
    "Your account is blocked. Please contact support for more information.";

/// Whether an error is about a blocked or disabled account.
fn concerns_blocked_account(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("blocked") || message.contains("disabled")
}

#[async_trait]
pub trait AuthPresenter: Send + Sync {
    /// Shows the sign-in prompt and any notice left by a forced sign-out.
    async fn mount(&mut self, notice: Option<String>) -> Result<()>;
    async fn login(&mut self, email: &str, password: &str) -> Result<bool>;
    async fn register(&mut self, form: RegistrationForm) -> Result<bool>;
    fn error(&self) -> Option<&str>;
    fn support(&self) -> Option<&SupportLinks>;
}

pub struct AuthPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    error: Option<String>,
    support: Option<SupportLinks>,
}

impl<I, V> AuthPresenterImpl<I, V>
where
    I: AuthInteractor,
    V: AuthView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>) -> Self {
        Self {
            interactor,
            view,
            error: None,
            support: None,
        }
    }

    async fn show_error(&mut self, message: String) -> Result<()> {
        if concerns_blocked_account(&message) && self.support.is_none() {
            match self.interactor.support_links().await {
                Ok(links) => self.support = Some(links),
                Err(e) => error!("Failed to load support contacts: {:#}", e),
            }
        }

        let support = if concerns_blocked_account(&message) {
            self.support.as_ref()
        } else {
            None
        };
        self.view.display_error(&message, support).await?;
        self.error = Some(message);
        Ok(())
    }
}

#[async_trait]
impl<I, V> AuthPresenter for AuthPresenterImpl<I, V>
where
    I: AuthInteractor + Send + Sync,
    V: AuthView + Send + Sync,
{
    async fn mount(&mut self, notice: Option<String>) -> Result<()> {
        self.error = None;
        self.view.display_prompt().await?;
        match notice {
            Some(notice) => self.show_error(notice).await,
            None => Ok(()),
        }
    }

    async fn login(&mut self, email: &str, password: &str) -> Result<bool> {
        self.error = None;
        match self.interactor.sign_in(email, password).await {
            Ok(session) => {
                let email = session.user.email.clone().unwrap_or_else(|| email.to_string());
                info!("{} signed in", email);
                self.view.display_signed_in(&email).await?;
                Ok(true)
            }
            Err(e) => {
                let message = match e.downcast_ref::<AppError>() {
                    Some(AppError::AccountBlocked) => BLOCKED_LOGIN.to_string(),
                    Some(AppError::AuthRejected(reason)) => reason.clone(),
                    _ => e.to_string(),
                };
                self.show_error(message).await?;
                Ok(false)
            }
        }
    }

    async fn register(&mut self, form: RegistrationForm) -> Result<bool> {
        self.error = None;
        match self.interactor.register(&form).await {
            Ok(session) => {
                let email = session.user.email.clone().unwrap_or(form.email);
                self.view.display_signed_in(&email).await?;
                Ok(true)
            }
            Err(e) => {
                let message = match e.downcast_ref::<AppError>() {
                    Some(AppError::AuthRejected(reason)) => reason.clone(),
                    _ => e.to_string(),
                };
                self.show_error(message).await?;
                Ok(false)
            }
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn support(&self) -> Option<&SupportLinks> {
        self.support.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BLOCKED_NOTICE;
    use crate::entity::{AccountStatus, IdentityPatch, Role};
    use crate::interactor::auth_interactor::AuthInteractorImpl;
    use crate::supabase::{MemoryBackend, ProfileRepository};
    use crate::view::auth_view::TerminalAuthView;
    use crate::view::terminal::Terminal;

    fn presenter(
        backend: &Arc<MemoryBackend>,
        terminal: &Terminal,
    ) -> AuthPresenterImpl<AuthInteractorImpl, TerminalAuthView> {
        AuthPresenterImpl::new(
            Arc::new(AuthInteractorImpl::new(backend.clone(), backend.clone(), backend.clone())),
            Arc::new(TerminalAuthView::new(terminal.clone())),
        )
    }

    #[tokio::test]
    async fn notice_is_shown_with_support_links() {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, &terminal);

        presenter.mount(Some(BLOCKED_NOTICE.to_string())).await.unwrap();

        assert_eq!(presenter.error(), Some(BLOCKED_NOTICE));
        assert_eq!(
            presenter.support().unwrap().telegram,
            "https://t.me/atlas_swap"
        );
        assert!(terminal.contains("Telegram: https://t.me/atlas_swap"));
    }

    #[tokio::test]
    async fn blocked_login_is_refused_inline() {
        let backend = Arc::new(MemoryBackend::new());
        let id = backend.add_account("bia@atlas.local", "pw", "Bia Lima", Role::Client);
        backend
            .update_identity(id, &IdentityPatch::status(AccountStatus::Blocked))
            .await
            .unwrap();
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, &terminal);

        assert!(!presenter.login("bia@atlas.local", "pw").await.unwrap());
        assert_eq!(presenter.error(), Some(BLOCKED_LOGIN));
    }

    #[tokio::test]
    async fn wrong_password_shows_auth_message_without_support() {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, &terminal);

        assert!(!presenter.login("client@atlas.local", "nope").await.unwrap());
        assert!(presenter.error().is_some());
        assert!(presenter.support().is_none());
    }

    #[tokio::test]
    async fn register_signs_in() {
        let backend = Arc::new(MemoryBackend::new());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, &terminal);
        let form = RegistrationForm {
            full_name: "Bia Lima".to_string(),
            email: "bia@atlas.local".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };

        assert!(presenter.register(form).await.unwrap());
        assert!(terminal.contains("Signed in as bia@atlas.local."));
    }
}
