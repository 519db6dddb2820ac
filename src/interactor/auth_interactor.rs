use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{error, info, warn};
use std::sync::Arc;

use crate::entity::{
    AppError, Session, SupportLinks, SETTING_SUPPORT_TELEGRAM, SETTING_SUPPORT_WHATSAPP,
};
use crate::supabase::{AuthService, ProfileRepository, SettingsRepository};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[async_trait]
pub trait AuthInteractor: Send + Sync {
    /// Signs in and refuses blocked accounts.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    async fn register(&self, form: &RegistrationForm) -> Result<Session>;

    async fn support_links(&self) -> Result<SupportLinks>;
}

pub struct AuthInteractorImpl {
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl AuthInteractorImpl {
    pub fn new(
        auth: Arc<dyn AuthService>,
        profiles: Arc<dyn ProfileRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            auth,
            profiles,
            settings,
        }
    }
}

#[async_trait]
impl AuthInteractor for AuthInteractorImpl {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(anyhow!("Email and password are required."));
        }

        let session = self.auth.sign_in(email, password).await?;

        let identity = match self.profiles.fetch_identity(session.user_id()).await {
            Ok(identity) => identity,
            Err(e) => {
                error!("Failed to load profile after sign-in: {}", e);
                self.auth.sign_out().await?;
                return Err(e.into());
            }
        };
        if identity.is_blocked() {
            warn!("Blocked account {} attempted to sign in", identity.id);
            self.auth.sign_out().await?;
            return Err(AppError::AccountBlocked.into());
        }

        Ok(session)
    }

    async fn register(&self, form: &RegistrationForm) -> Result<Session> {
        if form.password != form.confirm_password {
            return Err(anyhow!("Passwords do not match."));
        }
        if form.email.trim().is_empty() || form.full_name.trim().is_empty() {
            return Err(anyhow!("Name and email are required."));
        }

        let session = self
            .auth
            .sign_up(form.email.trim(), &form.password, form.full_name.trim())
            .await?;
        info!("New account registered: {}", session.user_id());

        Ok(session)
    }

    async fn support_links(&self) -> Result<SupportLinks> {
        let keys = [SETTING_SUPPORT_WHATSAPP, SETTING_SUPPORT_TELEGRAM];
        let settings = self.settings.fetch_settings(Some(&keys[..])).await?;
        Ok(SupportLinks::from_settings(&settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AccountStatus, IdentityPatch};
    use crate::supabase::MemoryBackend;

    fn interactor(backend: &Arc<MemoryBackend>) -> AuthInteractorImpl {
        AuthInteractorImpl::new(backend.clone(), backend.clone(), backend.clone())
    }

    #[tokio::test]
    async fn blocked_account_cannot_sign_in() {
        let backend = Arc::new(MemoryBackend::demo());
        let session = backend.sign_in("client@atlas.local", "client123").await.unwrap();
        backend
            .update_identity(session.user_id(), &IdentityPatch::status(AccountStatus::Blocked))
            .await
            .unwrap();
        backend.sign_out().await.unwrap();

        let err = interactor(&backend)
            .sign_in("client@atlas.local", "client123")
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::AccountBlocked)));
        assert_eq!(backend.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_profile_fetch_drops_the_session() {
        let backend = Arc::new(MemoryBackend::demo());
        backend.fail_reads(true);

        let result = interactor(&backend)
            .sign_in("client@atlas.local", "client123")
            .await;
        assert!(result.is_err());
        assert_eq!(backend.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_requires_matching_passwords() {
        let backend = Arc::new(MemoryBackend::new());
        let form = RegistrationForm {
            full_name: "Bia".to_string(),
            email: "bia@atlas.local".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let err = interactor(&backend).register(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match.");
        assert_eq!(backend.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn support_links_come_from_settings() {
        let backend = Arc::new(MemoryBackend::demo());
        let links = interactor(&backend).support_links().await.unwrap();
        assert_eq!(links.telegram, "https://t.me/atlas_swap");
    }
}
