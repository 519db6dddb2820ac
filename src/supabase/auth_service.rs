use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use super::{error_message, AuthService};
use crate::entity::{AppError, AuthEvent, AuthUser, Session};

/// Session shared between the auth service and the data clients that
/// need its bearer token.
pub type SessionHandle = Arc<RwLock<Option<Session>>>;

pub(crate) fn read_session(handle: &SessionHandle) -> Option<Session> {
    handle
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

pub(crate) fn write_session(handle: &SessionHandle, session: Option<Session>) {
    *handle
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = session;
}

// Sign-up answers with a bare user when email confirmation is required
#[derive(Deserialize)]
struct SignUpResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<AuthUser>,
}

/// Auth service speaking the GoTrue REST protocol
pub struct GoTrueAuthService {
    http_client: Client,
    base_url: String,
    anon_key: String,
    session: SessionHandle,
    session_file: PathBuf,
    events: broadcast::Sender<AuthEvent>,
}

impl GoTrueAuthService {
    pub fn new(
        base_url: &str,
        anon_key: &str,
        session: SessionHandle,
        session_file: impl Into<PathBuf>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session,
            session_file: session_file.into(),
            events,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn establish(&self, session: Session) -> Result<Session, AppError> {
        write_session(&self.session, Some(session.clone()));
        if let Err(e) = self.persist(&session).await {
            warn!("Failed to persist session: {}", e);
        }
        let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn persist(&self, session: &Session) -> Result<(), AppError> {
        let body = serde_json::to_vec(session).map_err(|source| AppError::Decode {
            entity: "session",
            source,
        })?;
        tokio::fs::write(&self.session_file, body).await?;
        Ok(())
    }

    async fn load_persisted(&self) -> Option<Session> {
        let bytes = tokio::fs::read(&self.session_file).await.ok()?;
        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding unreadable session file: {}", e);
                None
            }
        }
    }

    async fn forget_persisted(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.session_file).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove session file: {}", e);
            }
        }
    }

    /// Checks a stored token against the auth service.
    async fn validate(&self, session: &Session) -> Result<bool, AppError> {
        let response = self
            .http_client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::Backend {
                    status: status.as_u16(),
                    message: error_message(&body),
                })
            }
        }
    }

    async fn rejected(response: reqwest::Response) -> AppError {
        let body = response.text().await.unwrap_or_default();
        AppError::AuthRejected(error_message(&body))
    }
}

#[async_trait]
impl AuthService for GoTrueAuthService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let response = self
            .http_client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body = response.text().await?;
        let session: Session = serde_json::from_str(&body).map_err(|source| AppError::Decode {
            entity: "session",
            source,
        })?;

        info!("Signed in as {}", session.user_id());
        self.establish(session).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, AppError> {
        let response = self
            .http_client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body = response.text().await?;
        let signup: SignUpResponse =
            serde_json::from_str(&body).map_err(|source| AppError::Decode {
                entity: "sign-up response",
                source,
            })?;

        match (signup.access_token, signup.user) {
            (Some(access_token), Some(user)) => {
                info!("Registered account {}", user.id);
                self.establish(Session {
                    access_token,
                    refresh_token: signup.refresh_token,
                    user,
                })
                .await
            }
            _ => Err(AppError::AuthRejected(
                "Registration requires email confirmation before signing in".to_string(),
            )),
        }
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        let previous = read_session(&self.session);
        write_session(&self.session, None);
        self.forget_persisted().await;
        let _ = self.events.send(AuthEvent::SignedOut);

        if let Some(session) = previous {
            let result = self
                .http_client
                .post(self.auth_url("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
            if let Err(e) = result {
                warn!("Remote sign-out failed, local session already cleared: {}", e);
            }
        }

        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AppError> {
        if let Some(session) = read_session(&self.session) {
            return Ok(Some(session));
        }

        let Some(session) = self.load_persisted().await else {
            return Ok(None);
        };

        if self.validate(&session).await? {
            debug!("Restored session for {}", session.user_id());
            write_session(&self.session, Some(session.clone()));
            Ok(Some(session))
        } else {
            info!("Stored session was rejected, signing out locally");
            self.forget_persisted().await;
            Ok(None)
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(file: PathBuf) -> GoTrueAuthService {
        GoTrueAuthService::new(
            "https://project.supabase.co/",
            "anon",
            Arc::new(RwLock::new(None)),
            file,
        )
    }

    #[test]
    fn builds_auth_urls_without_double_slash() {
        let service = service(PathBuf::from("unused.json"));
        assert_eq!(
            service.auth_url("token"),
            "https://project.supabase.co/auth/v1/token"
        );
    }

    #[test]
    fn sign_up_without_session_decodes() {
        let body = r#"{"id":"6f1c2a56-1f0e-4f7a-9a53-2d7c9f1b0d11","email":"a@b.c"}"#;
        let signup: SignUpResponse = serde_json::from_str(body).unwrap();
        assert!(signup.access_token.is_none());
        assert!(signup.user.is_none());
    }

    #[tokio::test]
    async fn current_session_is_none_without_file() {
        let file = std::env::temp_dir().join(format!("atlas-missing-{}.json", uuid::Uuid::new_v4()));
        let service = service(file);
        assert_eq!(service.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn sign_out_clears_local_state_and_notifies() {
        let file = std::env::temp_dir().join(format!("atlas-session-{}.json", uuid::Uuid::new_v4()));
        let service = service(file.clone());
        let mut events = service.subscribe();

        // No session held, so no remote call is made
        service.sign_out().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
        assert!(read_session(&service.session).is_none());
        assert!(!file.exists());
    }
}
