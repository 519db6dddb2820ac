//! Client side of the hosted backend: authentication plus the
//! `profiles`, `transactions` and `settings` collections.

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::entity::{
    AppError, AuthEvent, Identity, IdentityPatch, NewSwapTransaction, Session, Setting,
    SwapTransaction, TransactionQuery, TransactionStatus,
};

pub mod auth_service;
pub mod memory;
pub mod rest_client;

pub use auth_service::GoTrueAuthService;
pub use memory::MemoryBackend;
pub use rest_client::PostgrestClient;

/// Authentication sub-interface of the backend.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;

    /// Register a new account; the backend creates the matching profile row
    async fn sign_up(&self, email: &str, password: &str, full_name: &str)
        -> Result<Session, AppError>;

    /// Terminate the current session. Local state is cleared even if the remote call fails.
    async fn sign_out(&self) -> Result<(), AppError>;

    /// Session left over from a previous run, if it is still accepted
    async fn current_session(&self) -> Result<Option<Session>, AppError>;

    /// Notifications for every sign-in and sign-out
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn fetch_identity(&self, id: Uuid) -> Result<Identity, AppError>;
    async fn list_identities(&self) -> Result<Vec<Identity>, AppError>;
    async fn update_identity(&self, id: Uuid, patch: &IdentityPatch) -> Result<(), AppError>;
    async fn delete_identity(&self, id: Uuid) -> Result<(), AppError>;
    async fn count_identities(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert_transaction(&self, tx: &NewSwapTransaction) -> Result<(), AppError>;
    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<SwapTransaction>, AppError>;
    async fn update_transaction_status(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> Result<(), AppError>;
    async fn count_transactions(&self, status: Option<TransactionStatus>)
        -> Result<u64, AppError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// All settings, or only the given keys
    async fn fetch_settings(&self, keys: Option<&[&str]>) -> Result<Vec<Setting>, AppError>;
    async fn fetch_setting(&self, key: &str) -> Result<Option<Setting>, AppError>;
    async fn upsert_settings(&self, settings: &[Setting]) -> Result<(), AppError>;
}

/// Pulls a human readable message out of a backend error body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_message(body), "Invalid login credentials");
        assert_eq!(error_message(r#"{"message":"JWT expired"}"#), "JWT expired");
        assert_eq!(error_message(""), "Unknown error");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
