//! In-memory backend
//!
//! Used by tests and by the offline demo (`ATLAS_BACKEND=memory`).
//! Behaves like the hosted service for the operations the client needs,
//! including the profile row created on sign-up.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::info;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{AuthService, ProfileRepository, SettingsRepository, TransactionRepository};
use crate::entity::{
    AccountStatus, AppError, AuthEvent, AuthUser, Identity, IdentityPatch, NewSwapTransaction,
    Role, Session, Setting, SwapTransaction, TransactionQuery, TransactionStatus,
    SETTING_SPREAD, SETTING_SUPPORT_TELEGRAM, SETTING_SUPPORT_WHATSAPP,
};

struct Account {
    id: Uuid,
    email: String,
    password: String,
}

pub struct MemoryBackend {
    accounts: RwLock<Vec<Account>>,
    profiles: RwLock<Vec<Identity>>,
    transactions: RwLock<Vec<SwapTransaction>>,
    settings: RwLock<Vec<Setting>>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: RwLock::new(Vec::new()),
            profiles: RwLock::new(Vec::new()),
            transactions: RwLock::new(Vec::new()),
            settings: RwLock::new(Vec::new()),
            session: RwLock::new(None),
            events,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Backend seeded with an administrator, a client and a few swaps.
    pub fn demo() -> Self {
        let backend = Self::new();
        backend.add_account("admin@atlas.local", "admin123", "Atlas Admin", Role::Admin);
        let client = backend.add_account("client@atlas.local", "client123", "Ana Souza", Role::Client);

        backend.set_setting(SETTING_SPREAD, json!(0.05));
        backend.set_setting(SETTING_SUPPORT_WHATSAPP, json!("https://wa.me/5511999990000"));
        backend.set_setting(SETTING_SUPPORT_TELEGRAM, json!("https://t.me/atlas_swap"));

        let now = Utc::now();
        backend.add_transaction(SwapTransaction {
            id: "TX-10482".to_string(),
            user_id: client,
            amount_depix: Decimal::new(50000, 2),
            amount_usdt: Decimal::new(94_106_464, 6),
            wallet_address: "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
            status: TransactionStatus::Completed,
            created_at: now - Duration::days(3),
            customer: None,
        });
        backend.add_transaction(SwapTransaction {
            id: "TX-55310".to_string(),
            user_id: client,
            amount_depix: Decimal::new(5000, 2),
            amount_usdt: Decimal::new(8_460_076, 6),
            wallet_address: "0x8617E340B3D01FA5F11F306F4090FD50E238070D".to_string(),
            status: TransactionStatus::Pending,
            created_at: now - Duration::hours(2),
            customer: None,
        });

        info!("Memory backend seeded with demo data");
        backend
    }

    /// Registers an account and its profile row, returning the user id.
    pub fn add_account(&self, email: &str, password: &str, full_name: &str, role: Role) -> Uuid {
        let id = Uuid::new_v4();
        self.accounts.write().unwrap().push(Account {
            id,
            email: email.to_string(),
            password: password.to_string(),
        });
        self.profiles.write().unwrap().push(Identity {
            id,
            email: Some(email.to_string()),
            full_name: Some(full_name.to_string()),
            role,
            status: AccountStatus::Active,
            whatsapp: None,
            telegram: None,
            created_at: Some(Utc::now()),
        });
        id
    }

    pub fn add_transaction(&self, tx: SwapTransaction) {
        self.transactions.write().unwrap().push(tx);
    }

    pub fn set_setting(&self, key: &str, value: serde_json::Value) {
        let mut settings = self.settings.write().unwrap();
        match settings.iter_mut().find(|s| s.key == key) {
            Some(existing) => existing.value = value,
            None => settings.push(Setting::new(key, value)),
        }
    }

    /// Profile row as currently stored, bypassing the failure switches.
    pub fn profile(&self, id: Uuid) -> Option<Identity> {
        self.profiles.read().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn profile_by_email(&self, email: &str) -> Option<Identity> {
        self.profiles
            .read()
            .unwrap()
            .iter()
            .find(|p| p.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .cloned()
    }

    pub fn transaction(&self, id: &str) -> Option<SwapTransaction> {
        self.transactions
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.read().unwrap().len()
    }

    pub fn setting(&self, key: &str) -> Option<Setting> {
        self.settings
            .read()
            .unwrap()
            .iter()
            .find(|s| s.key == key)
            .cloned()
    }

    /// Make every mutation fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every query fail with a backend error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Backend {
                status: 500,
                message: "write rejected".to_string(),
            });
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Backend {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn start_session(&self, id: Uuid, email: &str) -> Session {
        let session = Session {
            access_token: format!("memory-{}", Uuid::new_v4()),
            refresh_token: None,
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
        };
        *self.session.write().unwrap() = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
        session
    }
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let id = self
            .accounts
            .read()
            .unwrap()
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email) && a.password == password)
            .map(|a| a.id)
            .ok_or_else(|| AppError::AuthRejected("Invalid login credentials".to_string()))?;

        Ok(self.start_session(id, email))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, AppError> {
        let taken = self
            .accounts
            .read()
            .unwrap()
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email));
        if taken {
            return Err(AppError::AuthRejected("User already registered".to_string()));
        }
        if password.len() < 6 {
            return Err(AppError::AuthRejected(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let id = self.add_account(email, password, full_name, Role::Client);
        Ok(self.start_session(id, email))
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        *self.session.write().unwrap() = None;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AppError> {
        Ok(self.session.read().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn fetch_identity(&self, id: Uuid) -> Result<Identity, AppError> {
        self.check_read()?;
        self.profile(id)
            .ok_or_else(|| AppError::NotFound(format!("profile {}", id)))
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, AppError> {
        self.check_read()?;
        let mut profiles = self.profiles.read().unwrap().clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn update_identity(&self, id: Uuid, patch: &IdentityPatch) -> Result<(), AppError> {
        self.check_write()?;
        if let Some(profile) = self.profiles.write().unwrap().iter_mut().find(|p| p.id == id) {
            profile.apply(patch);
        }
        Ok(())
    }

    async fn delete_identity(&self, id: Uuid) -> Result<(), AppError> {
        self.check_write()?;
        self.profiles.write().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn count_identities(&self) -> Result<u64, AppError> {
        self.check_read()?;
        Ok(self.profiles.read().unwrap().len() as u64)
    }
}

#[async_trait]
impl TransactionRepository for MemoryBackend {
    async fn insert_transaction(&self, tx: &NewSwapTransaction) -> Result<(), AppError> {
        self.check_write()?;
        let mut transactions = self.transactions.write().unwrap();
        if transactions.iter().any(|t| t.id == tx.id) {
            return Err(AppError::Backend {
                status: 409,
                message: format!("duplicate key value: {}", tx.id),
            });
        }
        transactions.push(SwapTransaction {
            id: tx.id.clone(),
            user_id: tx.user_id,
            amount_depix: tx.amount_depix,
            amount_usdt: tx.amount_usdt,
            wallet_address: tx.wallet_address.clone(),
            status: tx.status,
            created_at: Utc::now(),
            customer: None,
        });
        Ok(())
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<SwapTransaction>, AppError> {
        self.check_read()?;
        let profiles = self.profiles.read().unwrap();
        let mut rows: Vec<SwapTransaction> = self
            .transactions
            .read()
            .unwrap()
            .iter()
            .filter(|tx| query.matches(tx))
            .cloned()
            .map(|mut tx| {
                if query.with_customer {
                    tx.customer = profiles.iter().find(|p| p.id == tx.user_id).map(|p| {
                        crate::entity::CustomerSummary {
                            full_name: p.full_name.clone(),
                            email: p.email.clone(),
                        }
                    });
                }
                tx
            })
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn update_transaction_status(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> Result<(), AppError> {
        self.check_write()?;
        if let Some(tx) = self
            .transactions
            .write()
            .unwrap()
            .iter_mut()
            .find(|t| t.id == id)
        {
            tx.status = status;
        }
        Ok(())
    }

    async fn count_transactions(
        &self,
        status: Option<TransactionStatus>,
    ) -> Result<u64, AppError> {
        self.check_read()?;
        Ok(self
            .transactions
            .read()
            .unwrap()
            .iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .count() as u64)
    }
}

#[async_trait]
impl SettingsRepository for MemoryBackend {
    async fn fetch_settings(&self, keys: Option<&[&str]>) -> Result<Vec<Setting>, AppError> {
        self.check_read()?;
        Ok(self
            .settings
            .read()
            .unwrap()
            .iter()
            .filter(|s| keys.map_or(true, |keys| keys.contains(&s.key.as_str())))
            .cloned()
            .collect())
    }

    async fn fetch_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        self.check_read()?;
        Ok(self.setting(key))
    }

    async fn upsert_settings(&self, settings: &[Setting]) -> Result<(), AppError> {
        self.check_write()?;
        for setting in settings {
            self.set_setting(&setting.key, setting.value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_creates_client_profile_and_notifies() {
        let backend = MemoryBackend::new();
        let mut events = backend.subscribe();

        let session = backend
            .sign_up("new@atlas.local", "secret1", "New Person")
            .await
            .unwrap();

        let profile = backend.fetch_identity(session.user_id()).await.unwrap();
        assert_eq!(profile.role, Role::Client);
        assert_eq!(profile.status, AccountStatus::Active);
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(_)));
    }

    #[tokio::test]
    async fn sign_in_rejects_wrong_password() {
        let backend = MemoryBackend::demo();
        let err = backend.sign_in("client@atlas.local", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::AuthRejected(_)));
    }

    #[tokio::test]
    async fn listing_respects_scope_and_limit() {
        let backend = MemoryBackend::demo();
        let all = backend
            .list_transactions(&TransactionQuery::all_with_customer())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].id, "TX-55310");
        assert!(all[0].customer.is_some());

        let query = TransactionQuery {
            limit: Some(1),
            ..TransactionQuery::default()
        };
        assert_eq!(backend.list_transactions(&query).await.unwrap().len(), 1);
        assert_eq!(
            backend
                .count_transactions(Some(TransactionStatus::Pending))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn failing_writes_leave_rows_untouched() {
        let backend = MemoryBackend::demo();
        backend.fail_writes(true);
        assert!(backend
            .update_transaction_status("TX-55310", TransactionStatus::Completed)
            .await
            .is_err());
        assert_eq!(
            backend.transaction("TX-55310").unwrap().status,
            TransactionStatus::Pending
        );
    }
}
