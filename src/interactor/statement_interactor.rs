use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::entity::{SwapTransaction, TransactionQuery};
use crate::supabase::TransactionRepository;

#[async_trait]
pub trait StatementInteractor: Send + Sync {
    /// Transactions of `user_id`, or of every customer when `all_customers` is set.
    async fn get_transactions(&self, user_id: Uuid, all_customers: bool)
        -> Result<Vec<SwapTransaction>>;
}

pub struct StatementInteractorImpl {
    transactions: Arc<dyn TransactionRepository>,
}

impl StatementInteractorImpl {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }
}

#[async_trait]
impl StatementInteractor for StatementInteractorImpl {
    async fn get_transactions(
        &self,
        user_id: Uuid,
        all_customers: bool,
    ) -> Result<Vec<SwapTransaction>> {
        let query = if all_customers {
            TransactionQuery::default()
        } else {
            TransactionQuery::for_user(user_id)
        };

        self.transactions
            .list_transactions(&query)
            .await
            .context("Failed to load transactions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::{AuthService, MemoryBackend};

    #[tokio::test]
    async fn client_sees_only_own_transactions() {
        let backend = Arc::new(MemoryBackend::demo());
        let session = backend.sign_in("admin@atlas.local", "admin123").await.unwrap();
        let interactor = StatementInteractorImpl::new(backend.clone());

        let own = interactor
            .get_transactions(session.user_id(), false)
            .await
            .unwrap();
        assert!(own.is_empty());

        let all = interactor
            .get_transactions(session.user_id(), true)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);
    }
}
