use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::entity::{SwapTransaction, TransactionQuery, TransactionStatus};
use crate::supabase::TransactionRepository;

#[async_trait]
pub trait AdminTransactionInteractor: Send + Sync {
    /// Every transaction with its customer's name and email
    async fn list_all(&self) -> Result<Vec<SwapTransaction>>;
    async fn update_status(&self, id: &str, status: TransactionStatus) -> Result<()>;
}

pub struct AdminTransactionInteractorImpl {
    transactions: Arc<dyn TransactionRepository>,
}

impl AdminTransactionInteractorImpl {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }
}

#[async_trait]
impl AdminTransactionInteractor for AdminTransactionInteractorImpl {
    async fn list_all(&self) -> Result<Vec<SwapTransaction>> {
        self.transactions
            .list_transactions(&TransactionQuery::all_with_customer())
            .await
            .context("Failed to load transactions")
    }

    async fn update_status(&self, id: &str, status: TransactionStatus) -> Result<()> {
        self.transactions
            .update_transaction_status(id, status)
            .await
            .with_context(|| format!("Failed to mark {} as {}", id, status))?;
        info!("Transaction {} marked {}", id, status);
        Ok(())
    }
}
