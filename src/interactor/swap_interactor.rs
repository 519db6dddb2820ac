use anyhow::Result;
use async_trait::async_trait;
use log::info;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::entity::{AppError, FeeSchedule, NewSwapTransaction, Quote, TransactionStatus};
use crate::interactor::quote_interactor::calculate_quote;
use crate::supabase::TransactionRepository;
use crate::utils::validate_wallet_address;

#[derive(Debug, Clone)]
pub struct SwapResult {
    pub transaction_id: String,
    pub quote: Quote,
}

/// Human readable transaction id, `TX-` followed by five digits.
pub fn generate_transaction_id() -> String {
    format!("TX-{}", rand::rng().random_range(10000..=99999))
}

#[async_trait]
pub trait SwapInteractor: Send + Sync {
    fn fee_schedule(&self) -> &FeeSchedule;

    fn quote(&self, amount: Decimal, effective_rate: Decimal) -> Quote {
        calculate_quote(amount, effective_rate, self.fee_schedule())
    }

    /// Records a pending swap; the USDT amount is fixed at this point.
    async fn execute_swap(
        &self,
        user_id: Uuid,
        amount: Decimal,
        wallet_address: &str,
        effective_rate: Decimal,
    ) -> Result<SwapResult>;
}

pub struct SwapInteractorImpl {
    transactions: Arc<dyn TransactionRepository>,
    fees: FeeSchedule,
}

impl SwapInteractorImpl {
    pub fn new(transactions: Arc<dyn TransactionRepository>, fees: FeeSchedule) -> Self {
        Self { transactions, fees }
    }
}

#[async_trait]
impl SwapInteractor for SwapInteractorImpl {
    fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }

    async fn execute_swap(
        &self,
        user_id: Uuid,
        amount: Decimal,
        wallet_address: &str,
        effective_rate: Decimal,
    ) -> Result<SwapResult> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount.into());
        }
        if !validate_wallet_address(wallet_address) {
            return Err(AppError::InvalidWallet.into());
        }

        let quote = self.quote(amount, effective_rate);
        let transaction = NewSwapTransaction {
            id: generate_transaction_id(),
            user_id,
            amount_depix: quote.amount,
            amount_usdt: quote.destination_amount,
            wallet_address: wallet_address.to_string(),
            status: TransactionStatus::Pending,
        };

        self.transactions.insert_transaction(&transaction).await?;
        info!(
            "Swap {} requested: {} DePiX -> {} USDT",
            transaction.id, transaction.amount_depix, transaction.amount_usdt
        );

        Ok(SwapResult {
            transaction_id: transaction.id,
            quote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::MemoryBackend;
    use rust_decimal_macros::dec;

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[test]
    fn transaction_ids_are_five_digits() {
        for _ in 0..100 {
            let id = generate_transaction_id();
            let digits = id.strip_prefix("TX-").unwrap();
            assert_eq!(digits.len(), 5);
            let n: u32 = digits.parse().unwrap();
            assert!((10000..=99999).contains(&n));
        }
    }

    #[tokio::test]
    async fn records_pending_swap_with_quoted_amount() {
        let backend = Arc::new(MemoryBackend::new());
        let interactor = SwapInteractorImpl::new(backend.clone(), FeeSchedule::default());
        let user_id = Uuid::new_v4();

        let result = interactor
            .execute_swap(user_id, dec!(50), WALLET, dec!(5.26))
            .await
            .unwrap();

        let stored = backend.transaction(&result.transaction_id).unwrap();
        assert_eq!(stored.status, TransactionStatus::Pending);
        assert_eq!(stored.user_id, user_id);
        assert_eq!(stored.amount_depix, dec!(50));
        assert_eq!(stored.amount_usdt, result.quote.destination_amount);
        assert_eq!(stored.amount_usdt.round_dp(2), dec!(8.46));
    }

    #[tokio::test]
    async fn rejects_invalid_input_before_calling_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let interactor = SwapInteractorImpl::new(backend.clone(), FeeSchedule::default());

        assert!(interactor
            .execute_swap(Uuid::new_v4(), dec!(0), WALLET, dec!(5.26))
            .await
            .is_err());
        assert!(interactor
            .execute_swap(Uuid::new_v4(), dec!(50), "0x123", dec!(5.26))
            .await
            .is_err());
        assert_eq!(backend.transaction_count(), 0);
    }
}
