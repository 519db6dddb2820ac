use rust_decimal::Decimal;

use super::{SwapTransaction, TransactionStatus};

// Dashboard cards for a client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub volume: Decimal,
}

impl ClientStats {
    pub fn from_transactions(transactions: &[SwapTransaction]) -> Self {
        let mut stats = Self {
            total: transactions.len(),
            ..Self::default()
        };
        for tx in transactions {
            match tx.status {
                TransactionStatus::Completed => {
                    stats.completed += 1;
                    stats.volume += tx.amount_depix;
                }
                TransactionStatus::Pending => stats.pending += 1,
                TransactionStatus::Failed => {}
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WelcomeSummary {
    pub first_name: String,
    pub volume: Decimal,
}

// Dashboard cards for an administrator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminStats {
    pub total_customers: u64,
    pub pending_swaps: u64,
    pub monthly_volume: Decimal,
    pub estimated_fees: Decimal,
    pub recent: Vec<SwapTransaction>,
}
