use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use futures::try_join;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::entity::{
    AdminStats, ClientStats, TransactionQuery, TransactionStatus, WelcomeSummary,
};
use crate::supabase::{ProfileRepository, TransactionRepository};

/// Rows shown in the admin "recent transactions" card
pub const RECENT_LIMIT: usize = 5;

/// Midnight UTC on the first day of the month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[async_trait]
pub trait DashboardInteractor: Send + Sync {
    async fn client_stats(&self, user_id: Uuid) -> Result<ClientStats>;
    async fn welcome(&self, user_id: Uuid) -> Result<WelcomeSummary>;
    async fn admin_stats(&self) -> Result<AdminStats>;
}

pub struct DashboardInteractorImpl {
    profiles: Arc<dyn ProfileRepository>,
    transactions: Arc<dyn TransactionRepository>,
    admin_fee_rate: Decimal,
}

impl DashboardInteractorImpl {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        transactions: Arc<dyn TransactionRepository>,
        admin_fee_rate: Decimal,
    ) -> Self {
        Self {
            profiles,
            transactions,
            admin_fee_rate,
        }
    }

    async fn completed_volume(&self, query: TransactionQuery) -> Result<Decimal> {
        let query = TransactionQuery {
            status: Some(TransactionStatus::Completed),
            ..query
        };
        let rows = self
            .transactions
            .list_transactions(&query)
            .await
            .context("Failed to load completed transactions")?;
        Ok(rows.iter().map(|tx| tx.amount_depix).sum())
    }
}

#[async_trait]
impl DashboardInteractor for DashboardInteractorImpl {
    async fn client_stats(&self, user_id: Uuid) -> Result<ClientStats> {
        let rows = self
            .transactions
            .list_transactions(&TransactionQuery::for_user(user_id))
            .await
            .context("Failed to load transactions")?;
        Ok(ClientStats::from_transactions(&rows))
    }

    async fn welcome(&self, user_id: Uuid) -> Result<WelcomeSummary> {
        let identity = self
            .profiles
            .fetch_identity(user_id)
            .await
            .context("Failed to load profile")?;
        let volume = self
            .completed_volume(TransactionQuery::for_user(user_id))
            .await?;

        Ok(WelcomeSummary {
            first_name: identity.first_name().to_string(),
            volume,
        })
    }

    async fn admin_stats(&self) -> Result<AdminStats> {
        let since = month_start(Utc::now());
        let recent_query = TransactionQuery {
            limit: Some(RECENT_LIMIT),
            with_customer: true,
            ..TransactionQuery::default()
        };

        let (total_customers, pending_swaps, monthly_volume, recent) = try_join!(
            async {
                self.profiles
                    .count_identities()
                    .await
                    .context("Failed to count customers")
            },
            async {
                self.transactions
                    .count_transactions(Some(TransactionStatus::Pending))
                    .await
                    .context("Failed to count pending swaps")
            },
            self.completed_volume(TransactionQuery {
                created_since: Some(since),
                ..TransactionQuery::default()
            }),
            async {
                self.transactions
                    .list_transactions(&recent_query)
                    .await
                    .context("Failed to load recent transactions")
            },
        )?;

        Ok(AdminStats {
            total_customers,
            pending_swaps,
            monthly_volume,
            estimated_fees: monthly_volume * self.admin_fee_rate,
            recent,
        })
    }
}
