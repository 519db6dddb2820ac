use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::CustomerSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(format!("Unknown transaction status: {}", other)),
        }
    }
}

// Row of the `transactions` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapTransaction {
    pub id: String,
    pub user_id: Uuid,
    pub amount_depix: Decimal,
    pub amount_usdt: Decimal,
    pub wallet_address: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "profiles", default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSummary>,
}

// Insert payload; created_at is assigned by the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSwapTransaction {
    pub id: String,
    pub user_id: Uuid,
    pub amount_depix: Decimal,
    pub amount_usdt: Decimal,
    pub wallet_address: String,
    pub status: TransactionStatus,
}

/// Filter for transaction listings. Results are always newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<TransactionStatus>,
    pub created_since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub with_customer: bool,
}

impl TransactionQuery {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn all_with_customer() -> Self {
        Self {
            with_customer: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, tx: &SwapTransaction) -> bool {
        self.user_id.map_or(true, |id| tx.user_id == id)
            && self.status.map_or(true, |status| tx.status == status)
            && self.created_since.map_or(true, |since| tx.created_at >= since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decodes_row_with_embedded_customer() {
        let json = r#"{
            "id": "TX-48213",
            "user_id": "6f1c2a56-1f0e-4f7a-9a53-2d7c9f1b0d11",
            "amount_depix": 50,
            "amount_usdt": 8.460076,
            "wallet_address": "0x52908400098527886E0F7030069857D2E4169EE7",
            "status": "pending",
            "created_at": "2026-10-01T09:30:00+00:00",
            "profiles": { "full_name": "Ana Souza", "email": "ana@example.com" }
        }"#;
        let tx: SwapTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount_depix, dec!(50));
        assert_eq!(tx.amount_usdt, dec!(8.460076));
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(
            tx.customer.and_then(|c| c.full_name).as_deref(),
            Some("Ana Souza")
        );
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "Completed".parse::<TransactionStatus>(),
            Ok(TransactionStatus::Completed)
        );
        assert!("cancelled".parse::<TransactionStatus>().is_err());
    }
}
