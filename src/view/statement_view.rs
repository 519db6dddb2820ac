use anyhow::Result;
use async_trait::async_trait;

use crate::entity::SwapTransaction;
use crate::utils::{format_amount, shorten_address, DateRange};
use crate::view::terminal::{cell, Terminal};

#[async_trait]
pub trait StatementView: Send + Sync {
    async fn display_loading(&self) -> Result<()>;
    async fn display_transactions(
        &self,
        rows: &[&SwapTransaction],
        total: usize,
        all_customers: bool,
        search: &str,
        range: &DateRange,
    ) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalStatementView {
    terminal: Terminal,
}

impl TerminalStatementView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

/// Filter line shared by the transaction listings.
pub fn describe_filters(search: &str, status: Option<&str>, range: &DateRange) -> Option<String> {
    let mut parts = Vec::new();
    if !search.is_empty() {
        parts.push(format!("search \"{}\"", search));
    }
    if let Some(status) = status {
        parts.push(format!("status {}", status));
    }
    if let Some(start) = range.start {
        parts.push(format!("from {}", start));
    }
    if let Some(end) = range.end {
        parts.push(format!("to {}", end));
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("Filters: {}", parts.join(", ")))
    }
}

#[async_trait]
impl StatementView for TerminalStatementView {
    async fn display_loading(&self) -> Result<()> {
        self.terminal.line("Loading transactions...");
        Ok(())
    }

    async fn display_transactions(
        &self,
        rows: &[&SwapTransaction],
        total: usize,
        all_customers: bool,
        search: &str,
        range: &DateRange,
    ) -> Result<()> {
        let t = &self.terminal;
        t.heading(if all_customers {
            "Global statement"
        } else {
            "Statement"
        });
        if let Some(filters) = describe_filters(search, None, range) {
            t.line(filters);
        }

        if rows.is_empty() {
            t.line("No transactions found.");
        } else {
            t.line(format!(
                "#   {} {} {} {} {} {}",
                cell("ID", 9),
                cell("DATE", 16),
                cell("DEPIX", 12),
                cell("USDT", 12),
                cell("WALLET", 13),
                "STATUS"
            ));
            for (index, tx) in rows.iter().enumerate() {
                t.line(format!(
                    "{} {} {} {} {} {} {}",
                    cell(&(index + 1).to_string(), 3),
                    cell(&tx.id, 9),
                    cell(&tx.created_at.format("%Y-%m-%d %H:%M").to_string(), 16),
                    cell(&format_amount(tx.amount_depix, "DEPIX"), 12),
                    cell(&format_amount(tx.amount_usdt, "USDT"), 12),
                    cell(&shorten_address(&tx.wallet_address), 13),
                    tx.status
                ));
            }
        }
        t.line(format!("Showing {} of {} transactions", rows.len(), total));
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}
