use anyhow::Result;
use async_trait::async_trait;

use crate::entity::{SwapTransaction, TransactionStatus};
use crate::modal::Dialog;
use crate::presenter::admin_transactions_presenter::{TransactionAction, TransactionFilter};
use crate::utils::format_amount;
use crate::view::statement_view::describe_filters;
use crate::view::terminal::{cell, render_dialog, Terminal};

#[async_trait]
pub trait AdminTransactionsView: Send + Sync {
    async fn display_loading(&self) -> Result<()>;
    async fn display_transactions(
        &self,
        rows: &[&SwapTransaction],
        all: &[SwapTransaction],
        filter: &TransactionFilter,
    ) -> Result<()>;
    async fn display_dialog(&self, dialog: &Dialog<TransactionAction>) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalAdminTransactionsView {
    terminal: Terminal,
}

impl TerminalAdminTransactionsView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl AdminTransactionsView for TerminalAdminTransactionsView {
    async fn display_loading(&self) -> Result<()> {
        self.terminal.line("Loading transactions...");
        Ok(())
    }

    async fn display_transactions(
        &self,
        rows: &[&SwapTransaction],
        all: &[SwapTransaction],
        filter: &TransactionFilter,
    ) -> Result<()> {
        let t = &self.terminal;
        t.heading("All transactions");
        let status = filter.status.map(|s| s.as_str());
        if let Some(filters) = describe_filters(&filter.search, status, &filter.range) {
            t.line(filters);
        }

        if rows.is_empty() {
            t.line("No transactions found.");
        } else {
            t.line(format!(
                "#   {} {} {} {} {} {} {}",
                cell("ID", 9),
                cell("DATE", 16),
                cell("CUSTOMER", 20),
                cell("DEPIX", 11),
                cell("USDT", 11),
                cell("WALLET", 42),
                "STATUS"
            ));
            for (index, tx) in rows.iter().enumerate() {
                let customer = tx
                    .customer
                    .as_ref()
                    .and_then(|c| c.full_name.as_deref().or(c.email.as_deref()))
                    .unwrap_or("-");
                t.line(format!(
                    "{} {} {} {} {} {} {} {}",
                    cell(&(index + 1).to_string(), 3),
                    cell(&tx.id, 9),
                    cell(&tx.created_at.format("%Y-%m-%d %H:%M").to_string(), 16),
                    cell(customer, 20),
                    cell(&format_amount(tx.amount_depix, "DEPIX"), 11),
                    cell(&format_amount(tx.amount_usdt, "USDT"), 11),
                    cell(&tx.wallet_address, 42),
                    tx.status
                ));
            }
        }

        let pending = all
            .iter()
            .filter(|tx| tx.status == TransactionStatus::Pending)
            .count();
        t.line(format!(
            "Showing {} of {} swaps, {} pending",
            rows.len(),
            all.len(),
            pending
        ));
        Ok(())
    }

    async fn display_dialog(&self, dialog: &Dialog<TransactionAction>) -> Result<()> {
        render_dialog(&self.terminal, dialog);
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}
