use anyhow::Result;
use async_trait::async_trait;

use crate::entity::{AdminStats, ClientStats, WelcomeSummary};
use crate::utils::format_amount;
use crate::view::terminal::{cell, Terminal};

#[async_trait]
pub trait DashboardView: Send + Sync {
    async fn display_client_dashboard(
        &self,
        stats: Option<&ClientStats>,
        welcome: Option<&WelcomeSummary>,
    ) -> Result<()>;
    async fn display_admin_dashboard(&self, stats: &AdminStats) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalDashboardView {
    terminal: Terminal,
}

impl TerminalDashboardView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl DashboardView for TerminalDashboardView {
    async fn display_client_dashboard(
        &self,
        stats: Option<&ClientStats>,
        welcome: Option<&WelcomeSummary>,
    ) -> Result<()> {
        let t = &self.terminal;
        t.heading("Dashboard");

        if let Some(welcome) = welcome {
            t.line(format!("Welcome back, {}!", welcome.first_name));
            t.line(format!(
                "You have swapped {} DePiX so far.",
                format_amount(welcome.volume, "DEPIX")
            ));
            t.blank();
        }

        match stats {
            Some(stats) => {
                t.line(format!("Total swaps:      {}", stats.total));
                t.line(format!("Completed:        {}", stats.completed));
                t.line(format!("Pending:          {}", stats.pending));
                t.line(format!(
                    "Completed volume: {} DePiX",
                    format_amount(stats.volume, "DEPIX")
                ));
            }
            None => t.line("Statistics are unavailable right now."),
        }
        t.blank();
        t.line("Type `go new-transaction` to start a swap.");
        Ok(())
    }

    async fn display_admin_dashboard(&self, stats: &AdminStats) -> Result<()> {
        let t = &self.terminal;
        t.heading("Overview");
        t.line(format!("Customers:            {}", stats.total_customers));
        t.line(format!("Pending swaps:        {}", stats.pending_swaps));
        t.line(format!(
            "Volume this month:    {} DePiX",
            format_amount(stats.monthly_volume, "DEPIX")
        ));
        t.line(format!(
            "Estimated fees:       {} DePiX",
            format_amount(stats.estimated_fees, "DEPIX")
        ));
        t.blank();
        t.line("Recent transactions:");
        if stats.recent.is_empty() {
            t.line("  none yet");
        }
        for tx in &stats.recent {
            let customer = tx
                .customer
                .as_ref()
                .and_then(|c| c.full_name.as_deref())
                .unwrap_or("-");
            t.line(format!(
                "  {} {} {} DePiX  {}",
                cell(&tx.id, 9),
                cell(customer, 20),
                cell(&format_amount(tx.amount_depix, "DEPIX"), 10),
                tx.status
            ));
        }
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}
