use anyhow::Result;
use async_trait::async_trait;

use crate::entity::Quote;
use crate::presenter::new_transaction_presenter::SwapForm;
use crate::utils::format_amount;
use crate::view::terminal::Terminal;

#[async_trait]
pub trait NewTransactionView: Send + Sync {
    async fn display_form(&self, form: &SwapForm, quote: &Quote) -> Result<()>;
    async fn display_success(&self, transaction_id: &str, quote: &Quote) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalNewTransactionView {
    terminal: Terminal,
}

impl TerminalNewTransactionView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl NewTransactionView for TerminalNewTransactionView {
    async fn display_form(&self, form: &SwapForm, quote: &Quote) -> Result<()> {
        let t = &self.terminal;
        t.heading("New swap: DePiX -> USDT (Polygon)");

        let rate = if form.snapshot.loading {
            format!("{} (updating...)", format_amount(form.snapshot.rate, "RATE"))
        } else {
            format_amount(form.snapshot.rate, "RATE")
        };
        t.line(format!("Rate:            1 USDT = {} DePiX", rate));
        t.line(format!(
            "                 1 DePiX = {} USDT",
            format_amount(form.snapshot.inverse_rate(), "RATE")
        ));
        t.blank();
        t.line(format!(
            "Amount (DePiX):  {}",
            if form.amount_text.is_empty() { "-" } else { &form.amount_text }
        ));
        t.line(format!("Variable fee 1%: {}", format_amount(quote.variable_fee, "DEPIX")));
        t.line(format!("Fixed fee:       {}", format_amount(quote.fixed_fee, "DEPIX")));
        t.line(format!("Net amount:      {}", format_amount(quote.net_amount, "DEPIX")));
        t.line(format!(
            "You receive:     {} USDT",
            format_amount(quote.destination_amount, "USDT")
        ));
        t.blank();
        t.line(format!(
            "Wallet:          {}",
            if form.wallet_text.is_empty() { "-" } else { &form.wallet_text }
        ));
        if form.show_wallet_warning() {
            t.line("                 Invalid Polygon address (0x followed by 40 hex characters)");
        }

        if form.submitting {
            t.line("Submitting...");
        } else if form.can_submit() {
            t.line("Ready. Type `submit` to confirm the swap.");
        } else {
            t.line("Fill in `amount <value>` and `wallet <0x...>` to continue.");
        }
        Ok(())
    }

    async fn display_success(&self, transaction_id: &str, quote: &Quote) -> Result<()> {
        let t = &self.terminal;
        t.heading("Swap requested");
        t.line(format!("Transaction {} is pending.", transaction_id));
        t.line(format!(
            "{} DePiX -> {} USDT",
            format_amount(quote.amount, "DEPIX"),
            format_amount(quote.destination_amount, "USDT")
        ));
        t.line("Type `new` to start another swap.");
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}

