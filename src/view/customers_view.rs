use anyhow::Result;
use async_trait::async_trait;

use crate::entity::{AccountStatus, Identity};
use crate::interactor::customer_interactor::CustomerForm;
use crate::modal::Dialog;
use crate::presenter::customers_presenter::CustomerAction;
use crate::utils::format_whatsapp;
use crate::view::terminal::{cell, render_dialog, Terminal};

#[async_trait]
pub trait CustomersView: Send + Sync {
    async fn display_loading(&self) -> Result<()>;
    async fn display_customers(&self, rows: &[&Identity], total: usize, search: &str)
        -> Result<()>;
    async fn display_editor(&self, form: &CustomerForm) -> Result<()>;
    async fn display_dialog(&self, dialog: &Dialog<CustomerAction>) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalCustomersView {
    terminal: Terminal,
}

impl TerminalCustomersView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl CustomersView for TerminalCustomersView {
    async fn display_loading(&self) -> Result<()> {
        self.terminal.line("Loading customers...");
        Ok(())
    }

    async fn display_customers(
        &self,
        rows: &[&Identity],
        total: usize,
        search: &str,
    ) -> Result<()> {
        let t = &self.terminal;
        t.heading("Customers");
        if !search.is_empty() {
            t.line(format!("Filters: search \"{}\"", search));
        }

        if rows.is_empty() {
            t.line("No customers found.");
        } else {
            t.line(format!(
                "#   {} {} {} {} {}",
                cell("NAME", 22),
                cell("EMAIL", 26),
                cell("WHATSAPP", 16),
                cell("ROLE", 14),
                "STATUS"
            ));
            for (index, customer) in rows.iter().enumerate() {
                let status = match customer.status {
                    AccountStatus::Active => "active",
                    AccountStatus::Blocked => "blocked",
                };
                t.line(format!(
                    "{} {} {} {} {} {}",
                    cell(&(index + 1).to_string(), 3),
                    cell(customer.full_name.as_deref().unwrap_or("-"), 22),
                    cell(customer.email.as_deref().unwrap_or("-"), 26),
                    cell(&format_whatsapp(customer.whatsapp.as_deref()), 16),
                    cell(customer.role.label(), 14),
                    status
                ));
            }
        }
        t.line(format!("{} of {} customers", rows.len(), total));
        Ok(())
    }

    async fn display_editor(&self, form: &CustomerForm) -> Result<()> {
        let t = &self.terminal;
        t.heading("Edit customer");
        t.line(format!("name:     {}", form.full_name));
        t.line(format!("email:    {}", form.email));
        t.line(format!("whatsapp: {}", form.whatsapp));
        t.line(format!("telegram: {}", form.telegram));
        t.line("Use `set <field> <value>`, then `save` or `cancel`.");
        Ok(())
    }

    async fn display_dialog(&self, dialog: &Dialog<CustomerAction>) -> Result<()> {
        render_dialog(&self.terminal, dialog);
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}
