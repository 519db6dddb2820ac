use anyhow::Result;
use async_trait::async_trait;

use crate::entity::{Identity, ViewId};
use crate::router::MenuEntry;
use crate::view::terminal::{cell, Terminal};

#[async_trait]
pub trait ShellView: Send + Sync {
    async fn display_menu(
        &self,
        identity: &Identity,
        entries: &[MenuEntry],
        current: ViewId,
    ) -> Result<()>;
    async fn display_help(&self, commands: &[(&'static str, &'static str)]) -> Result<()>;
    async fn display_placeholder(&self, view: ViewId) -> Result<()>;
    async fn display_message(&self, message: &str) -> Result<()>;
}

pub struct TerminalShellView {
    terminal: Terminal,
}

impl TerminalShellView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl ShellView for TerminalShellView {
    async fn display_menu(
        &self,
        identity: &Identity,
        entries: &[MenuEntry],
        current: ViewId,
    ) -> Result<()> {
        let t = &self.terminal;
        t.heading(&format!(
            "{} ({})",
            identity.full_name.as_deref().unwrap_or("User"),
            identity.role.label()
        ));
        for entry in entries {
            let marker = if entry.view == current { ">" } else { " " };
            t.line(format!(
                "{} {} go {}",
                marker,
                cell(entry.label, 20),
                entry.view
            ));
        }
        Ok(())
    }

    async fn display_help(&self, commands: &[(&'static str, &'static str)]) -> Result<()> {
        let t = &self.terminal;
        t.heading("Commands");
        for (usage, description) in commands {
            t.line(format!("  {} {}", cell(usage, 32), description));
        }
        Ok(())
    }

    async fn display_placeholder(&self, view: ViewId) -> Result<()> {
        let t = &self.terminal;
        t.heading(view.as_str());
        t.line("This section is not available in the terminal client yet.");
        Ok(())
    }

    async fn display_message(&self, message: &str) -> Result<()> {
        self.terminal.line(message);
        Ok(())
    }
}
