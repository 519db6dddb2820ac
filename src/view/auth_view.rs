use anyhow::Result;
use async_trait::async_trait;

use crate::entity::SupportLinks;
use crate::view::terminal::Terminal;

#[async_trait]
pub trait AuthView: Send + Sync {
    async fn display_prompt(&self) -> Result<()>;
    async fn display_error(&self, message: &str, support: Option<&SupportLinks>) -> Result<()>;
    async fn display_signed_in(&self, email: &str) -> Result<()>;
}

pub struct TerminalAuthView {
    terminal: Terminal,
}

impl TerminalAuthView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl AuthView for TerminalAuthView {
    async fn display_prompt(&self) -> Result<()> {
        let t = &self.terminal;
        t.heading("Atlas Swap");
        t.line("Sign in:   login <email> <password>");
        t.line("New here?  register <email> <password> <confirm password> <full name>");
        Ok(())
    }

    async fn display_error(&self, message: &str, support: Option<&SupportLinks>) -> Result<()> {
        let t = &self.terminal;
        t.line(format!("Error: {}", message));
        if let Some(links) = support.filter(|links| !links.is_empty()) {
            t.line("Need help? Contact support:");
            if !links.whatsapp.is_empty() {
                t.line(format!("  WhatsApp: {}", links.whatsapp));
            }
            if !links.telegram.is_empty() {
                t.line(format!("  Telegram: {}", links.telegram));
            }
        }
        Ok(())
    }

    async fn display_signed_in(&self, email: &str) -> Result<()> {
        self.terminal.line(format!("Signed in as {}.", email));
        Ok(())
    }
}
