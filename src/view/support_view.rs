use anyhow::Result;
use async_trait::async_trait;

use crate::entity::SupportLinks;
use crate::view::terminal::Terminal;

#[async_trait]
pub trait SupportView: Send + Sync {
    async fn display_support(&self, links: &SupportLinks) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalSupportView {
    terminal: Terminal,
}

impl TerminalSupportView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl SupportView for TerminalSupportView {
    async fn display_support(&self, links: &SupportLinks) -> Result<()> {
        let t = &self.terminal;
        t.heading("Support");
        t.line("Our team answers on business days.");
        let or_dash = |value: &str| {
            if value.is_empty() {
                "not configured".to_string()
            } else {
                value.to_string()
            }
        };
        t.line(format!("WhatsApp: {}", or_dash(&links.whatsapp)));
        t.line(format!("Telegram: {}", or_dash(&links.telegram)));
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}
