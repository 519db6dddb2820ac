use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::interactor::settings_interactor::SystemSettings;
use crate::presenter::settings_presenter::SettingsDraft;
use crate::utils::format_amount;
use crate::view::terminal::Terminal;

#[async_trait]
pub trait SettingsView: Send + Sync {
    async fn display_settings(&self, settings: &SystemSettings, draft: &SettingsDraft)
        -> Result<()>;
    async fn display_saved(&self) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalSettingsView {
    terminal: Terminal,
}

impl TerminalSettingsView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl SettingsView for TerminalSettingsView {
    async fn display_settings(
        &self,
        settings: &SystemSettings,
        draft: &SettingsDraft,
    ) -> Result<()> {
        let t = &self.terminal;
        t.heading("System settings");
        t.line("Fees (fixed by the platform):");
        t.line(format!(
            "  variable fee:      {}%",
            format_amount(settings.fees.variable_rate * Decimal::ONE_HUNDRED, "PERCENT")
        ));
        t.line(format!(
            "  fixed fee:         {} DePiX below {} DePiX",
            format_amount(settings.fees.fixed_fee, "DEPIX"),
            format_amount(settings.fees.fixed_fee_threshold, "DEPIX")
        ));
        t.blank();
        t.line("Editable:");
        t.line(format!("  spread:   {}", draft.spread_text));
        t.line(format!("  whatsapp: {}", draft.whatsapp));
        t.line(format!("  telegram: {}", draft.telegram));
        t.line("Use `set <spread|whatsapp|telegram> <value>`, then `save`.");
        Ok(())
    }

    async fn display_saved(&self) -> Result<()> {
        self.terminal.line("Settings saved.");
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}
