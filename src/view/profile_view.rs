use anyhow::Result;
use async_trait::async_trait;

use crate::entity::Identity;
use crate::interactor::profile_interactor::ProfileForm;
use crate::utils::format_whatsapp;
use crate::view::terminal::Terminal;

#[async_trait]
pub trait ProfileView: Send + Sync {
    async fn display_profile(&self, identity: &Identity, form: &ProfileForm) -> Result<()>;
    async fn display_saved(&self) -> Result<()>;
    async fn display_error(&self, message: String) -> Result<()>;
}

pub struct TerminalProfileView {
    terminal: Terminal,
}

impl TerminalProfileView {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl ProfileView for TerminalProfileView {
    async fn display_profile(&self, identity: &Identity, form: &ProfileForm) -> Result<()> {
        let t = &self.terminal;
        t.heading("My profile");
        t.line(format!(
            "email:    {} (cannot be changed)",
            identity.email.as_deref().unwrap_or("-")
        ));
        t.line(format!("role:     {}", identity.role.label()));
        t.line(format!("name:     {}", form.full_name));
        t.line(format!(
            "whatsapp: {}",
            format_whatsapp(Some(form.whatsapp.as_str()))
        ));
        t.line(format!("telegram: {}", form.telegram));
        t.line("Use `set <name|whatsapp|telegram> <value>`, then `save`.");
        Ok(())
    }

    async fn display_saved(&self) -> Result<()> {
        self.terminal.line("Profile updated.");
        Ok(())
    }

    async fn display_error(&self, message: String) -> Result<()> {
        self.terminal.line(format!("Error: {}", message));
        Ok(())
    }
}
