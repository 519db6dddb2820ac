use anyhow::Result;
use async_trait::async_trait;
use log::{error, warn};
use std::sync::Arc;

use crate::access::can_administer;
use crate::entity::{Identity, SupportLinks};
use crate::interactor::settings_interactor::{parse_spread, SettingsInteractor, SystemSettings};
use crate::presenter::customers_presenter::ADMIN_REQUIRED;
use crate::view::settings_view::SettingsView;

/// Values as typed, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDraft {
    pub spread_text: String,
    pub whatsapp: String,
    pub telegram: String,
}

impl SettingsDraft {
    fn from_settings(settings: &SystemSettings) -> Self {
        Self {
            spread_text: settings.spread.to_string(),
            whatsapp: settings.support.whatsapp.clone(),
            telegram: settings.support.telegram.clone(),
        }
    }
}

#[async_trait]
pub trait SettingsPresenter: Send + Sync {
    async fn mount(&mut self) -> Result<()>;
    async fn set_field(&mut self, field: &str, value: &str) -> Result<()>;
    async fn save(&mut self) -> Result<()>;
    fn settings(&self) -> Option<&SystemSettings>;
    fn draft(&self) -> &SettingsDraft;
}

pub struct SettingsPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    viewer: Identity,
    settings: Option<SystemSettings>,
    draft: SettingsDraft,
}

impl<I, V> SettingsPresenterImpl<I, V>
where
    I: SettingsInteractor,
    V: SettingsView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, viewer: Identity) -> Self {
        Self {
            interactor,
            view,
            viewer,
            settings: None,
            draft: SettingsDraft::default(),
        }
    }

    async fn render(&self) -> Result<()> {
        match &self.settings {
            Some(settings) => self.view.display_settings(settings, &self.draft).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<I, V> SettingsPresenter for SettingsPresenterImpl<I, V>
where
    I: SettingsInteractor + Send + Sync,
    V: SettingsView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        if !can_administer(Some(&self.viewer)) {
            warn!("{} tried to open the system settings", self.viewer.id);
            return self.view.display_error(ADMIN_REQUIRED.to_string()).await;
        }

        match self.interactor.load_settings().await {
            Ok(settings) => {
                self.draft = SettingsDraft::from_settings(&settings);
                self.settings = Some(settings);
                self.render().await
            }
            Err(e) => {
                error!("Failed to load settings: {:#}", e);
                self.view
                    .display_error("Could not load settings.".to_string())
                    .await
            }
        }
    }

    async fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        let value = value.trim().to_string();
        match field.to_lowercase().as_str() {
            "spread" => self.draft.spread_text = value,
            "whatsapp" | "support_whatsapp" => self.draft.whatsapp = value,
            "telegram" | "support_telegram" => self.draft.telegram = value,
            other => {
                return self
                    .view
                    .display_error(format!(
                        "Unknown setting '{}'. Settings: spread, whatsapp, telegram.",
                        other
                    ))
                    .await
            }
        }
        self.render().await
    }

    async fn save(&mut self) -> Result<()> {
        let Some(current) = self.settings.clone() else {
            return self.view.display_error(ADMIN_REQUIRED.to_string()).await;
        };
        let spread = match parse_spread(&self.draft.spread_text) {
            Ok(spread) => spread,
            Err(e) => return self.view.display_error(e.to_string()).await,
        };

        let updated = SystemSettings {
            spread,
            support: SupportLinks {
                whatsapp: self.draft.whatsapp.clone(),
                telegram: self.draft.telegram.clone(),
            },
            fees: current.fees,
        };

        match self.interactor.save_settings(&updated).await {
            Ok(()) => {
                self.draft = SettingsDraft::from_settings(&updated);
                self.settings = Some(updated);
                self.view.display_saved().await
            }
            Err(e) => {
                error!("Failed to save settings: {:#}", e);
                self.view
                    .display_error(format!("Error while saving: {}", e))
                    .await
            }
        }
    }

    fn settings(&self) -> Option<&SystemSettings> {
        self.settings.as_ref()
    }

    fn draft(&self) -> &SettingsDraft {
        &self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FeeSchedule, Role, SETTING_SPREAD};
    use crate::interactor::settings_interactor::SettingsInteractorImpl;
    use crate::supabase::MemoryBackend;
    use crate::view::settings_view::TerminalSettingsView;
    use crate::view::terminal::Terminal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn presenter(
        backend: &Arc<MemoryBackend>,
        role: Role,
        terminal: &Terminal,
    ) -> SettingsPresenterImpl<SettingsInteractorImpl, TerminalSettingsView> {
        let id = backend.add_account("someone@atlas.local", "pw", "Someone", role);
        SettingsPresenterImpl::new(
            Arc::new(SettingsInteractorImpl::new(
                backend.clone(),
                dec!(0.05),
                FeeSchedule::default(),
            )),
            Arc::new(TerminalSettingsView::new(terminal.clone())),
            backend.profile(id).unwrap(),
        )
    }

    #[tokio::test]
    async fn saves_edited_spread() {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, Role::Admin, &terminal);

        presenter.mount().await.unwrap();
        assert_eq!(presenter.draft().spread_text, "0.05");
        assert!(terminal.contains("variable fee:      1.00%"));

        presenter.set_field("spread", "0.07").await.unwrap();
        presenter.save().await.unwrap();

        assert_eq!(backend.setting(SETTING_SPREAD).unwrap().value, json!(0.07));
        assert_eq!(presenter.settings().unwrap().spread, dec!(0.07));
        assert!(terminal.contains("Settings saved."));
    }

    #[tokio::test]
    async fn invalid_spread_never_reaches_backend() {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, Role::Admin, &terminal);

        presenter.mount().await.unwrap();
        presenter.set_field("spread", "five cents").await.unwrap();
        presenter.save().await.unwrap();

        assert_eq!(backend.setting(SETTING_SPREAD).unwrap().value, json!(0.05));
        assert!(terminal.contains("Invalid spread"));
    }

    #[tokio::test]
    async fn clients_are_turned_away() {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, Role::Client, &terminal);

        presenter.mount().await.unwrap();
        assert!(presenter.settings().is_none());
        assert!(terminal.contains(ADMIN_REQUIRED));
    }
}
