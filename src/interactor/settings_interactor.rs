use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::info;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

use super::quote_interactor::spread_from_value;
use crate::entity::{
    FeeSchedule, Setting, SupportLinks, SETTING_SPREAD, SETTING_SUPPORT_TELEGRAM,
    SETTING_SUPPORT_WHATSAPP,
};
use crate::supabase::SettingsRepository;

/// Global parameters edited from the admin settings screen
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSettings {
    pub spread: Decimal,
    pub support: SupportLinks,
    /// Displayed only; the quote engine uses the built-in schedule
    pub fees: FeeSchedule,
}

/// Parses spread input as typed by an administrator.
pub fn parse_spread(text: &str) -> Result<Decimal> {
    let spread = Decimal::from_str(text.trim().replace(',', ".").as_str())
        .map_err(|_| anyhow!("Invalid spread: {}", text.trim()))?;
    if spread.is_sign_negative() {
        return Err(anyhow!("Spread cannot be negative"));
    }
    Ok(spread)
}

#[async_trait]
pub trait SettingsInteractor: Send + Sync {
    async fn load_settings(&self) -> Result<SystemSettings>;
    async fn save_settings(&self, settings: &SystemSettings) -> Result<()>;
    async fn support_links(&self) -> Result<SupportLinks>;
}

pub struct SettingsInteractorImpl {
    settings: Arc<dyn SettingsRepository>,
    default_spread: Decimal,
    fees: FeeSchedule,
}

impl SettingsInteractorImpl {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        default_spread: Decimal,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            settings,
            default_spread,
            fees,
        }
    }
}

#[async_trait]
impl SettingsInteractor for SettingsInteractorImpl {
    async fn load_settings(&self) -> Result<SystemSettings> {
        let rows = self
            .settings
            .fetch_settings(None)
            .await
            .context("Failed to load settings")?;

        let spread = rows
            .iter()
            .find(|s| s.key == SETTING_SPREAD)
            .and_then(|s| spread_from_value(&s.value))
            .unwrap_or(self.default_spread);

        Ok(SystemSettings {
            spread,
            support: SupportLinks::from_settings(&rows),
            fees: self.fees.clone(),
        })
    }

    async fn save_settings(&self, settings: &SystemSettings) -> Result<()> {
        // Stored as a JSON number so the quote engine reads it without parsing text
        let spread: Value = serde_json::from_str(&settings.spread.normalize().to_string())
            .unwrap_or_else(|_| json!(settings.spread.to_string()));

        let rows = vec![
            Setting::new(SETTING_SPREAD, spread),
            Setting::new(
                SETTING_SUPPORT_WHATSAPP,
                Value::String(settings.support.whatsapp.trim().to_string()),
            ),
            Setting::new(
                SETTING_SUPPORT_TELEGRAM,
                Value::String(settings.support.telegram.trim().to_string()),
            ),
        ];

        self.settings
            .upsert_settings(&rows)
            .await
            .context("Failed to save settings")?;
        info!("Settings saved, spread is now {}", settings.spread);
        Ok(())
    }

    async fn support_links(&self) -> Result<SupportLinks> {
        let keys = [SETTING_SUPPORT_WHATSAPP, SETTING_SUPPORT_TELEGRAM];
        let rows = self
            .settings
            .fetch_settings(Some(&keys[..]))
            .await
            .context("Failed to load support contacts")?;
        Ok(SupportLinks::from_settings(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::MemoryBackend;
    use rust_decimal_macros::dec;

    fn interactor(backend: &Arc<MemoryBackend>) -> SettingsInteractorImpl {
        SettingsInteractorImpl::new(backend.clone(), dec!(0.05), FeeSchedule::default())
    }

    #[test]
    fn spread_input_accepts_comma_decimal() {
        assert_eq!(parse_spread(" 0,07 ").unwrap(), dec!(0.07));
        assert!(parse_spread("abc").is_err());
        assert!(parse_spread("-0.01").is_err());
    }

    #[tokio::test]
    async fn missing_spread_uses_default() {
        let backend = Arc::new(MemoryBackend::new());
        let settings = interactor(&backend).load_settings().await.unwrap();
        assert_eq!(settings.spread, dec!(0.05));
        assert!(settings.support.is_empty());
    }

    #[tokio::test]
    async fn save_stores_spread_as_number() {
        let backend = Arc::new(MemoryBackend::demo());
        let interactor = interactor(&backend);
        let mut settings = interactor.load_settings().await.unwrap();
        settings.spread = dec!(0.08);
        settings.support.telegram = "https://t.me/atlas_help ".to_string();

        interactor.save_settings(&settings).await.unwrap();

        assert_eq!(backend.setting(SETTING_SPREAD).unwrap().value, json!(0.08));
        let reloaded = interactor.load_settings().await.unwrap();
        assert_eq!(reloaded.spread, dec!(0.08));
        assert_eq!(reloaded.support.telegram, "https://t.me/atlas_help");
    }

    #[tokio::test]
    async fn failed_save_is_reported() {
        let backend = Arc::new(MemoryBackend::demo());
        backend.fail_writes(true);
        let interactor = interactor(&backend);
        let settings = SystemSettings {
            spread: dec!(0.1),
            support: SupportLinks::default(),
            fees: FeeSchedule::default(),
        };
        assert!(interactor.save_settings(&settings).await.is_err());
        assert_eq!(backend.setting(SETTING_SPREAD).unwrap().value, json!(0.05));
    }
}
