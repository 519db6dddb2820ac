use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Which backend implementation the application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Rest,
    Memory,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Backend implementation, `rest` or `memory`
    pub backend: BackendKind,

    /// Base URL of the hosted backend project
    #[serde(default)]
    pub supabase_url: String,

    /// Public (anon) API key of the backend project
    #[serde(default)]
    pub supabase_anon_key: String,

    /// URL for price API
    pub price_api_url: String,

    /// Ticker symbol of the USDT/BRL pair
    pub price_symbol: String,

    /// Seconds between quote refreshes
    pub quote_refresh_secs: u64,

    /// Rate shown until the first quote arrives
    pub fallback_rate: Decimal,

    /// Spread used when the `spread` setting is missing
    pub default_spread: Decimal,

    /// Where the signed-in session is persisted between runs
    pub session_file: String,
}

impl AppConfig {
    /// Loads configuration from defaults, an optional `atlas-swap.toml`
    /// and `ATLAS_*` environment variables, in that order.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("backend", "rest")?
            .set_default("price_api_url", "https://api.binance.com/api/v3")?
            .set_default("price_symbol", "USDTBRL")?
            .set_default("quote_refresh_secs", 30)?
            .set_default("fallback_rate", "5.26")?
            .set_default("default_spread", "0.05")?
            .set_default("session_file", ".atlas-session.json")?
            .add_source(config::File::with_name("atlas-swap").required(false))
            .add_source(config::Environment::with_prefix("ATLAS"))
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backend == BackendKind::Rest {
            if self.supabase_url.is_empty() {
                anyhow::bail!("ATLAS_SUPABASE_URL must be set when using the rest backend");
            }
            if self.supabase_anon_key.is_empty() {
                anyhow::bail!("ATLAS_SUPABASE_ANON_KEY must be set when using the rest backend");
            }
        }
        if self.quote_refresh_secs == 0 {
            anyhow::bail!("ATLAS_QUOTE_REFRESH_SECS must be greater than zero");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            price_api_url: "https://api.binance.com/api/v3".to_string(),
            price_symbol: "USDTBRL".to_string(),
            quote_refresh_secs: 30,
            fallback_rate: Decimal::new(526, 2),
            default_spread: Decimal::new(5, 2),
            session_file: ".atlas-session.json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_backend_requires_credentials() {
        let config = AppConfig {
            backend: BackendKind::Rest,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            backend: BackendKind::Rest,
            supabase_url: "https://project.supabase.co".to_string(),
            supabase_anon_key: "anon".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
