use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::entity::{FeeSchedule, Quote, SETTING_SPREAD};
use crate::market::PriceService;
use crate::supabase::SettingsRepository;

/// Decimal places of the source currency
const CURRENCY_DP: u32 = 2;
/// Decimal places kept for USDT amounts
const USDT_DP: u32 = 6;

/// Computes fees and the USDT amount for `amount` DePiX at `effective_rate`.
pub fn calculate_quote(amount: Decimal, effective_rate: Decimal, fees: &FeeSchedule) -> Quote {
    let amount = amount.max(Decimal::ZERO);

    let variable_fee = (amount * fees.variable_rate)
        .round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero);

    let fixed_fee = if amount > Decimal::ZERO && amount < fees.fixed_fee_threshold {
        fees.fixed_fee
    } else {
        Decimal::ZERO
    };

    let net_amount = (amount - variable_fee - fixed_fee).max(Decimal::ZERO);

    let destination_amount = if effective_rate > Decimal::ZERO {
        (net_amount / effective_rate)
            .round_dp_with_strategy(USDT_DP, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    Quote {
        amount,
        variable_fee,
        fixed_fee,
        net_amount,
        effective_rate,
        destination_amount,
    }
}

/// Reads a spread stored either as a JSON number or as text.
pub fn spread_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim().trim_matches('"')).ok(),
        _ => None,
    }
}

#[async_trait]
pub trait QuoteInteractor: Send + Sync {
    /// Market rate plus the configured spread
    async fn effective_rate(&self) -> Result<Decimal>;
}

pub struct QuoteInteractorImpl {
    price_service: Arc<dyn PriceService>,
    settings: Arc<dyn SettingsRepository>,
    symbol: String,
    default_spread: Decimal,
}

impl QuoteInteractorImpl {
    pub fn new(
        price_service: Arc<dyn PriceService>,
        settings: Arc<dyn SettingsRepository>,
        symbol: &str,
        default_spread: Decimal,
    ) -> Self {
        Self {
            price_service,
            settings,
            symbol: symbol.to_string(),
            default_spread,
        }
    }

    async fn spread(&self) -> Decimal {
        match self.settings.fetch_setting(SETTING_SPREAD).await {
            Ok(Some(setting)) => spread_from_value(&setting.value).unwrap_or_else(|| {
                warn!("Unreadable spread setting {}, using default", setting.value);
                self.default_spread
            }),
            Ok(None) => self.default_spread,
            Err(e) => {
                warn!("Failed to read spread setting, using default: {}", e);
                self.default_spread
            }
        }
    }
}

#[async_trait]
impl QuoteInteractor for QuoteInteractorImpl {
    async fn effective_rate(&self) -> Result<Decimal> {
        let base = self.price_service.get_price(&self.symbol).await?;
        Ok(base + self.spread().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::MemoryBackend;
    use rust_decimal_macros::dec;
    use serde_json::json;

    struct FixedPrice(Decimal);

    #[async_trait]
    impl PriceService for FixedPrice {
        async fn get_price(&self, _symbol: &str) -> Result<Decimal> {
            Ok(self.0)
        }
    }

    fn fees() -> FeeSchedule {
        FeeSchedule::default()
    }

    #[test]
    fn small_amount_pays_fixed_fee() {
        let quote = calculate_quote(dec!(50), dec!(5.26), &fees());
        assert_eq!(quote.variable_fee, dec!(0.50));
        assert_eq!(quote.fixed_fee, dec!(5.00));
        assert_eq!(quote.net_amount, dec!(44.50));
        assert_eq!(quote.destination_amount.round_dp(2), dec!(8.46));
    }

    #[test]
    fn large_amount_skips_fixed_fee() {
        let quote = calculate_quote(dec!(500), dec!(5.26), &fees());
        assert_eq!(quote.variable_fee, dec!(5.00));
        assert_eq!(quote.fixed_fee, Decimal::ZERO);
        assert_eq!(quote.net_amount, dec!(495.00));
        assert_eq!(quote.destination_amount.round_dp(2), dec!(94.11));
    }

    #[test]
    fn fixed_fee_boundaries() {
        assert_eq!(calculate_quote(dec!(0), dec!(5), &fees()).fixed_fee, Decimal::ZERO);
        assert_eq!(calculate_quote(dec!(0.01), dec!(5), &fees()).fixed_fee, dec!(5));
        assert_eq!(calculate_quote(dec!(99.99), dec!(5), &fees()).fixed_fee, dec!(5));
        assert_eq!(calculate_quote(dec!(100), dec!(5), &fees()).fixed_fee, Decimal::ZERO);
        assert_eq!(calculate_quote(dec!(-20), dec!(5), &fees()).fixed_fee, Decimal::ZERO);
    }

    #[test]
    fn net_amount_never_negative() {
        let quote = calculate_quote(dec!(3), dec!(5.26), &fees());
        assert_eq!(quote.net_amount, Decimal::ZERO);
        assert_eq!(quote.destination_amount, Decimal::ZERO);
    }

    #[test]
    fn variable_fee_rounds_to_cents() {
        let quote = calculate_quote(dec!(123.45), dec!(5.26), &fees());
        assert_eq!(quote.variable_fee, dec!(1.23));
        let quote = calculate_quote(dec!(150.50), dec!(5.26), &fees());
        assert_eq!(quote.variable_fee, dec!(1.51));
    }

    #[test]
    fn destination_decreases_as_spread_grows() {
        let base = dec!(5.21);
        let mut previous = None;
        for spread in [dec!(0), dec!(0.05), dec!(0.10), dec!(0.50), dec!(1)] {
            let destination = calculate_quote(dec!(500), base + spread, &fees()).destination_amount;
            if let Some(prev) = previous {
                assert!(destination < prev);
            }
            previous = Some(destination);
        }
    }

    #[test]
    fn zero_rate_yields_nothing() {
        assert_eq!(
            calculate_quote(dec!(500), Decimal::ZERO, &fees()).destination_amount,
            Decimal::ZERO
        );
    }

    #[test]
    fn spread_accepts_number_or_text() {
        assert_eq!(spread_from_value(&json!(0.07)), Some(dec!(0.07)));
        assert_eq!(spread_from_value(&json!("0.10")), Some(dec!(0.10)));
        assert_eq!(spread_from_value(&json!(null)), None);
    }

    #[tokio::test]
    async fn effective_rate_adds_configured_spread() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_setting(SETTING_SPREAD, json!(0.08));
        let interactor = QuoteInteractorImpl::new(
            Arc::new(FixedPrice(dec!(5.21))),
            backend,
            "USDTBRL",
            dec!(0.05),
        );
        assert_eq!(interactor.effective_rate().await.unwrap(), dec!(5.29));
    }

    #[tokio::test]
    async fn effective_rate_defaults_spread() {
        let backend = Arc::new(MemoryBackend::new());
        let interactor = QuoteInteractorImpl::new(
            Arc::new(FixedPrice(dec!(5.21))),
            backend.clone(),
            "USDTBRL",
            dec!(0.05),
        );
        assert_eq!(interactor.effective_rate().await.unwrap(), dec!(5.26));

        backend.fail_reads(true);
        assert_eq!(interactor.effective_rate().await.unwrap(), dec!(5.26));
    }
}
