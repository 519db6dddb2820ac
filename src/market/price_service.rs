use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::entity::AppError;

// Ticker price response
#[derive(Deserialize)]
struct TickerPrice {
    price: String,
}

// Error body returned by the exchange
#[derive(Deserialize)]
struct ErrorResponse {
    msg: String,
}

/// Source of the market rate for a currency pair
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Current price of one unit of the pair's base asset
    async fn get_price(&self, symbol: &str) -> Result<Decimal>;
}

/// Price service backed by the public Binance ticker endpoint
pub struct BinancePriceService {
    http_client: Client,
    price_api_url: String,
}

impl BinancePriceService {
    pub fn new(price_api_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            price_api_url: price_api_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_ticker(body: &str) -> Result<Decimal> {
        if let Ok(ErrorResponse { msg }) = serde_json::from_str::<ErrorResponse>(body) {
            return Err(AppError::PriceFeed(msg).into());
        }

        let ticker: TickerPrice = serde_json::from_str(body)
            .map_err(|e| anyhow!("Failed to parse ticker response: {}", e))?;
        let price = Decimal::from_str(ticker.price.trim())
            .map_err(|e| anyhow!("Invalid price '{}': {}", ticker.price, e))?;

        if price <= Decimal::ZERO {
            return Err(AppError::PriceFeed(format!("Non-positive price {}", price)).into());
        }

        Ok(price.normalize())
    }
}

#[async_trait]
impl PriceService for BinancePriceService {
    async fn get_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/ticker/price", self.price_api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read ticker response: {}", e))?;

        let price = Self::parse_ticker(&body)?;
        debug!("{} ticker: {}", symbol, price);

        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_ticker_price() {
        let body = r#"{"symbol":"USDTBRL","price":"5.21000000"}"#;
        assert_eq!(BinancePriceService::parse_ticker(body).unwrap(), dec!(5.21));
    }

    #[test]
    fn surfaces_exchange_error() {
        let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        let err = BinancePriceService::parse_ticker(body).unwrap_err();
        assert!(err.to_string().contains("Invalid symbol."));
    }

    #[test]
    fn rejects_zero_price() {
        let body = r#"{"symbol":"USDTBRL","price":"0.00000000"}"#;
        assert!(BinancePriceService::parse_ticker(body).is_err());
    }
}
