use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

// Validate an EVM (Polygon) wallet address
pub fn validate_wallet_address(address: &str) -> bool {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
    }

    RE.is_match(address)
}

// Parse a typed amount; anything unparseable counts as zero
pub fn parse_amount(input: &str) -> Decimal {
    Decimal::from_str(input.trim()).unwrap_or(Decimal::ZERO)
}

// Format amount with appropriate precision
pub fn format_amount(amount: Decimal, token: &str) -> String {
    match token.to_uppercase().as_str() {
        "RATE" => format!("{:.4}", amount),
        _ => format!("{:.2}", amount),
    }
}

// Shorten address for display
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }

    let start: String = chars[..5].iter().collect();
    let end: String = chars[chars.len() - 4..].iter().collect();

    format!("{}...{}", start, end)
}

// Brazilian phone layout: (DD) DDDDD-DDDD or (DD) DDDD-DDDD
pub fn format_whatsapp(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return "---".to_string();
    };

    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => value.to_string(),
    }
}

// Case-insensitive substring match on an optional field
pub fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

// Parse a YYYY-MM-DD date typed by the user
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{}', expected YYYY-MM-DD", input.trim()))
}

/// Inclusive calendar-date range; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Sets the first day from user input; an empty input removes the bound.
    pub fn set_start(&mut self, input: &str) -> Result<()> {
        self.start = parse_optional_date(input)?;
        Ok(())
    }

    /// Sets the last day from user input; an empty input removes the bound.
    pub fn set_end(&mut self, input: &str) -> Result<()> {
        self.end = parse_optional_date(input)?;
        Ok(())
    }
}

fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(input).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn wallet_validation() {
        assert!(validate_wallet_address("0x52908400098527886E0F7030069857D2E4169EE7"));
        assert!(validate_wallet_address("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd"));
        // 39 and 41 hex characters
        assert!(!validate_wallet_address("0x52908400098527886E0F7030069857D2E4169EE"));
        assert!(!validate_wallet_address("0x52908400098527886E0F7030069857D2E4169EE77"));
        assert!(!validate_wallet_address("0x52908400098527886E0F7030069857D2E4169EEG"));
        assert!(!validate_wallet_address("52908400098527886E0F7030069857D2E4169EE7aa"));
        assert!(!validate_wallet_address(" 0x52908400098527886E0F7030069857D2E4169EE7"));
        assert!(!validate_wallet_address(""));
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount("50"), dec!(50));
        assert_eq!(parse_amount(" 12.5 "), dec!(12.5));
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
    }

    #[test]
    fn whatsapp_formatting() {
        assert_eq!(format_whatsapp(Some("11987654321")), "(11) 98765-4321");
        assert_eq!(format_whatsapp(Some("+55 (11) 3456-7890")), "+55 (11) 3456-7890");
        assert_eq!(format_whatsapp(Some("1134567890")), "(11) 3456-7890");
        assert_eq!(format_whatsapp(None), "---");
        assert_eq!(format_whatsapp(Some("")), "---");
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange {
            start: Some(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            end: Some(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()),
        };
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 10, 15, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap()));
        assert!(DateRange::default().contains(Utc::now()));
    }

    #[test]
    fn date_bounds_from_input() {
        let mut range = DateRange::default();
        range.set_start("2026-10-01").unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 10, 1));
        assert!(range.set_end("01/10/2026").is_err());
        assert_eq!(range.end, None);
        range.set_start(" ").unwrap();
        assert!(range.is_open());
    }

    #[test]
    fn shortens_long_addresses() {
        assert_eq!(
            shorten_address("0x52908400098527886E0F7030069857D2E4169EE7"),
            "0x529...9EE7"
        );
        assert_eq!(shorten_address("0x1234"), "0x1234");
    }

    #[test]
    fn shortens_multibyte_addresses_by_character() {
        assert_eq!(shorten_address("0xçççççççççç"), "0xççç...çççç");
        assert_eq!(shorten_address("0xççç"), "0xççç");
    }
}
