use rust_decimal::Decimal;

/// Fee parameters applied to every swap.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSchedule {
    /// Fraction of the source amount charged as variable fee
    pub variable_rate: Decimal,
    /// Flat fee charged below the threshold
    pub fixed_fee: Decimal,
    /// Amounts at or above this value pay no flat fee
    pub fixed_fee_threshold: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            variable_rate: Decimal::new(1, 2),
            fixed_fee: Decimal::new(500, 2),
            fixed_fee_threshold: Decimal::new(100, 0),
        }
    }
}

/// Breakdown of a single DePiX to USDT conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub amount: Decimal,
    pub variable_fee: Decimal,
    pub fixed_fee: Decimal,
    pub net_amount: Decimal,
    pub effective_rate: Decimal,
    pub destination_amount: Decimal,
}

/// Latest effective rate as published by the quote ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub loading: bool,
    pub rate: Decimal,
}

impl RateSnapshot {
    pub fn loading(rate: Decimal) -> Self {
        Self {
            loading: true,
            rate,
        }
    }

    pub fn ready(rate: Decimal) -> Self {
        Self {
            loading: false,
            rate,
        }
    }

    /// How much USDT one DePiX buys at this rate.
    pub fn inverse_rate(&self) -> Decimal {
        if self.rate.is_zero() {
            Decimal::ZERO
        } else {
            (Decimal::ONE / self.rate).round_dp(4)
        }
    }
}
