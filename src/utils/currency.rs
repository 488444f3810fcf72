/// Currency helpers for mission prices and payment amounts.
///
/// Amounts are stored as NUMERIC(12,2) and carried as `BigDecimal`; every
/// amount that leaves this module is rounded half-up to the cent.
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};

pub const CURRENCY_SCALE: i64 = 2;

/// Largest price a NUMERIC(12,2) column accepts.
pub const MAX_AMOUNT: f64 = 9_999_999_999.99;

/// Round half-up to the smallest currency unit.
pub fn round_to_cents(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)
}

/// Convert a JSON number into a cent-rounded decimal. Goes through the
/// shortest decimal representation of the float so `19.99` stays `19.99`.
pub fn amount_from_f64(amount: f64) -> Result<BigDecimal, String> {
    if !amount.is_finite() {
        return Err("Amount must be a finite number".to_string());
    }

    let parsed = BigDecimal::from_str(&amount.to_string())
        .map_err(|_| "Invalid amount format".to_string())?;

    Ok(round_to_cents(&parsed))
}

/// A price is acceptable when it is still strictly positive after rounding.
pub fn is_positive_amount(amount: &BigDecimal) -> bool {
    round_to_cents(amount) > BigDecimal::zero()
}

pub fn parse_fee_rate(raw: &str) -> Result<BigDecimal, String> {
    let rate = BigDecimal::from_str(raw.trim()).map_err(|_| format!("Invalid fee rate: {}", raw))?;

    if rate < BigDecimal::zero() || rate >= BigDecimal::from(1) {
        return Err(format!("Fee rate must be in [0, 1): {}", raw));
    }

    Ok(rate)
}
