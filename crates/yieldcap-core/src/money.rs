//! Conversions between decimal amounts and integer cents.

use serde_json::Value;

use crate::error::{LedgerError, Result};

/// Cents in one currency unit.
pub const CENTS_PER_UNIT: i64 = 100;

/// Denominator for rates expressed in basis points.
pub const BPS_DENOMINATOR: i64 = 10_000;

/// Largest amount (in units) accepted from the outside world before conversion.
const MAX_INPUT_UNITS: f64 = 1.0e13;

/// Parse a JSON amount (number or numeric string) into cents.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` for non-numeric, non-finite, or negative values.
pub fn parse_amount(value: &Value) -> Result<i64> {
    let units = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| LedgerError::InvalidAmount(n.to_string()))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| LedgerError::InvalidAmount(format!("not a number: {s:?}")))?,
        other => {
            return Err(LedgerError::InvalidAmount(format!(
                "expected a number, got {other}"
            )))
        }
    };

    units_to_cents(units)
}

/// Convert a decimal amount to cents, rounding half away from zero.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` for non-finite, negative, or oversized values.
pub fn units_to_cents(units: f64) -> Result<i64> {
    if !units.is_finite() {
        return Err(LedgerError::InvalidAmount("amount must be finite".into()));
    }
    if units < 0.0 {
        return Err(LedgerError::InvalidAmount("amount must not be negative".into()));
    }
    if units > MAX_INPUT_UNITS {
        return Err(LedgerError::InvalidAmount("amount is too large".into()));
    }

    // Bounded above, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation)]
    let cents = (units * 100.0).round() as i64;
    Ok(cents)
}

/// Convert cents to a decimal amount for display.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cents_to_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format cents as a fixed two-place decimal string.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Apply a rate in basis points, rounding half up to the nearest cent.
#[must_use]
pub fn apply_bps(cents: i64, bps: i64) -> i64 {
    let scaled = i128::from(cents) * i128::from(bps);
    let denominator = i128::from(BPS_DENOMINATOR);
    let rounded = if scaled >= 0 {
        (scaled + denominator / 2) / denominator
    } else {
        (scaled - denominator / 2) / denominator
    };
    i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(parse_amount(&json!(100)).unwrap(), 10_000);
        assert_eq!(parse_amount(&json!(250.5)).unwrap(), 25_050);
        assert_eq!(parse_amount(&json!("199.99")).unwrap(), 19_999);
        assert_eq!(parse_amount(&json!(" 100 ")).unwrap(), 10_000);
    }

    #[test]
    fn rejects_non_numeric_amounts() {
        assert!(parse_amount(&json!("abc")).is_err());
        assert!(parse_amount(&json!(null)).is_err());
        assert!(parse_amount(&json!(true)).is_err());
        assert!(parse_amount(&json!("NaN")).is_err());
        assert!(parse_amount(&json!("inf")).is_err());
        assert!(parse_amount(&json!(-5)).is_err());
    }

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(units_to_cents(100.004).unwrap(), 10_000);
        assert_eq!(units_to_cents(100.006).unwrap(), 10_001);
    }

    #[test]
    fn formats_two_places() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(1_000), "10.00");
        assert_eq!(format_cents(300_005), "3000.05");
        assert_eq!(format_cents(-250), "-2.50");
    }

    #[test]
    fn basis_points_round_half_up() {
        // 0.6% of 1000.00
        assert_eq!(apply_bps(100_000, 60), 600);
        // 0.6% of 100.01 = 0.60006
        assert_eq!(apply_bps(10_001, 60), 60);
        // 5% of 100.10 = 5.005
        assert_eq!(apply_bps(10_010, 500), 501);
        assert_eq!(apply_bps(0, 500), 0);
    }
}
