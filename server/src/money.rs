//! Money helpers
//!
//! Amounts are stored and transported in major currency units as `f64`;
//! every computation goes through `rust_decimal` so float drift never
//! reaches a stored total. The payment gateway speaks minor units (kobo,
//! x100); conversion happens here and only here.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Convert an f64 amount to a Decimal for arithmetic
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert a Decimal back to the f64 transport representation
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Subtotal of one order line: unit price × quantity
pub fn line_subtotal(unit_price: f64, quantity: i64) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Major units → minor units (kobo), rounded to the nearest unit
pub fn to_minor_units(major: f64) -> i64 {
    (to_decimal(major) * Decimal::from(100))
        .round()
        .to_i64()
        .unwrap_or(0)
}

/// Minor units (kobo) → major units
pub fn from_minor_units(minor: i64) -> f64 {
    to_f64(Decimal::from(minor) / Decimal::from(100))
}

/// Amount guard used by reconciliation: the gateway's verified minor-unit
/// amount must equal the order total exactly.
pub fn amounts_match(expected_major: f64, paid_minor: i64) -> bool {
    to_minor_units(expected_major) == paid_minor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_exact() {
        assert_eq!(line_subtotal(800.0, 3), 2400.0);
        assert_eq!(line_subtotal(500.0, 1), 500.0);
        // Decimal arithmetic avoids binary-float drift on cent values
        assert_eq!(line_subtotal(0.1, 3), 0.3);
    }

    #[test]
    fn test_minor_unit_round_trip() {
        assert_eq!(to_minor_units(2900.0), 290_000);
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(from_minor_units(290_000), 2900.0);
        assert_eq!(from_minor_units(1999), 19.99);
    }

    #[test]
    fn test_amount_guard() {
        assert!(amounts_match(2900.0, 290_000));
        assert!(!amounts_match(5000.0, 400_000));
        // off-by-one kobo is a mismatch, not a tolerance case
        assert!(!amounts_match(2900.0, 290_001));
    }
}
