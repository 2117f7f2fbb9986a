//! Monetary sum type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A signed monetary amount together with its currency code.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
/// A negative amount means the user owes money; a positive amount means
/// money is owed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sum {
    /// The amount, with two decimal places.
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "EUR", "USD").
    pub currency: String,
}

impl Sum {
    /// Creates a new sum.
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Creates a zero sum in the specified currency.
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency: currency.into(),
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative (the user owes money).
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl std::fmt::Display for Sum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sum_new() {
        let sum = Sum::new(dec!(100.00), "EUR");
        assert_eq!(sum.amount, dec!(100.00));
        assert_eq!(sum.currency, "EUR");
    }

    #[test]
    fn test_sum_zero() {
        let sum = Sum::zero("USD");
        assert!(sum.is_zero());
        assert!(!sum.is_negative());
    }

    #[test]
    fn test_sum_is_negative() {
        assert!(Sum::new(dec!(-10.50), "EUR").is_negative());
        assert!(!Sum::new(dec!(10.50), "EUR").is_negative());
        assert!(!Sum::new(dec!(0), "EUR").is_negative());
    }

    #[test]
    fn test_sum_display() {
        let sum = Sum::new(dec!(-3.25), "EUR");
        assert_eq!(sum.to_string(), "-3.25 EUR");
    }

    #[test]
    fn test_sum_serde_round_trip() {
        let sum = Sum::new(dec!(42.00), "EUR");
        let json = serde_json::to_string(&sum).unwrap();
        let back: Sum = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sum);
    }
}
