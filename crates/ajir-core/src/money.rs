//! # Money — String-Decimal Amounts
//!
//! Monetary amount with currency. Amounts are stored as decimal strings
//! to preserve arbitrary precision; the workflow never performs float
//! arithmetic on contract or milestone amounts.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Monetary amount with currency.
///
/// # Invariant
///
/// Financial amounts are never represented as floating-point numbers.
/// String storage ensures no precision loss across serialization
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount as a decimal string (e.g., "500", "1250.75").
    pub amount: String,
    /// ISO 4217 currency code (e.g., "USD", "SAR", "AED").
    pub currency: String,
}

impl Money {
    /// Create a new monetary amount.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAmount`] if the amount string is
    /// empty or is not a plain decimal number.
    pub fn new(
        amount: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let amount = amount.into();
        if !is_valid_decimal(&amount) {
            return Err(ValidationError::InvalidAmount(amount));
        }
        Ok(Self {
            amount,
            currency: currency.into(),
        })
    }

    /// Whether the amount is negative.
    ///
    /// Milestone and contract amounts must be non-negative; the sign is
    /// only meaningful for adjustment records.
    pub fn is_negative(&self) -> bool {
        self.amount.starts_with('-')
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Validate that a string is a plain decimal number: optional leading
/// minus, digits, at most one dot.
fn is_valid_decimal(s: &str) -> bool {
    let s = match s.strip_prefix('-') {
        Some(rest) => rest,
        None => s,
    };
    if s.is_empty() {
        return false;
    }
    let mut has_dot = false;
    let mut has_digit = false;
    for c in s.chars() {
        if c == '.' {
            if has_dot {
                return false;
            }
            has_dot = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else {
            return false;
        }
    }
    has_digit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_amounts() {
        assert!(Money::new("500", "USD").is_ok());
        assert!(Money::new("1250.75", "SAR").is_ok());
        assert!(Money::new("0", "AED").is_ok());
        assert!(Money::new("-100", "USD").is_ok());
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(Money::new("", "USD").is_err());
        assert!(Money::new("-", "USD").is_err());
        assert!(Money::new(".", "USD").is_err());
        assert!(Money::new("abc", "USD").is_err());
        assert!(Money::new("1.2.3", "USD").is_err());
        assert!(Money::new("1,000", "USD").is_err());
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::new("-50", "USD").unwrap().is_negative());
        assert!(!Money::new("50", "USD").unwrap().is_negative());
        assert!(!Money::new("0", "USD").unwrap().is_negative());
    }

    #[test]
    fn test_display() {
        let m = Money::new("500", "USD").unwrap();
        assert_eq!(format!("{m}"), "500 USD");
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = Money::new("1250.75", "SAR").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }
}
