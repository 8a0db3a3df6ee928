//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! parsing values that may or may not include a currency symbol and commas.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Represents a monetary amount.
///
/// This type wraps `Decimal` and parses strings that may carry a leading `$`
/// or `€` and comma thousands separators. The symbol and separators are not
/// retained; equality and ordering are numeric, and `Display` always renders
/// a plain value with two decimal places.
///
/// # Examples
///
/// ```
/// # use spendsheet::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("€1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
/// assert_eq!(amount, Amount::from_str("1250.50").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative()
    }
}

/// An error that can occur when parsing a string into an `Amount`.
#[derive(Error, Debug)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("'{input}' is not a decimal amount")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Remove a currency symbol if present, keeping any leading minus.
        let without_symbol = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match strip_currency(after_minus) {
                Some(rest) => format!("-{rest}"),
                None => trimmed.to_string(),
            }
        } else {
            strip_currency(trimmed).unwrap_or(trimmed).to_string()
        };

        // Remove commas (thousands separators).
        let cleaned = without_symbol.replace(',', "");

        let value = Decimal::from_str(&cleaned).map_err(|source| AmountError::Invalid {
            input: trimmed.to_string(),
            source,
        })?;
        Ok(Amount { value })
    }
}

fn strip_currency(s: &str) -> Option<&str> {
    s.strip_prefix('$').or_else(|| s.strip_prefix('€'))
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value.round_dp(2))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
