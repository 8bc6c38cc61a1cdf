//! Value Objects for storefront requests

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in integer minor units (cents)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn new(value: i64) -> Self { Self(value) }
    pub fn value(&self) -> i64 { self.0 }

    /// Converts a major-unit amount, rounding half away from zero.
    pub fn from_major(amount: Decimal) -> Result<Self, MoneyError> {
        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        i64::try_from(cents).map(Self).map_err(|_| MoneyError::Overflow)
    }

    pub fn to_major(&self) -> Decimal { Decimal::new(self.0, 2) }

    pub fn checked_add(&self, other: Cents) -> Result<Cents, MoneyError> {
        self.0.checked_add(other.0).map(Self).ok_or(MoneyError::Overflow)
    }

    pub fn checked_mul(&self, qty: u32) -> Result<Cents, MoneyError> {
        self.0.checked_mul(i64::from(qty)).map(Self).ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.to_major()) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum MoneyError { Overflow }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Amount out of range") }
}

/// Formats a major-unit amount with exactly two decimals, as the payment gateway expects.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Free-text search term, stripped to characters that are safe inside a REST filter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub const MIN_LEN: usize = 2;

    pub fn new(value: &str) -> Result<Self, SearchTermError> {
        let cleaned: String = value
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '\''))
            .collect();
        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.chars().count() < Self::MIN_LEN { return Err(SearchTermError::TooShort); }
        Ok(Self(cleaned))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

#[derive(Debug, Clone)] pub enum SearchTermError { TooShort }
impl std::error::Error for SearchTermError {}
impl fmt::Display for SearchTermError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Search term must be at least {} characters", SearchTerm::MIN_LEN)
    }
}
