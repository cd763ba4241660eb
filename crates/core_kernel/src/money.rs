//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of rupee amounts and
//! sharing percentages using rust_decimal, so that billing formulas never
//! touch floating point.
//!
//! All amounts are Indian rupees. Arithmetic keeps full decimal precision;
//! rounding to paise happens only where a caller asks for it via
//! [`Money::round_to_paise`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Number of decimal places in a rupee amount (paise)
pub const PAISE_DECIMAL_PLACES: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Percentage {0} is outside the range 0 to 100")]
    PercentageOutOfRange(Decimal),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A rupee amount
///
/// Money keeps the exact decimal it was built from. Use
/// [`Money::round_to_paise`] to apply banker's rounding at the precision
/// printed on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    amount: Decimal,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Creates Money from an integer amount of paise
    pub fn from_paise(paise: i64) -> Self {
        Self::new(Decimal::new(paise, PAISE_DECIMAL_PLACES))
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self { amount: dec!(0) }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self::new(self.amount.abs())
    }

    /// Rounds to paise using banker's rounding (round half to even)
    pub fn round_to_paise(&self) -> Self {
        let mut rounded = self
            .amount
            .round_dp_with_strategy(PAISE_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
        // pin the scale so 1500 and 1500.00 serialize alike
        rounded.rescale(PAISE_DECIMAL_PLACES);
        Self::new(rounded)
    }

    /// Checked addition that reports overflow instead of panicking
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.amount
            .checked_add(other.amount)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction that reports overflow instead of panicking
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.amount
            .checked_sub(other.amount)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Splits a non-negative amount into whole rupees and paise
    ///
    /// The amount is rounded to paise first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for negative amounts or amounts that do not
    /// fit in 64 bits of rupees.
    pub fn rupees_and_paise(&self) -> Result<(u64, u32), MoneyError> {
        if self.is_negative() {
            return Err(MoneyError::InvalidAmount(format!(
                "negative amount {}",
                self.amount
            )));
        }

        let total_paise = self
            .round_to_paise()
            .amount
            .checked_mul(dec!(100))
            .and_then(|paise| paise.trunc().to_u128())
            .ok_or_else(|| MoneyError::InvalidAmount(self.amount.to_string()))?;

        let rupees = u64::try_from(total_paise / 100)
            .map_err(|_| MoneyError::InvalidAmount(self.amount.to_string()))?;
        Ok((rupees, (total_paise % 100) as u32))
    }

    /// Formats the amount with Indian digit grouping, e.g. `1,23,456.75`
    pub fn to_indian_grouping(&self) -> String {
        let rounded = self.round_to_paise().amount;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let grouped = if whole.len() <= 3 {
            whole.to_string()
        } else {
            let (head, tail) = whole.split_at(whole.len() - 3);
            let mut groups: Vec<&str> = Vec::new();
            let mut end = head.len();
            while end > 0 {
                let start = end.saturating_sub(2);
                groups.push(&head[start..end]);
                end = start;
            }
            groups.reverse();
            format!("{},{}", groups.join(","), tail)
        };

        format!("{}{}.{}", sign, grouped, fraction)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.to_indian_grouping())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.amount + other.amount)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.amount - other.amount)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// A sharing percentage in the closed range 0 to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage {
    value: Decimal,
}

impl Percentage {
    /// Creates a percentage, rejecting values outside 0..=100
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(MoneyError::PercentageOutOfRange(value));
        }
        Ok(Self { value })
    }

    /// Zero percent
    pub fn zero() -> Self {
        Self { value: Decimal::ZERO }
    }

    /// Returns the percentage value (e.g. 60 for 60%)
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the percentage as a fraction (e.g. 0.6 for 60%)
    pub fn as_fraction(&self) -> Decimal {
        self.value / dec!(100)
    }

    /// Applies the percentage to an amount without rounding
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if the product does not fit in a `Decimal`.
    pub fn of(&self, amount: Money) -> Result<Money, MoneyError> {
        amount
            .amount()
            .checked_mul(self.as_fraction())
            .map(Money::new)
            .ok_or(MoneyError::Overflow)
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(p: Percentage) -> Decimal {
        p.value
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.value.normalize())
    }
}
