//! Money type for representing currency amounts
//!
//! Internally stores amounts in hundredths (i64) so running balances are exact
//! sums. On the wire an amount is a plain decimal number (`1000`, `12.5`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as hundredths of the currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Largest amount a single transaction may carry (one trillion units)
    pub const MAX_AMOUNT: Money = Money(100_000_000_000_000);

    /// Create a Money amount from hundredths
    ///
    /// # Examples
    /// ```
    /// use tally::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "10.5");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Create a Money amount from a floating-point decimal, rounding to the
    /// nearest hundredth. Returns `None` for NaN, infinities and values that
    /// do not fit.
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in hundredths
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the amount as a floating-point decimal
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the hundredths portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "₹10.50", "$10.50", "10", ".5".
    /// Digits past the second decimal place are rounded half away from zero.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s.trim();
        if original.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, s) = match original.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, original),
        };

        let s = s
            .strip_prefix('₹')
            .or_else(|| s.strip_prefix('$'))
            .unwrap_or(s)
            .replace(',', "");

        let invalid = || MoneyParseError::InvalidFormat(original.to_string());

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s.as_str(), ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let digits: Vec<i64> = fraction
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(i64::from)
            .collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).map(|d| *d >= 5).unwrap_or(false);

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with a currency symbol and two decimal places
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.units().abs(), self.cents_part())
        } else {
            format!("{}{}.{:02}", symbol, self.units(), self.cents_part())
        }
    }
}

/// The shortest decimal form: `1000`, `12.5`, `-0.05`
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let units = self.units().abs();
        let cents = self.cents_part();
        if cents == 0 {
            write!(f, "{}{}", sign, units)
        } else if cents % 10 == 0 {
            write!(f, "{}{}.{}", sign, units, cents / 10)
        } else {
            write!(f, "{}{}.{:02}", sign, units, cents)
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.cents_part() == 0 {
            serializer.serialize_i64(self.units())
        } else {
            serializer.serialize_f64(self.as_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {}", value)))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::Empty => write!(f, "Amount is empty"),
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}
