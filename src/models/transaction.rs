//! Transaction model
//!
//! Represents a dated income or expense entry. Everything except the running
//! `balance` is fixed at creation time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::TransactionId;
use super::money::Money;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Apply this type's sign to a positive amount
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }

    /// Wire name (`income` / `expense`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            other => Err(format!(
                "Unknown transaction type '{}' (expected income or expense)",
                other
            )),
        }
    }
}

/// A recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// User-defined, case-sensitive category
    pub category: String,

    /// Positive amount; the sign comes from `kind`
    pub amount: Money,

    /// Calendar date of the transaction
    pub date: NaiveDate,

    /// Free text, empty when not given
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,

    /// Running balance as of this transaction in date order
    #[serde(default)]
    pub balance: Money,

    /// When the transaction was recorded
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Build a transaction from validated input
    pub fn new(id: TransactionId, input: NewTransaction, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: input.kind,
            category: input.category,
            amount: input.amount,
            date: input.date,
            description: input.description,
            balance: Money::zero(),
            timestamp,
        }
    }

    /// Amount with the sign of its type (income positive, expense negative)
    pub fn signed_amount(&self) -> Money {
        self.kind.signed(self.amount)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.category,
            self.signed_amount()
        )
    }
}

/// Input for recording a new transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub category: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub description: String,
}

impl NewTransaction {
    /// Create input with trimmed text fields
    pub fn new(
        kind: TransactionType,
        category: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            category: category.into().trim().to_string(),
            amount,
            date,
            description: description.into().trim().to_string(),
        }
    }

    /// Check the input against the ledger's preconditions
    pub fn validate(&self, today: NaiveDate) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > Money::MAX_AMOUNT {
            return Err(TransactionValidationError::AmountTooLarge(self.amount));
        }
        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::EmptyCategory);
        }
        if self.date > today {
            return Err(TransactionValidationError::FutureDate {
                date: self.date,
                today,
            });
        }
        Ok(())
    }
}

/// Validation errors for new transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EmptyCategory,
    FutureDate { date: NaiveDate, today: NaiveDate },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) if amount.is_zero() => write!(
                f,
                "Amount must be greater than zero (got 0 after rounding to hundredths)"
            ),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Amount {} exceeds the largest allowed amount {}",
                amount,
                Money::MAX_AMOUNT
            ),
            Self::EmptyCategory => write!(f, "Category must not be empty"),
            Self::FutureDate { date, today } => write!(
                f,
                "Future dates are not allowed ({} is after {})",
                date, today
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
