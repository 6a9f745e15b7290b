//! Transaction filtering
//!
//! Read-only views over the ledger: an exact date, a named window relative to
//! today, and a transaction type. Results come back most recent first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ledger::Ledger;
use crate::models::{Transaction, TransactionType};

/// A named date range ending today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationWindow {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "3months")]
    ThreeMonths,
}

impl DurationWindow {
    pub const ALL: [DurationWindow; 4] = [
        Self::Today,
        Self::SevenDays,
        Self::ThirtyDays,
        Self::ThreeMonths,
    ];

    /// Largest whole-day distance from today still inside the window
    pub fn max_days(&self) -> i64 {
        match self {
            Self::Today => 0,
            Self::SevenDays => 7,
            Self::ThirtyDays => 30,
            Self::ThreeMonths => 90,
        }
    }

    /// Whether a date `days_ago` calendar days before today is in the window
    pub fn contains_days_ago(&self, days_ago: i64) -> bool {
        match self {
            Self::Today => days_ago == 0,
            _ => days_ago <= self.max_days(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::SevenDays => "7days",
            Self::ThirtyDays => "30days",
            Self::ThreeMonths => "3months",
        }
    }
}

impl fmt::Display for DurationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown duration '{}' (expected one of: today, 7days, 30days, 3months)",
                    s
                )
            })
    }
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only this date; overrides `window` when set
    pub exact_date: Option<NaiveDate>,
    /// Only dates within this window of today
    pub window: Option<DurationWindow>,
    /// Only this type
    pub kind: Option<TransactionType>,
}

impl TransactionFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by exact date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.exact_date = Some(date);
        self
    }

    /// Filter by duration window
    pub fn within(mut self, window: DurationWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Filter by type
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Check one transaction against the filter
    pub fn matches(&self, txn: &Transaction, today: NaiveDate) -> bool {
        if let Some(date) = self.exact_date {
            if txn.date != date {
                return false;
            }
        } else if let Some(window) = self.window {
            let days_ago = (today - txn.date).num_days();
            if !window.contains_days_ago(days_ago) {
                return false;
            }
        }

        if let Some(kind) = self.kind {
            if txn.kind != kind {
                return false;
            }
        }

        true
    }
}

/// Apply a filter to the ledger, most recent date first
///
/// Transactions sharing a date keep their ledger order, so repeated calls on
/// an unchanged ledger return the same sequence.
pub fn filter_transactions(
    ledger: &Ledger,
    filter: &TransactionFilter,
    today: NaiveDate,
) -> Vec<Transaction> {
    let mut result: Vec<Transaction> = ledger
        .transactions()
        .iter()
        .filter(|t| filter.matches(t, today))
        .cloned()
        .collect();
    result.sort_by(|a, b| b.date.cmp(&a.date));
    result
}
