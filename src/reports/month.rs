//! Month-scoped reports
//!
//! The running-balance trajectory through a calendar month and the ranking of
//! categories by amount within it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::ledger::Ledger;
use crate::models::{Money, Transaction, TransactionType};

/// How many categories a month ranking keeps
pub const TOP_CATEGORY_LIMIT: usize = 10;

/// A calendar month (e.g., "2024-02")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a month, returning `None` for an out-of-range month number
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The 1st of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The following month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Parse "YYYY-MM"
    pub fn parse(s: &str) -> Result<Self, MonthParseError> {
        let s = s.trim();
        let invalid = || MonthParseError(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Error for a malformed "YYYY-MM" string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(pub String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid month '{}' (expected YYYY-MM)", self.0)
    }
}

impl std::error::Error for MonthParseError {}

/// One point of a balance series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub balance: Money,
}

/// Running balance through a month
///
/// The first point is the balance carried in from before the month, labelled
/// with its 1st day; every in-month transaction adds one point after it. A
/// series with only the opening point means nothing happened in the month; an
/// empty series means the ledger has nothing dated on or before the month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSeries {
    pub month: YearMonth,
    pub points: Vec<SeriesPoint>,
}

impl MonthSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when there is an opening balance but no in-month entries
    pub fn has_no_activity(&self) -> bool {
        self.points.len() == 1
    }

    /// Point labels as ISO dates
    pub fn labels(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|p| p.date.format("%Y-%m-%d").to_string())
            .collect()
    }

    pub fn values(&self) -> Vec<Money> {
        self.points.iter().map(|p| p.balance).collect()
    }

    /// Balance at the end of the series
    pub fn closing_balance(&self) -> Option<Money> {
        self.points.last().map(|p| p.balance)
    }
}

/// Compute the balance trajectory for `month`
pub fn month_series(ledger: &Ledger, month: YearMonth) -> MonthSeries {
    let start = month.first_day();

    let mut prior_count = 0usize;
    let mut running = Money::zero();
    for txn in ledger.transactions().iter().filter(|t| t.date < start) {
        running += txn.signed_amount();
        prior_count += 1;
    }

    let mut in_month: Vec<&Transaction> = ledger
        .transactions()
        .iter()
        .filter(|t| month.contains(t.date))
        .collect();
    in_month.sort_by_key(|t| t.date);

    if prior_count == 0 && in_month.is_empty() {
        return MonthSeries {
            month,
            points: Vec::new(),
        };
    }

    let mut points = Vec::with_capacity(in_month.len() + 1);
    points.push(SeriesPoint {
        date: start,
        balance: running,
    });
    for txn in in_month {
        running += txn.signed_amount();
        points.push(SeriesPoint {
            date: txn.date,
            balance: running,
        });
    }

    MonthSeries { month, points }
}

/// Top categories of one type in a month, largest total first
///
/// Ties are ordered by category name so the ranking is deterministic.
pub fn month_category_totals(
    ledger: &Ledger,
    month: YearMonth,
    kind: TransactionType,
) -> Vec<(String, Money)> {
    top_categories(ledger, month, kind, TOP_CATEGORY_LIMIT)
}

/// Like [`month_category_totals`] with a caller-chosen limit
pub fn top_categories(
    ledger: &Ledger,
    month: YearMonth,
    kind: TransactionType,
    limit: usize,
) -> Vec<(String, Money)> {
    let mut totals: HashMap<&str, Money> = HashMap::new();
    for txn in ledger
        .transactions()
        .iter()
        .filter(|t| t.kind == kind && month.contains(t.date))
    {
        *totals.entry(txn.category.as_str()).or_insert_with(Money::zero) += txn.amount;
    }

    let mut ranked: Vec<(String, Money)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Income and expense totals for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSummary {
    pub month: YearMonth,
    pub income: Money,
    pub expense: Money,
    pub transaction_count: usize,
}

impl MonthSummary {
    /// Income minus expenses
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

/// Summarize one month
pub fn month_summary(ledger: &Ledger, month: YearMonth) -> MonthSummary {
    let mut summary = MonthSummary {
        month,
        income: Money::zero(),
        expense: Money::zero(),
        transaction_count: 0,
    };
    for txn in ledger.transactions().iter().filter(|t| month.contains(t.date)) {
        match txn.kind {
            TransactionType::Income => summary.income += txn.amount,
            TransactionType::Expense => summary.expense += txn.amount,
        }
        summary.transaction_count += 1;
    }
    summary
}
