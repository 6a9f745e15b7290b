//! Reports over the ledger
//!
//! Read-only queries:
//! - `filter`: date, duration window and type filters
//! - `month`: month balance series, category rankings and summaries

pub mod filter;
pub mod month;

pub use filter::{filter_transactions, DurationWindow, TransactionFilter};
pub use month::{
    month_category_totals, month_series, month_summary, top_categories, MonthParseError,
    MonthSeries, MonthSummary, SeriesPoint, YearMonth, TOP_CATEGORY_LIMIT,
};
