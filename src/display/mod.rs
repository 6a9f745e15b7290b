//! Display formatting for terminal output
//!
//! Provides utilities for formatting ledger data for terminal display,
//! including tables, category rankings and reports.

pub mod category;
pub mod report;
pub mod transaction;

pub use category::format_category_totals;
pub use report::{
    format_balance_overview, format_date, format_money, format_month_report, format_settings,
};
pub use transaction::{
    format_transaction_details, format_transaction_short, format_transaction_table,
};
