//! Report formatting utilities for terminal output
//!
//! Balance overview, month report and settings listing, plus the small
//! helpers the other display modules share.

use chrono::NaiveDate;

use crate::config::{Settings, TallyPaths};
use crate::ledger::Ledger;
use crate::models::{Money, TransactionType};
use crate::reports::{MonthSeries, MonthSummary};

use super::category::format_category_totals;

const REPORT_WIDTH: usize = 44;

/// Format a date with the configured format
pub fn format_date(date: NaiveDate, settings: &Settings) -> String {
    date.format(&settings.date_format).to_string()
}

/// Format an amount with the configured currency symbol
pub fn format_money(amount: Money, settings: &Settings) -> String {
    amount.format_with_symbol(&settings.currency_symbol)
}

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Balance, totals and category counts for the whole ledger
pub fn format_balance_overview(ledger: &Ledger, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str("Balance Overview\n");
    output.push_str(&separator(REPORT_WIDTH));
    output.push('\n');
    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Current balance:",
        format_money(ledger.current_balance(), settings)
    ));
    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Total income:",
        format_money(ledger.total_income(), settings)
    ));
    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Total expenses:",
        format_money(ledger.total_expenses(), settings)
    ));
    output.push_str(&format!("{:<20}{:>24}\n", "Transactions:", ledger.len()));
    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Income categories:",
        ledger.category_count(TransactionType::Income)
    ));
    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Expense categories:",
        ledger.category_count(TransactionType::Expense)
    ));

    if let Some((first, last)) = ledger.date_range() {
        output.push_str(&format!(
            "{:<20}{:>24}\n",
            "Period:",
            format!(
                "{} - {}",
                format_date(first, settings),
                format_date(last, settings)
            )
        ));
    }

    output
}

/// Summary, balance trajectory and top categories of one month
pub fn format_month_report(
    summary: &MonthSummary,
    series: &MonthSeries,
    top: &[(String, Money)],
    kind: TransactionType,
    settings: &Settings,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Month Report: {}\n", summary.month));
    output.push_str(&separator(REPORT_WIDTH));
    output.push('\n');

    if series.is_empty() {
        output.push_str("No transactions on or before this month.\n");
        return output;
    }

    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Income:",
        format_money(summary.income, settings)
    ));
    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Expenses:",
        format_money(summary.expense, settings)
    ));
    output.push_str(&format!(
        "{:<20}{:>24}\n",
        "Net:",
        format_money(summary.net(), settings)
    ));
    output.push('\n');

    output.push_str("Balance\n");
    for point in &series.points {
        output.push_str(&format!(
            "  {:<18}{:>24}\n",
            format_date(point.date, settings),
            format_money(point.balance, settings)
        ));
    }
    if series.has_no_activity() {
        output.push_str("  (no transactions this month)\n");
    }

    if !top.is_empty() {
        output.push('\n');
        let title = match kind {
            TransactionType::Income => "Top income categories",
            TransactionType::Expense => "Top expense categories",
        };
        output.push_str(&format_category_totals(title, top, settings));
    }

    output
}

/// Paths and settings, as shown by `tally config`
pub fn format_settings(paths: &TallyPaths, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str("Tally Configuration\n");
    output.push_str("===================\n");
    output.push_str(&format!("Config directory: {}\n", paths.base_dir().display()));
    output.push_str(&format!("Data file:        {}\n", paths.store_file().display()));
    output.push_str(&format!("Exports:          {}\n", paths.exports_dir().display()));
    output.push('\n');
    output.push_str("Settings:\n");
    for (key, value) in settings.entries() {
        output.push_str(&format!("  {:<16} {}\n", key, value));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::NewTransaction;
    use crate::reports::{month_series, month_summary, top_categories, YearMonth};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_ledger() -> Ledger {
        let clock = FixedClock::on(date(2024, 3, 1));
        let mut ledger = Ledger::new();
        for (kind, category, units, on) in [
            (TransactionType::Income, "Salary", 1000, date(2024, 1, 5)),
            (TransactionType::Expense, "Rent", 1500, date(2024, 1, 20)),
            (TransactionType::Income, "Bonus", 300, date(2024, 2, 10)),
        ] {
            ledger
                .add(
                    NewTransaction::new(kind, category, Money::from_units(units), on, ""),
                    &clock,
                )
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.5), "5.5%");
        assert_eq!(format_percentage(55.0), "55%");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(5.0, 10.0, 4), "██░░");
        assert_eq!(format_bar(0.0, 10.0, 3), "   ");
    }

    #[test]
    fn test_balance_overview() {
        let output = format_balance_overview(&sample_ledger(), &Settings::default());
        assert!(output.contains("-₹200.00"));
        assert!(output.contains("₹1300.00"));
        assert!(output.contains("05 Jan 2024 - 10 Feb 2024"));
    }

    #[test]
    fn test_month_report() {
        let ledger = sample_ledger();
        let settings = Settings::default();
        let feb = YearMonth::new(2024, 2).unwrap();
        let top = top_categories(&ledger, feb, TransactionType::Income, 10);

        let output = format_month_report(
            &month_summary(&ledger, feb),
            &month_series(&ledger, feb),
            &top,
            TransactionType::Income,
            &settings,
        );
        assert!(output.contains("Month Report: 2024-02"));
        assert!(output.contains("01 Feb 2024"));
        assert!(output.contains("-₹500.00"));
        assert!(output.contains("Top income categories"));
        assert!(output.contains("Bonus"));
    }

    #[test]
    fn test_month_report_quiet_months() {
        let ledger = sample_ledger();
        let settings = Settings::default();

        let before = YearMonth::new(2023, 12).unwrap();
        let output = format_month_report(
            &month_summary(&ledger, before),
            &month_series(&ledger, before),
            &[],
            TransactionType::Expense,
            &settings,
        );
        assert!(output.contains("No transactions on or before this month"));

        let after = YearMonth::new(2024, 3).unwrap();
        let output = format_month_report(
            &month_summary(&ledger, after),
            &month_series(&ledger, after),
            &[],
            TransactionType::Expense,
            &settings,
        );
        assert!(output.contains("(no transactions this month)"));
    }

    #[test]
    fn test_format_settings() {
        let paths = TallyPaths::with_base_dir("/tmp/tally-test");
        let output = format_settings(&paths, &Settings::default());
        assert!(output.contains("currency_symbol"));
        assert!(output.contains("store.json"));
    }
}
