//! Category display formatting

use crate::config::Settings;
use crate::models::Money;

use super::report::{format_bar, format_money, format_percentage};

const BAR_WIDTH: usize = 20;

/// Format ranked category totals with share of total and a bar
pub fn format_category_totals(title: &str, totals: &[(String, Money)], settings: &Settings) -> String {
    if totals.is_empty() {
        return format!("{}: none\n", title);
    }

    let name_width = totals
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    let grand_total: Money = totals.iter().map(|(_, amount)| *amount).sum();
    let max = totals
        .iter()
        .map(|(_, amount)| amount.as_decimal())
        .fold(0.0_f64, f64::max);

    let mut output = String::new();
    output.push_str(&format!("{}\n", title));

    for (name, amount) in totals {
        let share = if grand_total.is_positive() {
            amount.as_decimal() / grand_total.as_decimal() * 100.0
        } else {
            0.0
        };
        output.push_str(&format!(
            "  {:<name_width$}  {:>14}  {:>6}  {}\n",
            name,
            format_money(*amount, settings),
            format_percentage(share),
            format_bar(amount.as_decimal(), max, BAR_WIDTH),
            name_width = name_width,
        ));
    }

    output.push_str(&format!(
        "  {:<name_width$}  {:>14}\n",
        "Total",
        format_money(grand_total, settings),
        name_width = name_width,
    ));

    output
}
