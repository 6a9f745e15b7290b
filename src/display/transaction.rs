//! Transaction display formatting
//!
//! Table and detail views of ledger transactions for terminal output.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::Transaction;

use super::report::format_date;

/// One row of the transaction table
#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

impl TransactionRow {
    fn new(txn: &Transaction, settings: &Settings) -> Self {
        Self {
            id: format!("#{}", txn.id),
            date: format_date(txn.date, settings),
            kind: txn.kind.to_string(),
            category: truncate(&txn.category, 20),
            description: truncate(&txn.description, 30),
            amount: txn
                .signed_amount()
                .format_with_symbol(&settings.currency_symbol),
            balance: txn.balance.format_with_symbol(&settings.currency_symbol),
        }
    }
}

/// Format transactions as a table, in the order given
pub fn format_transaction_table(transactions: &[Transaction], settings: &Settings) -> String {
    if transactions.is_empty() {
        return "No transactions found.".to_string();
    }

    let rows = transactions
        .iter()
        .map(|txn| TransactionRow::new(txn, settings));

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::new(5..)).with(Alignment::right()));
    table.to_string()
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, settings: &Settings) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    output.push_str(&format!("Transaction: #{}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", format_date(txn.date, settings)));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("Category:    {}\n", txn.category));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_symbol(symbol)
    ));

    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }

    output.push_str(&format!(
        "Balance:     {}\n",
        txn.balance.format_with_symbol(symbol)
    ));

    output
}

/// Format a short transaction summary (one line)
pub fn format_transaction_short(txn: &Transaction, settings: &Settings) -> String {
    format!(
        "#{} {} {} {} {}",
        txn.id,
        format_date(txn.date, settings),
        txn.kind,
        txn.category,
        txn.amount.format_with_symbol(&settings.currency_symbol)
    )
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
