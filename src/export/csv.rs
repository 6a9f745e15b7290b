//! CSV Export functionality
//!
//! Exports the ledger's transactions, in current ledger order, as
//! `Date,Type,Category,Description,Amount,Balance` with every field quoted.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;

use crate::error::{TallyError, TallyResult};
use crate::ledger::Ledger;
use crate::models::Transaction;

/// Header row of the transaction export
pub const CSV_HEADERS: [&str; 6] = ["Date", "Type", "Category", "Description", "Amount", "Balance"];

/// MIME type to hand to a download helper
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// File name for an export made on `today`
pub fn export_filename(today: NaiveDate) -> String {
    format!("transactions_{}.csv", today.format("%Y-%m-%d"))
}

/// Write transactions as CSV, one `\n`-terminated row each
pub fn write_transactions_csv<W: Write>(
    transactions: &[Transaction],
    writer: W,
) -> TallyResult<()> {
    let mut csv_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer
        .write_record(CSV_HEADERS)
        .map_err(|e| TallyError::Export(e.to_string()))?;

    for txn in transactions {
        csv_writer
            .write_record([
                txn.date.format("%Y-%m-%d").to_string(),
                txn.kind.to_string(),
                txn.category.clone(),
                txn.description.clone(),
                txn.amount.to_string(),
                txn.balance.to_string(),
            ])
            .map_err(|e| TallyError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| TallyError::Export(e.to_string()))?;
    Ok(())
}

/// Write the whole ledger, in ledger order
pub fn write_csv<W: Write>(ledger: &Ledger, writer: W) -> TallyResult<()> {
    write_transactions_csv(ledger.transactions(), writer)
}

/// Render transactions as a CSV string, rows joined by `\n`
pub fn to_csv(transactions: &[Transaction]) -> TallyResult<String> {
    let mut buffer = Vec::new();
    write_transactions_csv(transactions, &mut buffer)?;

    let mut output =
        String::from_utf8(buffer).map_err(|e| TallyError::Export(e.to_string()))?;
    if output.ends_with('\n') {
        output.pop();
    }
    Ok(output)
}
