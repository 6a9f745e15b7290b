//! Export module for Tally
//!
//! Provides the transaction CSV export (spreadsheet-compatible).

pub mod csv;

pub use self::csv::{
    export_filename, to_csv, write_csv, write_transactions_csv, CSV_HEADERS, CSV_MIME_TYPE,
};
