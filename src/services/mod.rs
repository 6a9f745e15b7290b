//! Service layer for Tally
//!
//! The service layer wraps the ledger with persistence and change
//! notification, and is what the CLI talks to.

pub mod ledger;

pub use ledger::{LedgerEvent, LedgerService};
