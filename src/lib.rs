//! Tally - Terminal-based personal income and expense ledger
//!
//! This library provides the core of the Tally ledger: dated income and
//! expense entries, a running balance kept consistent on every change,
//! per-category totals, date and month reports, and CSV export.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `models`: Core data models (transactions, money, ids)
//! - `ledger`: The in-memory ledger and its category totals
//! - `reports`: Filters, month series and category rankings
//! - `export`: CSV export
//! - `storage`: Key-value snapshot stores and the snapshot format
//! - `services`: The ledger session used by front ends
//! - `config`: Configuration and path management
//! - `cli`, `display`: The terminal front end
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tally::clock::FixedClock;
//! use tally::models::{Money, NewTransaction, TransactionType};
//! use tally::services::LedgerService;
//! use tally::storage::MemoryStore;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut service = LedgerService::open(MemoryStore::new(), FixedClock::on(today))?;
//! service.add(NewTransaction::new(
//!     TransactionType::Income,
//!     "Salary",
//!     Money::from_units(1000),
//!     today,
//!     "",
//! ))?;
//! assert_eq!(service.current_balance(), Money::from_units(1000));
//! # Ok::<(), tally::TallyError>(())
//! ```

pub mod cli;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{TallyError, TallyResult};
pub use logging::init_tracing;
