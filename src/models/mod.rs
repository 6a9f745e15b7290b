//! Core data models for Tally
//!
//! This module contains the data structures of the ledger domain: transactions,
//! their identifiers and the money amounts they carry.

pub mod ids;
pub mod money;
pub mod transaction;

pub use ids::{IdCounter, TransactionId};
pub use money::{Money, MoneyParseError};
pub use transaction::{
    NewTransaction, Transaction, TransactionType, TransactionValidationError,
};
