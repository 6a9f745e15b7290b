//! Ledger engine
//!
//! The transaction store and the per-category aggregates it keeps in sync.

pub mod aggregator;
pub mod store;

pub use aggregator::CategoryTotals;
pub use store::Ledger;
