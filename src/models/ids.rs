//! Transaction identifiers
//!
//! Ids are plain integers handed out by a monotonic counter. The counter is
//! persisted with the ledger so an id is never reused, even after the
//! transaction that carried it has been deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Largest id a stored snapshot may carry
    ///
    /// Larger values are treated as missing so the counter always has room
    /// to move past every loaded id.
    pub const MAX_STORED: u64 = u64::MAX / 2;

    /// Wrap a raw id value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw id value
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TransactionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for TransactionId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Accept the "#42" form used in listings
        let s = s.strip_prefix('#').unwrap_or(s);
        Ok(Self(s.parse()?))
    }
}

/// Monotonic id source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    /// A counter whose first id is 1
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// A counter that resumes at `next`
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// The id the next call to `allocate` will return
    pub fn peek(&self) -> TransactionId {
        TransactionId(self.next)
    }

    /// Hand out a fresh id
    pub fn allocate(&mut self) -> TransactionId {
        let id = TransactionId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Make sure ids at or below `id` are never handed out
    pub fn observe(&mut self, id: TransactionId) {
        if id.0 >= self.next {
            self.next = id.0.saturating_add(1);
        }
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}
