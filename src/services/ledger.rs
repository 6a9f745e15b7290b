//! Ledger service
//!
//! The host session: owns the ledger, the snapshot store and the clock.
//! Every mutation is persisted before it is reported to subscribers; a
//! mutation whose snapshot cannot be written is rolled back.

use std::io::Write;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{TallyError, TallyResult};
use crate::export;
use crate::ledger::Ledger;
use crate::models::{Money, NewTransaction, Transaction, TransactionId, TransactionType};
use crate::reports::{
    filter_transactions, month_series, month_summary, top_categories, MonthSeries, MonthSummary,
    TransactionFilter, YearMonth,
};
use crate::storage::{load_snapshot, save_snapshot, SnapshotStore};

/// What changed in the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    /// The ledger was (re)read from the store
    Loaded { transactions: usize },
    /// A transaction was recorded
    Added(Transaction),
    /// A transaction was removed
    Deleted(Transaction),
    /// Every transaction was removed
    Cleared,
}

type Listener = Box<dyn FnMut(&LedgerEvent)>;

/// Service for ledger management
pub struct LedgerService<S: SnapshotStore, C: Clock> {
    ledger: Ledger,
    store: S,
    clock: C,
    listeners: Vec<Listener>,
}

impl<S: SnapshotStore, C: Clock> LedgerService<S, C> {
    /// Load the ledger from `store`
    pub fn open(store: S, clock: C) -> TallyResult<Self> {
        let ledger = load_snapshot(&store, clock.now())?;
        info!(
            transactions = ledger.len(),
            balance = %ledger.current_balance(),
            "ledger loaded"
        );
        Ok(Self {
            ledger,
            store,
            clock,
            listeners: Vec::new(),
        })
    }

    /// Re-read the ledger from the store, discarding in-memory state
    pub fn reload(&mut self) -> TallyResult<()> {
        self.ledger = load_snapshot(&self.store, self.clock.now())?;
        self.notify(&LedgerEvent::Loaded {
            transactions: self.ledger.len(),
        });
        Ok(())
    }

    /// Register a listener called after every persisted change
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&LedgerEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Today according to the service clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Record a transaction and persist
    pub fn add(&mut self, input: NewTransaction) -> TallyResult<Transaction> {
        let before = self.ledger.clone();
        let txn = self.ledger.add(input, &self.clock)?;
        self.persist_or_restore(before)?;

        info!(
            id = %txn.id,
            kind = %txn.kind,
            category = %txn.category,
            amount = %txn.amount,
            "transaction added"
        );
        self.notify(&LedgerEvent::Added(txn.clone()));
        Ok(txn)
    }

    /// Delete a transaction and persist; `false` if the id is unknown
    pub fn delete(&mut self, id: TransactionId) -> TallyResult<bool> {
        match self.remove(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!(id = %id, "delete of unknown transaction ignored");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a transaction and persist, returning what was removed
    pub fn remove(&mut self, id: TransactionId) -> TallyResult<Transaction> {
        let txn = self
            .ledger
            .get(id)
            .cloned()
            .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;

        let before = self.ledger.clone();
        self.ledger.delete(id);
        self.persist_or_restore(before)?;

        info!(id = %id, "transaction deleted");
        self.notify(&LedgerEvent::Deleted(txn.clone()));
        Ok(txn)
    }

    /// Remove every transaction and persist
    pub fn clear(&mut self) -> TallyResult<()> {
        let before = self.ledger.clone();
        self.ledger.clear();
        self.persist_or_restore(before)?;

        info!("ledger cleared");
        self.notify(&LedgerEvent::Cleared);
        Ok(())
    }

    pub fn current_balance(&self) -> Money {
        self.ledger.current_balance()
    }

    /// Transactions matching `filter`, most recent first
    pub fn filter(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let result = filter_transactions(&self.ledger, filter, self.clock.today());
        debug!(matched = result.len(), "filtered transactions");
        result
    }

    pub fn month_series(&self, month: YearMonth) -> MonthSeries {
        month_series(&self.ledger, month)
    }

    /// Top `limit` categories of one type within `month`
    pub fn month_category_totals(
        &self,
        month: YearMonth,
        kind: TransactionType,
        limit: usize,
    ) -> Vec<(String, Money)> {
        top_categories(&self.ledger, month, kind, limit)
    }

    pub fn month_summary(&self, month: YearMonth) -> MonthSummary {
        month_summary(&self.ledger, month)
    }

    /// All-time category totals of one type, largest first
    pub fn category_totals(&self, kind: TransactionType) -> Vec<(String, Money)> {
        self.ledger.totals().ranked(kind)
    }

    /// The ledger as CSV text
    pub fn export_csv(&self) -> TallyResult<String> {
        export::to_csv(self.ledger.transactions())
    }

    /// Write the ledger as CSV to `writer`
    pub fn write_csv<W: Write>(&self, writer: W) -> TallyResult<()> {
        export::write_csv(&self.ledger, writer)
    }

    /// File name for an export made today
    pub fn export_filename(&self) -> String {
        export::export_filename(self.clock.today())
    }

    fn persist_or_restore(&mut self, before: Ledger) -> TallyResult<()> {
        if let Err(e) = save_snapshot(&self.ledger, &mut self.store) {
            self.ledger = before;
            return Err(e);
        }
        Ok(())
    }

    fn notify(&mut self, event: &LedgerEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}
