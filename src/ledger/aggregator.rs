//! Per-category totals
//!
//! Two maps, one per transaction type, from category name to the cumulative
//! amount of the live transactions in it. A category is present only while its
//! total is positive.

use std::collections::HashMap;

use crate::models::{Money, Transaction, TransactionType};

/// Income and expense totals keyed by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    income: HashMap<String, Money>,
    expense: HashMap<String, Money>,
}

impl CategoryTotals {
    /// Empty totals
    pub fn new() -> Self {
        Self::default()
    }

    /// Build totals from two stored maps, dropping non-positive entries
    pub fn from_maps(income: HashMap<String, Money>, expense: HashMap<String, Money>) -> Self {
        let mut totals = Self { income, expense };
        totals.income.retain(|_, amount| amount.is_positive());
        totals.expense.retain(|_, amount| amount.is_positive());
        totals
    }

    /// Derive totals from scratch
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals = Self::new();
        for txn in transactions {
            totals.record(txn.kind, &txn.category, txn.amount);
        }
        totals
    }

    fn map(&self, kind: TransactionType) -> &HashMap<String, Money> {
        match kind {
            TransactionType::Income => &self.income,
            TransactionType::Expense => &self.expense,
        }
    }

    fn map_mut(&mut self, kind: TransactionType) -> &mut HashMap<String, Money> {
        match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Expense => &mut self.expense,
        }
    }

    /// Add a transaction's amount to its category
    pub fn record(&mut self, kind: TransactionType, category: &str, amount: Money) {
        *self
            .map_mut(kind)
            .entry(category.to_string())
            .or_insert_with(Money::zero) += amount;
    }

    /// Take a transaction's amount back out of its category, pruning the
    /// category once nothing positive is left
    pub fn reverse(&mut self, kind: TransactionType, category: &str, amount: Money) {
        let map = self.map_mut(kind);
        let remove = match map.get_mut(category) {
            Some(total) => {
                *total -= amount;
                !total.is_positive()
            }
            None => false,
        };
        if remove {
            map.remove(category);
        }
    }

    /// Snapshot copy of one map
    pub fn totals(&self, kind: TransactionType) -> HashMap<String, Money> {
        self.map(kind).clone()
    }

    /// Borrow one map
    pub fn iter(&self, kind: TransactionType) -> impl Iterator<Item = (&str, Money)> {
        self.map(kind).iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Total for a single category
    pub fn get(&self, kind: TransactionType, category: &str) -> Option<Money> {
        self.map(kind).get(category).copied()
    }

    /// Number of categories with a positive total
    pub fn category_count(&self, kind: TransactionType) -> usize {
        self.map(kind).len()
    }

    /// Sum over every category of one type
    pub fn total(&self, kind: TransactionType) -> Money {
        self.map(kind).values().sum()
    }

    /// Categories of one type ordered by total (largest first), then by name
    pub fn ranked(&self, kind: TransactionType) -> Vec<(String, Money)> {
        let mut entries: Vec<_> = self
            .map(kind)
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expense.is_empty()
    }

    pub fn clear(&mut self) {
        self.income.clear();
        self.expense.clear();
    }
}
