//! The ledger store
//!
//! Owns the transaction sequence, the category totals and the scalar balance,
//! and keeps the three consistent on every mutation:
//!
//! - each transaction's `balance` is the prefix sum of signed amounts in
//!   ascending date order, equal dates keeping their relative order;
//! - the scalar balance equals the last transaction's `balance` (0 if empty);
//! - category totals match the live transactions, positive entries only.

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::error::{TallyError, TallyResult};
use crate::models::{
    IdCounter, Money, NewTransaction, Transaction, TransactionId, TransactionType,
};

use super::aggregator::CategoryTotals;

/// In-memory ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    totals: CategoryTotals,
    balance: Money,
    ids: IdCounter,
}

impl Ledger {
    /// An empty ledger whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from loaded parts
    ///
    /// Balances are recomputed and the id counter is moved past every id
    /// present, so the result satisfies the ledger invariants whatever the
    /// stored `balance` fields said.
    pub fn hydrate(
        transactions: Vec<Transaction>,
        totals: CategoryTotals,
        ids: IdCounter,
    ) -> Self {
        let mut ids = ids;
        for txn in &transactions {
            ids.observe(txn.id);
        }
        let mut ledger = Self {
            transactions,
            totals,
            balance: Money::zero(),
            ids,
        };
        ledger.recompute_balances();
        ledger
    }

    /// Record a new transaction
    ///
    /// The input is checked against `clock.today()`; on failure nothing changes.
    pub fn add<C: Clock>(&mut self, input: NewTransaction, clock: &C) -> TallyResult<Transaction> {
        input
            .validate(clock.today())
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        let id = self.ids.allocate();
        let txn = Transaction::new(id, input, clock.now());
        self.totals.record(txn.kind, &txn.category, txn.amount);
        self.transactions.push(txn);

        // The new entry may predate existing ones
        self.recompute_balances();

        self.get(id)
            .cloned()
            .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))
    }

    /// Remove a transaction, returning false if the id is unknown
    pub fn delete(&mut self, id: TransactionId) -> bool {
        let Some(index) = self.transactions.iter().position(|t| t.id == id) else {
            return false;
        };

        let txn = self.transactions.remove(index);
        self.totals.reverse(txn.kind, &txn.category, txn.amount);
        self.recompute_balances();
        true
    }

    /// Drop every transaction and total
    ///
    /// The id counter is kept so ids of cleared transactions are not reissued.
    pub fn clear(&mut self) {
        self.transactions.clear();
        self.totals.clear();
        self.balance = Money::zero();
    }

    /// Current total balance
    pub fn current_balance(&self) -> Money {
        self.balance
    }

    /// Transactions in current ledger order (ascending by date after any mutation)
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Look up a transaction by id
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Category totals for both types
    pub fn totals(&self) -> &CategoryTotals {
        &self.totals
    }

    /// Snapshot copy of the category totals for one type
    pub fn category_totals(&self, kind: TransactionType) -> std::collections::HashMap<String, Money> {
        self.totals.totals(kind)
    }

    /// Number of categories of one type with a positive total
    pub fn category_count(&self, kind: TransactionType) -> usize {
        self.totals.category_count(kind)
    }

    /// Sum of all income
    pub fn total_income(&self) -> Money {
        self.totals.total(TransactionType::Income)
    }

    /// Sum of all expenses
    pub fn total_expenses(&self) -> Money {
        self.totals.total(TransactionType::Expense)
    }

    /// The id the next `add` will assign
    pub fn next_id(&self) -> TransactionId {
        self.ids.peek()
    }

    /// Date range covered by the ledger
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.transactions.first()?.date;
        let last = self.transactions.last()?.date;
        Some((first, last))
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Re-sort by date (stable) and reassign every running balance
    fn recompute_balances(&mut self) {
        self.transactions.sort_by_key(|t| t.date);

        let mut running = Money::zero();
        for txn in &mut self.transactions {
            running += txn.signed_amount();
            txn.balance = running;
        }
        self.balance = running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::on(date(2024, 3, 1))
    }

    fn income(category: &str, units: i64, on: NaiveDate) -> NewTransaction {
        NewTransaction::new(TransactionType::Income, category, Money::from_units(units), on, "")
    }

    fn expense(category: &str, units: i64, on: NaiveDate) -> NewTransaction {
        NewTransaction::new(TransactionType::Expense, category, Money::from_units(units), on, "")
    }

    /// Recompute every invariant independently of the ledger's own bookkeeping
    fn assert_invariants(ledger: &Ledger) {
        let mut sorted: Vec<_> = ledger.transactions().to_vec();
        sorted.sort_by_key(|t| t.date);
        let mut running = Money::zero();
        for txn in &sorted {
            running += txn.signed_amount();
            assert_eq!(txn.balance, running, "running balance of #{}", txn.id);
        }
        assert_eq!(ledger.current_balance(), running);

        for kind in [TransactionType::Income, TransactionType::Expense] {
            let expected = CategoryTotals::from_transactions(ledger.transactions());
            assert_eq!(ledger.category_totals(kind), expected.totals(kind));
            assert!(ledger.totals().iter(kind).all(|(_, v)| v.is_positive()));
        }
    }

    #[test]
    fn test_add_income() {
        let mut ledger = Ledger::new();
        let txn = ledger
            .add(income("Salary", 1000, date(2024, 1, 5)), &clock())
            .unwrap();

        assert_eq!(txn.balance, Money::from_units(1000));
        assert_eq!(ledger.current_balance(), Money::from_units(1000));
        assert_eq!(
            ledger.category_totals(TransactionType::Income),
            std::collections::HashMap::from([("Salary".to_string(), Money::from_units(1000))])
        );
        assert_invariants(&ledger);
    }

    #[test]
    fn test_add_earlier_date_recomputes() {
        let mut ledger = Ledger::new();
        let salary = ledger
            .add(income("Salary", 1000, date(2024, 1, 5)), &clock())
            .unwrap();
        let food = ledger
            .add(expense("Food", 200, date(2024, 1, 1)), &clock())
            .unwrap();

        assert_eq!(food.balance, Money::from_units(-200));
        assert_eq!(ledger.get(salary.id).unwrap().balance, Money::from_units(800));
        assert_eq!(ledger.current_balance(), Money::from_units(800));
        assert_eq!(ledger.transactions()[0].id, food.id);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_delete_recomputes_and_prunes() {
        let mut ledger = Ledger::new();
        let salary = ledger
            .add(income("Salary", 1000, date(2024, 1, 5)), &clock())
            .unwrap();
        let food = ledger
            .add(expense("Food", 200, date(2024, 1, 1)), &clock())
            .unwrap();

        assert!(ledger.delete(food.id));
        assert_eq!(ledger.get(salary.id).unwrap().balance, Money::from_units(1000));
        assert!(ledger.category_totals(TransactionType::Expense).is_empty());
        assert_eq!(ledger.current_balance(), Money::from_units(1000));
        assert_invariants(&ledger);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut ledger = Ledger::new();
        ledger
            .add(income("Salary", 10, date(2024, 1, 5)), &clock())
            .unwrap();
        let before = ledger.clone();

        assert!(!ledger.delete(TransactionId::new(999)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_validation_is_all_or_nothing() {
        let mut ledger = Ledger::new();
        let before = ledger.clone();

        let err = ledger
            .add(expense("Food", 0, date(2024, 1, 1)), &clock())
            .unwrap_err();
        assert!(err.is_validation());

        let err = ledger
            .add(expense("   ", 5, date(2024, 1, 1)), &clock())
            .unwrap_err();
        assert!(err.is_validation());

        let err = ledger
            .add(expense("Food", 5, date(2024, 3, 2)), &clock())
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(ledger, before);
        assert_eq!(ledger.next_id(), TransactionId::new(1));
    }

    #[test]
    fn test_oversized_amount_is_rejected() {
        let mut ledger = Ledger::new();
        let big = Money::parse("90000000000000000").unwrap();
        let input = NewTransaction::new(TransactionType::Income, "A", big, date(2024, 1, 1), "");
        let err = ledger.add(input.clone(), &clock()).unwrap_err();
        assert!(err.is_validation());
        assert!(ledger.add(input, &clock()).is_err());
        assert!(ledger.is_empty());

        let max = NewTransaction::new(
            TransactionType::Income,
            "A",
            Money::MAX_AMOUNT,
            date(2024, 1, 1),
            "",
        );
        ledger.add(max.clone(), &clock()).unwrap();
        ledger.add(max, &clock()).unwrap();
        assert_eq!(ledger.current_balance(), Money::MAX_AMOUNT + Money::MAX_AMOUNT);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_add_today_is_allowed() {
        let mut ledger = Ledger::new();
        assert!(ledger.add(income("Gift", 5, date(2024, 3, 1)), &clock()).is_ok());
    }

    #[test]
    fn test_equal_dates_keep_insertion_order() {
        let mut ledger = Ledger::new();
        let day = date(2024, 2, 2);
        let a = ledger.add(income("Salary", 100, day), &clock()).unwrap();
        let b = ledger.add(expense("Food", 30, day), &clock()).unwrap();
        let c = ledger.add(expense("Fuel", 20, day), &clock()).unwrap();

        let ids: Vec<_> = ledger.transactions().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
        let balances: Vec<_> = ledger.transactions().iter().map(|t| t.balance).collect();
        assert_eq!(
            balances,
            vec![Money::from_units(100), Money::from_units(70), Money::from_units(50)]
        );
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut ledger = Ledger::new();
        let a = ledger.add(income("A", 1, date(2024, 1, 1)), &clock()).unwrap();
        let b = ledger.add(income("B", 1, date(2024, 1, 1)), &clock()).unwrap();
        assert_ne!(a.id, b.id);

        ledger.delete(b.id);
        let c = ledger.add(income("C", 1, date(2024, 1, 1)), &clock()).unwrap();
        assert!(c.id > b.id);

        ledger.clear();
        let d = ledger.add(income("D", 1, date(2024, 1, 1)), &clock()).unwrap();
        assert!(d.id > c.id);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut ledger = Ledger::new();
        ledger.add(income("Salary", 10, date(2024, 1, 1)), &clock()).unwrap();
        ledger.add(expense("Food", 3, date(2024, 1, 2)), &clock()).unwrap();

        ledger.clear();
        let once = ledger.clone();
        ledger.clear();

        assert_eq!(ledger, once);
        assert!(ledger.is_empty());
        assert!(ledger.totals().is_empty());
        assert_eq!(ledger.current_balance(), Money::zero());
    }

    #[test]
    fn test_shared_category_partial_delete() {
        let mut ledger = Ledger::new();
        let a = ledger.add(expense("Food", 200, date(2024, 1, 1)), &clock()).unwrap();
        ledger.add(expense("Food", 50, date(2024, 1, 2)), &clock()).unwrap();

        ledger.delete(a.id);
        assert_eq!(
            ledger.totals().get(TransactionType::Expense, "Food"),
            Some(Money::from_units(50))
        );
        assert_invariants(&ledger);
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        // Deterministic pseudo-random walk of adds and deletes
        let mut ledger = Ledger::new();
        let categories = ["Food", "Rent", "Salary", "Gift", "Fuel"];
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..200 {
            let roll = next();
            if roll % 4 == 0 && !ledger.is_empty() {
                let index = (next() as usize) % ledger.len();
                let id = ledger.transactions()[index].id;
                assert!(ledger.delete(id));
            } else {
                let kind = if roll % 3 == 0 {
                    TransactionType::Income
                } else {
                    TransactionType::Expense
                };
                let category = categories[(next() as usize) % categories.len()];
                let cents = (next() % 100_000) as i64 + 1;
                let day = date(2024, 1, 1) + chrono::Duration::days((next() % 60) as i64);
                let input = NewTransaction::new(kind, category, Money::from_cents(cents), day, "");
                ledger.add(input, &clock()).unwrap();
            }
            assert_invariants(&ledger);
        }
    }

    #[test]
    fn test_hydrate_recomputes_stale_balances() {
        let mut source = Ledger::new();
        source.add(income("Salary", 1000, date(2024, 1, 5)), &clock()).unwrap();
        source.add(expense("Food", 200, date(2024, 1, 1)), &clock()).unwrap();

        let mut stale = source.transactions().to_vec();
        for txn in &mut stale {
            txn.balance = Money::zero();
        }
        stale.reverse();

        let ledger = Ledger::hydrate(stale, source.totals().clone(), IdCounter::new());
        assert_eq!(ledger.current_balance(), Money::from_units(800));
        assert_eq!(ledger.next_id(), TransactionId::new(3));
        assert_invariants(&ledger);
    }

    #[test]
    fn test_date_range() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.date_range(), None);
        ledger.add(income("A", 1, date(2024, 2, 1)), &clock()).unwrap();
        ledger.add(income("B", 1, date(2024, 1, 1)), &clock()).unwrap();
        assert_eq!(ledger.date_range(), Some((date(2024, 1, 1), date(2024, 2, 1))));
    }
}
