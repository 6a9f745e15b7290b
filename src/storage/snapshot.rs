//! Ledger snapshots
//!
//! The full ledger state is written under six keys after every mutation and
//! read back once at startup. Reading is forgiving: a key that is missing or
//! cannot be decoded falls back to its empty value without disturbing the
//! others, and individual bad transaction entries are dropped.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{TallyError, TallyResult};
use crate::ledger::{CategoryTotals, Ledger};
use crate::models::{IdCounter, Money, Transaction, TransactionId, TransactionType};

use super::store::SnapshotStore;

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const INCOME_KEY: &str = "incomeData";
pub const EXPENSE_KEY: &str = "expenseData";
pub const BALANCE_KEY: &str = "balance";
pub const CURRENT_BALANCE_KEY: &str = "currentBalance";
pub const NEXT_ID_KEY: &str = "nextId";

/// Every key a snapshot writes
pub const SNAPSHOT_KEYS: [&str; 6] = [
    TRANSACTIONS_KEY,
    INCOME_KEY,
    EXPENSE_KEY,
    BALANCE_KEY,
    CURRENT_BALANCE_KEY,
    NEXT_ID_KEY,
];

/// Transaction entry as found in a stored snapshot
///
/// Older snapshots may lack an id or carry odd timestamps, so those two are
/// taken loosely and fixed up after decoding.
#[derive(Debug, Deserialize)]
struct StoredTransaction {
    #[serde(default)]
    id: Option<Value>,
    #[serde(rename = "type")]
    kind: TransactionType,
    category: String,
    amount: Money,
    date: NaiveDate,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    timestamp: Option<Value>,
}

impl StoredTransaction {
    fn stored_id(&self) -> Option<u64> {
        let id = match self.id.as_ref()? {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }?;
        (id <= TransactionId::MAX_STORED).then_some(id)
    }

    fn stored_timestamp(&self) -> Option<DateTime<Utc>> {
        match self.timestamp.as_ref()? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
            _ => None,
        }
    }

    fn into_transaction(self, id: u64, now: DateTime<Utc>) -> Transaction {
        let timestamp = self.stored_timestamp().unwrap_or(now);
        Transaction {
            id: TransactionId::new(id),
            kind: self.kind,
            category: self.category.trim().to_string(),
            amount: self.amount,
            date: self.date,
            description: self.description.unwrap_or_default().trim().to_string(),
            balance: Money::zero(),
            timestamp,
        }
    }
}

/// Write the whole ledger to the store
pub fn save_snapshot<S>(ledger: &Ledger, store: &mut S) -> TallyResult<()>
where
    S: SnapshotStore + ?Sized,
{
    let totals = ledger.totals();
    let income: BTreeMap<&str, Money> = totals.iter(TransactionType::Income).collect();
    let expense: BTreeMap<&str, Money> = totals.iter(TransactionType::Expense).collect();
    let balance = ledger.current_balance().to_string();

    store.set_all(vec![
        (TRANSACTIONS_KEY, serde_json::to_string(ledger.transactions())?),
        (INCOME_KEY, serde_json::to_string(&income)?),
        (EXPENSE_KEY, serde_json::to_string(&expense)?),
        (BALANCE_KEY, balance.clone()),
        (CURRENT_BALANCE_KEY, balance),
        (NEXT_ID_KEY, ledger.next_id().to_string()),
    ])?;

    debug!(transactions = ledger.len(), "saved snapshot");
    Ok(())
}

/// Rebuild a ledger from the store
///
/// `now` seeds ids for entries that have none and stands in for missing
/// timestamps. Only failures of the store itself are returned as errors.
pub fn load_snapshot<S>(store: &S, now: DateTime<Utc>) -> TallyResult<Ledger>
where
    S: SnapshotStore + ?Sized,
{
    let transactions = load_transactions(store, now)?;

    let stored_totals = CategoryTotals::from_maps(
        decode_key::<HashMap<String, Money>, _>(store, INCOME_KEY)?.unwrap_or_default(),
        decode_key::<HashMap<String, Money>, _>(store, EXPENSE_KEY)?.unwrap_or_default(),
    );
    let derived_totals = CategoryTotals::from_transactions(&transactions);
    let totals = if stored_totals == derived_totals {
        stored_totals
    } else {
        warn!("stored category totals disagree with transactions, rebuilding");
        derived_totals
    };

    let ids = match decode_key::<u64, _>(store, NEXT_ID_KEY)? {
        Some(next) if next <= TransactionId::MAX_STORED => IdCounter::starting_at(next),
        Some(next) => {
            warn!(next, "ignoring out-of-range stored next id");
            IdCounter::new()
        }
        None => IdCounter::new(),
    };

    let stored_balance = match decode_key::<Money, _>(store, CURRENT_BALANCE_KEY)? {
        Some(balance) => Some(balance),
        None => decode_key::<Money, _>(store, BALANCE_KEY)?,
    };

    let ledger = Ledger::hydrate(transactions, totals, ids);

    if let Some(stored) = stored_balance {
        if stored != ledger.current_balance() {
            warn!(
                stored = %stored,
                derived = %ledger.current_balance(),
                "stored balance disagrees with transactions, using derived value"
            );
        }
    }

    debug!(
        transactions = ledger.len(),
        next_id = %ledger.next_id(),
        "loaded snapshot"
    );
    Ok(ledger)
}

/// Read and decode one key; a missing or undecodable value yields `None`
fn decode_key<T, S>(store: &S, key: &str) -> TallyResult<Option<T>>
where
    T: DeserializeOwned,
    S: SnapshotStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<T>(raw.trim()) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let err = TallyError::Deserialization(format!("{}: {}", key, e));
            warn!(error = %err, "ignoring unreadable snapshot field");
            Ok(None)
        }
    }
}

fn load_transactions<S>(store: &S, now: DateTime<Utc>) -> TallyResult<Vec<Transaction>>
where
    S: SnapshotStore + ?Sized,
{
    let Some(entries) = decode_key::<Vec<Value>, _>(store, TRANSACTIONS_KEY)? else {
        return Ok(Vec::new());
    };

    let mut stored = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StoredTransaction>(entry) {
            Ok(txn) if !txn.amount.is_positive() => {
                warn!(index, amount = %txn.amount, "skipping stored transaction with non-positive amount");
            }
            Ok(txn) if txn.amount > Money::MAX_AMOUNT => {
                warn!(index, amount = %txn.amount, "skipping stored transaction with oversized amount");
            }
            Ok(txn) if txn.category.trim().is_empty() => {
                warn!(index, "skipping stored transaction without a category");
            }
            Ok(txn) => stored.push(txn),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed stored transaction");
            }
        }
    }

    // Keep the first holder of each id; later duplicates get a fresh one
    let mut seen = HashSet::new();
    let ids: Vec<Option<u64>> = stored
        .iter()
        .map(|txn| txn.stored_id().filter(|id| seen.insert(*id)))
        .collect();

    let max_id = ids.iter().flatten().copied().max().unwrap_or(0);
    let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let seed = now_ms.max(max_id.saturating_add(1));

    let mut backfilled = 0usize;
    let transactions: Vec<Transaction> = stored
        .into_iter()
        .zip(ids)
        .enumerate()
        .map(|(index, (txn, id))| {
            let id = id.unwrap_or_else(|| {
                backfilled += 1;
                seed.saturating_add(index as u64)
            });
            txn.into_transaction(id, now)
        })
        .collect();

    if backfilled > 0 {
        warn!(count = backfilled, "assigned ids to stored transactions without one");
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::models::NewTransaction;
    use crate::storage::store::MemoryStore;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample_ledger() -> Ledger {
        let clock = FixedClock::on(date(2024, 3, 1));
        let mut ledger = Ledger::new();
        for (kind, category, units, on) in [
            (TransactionType::Income, "Salary", 1000, date(2024, 1, 5)),
            (TransactionType::Expense, "Food", 200, date(2024, 1, 1)),
            (TransactionType::Expense, "Rent", 300, date(2024, 2, 1)),
        ] {
            ledger
                .add(
                    NewTransaction::new(kind, category, Money::from_units(units), on, "note"),
                    &clock,
                )
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_round_trip() {
        let ledger = sample_ledger();
        let mut store = MemoryStore::new();
        save_snapshot(&ledger, &mut store).unwrap();

        let loaded = load_snapshot(&store, now()).unwrap();
        assert_eq!(loaded, ledger);
    }

    #[test]
    fn test_save_writes_every_key() {
        let ledger = sample_ledger();
        let mut store = MemoryStore::new();
        save_snapshot(&ledger, &mut store).unwrap();

        let mut expected: Vec<String> = SNAPSHOT_KEYS.iter().map(|k| k.to_string()).collect();
        expected.sort();
        assert_eq!(store.keys().unwrap(), expected);

        assert_eq!(store.get(BALANCE_KEY).unwrap().as_deref(), Some("500"));
        assert_eq!(store.get(CURRENT_BALANCE_KEY).unwrap().as_deref(), Some("500"));
        assert_eq!(store.get(NEXT_ID_KEY).unwrap().as_deref(), Some("4"));
        assert_eq!(
            store.get(EXPENSE_KEY).unwrap().as_deref(),
            Some(r#"{"Food":200,"Rent":300}"#)
        );
    }

    #[test]
    fn test_empty_store_gives_empty_ledger() {
        let store = MemoryStore::new();
        let ledger = load_snapshot(&store, now()).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.current_balance(), Money::zero());
        assert_eq!(ledger.next_id(), TransactionId::new(1));
    }

    #[test]
    fn test_unreadable_key_leaves_others_intact() {
        let ledger = sample_ledger();
        let mut store = MemoryStore::new();
        save_snapshot(&ledger, &mut store).unwrap();
        store.set(INCOME_KEY, "{broken".into()).unwrap();
        store.set(BALANCE_KEY, "lots".into()).unwrap();

        let loaded = load_snapshot(&store, now()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.current_balance(), Money::from_units(500));
        // Totals come back from the transactions themselves
        assert_eq!(loaded.total_income(), Money::from_units(1000));
    }

    #[test]
    fn test_corrupt_transactions_key_gives_empty_list() {
        let mut store = MemoryStore::new();
        store.set(TRANSACTIONS_KEY, "not json".into()).unwrap();
        store.set(EXPENSE_KEY, r#"{"Food":200}"#.into()).unwrap();

        let loaded = load_snapshot(&store, now()).unwrap();
        assert!(loaded.is_empty());
        // Totals without transactions to back them are dropped
        assert_eq!(loaded.category_count(TransactionType::Expense), 0);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let mut store = MemoryStore::new();
        store
            .set(
                TRANSACTIONS_KEY,
                r#"[
                    {"id": 1, "type": "income", "category": "Salary", "amount": 1000,
                     "date": "2024-01-05", "description": "", "balance": 1000,
                     "timestamp": "2024-01-05T10:00:00.000Z"},
                    {"id": 2, "type": "transfer", "category": "X", "amount": 5,
                     "date": "2024-01-06"},
                    {"id": 3, "type": "expense", "category": "Food", "amount": 0,
                     "date": "2024-01-07"},
                    {"id": 4, "type": "expense", "category": "Food", "amount": 50,
                     "date": "not a date"},
                    {"id": 5, "type": "expense", "category": "Food", "amount": 12.5,
                     "date": "2024-01-08", "description": null}
                ]"#
                .into(),
            )
            .unwrap();

        let loaded = load_snapshot(&store, now()).unwrap();
        let ids: Vec<u64> = loaded.transactions().iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(loaded.current_balance(), Money::from_cents(98750));
        assert_eq!(loaded.transactions()[1].description, "");
        assert_eq!(loaded.next_id(), TransactionId::new(6));
    }

    #[test]
    fn test_missing_ids_are_backfilled_past_existing() {
        let mut store = MemoryStore::new();
        store
            .set(
                TRANSACTIONS_KEY,
                r#"[
                    {"type": "income", "category": "Salary", "amount": 1000, "date": "2024-01-05"},
                    {"id": 7, "type": "expense", "category": "Food", "amount": 100, "date": "2024-01-06"},
                    {"type": "expense", "category": "Rent", "amount": 100, "date": "2024-01-07"}
                ]"#
                .into(),
            )
            .unwrap();

        let at = now();
        let loaded = load_snapshot(&store, at).unwrap();
        let seed = at.timestamp_millis() as u64;
        let ids: Vec<u64> = loaded.transactions().iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![seed, 7, seed + 2]);
        assert_eq!(loaded.next_id(), TransactionId::new(seed + 3));
        assert_eq!(loaded.transactions()[0].timestamp, at);
    }

    #[test]
    fn test_huge_stored_id_is_backfilled() {
        let mut store = MemoryStore::new();
        store
            .set(
                TRANSACTIONS_KEY,
                r#"[
                    {"id": 18446744073709551615, "type": "income", "category": "Salary", "amount": 10, "date": "2024-01-05"},
                    {"id": "18446744073709551615", "type": "income", "category": "Bonus", "amount": 10, "date": "2024-01-06"},
                    {"id": 1e30, "type": "expense", "category": "Food", "amount": 5, "date": "2024-01-07"},
                    {"id": 4, "type": "expense", "category": "Rent", "amount": 5, "date": "2024-01-08"}
                ]"#
                .into(),
            )
            .unwrap();
        store.set(NEXT_ID_KEY, "18446744073709551615".into()).unwrap();

        let at = now();
        let loaded = load_snapshot(&store, at).unwrap();
        let seed = at.timestamp_millis() as u64;
        let ids: Vec<u64> = loaded.transactions().iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![seed, seed + 1, seed + 2, 4]);
        assert_eq!(loaded.next_id(), TransactionId::new(seed + 3));
        assert_eq!(loaded.current_balance(), Money::from_units(10));
    }

    #[test]
    fn test_oversized_amounts_are_skipped() {
        let mut store = MemoryStore::new();
        store
            .set(
                TRANSACTIONS_KEY,
                r#"[
                    {"id": 1, "type": "income", "category": "Salary", "amount": 92000000000000000, "date": "2024-01-05"},
                    {"id": 2, "type": "income", "category": "Salary", "amount": 92000000000000000, "date": "2024-01-06"},
                    {"id": 3, "type": "expense", "category": "Food", "amount": 12.5, "date": "2024-01-07"}
                ]"#
                .into(),
            )
            .unwrap();

        let loaded = load_snapshot(&store, now()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.transactions()[0].id, TransactionId::new(3));
        assert_eq!(loaded.current_balance(), Money::from_cents(-1250));
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let mut store = MemoryStore::new();
        store
            .set(
                TRANSACTIONS_KEY,
                r#"[
                    {"id": 3, "type": "income", "category": "Salary", "amount": 10, "date": "2024-01-05"},
                    {"id": 3, "type": "income", "category": "Bonus", "amount": 10, "date": "2024-01-06"}
                ]"#
                .into(),
            )
            .unwrap();

        let loaded = load_snapshot(&store, now()).unwrap();
        let first = loaded.transactions()[0].id;
        let second = loaded.transactions()[1].id;
        assert_eq!(first, TransactionId::new(3));
        assert_ne!(first, second);
    }

    #[test]
    fn test_stale_totals_are_rebuilt() {
        let ledger = sample_ledger();
        let mut store = MemoryStore::new();
        save_snapshot(&ledger, &mut store).unwrap();
        store
            .set(EXPENSE_KEY, r#"{"Food":999,"Ghost":1}"#.into())
            .unwrap();

        let loaded = load_snapshot(&store, now()).unwrap();
        assert_eq!(loaded.totals(), ledger.totals());
    }

    #[test]
    fn test_stored_next_id_survives_clear() {
        let clock = FixedClock::on(date(2024, 3, 1));
        let mut ledger = sample_ledger();
        ledger.clear();
        let mut store = MemoryStore::new();
        save_snapshot(&ledger, &mut store).unwrap();

        let mut loaded = load_snapshot(&store, clock.now()).unwrap();
        let txn = loaded
            .add(
                NewTransaction::new(
                    TransactionType::Income,
                    "Gift",
                    Money::from_units(5),
                    date(2024, 2, 2),
                    "",
                ),
                &clock,
            )
            .unwrap();
        assert_eq!(txn.id, TransactionId::new(4));
    }
}
