//! Persistent storage using RocksDB.
//!
//! Backed by a pessimistic `TransactionDB`, so uniqueness and status
//! transitions are enforced by row locks inside the store rather than by
//! locks in this process. Any number of handles, threads or processes may
//! race on the same rows.
//!
//! # Key Layout
//!
//! ```text
//! case:{case_id}                       → Case (JSON)
//! pending:{created_at:020}:{case_id}   → ()       FIFO index of pending cases
//! verdict:{case_id}:{juror_id}         → Verdict  uniqueness key
//! juror:{juror_id}:{case_id}           → Verdict  per-juror index
//! ```

use crate::error::{Error, Result};
use crate::models::{Case, Verdict};
use rocksdb::{Options, Transaction, TransactionDB, TransactionDBOptions};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Default wait for a row lock before giving up with `Unavailable`.
pub const DEFAULT_LOCK_TIMEOUT_MS: i64 = 1000;

/// A transaction over the court store.
pub type Txn<'db> = Transaction<'db, TransactionDB>;

pub(crate) mod keys {
    pub const PENDING_PREFIX: &str = "pending:";

    pub fn case(case_id: &str) -> String {
        format!("case:{}", case_id)
    }

    pub fn pending(created_at: u64, case_id: &str) -> String {
        format!("{}{:020}:{}", PENDING_PREFIX, created_at, case_id)
    }

    pub fn verdict(case_id: &str, juror_id: &str) -> String {
        format!("verdict:{}:{}", case_id, juror_id)
    }

    pub fn case_verdicts(case_id: &str) -> String {
        format!("verdict:{}:", case_id)
    }

    pub fn juror_verdict(juror_id: &str, case_id: &str) -> String {
        format!("juror:{}:{}", juror_id, case_id)
    }

    pub fn juror_verdicts(juror_id: &str) -> String {
        format!("juror:{}:", juror_id)
    }
}

/// Storage backend for court data.
pub struct Storage {
    db: TransactionDB,
}

impl Storage {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_lock_timeout(path, DEFAULT_LOCK_TIMEOUT_MS)
    }

    /// Open with an explicit row-lock wait in milliseconds.
    pub fn open_with_lock_timeout<P: AsRef<Path>>(path: P, lock_timeout_ms: i64) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(lock_timeout_ms);
        let db = TransactionDB::open(&opts, &txn_opts, path)?;
        Ok(Self { db })
    }

    /// Begin a pessimistic transaction. Dropping it uncommitted rolls back.
    pub fn transaction(&self) -> Txn<'_> {
        self.db.transaction()
    }

    // --- Cases ---

    /// Insert a new pending case and its queue index entry.
    pub fn insert_case(&self, case: &Case) -> Result<()> {
        let key = keys::case(&case.id);
        let txn = self.transaction();
        if txn.get_for_update(key.as_bytes(), true)?.is_some() {
            return Err(Error::CaseExists(case.id.clone()));
        }
        txn.put(key.as_bytes(), serde_json::to_vec(case)?)?;
        if case.is_pending() {
            txn.put(keys::pending(case.created_at, &case.id).as_bytes(), b"")?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a case by ID.
    pub fn get_case(&self, id: &str) -> Result<Option<Case>> {
        self.get_json(&keys::case(id))
    }

    /// Pending case IDs, oldest first, ties by case ID.
    pub fn pending_case_ids(&self) -> Result<Vec<String>> {
        let prefix = keys::PENDING_PREFIX.as_bytes();
        let mut ids = Vec::new();

        let iter = self.db.prefix_iterator(prefix);
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            // "pending:{created_at}:{case_id}"
            let key_str = String::from_utf8_lossy(&key);
            if let Some((_, id)) = key_str[prefix.len()..].split_once(':') {
                ids.push(id.to_string());
            }
        }

        Ok(ids)
    }

    // --- Verdicts ---

    /// Get the verdict a juror cast on a case, if any.
    pub fn get_verdict(&self, case_id: &str, juror_id: &str) -> Result<Option<Verdict>> {
        self.get_json(&keys::verdict(case_id, juror_id))
    }

    /// Whether a juror has voted on a case.
    pub fn has_verdict(&self, case_id: &str, juror_id: &str) -> Result<bool> {
        Ok(self
            .db
            .get(keys::verdict(case_id, juror_id).as_bytes())?
            .is_some())
    }

    /// All verdicts on one case.
    pub fn verdicts_for_case(&self, case_id: &str) -> Result<Vec<Verdict>> {
        self.scan(&keys::case_verdicts(case_id))
    }

    /// All verdicts one juror has cast.
    pub fn verdicts_by_juror(&self, juror_id: &str) -> Result<Vec<Verdict>> {
        self.scan(&keys::juror_verdicts(juror_id))
    }

    // --- Helpers ---

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let prefix = prefix.as_bytes();
        let mut items = Vec::new();

        let iter = self.db.prefix_iterator(prefix);
        for item in iter {
            let (key, value) = item?;
            if key.starts_with(prefix) {
                items.push(serde_json::from_slice(&value)?);
            } else {
                break;
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, Vote};
    use tempfile::tempdir;

    #[test]
    fn case_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let case = fixtures::case("p1", "alice", 10);
        storage.insert_case(&case).unwrap();

        let loaded = storage.get_case(&case.id).unwrap().unwrap();
        assert_eq!(case, loaded);
        assert!(storage.get_case("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_case_conflicts() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let case = fixtures::case("p1", "alice", 10);
        storage.insert_case(&case).unwrap();
        assert!(matches!(
            storage.insert_case(&case),
            Err(Error::CaseExists(_))
        ));
    }

    #[test]
    fn pending_index_is_fifo() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let late = fixtures::case("late", "alice", 300);
        let early = fixtures::case("early", "alice", 5);
        let middle = fixtures::case("middle", "alice", 40);
        for case in [&late, &early, &middle] {
            storage.insert_case(case).unwrap();
        }

        let ids = storage.pending_case_ids().unwrap();
        assert_eq!(ids, vec![early.id, middle.id, late.id]);
    }

    #[test]
    fn verdict_scans_stay_within_prefix() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let txn = storage.transaction();
        for (case_id, juror_id) in [("c1", "ann"), ("c1", "bob"), ("c2", "ann")] {
            let v = Verdict::new(case_id, juror_id, Vote::Guilty, 1);
            let bytes = serde_json::to_vec(&v).unwrap();
            txn.put(keys::verdict(case_id, juror_id).as_bytes(), &bytes).unwrap();
            txn.put(keys::juror_verdict(juror_id, case_id).as_bytes(), &bytes)
                .unwrap();
        }
        txn.commit().unwrap();

        assert_eq!(storage.verdicts_for_case("c1").unwrap().len(), 2);
        assert_eq!(storage.verdicts_for_case("c2").unwrap().len(), 1);
        assert_eq!(storage.verdicts_by_juror("ann").unwrap().len(), 2);
        assert_eq!(storage.verdicts_by_juror("bob").unwrap().len(), 1);
        assert!(storage.has_verdict("c1", "bob").unwrap());
        assert!(!storage.has_verdict("c2", "bob").unwrap());
        assert_eq!(
            storage.get_verdict("c2", "ann").unwrap().unwrap().case_id,
            "c2"
        );
    }
}
