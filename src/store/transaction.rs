//! Store Transaction
//!
//! Groups several document writes into one unit. Writes are staged in
//! memory; `commit` records them in a journal document first, applies them,
//! then clears the journal. A journal left in the store means a commit was
//! interrupted; `begin` replays it with `recover` before anything is read,
//! so no later commit is built on a half-applied one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{get_typed, set_typed, KeyValueStore, StoreError};

/// One staged document write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct JournalWrite {
    key: String,
    value: Value,
}

/// Journal document covering every write of one commit
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JournalEntry {
    id: Uuid,
    started_at: DateTime<Utc>,
    writes: Vec<JournalWrite>,
}

/// Write-staging view over a store.
///
/// Reads see this transaction's own staged writes. Dropping the transaction
/// without calling `commit` discards them.
#[derive(Debug)]
pub struct StoreTransaction<'a, S: KeyValueStore> {
    store: &'a mut S,
    journal_key: String,
    staged: BTreeMap<String, Value>,
}

impl<'a, S: KeyValueStore> StoreTransaction<'a, S> {
    /// Start a transaction, first finishing any commit that was cut short.
    ///
    /// Fails if a leftover journal cannot be replayed; nothing may be read
    /// or staged until it is.
    pub fn begin(store: &'a mut S, journal_key: impl Into<String>) -> Result<Self, StoreError> {
        let journal_key = journal_key.into();
        recover(&mut *store, &journal_key)?;

        Ok(Self {
            store,
            journal_key,
            staged: BTreeMap::new(),
        })
    }

    /// Number of distinct keys written so far
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Persist all staged writes; returns how many documents were written.
    ///
    /// A write that fails after the journal is recorded is retried once from
    /// the journal. If that fails too the journal stays behind for the next
    /// `begin` or `recover`.
    pub fn commit(self) -> Result<usize, StoreError> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let entry = JournalEntry {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            writes: self
                .staged
                .into_iter()
                .map(|(key, value)| JournalWrite { key, value })
                .collect(),
        };

        set_typed(&mut *self.store, &self.journal_key, &entry)?;
        let applied = apply(&mut *self.store, &entry.writes)
            .and_then(|()| self.store.set(&self.journal_key, Value::Null));

        if let Err(e) = applied {
            tracing::warn!(journal_id = %entry.id, error = %e, "Commit interrupted, retrying from journal");
            if let Err(retry) = recover(&mut *self.store, &self.journal_key) {
                tracing::error!(journal_id = %entry.id, error = %retry, "Journal left for replay");
                return Err(e);
            }
        }

        tracing::debug!(
            journal_id = %entry.id,
            writes = entry.writes.len(),
            "Transaction committed"
        );

        Ok(entry.writes.len())
    }
}

impl<S: KeyValueStore> KeyValueStore for StoreTransaction<'_, S> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.staged.get(key) {
            Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(value.clone())),
            None => self.store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.staged.insert(key.to_string(), value);
        Ok(())
    }
}

fn apply<S: KeyValueStore + ?Sized>(store: &mut S, writes: &[JournalWrite]) -> Result<(), StoreError> {
    for write in writes {
        store.set(&write.key, write.value.clone())?;
    }
    Ok(())
}

/// Replay a journal left behind by an interrupted commit.
///
/// Returns the number of writes replayed (0 when the store was clean).
/// Each write replaces a whole document, so replaying an already-applied
/// journal is harmless.
pub fn recover<S: KeyValueStore + ?Sized>(store: &mut S, journal_key: &str) -> Result<usize, StoreError> {
    let entry: Option<JournalEntry> = get_typed(&*store, journal_key)
        .map_err(|e| StoreError::Recovery(e.to_string()))?;

    let Some(entry) = entry else {
        return Ok(0);
    };

    tracing::warn!(
        journal_id = %entry.id,
        started_at = %entry.started_at,
        writes = entry.writes.len(),
        "Replaying interrupted transaction"
    );

    apply(store, &entry.writes)?;
    store.set(journal_key, Value::Null)?;

    Ok(entry.writes.len())
}
