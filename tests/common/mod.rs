//! Common test utilities
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use chip_ledger::clock::ManualClock;
use chip_ledger::rewards::RandomSource;
use chip_ledger::store::StoreError;
use chip_ledger::{AdminCredentials, KeyValueStore, LedgerService, MemoryStore, Namespaces, Session, SignupCommand};

pub const PREFIX: &str = "bandTest01";
pub const ADMIN_ID: &str = "admin@bandtest.com";
pub const ADMIN_SECRET: &str = "admin123";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 8, 30, 0).unwrap()
}

pub fn admin_credentials() -> AdminCredentials {
    AdminCredentials::new(ADMIN_ID, ADMIN_SECRET)
}

/// Ledger over `store` with a fixed clock and the given randomness
pub fn ledger_over<S: KeyValueStore>(
    store: S,
    random: impl RandomSource + 'static,
    clock: &ManualClock,
) -> LedgerService<S> {
    LedgerService::new(store, Namespaces::new(PREFIX), admin_credentials())
        .expect("Failed to open ledger")
        .with_random(random)
        .with_clock(clock.clone())
}

pub fn memory_ledger(random: impl RandomSource + 'static) -> (LedgerService<MemoryStore>, ManualClock) {
    let clock = ManualClock::new(start_time());
    (ledger_over(MemoryStore::new(), random, &clock), clock)
}

/// Sign up `name` as `<name>@example.com` and return its session
pub fn join<S: KeyValueStore>(ledger: &mut LedgerService<S>, name: &str) -> Session {
    ledger
        .signup(SignupCommand::new(name, format!("{name}@example.com"), "secret1"))
        .expect("Failed to sign up")
        .session
}

/// Fresh temp directory and a store path inside it
pub fn temp_store_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ledger.json");
    (dir, path)
}

/// In-memory store whose writes to one key can be made to fail.
///
/// Clones share the failure counter, so a test can arm failures after the
/// store has been handed to a ledger.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    key: String,
    failures: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Fail the next `n` writes to the watched key
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn into_inner(self) -> MemoryStore {
        self.inner
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        if key == self.key
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(StoreError::io(
                "flaky",
                std::io::Error::new(std::io::ErrorKind::Other, "transient"),
            ));
        }
        self.inner.set(key, value)
    }
}
