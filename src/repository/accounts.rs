//! Account Repository
//!
//! Reads and writes accounts in the accounts namespace: one document that
//! maps identifier to account record.

use std::collections::BTreeMap;

use crate::domain::{Balance, DomainError};
use crate::error::AppResult;
use crate::model::Account;
use crate::store::{get_typed, set_typed, KeyValueStore};

type AccountMap = BTreeMap<String, Account>;

/// Repository for account records
#[derive(Debug, Clone)]
pub struct AccountRepository {
    key: String,
}

impl AccountRepository {
    /// Create a repository over the accounts document stored at `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn load<S: KeyValueStore + ?Sized>(&self, store: &S) -> AppResult<AccountMap> {
        Ok(get_typed(store, &self.key)?.unwrap_or_default())
    }

    fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S, accounts: &AccountMap) -> AppResult<()> {
        set_typed(store, &self.key, accounts)?;
        Ok(())
    }

    // =========================================================================
    // create
    // =========================================================================

    /// Insert a new account; fails if the identifier is already registered
    pub fn create<S: KeyValueStore + ?Sized>(&self, store: &mut S, account: Account) -> AppResult<Account> {
        let mut accounts = self.load(store)?;

        if accounts.contains_key(account.identifier()) {
            return Err(DomainError::DuplicateIdentifier(account.identifier().to_string()).into());
        }

        accounts.insert(account.identifier().to_string(), account.clone());
        self.save(store, &accounts)?;

        tracing::debug!(identifier = %account.identifier(), "Account created");
        Ok(account)
    }

    // =========================================================================
    // get
    // =========================================================================

    pub fn get<S: KeyValueStore + ?Sized>(&self, store: &S, identifier: &str) -> AppResult<Option<Account>> {
        Ok(self.load(store)?.remove(identifier))
    }

    /// Exact, case-sensitive display name lookup
    pub fn find_by_display_name<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        display_name: &str,
    ) -> AppResult<Option<Account>> {
        Ok(self
            .load(store)?
            .into_values()
            .find(|a| a.display_name() == display_name))
    }

    // =========================================================================
    // set_balance
    // =========================================================================

    /// Overwrite an account's balance. Negative targets clamp to 0.
    pub fn set_balance<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        identifier: &str,
        new_balance: i64,
    ) -> AppResult<Account> {
        let mut accounts = self.load(store)?;

        let account = accounts
            .remove(identifier)
            .ok_or_else(|| DomainError::AccountNotFound(identifier.to_string()))?
            .with_balance(Balance::clamped(new_balance));

        accounts.insert(identifier.to_string(), account.clone());
        self.save(store, &accounts)?;

        Ok(account)
    }

    // =========================================================================
    // list_all
    // =========================================================================

    /// Every stored account, in no guaranteed order
    pub fn list_all<S: KeyValueStore + ?Sized>(&self, store: &S) -> AppResult<Vec<Account>> {
        Ok(self.load(store)?.into_values().collect())
    }
}
