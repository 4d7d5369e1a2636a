//! Code Registry
//!
//! Mints and redeems single-use redemption codes. All codes live in one
//! document in the codes namespace, keyed by code.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::domain::{Chips, DomainError, ValidationErrors};
use crate::error::{AppError, AppResult};
use crate::model::{Account, RedemptionCode, CODE_ALPHABET, CODE_LENGTH};
use crate::rewards::RandomSource;
use crate::store::{get_typed, set_typed, KeyValueStore};

use super::accounts::AccountRepository;

/// Fresh draws attempted before minting gives up on a crowded code space
pub const MAX_MINT_ATTEMPTS: u32 = 8;

type CodeMap = BTreeMap<String, RedemptionCode>;

/// Result of a successful redemption
#[derive(Debug, Clone)]
pub struct Redemption {
    pub code: RedemptionCode,
    pub previous_balance: u64,
    pub account: Account,
}

/// Registry of redemption codes
#[derive(Debug, Clone)]
pub struct CodeRegistry {
    key: String,
}

impl CodeRegistry {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn load<S: KeyValueStore + ?Sized>(&self, store: &S) -> AppResult<CodeMap> {
        Ok(get_typed(store, &self.key)?.unwrap_or_default())
    }

    fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S, codes: &CodeMap) -> AppResult<()> {
        set_typed(store, &self.key, codes)?;
        Ok(())
    }

    // =========================================================================
    // mint
    // =========================================================================

    /// Mint a new active code worth `grant`, expiring 24 hours after `now`.
    ///
    /// A draw that collides with a stored code is discarded and redrawn.
    pub fn mint<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        grant: Chips,
        rng: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> AppResult<RedemptionCode> {
        let mut codes = self.load(store)?;

        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let candidate = draw_code(rng);
            if codes.contains_key(&candidate) {
                tracing::warn!(attempt, code = %candidate, "Minted code collided, redrawing");
                continue;
            }

            let code = RedemptionCode::new(candidate.clone(), grant, now);
            codes.insert(candidate, code.clone());
            self.save(store, &codes)?;

            tracing::debug!(code = %code.code, grant = %grant, "Code minted");
            return Ok(code);
        }

        Err(AppError::CodeSpaceExhausted {
            attempts: MAX_MINT_ATTEMPTS,
        })
    }

    // =========================================================================
    // redeem
    // =========================================================================

    /// Redeem `code` for `identifier`: credit the grant and mark the code used.
    ///
    /// Failures are checked in order: not found, already used, expired,
    /// unknown account. Both writes go to `store`; pass a transaction to
    /// make them land together.
    pub fn redeem<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        accounts: &AccountRepository,
        code: &str,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Redemption> {
        let normalized = normalize(code);
        if normalized.is_empty() {
            return Err(ValidationErrors::single("code", "Please enter a code").into());
        }

        let mut codes = self.load(store)?;
        let record = codes
            .get_mut(&normalized)
            .ok_or_else(|| DomainError::CodeNotFound(normalized.clone()))?;

        if record.is_redeemed() {
            return Err(DomainError::CodeAlreadyUsed(normalized).into());
        }
        if record.is_expired(now) {
            return Err(DomainError::CodeExpired(normalized).into());
        }

        let previous_balance = accounts
            .get(store, identifier)?
            .ok_or_else(|| DomainError::AccountNotFound(identifier.to_string()))?
            .balance()
            .value();

        let target = i64::try_from(previous_balance.saturating_add(record.grant)).unwrap_or(i64::MAX);
        let account = accounts.set_balance(store, identifier, target)?;
        record.mark_redeemed(identifier, now);
        let redeemed = record.clone();
        self.save(store, &codes)?;

        Ok(Redemption {
            code: redeemed,
            previous_balance,
            account,
        })
    }

    // =========================================================================
    // queries
    // =========================================================================

    pub fn get<S: KeyValueStore + ?Sized>(&self, store: &S, code: &str) -> AppResult<Option<RedemptionCode>> {
        Ok(self.load(store)?.remove(&normalize(code)))
    }

    /// Every stored code, redeemed ones included
    pub fn list_all<S: KeyValueStore + ?Sized>(&self, store: &S) -> AppResult<Vec<RedemptionCode>> {
        Ok(self.load(store)?.into_values().collect())
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

fn draw_code(rng: &mut dyn RandomSource) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.pick(CODE_ALPHABET.len())]))
        .collect()
}
