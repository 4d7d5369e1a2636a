//! Redemption code record
//!
//! A single-use bonus grant token. Lifecycle is Active -> Redeemed, or
//! Active -> Expired; expiry is derived from `expires_at` and never stored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Chips;

/// Symbols a code is drawn from
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Characters per code
pub const CODE_LENGTH: usize = 6;

/// How long a freshly minted code stays redeemable
pub fn code_lifetime() -> Duration {
    Duration::hours(24)
}

/// Derived state of a code at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Active,
    Redeemed,
    Expired,
}

impl std::fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeStatus::Active => write!(f, "active"),
            CodeStatus::Redeemed => write!(f, "redeemed"),
            CodeStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Stored code. Redeemed codes stay in storage as an audit record.
///
/// The grant cap applies when minting; a stored record keeps whatever
/// grant it was written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionCode {
    pub code: String,
    #[serde(rename = "chips")]
    pub grant: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "usedBy")]
    pub redeemed_by: Option<String>,
    #[serde(rename = "usedAt")]
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl RedemptionCode {
    /// New active code expiring exactly one lifetime after `now`
    pub fn new(code: String, grant: Chips, now: DateTime<Utc>) -> Self {
        Self {
            code,
            grant: grant.value(),
            created_at: now,
            expires_at: now + code_lifetime(),
            redeemed_by: None,
            redeemed_at: None,
        }
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_by.is_some()
    }

    /// Expired once `now` reaches `expires_at`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn status(&self, now: DateTime<Utc>) -> CodeStatus {
        if self.is_redeemed() {
            CodeStatus::Redeemed
        } else if self.is_expired(now) {
            CodeStatus::Expired
        } else {
            CodeStatus::Active
        }
    }

    /// Terminal transition to Redeemed
    pub(crate) fn mark_redeemed(&mut self, identifier: &str, now: DateTime<Utc>) {
        self.redeemed_by = Some(identifier.to_string());
        self.redeemed_at = Some(now);
    }
}

/// Whether a string has the shape of a minted code
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}
