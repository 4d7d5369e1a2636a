//! Ledger Events
//!
//! Change notifications published after a transaction commits.
//! Events are immutable facts that have happened in the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a balance moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceReason {
    /// Shop item bet or payout
    Purchase,
    /// Roulette bet or jackpot
    Roulette,
    /// Another account's item-3 purchase hit this account
    RandomTarget,
    /// Redemption code grant
    Redemption,
}

/// Ledger events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    /// Account was created at signup
    AccountCreated {
        identifier: String,
        display_name: String,
        balance: u64,
        created_at: DateTime<Utc>,
    },

    /// Balance was set to a new value
    BalanceChanged {
        identifier: String,
        previous: u64,
        current: u64,
        reason: BalanceReason,
        correlation_id: Option<Uuid>,
        changed_at: DateTime<Utc>,
    },

    /// Admin minted a redemption code
    CodeMinted {
        code: String,
        grant: u64,
        expires_at: DateTime<Utc>,
    },

    /// Code was redeemed by an account
    CodeRedeemed {
        code: String,
        identifier: String,
        grant: u64,
        redeemed_at: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::AccountCreated { .. } => "AccountCreated",
            LedgerEvent::BalanceChanged { .. } => "BalanceChanged",
            LedgerEvent::CodeMinted { .. } => "CodeMinted",
            LedgerEvent::CodeRedeemed { .. } => "CodeRedeemed",
        }
    }

    /// Account the event relates to, if any
    pub fn identifier(&self) -> Option<&str> {
        match self {
            LedgerEvent::AccountCreated { identifier, .. }
            | LedgerEvent::BalanceChanged { identifier, .. }
            | LedgerEvent::CodeRedeemed { identifier, .. } => Some(identifier),
            LedgerEvent::CodeMinted { .. } => None,
        }
    }
}
