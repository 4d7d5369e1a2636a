//! Command definitions
//!
//! Requests a caller issues against the ledger, and what each one returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Session;
use crate::model::{Account, CodeStatus, RedemptionCode};
use crate::rewards::{Item, RewardOutcome};

// =========================================================================
// SignupCommand
// =========================================================================

/// Command to register a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupCommand {
    pub display_name: String,
    pub identifier: String,
    pub secret: String,
    pub confirm_secret: String,
}

impl SignupCommand {
    /// Signup with the confirmation already matching the secret
    pub fn new(display_name: impl Into<String>, identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            display_name: display_name.into(),
            identifier: identifier.into(),
            confirm_secret: secret.clone(),
            secret,
        }
    }

    pub fn with_confirmation(mut self, confirm_secret: impl Into<String>) -> Self {
        self.confirm_secret = confirm_secret.into();
        self
    }
}

/// Result of a successful signup
#[derive(Debug, Clone)]
pub struct SignupResult {
    pub account: Account,
    /// New accounts are logged in straight away
    pub session: Session,
}

/// Result of a shop purchase
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResult {
    pub item: Item,
    pub outcome: RewardOutcome,
    /// Buyer after every instruction was applied
    pub account: Account,
    /// Account hit by the random-target item, as it ended up
    pub target: Option<Account>,
}

/// Result of a roulette spin
#[derive(Debug, Clone, Serialize)]
pub struct SpinResult {
    pub symbols: [char; 3],
    pub jackpot: bool,
    pub account: Account,
}

/// Result of a successful redemption
#[derive(Debug, Clone, Serialize)]
pub struct RedeemResult {
    pub code: String,
    pub grant: u64,
    pub balance: u64,
}

/// Result of a successful mint
#[derive(Debug, Clone, Serialize)]
pub struct MintResult {
    pub code: String,
    pub grant: u64,
    pub expires_at: DateTime<Utc>,
}

impl From<&RedemptionCode> for MintResult {
    fn from(code: &RedemptionCode) -> Self {
        Self {
            code: code.code.clone(),
            grant: code.grant,
            expires_at: code.expires_at,
        }
    }
}

/// Admin view of one stored code
#[derive(Debug, Clone, Serialize)]
pub struct CodeListing {
    #[serde(flatten)]
    pub code: RedemptionCode,
    pub status: CodeStatus,
}
