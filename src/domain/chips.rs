//! Chip quantities
//!
//! Domain primitives for grant amounts and account balances.
//! Grant amounts are validated at construction time; balances can never be
//! negative because every signed target is clamped on the way in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest grant a single redemption code may carry
const MAX_GRANT: u64 = 1_000_000_000;

/// Chips represents a validated, strictly positive chip quantity.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum value is 1 billion chips
///
/// # Example
/// ```
/// use chip_ledger::domain::Chips;
///
/// let grant = Chips::new(50).unwrap();
/// assert_eq!(grant.value(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Chips(u64);

/// Errors that can occur when creating Chips
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChipsError {
    #[error("Chip amount must be positive")]
    NotPositive,

    #[error("Chip amount exceeds maximum allowed value ({MAX_GRANT})")]
    Overflow,

    #[error("Invalid chip amount: {0}")]
    ParseError(String),
}

impl Chips {
    /// Create a new chip amount with validation.
    ///
    /// # Errors
    /// - `ChipsError::NotPositive` if value is 0
    /// - `ChipsError::Overflow` if value > 1 billion
    pub fn new(value: u64) -> Result<Self, ChipsError> {
        if value == 0 {
            return Err(ChipsError::NotPositive);
        }
        if value > MAX_GRANT {
            return Err(ChipsError::Overflow);
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Chips {
    type Err = ChipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(rest) = trimmed.strip_prefix('-') {
            if rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty() {
                return Err(ChipsError::NotPositive);
            }
        }
        let value: u64 = trimmed
            .parse()
            .map_err(|e: std::num::ParseIntError| ChipsError::ParseError(e.to_string()))?;
        Chips::new(value)
    }
}

impl TryFrom<u64> for Chips {
    type Error = ChipsError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Chips::new(value)
    }
}

impl From<Chips> for u64 {
    fn from(chips: Chips) -> Self {
        chips.0
    }
}

/// Largest balance an account can hold; every balance fits the signed
/// arithmetic of the reward rules
pub const MAX_BALANCE: u64 = i64::MAX as u64;

/// Balance represents an account balance (zero or positive).
/// Unlike Chips, Balance can be zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct Balance(u64);

impl Balance {
    /// Create a balance from an unsigned value, capped at `MAX_BALANCE`
    pub fn new(value: u64) -> Self {
        Self(value.min(MAX_BALANCE))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(0)
    }

    /// Clamp a signed target into a balance; anything below zero becomes zero
    pub fn clamped(target: i64) -> Self {
        Self(u64::try_from(target).unwrap_or(0))
    }

    /// Get the underlying value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Signed view used by reward arithmetic
    pub fn signed(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }

    /// Check if balance covers a cost
    pub fn covers(&self, cost: u64) -> bool {
        self.0 >= cost
    }
}

impl From<u64> for Balance {
    fn from(value: u64) -> Self {
        Balance::new(value)
    }
}

impl From<Balance> for u64 {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
