//! Account record
//!
//! A chip-holding account keyed by its identifier (an email address).

use serde::{Deserialize, Serialize};

use crate::domain::Balance;

/// Balance every new account starts with
pub const SIGNUP_BALANCE: u64 = 10;

/// Account record as stored in the accounts namespace.
///
/// Field names on the wire are `name`, `email`, `password` and `tokens`;
/// a record without `tokens` reads as a zero balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique, immutable, case-sensitive identifier
    #[serde(rename = "email")]
    identifier: String,

    /// Display name, unique at creation time only
    #[serde(rename = "name")]
    display_name: String,

    /// Sealed credential as produced by the configured verifier
    #[serde(rename = "password")]
    secret: String,

    /// Current balance
    #[serde(rename = "tokens", default)]
    balance: Balance,
}

impl Account {
    /// Create a new account with the signup balance
    pub fn create(identifier: String, display_name: String, secret: String) -> Self {
        Self {
            identifier,
            display_name,
            secret,
            balance: Balance::new(SIGNUP_BALANCE),
        }
    }

    /// Copy of this account with a different balance
    pub(crate) fn with_balance(mut self, balance: Balance) -> Self {
        self.balance = balance;
        self
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_create() {
        let account = Account::create(
            "alice@example.com".to_string(),
            "alice".to_string(),
            "secret1".to_string(),
        );

        assert_eq!(account.identifier(), "alice@example.com");
        assert_eq!(account.display_name(), "alice");
        assert_eq!(account.secret(), "secret1");
        assert_eq!(account.balance().value(), SIGNUP_BALANCE);
    }

    #[test]
    fn test_wire_format() {
        let account = Account::create(
            "alice@example.com".to_string(),
            "alice".to_string(),
            "secret1".to_string(),
        );

        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(
            value,
            json!({
                "email": "alice@example.com",
                "name": "alice",
                "password": "secret1",
                "tokens": 10
            })
        );
    }

    #[test]
    fn test_missing_tokens_reads_as_zero() {
        let account: Account = serde_json::from_value(json!({
            "email": "bob@example.com",
            "name": "bob",
            "password": "hunter22"
        }))
        .unwrap();

        assert_eq!(account.balance(), Balance::zero());
    }

    #[test]
    fn test_with_balance() {
        let account = Account::create("a@b.c".into(), "a".into(), "secret".into())
            .with_balance(Balance::new(99));
        assert_eq!(account.balance().value(), 99);
    }
}
