//! Session
//!
//! Explicit caller session passed into every ledger operation, carrying the
//! granted capability and a correlation id for tracing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability granted by login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capability {
    /// Nobody is logged in
    Anonymous,
    /// Privileged operator; never backed by an account record
    Admin,
    /// Regular account holder acting on their own account
    AccountHolder { identifier: String },
}

/// Session owned by the caller for the lifetime of a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub capability: Capability,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl Session {
    /// Create an anonymous session
    pub fn anonymous() -> Self {
        Self {
            capability: Capability::Anonymous,
            correlation_id: None,
        }
    }

    /// Create an admin session
    pub fn admin() -> Self {
        Self {
            capability: Capability::Admin,
            correlation_id: None,
        }
    }

    /// Create an account-holder session
    pub fn account_holder(identifier: impl Into<String>) -> Self {
        Self {
            capability: Capability::AccountHolder {
                identifier: identifier.into(),
            },
            correlation_id: None,
        }
    }

    /// Attach a correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn is_admin(&self) -> bool {
        self.capability == Capability::Admin
    }

    /// Identifier of the logged-in account holder, if any
    pub fn identifier(&self) -> Option<&str> {
        match &self.capability {
            Capability::AccountHolder { identifier } => Some(identifier),
            _ => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}
