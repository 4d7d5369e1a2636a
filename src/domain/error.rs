//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::validation::ValidationErrors;

/// Business rule violations and domain invariant failures.
///
/// Every variant is terminal for the request that produced it; the caller
/// may re-issue a corrected request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed or conflicting input fields
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// An account with this identifier already exists
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// No redemption code stored under this value
    #[error("Code not found: {0}")]
    CodeNotFound(String),

    /// Code was already redeemed
    #[error("Code already used: {0}")]
    CodeAlreadyUsed(String),

    /// Code is past its expiry
    #[error("Code expired: {0}")]
    CodeExpired(String),

    /// Balance does not cover the cost of the request
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// Identifier/secret pair rejected
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Item number outside the catalogue
    #[error("Unknown item: {0}")]
    UnknownItem(u8),

    /// Invalid chip amount (zero or exceeds limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: u64, available: u64) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Stable snake_case code for callers
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::DuplicateIdentifier(_) => "duplicate_identifier",
            Self::AccountNotFound(_) => "account_not_found",
            Self::CodeNotFound(_) => "code_not_found",
            Self::CodeAlreadyUsed(_) => "code_already_used",
            Self::CodeExpired(_) => "code_expired",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UnknownItem(_) => "unknown_item",
            Self::InvalidAmount(_) => "invalid_amount",
        }
    }

    /// Check if this is a redemption-code failure
    pub fn is_code_error(&self) -> bool {
        matches!(
            self,
            Self::CodeNotFound(_) | Self::CodeAlreadyUsed(_) | Self::CodeExpired(_)
        )
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
