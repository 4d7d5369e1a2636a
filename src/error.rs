//! Error handling module
//!
//! Centralized error type returned by every ledger operation.

use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Caller errors
    #[error("Permission denied: {0}")]
    PermissionDenied(&'static str),

    #[error("Could not mint a unique code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Backend errors
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error body handed to a presentation layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl AppError {
    /// Stable snake_case code for callers
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::PermissionDenied(_) => "permission_denied",
            AppError::CodeSpaceExhausted { .. } => "code_space_exhausted",
            AppError::Domain(domain_err) => domain_err.error_code(),
            AppError::Store(_) => "store_error",
            AppError::Config(_) => "config_error",
        }
    }

    /// Check if this is a caller error (correctable by re-issuing the request)
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::PermissionDenied(_) | AppError::Domain(_))
    }

    /// Domain error inside, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(e) => Some(e),
            _ => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            AppError::Store(e) => tracing::error!("Store error: {:?}", e),
            AppError::Config(e) => tracing::error!("Config error: {:?}", e),
            AppError::CodeSpaceExhausted { attempts } => {
                tracing::error!(attempts, "Code space exhausted")
            }
            _ => {}
        }

        ErrorResponse {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        }
    }
}

impl From<crate::domain::ValidationErrors> for AppError {
    fn from(errors: crate::domain::ValidationErrors) -> Self {
        AppError::Domain(DomainError::Validation(errors))
    }
}
