//! Domain module
//!
//! Core domain types and business logic.

pub mod chips;
pub mod error;
pub mod events;
pub mod session;
pub mod validation;

pub use chips::{Balance, Chips, ChipsError};
pub use error::DomainError;
pub use events::{BalanceReason, LedgerEvent};
pub use session::{Capability, Session};
pub use validation::{FieldError, ValidationErrors};
