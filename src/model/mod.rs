//! Model module
//!
//! Records persisted in the key-value store.

pub mod account;
pub mod code;

pub use account::{Account, SIGNUP_BALANCE};
pub use code::{CodeStatus, RedemptionCode, CODE_ALPHABET, CODE_LENGTH};
