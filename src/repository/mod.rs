//! Repository module
//!
//! Typed access to the accounts and codes documents. Every method takes the
//! store explicitly so the same calls work against a `StoreTransaction`.

pub mod accounts;
pub mod codes;

pub use accounts::AccountRepository;
pub use codes::{CodeRegistry, Redemption, MAX_MINT_ATTEMPTS};
