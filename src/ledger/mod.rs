//! Ledger module
//!
//! Request-level operations over the chip economy. Each operation checks
//! the session's capability, runs in one store transaction and publishes
//! its events after commit.

mod commands;
mod service;

#[cfg(test)]
mod tests;

pub use commands::*;
pub use service::{AdminCredentials, LedgerService};
