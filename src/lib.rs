//! chip_ledger Library
//!
//! Single-tenant chip economy over an injected key-value store: accounts,
//! single-use redemption codes, probabilistic purchases and a roulette.

pub mod auth;
pub mod clock;
pub mod config;
pub mod domain;
pub mod eventbus;
pub mod ledger;
pub mod model;
pub mod projection;
pub mod repository;
pub mod rewards;
pub mod store;
pub mod telemetry;

mod error;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorResponse};
pub use domain::{Balance, Capability, Chips, ChipsError, DomainError, LedgerEvent, Session};
pub use ledger::{AdminCredentials, LedgerService, SignupCommand};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, Namespaces};
