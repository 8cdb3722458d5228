//! Destination account generation and export.

pub mod export;
pub mod generator;

pub use export::{write_accounts, AccountRecord};
pub use generator::{derive_account, generate_accounts};
