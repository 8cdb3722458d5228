//! Fund distributor library.
//!
//! Keeps a set of seed-derived wallets at or above a target balance by
//! seeding a few core accounts from one funding account and fanning out from
//! there.

pub mod accounts;
pub mod blockchain;
pub mod config;
pub mod depositor;
pub mod observability;

pub use blockchain::{LedgerClient, RpcLedgerClient, Wallet};
pub use config::FundingConfig;
pub use depositor::{DepositError, DepositReport, Depositor};
