//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Private key (CLI / environment) or seed derivation
//!     → wallet.rs (key loading, signing capability)
//!     → transaction.rs (build and sign transfers)
//!     → client.rs (ledger operations; rpc.rs talks JSON-RPC)
//!     → confirmation.rs (poll receipts)
//! ```
//!
//! # Security Constraints
//! - Never log private keys
//! - Every RPC call has a configurable timeout

pub mod client;
pub mod confirmation;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::LedgerClient;
pub use confirmation::ConfirmationPoller;
pub use rpc::RpcLedgerClient;
pub use transaction::sign_transfer;
pub use types::{BlockchainError, BlockchainResult, Receipt, SignedTransfer, TransferRequest};
pub use wallet::Wallet;
