//! Ledger client abstraction.
//!
//! # Responsibilities
//! - Define the six node operations the depositor consumes
//! - Keep transport errors untouched; retry policy belongs to callers
//!
//! Implementations must be cheap to share behind an `Arc` because every
//! worker task holds a handle.

use std::future::Future;

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::types::{BlockchainResult, Receipt, SignedTransfer};

/// Operations the depositor needs from a chain node.
pub trait LedgerClient: Send + Sync + 'static {
    /// Next usable nonce, counting transactions still in the pool.
    fn pending_nonce_at(&self, account: Address)
        -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Confirmed nonce at `block`, or at the latest block when `None`.
    fn nonce_at(
        &self,
        account: Address,
        block: Option<u64>,
    ) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Gas price suggested by the node, in wei.
    fn suggest_gas_price(&self) -> impl Future<Output = BlockchainResult<u128>> + Send;

    /// Submit a signed transfer. Fails when the node refuses admission.
    fn send_transaction(
        &self,
        transfer: &SignedTransfer,
    ) -> impl Future<Output = BlockchainResult<()>> + Send;

    /// Receipt for `hash`, or `BlockchainError::NotFound` while pending.
    fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> impl Future<Output = BlockchainResult<Receipt>> + Send;

    /// Balance of `address` at the latest block.
    fn balance_at(&self, address: Address) -> impl Future<Output = BlockchainResult<U256>> + Send;
}
