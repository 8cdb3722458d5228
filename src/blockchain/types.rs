//! Chain-specific types and error definitions.

use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use thiserror::Error;

// Re-export RpcConfig from config module to avoid duplication
pub use crate::config::schema::RpcConfig;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node has no receipt for the transaction (yet).
    #[error("not found")]
    NotFound,

    /// Transaction was not confirmed within the configured deadline.
    #[error("Transaction {tx_hash} not confirmed after {timeout:?}")]
    ConfirmationTimeout { tx_hash: TxHash, timeout: Duration },

    /// Transaction was mined with a failed status.
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    /// Invalid private key format.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Deterministic key derivation failed.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Transaction signing failed.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl BlockchainError {
    /// True for the receipt-lookup sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlockchainError::NotFound)
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Parameters of a plain value transfer before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub nonce: u64,
    pub to: Address,
    pub amount: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
    /// `None` signs without EIP-155 replay protection.
    pub chain_id: Option<u64>,
}

/// A signed transfer ready for submission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    /// Content hash assigned at signing time.
    pub hash: TxHash,
    /// EIP-2718 encoded transaction bytes.
    pub raw: Bytes,
}

impl SignedTransfer {
    /// Upper bound on the fee this transfer can burn.
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.gas_price)
    }
}

/// Terminal outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// Execution status; `false` means the transaction failed on-chain.
    pub status: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl From<alloy::rpc::types::TransactionReceipt> for Receipt {
    fn from(receipt: alloy::rpc::types::TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            status: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ConfirmationTimeout {
            tx_hash: TxHash::ZERO,
            timeout: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("after 30s"));

        let err = BlockchainError::ConfirmationTimeout {
            tx_hash: TxHash::ZERO,
            timeout: Duration::from_millis(250),
        };
        assert!(err.to_string().contains("after 250ms"));
    }

    #[test]
    fn test_not_found_sentinel() {
        assert!(BlockchainError::NotFound.is_not_found());
        assert!(!BlockchainError::Rpc("boom".into()).is_not_found());
    }

    #[test]
    fn test_max_fee() {
        let transfer = SignedTransfer {
            from: Address::ZERO,
            to: Address::ZERO,
            amount: U256::from(1u64),
            nonce: 0,
            gas_limit: 30_000,
            gas_price: 1_000_000_000,
            hash: TxHash::ZERO,
            raw: Bytes::new(),
        };
        assert_eq!(transfer.max_fee(), U256::from(30_000_000_000_000u64));
    }
}
