//! Wallet keys and transaction signing capability.
//!
//! # Security
//! - The funding key is loaded from the CLI or an environment variable
//! - Keys are never logged

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the funding account's private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "FUNDER_PRIVATE_KEY";

/// An address together with the key that signs for it.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer })
    }

    /// Create a wallet from raw secp256k1 key bytes.
    pub fn from_bytes(key: &B256) -> BlockchainResult<Self> {
        let signer = PrivateKeySigner::from_bytes(key)
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key bytes: {}", e)))?;
        Ok(Self { signer })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `FUNDER_PRIVATE_KEY` from environment.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying signer.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Private key as 64 lowercase hex characters, no prefix.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signer.to_bytes())
    }

    /// Uncompressed SEC1 public key (`04` || X || Y) as hex, no prefix.
    pub fn public_key_hex(&self) -> String {
        let point = self.signer.credential().verifying_key().to_encoded_point(false);
        hex::encode(point.as_bytes())
    }
}
