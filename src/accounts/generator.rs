//! Deterministic seed-based account derivation.
//!
//! Account `i` takes the bytes of `seed + i`, right-padded with zeros to 32
//! bytes, as an Ed25519 seed. The resulting Ed25519 public key is then used
//! as the secp256k1 private key of the account.

use alloy::primitives::B256;
use ed25519_dalek::{SigningKey, SECRET_KEY_LENGTH};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

/// Derive `num` wallets from `seed`.
pub fn generate_accounts(num: usize, seed: &str) -> BlockchainResult<Vec<Wallet>> {
    (0..num).map(|index| derive_account(seed, index)).collect()
}

/// Derive the wallet at `index`.
pub fn derive_account(seed: &str, index: usize) -> BlockchainResult<Wallet> {
    let material = format!("{seed}{index}");
    let bytes = material.as_bytes();
    if bytes.len() > SECRET_KEY_LENGTH {
        return Err(BlockchainError::KeyDerivation(format!(
            "seed material '{}' is {} bytes, at most {} allowed",
            material,
            bytes.len(),
            SECRET_KEY_LENGTH
        )));
    }

    let mut ed_seed = [0u8; SECRET_KEY_LENGTH];
    ed_seed[..bytes.len()].copy_from_slice(bytes);

    let key = SigningKey::from_bytes(&ed_seed).verifying_key().to_bytes();
    Wallet::from_bytes(&B256::from(key))
        .map_err(|e| BlockchainError::KeyDerivation(format!("account {index}: {e}")))
}
