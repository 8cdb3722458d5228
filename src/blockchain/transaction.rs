//! Transfer building and signing.
//!
//! # Responsibilities
//! - Build legacy value transfers from explicit nonce and gas parameters
//! - Sign them locally, producing the hash and the wire encoding
//!
//! Signing is deterministic (RFC 6979), so identical requests yield identical
//! bytes and hashes. No network access happens here.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Bytes, TxKind};

use crate::blockchain::types::{BlockchainError, BlockchainResult, SignedTransfer, TransferRequest};
use crate::blockchain::wallet::Wallet;

/// Build the unsigned legacy transaction for a request.
pub fn build_transfer(request: &TransferRequest) -> TxLegacy {
    TxLegacy {
        chain_id: request.chain_id,
        nonce: request.nonce,
        gas_price: request.gas_price,
        gas_limit: request.gas_limit,
        to: TxKind::Call(request.to),
        value: request.amount,
        input: Bytes::new(),
    }
}

/// Build and sign a transfer from `wallet`.
pub fn sign_transfer(wallet: &Wallet, request: &TransferRequest) -> BlockchainResult<SignedTransfer> {
    let mut tx = build_transfer(request);
    let signature = wallet
        .signer()
        .sign_transaction_sync(&mut tx)
        .map_err(|e| BlockchainError::Signing(e.to_string()))?;

    let signed = tx.into_signed(signature);
    let hash = *signed.hash();
    let raw = Bytes::from(TxEnvelope::Legacy(signed).encoded_2718());

    Ok(SignedTransfer {
        from: wallet.address(),
        to: request.to,
        amount: request.amount,
        nonce: request.nonce,
        gas_limit: request.gas_limit,
        gas_price: request.gas_price,
        hash,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::{address, U256};

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn request(nonce: u64) -> TransferRequest {
        TransferRequest {
            nonce,
            to: address!("0x1289709BFaE305Fb7BE040b710A97c97672068bE"),
            amount: U256::from(3_000_000u64),
            gas_limit: 30_000,
            gas_price: 1_000_000_000,
            chain_id: None,
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let a = sign_transfer(&wallet, &request(7)).unwrap();
        let b = sign_transfer(&wallet, &request(7)).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.raw, b.raw);
        assert_eq!(a.from, wallet.address());
        assert_eq!(a.nonce, 7);
    }

    #[test]
    fn test_nonce_changes_hash() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let a = sign_transfer(&wallet, &request(0)).unwrap();
        let b = sign_transfer(&wallet, &request(1)).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_chain_id_changes_hash() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let homestead = sign_transfer(&wallet, &request(0)).unwrap();
        let mut protected = request(0);
        protected.chain_id = Some(31337);
        let protected = sign_transfer(&wallet, &protected).unwrap();
        assert_ne!(homestead.hash, protected.hash);
    }

    #[test]
    fn test_encoding_decodes_to_same_hash() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signed = sign_transfer(&wallet, &request(3)).unwrap();
        let decoded = TxEnvelope::decode_2718(&mut &signed.raw[..]).unwrap();
        assert_eq!(*decoded.tx_hash(), signed.hash);
    }
}
