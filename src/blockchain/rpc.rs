//! JSON-RPC ledger client with per-call timeouts.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint
//! - Query chain state (nonces, gas price, balances, receipts)
//! - Submit raw signed transactions
//! - Report timeouts distinctly from transport errors

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::eips::BlockId;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::TransportResult;
use tokio::time::timeout;

use crate::blockchain::client::LedgerClient;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, Receipt, RpcConfig, SignedTransfer,
};

/// Ledger client backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct RpcLedgerClient {
    provider: Arc<dyn Provider + Send + Sync>,
    config: RpcConfig,
    timeout_duration: Duration,
}

impl RpcLedgerClient {
    /// Create a client for the configured endpoint.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: RpcConfig) -> BlockchainResult<Self> {
        let url: url::Url = config.url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.url, e))
        })?;
        let provider =
            Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        tracing::info!(
            rpc_url = %config.url,
            timeout_secs = config.timeout_secs,
            "Ledger client initialized"
        );

        Ok(Self {
            provider,
            timeout_duration: Duration::from_secs(config.timeout_secs),
            config,
        })
    }

    async fn call<T, F>(&self, op: &'static str, request: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, request.into_future()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::debug!(op, error = %e, "RPC error");
                Err(BlockchainError::Rpc(e.to_string()))
            }
            Err(_) => {
                tracing::debug!(op, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.timeout_secs))
            }
        }
    }
}

impl LedgerClient for RpcLedgerClient {
    async fn pending_nonce_at(&self, account: Address) -> BlockchainResult<u64> {
        self.call(
            "pending_nonce_at",
            self.provider.get_transaction_count(account).pending(),
        )
        .await
    }

    async fn nonce_at(&self, account: Address, block: Option<u64>) -> BlockchainResult<u64> {
        let block_id = block.map(BlockId::number).unwrap_or_else(BlockId::latest);
        self.call(
            "nonce_at",
            self.provider.get_transaction_count(account).block_id(block_id),
        )
        .await
    }

    async fn suggest_gas_price(&self) -> BlockchainResult<u128> {
        self.call("suggest_gas_price", self.provider.get_gas_price()).await
    }

    async fn send_transaction(&self, transfer: &SignedTransfer) -> BlockchainResult<()> {
        self.call(
            "send_transaction",
            self.provider.send_raw_transaction(&transfer.raw[..]),
        )
        .await
        .map(|_pending| ())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> BlockchainResult<Receipt> {
        self.call(
            "transaction_receipt",
            self.provider.get_transaction_receipt(hash),
        )
        .await?
        .map(Receipt::from)
        .ok_or(BlockchainError::NotFound)
    }

    async fn balance_at(&self, address: Address) -> BlockchainResult<U256> {
        self.call("balance_at", self.provider.get_balance(address)).await
    }
}

impl std::fmt::Debug for RpcLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedgerClient")
            .field("rpc_url", &self.config.url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
