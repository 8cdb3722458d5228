//! Receipt polling for submitted transactions.
//!
//! # States
//! ```text
//! Waiting --NotFound--> sleep(interval) --> Waiting
//! Waiting --receipt---> Done(receipt)
//! Waiting --error-----> Done(error)
//! ```
//!
//! The loop blocks its task, so callers that overlap confirmations spawn one
//! task per hash.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::LedgerClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, Receipt};
use crate::observability::metrics;

/// Polls a ledger until a transaction has a receipt.
pub struct ConfirmationPoller<C> {
    client: Arc<C>,
    interval: Duration,
    /// `None` waits for finality however long it takes.
    deadline: Option<Duration>,
    /// Turn a failed-status receipt into `BlockchainError::Reverted`.
    require_success: bool,
}

impl<C> Clone for ConfirmationPoller<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            interval: self.interval,
            deadline: self.deadline,
            require_success: self.require_success,
        }
    }
}

impl<C: LedgerClient> ConfirmationPoller<C> {
    pub fn new(client: Arc<C>, interval: Duration) -> Self {
        Self {
            client,
            interval,
            deadline: None,
            require_success: false,
        }
    }

    /// Give up with `ConfirmationTimeout` after `deadline`.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_require_success(mut self, require_success: bool) -> Self {
        self.require_success = require_success;
        self
    }

    /// Wait until `tx_hash` has a receipt.
    pub async fn wait(&self, tx_hash: TxHash) -> BlockchainResult<Receipt> {
        let receipt = match self.deadline {
            None => self.poll(tx_hash).await?,
            Some(deadline) => timeout(deadline, self.poll(tx_hash))
                .await
                .map_err(|_| BlockchainError::ConfirmationTimeout {
                    tx_hash,
                    timeout: deadline,
                })??,
        };

        if !receipt.status {
            if self.require_success {
                return Err(BlockchainError::Reverted(tx_hash));
            }
            tracing::warn!(tx_hash = %tx_hash, "Transaction mined with failed status");
        }
        Ok(receipt)
    }

    async fn poll(&self, tx_hash: TxHash) -> BlockchainResult<Receipt> {
        loop {
            metrics::record_receipt_poll();
            match self.client.transaction_receipt(tx_hash).await {
                Ok(receipt) => return Ok(receipt),
                Err(BlockchainError::NotFound) => {
                    tracing::trace!(tx_hash = %tx_hash, "Transaction pending");
                }
                Err(e) => return Err(e),
            }
            sleep(self.interval).await;
        }
    }
}
