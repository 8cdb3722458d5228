//! Core-account fan-out to the rest of the plan.
//!
//! # Per core account
//! ```text
//! pending nonce ─▶ [tx_per_turn transfers] ─▶ pause ─▶ [tx_per_turn transfers] ─▶ ...
//! ```
//! Each [`DisbursementJob`] owns its shard and nonce counter. Only the
//! success/failure tally is shared, through atomics.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::blockchain::client::LedgerClient;
use crate::blockchain::confirmation::ConfirmationPoller;
use crate::blockchain::transaction::sign_transfer;
use crate::blockchain::types::{BlockchainResult, TransferRequest};
use crate::blockchain::wallet::Wallet;
use crate::depositor::plan::{shard_bounds, Transfer};
use crate::depositor::{DepositError, DepositResult, Depositor};
use crate::observability::metrics;

/// Aggregate outcome of a disbursement phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisbursementSummary {
    pub succeeded: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Tally {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl Tally {
    fn success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        metrics::record_transfer("disburse", true, 1);
    }

    fn failures(&self, count: u64) {
        self.failed.fetch_add(count, Ordering::Relaxed);
        metrics::record_transfer("disburse", false, count);
    }

    fn summary(&self) -> DisbursementSummary {
        DisbursementSummary {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Settings shared read-only by every job of a run.
#[derive(Debug, Clone)]
struct JobSettings {
    gas_limit: u64,
    gas_price: u128,
    chain_id: Option<u64>,
    tx_per_turn: usize,
    turn_pause: Duration,
    advance_nonce_on_send_failure: bool,
    await_receipts: bool,
}

/// One core account streaming transfers to its shard.
pub struct DisbursementJob<C> {
    index: usize,
    core: Wallet,
    plan: Arc<[Transfer]>,
    shard: Range<usize>,
    client: Arc<C>,
    poller: ConfirmationPoller<C>,
    settings: JobSettings,
    tally: Arc<Tally>,
}

impl<C: LedgerClient> DisbursementJob<C> {
    async fn run(self) {
        let address = self.core.address();
        let shard_len = self.shard.len() as u64;
        tracing::info!(
            core_index = self.index,
            core_address = %address,
            from = self.shard.start,
            to = self.shard.end,
            "Prepared to disburse from core account"
        );
        if shard_len == 0 {
            return;
        }

        let mut nonce = match self.client.pending_nonce_at(address).await {
            Ok(nonce) => nonce,
            Err(e) => {
                tracing::error!(core_address = %address, error = %e, "Failed to fetch core account nonce");
                self.tally.failures(shard_len);
                return;
            }
        };

        let transfers = &self.plan[self.shard.clone()];
        let mut submitted = Vec::new();

        for (turn, batch) in transfers.chunks(self.settings.tx_per_turn).enumerate() {
            if turn > 0 {
                sleep(self.settings.turn_pause).await;
            }
            for transfer in batch {
                match self.submit(transfer, nonce).await {
                    Ok(tx_hash) => {
                        tracing::debug!(
                            from = %address,
                            to = %transfer.to,
                            amount = %transfer.amount,
                            nonce,
                            tx_hash = %tx_hash,
                            "Sent transfer"
                        );
                        nonce += 1;
                        if self.settings.await_receipts {
                            submitted.push(tx_hash);
                        } else {
                            self.tally.success();
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            from = %address,
                            to = %transfer.to,
                            amount = %transfer.amount,
                            nonce,
                            error = %e,
                            "Failed to send transfer"
                        );
                        self.tally.failures(1);
                        if self.settings.advance_nonce_on_send_failure {
                            nonce += 1;
                        }
                    }
                }
            }
        }

        for tx_hash in submitted {
            match self.poller.wait(tx_hash).await {
                Ok(receipt) if receipt.status => self.tally.success(),
                Ok(_) => self.tally.failures(1),
                Err(e) => {
                    tracing::error!(tx_hash = %tx_hash, error = %e, "Failed to confirm transfer");
                    self.tally.failures(1);
                }
            }
        }
    }

    async fn submit(&self, transfer: &Transfer, nonce: u64) -> BlockchainResult<TxHash> {
        let request = TransferRequest {
            nonce,
            to: transfer.to,
            amount: transfer.amount,
            gas_limit: self.settings.gas_limit,
            gas_price: self.settings.gas_price,
            chain_id: self.settings.chain_id,
        };
        let signed = sign_transfer(&self.core, &request)?;
        self.client.send_transaction(&signed).await?;
        Ok(signed.hash)
    }
}

impl<C: LedgerClient> Depositor<C> {
    /// Stream the non-core part of `plan` from the core accounts.
    ///
    /// Returns `DepositError::Disbursement` when any transfer failed.
    pub async fn deposit_en_mass(
        &self,
        plan: &[Transfer],
        gas_price: u128,
    ) -> DepositResult<DisbursementSummary> {
        let core = self.config.core_accounts;
        if plan.len() <= core {
            return Ok(DisbursementSummary::default());
        }

        let plan: Arc<[Transfer]> = plan.into();
        let tally = Arc::new(Tally::default());
        let settings = JobSettings {
            gas_limit: self.config.transfer_gas_limit,
            gas_price,
            chain_id: self.chain_id,
            tx_per_turn: self.config.tx_per_turn.max(1),
            turn_pause: self.config.turn_pause(),
            advance_nonce_on_send_failure: self.config.advance_nonce_on_send_failure,
            await_receipts: self.config.await_disbursements,
        };

        let mut workers = JoinSet::new();
        for index in 0..core {
            let job = DisbursementJob {
                index,
                core: self.wallets[plan[index].wallet].clone(),
                plan: plan.clone(),
                shard: shard_bounds(plan.len(), core, index),
                client: self.client.clone(),
                poller: self.poller.clone(),
                settings: settings.clone(),
                tally: tally.clone(),
            };
            workers.spawn(job.run());
        }
        let mut first_error = None;
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Disbursement worker failed");
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e.into());
        }

        let summary = tally.summary();
        tracing::info!(success = summary.succeeded, failed = summary.failed, "Disbursement finished");
        if summary.failed > 0 {
            return Err(DepositError::Disbursement {
                failed: summary.failed,
                succeeded: summary.succeeded,
            });
        }
        Ok(summary)
    }
}
