//! Funding-account transfers to core accounts.
//!
//! Submission is strictly sequential against the funding key: one pending
//! nonce fetch, then `nonce, nonce + 1, ...`. Confirmations overlap, one task
//! per transfer, and the phase fails on the first confirmation error.

use alloy::primitives::{Address, TxHash, U256};
use tokio::task::JoinSet;

use crate::blockchain::client::LedgerClient;
use crate::blockchain::transaction::sign_transfer;
use crate::blockchain::types::TransferRequest;
use crate::depositor::plan::{exact_deposit, shard_bounds, shard_size, uniform_deposit, Transfer};
use crate::depositor::{DepositError, DepositResult, Depositor};
use crate::observability::metrics;

/// A transfer submitted from the funding account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededDeposit {
    pub to: Address,
    pub amount: U256,
    pub nonce: u64,
    pub tx_hash: TxHash,
}

impl<C: LedgerClient> Depositor<C> {
    /// Amount each core account receives from the funding account.
    ///
    /// In balance-checking mode the deposit is exact (own deficit plus every
    /// shard deficit and fee); otherwise it is the uniform over-provisioning.
    pub fn core_deposits(&self, plan: &[Transfer], per_tx_cost: U256) -> Vec<(Address, U256)> {
        let core = self.config.core_accounts.min(plan.len());
        let size = shard_size(plan.len(), self.config.core_accounts);

        plan[..core]
            .iter()
            .enumerate()
            .map(|(index, transfer)| {
                let shard = &plan[shard_bounds(plan.len(), self.config.core_accounts, index)];
                let amount = if self.config.check_balances {
                    exact_deposit(transfer, shard, per_tx_cost)
                } else {
                    uniform_deposit(self.target_balance, per_tx_cost, size, shard.len())
                };
                (transfer.to, amount)
            })
            .collect()
    }

    /// Send each `(recipient, amount)` from the funding account and wait for
    /// every receipt.
    pub async fn fund_from_source(
        &self,
        deposits: &[(Address, U256)],
    ) -> DepositResult<Vec<SeededDeposit>> {
        let funder = self.funder.address();
        let mut nonce = self.client.pending_nonce_at(funder).await?;
        tracing::info!(funder = %funder, current_nonce = nonce, "Fetched funding account nonce");

        let mut confirmations = JoinSet::new();
        let mut seeded = Vec::with_capacity(deposits.len());

        for &(to, amount) in deposits {
            let gas_price = self.client.suggest_gas_price().await?;
            let request = TransferRequest {
                nonce,
                to,
                amount,
                gas_limit: self.config.gas_limit,
                gas_price,
                chain_id: self.chain_id,
            };
            let signed = sign_transfer(&self.funder, &request)?;

            tracing::info!(address = %to, amount = %amount, nonce, "Depositing funds from funding account");
            if let Err(e) = self.client.send_transaction(&signed).await {
                tracing::error!(address = %to, amount = %amount, nonce, error = %e, "Failed to deposit");
                metrics::record_transfer("seed", false, 1);
                confirmations.detach_all();
                return Err(e.into());
            }
            metrics::record_transfer("seed", true, 1);
            nonce += 1;

            let poller = self.poller.clone();
            let tx_hash = signed.hash;
            confirmations.spawn(async move {
                let receipt = poller.wait(tx_hash).await.inspect_err(|e| {
                    tracing::error!(address = %to, tx_hash = %tx_hash, error = %e, "Failed to confirm deposit");
                })?;
                tracing::info!(
                    address = %to,
                    tx_hash = %tx_hash,
                    block_number = ?receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Deposited funds to core account"
                );
                Ok::<_, DepositError>(())
            });

            seeded.push(SeededDeposit {
                to,
                amount,
                nonce: request.nonce,
                tx_hash,
            });
        }

        let mut first_error = None;
        while let Some(joined) = confirmations.join_next().await {
            if let Err(e) = joined.map_err(DepositError::from).and_then(|result| result) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(seeded),
        }
    }
}
