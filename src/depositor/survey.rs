//! Concurrent balance survey.
//!
//! One task per batch from [`partition`]; results land in a shared
//! `DashMap`. Any worker error fails the whole survey and the partial map is
//! dropped. Sibling workers are still drained, never cancelled.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use dashmap::DashMap;
use tokio::task::JoinSet;

use crate::blockchain::client::LedgerClient;
use crate::blockchain::types::BlockchainError;
use crate::depositor::plan::partition;
use crate::depositor::{DepositError, DepositResult};

/// Query the balance of every address with `workers + 1` concurrent tasks.
pub async fn survey_balances<C: LedgerClient>(
    client: Arc<C>,
    addresses: Arc<[Address]>,
    workers: usize,
) -> DepositResult<HashMap<Address, U256>> {
    let balances = Arc::new(DashMap::with_capacity(addresses.len()));
    let mut tasks = JoinSet::new();

    for batch in partition(addresses.len(), workers) {
        let client = client.clone();
        let addresses = addresses.clone();
        let balances = balances.clone();

        tasks.spawn(async move {
            for &address in &addresses[batch] {
                let balance = client.balance_at(address).await.inspect_err(|e| {
                    tracing::error!(address = %address, error = %e, "Failed to get account balance");
                })?;
                balances.insert(address, balance);
            }
            Ok::<(), BlockchainError>(())
        });
    }

    let mut first_error: Option<DepositError> = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(result) => result.map_err(DepositError::from),
            Err(e) => Err(DepositError::from(e)),
        };
        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    Ok(balances
        .iter()
        .map(|entry| (*entry.key(), *entry.value()))
        .collect())
}
