//! Work partitioning and deposit sizing.
//!
//! # Sharding
//! ```text
//! plan:  [core 0 .. core n-1 | shard 0 | shard 1 | ... | shard n-1 (+ remainder)]
//! shard i = [n + i*t, n + (i+1)*t),  t = floor((total - n) / n) - 1
//! ```
//! The last core account always absorbs the remainder up to `total`.

use std::ops::Range;

use alloy::primitives::{Address, U256};

/// One destination that needs funds in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Index into the depositor's wallet list.
    pub wallet: usize,
    pub to: Address,
    pub amount: U256,
}

/// Split `len` items into `workers + 1` contiguous batches.
///
/// Each of the first `workers` batches holds `floor(len / workers)` items; the
/// last batch takes whatever is left, so every index is covered exactly once.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    let batch = len / workers.max(1);
    (0..=workers)
        .map(|k| {
            let from = (k * batch).min(len);
            let to = if k == workers { len } else { ((k + 1) * batch).min(len) };
            from..to
        })
        .collect()
}

/// Destinations each core account is provisioned for: `ceil((total - core) / core)`.
pub fn shard_size(total: usize, core: usize) -> usize {
    total.saturating_sub(core).div_ceil(core.max(1))
}

/// Stride between shard starts: `floor((total - core) / core) - 1`, never negative.
pub fn tx_per_core_account(total: usize, core: usize) -> usize {
    (total.saturating_sub(core) / core.max(1)).saturating_sub(1)
}

/// Plan indices disbursed by core account `index`.
pub fn shard_bounds(total: usize, core: usize, index: usize) -> Range<usize> {
    if total <= core {
        return total..total;
    }
    let stride = tx_per_core_account(total, core);
    let from = (core + index * stride).min(total);
    let to = if index + 1 == core {
        total
    } else {
        (core + (index + 1) * stride).min(total)
    };
    from..to
}

/// Uniform provisioning for a core account whose shard has `shard_len` entries.
///
/// `(target + per_tx_cost) * (units + 1)` where `units` is the larger of the
/// uniform shard size and the actual shard length.
pub fn uniform_deposit(target: U256, per_tx_cost: U256, size: usize, shard_len: usize) -> U256 {
    let units = size.max(shard_len) as u64 + 1;
    (target + per_tx_cost) * U256::from(units)
}

/// Exact provisioning: the core's own top-up plus every shard amount and its fee.
pub fn exact_deposit(core: &Transfer, shard: &[Transfer], per_tx_cost: U256) -> U256 {
    shard
        .iter()
        .fold(core.amount, |total, transfer| total + transfer.amount + per_tx_cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_every_index_once() {
        for len in 0..40 {
            for workers in 1..9 {
                let batches = partition(len, workers);
                assert_eq!(batches.len(), workers + 1);

                let mut seen = vec![0u32; len];
                for batch in &batches {
                    for i in batch.clone() {
                        seen[i] += 1;
                    }
                }
                assert!(seen.iter().all(|&n| n == 1), "len={len} workers={workers}");
            }
        }
    }

    #[test]
    fn test_partition_remainder_in_last_batch() {
        let batches = partition(10, 3);
        assert_eq!(batches, vec![0..3, 3..6, 6..9, 9..10]);
    }

    #[test]
    fn test_shards_cover_plan_after_core_accounts() {
        for total in 1..60 {
            for core in 1..8 {
                let mut seen = vec![0u32; total];
                for index in 0..core {
                    for i in shard_bounds(total, core, index) {
                        seen[i] += 1;
                    }
                }
                for (i, count) in seen.iter().enumerate() {
                    let expected = u32::from(i >= core);
                    assert_eq!(*count, expected, "total={total} core={core} i={i}");
                }
            }
        }
    }

    #[test]
    fn test_last_shard_absorbs_remainder() {
        // 10 destinations, 2 core accounts: stride 3
        assert_eq!(tx_per_core_account(10, 2), 3);
        assert_eq!(shard_bounds(10, 2, 0), 2..5);
        assert_eq!(shard_bounds(10, 2, 1), 5..10);
        assert_eq!(shard_size(10, 2), 4);
    }

    #[test]
    fn test_small_plan_goes_to_last_core() {
        // 5 destinations, 3 core accounts: stride saturates at 0
        assert_eq!(shard_bounds(5, 3, 0), 3..3);
        assert_eq!(shard_bounds(5, 3, 1), 3..3);
        assert_eq!(shard_bounds(5, 3, 2), 3..5);
    }

    #[test]
    fn test_uniform_deposit_covers_longer_shard() {
        let target = U256::from(1000u64);
        let cost = U256::from(30u64);
        assert_eq!(uniform_deposit(target, cost, 4, 3), U256::from(1030u64 * 5));
        assert_eq!(uniform_deposit(target, cost, 4, 5), U256::from(1030u64 * 6));
    }

    #[test]
    fn test_exact_deposit() {
        let core = Transfer {
            wallet: 0,
            to: Address::ZERO,
            amount: U256::from(2_000_000u64),
        };
        assert_eq!(exact_deposit(&core, &[], U256::from(7u64)), U256::from(2_000_000u64));

        let shard = vec![
            Transfer {
                wallet: 1,
                to: Address::ZERO,
                amount: U256::from(100u64),
            },
            Transfer {
                wallet: 2,
                to: Address::ZERO,
                amount: U256::from(50u64),
            },
        ];
        assert_eq!(
            exact_deposit(&core, &shard, U256::from(7u64)),
            U256::from(2_000_000u64 + 164)
        );
    }
}
