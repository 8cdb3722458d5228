//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};

use fund_distributor::accounts::generate_accounts;
use fund_distributor::blockchain::{
    BlockchainError, BlockchainResult, LedgerClient, Receipt, SignedTransfer, Wallet,
};
use fund_distributor::config::DepositorConfig;
use fund_distributor::Depositor;

/// Anvil's first dev account.
pub const FUNDER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<TxHash, Receipt>,
    pending_polls: HashMap<TxHash, u32>,
    receipt_calls: HashMap<TxHash, u32>,
    not_found_polls: u32,
    sent: Vec<SignedTransfer>,
    rejected_recipients: HashSet<Address>,
    failing_balances: HashSet<Address>,
    failing_nonces: HashSet<Address>,
    panicking_nonces: HashSet<Address>,
    receipts_fail: bool,
    gas_price: u128,
}

/// In-memory ledger that mines every accepted transfer immediately.
///
/// Admission mirrors a strict node: the recipient must not be rejected, the
/// nonce must equal the sender's next nonce, and the sender must cover
/// `amount + gas_limit * gas_price`.
pub struct MockLedger {
    state: Mutex<LedgerState>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                gas_price: 1,
                ..LedgerState::default()
            }),
        }
    }

    /// Report `NotFound` this many times for each new receipt before returning it.
    pub fn with_not_found_polls(self, polls: u32) -> Self {
        self.state.lock().unwrap().not_found_polls = polls;
        self
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(address, balance);
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().unwrap().nonces.insert(address, nonce);
    }

    pub fn balance(&self, address: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    pub fn sent(&self) -> Vec<SignedTransfer> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn receipt_calls(&self, hash: TxHash) -> u32 {
        self.state
            .lock()
            .unwrap()
            .receipt_calls
            .get(&hash)
            .copied()
            .unwrap_or_default()
    }

    pub fn insert_receipt(&self, hash: TxHash, status: bool, not_found_polls: u32) {
        let mut state = self.state.lock().unwrap();
        state.receipts.insert(
            hash,
            Receipt {
                tx_hash: hash,
                status,
                block_number: Some(1),
                gas_used: 21_000,
            },
        );
        state.pending_polls.insert(hash, not_found_polls);
    }

    pub fn reject_recipient(&self, address: Address) {
        self.state.lock().unwrap().rejected_recipients.insert(address);
    }

    pub fn fail_balance_for(&self, address: Address) {
        self.state.lock().unwrap().failing_balances.insert(address);
    }

    pub fn fail_nonce_for(&self, address: Address) {
        self.state.lock().unwrap().failing_nonces.insert(address);
    }

    /// Panic inside `pending_nonce_at` for `address`, without poisoning the state lock.
    pub fn panic_nonce_for(&self, address: Address) {
        self.state.lock().unwrap().panicking_nonces.insert(address);
    }

    pub fn fail_receipts(&self) {
        self.state.lock().unwrap().receipts_fail = true;
    }
}

impl LedgerClient for MockLedger {
    async fn pending_nonce_at(&self, account: Address) -> BlockchainResult<u64> {
        let panics = self.state.lock().unwrap().panicking_nonces.contains(&account);
        if panics {
            panic!("nonce lookup panicked for {account}");
        }
        let state = self.state.lock().unwrap();
        if state.failing_nonces.contains(&account) {
            return Err(BlockchainError::Rpc(format!("nonce lookup failed for {account}")));
        }
        Ok(state.nonces.get(&account).copied().unwrap_or_default())
    }

    async fn nonce_at(&self, account: Address, _block: Option<u64>) -> BlockchainResult<u64> {
        self.pending_nonce_at(account).await
    }

    async fn suggest_gas_price(&self) -> BlockchainResult<u128> {
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn send_transaction(&self, transfer: &SignedTransfer) -> BlockchainResult<()> {
        let mut state = self.state.lock().unwrap();

        if state.rejected_recipients.contains(&transfer.to) {
            return Err(BlockchainError::Rpc(format!("recipient {} rejected", transfer.to)));
        }
        let expected = state.nonces.get(&transfer.from).copied().unwrap_or_default();
        if transfer.nonce != expected {
            return Err(BlockchainError::Rpc(format!(
                "invalid nonce: got {}, expected {}",
                transfer.nonce, expected
            )));
        }
        let cost = transfer.amount + transfer.max_fee();
        let available = state.balances.get(&transfer.from).copied().unwrap_or_default();
        if available < cost {
            return Err(BlockchainError::Rpc("insufficient funds for gas * price + value".into()));
        }

        state.balances.insert(transfer.from, available - cost);
        *state.balances.entry(transfer.to).or_default() += transfer.amount;
        state.nonces.insert(transfer.from, expected + 1);

        let block_number = state.sent.len() as u64 + 1;
        state.receipts.insert(
            transfer.hash,
            Receipt {
                tx_hash: transfer.hash,
                status: true,
                block_number: Some(block_number),
                gas_used: transfer.gas_limit,
            },
        );
        let polls = state.not_found_polls;
        state.pending_polls.insert(transfer.hash, polls);
        state.sent.push(transfer.clone());
        Ok(())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> BlockchainResult<Receipt> {
        let mut state = self.state.lock().unwrap();
        *state.receipt_calls.entry(hash).or_default() += 1;

        if state.receipts_fail {
            return Err(BlockchainError::Rpc("connection refused".into()));
        }
        if let Some(remaining) = state.pending_polls.get_mut(&hash) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BlockchainError::NotFound);
            }
        }
        state.receipts.get(&hash).cloned().ok_or(BlockchainError::NotFound)
    }

    async fn balance_at(&self, address: Address) -> BlockchainResult<U256> {
        let state = self.state.lock().unwrap();
        if state.failing_balances.contains(&address) {
            return Err(BlockchainError::Rpc(format!("balance lookup failed for {address}")));
        }
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }
}

/// Config tuned for fast tests: fixed gas price, no pauses, 1ms polling.
pub fn fast_config(core_accounts: usize) -> DepositorConfig {
    DepositorConfig {
        core_accounts,
        transfer_gas_price: Some(1),
        poll_interval_ms: 1,
        turn_pause_ms: 0,
        tx_per_turn: 3,
        ..DepositorConfig::default()
    }
}

pub fn funder() -> Wallet {
    Wallet::from_private_key(FUNDER_KEY).unwrap()
}

pub fn wallets(num: usize) -> Vec<Wallet> {
    generate_accounts(num, "test_1").unwrap()
}

/// Depositor over `ledger` with a funded funding account.
pub fn depositor(
    ledger: &Arc<MockLedger>,
    wallets: Vec<Wallet>,
    target: U256,
    config: DepositorConfig,
) -> Depositor<MockLedger> {
    let funder = funder();
    ledger.set_balance(funder.address(), U256::from(10u64).pow(U256::from(18u64)));
    Depositor::new(ledger.clone(), funder, wallets, target, config)
}

/// Distinct addresses for survey tests.
pub fn addresses(num: usize) -> Vec<Address> {
    (0..num)
        .map(|i| Address::left_padding_from(&(i as u64 + 1).to_be_bytes()))
        .collect()
}
