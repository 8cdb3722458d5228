//! Fund-distribution engine.
//!
//! # Data Flow
//! ```text
//! destination wallets + target balance
//!     → survey.rs (balances, balance-checking mode only)
//!     → plan.rs (who needs what; shard layout)
//!     → seeder.rs (funding account → core accounts, confirmed)
//!     → disburse.rs (core accounts → shards, counted)
//! ```
//!
//! # Nonce ownership
//! The funding account's nonce is allocated by the seeding loop alone; each
//! core account's nonce is allocated by its own disbursement job alone.

pub mod disburse;
pub mod plan;
pub mod seeder;
pub mod survey;

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::blockchain::client::LedgerClient;
use crate::blockchain::confirmation::ConfirmationPoller;
use crate::blockchain::types::BlockchainError;
use crate::blockchain::wallet::Wallet;
use crate::config::schema::DepositorConfig;
use crate::observability::metrics;

pub use disburse::DisbursementSummary;
pub use plan::Transfer;
pub use seeder::SeededDeposit;

/// Errors raised by a distribution run.
#[derive(Debug, Error)]
pub enum DepositError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error("funding account balance {available} is below the {required} required")]
    InsufficientFunds { available: U256, required: U256 },

    #[error("fail to send {failed} transactions ({succeeded} succeeded)")]
    Disbursement { failed: u64, succeeded: u64 },

    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type DepositResult<T> = Result<T, DepositError>;

/// Outcome of [`Depositor::check_and_deposit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositReport {
    /// Destinations that needed funds.
    pub planned: usize,
    /// Destinations already at or above target.
    pub skipped: usize,
    /// Transfers from the funding account.
    pub seeded: Vec<SeededDeposit>,
    pub disbursed: DisbursementSummary,
}

/// Keeps a list of wallets at or above a target balance.
pub struct Depositor<C> {
    client: Arc<C>,
    funder: Wallet,
    wallets: Vec<Wallet>,
    target_balance: U256,
    config: DepositorConfig,
    chain_id: Option<u64>,
    poller: ConfirmationPoller<C>,
}

impl<C: LedgerClient> Depositor<C> {
    pub fn new(
        client: Arc<C>,
        funder: Wallet,
        wallets: Vec<Wallet>,
        target_balance: U256,
        config: DepositorConfig,
    ) -> Self {
        let poller = ConfirmationPoller::new(client.clone(), config.poll_interval())
            .with_deadline(config.confirmation_timeout())
            .with_require_success(config.require_successful_receipt);

        Self {
            client,
            funder,
            wallets,
            target_balance,
            config,
            chain_id: None,
            poller,
        }
    }

    /// Sign with EIP-155 replay protection for `chain_id`.
    pub fn with_chain_id(mut self, chain_id: Option<u64>) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn funder(&self) -> Address {
        self.funder.address()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.wallets.iter().map(Wallet::address).collect()
    }

    /// Balances of every destination wallet.
    pub async fn check_for_balances(&self) -> DepositResult<HashMap<Address, U256>> {
        survey::survey_balances(
            self.client.clone(),
            self.addresses().into(),
            self.config.num_workers,
        )
        .await
    }

    /// Destinations that need funds, in wallet order.
    ///
    /// Without balance checking every wallet gets the full target. With it,
    /// wallets at or above target are left out and the rest get their deficit.
    pub async fn build_plan(&self) -> DepositResult<Vec<Transfer>> {
        if !self.config.check_balances {
            return Ok(self
                .wallets
                .iter()
                .enumerate()
                .map(|(wallet, w)| Transfer {
                    wallet,
                    to: w.address(),
                    amount: self.target_balance,
                })
                .collect());
        }

        let balances = self.check_for_balances().await?;
        let mut plan = Vec::new();
        for (wallet, w) in self.wallets.iter().enumerate() {
            let address = w.address();
            let balance = balances.get(&address).copied().unwrap_or_default();
            if balance >= self.target_balance {
                tracing::debug!(address = %address, balance = %balance, "Balance already at target");
                continue;
            }
            plan.push(Transfer {
                wallet,
                to: address,
                amount: self.target_balance - balance,
            });
        }
        Ok(plan)
    }

    /// Bring every destination wallet up to the target balance.
    pub async fn check_and_deposit(&self) -> DepositResult<DepositReport> {
        self.log_funder_nonces().await?;

        let gas_price = match self.config.transfer_gas_price {
            Some(price) => price,
            None => self.client.suggest_gas_price().await?,
        };
        let per_tx_cost = U256::from(self.config.transfer_gas_limit) * U256::from(gas_price);

        let plan = self.build_plan().await?;
        metrics::record_planned(plan.len());
        let mut report = DepositReport {
            planned: plan.len(),
            skipped: self.wallets.len() - plan.len(),
            ..DepositReport::default()
        };
        if plan.is_empty() {
            tracing::info!(wallets = self.wallets.len(), "Every wallet already at target balance");
            return Ok(report);
        }

        let deposits = self.core_deposits(&plan, per_tx_cost);
        self.ensure_funder_covers(&deposits).await?;

        report.seeded = self.fund_from_source(&deposits).await?;
        tracing::info!(core_accounts = report.seeded.len(), "Done depositing core accounts");

        report.disbursed = self.deposit_en_mass(&plan, gas_price).await?;
        Ok(report)
    }

    async fn log_funder_nonces(&self) -> DepositResult<()> {
        let funder = self.funder.address();
        let confirmed = self.client.nonce_at(funder, None).await?;
        let pending = self.client.pending_nonce_at(funder).await?;
        if pending > confirmed {
            tracing::warn!(
                funder = %funder,
                confirmed,
                pending,
                "Funding account has transactions still pending"
            );
        } else {
            tracing::debug!(funder = %funder, nonce = confirmed, "Funding account nonce");
        }
        Ok(())
    }

    async fn ensure_funder_covers(&self, deposits: &[(Address, U256)]) -> DepositResult<()> {
        let gas_price = self.client.suggest_gas_price().await?;
        let fee = U256::from(self.config.gas_limit) * U256::from(gas_price);
        let required = deposits
            .iter()
            .fold(U256::ZERO, |total, (_, amount)| total + *amount + fee);
        let available = self.client.balance_at(self.funder.address()).await?;

        if available < required {
            tracing::error!(
                funder = %self.funder.address(),
                available = %available,
                required = %required,
                "Funding account cannot cover core deposits"
            );
            return Err(DepositError::InsufficientFunds { available, required });
        }
        Ok(())
    }
}
