//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! carry explicit defaults so a minimal file (or none) is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the fund distributor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FundingConfig {
    /// Chain node connection.
    pub rpc: RpcConfig,

    /// Deterministic destination accounts.
    pub accounts: AccountsConfig,

    /// Distribution engine tuning.
    pub depositor: DepositorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// RPC request timeout in seconds.
    pub timeout_secs: u64,

    /// Chain ID for EIP-155 signatures. Unset signs Homestead-style.
    pub chain_id: Option<u64>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://0.0.0.0:22001".to_string(),
            timeout_secs: 10,
            chain_id: None,
        }
    }
}

/// Seed-derived destination accounts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Number of accounts to derive.
    pub num: usize,

    /// Seed prefix; account `i` uses `seed + i`.
    pub seed: String,

    /// Where `create` writes the exported accounts.
    pub output: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            num: 4,
            seed: "distributor".to_string(),
            output: "accounts.json".to_string(),
        }
    }
}

/// Distribution engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DepositorConfig {
    /// Balance every destination must reach, in wei (decimal string).
    pub target_balance: String,

    /// Gas limit for seeding transfers from the funding account.
    pub gas_limit: u64,

    /// Gas limit for disbursement transfers from core accounts.
    pub transfer_gas_limit: u64,

    /// Fixed gas price for disbursements in wei. Unset asks the node once per run.
    pub transfer_gas_price: Option<u128>,

    /// Concurrent balance-survey workers (the survey runs `num_workers + 1` batches).
    pub num_workers: usize,

    /// Intermediary accounts seeded directly from the funding account.
    pub core_accounts: usize,

    /// Sleep between receipt polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Give up waiting for a receipt after this many seconds. Unset waits forever.
    pub confirmation_timeout_secs: Option<u64>,

    /// Disbursement transfers submitted per core account before pausing.
    pub tx_per_turn: usize,

    /// Pause between disbursement sub-batches in milliseconds.
    pub turn_pause_ms: u64,

    /// Consume the nonce slot even when submission fails.
    pub advance_nonce_on_send_failure: bool,

    /// Treat a failed-status seeding receipt as an error.
    pub require_successful_receipt: bool,

    /// Survey balances first and only top up destinations below target.
    pub check_balances: bool,

    /// Wait for every disbursement receipt before counting it a success.
    pub await_disbursements: bool,
}

impl Default for DepositorConfig {
    fn default() -> Self {
        Self {
            target_balance: "1000000000000000000".to_string(),
            gas_limit: 1_000_000,
            transfer_gas_limit: 30_000,
            transfer_gas_price: None,
            num_workers: 1,
            core_accounts: 4,
            poll_interval_ms: 2000,
            confirmation_timeout_secs: None,
            tx_per_turn: 20,
            turn_pause_ms: 1000,
            advance_nonce_on_send_failure: true,
            require_successful_receipt: false,
            check_balances: false,
            await_disbursements: false,
        }
    }
}

impl DepositorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }

    pub fn turn_pause(&self) -> Duration {
        Duration::from_millis(self.turn_pause_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
