//! Fund distributor CLI.
//!
//! ```text
//! create   → derive accounts from seed, write accounts.json
//! balances → survey destination balances
//! deposit  → seed core accounts, disburse to the rest
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use fund_distributor::accounts::{generate_accounts, write_accounts};
use fund_distributor::config::{load_config, parse_amount, validate_config, ConfigError, FundingConfig};
use fund_distributor::observability::{logging, metrics};
use fund_distributor::{Depositor, RpcLedgerClient, Wallet};

#[derive(Parser)]
#[command(name = "fund-distributor")]
#[command(about = "Generate accounts and keep them funded", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the node.
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AccountArgs {
    /// Number of accounts to generate
    #[arg(long)]
    num: Option<usize>,

    /// Seed to generate account private keys
    #[arg(long)]
    seed: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create accounts and write them to a JSON file
    Create {
        #[command(flatten)]
        accounts: AccountArgs,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Fund the created accounts right after writing them
        #[arg(long)]
        deposit: bool,

        /// Private key of the funding account (falls back to FUNDER_PRIVATE_KEY)
        #[arg(long, requires = "deposit")]
        senderpk: Option<String>,
    },
    /// Print the balance of every generated account
    Balances {
        #[command(flatten)]
        accounts: AccountArgs,

        /// Number of balance workers
        #[arg(long)]
        nworkers: Option<usize>,
    },
    /// Fund every generated account up to the expected balance
    Deposit {
        #[command(flatten)]
        accounts: AccountArgs,

        /// Private key of the funding account (falls back to FUNDER_PRIVATE_KEY)
        #[arg(long)]
        senderpk: Option<String>,

        /// Expected balance of each account (wei)
        #[arg(long)]
        expectedbalance: Option<String>,

        /// Number of balance workers
        #[arg(long)]
        nworkers: Option<usize>,

        /// Number of core accounts seeded from the funding account
        #[arg(long)]
        ncore: Option<usize>,

        /// Only top up accounts below the expected balance
        #[arg(long)]
        check_balances: bool,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut FundingConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        let accounts = match &self.command {
            Commands::Create { accounts, output, .. } => {
                if let Some(output) = output {
                    config.accounts.output = output.clone();
                }
                accounts
            }
            Commands::Balances { accounts, nworkers } => {
                if let Some(n) = nworkers {
                    config.depositor.num_workers = *n;
                }
                accounts
            }
            Commands::Deposit {
                accounts,
                expectedbalance,
                nworkers,
                ncore,
                check_balances,
                ..
            } => {
                if let Some(amount) = expectedbalance {
                    config.depositor.target_balance = amount.clone();
                }
                if let Some(n) = nworkers {
                    config.depositor.num_workers = *n;
                }
                if let Some(n) = ncore {
                    config.depositor.core_accounts = *n;
                }
                config.depositor.check_balances |= *check_balances;
                accounts
            }
        };
        if let Some(num) = accounts.num {
            config.accounts.num = num;
        }
        if let Some(seed) = &accounts.seed {
            config.accounts.seed = seed.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FundingConfig::default(),
    };
    cli.apply_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    match cli.command {
        Commands::Create {
            deposit: fund,
            senderpk,
            ..
        } => {
            create(&config)?;
            if fund {
                deposit(&config, senderpk.as_deref()).await?;
            }
            Ok(())
        }
        Commands::Balances { .. } => balances(&config).await,
        Commands::Deposit { senderpk, .. } => deposit(&config, senderpk.as_deref()).await,
    }
}

fn create(config: &FundingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let wallets = generate_accounts(config.accounts.num, &config.accounts.seed)?;
    let records = write_accounts(Path::new(&config.accounts.output), &wallets)?;
    for record in &records {
        println!("{}", serde_json::to_string_pretty(record)?);
    }
    Ok(())
}

fn build_depositor(
    config: &FundingConfig,
    funder: Wallet,
) -> Result<Depositor<RpcLedgerClient>, Box<dyn std::error::Error>> {
    let target = parse_amount(&config.depositor.target_balance)?;
    let wallets = generate_accounts(config.accounts.num, &config.accounts.seed)?;
    let client = Arc::new(RpcLedgerClient::new(config.rpc.clone())?);

    tracing::info!(
        wallets = wallets.len(),
        target_balance = %target,
        core_accounts = config.depositor.core_accounts,
        check_balances = config.depositor.check_balances,
        "Depositor configured"
    );

    Ok(Depositor::new(client, funder, wallets, target, config.depositor.clone())
        .with_chain_id(config.rpc.chain_id))
}

async fn balances(config: &FundingConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Surveying needs no signing key; any wallet stands in as funder.
    let placeholder = generate_accounts(1, &config.accounts.seed)?.remove(0);
    let depositor = build_depositor(config, placeholder)?;

    let balances = depositor.check_for_balances().await?;
    for address in depositor.addresses() {
        let balance = balances.get(&address).copied().unwrap_or_default();
        println!("{address} {balance}");
    }
    Ok(())
}

async fn deposit(
    config: &FundingConfig,
    senderpk: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let funder = match senderpk {
        Some(key) => Wallet::from_private_key(key)?,
        None => Wallet::from_env()?,
    };
    let depositor = build_depositor(config, funder)?;

    tokio::select! {
        result = depositor.check_and_deposit() => {
            let report = result?;
            tracing::info!(
                planned = report.planned,
                skipped = report.skipped,
                seeded = report.seeded.len(),
                disbursed = report.disbursed.succeeded,
                "Deposit complete"
            );
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, in-flight transactions may still be mined");
            Err("interrupted".into())
        }
    }
}
