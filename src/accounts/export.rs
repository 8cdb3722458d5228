//! `accounts.json` export.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blockchain::wallet::Wallet;

/// One exported account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub private_key: String,
    pub public_key: String,
    pub address: String,
}

impl From<&Wallet> for AccountRecord {
    fn from(wallet: &Wallet) -> Self {
        Self {
            private_key: wallet.private_key_hex(),
            public_key: wallet.public_key_hex(),
            address: wallet.address().to_checksum(None),
        }
    }
}

/// Write `wallets` to `path` as a pretty JSON array.
pub fn write_accounts(path: &Path, wallets: &[Wallet]) -> io::Result<Vec<AccountRecord>> {
    let records: Vec<AccountRecord> = wallets.iter().map(AccountRecord::from).collect();
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json)?;

    tracing::info!(path = %path.display(), count = records.len(), "Accounts written");
    Ok(records)
}
