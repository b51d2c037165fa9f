//! Wallet configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the wallet store.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The root directory for wallet data.
    pub data_dir: PathBuf,

    /// The name of the wallet database inside `data_dir`.
    ///
    /// Distinct wallet files may share a [`crate::db::DbEnv`]; the registry
    /// keys handles by full path.
    pub wallet_name: String,
}

impl Config {
    /// The full path of the wallet database.
    pub fn wallet_path(&self) -> PathBuf {
        self.data_dir.join(&self.wallet_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .map(|dir| dir.join("scion"))
                .unwrap_or_else(|| PathBuf::from("scion-data")),
            wallet_name: "wallet-db".to_owned(),
        }
    }
}
