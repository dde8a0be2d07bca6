//! Client configuration loading and management.
//!
//! Values come from a TOML file (missing file = defaults), then environment
//! overrides, then whatever the caller applies on top (CLI flags).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Environment variable overriding the RPC endpoint.
pub const ENV_RPC_URL: &str = "PASSPORT_RPC_URL";
/// Environment variable overriding the program id.
pub const ENV_PROGRAM_ID: &str = "PASSPORT_PROGRAM_ID";
/// Environment variable overriding the network selector.
pub const ENV_NETWORK: &str = "PASSPORT_NETWORK";
/// Environment variable overriding the keypair file path.
pub const ENV_KEYPAIR: &str = "PASSPORT_KEYPAIR";

/// Deployed learner passport program.
pub const DEFAULT_PROGRAM_ID: &str = "CTY5CyBk3JkGkqRLsAyqFp4V1RDdSabWTsT5uC1PANzw";

/// Cluster the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    Localnet,
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Network {
    /// Public RPC endpoint for this cluster.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Localnet => "http://127.0.0.1:8899",
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    fn explorer_cluster(&self) -> Option<&'static str> {
        match self {
            Self::Localnet => Some("custom"),
            Self::Devnet => Some("devnet"),
            Self::Testnet => Some("testnet"),
            Self::MainnetBeta => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Localnet => write!(f, "localnet"),
            Self::Devnet => write!(f, "devnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::MainnetBeta => write!(f, "mainnet-beta"),
        }
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "localnet" | "localhost" => Ok(Self::Localnet),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Self::MainnetBeta),
            other => Err(CoreError::Config(format!("unknown network: {}", other))),
        }
    }
}

/// What an explorer link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerKind {
    Address,
    Transaction,
}

/// Full client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PassportConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub network: Network,
    /// Explicit RPC endpoint; the network's default when unset.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Base58 id of the learner passport program.
    #[serde(default = "default_program_id")]
    pub program_id: String,
    /// Commitment level for reads and confirmations.
    #[serde(default = "default_commitment")]
    pub commitment: String,
    /// Signature-status polls before giving up on confirmation.
    #[serde(default = "default_confirm_attempts")]
    pub confirm_attempts: u32,
    /// Delay between signature-status polls.
    #[serde(default = "default_confirm_interval_ms")]
    pub confirm_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// JSON keypair file (64-byte array, Solana CLI format).
    #[serde(default = "default_keypair_path")]
    pub keypair_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Directory of the local progress database.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_program_id() -> String {
    DEFAULT_PROGRAM_ID.into()
}
fn default_commitment() -> String {
    "confirmed".into()
}
fn default_confirm_attempts() -> u32 {
    30
}
fn default_confirm_interval_ms() -> u64 {
    500
}
fn default_keypair_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("solana")
        .join("id.json")
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./passport-data/progress")
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_url: None,
            program_id: default_program_id(),
            commitment: default_commitment(),
            confirm_attempts: default_confirm_attempts(),
            confirm_interval_ms: default_confirm_interval_ms(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ClusterConfig {
    /// The endpoint to use: explicit URL, else the network default.
    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    /// Block explorer link for an address or transaction signature.
    pub fn explorer_url(&self, kind: ExplorerKind, id: &str) -> String {
        let path = match kind {
            ExplorerKind::Address => "address",
            ExplorerKind::Transaction => "tx",
        };
        match self.network.explorer_cluster() {
            None => format!("https://explorer.solana.com/{}/{}", path, id),
            Some("custom") => format!(
                "https://explorer.solana.com/{}/{}?cluster=custom&customUrl={}",
                path,
                id,
                self.rpc_url()
            ),
            Some(cluster) => format!(
                "https://explorer.solana.com/{}/{}?cluster={}",
                path, id, cluster
            ),
        }
    }
}

impl PassportConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: PassportConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `PASSPORT_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), CoreError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network) = lookup(ENV_NETWORK) {
            self.cluster.network = network.parse()?;
        }
        if let Some(url) = lookup(ENV_RPC_URL).filter(|v| !v.is_empty()) {
            self.cluster.rpc_url = Some(url);
        }
        if let Some(program_id) = lookup(ENV_PROGRAM_ID).filter(|v| !v.is_empty()) {
            self.cluster.program_id = program_id;
        }
        if let Some(path) = lookup(ENV_KEYPAIR).filter(|v| !v.is_empty()) {
            self.wallet.keypair_path = PathBuf::from(path);
        }
        Ok(())
    }
}

/// Shorten an address for display: `abcd...wxyz`.
pub fn truncate_address(address: &str, chars: usize) -> String {
    let len = address.chars().count();
    if len <= chars * 2 {
        return address.to_string();
    }
    let head: String = address.chars().take(chars).collect();
    let tail: String = address.chars().skip(len - chars).collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PassportConfig::default();
        assert_eq!(config.cluster.network, Network::Localnet);
        assert_eq!(config.cluster.rpc_url(), "http://127.0.0.1:8899");
        assert_eq!(config.cluster.program_id, DEFAULT_PROGRAM_ID);
        assert_eq!(config.cluster.commitment, "confirmed");
        assert!(config.wallet.keypair_path.ends_with(".config/solana/id.json"));
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("localhost".parse::<Network>().unwrap(), Network::Localnet);
        assert_eq!("devnet".parse::<Network>().unwrap(), Network::Devnet);
        assert_eq!(
            "mainnet-beta".parse::<Network>().unwrap(),
            Network::MainnetBeta
        );
        assert!("moonnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_NETWORK, "devnet"),
            (ENV_PROGRAM_ID, "11111111111111111111111111111111"),
            (ENV_KEYPAIR, "/tmp/authority.json"),
        ]
        .into_iter()
        .collect();

        let mut config = PassportConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.cluster.network, Network::Devnet);
        assert_eq!(config.cluster.rpc_url(), "https://api.devnet.solana.com");
        assert_eq!(config.cluster.program_id, "11111111111111111111111111111111");
        assert_eq!(
            config.wallet.keypair_path,
            PathBuf::from("/tmp/authority.json")
        );
    }

    #[test]
    fn test_explicit_rpc_url_wins() {
        let mut config = PassportConfig::default();
        config
            .apply_overrides(|k| (k == ENV_RPC_URL).then(|| "http://10.0.0.2:8899".to_string()))
            .unwrap();
        assert_eq!(config.cluster.rpc_url(), "http://10.0.0.2:8899");
    }

    #[test]
    fn test_bad_network_override() {
        let mut config = PassportConfig::default();
        let result = config.apply_overrides(|k| (k == ENV_NETWORK).then(|| "nope".to_string()));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_explorer_urls() {
        let mut cluster = ClusterConfig::default();
        cluster.network = Network::MainnetBeta;
        assert_eq!(
            cluster.explorer_url(ExplorerKind::Transaction, "sig"),
            "https://explorer.solana.com/tx/sig"
        );
        cluster.network = Network::Devnet;
        assert_eq!(
            cluster.explorer_url(ExplorerKind::Address, "addr"),
            "https://explorer.solana.com/address/addr?cluster=devnet"
        );
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[cluster]
network = "testnet"
confirm_attempts = 5

[progress]
store_path = "/var/lib/passport"
"#;
        let config: PassportConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.cluster.network, Network::Testnet);
        assert_eq!(config.cluster.confirm_attempts, 5);
        assert_eq!(config.cluster.confirm_interval_ms, 500);
        assert_eq!(config.progress.store_path, PathBuf::from("/var/lib/passport"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("passport-config-{}", rand::random::<u64>()));
        let path = dir.join("passport.toml");
        let mut config = PassportConfig::default();
        config.cluster.network = Network::Devnet;
        config.save(&path).unwrap();

        let loaded = PassportConfig::load(&path).unwrap();
        assert_eq!(loaded.cluster.network, Network::Devnet);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_nonexistent_uses_defaults() {
        let config = PassportConfig::load(Path::new("/nonexistent/passport.toml")).unwrap();
        assert_eq!(config.cluster.network, Network::Localnet);
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("CTY5CyBk3JkGkqRLsAyqFp4V1RDdSabWTsT5uC1PANzw", 4),
            "CTY5...ANzw"
        );
        assert_eq!(truncate_address("short", 4), "short");
    }
}
