//! Dispatcher configuration.
//!
//! Aggregates relayer, network, executor and registry settings into a single
//! Config struct that can be loaded from YAML files or environment variables.

mod network;

pub use network::{NetworkConfig, DEFAULT_ETH_RPC_URL, DEFAULT_L1_CHAIN_ID};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "SX_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "SX";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "SX_LOG";
/// Environment variable overriding the relayer URL.
pub const MANA_URL_ENV_VAR: &str = "MANA_URL";
/// Environment variable overriding the Ethereum RPC URL.
pub const ETH_RPC_URL_ENV_VAR: &str = "ETH_RPC_URL";

use serde::Deserialize;

use crate::execution::ExecutorIds;
use crate::registry::SupportedConfig;
use crate::transport::RelayerConfig;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Finalize relayer.
    pub relayer: RelayerConfig,
    /// L1 network and Zodiac deployments.
    pub network: NetworkConfig,
    /// Executor ids the resolver recognises.
    pub executors: ExecutorIds,
    /// Ids the support registry accepts.
    pub supported: SupportedConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. `MANA_URL` / `ETH_RPC_URL`
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("supported.executors")
                    .with_list_parse_key("supported.authenticators")
                    .with_list_parse_key("supported.strategies")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply the relayer and RPC URL overrides.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(MANA_URL_ENV_VAR).filter(|v| !v.is_empty()) {
            self.relayer.url = url;
        }
        if let Some(url) = lookup(ETH_RPC_URL_ENV_VAR).filter(|v| !v.is_empty()) {
            self.network.eth_rpc_url = url;
        }
    }

    /// Reject configurations the dispatcher cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relayer.url.is_empty() {
            return Err(ConfigError::Invalid("relayer.url is empty".to_string()));
        }
        if self.network.l1_chain_id == 0 {
            return Err(ConfigError::Invalid(
                "network.l1_chain_id must be non-zero".to_string(),
            ));
        }
        if self.executors.zodiac == self.executors.vanilla {
            return Err(ConfigError::Invalid(
                "executors.zodiac and executors.vanilla must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
