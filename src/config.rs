//! Configuration for the fixed-price sale SDK
//!
//! Settings are layered from every configuration file found on the search
//! path, then overridden by `FIXED_SWAP_*` environment variables and finally
//! validated. Every field has a documented default so an empty environment
//! yields a usable local development setup.

use config::{Config as ConfigLoader, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// Environment variable prefixes for different configuration sections
const ENV_PREFIX: &str = "FIXED_SWAP";
const ENV_NETWORK_PREFIX: &str = "FIXED_SWAP_NETWORK";
const ENV_LOG_PREFIX: &str = "FIXED_SWAP_LOG";

/// Configuration file names, highest precedence first within a directory
const CONFIG_FILES: [&str; 3] = ["fixed-swap.toml", "fixed-swap.json", "config.toml"];

pub use crate::evm::confirmation::DEFAULT_CONFIRMATIONS;
/// Gas limit used for contract deployment
pub const DEFAULT_DEPLOY_GAS_LIMIT: u64 = 5_913_388;
/// Gas limit used for contract calls sent through the adapter
pub const DEFAULT_SEND_GAS_LIMIT: u64 = 4_430_000;
/// Gas price (wei) used for every adapter transaction
pub const DEFAULT_GAS_PRICE: u64 = 20_000_000_000;

/// Network the SDK talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network name (e.g., "development")
    pub name: String,
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Interval between receipt polls (milliseconds)
    pub poll_interval_ms: u64,
    /// Confirmations reported before a confirmation stream ends
    pub confirmation_blocks: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "development".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 1337,
            poll_interval_ms: 1000,
            confirmation_blocks: 24,
        }
    }
}

/// Transaction policy of the contract adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// A send or injected deploy resolves once this many confirmations are exceeded
    pub confirmations: u64,
    /// Gas limit for deployments when the request does not carry one
    pub deploy_gas_limit: u64,
    /// Gas limit for contract calls
    pub send_gas_limit: u64,
    /// Gas price in wei
    pub gas_price: u64,
    /// Upper bound on a confirmation wait; unset waits indefinitely
    pub confirmation_timeout_secs: Option<u64>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            deploy_gas_limit: DEFAULT_DEPLOY_GAS_LIMIT,
            send_gas_limit: DEFAULT_SEND_GAS_LIMIT,
            gas_price: DEFAULT_GAS_PRICE,
            confirmation_timeout_secs: None,
        }
    }
}

impl AdapterConfig {
    /// Confirmation wait bound as a duration
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (compact, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Complete SDK configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Network configuration
    pub network: NetworkConfig,
    /// Contract adapter configuration
    pub adapter: AdapterConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl SdkConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let files = Self::discover_files();
        let mut config = Self::from_files(&files)?;

        // Override with environment variables
        config.apply_env(|key| env::var(key).ok())?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, Error> {
        let config = Self::from_files(&[path.to_path_buf()])?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables only
    pub fn load_from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Existing configuration files on the search path, lowest precedence first
    fn discover_files() -> Vec<PathBuf> {
        let mut search_paths = Vec::new();
        if let Some(user_dir) = dirs::config_dir() {
            search_paths.push(user_dir.join("fixed-swap"));
        }
        search_paths.push(PathBuf::from("."));
        search_paths.push(PathBuf::from("config"));
        if let Ok(config_dir) = env::var(format!("{}_CONFIG_DIR", ENV_PREFIX)) {
            search_paths.push(PathBuf::from(config_dir));
        }

        Self::existing_files(&search_paths)
    }

    /// Config files present in `search_paths`
    ///
    /// Later directories take precedence over earlier ones; within a
    /// directory `fixed-swap.toml` beats `fixed-swap.json`, which beats
    /// `config.toml`.
    fn existing_files(search_paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for search_path in search_paths {
            for config_file in CONFIG_FILES.iter().rev() {
                let file_path = search_path.join(config_file);
                if file_path.exists() && !found.contains(&file_path) {
                    found.push(file_path);
                }
            }
        }
        found
    }

    /// Merge `files` over the defaults; later files win
    fn from_files(files: &[PathBuf]) -> Result<Self, Error> {
        let mut builder = ConfigLoader::builder();
        for file_path in files {
            let file_format = match file_path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => FileFormat::Json,
                _ => FileFormat::Toml,
            };
            builder = builder.add_source(File::from(file_path.as_path()).format(file_format));
        }

        let settings = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to load config file: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Apply `FIXED_SWAP_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = |field: &str| lookup(&format!("{}_{}", ENV_NETWORK_PREFIX, field));
        if let Some(name) = network("NAME") {
            self.network.name = name;
        }
        if let Some(rpc_url) = network("RPC_URL") {
            self.network.rpc_url = rpc_url;
        }
        if let Some(chain_id) = parse_var("CHAIN_ID", network("CHAIN_ID"))? {
            self.network.chain_id = chain_id;
        }
        if let Some(interval) = parse_var("POLL_INTERVAL_MS", network("POLL_INTERVAL_MS"))? {
            self.network.poll_interval_ms = interval;
        }
        if let Some(blocks) = parse_var("CONFIRMATION_BLOCKS", network("CONFIRMATION_BLOCKS"))? {
            self.network.confirmation_blocks = blocks;
        }

        let adapter = |field: &str| lookup(&format!("{}_{}", ENV_PREFIX, field));
        if let Some(confirmations) = parse_var("CONFIRMATIONS", adapter("CONFIRMATIONS"))? {
            self.adapter.confirmations = confirmations;
        }
        if let Some(gas) = parse_var("DEPLOY_GAS_LIMIT", adapter("DEPLOY_GAS_LIMIT"))? {
            self.adapter.deploy_gas_limit = gas;
        }
        if let Some(gas) = parse_var("SEND_GAS_LIMIT", adapter("SEND_GAS_LIMIT"))? {
            self.adapter.send_gas_limit = gas;
        }
        if let Some(gas_price) = parse_var("GAS_PRICE", adapter("GAS_PRICE"))? {
            self.adapter.gas_price = gas_price;
        }
        if let Some(timeout) = parse_var(
            "CONFIRMATION_TIMEOUT_SECS",
            adapter("CONFIRMATION_TIMEOUT_SECS"),
        )? {
            self.adapter.confirmation_timeout_secs = Some(timeout);
        }

        let logging = |field: &str| lookup(&format!("{}_{}", ENV_LOG_PREFIX, field));
        if let Some(level) = logging("LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = logging("FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        let url = url::Url::parse(&self.network.rpc_url)
            .map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(
                "RPC URL must start with http:// or https://".to_string(),
            ));
        }

        if self.network.chain_id == 0 {
            return Err(Error::Config("Chain id must be greater than 0".to_string()));
        }

        if self.network.poll_interval_ms == 0 {
            return Err(Error::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.adapter.confirmations >= self.network.confirmation_blocks {
            return Err(Error::Config(format!(
                "Confirmation threshold {} cannot be reached with {} confirmation blocks",
                self.adapter.confirmations, self.network.confirmation_blocks
            )));
        }

        if self.adapter.deploy_gas_limit == 0 || self.adapter.send_gas_limit == 0 {
            return Err(Error::Config("Gas limits must be positive".to_string()));
        }

        if self.adapter.gas_price == 0 {
            return Err(Error::Config("Gas price must be positive".to_string()));
        }

        if self.adapter.confirmation_timeout_secs == Some(0) {
            return Err(Error::Config(
                "Confirmation timeout must be greater than 0".to_string(),
            ));
        }

        match self.logging.format.as_str() {
            "compact" | "pretty" => {}
            other => {
                return Err(Error::Config(format!(
                    "Unknown log format '{}', expected compact or pretty",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, file_path: &Path) -> Result<(), Error> {
        // Create directory if it doesn't exist
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(file_path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("fixed-swap");
        path.push("fixed-swap.toml");
        path
    }
}

fn parse_var<T>(field: &str, value: Option<String>) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                Error::Config(format!("Invalid value '{}' for {}: {}", raw, field, e))
            })
        })
        .transpose()
}
