use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::registry::{NetworkDefinition, ENS_REGISTRY};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot locate XDG directories: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("cannot read {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid [[chain]] entry: {0}")]
    InvalidChain(String),
}

/// Extra or replacement network from a `[[chain]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    pub rpc_urls: Vec<String>,
    /// ENS registry address on this chain, if it has one.
    #[serde(default)]
    pub ens_registry: Option<String>,
}

impl ChainConfig {
    fn into_network(self) -> Result<NetworkDefinition, ConfigError> {
        if self.id == 0 {
            return Err(ConfigError::InvalidChain(format!(
                "chain '{}' has id 0",
                self.name
            )));
        }
        let mut contracts = BTreeMap::new();
        if let Some(registry) = self.ens_registry {
            registry.parse::<Address>().map_err(|e| {
                ConfigError::InvalidChain(format!(
                    "chain {}: ens_registry '{}': {}",
                    self.id, registry, e
                ))
            })?;
            contracts.insert(ENS_REGISTRY.to_string(), registry);
        }
        Ok(NetworkDefinition {
            id: self.id,
            name: self.name,
            short_name: self.short_name,
            rpc_urls: self.rpc_urls,
            contracts,
        })
    }
}

/// Settings loaded from `~/.config/web3curl/config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Web3CurlConfig {
    /// TCP connect timeout for RPC endpoints, in seconds.
    pub connect_timeout_secs: u64,
    /// Total timeout of one RPC request, in seconds.
    pub request_timeout_secs: u64,
    /// Maximum follow-up chunks fetched for one resource response.
    pub max_chunks: usize,
    #[serde(rename = "chain")]
    pub chains: Vec<ChainConfig>,
}

impl Default for Web3CurlConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_chunks: 64,
            chains: Vec::new(),
        }
    }
}

impl Web3CurlConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `[[chain]]` tables as network definitions, in file order.
    pub fn networks(&self) -> Result<Vec<NetworkDefinition>, ConfigError> {
        self.chains
            .iter()
            .cloned()
            .map(ChainConfig::into_network)
            .collect()
    }
}

/// Existing config file, if any. Nothing is created.
pub fn config_path() -> Result<Option<PathBuf>, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("web3curl")?;
    Ok(xdg_dirs.find_config_file(CONFIG_FILE))
}

/// Loads the config file, or defaults when there is none.
pub fn load() -> Result<Web3CurlConfig, ConfigError> {
    match config_path()? {
        Some(path) => load_from_path(&path),
        None => Ok(Web3CurlConfig::default()),
    }
}

pub fn load_from_path(path: &Path) -> Result<Web3CurlConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Web3CurlConfig = toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), chains = cfg.chains.len(), "loaded config");
    Ok(cfg)
}
