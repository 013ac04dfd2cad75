//! Network/endpoint registry.
//!
//! Built-in network definitions are merged with user overrides (RPC endpoints
//! and name-registry addresses) into one [`EffectiveRegistry`] per invocation.
//! The effective registry is read-only once built.

mod defaults;
mod merge;
mod overrides;

pub use defaults::default_networks;
pub use merge::{extend_defaults, merge};
pub use overrides::{parse_override, OverrideError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the ENS registry address in [`NetworkDefinition::contracts`].
pub const ENS_REGISTRY: &str = "ensRegistry";

/// One network (chain) the client can call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    /// Chain id; unique across a registry.
    pub id: u64,
    /// Human-readable name.
    pub name: String,
    /// Short name used in content pointers such as `arb1:0x...`.
    #[serde(default)]
    pub short_name: Option<String>,
    /// RPC endpoints in fallback order.
    pub rpc_urls: Vec<String>,
    /// Named contract addresses (e.g. `ensRegistry`).
    #[serde(default)]
    pub contracts: BTreeMap<String, String>,
}

impl NetworkDefinition {
    /// Network created for an endpoint override whose chain id has no definition.
    pub fn custom(id: u64, rpc_urls: Vec<String>) -> Self {
        Self {
            id,
            name: format!("custom-{}", id),
            short_name: None,
            rpc_urls,
            contracts: BTreeMap::new(),
        }
    }

    pub fn ens_registry(&self) -> Option<&str> {
        self.contracts.get(ENS_REGISTRY).map(String::as_str)
    }
}

/// Networks after defaults and overrides are combined, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveRegistry {
    networks: Vec<NetworkDefinition>,
}

impl EffectiveRegistry {
    pub(crate) fn from_networks(networks: Vec<NetworkDefinition>) -> Self {
        Self { networks }
    }

    pub fn networks(&self) -> &[NetworkDefinition] {
        &self.networks
    }

    pub fn get(&self, id: u64) -> Option<&NetworkDefinition> {
        self.networks.iter().find(|n| n.id == id)
    }

    /// Looks up a network by its short name (case-insensitive).
    pub fn by_short_name(&self, short_name: &str) -> Option<&NetworkDefinition> {
        self.networks.iter().find(|n| {
            n.short_name
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(short_name))
        })
    }

    /// Endpoints for `id`, empty when the chain is unknown.
    pub fn endpoints(&self, id: u64) -> &[String] {
        self.get(id).map(|n| n.rpc_urls.as_slice()).unwrap_or(&[])
    }
}
