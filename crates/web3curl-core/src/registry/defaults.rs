//! Built-in network list.

use std::collections::BTreeMap;

use super::{NetworkDefinition, ENS_REGISTRY};

/// ENS registry deployment shared by mainnet and the public testnets.
const ENS_REGISTRY_ADDRESS: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

fn network(
    id: u64,
    name: &str,
    short_name: &str,
    rpc_urls: &[&str],
    ens_registry: Option<&str>,
) -> NetworkDefinition {
    let mut contracts = BTreeMap::new();
    if let Some(addr) = ens_registry {
        contracts.insert(ENS_REGISTRY.to_string(), addr.to_string());
    }
    NetworkDefinition {
        id,
        name: name.to_string(),
        short_name: Some(short_name.to_string()),
        rpc_urls: rpc_urls.iter().map(|s| s.to_string()).collect(),
        contracts,
    }
}

/// Networks known without any configuration, in registry order.
pub fn default_networks() -> Vec<NetworkDefinition> {
    vec![
        network(
            1,
            "Ethereum Mainnet",
            "eth",
            &["https://ethereum-rpc.publicnode.com", "https://eth.llamarpc.com"],
            Some(ENS_REGISTRY_ADDRESS),
        ),
        network(
            11155111,
            "Sepolia",
            "sep",
            &["https://ethereum-sepolia-rpc.publicnode.com", "https://rpc.sepolia.org"],
            Some(ENS_REGISTRY_ADDRESS),
        ),
        network(
            17000,
            "Holesky",
            "holesky",
            &["https://ethereum-holesky-rpc.publicnode.com"],
            Some(ENS_REGISTRY_ADDRESS),
        ),
        network(10, "OP Mainnet", "oeth", &["https://mainnet.optimism.io"], None),
        network(42161, "Arbitrum One", "arb1", &["https://arb1.arbitrum.io/rpc"], None),
        network(42170, "Arbitrum Nova", "arb-nova", &["https://nova.arbitrum.io/rpc"], None),
        network(8453, "Base", "base", &["https://mainnet.base.org"], None),
        network(137, "Polygon Mainnet", "matic", &["https://polygon-rpc.com"], None),
        network(3334, "Web3Q Galileo", "w3q-g", &["https://galileo.web3q.io:8545"], None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_ids_are_unique_and_usable() {
        let nets = default_networks();
        let ids: HashSet<u64> = nets.iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), nets.len());
        assert!(nets.iter().all(|n| !n.rpc_urls.is_empty()));
    }

    #[test]
    fn mainnet_carries_ens_registry() {
        let nets = default_networks();
        let mainnet = nets.iter().find(|n| n.id == 1).unwrap();
        assert_eq!(mainnet.ens_registry(), Some(ENS_REGISTRY_ADDRESS));
    }
}
