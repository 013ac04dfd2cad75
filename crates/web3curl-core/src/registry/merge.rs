//! Combine default networks with user overrides.

use super::overrides::{parse_override, OverrideError};
use super::{EffectiveRegistry, NetworkDefinition, ENS_REGISTRY};

/// Applies networks from the config file on top of the built-in list.
///
/// A configured network replaces the built-in one with the same id;
/// new ids are appended in configuration order.
pub fn extend_defaults(
    defaults: Vec<NetworkDefinition>,
    configured: &[NetworkDefinition],
) -> Vec<NetworkDefinition> {
    let mut networks = defaults;
    for net in configured {
        match networks.iter_mut().find(|n| n.id == net.id) {
            Some(existing) => *existing = net.clone(),
            None => networks.push(net.clone()),
        }
    }
    networks
}

/// Groups endpoint overrides by chain id, keeping first-occurrence order of
/// ids and encounter order of URLs within an id.
fn accumulate_endpoints(raw: &[String]) -> Result<Vec<(u64, Vec<String>)>, OverrideError> {
    let mut grouped: Vec<(u64, Vec<String>)> = Vec::new();
    for item in raw {
        let (id, url) = parse_override(item)?;
        match grouped.iter_mut().find(|(gid, _)| *gid == id) {
            Some((_, urls)) => urls.push(url),
            None => grouped.push((id, vec![url])),
        }
    }
    Ok(grouped)
}

/// Builds the effective registry from `defaults` and raw override arguments.
///
/// All overrides are parsed before anything is applied, so a malformed
/// argument yields an error and no registry. Endpoint overrides for a known
/// chain replace its endpoint list; unknown chains get a `custom-<id>` entry
/// appended. Registry-address overrides only touch chains that exist after
/// endpoint overrides were applied.
pub fn merge(
    defaults: &[NetworkDefinition],
    endpoint_overrides: &[String],
    registry_overrides: &[String],
) -> Result<EffectiveRegistry, OverrideError> {
    let endpoints = accumulate_endpoints(endpoint_overrides)?;
    let registries = registry_overrides
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut networks: Vec<NetworkDefinition> = defaults.to_vec();

    for (id, urls) in endpoints {
        match networks.iter_mut().find(|n| n.id == id) {
            Some(existing) => {
                tracing::debug!(chain_id = id, endpoints = urls.len(), "replacing chain endpoints");
                existing.rpc_urls = urls;
            }
            None => {
                tracing::debug!(chain_id = id, "adding custom chain");
                networks.push(NetworkDefinition::custom(id, urls));
            }
        }
    }

    for (id, address) in registries {
        match networks.iter_mut().find(|n| n.id == id) {
            Some(existing) => {
                existing.contracts.insert(ENS_REGISTRY.to_string(), address);
            }
            None => {
                tracing::warn!(chain_id = id, "ignoring registry override for unknown chain");
            }
        }
    }

    Ok(EffectiveRegistry::from_networks(networks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_networks;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let defaults = default_networks();
        let reg = merge(&defaults, &[], &[]).unwrap();
        assert_eq!(reg.networks(), defaults.as_slice());
    }

    #[test]
    fn repeated_overrides_accumulate_and_replace() {
        let defaults = default_networks();
        let reg = merge(
            &defaults,
            &strings(&["1=http://localhost:9999", "1=http://localhost:8888"]),
            &[],
        )
        .unwrap();
        assert_eq!(
            reg.get(1).unwrap().rpc_urls,
            strings(&["http://localhost:9999", "http://localhost:8888"])
        );
        // Name and contracts of the overridden chain are untouched.
        assert_eq!(reg.get(1).unwrap().name, "Ethereum Mainnet");
        assert!(reg.get(1).unwrap().ens_registry().is_some());
    }

    #[test]
    fn interleaved_overrides_accumulate_per_chain() {
        let reg = merge(
            &default_networks(),
            &strings(&["1=http://a", "10=http://b", "1=http://c", "10=http://d"]),
            &[],
        )
        .unwrap();
        assert_eq!(reg.get(1).unwrap().rpc_urls, strings(&["http://a", "http://c"]));
        assert_eq!(reg.get(10).unwrap().rpc_urls, strings(&["http://b", "http://d"]));
    }

    #[test]
    fn unknown_chain_is_appended_as_custom() {
        let defaults = default_networks();
        let reg = merge(
            &defaults,
            &strings(&["777=http://x", "555=http://y", "777=http://z"]),
            &[],
        )
        .unwrap();
        let nets = reg.networks();
        assert_eq!(nets.len(), defaults.len() + 2);
        assert_eq!(&nets[..defaults.len()], defaults.as_slice());
        assert_eq!(nets[defaults.len()].id, 777);
        assert_eq!(nets[defaults.len()].name, "custom-777");
        assert_eq!(nets[defaults.len()].rpc_urls, strings(&["http://x", "http://z"]));
        assert_eq!(nets[defaults.len() + 1].name, "custom-555");
    }

    #[test]
    fn registry_override_sets_address() {
        let reg = merge(
            &default_networks(),
            &strings(&["31337=http://127.0.0.1:8545"]),
            &strings(&["31337=0x5FbDB2315678afecb367f032d93F642f64180aa3"]),
        )
        .unwrap();
        assert_eq!(
            reg.get(31337).unwrap().ens_registry(),
            Some("0x5FbDB2315678afecb367f032d93F642f64180aa3")
        );
    }

    #[test]
    fn registry_override_for_unknown_chain_is_noop() {
        let defaults = default_networks();
        let reg = merge(&defaults, &[], &strings(&["424242=0xabc"])).unwrap();
        assert_eq!(reg.networks(), defaults.as_slice());
    }

    #[test]
    fn bad_override_fails_without_registry() {
        let err = merge(
            &default_networks(),
            &strings(&["1=http://ok", "abc=http://x"]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, OverrideError::InvalidChainId { ref chain_id, .. } if chain_id == "abc"));

        let err = merge(&default_networks(), &[], &strings(&["5"])).unwrap_err();
        assert!(matches!(err, OverrideError::InvalidOverrideFormat { .. }));
    }

    #[test]
    fn config_networks_replace_and_append() {
        let mut replaced = NetworkDefinition::custom(1, strings(&["http://mine"]));
        replaced.name = "My Mainnet".to_string();
        let added = NetworkDefinition::custom(99, strings(&["http://new"]));
        let defaults = default_networks();
        let nets = extend_defaults(defaults.clone(), &[replaced.clone(), added.clone()]);
        assert_eq!(nets.len(), defaults.len() + 1);
        assert_eq!(nets[0], replaced);
        assert_eq!(nets.last().unwrap(), &added);
    }
}
