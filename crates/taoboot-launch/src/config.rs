//! The Configuration Input Set, read from the environment in one pass.

use std::collections::BTreeMap;

use taoboot_core::config::env_keys::node;
use taoboot_core::config::{env_optional, load_dotenv};

use crate::policy::{resolve, LaunchError, FLAG_KEYS};

/// Immutable launch configuration. Constructed once at startup; command
/// assembly is a pure function of this struct, so the assembly logic is
/// testable without touching real process environment state.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    role: String,
    /// Emitted value per env key. Required keys are always present, defaults
    /// are already applied, and omit-if-absent keys are absent when unset.
    values: BTreeMap<&'static str, String>,
    extra_options: Vec<String>,
}

impl NodeConfig {
    /// Read the environment at the moment of launch (never a cached
    /// snapshot) and validate it in one pass.
    pub fn from_env() -> Result<Self, LaunchError> {
        load_dotenv();
        Self::from_lookup(|key| env_optional(key))
    }

    /// Build from any key-value source. Empty and whitespace-only values
    /// count as unset, so an optional key set to "" is truly omitted rather
    /// than emitted with an empty value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LaunchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let normalized = |key: &'static str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let role =
            normalized(node::NEURON_TYPE).ok_or(LaunchError::MissingKey(node::NEURON_TYPE))?;

        let mut values = BTreeMap::new();
        for key in FLAG_KEYS {
            if let Some(value) = resolve(key, normalized(key.env))? {
                values.insert(key.env, value);
            }
        }

        // The escape hatch: raw trailing tokens, split on whitespace like the
        // shell would, never quoted or reinterpreted.
        let extra_options = normalized(node::EXTRA_OPTIONS)
            .map(|raw| raw.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        Ok(Self {
            role,
            values,
            extra_options,
        })
    }

    /// The node role (positional argument after the `run` subcommand).
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Resolved value for a flag key, `None` when the key's policy omitted it.
    pub fn value(&self, env_key: &str) -> Option<&str> {
        self.values.get(env_key).map(String::as_str)
    }

    pub fn extra_options(&self) -> &[String] {
        &self.extra_options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_inputs() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("NEURON_TYPE", "miner"),
            ("WALLET_NAME", "validator1"),
            ("WALLET_HOTKEY", "default"),
            ("AXON_PORT", "8091"),
            ("EXTERNAL_PORT", "8091"),
            ("SUBTENSOR_NETWORK", "finney"),
            ("DATABASE_PORT", "6379"),
            ("REDIS_PASSWORD", "secret"),
        ])
    }

    fn config_from(map: &HashMap<&'static str, &'static str>) -> Result<NodeConfig, LaunchError> {
        NodeConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_minimal_inputs_load() {
        let cfg = config_from(&base_inputs()).unwrap();
        assert_eq!(cfg.role(), "miner");
        assert_eq!(cfg.value("WALLET_NAME"), Some("validator1"));
        assert_eq!(cfg.value("NETUID"), Some("21"));
        assert_eq!(cfg.value("DATABASE_HOST"), Some("localhost"));
        assert_eq!(cfg.value("EXTERNAL_IP"), None);
        assert!(cfg.extra_options().is_empty());
    }

    #[test]
    fn test_missing_required_key_fails_fast() {
        let mut inputs = base_inputs();
        inputs.remove("WALLET_HOTKEY");
        assert_eq!(
            config_from(&inputs).unwrap_err(),
            LaunchError::MissingKey("WALLET_HOTKEY")
        );
    }

    #[test]
    fn test_missing_role_fails_fast() {
        let mut inputs = base_inputs();
        inputs.remove("NEURON_TYPE");
        assert_eq!(
            config_from(&inputs).unwrap_err(),
            LaunchError::MissingKey("NEURON_TYPE")
        );
    }

    #[test]
    fn test_empty_required_counts_as_unset() {
        let mut inputs = base_inputs();
        inputs.insert("REDIS_PASSWORD", "   ");
        assert_eq!(
            config_from(&inputs).unwrap_err(),
            LaunchError::MissingKey("REDIS_PASSWORD")
        );
    }

    #[test]
    fn test_empty_external_ip_is_unset() {
        let mut inputs = base_inputs();
        inputs.insert("EXTERNAL_IP", "");
        let cfg = config_from(&inputs).unwrap();
        assert_eq!(cfg.value("EXTERNAL_IP"), None);
    }

    #[test]
    fn test_extra_options_whitespace_split() {
        let mut inputs = base_inputs();
        inputs.insert("EXTRA_OPTIONS", "  --miner.verbose   --wandb.off ");
        let cfg = config_from(&inputs).unwrap();
        assert_eq!(cfg.extra_options(), &["--miner.verbose", "--wandb.off"]);
    }
}
