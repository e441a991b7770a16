//! Per-key emission policy.
//!
//! Every configuration key declares what happens when its variable is unset.
//! One policy enum drives one generic resolution routine, so "omit the flag"
//! can never degrade into "emit the flag with an empty value".

use taoboot_core::config::env_keys::{database, node};
use thiserror::Error;

/// Behavior of a configuration key when its environment variable is unset
/// (or set to an empty string, which counts as unset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Absence fails configuration loading before any command is assembled.
    Required,
    /// The flag token itself is omitted. Never emitted with an empty value.
    OmitIfAbsent,
    /// The fixed fallback value is emitted instead.
    DefaultIfAbsent(&'static str),
}

/// Errors from configuration loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Required configuration variable {0} is not set")]
    MissingKey(&'static str),
}

/// One `--flag value` configuration key: environment source, node-process
/// flag name, absence policy.
#[derive(Debug, Clone, Copy)]
pub struct ConfigKey {
    pub env: &'static str,
    pub flag: &'static str,
    pub policy: KeyPolicy,
}

/// Subnet uid of the storage network.
pub const DEFAULT_NETUID: &str = "21";

/// Redis runs alongside the node unless told otherwise.
pub const DEFAULT_DATABASE_HOST: &str = "localhost";

/// Flag-emitting keys, in the stable order they appear in the assembled
/// command. The role selector and EXTRA_OPTIONS are handled separately
/// (positional and trailing, respectively).
pub const FLAG_KEYS: &[ConfigKey] = &[
    ConfigKey {
        env: node::WALLET_NAME,
        flag: "--wallet.name",
        policy: KeyPolicy::Required,
    },
    ConfigKey {
        env: node::WALLET_HOTKEY,
        flag: "--wallet.hotkey",
        policy: KeyPolicy::Required,
    },
    ConfigKey {
        env: node::NETUID,
        flag: "--netuid",
        policy: KeyPolicy::DefaultIfAbsent(DEFAULT_NETUID),
    },
    ConfigKey {
        env: node::EXTERNAL_IP,
        flag: "--axon.external_ip",
        policy: KeyPolicy::OmitIfAbsent,
    },
    ConfigKey {
        env: node::AXON_PORT,
        flag: "--axon.port",
        policy: KeyPolicy::Required,
    },
    ConfigKey {
        env: node::EXTERNAL_PORT,
        flag: "--axon.external_port",
        policy: KeyPolicy::Required,
    },
    ConfigKey {
        env: node::SUBTENSOR_NETWORK,
        flag: "--subtensor.network",
        policy: KeyPolicy::Required,
    },
    ConfigKey {
        env: database::DATABASE_HOST,
        flag: "--database.host",
        policy: KeyPolicy::DefaultIfAbsent(DEFAULT_DATABASE_HOST),
    },
    ConfigKey {
        env: database::DATABASE_PORT,
        flag: "--database.port",
        policy: KeyPolicy::Required,
    },
    ConfigKey {
        env: database::REDIS_PASSWORD,
        flag: "--database.redis_password",
        policy: KeyPolicy::Required,
    },
];

/// Apply a key's policy to its looked-up value. `Ok(None)` means the flag is
/// genuinely omitted.
pub fn resolve(key: &ConfigKey, value: Option<String>) -> Result<Option<String>, LaunchError> {
    match (key.policy, value) {
        (_, Some(v)) => Ok(Some(v)),
        (KeyPolicy::Required, None) => Err(LaunchError::MissingKey(key.env)),
        (KeyPolicy::OmitIfAbsent, None) => Ok(None),
        (KeyPolicy::DefaultIfAbsent(fallback), None) => Ok(Some(fallback.to_string())),
    }
}
