//! Environment-variable key constants.
//!
//! Node-process keys keep the names the container contract has always used
//! (`WALLET_NAME`, `NETUID`, ...); taoboot's own knobs are namespaced
//! `TAOBOOT_*`.

/// Node identity and network selection, consumed at launch.
pub mod node {
    pub const NEURON_TYPE: &str = "NEURON_TYPE";
    pub const WALLET_NAME: &str = "WALLET_NAME";
    pub const WALLET_HOTKEY: &str = "WALLET_HOTKEY";
    pub const NETUID: &str = "NETUID";
    pub const EXTERNAL_IP: &str = "EXTERNAL_IP";
    pub const AXON_PORT: &str = "AXON_PORT";
    pub const EXTERNAL_PORT: &str = "EXTERNAL_PORT";
    pub const SUBTENSOR_NETWORK: &str = "SUBTENSOR_NETWORK";
    /// Raw trailing options, appended to the command verbatim.
    pub const EXTRA_OPTIONS: &str = "EXTRA_OPTIONS";
}

/// Redis-backed node state store.
pub mod database {
    pub const DATABASE_HOST: &str = "DATABASE_HOST";
    pub const DATABASE_PORT: &str = "DATABASE_PORT";
    pub const REDIS_PASSWORD: &str = "REDIS_PASSWORD";
}

/// Installation prefix and state mount points.
pub mod paths {
    /// Root of the runtime prefix the image assembler produced.
    pub const TAOBOOT_PREFIX: &str = "TAOBOOT_PREFIX";
    /// Wallet mount point; contents owned by wallet tooling.
    pub const WALLET_DIR: &str = "WALLET_DIR";
    /// Redis config mount point; contents owned by the database engine.
    pub const DATABASE_CONF_DIR: &str = "DATABASE_CONF_DIR";
}

/// Logging and audit.
pub mod observability {
    pub const TAOBOOT_QUIET: &str = "TAOBOOT_QUIET";
    pub const TAOBOOT_LOG_LEVEL: &str = "TAOBOOT_LOG_LEVEL";
    pub const TAOBOOT_LOG_JSON: &str = "TAOBOOT_LOG_JSON";
    pub const TAOBOOT_AUDIT_LOG: &str = "TAOBOOT_AUDIT_LOG";
}

/// Variables exported to the node process at exec time.
pub mod runtime {
    pub const PYTHONPATH: &str = "PYTHONPATH";
    /// Path of the deregistration-rebalance script the node invokes on its own.
    pub const REBALANCE_SCRIPT_PATH: &str = "REBALANCE_SCRIPT_PATH";
}
