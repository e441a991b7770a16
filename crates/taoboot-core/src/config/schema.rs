//! Configuration structs, grouped by domain and loaded from the environment.

use super::env_keys::{observability as obv_keys, paths};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Default installation prefix baked into the runtime image.
pub const DEFAULT_PREFIX: &str = "/opt/filetao";

/// State mount points created empty at startup. Their contents belong to
/// external collaborators (wallet tooling, the database engine).
#[derive(Debug, Clone)]
pub struct StateDirsConfig {
    pub wallet_dir: PathBuf,
    pub database_conf_dir: PathBuf,
}

impl StateDirsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let wallet_dir = env_optional(paths::WALLET_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("/root"))
                    .join(".bittensor")
                    .join("wallets")
            });
        let database_conf_dir = env_optional(paths::DATABASE_CONF_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/etc/redis"));
        Self {
            wallet_dir,
            database_conf_dir,
        }
    }
}

/// Logging and audit settings.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            quiet: env_bool(obv_keys::TAOBOOT_QUIET, false),
            log_level: env_or(obv_keys::TAOBOOT_LOG_LEVEL, || "taoboot=info".to_string()),
            log_json: env_bool(obv_keys::TAOBOOT_LOG_JSON, false),
            audit_log: env_optional(obv_keys::TAOBOOT_AUDIT_LOG),
        }
    }
}
