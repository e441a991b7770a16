//! Unified configuration layer.
//!
//! All environment-variable reads are concentrated here; the assembler and
//! launcher access configuration through structured types instead of calling
//! `std::env::var` ad hoc.
//!
//! - `env_keys`: key constants, grouped by domain
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading
//! - `schema`: `StateDirsConfig`, `ObservabilityConfig`

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv};
pub use schema::{ObservabilityConfig, StateDirsConfig};
