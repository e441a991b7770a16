//! Runtime launcher: translate the environment into one validated node
//! command and hand the process over to it.
//!
//! The whole contribution of this crate to the system's lifetime is a single
//! assembly-and-exec step at startup. Configuration is read once into an
//! immutable [`config::NodeConfig`]; [`command::assemble`] is a pure function
//! of that struct; [`exec::exec_node`] replaces the process image.

pub mod command;
pub mod config;
pub mod exec;
pub mod policy;

pub use command::AssembledCommand;
pub use config::NodeConfig;
pub use policy::{KeyPolicy, LaunchError};
