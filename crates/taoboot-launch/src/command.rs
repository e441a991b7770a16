//! Command assembly: one ordered token sequence, built deterministically
//! from an immutable [`NodeConfig`], never mutated after construction.

use crate::config::NodeConfig;
use crate::policy::FLAG_KEYS;

/// The node-process entry point installed into the prefix's bin directory.
pub const NODE_PROGRAM: &str = "filetao";

/// Subcommand preceding the role selector.
pub const RUN_SUBCOMMAND: &str = "run";

/// Flag whose value never reaches logs or the audit trail.
const REDACTED_FLAG: &str = "--database.redis_password";

/// The assembled argument vector: program name, subcommand, role, then one
/// `--flag value` pair per emitted key in stable order, then the raw
/// extra-option tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledCommand {
    tokens: Vec<String>,
}

impl AssembledCommand {
    #[cfg(test)]
    pub(crate) fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Everything after the program name, ready for `Command::args`.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// Copy of the token vector with the database credential masked. This is
    /// the only form that may be logged or written to the audit trail.
    pub fn redacted(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.tokens.len());
        let mut mask_next = false;
        for token in &self.tokens {
            if mask_next {
                out.push("***".to_string());
            } else {
                out.push(token.clone());
            }
            mask_next = token == REDACTED_FLAG;
        }
        out
    }
}

/// Build the command. Total and side-effect-free: every policy decision was
/// already made when `config` was constructed, so this cannot fail and emits
/// no flag for keys the policy omitted.
pub fn assemble(config: &NodeConfig) -> AssembledCommand {
    let mut tokens = Vec::with_capacity(3 + 2 * FLAG_KEYS.len() + config.extra_options().len());
    tokens.push(NODE_PROGRAM.to_string());
    tokens.push(RUN_SUBCOMMAND.to_string());
    tokens.push(config.role().to_string());

    for key in FLAG_KEYS {
        if let Some(value) = config.value(key.env) {
            tokens.push(key.flag.to_string());
            tokens.push(value.to_string());
        }
    }

    tokens.extend(config.extra_options().iter().cloned());

    AssembledCommand { tokens }
}
