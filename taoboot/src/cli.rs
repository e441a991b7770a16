use clap::{Parser, Subcommand};
use taoboot_core::config::env_keys::paths::TAOBOOT_PREFIX;
use taoboot_core::config::schema::DEFAULT_PREFIX;

/// Taoboot - image and launch a filetao storage node
#[derive(Parser, Debug)]
#[command(name = "taoboot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a self-contained runtime prefix from a source checkout
    Assemble {
        /// Path to the application source tree (must contain requirements.txt)
        #[arg(value_name = "SOURCE_DIR")]
        source: String,

        /// Installation prefix to produce
        #[arg(long, value_name = "DIR", env = TAOBOOT_PREFIX, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Run the structural self-containment check after assembly
        #[arg(long, default_value = "false")]
        verify: bool,
    },

    /// Read the environment, assemble the node command, and replace this
    /// process with it
    Launch {
        /// Installation prefix to launch from
        #[arg(long, value_name = "DIR", env = TAOBOOT_PREFIX, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },

    /// Print the command `launch` would exec, one token per line, without
    /// launching anything
    PrintCommand {
        /// Mask the database credential in the output
        #[arg(long, default_value = "false")]
        redact: bool,
    },

    /// Check that an assembled prefix is self-contained
    Verify {
        /// Installation prefix to check
        #[arg(long, value_name = "DIR", env = TAOBOOT_PREFIX, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },
}
