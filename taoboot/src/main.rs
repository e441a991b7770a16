mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

use taoboot_core::config::StateDirsConfig;
use taoboot_core::observability;
use taoboot_image::{Assembler, PrefixLayout};
use taoboot_launch::{command, exec, NodeConfig};

fn main() -> Result<()> {
    taoboot_core::config::load_dotenv();
    observability::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Assemble {
            source,
            prefix,
            verify,
        } => {
            let assembler = Assembler::new(Path::new(&source), Path::new(&prefix))?;
            assembler.assemble()?;
            if verify {
                assembler.layout().verify()?;
            }
            tracing::info!("Runtime prefix ready at {}", prefix);
        }

        Commands::Launch { prefix } => {
            let node = NodeConfig::from_env()?;
            let cmd = command::assemble(&node);
            let layout = PrefixLayout::new(&prefix);

            exec::ensure_state_dirs(&StateDirsConfig::from_env())?;
            observability::audit_command_assembled(node.role(), &cmd.redacted());

            // Replaces the process image; reaching past this line means the
            // exec itself failed.
            exec::exec_node(&cmd, &exec::runtime_env(&layout))?;
        }

        Commands::PrintCommand { redact } => {
            let node = NodeConfig::from_env()?;
            let cmd = command::assemble(&node);
            let tokens = if redact {
                cmd.redacted()
            } else {
                cmd.tokens().to_vec()
            };
            for token in tokens {
                println!("{}", token);
            }
        }

        Commands::Verify { prefix } => {
            let layout = PrefixLayout::new(&prefix);
            layout.verify()?;
            println!("{}: prefix is self-contained", prefix);
        }
    }

    Ok(())
}
