//! The terminal launch step: runtime search paths, state mount points, and
//! process replacement.
//!
//! Nothing here survives a successful launch: on Unix the launcher's process
//! image is replaced outright, and the node process's exit code becomes the
//! container's.

use anyhow::{Context, Result};
use std::process::Command;

use taoboot_core::config::env_keys::runtime;
use taoboot_core::config::StateDirsConfig;
use taoboot_image::PrefixLayout;

use crate::command::AssembledCommand;

/// Environment handed to the node process so it resolves its module closure
/// and the rebalance script through the prefix's version-independent paths,
/// never through paths baked in at build time.
pub fn runtime_env(layout: &PrefixLayout) -> Vec<(String, String)> {
    vec![
        (
            runtime::PYTHONPATH.to_string(),
            layout.site_packages().to_string_lossy().to_string(),
        ),
        (
            runtime::REBALANCE_SCRIPT_PATH.to_string(),
            layout.rebalance_script().to_string_lossy().to_string(),
        ),
    ]
}

/// Create the wallet and database-config mount points if missing. Their
/// contents are owned by external collaborators; we only guarantee the
/// directories exist before the node process starts.
pub fn ensure_state_dirs(dirs: &StateDirsConfig) -> Result<()> {
    std::fs::create_dir_all(&dirs.wallet_dir)
        .with_context(|| format!("Create wallet dir {}", dirs.wallet_dir.display()))?;
    std::fs::create_dir_all(&dirs.database_conf_dir).with_context(|| {
        format!(
            "Create database conf dir {}",
            dirs.database_conf_dir.display()
        )
    })?;
    Ok(())
}

/// Replace the current process with the node process. Returns only on
/// failure to exec; on success this function (and the launcher) is gone.
pub fn exec_node(command: &AssembledCommand, extra_env: &[(String, String)]) -> Result<()> {
    let mut cmd = Command::new(command.program());
    cmd.args(command.args());
    for (key, value) in extra_env {
        cmd.env(key, value);
    }

    tracing::info!("Launching: {}", command.redacted().join(" "));

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = cmd.exec();
        return Err(anyhow::Error::from(err)
            .context(format!("exec {} failed", command.program())));
    }

    // No exec on this platform: spawn, wait, and pass the exit code through.
    #[cfg(not(unix))]
    {
        let status = cmd
            .status()
            .with_context(|| format!("spawn {}", command.program()))?;
        std::process::exit(status.code().unwrap_or(1));
    }
}
