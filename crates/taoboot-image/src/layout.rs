//! Prefix layout: the fixed, version-independent paths inside an installation
//! prefix, and the structural self-containment check behind `taoboot verify`.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Launcher executable pip installs into `<prefix>/bin`.
pub const NODE_LAUNCHER: &str = "filetao";

/// Operational script the node process invokes when it detects its own
/// deregistration from the network.
pub const REBALANCE_SCRIPT: &str = "rebalance_deregistration.sh";

/// Stable alias for the version-qualified interpreter library directory.
pub const PYTHON_ALIAS: &str = "python";

/// Marker file recording the closure key of the installed dependency set.
const CLOSURE_MARKER: &str = ".closure";

/// Well-known paths inside an installation prefix.
///
/// Everything here is relative to the prefix root, so a prefix copied into a
/// fresh base filesystem resolves identically.
#[derive(Debug, Clone)]
pub struct PrefixLayout {
    root: PathBuf,
}

impl PrefixLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    /// `<prefix>/lib/python`, the version-independent alias.
    pub fn python_alias_dir(&self) -> PathBuf {
        self.lib_dir().join(PYTHON_ALIAS)
    }

    /// `<prefix>/lib/python/site-packages`, the search path handed to the
    /// node process. Never version-qualified.
    pub fn site_packages(&self) -> PathBuf {
        self.python_alias_dir().join("site-packages")
    }

    pub fn node_launcher(&self) -> PathBuf {
        self.bin_dir().join(NODE_LAUNCHER)
    }

    pub fn rebalance_script(&self) -> PathBuf {
        self.bin_dir().join(REBALANCE_SCRIPT)
    }

    pub fn closure_marker(&self) -> PathBuf {
        self.root.join(CLOSURE_MARKER)
    }

    /// Find the version-qualified interpreter library directory, e.g.
    /// `lib/python3.11`. `None` when no closure has been installed yet.
    pub fn versioned_python_dir(&self) -> Result<Option<PathBuf>> {
        let lib = self.lib_dir();
        if !lib.is_dir() {
            return Ok(None);
        }
        let mut candidates: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(&lib)
            .with_context(|| format!("Read lib dir {}", lib.display()))?
        {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            // Match python3.X exactly; the bare "python" entry is our alias.
            if name.starts_with("python3.") && entry.file_type()?.is_dir() {
                candidates.push(entry.path());
            }
        }
        candidates.sort();
        Ok(candidates.pop())
    }

    /// Structural self-containment check: the aliased site-packages resolves,
    /// the launcher and the rebalance script are in place, and the alias does
    /// not point outside the prefix.
    pub fn verify(&self) -> Result<()> {
        let alias = self.python_alias_dir();
        if !alias.exists() {
            bail!("Missing library alias {}", alias.display());
        }
        let meta = std::fs::symlink_metadata(&alias)?;
        if meta.file_type().is_symlink() {
            let target = std::fs::read_link(&alias)?;
            if target.is_absolute() {
                bail!(
                    "Library alias {} points at absolute path {}; prefix is not relocatable",
                    alias.display(),
                    target.display()
                );
            }
        }
        if !self.site_packages().is_dir() {
            bail!("Missing site-packages at {}", self.site_packages().display());
        }
        if !self.node_launcher().is_file() {
            bail!("Missing node launcher {}", self.node_launcher().display());
        }
        if !self.rebalance_script().is_file() {
            bail!(
                "Missing rebalance script {}",
                self.rebalance_script().display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_paths_are_version_independent() {
        let layout = PrefixLayout::new("/opt/filetao");
        assert_eq!(
            layout.site_packages(),
            PathBuf::from("/opt/filetao/lib/python/site-packages")
        );
        assert_eq!(
            layout.rebalance_script(),
            PathBuf::from("/opt/filetao/bin/rebalance_deregistration.sh")
        );
    }

    #[test]
    fn test_versioned_python_dir_detection() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PrefixLayout::new(dir.path());
        assert!(layout.versioned_python_dir().unwrap().is_none());

        fs::create_dir_all(dir.path().join("lib/python3.11/site-packages")).unwrap();
        let found = layout.versioned_python_dir().unwrap().unwrap();
        assert!(found.ends_with("python3.11"));
    }

    #[test]
    fn test_versioned_python_dir_ignores_alias_entry() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PrefixLayout::new(dir.path());
        fs::create_dir_all(dir.path().join("lib/python3.10")).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink("python3.10", dir.path().join("lib/python")).unwrap();
        let found = layout.versioned_python_dir().unwrap().unwrap();
        assert!(found.ends_with("python3.10"));
    }

    #[test]
    fn test_verify_empty_prefix_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PrefixLayout::new(dir.path());
        assert!(layout.verify().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_rejects_absolute_alias() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PrefixLayout::new(dir.path());
        let versioned = dir.path().join("lib/python3.11/site-packages");
        fs::create_dir_all(&versioned).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("lib/python3.11"),
            dir.path().join("lib/python"),
        )
        .unwrap();
        fs::create_dir_all(layout.bin_dir()).unwrap();
        fs::write(layout.node_launcher(), "#!/bin/sh\n").unwrap();
        fs::write(layout.rebalance_script(), "#!/bin/sh\n").unwrap();
        let err = layout.verify().unwrap_err();
        assert!(err.to_string().contains("not relocatable"));
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_complete_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PrefixLayout::new(dir.path());
        fs::create_dir_all(dir.path().join("lib/python3.11/site-packages")).unwrap();
        std::os::unix::fs::symlink("python3.11", dir.path().join("lib/python")).unwrap();
        fs::create_dir_all(layout.bin_dir()).unwrap();
        fs::write(layout.node_launcher(), "#!/bin/sh\n").unwrap();
        fs::write(layout.rebalance_script(), "#!/bin/sh\n").unwrap();
        layout.verify().unwrap();
    }
}
