//! Dependency manifest parsing and the closure cache key.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Conventional manifest filename inside the source tree.
pub const MANIFEST_FILENAME: &str = "requirements.txt";

/// Dev-only manifest. Accepted as an input but never installed into the
/// runtime prefix.
pub const DEV_MANIFEST_FILENAME: &str = "requirements-dev.txt";

/// The declarative list of runtime packages, resolved once at build time.
#[derive(Debug, Clone)]
pub struct DependencyManifest {
    path: PathBuf,
    requirements: Vec<String>,
}

impl DependencyManifest {
    /// Read and parse a pip-format manifest. Blank lines and `#` comments are
    /// ignored; requirement lines are kept verbatim (version constraints are
    /// pip's to resolve, not ours).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Read manifest {}", path.display()))?;
        Ok(Self::parse(path, &content))
    }

    fn parse(path: &Path, content: &str) -> Self {
        let requirements = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect();
        Self {
            path: path.to_path_buf(),
            requirements,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Cache key for the dependency closure. Depends on the requirement lines
    /// only, not on the application source, so code changes never force
    /// re-resolution. Comment or whitespace edits don't change it either.
    pub fn closure_key(&self) -> String {
        let mut hasher = Sha256::new();
        for req in &self.requirements {
            hasher.update(req.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
