//! Isolated install workspace
//!
//! A directory, separate from the host program's own dependencies, that the
//! installer populates. It is a loadable module root: a minimal
//! `package.json` plus an `index.js` shim that imports packages by name
//! from inside the root.

use crate::error::{LazydepError, LazydepResult};
use crate::package::PackageSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Module root manifest file name
pub const MANIFEST_FILE: &str = "package.json";

/// Loader shim file name
pub const SHIM_FILE: &str = "index.js";

/// Installed package ledger file name
pub const LEDGER_FILE: &str = ".lazydep-installed.json";

const MANIFEST_CONTENTS: &str = r#"{"type":"module"}"#;
const SHIM_CONTENTS: &str = "export const importDependency = _ => import(_)";

/// One ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Package name
    pub name: String,
    /// Requested version, if pinned
    pub version: Option<String>,
    /// When the installer ran
    pub installed_at: DateTime<Utc>,
}

/// Record of packages installed into a workspace
///
/// Saved inside the workspace so it travels with the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstalledLedger {
    pub packages: Vec<LedgerEntry>,
}

impl InstalledLedger {
    /// Whether the exact `(name, version)` pair was installed
    pub fn contains(&self, package: &PackageSpec) -> bool {
        self.packages
            .iter()
            .any(|e| e.name == package.name && e.version == package.version)
    }

    /// Record an install, replacing any previous entry for the same name
    pub fn record(&mut self, package: &PackageSpec) {
        self.packages.retain(|e| e.name != package.name);
        self.packages.push(LedgerEntry {
            name: package.name.clone(),
            version: package.version.clone(),
            installed_at: Utc::now(),
        });
    }
}

/// The dependency workspace directory
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a handle for a workspace directory (nothing is touched on disk)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the loader shim
    pub fn shim_path(&self) -> PathBuf {
        self.root.join(SHIM_FILE)
    }

    /// Path to the ledger
    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    /// Create the directory and write the module manifest and loader shim
    pub async fn init(&self) -> LazydepResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            LazydepError::io(format!("creating workspace {}", self.root.display()), e)
        })?;

        let manifest = self.root.join(MANIFEST_FILE);
        fs::write(&manifest, MANIFEST_CONTENTS)
            .await
            .map_err(|e| LazydepError::io(format!("writing {}", manifest.display()), e))?;

        let shim = self.shim_path();
        fs::write(&shim, SHIM_CONTENTS)
            .await
            .map_err(|e| LazydepError::io(format!("writing {}", shim.display()), e))?;

        info!("Initialized workspace at {}", self.root.display());
        Ok(())
    }

    /// Read the ledger; a missing ledger is empty
    pub async fn ledger(&self) -> LazydepResult<InstalledLedger> {
        let path = self.ledger_path();
        if !path.exists() {
            return Ok(InstalledLedger::default());
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| LazydepError::io(format!("reading {}", path.display()), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Add a package to the ledger
    pub async fn record_install(&self, package: &PackageSpec) -> LazydepResult<()> {
        let mut ledger = self.ledger().await?;
        ledger.record(package);

        let path = self.ledger_path();
        let content = serde_json::to_string_pretty(&ledger)?;
        fs::write(&path, content)
            .await
            .map_err(|e| LazydepError::io(format!("writing {}", path.display()), e))?;

        debug!("Recorded {} in workspace ledger", package);
        Ok(())
    }
}
