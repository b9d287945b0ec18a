//! Configuration schema for lazydep
//!
//! Configuration is stored at `~/.config/lazydep/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name used for the dependency workspace
pub const WORKSPACE_DIR_NAME: &str = ".lazydep-dependencies";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Workspace location and key composition
    pub workspace: WorkspaceConfig,

    /// External package manager settings
    pub installer: InstallerConfig,

    /// Local snapshot store settings
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Workspace policy
///
/// The two supported layouts are a persistent workspace in the home
/// directory keyed with the manifest fingerprint, and a repository-scoped
/// workspace keyed by configuration only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace directory (defaults to `~/.lazydep-dependencies`)
    pub root: Option<PathBuf>,

    /// Append the dependency manifest fingerprint to the cache key
    pub include_manifest_fingerprint: bool,

    /// Dependency manifest to fingerprint (defaults to `lazydep.lock`
    /// next to the executable)
    pub manifest_path: Option<PathBuf>,

    /// Install packages missing from the ledger even on a cache hit
    pub verify_installed: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self::persistent()
    }
}

impl WorkspaceConfig {
    /// Durable workspace in the home directory, keyed with the manifest fingerprint
    pub fn persistent() -> Self {
        Self {
            root: None,
            include_manifest_fingerprint: true,
            manifest_path: None,
            verify_installed: false,
        }
    }

    /// Workspace inside a repository checkout, keyed by configuration only
    pub fn repository(dir: &Path) -> Self {
        Self {
            root: Some(dir.join(WORKSPACE_DIR_NAME)),
            include_manifest_fingerprint: false,
            manifest_path: None,
            verify_installed: false,
        }
    }

    /// Switch to the repository-scoped layout for `dir`, keeping the
    /// manifest and verification settings
    pub fn into_repository(self, dir: &Path) -> Self {
        Self {
            manifest_path: self.manifest_path,
            verify_installed: self.verify_installed,
            ..Self::repository(dir)
        }
    }

    /// Resolve the workspace directory
    pub fn resolved_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(WORKSPACE_DIR_NAME)
        })
    }

    /// Resolve the dependency manifest path, if one can be located
    pub fn resolved_manifest_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.manifest_path {
            return Some(path.clone());
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("lazydep.lock")))
    }
}

/// Installer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Package manager executable, resolved from PATH
    pub program: String,

    /// Extra arguments passed after `install`
    pub args: Vec<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            program: "npm".to_string(),
            args: vec![],
        }
    }
}

/// Snapshot store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store directory (defaults to `<state dir>/lazydep/store`)
    pub root: Option<PathBuf>,
}
