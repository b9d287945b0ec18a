//! Plugin loading
//!
//! Resolves an installed package inside the workspace into a `Capability`
//! the host can use. The controller only sees the `PluginLoader` trait, so
//! ecosystems with different module resolution plug in here.

mod node;

pub use node::NodePackageLoader;

use crate::error::LazydepResult;
use crate::package::PackageSpec;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A resolved plugin
#[derive(Debug, Clone, Serialize)]
pub struct Capability {
    /// Package name
    pub name: String,
    /// Installed version, if the package declares one
    pub version: Option<String>,
    /// Package directory inside the workspace
    pub dir: PathBuf,
    /// Entry point module
    pub entry: PathBuf,
    /// Workspace loader shim that imports the package by name
    pub shim: PathBuf,
    /// Raw package manifest
    pub manifest: serde_json::Value,
}

/// Loader interface
pub trait PluginLoader: Send + Sync {
    /// Load `package` from the workspace rooted at `root`
    fn load(&self, root: &Path, package: &PackageSpec) -> LazydepResult<Capability>;

    /// Human-readable loader name for display
    fn loader_name(&self) -> &'static str;
}
