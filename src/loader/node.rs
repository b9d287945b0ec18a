//! npm-style package resolution
//!
//! Packages live under `<root>/node_modules/<name>`; scoped names map to
//! nested directories. The workspace shim must be present, since that is
//! what a JavaScript host imports through.

use crate::error::{LazydepError, LazydepResult};
use crate::loader::{Capability, PluginLoader};
use crate::package::PackageSpec;
use crate::workspace::SHIM_FILE;
use semver::{Version, VersionReq};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const MODULES_DIR: &str = "node_modules";
const DEFAULT_ENTRY: &str = "index.js";

/// Loader for packages installed by npm-compatible package managers
#[derive(Debug, Clone, Copy, Default)]
pub struct NodePackageLoader;

impl NodePackageLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self
    }

    /// Directory a package is installed into
    pub fn package_dir(root: &Path, name: &str) -> PathBuf {
        name.split('/')
            .fold(root.join(MODULES_DIR), |dir, part| dir.join(part))
    }
}

/// Pick the entry point from a package manifest
fn entry_point(manifest: &serde_json::Value) -> &str {
    ["module", "main", "exports"]
        .iter()
        .find_map(|field| manifest.get(*field).and_then(|v| v.as_str()))
        .unwrap_or(DEFAULT_ENTRY)
}

/// A version request as npm reads it
#[derive(Debug)]
enum Requirement {
    /// `2.0.0`, `=2.0.0` or `v2.0.0`: exactly that release
    Exact(Version),
    /// Anything else semver can parse (`^2`, `~1.2`, `>=1 <3`)
    Range(VersionReq),
}

impl Requirement {
    /// `None` for requests that are not semver (dist-tags, git refs)
    fn parse(requested: &str) -> Option<Self> {
        let pinned = requested
            .trim()
            .trim_start_matches('=')
            .trim_start_matches('v');
        if let Ok(version) = Version::parse(pinned) {
            return Some(Self::Exact(version));
        }
        VersionReq::parse(requested).ok().map(Self::Range)
    }

    fn matches(&self, installed: &Version) -> bool {
        match self {
            // Build metadata does not take part in precedence
            Self::Exact(pin) => {
                pin.major == installed.major
                    && pin.minor == installed.minor
                    && pin.patch == installed.patch
                    && pin.pre == installed.pre
            }
            Self::Range(req) => req.matches(installed),
        }
    }
}

/// Check an installed version against the requested one
fn check_version(package: &PackageSpec, installed: Option<&str>) -> LazydepResult<()> {
    let Some(ref requested) = package.version else {
        return Ok(());
    };
    let Some(requirement) = Requirement::parse(requested) else {
        debug!("Not checking non-semver request {}", requested);
        return Ok(());
    };

    let installed = installed.ok_or_else(|| {
        LazydepError::load_failed(&package.name, "installed package declares no version")
    })?;
    let version = Version::parse(installed).map_err(|e| {
        LazydepError::load_failed(
            &package.name,
            format!("invalid installed version {}: {}", installed, e),
        )
    })?;

    if !requirement.matches(&version) {
        return Err(LazydepError::load_failed(
            &package.name,
            format!("installed version {} does not satisfy {}", version, requested),
        ));
    }
    Ok(())
}

impl PluginLoader for NodePackageLoader {
    fn load(&self, root: &Path, package: &PackageSpec) -> LazydepResult<Capability> {
        let shim = root.join(SHIM_FILE);
        if !shim.is_file() {
            return Err(LazydepError::load_failed(
                &package.name,
                format!("workspace {} has no loader shim", root.display()),
            ));
        }

        let dir = Self::package_dir(root, &package.name);
        let manifest_path = dir.join("package.json");
        let content = fs::read_to_string(&manifest_path).map_err(|e| {
            LazydepError::load_failed(
                &package.name,
                format!("not installed in {} ({})", root.display(), e),
            )
        })?;
        let manifest: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            LazydepError::load_failed(
                &package.name,
                format!("unreadable {}: {}", manifest_path.display(), e),
            )
        })?;

        let version = manifest
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        check_version(package, version.as_deref())?;

        let entry = dir.join(entry_point(&manifest));
        debug!("Loaded {} from {}", package.name, entry.display());

        Ok(Capability {
            name: package.name.clone(),
            version,
            dir,
            entry,
            shim,
            manifest,
        })
    }

    fn loader_name(&self) -> &'static str {
        "node"
    }
}
