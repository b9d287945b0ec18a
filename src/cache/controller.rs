//! Lazy cache controller
//!
//! Ties key derivation, the snapshot store, the installer and the plugin
//! loader together. One instance lives for one run; the key and status are
//! settled by the first `acquire` and never change afterwards.

use crate::cache::key::{derive_key, CacheKey};
use crate::cache::status::CacheStatus;
use crate::config::schema::{Config, WorkspaceConfig};
use crate::config::{ConfigManager, RunConfig};
use crate::error::LazydepResult;
use crate::install::{CommandInstaller, Installer};
use crate::loader::{Capability, NodePackageLoader, PluginLoader};
use crate::package::PackageSpec;
use crate::store::{CacheStore, DirectoryStore};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Key composition and verification options
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// Append the manifest fingerprint to the key
    pub include_manifest_fingerprint: bool,
    /// Manifest to fingerprint
    pub manifest_path: Option<PathBuf>,
    /// Install packages missing from the ledger even on a hit
    pub verify_installed: bool,
}

impl CacheOptions {
    /// Options from the workspace section of the configuration
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            include_manifest_fingerprint: config.include_manifest_fingerprint,
            manifest_path: config.resolved_manifest_path(),
            verify_installed: config.verify_installed,
        }
    }

    /// Manifest to fingerprint, if the key includes one
    pub fn manifest(&self) -> Option<&Path> {
        if self.include_manifest_fingerprint {
            self.manifest_path.as_deref()
        } else {
            None
        }
    }
}

/// Per-run lazy dependency cache
pub struct LazyCache {
    workspace: Workspace,
    options: CacheOptions,
    store: Box<dyn CacheStore>,
    installer: Box<dyn Installer>,
    loader: Box<dyn PluginLoader>,
    status: CacheStatus,
    key: Option<CacheKey>,
    installed_on_hit: bool,
}

impl LazyCache {
    /// Create a controller from its collaborators
    pub fn new(
        workspace: Workspace,
        options: CacheOptions,
        store: Box<dyn CacheStore>,
        installer: Box<dyn Installer>,
        loader: Box<dyn PluginLoader>,
    ) -> Self {
        Self {
            workspace,
            options,
            store,
            installer,
            loader,
            status: CacheStatus::NotChecked,
            key: None,
            installed_on_hit: false,
        }
    }

    /// Create a controller with the local directory store, the configured
    /// package manager and the npm package loader
    pub fn from_config(config: &Config) -> Self {
        let store_root = config
            .store
            .root
            .clone()
            .unwrap_or_else(ConfigManager::store_dir);

        Self::new(
            Workspace::new(config.workspace.resolved_root()),
            CacheOptions::from_config(&config.workspace),
            Box::new(DirectoryStore::new(store_root)),
            Box::new(CommandInstaller::from_config(&config.installer)),
            Box::new(NodePackageLoader::new()),
        )
    }

    /// Current cache status
    pub fn status(&self) -> CacheStatus {
        self.status
    }

    /// Cache key, once derived
    pub fn key(&self) -> Option<&CacheKey> {
        self.key.as_ref()
    }

    /// The dependency workspace
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Whether `finalize` would save a snapshot
    pub fn needs_save(&self) -> bool {
        let changed = self.status == CacheStatus::Miss || self.installed_on_hit;
        changed && self.key.as_ref().is_some_and(|k| !k.is_empty())
    }

    fn snapshot_paths(&self) -> Vec<PathBuf> {
        vec![self.workspace.root().to_path_buf()]
    }

    /// Derive the key and restore or initialize the workspace, once per run
    async fn check(&mut self, config: &RunConfig) -> LazydepResult<()> {
        let key = derive_key(config, self.options.manifest());

        let hit = if key.is_empty() {
            debug!("Empty cache key, skipping restore");
            false
        } else {
            debug!(
                "Restoring {:?} from {} store",
                key.as_str(),
                self.store.store_name()
            );
            self.store.restore(&self.snapshot_paths(), &key).await?
        };

        if !hit {
            self.workspace.init().await?;
        }

        self.status = if hit {
            CacheStatus::Hit
        } else {
            CacheStatus::Miss
        };
        info!("Dependency cache {} for key {:?}", self.status, key.as_str());
        self.key = Some(key);
        Ok(())
    }

    async fn install(&self, package: &PackageSpec) -> LazydepResult<()> {
        info!(
            "Installing {} with {}",
            package,
            self.installer.installer_name()
        );
        self.installer
            .install(self.workspace.root(), package)
            .await?;
        self.workspace.record_install(package).await
    }

    /// Acquire a plugin by name and optional version
    pub async fn acquire(
        &mut self,
        name: &str,
        version: Option<&str>,
        config: &RunConfig,
    ) -> LazydepResult<Capability> {
        self.acquire_package(&PackageSpec::new(name, version), config)
            .await
    }

    /// Acquire a plugin
    ///
    /// On a miss every call runs the installer; on a hit the restored
    /// workspace is trusted unless `verify_installed` is set.
    pub async fn acquire_package(
        &mut self,
        package: &PackageSpec,
        config: &RunConfig,
    ) -> LazydepResult<Capability> {
        if !self.status.is_checked() {
            self.check(config).await?;
        }

        match self.status {
            CacheStatus::Miss => self.install(package).await?,
            CacheStatus::Hit if self.options.verify_installed => {
                if self.workspace.ledger().await?.contains(package) {
                    debug!("{} present in restored workspace", package);
                } else {
                    debug!("{} missing from restored workspace", package);
                    self.install(package).await?;
                    self.installed_on_hit = true;
                }
            }
            _ => debug!("Cache hit, skipping install of {}", package),
        }

        debug!("Loading {} with {} loader", package, self.loader.loader_name());
        self.loader.load(self.workspace.root(), package)
    }

    /// Persist newly installed packages
    ///
    /// Call once after the last `acquire`. No-op on a hit or if nothing was
    /// acquired.
    pub async fn finalize(&self) -> LazydepResult<()> {
        if !self.needs_save() {
            debug!("Nothing to save (cache {})", self.status);
            return Ok(());
        }

        if let Some(ref key) = self.key {
            info!("Saving dependency cache for key {:?}", key.as_str());
            self.store.save(&self.snapshot_paths(), key).await?;
        }
        Ok(())
    }
}
