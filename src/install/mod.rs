//! Installer invocation
//!
//! Runs an external package manager against the workspace to materialize
//! one package. Failures are fatal for the run; nothing here retries.

mod command;

pub use command::CommandInstaller;

use crate::error::LazydepResult;
use crate::package::PackageSpec;
use async_trait::async_trait;
use std::path::Path;

/// Package installer interface
#[async_trait]
pub trait Installer: Send + Sync {
    /// Install `package` into the workspace at `workspace`
    async fn install(&self, workspace: &Path, package: &PackageSpec) -> LazydepResult<()>;

    /// Human-readable installer name for display
    fn installer_name(&self) -> &str;
}
