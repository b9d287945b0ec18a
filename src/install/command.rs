//! Subprocess installer
//!
//! Executes `<program> install [args...] <name>[@<version>]` with the
//! workspace as working directory. The child inherits the caller's
//! environment so registry tokens exported by the surrounding job are
//! visible to it.

use crate::config::schema::InstallerConfig;
use crate::error::{LazydepError, LazydepResult};
use crate::install::Installer;
use crate::package::PackageSpec;
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

/// Lines of installer output kept in failure messages
const FAILURE_TAIL_LINES: usize = 50;

/// Last `FAILURE_TAIL_LINES` lines of stdout followed by stderr
fn failure_tail(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(FAILURE_TAIL_LINES);
    lines[start..].join("\n")
}

/// Installer backed by an external package manager executable
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: String,
    extra_args: Vec<String>,
}

impl CommandInstaller {
    /// Create an installer for `program` (resolved from PATH)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Create an installer from configuration
    pub fn from_config(config: &InstallerConfig) -> Self {
        Self::new(config.program.clone()).with_args(config.args.clone())
    }

    /// Extra arguments placed between `install` and the package
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Full argument list for one package
    pub fn install_args(&self, package: &PackageSpec) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        args.extend(self.extra_args.iter().cloned());
        args.push(package.qualifier());
        args
    }
}

impl Default for CommandInstaller {
    fn default() -> Self {
        Self::new("npm")
    }
}

#[async_trait]
impl Installer for CommandInstaller {
    async fn install(&self, workspace: &Path, package: &PackageSpec) -> LazydepResult<()> {
        let args = self.install_args(package);
        debug!("Executing: {} {:?} in {}", self.program, args, workspace.display());

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                LazydepError::install_failed(
                    package.qualifier(),
                    format!("could not run {}: {}", self.program, e),
                )
            })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(LazydepError::install_failed(
                package.qualifier(),
                format!(
                    "{} exited with {}\n{}",
                    self.program,
                    code,
                    failure_tail(&output)
                ),
            ));
        }

        info!("Installed {}", package);
        Ok(())
    }

    fn installer_name(&self) -> &str {
        &self.program
    }
}
