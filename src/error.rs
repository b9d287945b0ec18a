//! Error types for lazydep
//!
//! All modules use `LazydepResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lazydep operations
pub type LazydepResult<T> = Result<T, LazydepError>;

/// All errors that can occur in lazydep
#[derive(Error, Debug)]
pub enum LazydepError {
    // Cache key errors
    #[error("Failed to read dependency manifest {path}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Store errors
    #[error("Cache store unavailable: {context}")]
    StoreUnavailable {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache snapshot at {path}: {reason}")]
    SnapshotCorrupt { path: PathBuf, reason: String },

    #[error("Cache snapshot not found: {0}")]
    SnapshotNotFound(String),

    // Installer errors
    #[error("Failed to install {package}: {reason}")]
    InstallationFailure { package: String, reason: String },

    #[error("Invalid package spec: {0}")]
    InvalidPackageSpec(String),

    // Loader errors
    #[error("Failed to load plugin {name}: {reason}")]
    ModuleLoadFailure { name: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl LazydepError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store error with context
    pub fn store(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::StoreUnavailable {
            context: context.into(),
            source,
        }
    }

    /// Create an installation failure for a package qualifier
    pub fn install_failed(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstallationFailure {
            package: package.into(),
            reason: reason.into(),
        }
    }

    /// Create a module load failure
    pub fn load_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModuleLoadFailure {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// lazydep itself never retries; this is for callers that do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallationFailure { .. } => {
                Some("Check that the installer is on PATH and registry credentials are exported")
            }
            Self::ModuleLoadFailure { .. } => {
                Some("The cached workspace may be stale. Run: lazydep cache remove <key>")
            }
            Self::SnapshotCorrupt { .. } => Some("Run: lazydep cache remove <key>"),
            Self::ConfigInvalid { .. } => Some("Run: lazydep config init --force"),
            _ => None,
        }
    }
}
