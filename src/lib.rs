//! lazydep - Lazy plugin dependency cache
//!
//! Installs optional plugins on demand into an isolated workspace and
//! carries that workspace between short-lived runs through a snapshot
//! store keyed by the run configuration.
//!
//! ```rust,ignore
//! use lazydep::cache::LazyCache;
//! use lazydep::config::{Config, RunConfig};
//!
//! let mut cache = LazyCache::from_config(&Config::default());
//! let run = RunConfig::new(Some("npm"), Some("github"));
//!
//! let plugin = cache.acquire("@simple-release/npm", Some("2.0.0"), &run).await?;
//! // ... use plugin.entry ...
//! cache.finalize().await?;
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod loader;
pub mod package;
pub mod store;
pub mod ui;
pub mod workspace;

pub use cache::{CacheKey, CacheStatus, LazyCache};
pub use error::{LazydepError, LazydepResult};
pub use loader::Capability;
pub use package::PackageSpec;
