//! Persistent cache store abstraction
//!
//! A store snapshots whole directory trees under an opaque key and
//! restores them in a later run. The controller only needs `restore` and
//! `save`; `DirectoryStore` keeps snapshots on the local filesystem.

mod directory;

pub use directory::{DirectoryStore, SnapshotInfo};

use crate::cache::CacheKey;
use crate::error::LazydepResult;
use async_trait::async_trait;
use std::path::PathBuf;

/// Snapshot store keyed by cache key
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Restore the snapshot saved under `key` into `paths`
    ///
    /// Returns `Ok(false)` when no snapshot exists. A miss is never an error.
    async fn restore(&self, paths: &[PathBuf], key: &CacheKey) -> LazydepResult<bool>;

    /// Snapshot `paths` under `key`, replacing any existing snapshot
    async fn save(&self, paths: &[PathBuf], key: &CacheKey) -> LazydepResult<()>;

    /// Human-readable store name for display
    fn store_name(&self) -> &'static str;
}

/// Human-readable size in binary units ("512 B", "1.5 KB", "3.0 GB")
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
