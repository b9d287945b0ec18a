//! Local filesystem snapshot store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<sha256(key)>/snapshot.json   key, original paths, created_at
//! <root>/<sha256(key)>/0/...           copy of paths[0]
//! <root>/<sha256(key)>/1/...           copy of paths[1]
//! ```
//!
//! Saves are staged in `<root>/.staging-<uuid>` and renamed into place, so a
//! crashed save never leaves a partial snapshot under a real key.

use crate::cache::CacheKey;
use crate::error::{LazydepError, LazydepResult};
use crate::store::CacheStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

const META_FILE: &str = "snapshot.json";
const STAGING_PREFIX: &str = ".staging-";

/// Metadata written next to each snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotMeta {
    key: String,
    paths: Vec<PathBuf>,
    created_at: DateTime<Utc>,
}

/// Summary of a stored snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    /// Cache key the snapshot was saved under
    pub key: String,
    /// Directories captured by the snapshot
    pub paths: Vec<PathBuf>,
    /// When the snapshot was saved
    pub created_at: DateTime<Utc>,
    /// Total size of the stored files
    pub size_bytes: u64,
}

/// Snapshot store backed by a local directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root` (created lazily on first save)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_dir(&self, key: &str) -> PathBuf {
        self.root.join(hex::encode(Sha256::digest(key.as_bytes())))
    }

    /// List all snapshots, newest first
    pub async fn list(&self) -> LazydepResult<Vec<SnapshotInfo>> {
        let root = self.root.clone();
        blocking(move || list_snapshots(&root)).await
    }

    /// Remove the snapshot stored under `key`
    pub async fn remove(&self, key: &str) -> LazydepResult<()> {
        let dir = self.snapshot_dir(key);
        if !dir.exists() {
            return Err(LazydepError::SnapshotNotFound(key.to_string()));
        }

        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| LazydepError::store(format!("removing {}", dir.display()), e))?;
        info!("Removed snapshot {}", key);
        Ok(())
    }

    /// Remove every snapshot, returning how many were removed
    pub async fn clear(&self) -> LazydepResult<usize> {
        let snapshots = self.list().await?;
        for snapshot in &snapshots {
            self.remove(&snapshot.key).await?;
        }
        Ok(snapshots.len())
    }
}

#[async_trait]
impl CacheStore for DirectoryStore {
    async fn restore(&self, paths: &[PathBuf], key: &CacheKey) -> LazydepResult<bool> {
        let dir = self.snapshot_dir(key.as_str());
        let paths = paths.to_vec();
        blocking(move || restore_snapshot(&dir, &paths)).await
    }

    async fn save(&self, paths: &[PathBuf], key: &CacheKey) -> LazydepResult<()> {
        let root = self.root.clone();
        let dir = self.snapshot_dir(key.as_str());
        let key = key.as_str().to_string();
        let paths = paths.to_vec();
        blocking(move || save_snapshot(&root, &dir, &key, &paths)).await
    }

    fn store_name(&self) -> &'static str {
        "directory"
    }
}

/// Run blocking filesystem work off the async runtime
async fn blocking<T, F>(f: F) -> LazydepResult<T>
where
    F: FnOnce() -> LazydepResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LazydepError::store("joining filesystem task", io::Error::other(e)))?
}

fn read_meta(dir: &Path) -> LazydepResult<SnapshotMeta> {
    let path = dir.join(META_FILE);
    let content = fs::read_to_string(&path)
        .map_err(|e| LazydepError::store(format!("reading {}", path.display()), e))?;
    serde_json::from_str(&content).map_err(|e| LazydepError::SnapshotCorrupt {
        path,
        reason: e.to_string(),
    })
}

fn restore_snapshot(dir: &Path, paths: &[PathBuf]) -> LazydepResult<bool> {
    if !dir.is_dir() {
        debug!("No snapshot at {}", dir.display());
        return Ok(false);
    }

    let meta = read_meta(dir)?;
    if meta.paths != paths {
        debug!(
            "Snapshot {} was saved for different paths, treating as miss",
            meta.key
        );
        return Ok(false);
    }

    for (index, target) in paths.iter().enumerate() {
        let source = dir.join(index.to_string());
        if !source.is_dir() {
            return Err(LazydepError::SnapshotCorrupt {
                path: source,
                reason: "missing path entry".to_string(),
            });
        }

        clear_target(target)?;
        copy_tree(&source, target)?;
    }

    info!("Restored snapshot {}", meta.key);
    Ok(true)
}

/// Remove whatever occupies `target`: a directory tree, a file or a symlink
fn clear_target(target: &Path) -> LazydepResult<()> {
    let metadata = match fs::symlink_metadata(target) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(LazydepError::store(format!("inspecting {}", target.display()), e))
        }
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };
    removed.map_err(|e| LazydepError::store(format!("clearing {}", target.display()), e))
}

fn save_snapshot(root: &Path, dir: &Path, key: &str, paths: &[PathBuf]) -> LazydepResult<()> {
    let staging = root.join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4()));
    fs::create_dir_all(&staging)
        .map_err(|e| LazydepError::store(format!("creating {}", staging.display()), e))?;

    let result = stage_snapshot(&staging, key, paths).and_then(|()| {
        if dir.exists() {
            debug!("Replacing existing snapshot for {}", key);
            fs::remove_dir_all(dir)
                .map_err(|e| LazydepError::store(format!("removing {}", dir.display()), e))?;
        }
        fs::rename(&staging, dir)
            .map_err(|e| LazydepError::store(format!("publishing {}", dir.display()), e))
    });

    if result.is_err() && staging.exists() {
        if let Err(e) = fs::remove_dir_all(&staging) {
            warn!("Failed to clean up {}: {}", staging.display(), e);
        }
    }
    result?;

    info!("Saved snapshot {}", key);
    Ok(())
}

fn stage_snapshot(staging: &Path, key: &str, paths: &[PathBuf]) -> LazydepResult<()> {
    for (index, source) in paths.iter().enumerate() {
        copy_tree(source, &staging.join(index.to_string()))?;
    }

    let meta = SnapshotMeta {
        key: key.to_string(),
        paths: paths.to_vec(),
        created_at: Utc::now(),
    };
    let meta_path = staging.join(META_FILE);
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
        .map_err(|e| LazydepError::store(format!("writing {}", meta_path.display()), e))
}

/// Recursively copy `source` into `target`, preserving symlinks on unix
fn copy_tree(source: &Path, target: &Path) -> LazydepResult<()> {
    fs::create_dir_all(target)
        .map_err(|e| LazydepError::store(format!("creating {}", target.display()), e))?;

    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            LazydepError::store(format!("walking {}", source.display()), io::Error::other(e))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| LazydepError::store("resolving snapshot entry", io::Error::other(e)))?;
        let dest = target.join(relative);
        let file_type = entry.file_type();

        let copied = if file_type.is_dir() {
            fs::create_dir_all(&dest)
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest)
        } else {
            fs::copy(entry.path(), &dest).map(|_| ())
        };
        copied.map_err(|e| LazydepError::store(format!("copying {}", entry.path().display()), e))?;
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    std::os::unix::fs::symlink(link, dest)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest).map(|_| ())
}

fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn list_snapshots(root: &Path) -> LazydepResult<Vec<SnapshotInfo>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(root)
        .map_err(|e| LazydepError::store(format!("reading {}", root.display()), e))?;

    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LazydepError::store("reading store entry", e))?;
        let path = entry.path();
        let is_staging = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(STAGING_PREFIX));
        if !path.is_dir() || is_staging {
            continue;
        }

        match read_meta(&path) {
            Ok(meta) => snapshots.push(SnapshotInfo {
                key: meta.key,
                paths: meta.paths,
                created_at: meta.created_at,
                size_bytes: dir_size(&path),
            }),
            Err(e) => warn!("Skipping unreadable snapshot {}: {}", path.display(), e),
        }
    }

    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(s: &str) -> CacheKey {
        CacheKey::from_fragments([s])
    }

    fn populate(dir: &Path) {
        fs::create_dir_all(dir.join("node_modules/pluginA")).unwrap();
        fs::write(dir.join("package.json"), r#"{"type":"module"}"#).unwrap();
        fs::write(
            dir.join("node_modules/pluginA/package.json"),
            r#"{"name":"pluginA","version":"2.0.0"}"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn restore_unknown_key_is_miss() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");

        let hit = store.restore(&[target.clone()], &key("lib+hostA")).await.unwrap();

        assert!(!hit);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn save_then_restore_reproduces_tree() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");
        populate(&target);

        store.save(&[target.clone()], &key("lib+hostA")).await.unwrap();
        fs::remove_dir_all(&target).unwrap();

        let hit = store.restore(&[target.clone()], &key("lib+hostA")).await.unwrap();

        assert!(hit);
        let manifest =
            fs::read_to_string(target.join("node_modules/pluginA/package.json")).unwrap();
        assert!(manifest.contains("2.0.0"));
    }

    #[tokio::test]
    async fn restore_replaces_stale_contents() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");
        populate(&target);
        store.save(&[target.clone()], &key("k")).await.unwrap();

        fs::write(target.join("stale.txt"), "old").unwrap();
        assert!(store.restore(&[target.clone()], &key("k")).await.unwrap());

        assert!(!target.join("stale.txt").exists());
        assert!(target.join("package.json").exists());
    }

    #[tokio::test]
    async fn restore_replaces_file_at_target() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");
        populate(&target);
        store.save(&[target.clone()], &key("k")).await.unwrap();

        fs::remove_dir_all(&target).unwrap();
        fs::write(&target, "not a directory").unwrap();

        assert!(store.restore(&[target.clone()], &key("k")).await.unwrap());
        assert!(target.is_dir());
        assert!(target.join("package.json").exists());
    }

    #[tokio::test]
    async fn restore_with_different_paths_is_miss() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");
        populate(&target);
        store.save(&[target.clone()], &key("k")).await.unwrap();

        let other = temp.path().join("elsewhere");
        assert!(!store.restore(&[other], &key("k")).await.unwrap());
    }

    #[tokio::test]
    async fn save_overwrites_existing_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");
        populate(&target);
        store.save(&[target.clone()], &key("k")).await.unwrap();

        fs::write(target.join("extra.txt"), "new").unwrap();
        store.save(&[target.clone()], &key("k")).await.unwrap();
        fs::remove_dir_all(&target).unwrap();

        assert!(store.restore(&[target.clone()], &key("k")).await.unwrap());
        assert!(target.join("extra.txt").exists());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_remove_and_clear() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");
        populate(&target);

        assert!(store.list().await.unwrap().is_empty());

        store.save(&[target.clone()], &key("a")).await.unwrap();
        store.save(&[target.clone()], &key("b")).await.unwrap();

        let snapshots = store.list().await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots.iter().all(|s| s.size_bytes > 0));

        store.remove("a").await.unwrap();
        assert!(matches!(
            store.remove("a").await,
            Err(LazydepError::SnapshotNotFound(_))
        ));

        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_survive_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("store"));
        let target = temp.path().join("deps");
        populate(&target);
        fs::create_dir_all(target.join("node_modules/.bin")).unwrap();
        std::os::unix::fs::symlink(
            "../pluginA/package.json",
            target.join("node_modules/.bin/pluginA"),
        )
        .unwrap();

        store.save(&[target.clone()], &key("k")).await.unwrap();
        fs::remove_dir_all(&target).unwrap();
        store.restore(&[target.clone()], &key("k")).await.unwrap();

        let link = target.join("node_modules/.bin/pluginA");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_link(&link).unwrap(),
            PathBuf::from("../pluginA/package.json")
        );
    }
}
