//! Cache key derivation
//!
//! A key is the project query, the hosting query and (optionally) a short
//! fingerprint of the dependency manifest, joined with `+`. Empty fragments
//! are dropped. Same inputs = same key.

use crate::config::RunConfig;
use crate::error::{LazydepError, LazydepResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Separator between key fragments
pub const KEY_SEPARATOR: char = '+';

/// Hex characters kept from the manifest hash
pub const MANIFEST_HASH_LEN: usize = 8;

/// Opaque cache partition key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Join fragments in order, skipping empty ones
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = String::new();
        for fragment in fragments {
            let fragment = fragment.as_ref();
            if fragment.is_empty() {
                continue;
            }
            if !key.is_empty() {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(fragment);
        }
        Self(key)
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether every fragment was empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash raw bytes with SHA256, returning the first `MANIFEST_HASH_LEN` hex chars
pub fn fingerprint_bytes(contents: &[u8]) -> String {
    let digest = Sha256::digest(contents);
    let mut hash = hex::encode(digest);
    hash.truncate(MANIFEST_HASH_LEN);
    hash
}

fn read_manifest(path: &Path) -> LazydepResult<Vec<u8>> {
    fs::read(path).map_err(|e| LazydepError::ManifestUnreadable {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Fingerprint the dependency manifest, or "" if it cannot be read
pub fn manifest_fingerprint(path: &Path) -> String {
    match read_manifest(path) {
        Ok(contents) => fingerprint_bytes(&contents),
        Err(e) => {
            debug!("Omitting manifest fragment: {}", e);
            String::new()
        }
    }
}

/// Derive the cache key for a run
///
/// `manifest` is `None` when the key should not include the manifest
/// fingerprint at all.
pub fn derive_key(config: &RunConfig, manifest: Option<&Path>) -> CacheKey {
    let manifest_hash = manifest.map(manifest_fingerprint).unwrap_or_default();

    let key = CacheKey::from_fragments([
        config.project_query(),
        config.hosting_query(),
        manifest_hash.as_str(),
    ]);
    debug!("Derived cache key: {}", key);
    key
}
