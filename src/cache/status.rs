//! Per-run cache status

use serde::Serialize;
use std::fmt;

/// Outcome of the first lookup in a run
///
/// Moves from `NotChecked` to `Hit` or `Miss` exactly once and never
/// changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// No lookup yet
    #[default]
    NotChecked,
    /// A snapshot was restored for the current key
    Hit,
    /// No snapshot existed, the workspace was freshly initialized
    Miss,
}

impl CacheStatus {
    /// Whether the first lookup has happened
    pub fn is_checked(&self) -> bool {
        !matches!(self, Self::NotChecked)
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotChecked => write!(f, "not checked"),
            Self::Hit => write!(f, "hit"),
            Self::Miss => write!(f, "miss"),
        }
    }
}
