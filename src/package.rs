//! Package requests
//!
//! A package is a name plus an optional version pin. Names may be scoped
//! (`@scope/name`), so the version separator is the last `@` that is not
//! the leading scope marker.

use crate::error::{LazydepError, LazydepResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A requested package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Package name
    pub name: String,
    /// Optional version (exact version, range or tag)
    pub version: Option<String>,
}

impl PackageSpec {
    /// Create a package spec, normalizing an empty version to `None`
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }

    /// Installer argument: `name@version`, or bare `name`
    pub fn qualifier(&self) -> String {
        match self.version {
            Some(ref version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualifier())
    }
}

impl FromStr for PackageSpec {
    type Err = LazydepError;

    fn from_str(s: &str) -> LazydepResult<Self> {
        let s = s.trim();
        let (name, version) = match s.rfind('@') {
            Some(0) | None => (s, None),
            Some(at) => (&s[..at], Some(&s[at + 1..])),
        };

        if name.is_empty() || name == "@" || name.ends_with('/') {
            return Err(LazydepError::InvalidPackageSpec(s.to_string()));
        }
        if version.is_some_and(|v| v.trim().is_empty()) {
            return Err(LazydepError::InvalidPackageSpec(s.to_string()));
        }

        Ok(Self::new(name, version))
    }
}
