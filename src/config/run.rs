//! Per-run configuration handed to the cache controller
//!
//! Only the query of each descriptor matters here: it becomes a cache key
//! fragment. Descriptor options are carried along untouched.

use serde::{Deserialize, Serialize};

/// A `project` or `hosting` descriptor
///
/// Accepts either a bare query (`"npm"`) or a query with options
/// (`["npm", { "access": "public" }]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryDescriptor {
    /// Bare query string
    Query(String),
    /// Query with an options object
    WithOptions(String, serde_json::Value),
}

impl QueryDescriptor {
    /// Query fingerprint used as a cache key fragment
    pub fn query(&self) -> &str {
        match self {
            Self::Query(q) | Self::WithOptions(q, _) => q.trim(),
        }
    }
}

impl From<&str> for QueryDescriptor {
    fn from(query: &str) -> Self {
        Self::Query(query.to_string())
    }
}

/// Configuration snapshot for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Project kind descriptor
    pub project: Option<QueryDescriptor>,

    /// Hosting/platform descriptor
    pub hosting: Option<QueryDescriptor>,
}

impl RunConfig {
    /// Build a run config from bare queries
    pub fn new(project: Option<&str>, hosting: Option<&str>) -> Self {
        Self {
            project: project.map(QueryDescriptor::from),
            hosting: hosting.map(QueryDescriptor::from),
        }
    }

    /// Project query fingerprint, empty when absent
    pub fn project_query(&self) -> &str {
        self.project.as_ref().map_or("", QueryDescriptor::query)
    }

    /// Hosting query fingerprint, empty when absent
    pub fn hosting_query(&self) -> &str {
        self.hosting.as_ref().map_or("", QueryDescriptor::query)
    }
}
