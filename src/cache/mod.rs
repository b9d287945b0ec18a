//! Lazy dependency cache
//!
//! Optional plugins are installed into a side workspace on demand and the
//! workspace is snapshotted between runs under a key derived from the run
//! configuration.
//!
//! # Run lifecycle
//!
//! | Status | First `acquire` | Later `acquire` | `finalize` |
//! |--------|-----------------|-----------------|------------|
//! | NotChecked | derive key, restore | - | no-op |
//! | Hit | load only | load only | no-op |
//! | Miss | init workspace, install, load | install, load | save |

pub mod controller;
pub mod key;
pub mod status;

pub use controller::{CacheOptions, LazyCache};
pub use key::{derive_key, CacheKey};
pub use status::CacheStatus;
