//! CLI command implementations

pub mod acquire;
pub mod cache;
pub mod config;
pub mod key;

pub use acquire::execute as acquire;
pub use cache::execute as cache;
pub use config::execute as config;
pub use key::execute as key;

use crate::cli::args::RunConfigArgs;
use crate::config::RunConfig;

impl From<&RunConfigArgs> for RunConfig {
    fn from(args: &RunConfigArgs) -> Self {
        RunConfig::new(args.project.as_deref(), args.hosting.as_deref())
    }
}
