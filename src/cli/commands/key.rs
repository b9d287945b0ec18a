//! Key command - print the cache key for a run configuration

use crate::cache::{derive_key, CacheOptions};
use crate::cli::args::KeyArgs;
use crate::config::{Config, RunConfig};
use crate::error::LazydepResult;

/// Execute the key command
pub async fn execute(args: KeyArgs, config: &Config) -> LazydepResult<()> {
    let options = CacheOptions::from_config(&config.workspace);
    let key = derive_key(&RunConfig::from(&args.run), options.manifest());
    println!("{}", key);
    Ok(())
}
