//! Acquire command - one run of the lazy dependency cache
//!
//! Acquires every requested package in order, then finalizes. Save
//! failures are reported as warnings unless `--strict-save` is given: the
//! plugins were acquired, only the next run's cache is lost.

use crate::cache::{CacheStatus, LazyCache};
use crate::cli::args::{AcquireArgs, OutputFormat};
use crate::config::{Config, RunConfig};
use crate::error::LazydepResult;
use crate::loader::Capability;
use crate::package::PackageSpec;
use crate::ui::{self, TaskSpinner, UiContext};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct AcquireReport<'a> {
    key: Option<&'a str>,
    status: CacheStatus,
    saved: bool,
    plugins: &'a [Capability],
}

/// Execute the acquire command
pub async fn execute(args: AcquireArgs, config: &Config) -> LazydepResult<()> {
    let packages = args
        .packages
        .iter()
        .map(|p| p.parse::<PackageSpec>())
        .collect::<LazydepResult<Vec<_>>>()?;

    let mut config = config.clone();
    config.workspace.verify_installed |= args.verify_installed;

    let run_config = RunConfig::from(&args.run);
    let ctx = UiContext::detect().with_quiet(args.format == OutputFormat::Json);
    let mut cache = LazyCache::from_config(&config);

    ui::intro(&ctx, "Acquiring plugins");

    let mut plugins = Vec::with_capacity(packages.len());
    for package in &packages {
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start(&format!("Acquiring {}...", package));

        match cache.acquire_package(package, &run_config).await {
            Ok(capability) => {
                spinner.stop(&describe(&capability));
                plugins.push(capability);
            }
            Err(e) => {
                spinner.stop_error(&format!("Failed to acquire {}", package));
                return Err(e);
            }
        }
    }

    let saved = finalize(&cache, &ctx, args.strict_save).await?;

    match args.format {
        OutputFormat::Json => {
            let report = AcquireReport {
                key: cache.key().map(|k| k.as_str()),
                status: cache.status(),
                saved,
                plugins: &plugins,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            for plugin in &plugins {
                println!("{}\t{}", plugin.name, plugin.entry.display());
            }
        }
        OutputFormat::Table => {
            if let Some(key) = cache.key() {
                ui::key_value(&ctx, "key", key.as_str());
            }
            ui::key_value(&ctx, "cache", &cache.status().to_string());
            ui::key_value(&ctx, "workspace", &cache.workspace().root().display().to_string());
            ui::outro_success(&ctx, &format!("{} plugin(s) ready", plugins.len()));
        }
    }

    Ok(())
}

/// Save the snapshot if needed, returning whether one was written
async fn finalize(cache: &LazyCache, ctx: &UiContext, strict: bool) -> LazydepResult<bool> {
    if !cache.needs_save() {
        debug!("Cache {}, nothing to save", cache.status());
        return Ok(false);
    }

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start("Saving dependency cache...");

    match cache.finalize().await {
        Ok(()) => {
            spinner.stop("Dependency cache saved");
            Ok(true)
        }
        Err(e) if !strict => {
            spinner.stop_error("Failed to save dependency cache");
            ui::step_warn_hint(ctx, &e.to_string(), "Next run will reinstall plugins");
            Ok(false)
        }
        Err(e) => {
            spinner.stop_error("Failed to save dependency cache");
            Err(e)
        }
    }
}

fn describe(capability: &Capability) -> String {
    match capability.version {
        Some(ref version) => format!("{} {}", capability.name, version),
        None => capability.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn describe_with_and_without_version() {
        let mut cap = Capability {
            name: "pluginA".to_string(),
            version: Some("2.0.0".to_string()),
            dir: PathBuf::from("/ws/node_modules/pluginA"),
            entry: PathBuf::from("/ws/node_modules/pluginA/index.js"),
            shim: PathBuf::from("/ws/index.js"),
            manifest: serde_json::json!({}),
        };
        assert_eq!(describe(&cap), "pluginA 2.0.0");

        cap.version = None;
        assert_eq!(describe(&cap), "pluginA");
    }

    #[test]
    fn report_serializes_status() {
        let report = AcquireReport {
            key: Some("lib+hostA"),
            status: CacheStatus::Miss,
            saved: true,
            plugins: &[],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "miss");
        assert_eq!(json["key"], "lib+hostA");
    }
}
