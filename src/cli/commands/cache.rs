//! Cache command - manage stored snapshots

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::LazydepResult;
use crate::store::{format_bytes, DirectoryStore, SnapshotInfo};
use crate::ui::{self, UiContext};
use chrono::{DateTime, Utc};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> LazydepResult<()> {
    let root = config
        .store
        .root
        .clone()
        .unwrap_or_else(ConfigManager::store_dir);
    let store = DirectoryStore::new(root);

    match args.action {
        CacheAction::List { format } => list_snapshots(&store, format).await,
        CacheAction::Remove { key } => remove_snapshot(&store, &key).await,
        CacheAction::Gc { days, dry_run } => gc_snapshots(&store, days, dry_run).await,
        CacheAction::Clear { yes } => clear_snapshots(&store, yes).await,
    }
}

async fn list_snapshots(store: &DirectoryStore, format: OutputFormat) -> LazydepResult<()> {
    let snapshots = store.list().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshots)?),
        OutputFormat::Plain => {
            for snapshot in &snapshots {
                println!("{}", snapshot.key);
            }
        }
        OutputFormat::Table if snapshots.is_empty() => {
            ui::step_info(&UiContext::detect(), "No cache snapshots found");
        }
        OutputFormat::Table => print_table(&snapshots),
    }

    Ok(())
}

fn print_table(snapshots: &[SnapshotInfo]) {
    println!(
        "{:<48} {:<10} {:<20}",
        style("KEY").bold(),
        style("SIZE").bold(),
        style("CREATED").bold()
    );
    println!("{}", "-".repeat(80));

    for snapshot in snapshots {
        println!(
            "{:<48} {:<10} {:<20}",
            snapshot.key,
            format_bytes(snapshot.size_bytes),
            snapshot.created_at.format("%Y-%m-%d %H:%M").to_string()
        );
    }

    let total: u64 = snapshots.iter().map(|s| s.size_bytes).sum();
    println!();
    println!(
        "Total: {} snapshot(s), {}",
        snapshots.len(),
        format_bytes(total)
    );
}

async fn remove_snapshot(store: &DirectoryStore, key: &str) -> LazydepResult<()> {
    store.remove(key).await?;
    ui::step_ok(&UiContext::detect(), &format!("Removed snapshot {}", key));
    Ok(())
}

/// Oldest creation time a snapshot may have to survive gc, `None` when
/// the threshold reaches before the representable range
fn gc_cutoff(days: u32) -> Option<DateTime<Utc>> {
    chrono::Duration::try_days(i64::from(days)).and_then(|age| Utc::now().checked_sub_signed(age))
}

async fn gc_snapshots(store: &DirectoryStore, days: u32, dry_run: bool) -> LazydepResult<()> {
    let ctx = UiContext::detect();

    if days == 0 {
        ui::step_info(&ctx, "Cache GC is disabled (--days 0)");
        return Ok(());
    }
    let Some(cutoff) = gc_cutoff(days) else {
        ui::step_info(&ctx, &format!("No snapshots older than {} days", days));
        return Ok(());
    };

    let stale: Vec<SnapshotInfo> = store
        .list()
        .await?
        .into_iter()
        .filter(|s| s.created_at < cutoff)
        .collect();

    if stale.is_empty() {
        ui::step_info(&ctx, &format!("No snapshots older than {} days", days));
        return Ok(());
    }

    for snapshot in &stale {
        if dry_run {
            ui::step_info(&ctx, &format!("Would remove {}", snapshot.key));
        } else {
            store.remove(&snapshot.key).await?;
            ui::step_ok_detail(
                &ctx,
                &format!("Removed {}", snapshot.key),
                &format_bytes(snapshot.size_bytes),
            );
        }
    }

    Ok(())
}

async fn clear_snapshots(store: &DirectoryStore, yes: bool) -> LazydepResult<()> {
    let ctx = UiContext::detect();

    let proceed = ui::confirm(
        &ctx,
        &format!("Remove all snapshots in {}?", store.root().display()),
        false,
        yes,
    )
    .await?;
    if !proceed {
        ui::outro_warn(&ctx, "Aborted (pass --yes to clear without prompting)");
        return Ok(());
    }

    let removed = store.clear().await?;
    ui::step_ok(&ctx, &format!("Removed {} snapshot(s)", removed));
    Ok(())
}
