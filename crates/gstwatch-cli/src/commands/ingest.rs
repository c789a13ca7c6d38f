//! `gstwatch ingest` - load JSON source files into the store.
//!
//! Each `*.json` file in the directory holds an array of records; the
//! file stem names the target collection (e.g. `GSTR2B.json`). Files
//! whose stem matches no collection are reported and skipped.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use gstwatch_store::{init_pool_from_env, replace_source_file, Collection};

#[derive(Args)]
pub struct IngestArgs {
    /// Directory of JSON source files, one per collection
    pub dir: PathBuf,
}

pub async fn execute(args: IngestArgs) -> Result<()> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(&args.dir)
        .with_context(|| format!("Failed to read {}", args.dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("No .json files found in {}", args.dir.display());
    }

    let pool = init_pool_from_env().await?;

    for path in &files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(collection) = Collection::from_name(&stem) else {
            println!(
                "{} {} (no collection named '{}')",
                "skipping".yellow(),
                path.display(),
                stem
            );
            continue;
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let docs: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON array of records", path.display()))?;

        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let report = replace_source_file(&pool, collection, &source_file, docs).await?;

        let skipped = if report.skipped > 0 {
            format!("  skipped {}", report.skipped).yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{} {:<20} stored {:>4}  removed {:>4}{}",
            "✓".green(),
            collection.name().cyan(),
            report.stored,
            report.removed,
            skipped
        );
    }

    Ok(())
}
