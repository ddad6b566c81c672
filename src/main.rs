//! layersplit - split layered utility definitions into sibling stylesheets.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

use layersplit::config::{self, Config};
use layersplit::migrate::{FileOp, Migration};
use layersplit::resolve::FsResolver;
use layersplit::sheet::Registry;

#[derive(Parser, Debug)]
#[command(name = "layersplit")]
#[command(about = "Move utility definitions out of layered stylesheets into sibling files")]
struct Args {
    /// Stylesheets or directories to migrate. Directories are searched for
    /// `.css` files recursively.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the planned writes and deletes without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Log migration decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "layersplit=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };

    let files = collect_files(&args.paths)?;
    info!(files = files.len(), "Collected stylesheets");

    let mut registry = Registry::new();
    for file in &files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("Failed to read file: {}", file.display()))?;
        registry.add_source(Some(file.clone()), &text)?;
    }

    let base_dir = std::env::current_dir().context("Failed to get current directory")?;
    let mut migration = Migration::new(registry, config.split);
    let report = migration.run(&FsResolver::new(), &base_dir)?;

    if args.dry_run {
        for op in &report.plan {
            println!("{op}");
        }
        return Ok(());
    }

    for op in &report.plan {
        apply(op)?;
    }
    Ok(())
}

/// Expand directories into the `.css` files below them, skipping hidden
/// directories and `node_modules`.
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let path = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
        if !path.is_dir() {
            files.push(path);
            continue;
        }

        for entry in WalkDir::new(&path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || (!is_hidden(e) && !is_node_modules(e)))
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "css") {
                files.push(path.to_path_buf());
            }
        }
    }

    // Sort for deterministic registration order
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn is_node_modules(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s == "node_modules")
}

fn apply(op: &FileOp) -> Result<()> {
    match op {
        FileOp::Write { path, contents } => {
            fs::write(path, contents).with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        FileOp::Delete { path } => {
            fs::remove_file(path).with_context(|| format!("Failed to delete file: {}", path.display()))?;
        }
    }
    info!("{op}");
    Ok(())
}
