//! Datashed CLI — dataset listing, fetch, and cache management commands.
//!
//! Commands:
//! - `available` — list registered dataset names
//! - `fetch` — load (or force re-retrieve) datasets into the cache
//! - `show` — load a dataset and print its head
//! - `cache status` — report artifact inventory and sizes
//! - `cache clean` — remove cached artifacts and metadata

use anyhow::Result;
use clap::{Parser, Subcommand};
use datashed_core::{CacheConfig, DataCache, FileFormat, MetaRecord, Registry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "datashed",
    about = "Datashed CLI — local cache for named tabular datasets"
)]
struct Cli {
    /// Cache directory. Defaults to ~/.datashed/data.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Storage format: csv, pkl, or feather.
    #[arg(long, global = true, default_value = "csv")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered dataset names.
    Available {
        /// Keep only names containing this substring.
        filter: Option<String>,
    },
    /// Load datasets, retrieving and caching them on first use.
    Fetch {
        /// Dataset names (e.g. state_fips goodreads_books).
        #[arg(required = true)]
        names: Vec<String>,

        /// Re-retrieve even if an artifact is already cached.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Load a dataset and print its first rows.
    Show {
        name: String,

        /// Number of rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached artifacts, their sizes, and metadata presence.
    Status,
    /// Remove cached artifacts and the metadata file.
    Clean {
        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(cli.cache_dir, &cli.format)?;

    match cli.command {
        Commands::Available { filter } => run_available(config, filter.as_deref()),
        Commands::Fetch { names, force } => run_fetch(config, &names, force),
        Commands::Show { name, rows } => run_show(config, &name, rows),
        Commands::Cache { action } => match action {
            CacheAction::Status => run_cache_status(&config),
            CacheAction::Clean { confirm } => run_cache_clean(&config, confirm),
        },
    }
}

fn build_config(cache_dir: Option<PathBuf>, format: &str) -> Result<CacheConfig> {
    let format: FileFormat = format.parse()?;
    let mut config = CacheConfig::default();
    config.format = format;
    if let Some(dir) = cache_dir {
        config.cache_dir = dir;
    }
    Ok(config)
}

fn run_available(config: CacheConfig, filter: Option<&str>) -> Result<()> {
    let cache = DataCache::new(config, Registry::builtin())?;
    for name in cache.available(filter) {
        println!("{name}");
    }
    Ok(())
}

fn run_fetch(config: CacheConfig, names: &[String], force: bool) -> Result<()> {
    let cache = DataCache::new(config, Registry::builtin())?;
    let total = names.len();
    let mut errors: Vec<(String, String)> = Vec::new();

    for (i, name) in names.iter().enumerate() {
        println!("[{}/{}] Fetching {name}...", i + 1, total);
        let result = if force {
            cache.retrieve(name)
        } else {
            cache.load(name)
        };
        match result {
            Ok(dataset) => {
                println!("  OK: {name} ({} rows x {} cols)", dataset.height(), dataset.width());
            }
            Err(e) => {
                println!("  FAIL: {name}: {e}");
                errors.push((name.clone(), e.to_string()));
            }
        }
    }

    if !errors.is_empty() {
        for (name, err) in &errors {
            eprintln!("Error for {name}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_show(config: CacheConfig, name: &str, rows: usize) -> Result<()> {
    let cache = DataCache::new(config, Registry::builtin())?;
    let dataset = cache.load(name)?;

    println!("{name}: {} rows x {} cols", dataset.height(), dataset.width());
    if !dataset.index().is_empty() {
        println!("index: {}", dataset.index().join(", "));
    }
    println!("{}", dataset.frame().head(Some(rows)));
    Ok(())
}

fn run_cache_status(config: &CacheConfig) -> Result<()> {
    if !config.cache_dir.exists() {
        println!("Cache directory does not exist: {}", config.cache_dir.display());
        return Ok(());
    }

    let metadata = read_metadata(&config.cache_dir);
    let mut rows: Vec<(String, String, u64, bool)> = Vec::new();
    let mut total_size = 0u64;

    for entry in std::fs::read_dir(&config.cache_dir)? {
        let entry = entry?;
        let path = entry.path();
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e @ ("csv" | "pkl" | "feather")) => e.to_string(),
            _ => continue,
        };
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        total_size += size;
        let has_meta = metadata.contains_key(&name);
        rows.push((name, ext, size, has_meta));
    }

    if rows.is_empty() {
        println!("Cache is empty: {}", config.cache_dir.display());
        return Ok(());
    }

    rows.sort_by(|a, b| a.0.cmp(&b.0));

    println!("Cache: {}", config.cache_dir.display());
    println!("Datasets: {}", rows.len());
    println!("Total size: {}", format_size(total_size));
    println!();
    println!("{:<28} {:<8} {:>10} {:<8}", "Dataset", "Format", "Size", "Meta");
    println!("{}", "-".repeat(58));
    for (name, ext, size, has_meta) in &rows {
        println!(
            "{:<28} {:<8} {:>10} {:<8}",
            name,
            ext,
            format_size(*size),
            if *has_meta { "yes" } else { "-" }
        );
    }

    Ok(())
}

fn run_cache_clean(config: &CacheConfig, confirm: bool) -> Result<()> {
    if !config.cache_dir.exists() {
        println!("Cache directory does not exist: {}", config.cache_dir.display());
        return Ok(());
    }

    let mut to_remove: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(&config.cache_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_artifact = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("csv" | "pkl" | "feather")
        );
        let is_metadata = path.file_name().and_then(|n| n.to_str()) == Some("metadata.json");
        if is_artifact || is_metadata {
            to_remove.push(path);
        }
    }

    if to_remove.is_empty() {
        println!("Nothing to remove.");
        return Ok(());
    }

    println!("Found {} file(s) to remove:", to_remove.len());
    for path in &to_remove {
        println!("  {}", path.display());
    }

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    for path in &to_remove {
        std::fs::remove_file(path)?;
    }
    println!("Done. Removed {} file(s).", to_remove.len());

    Ok(())
}

fn read_metadata(cache_dir: &Path) -> BTreeMap<String, MetaRecord> {
    std::fs::read_to_string(cache_dir.join("metadata.json"))
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
