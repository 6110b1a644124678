use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use hltv_match_details::config::ScrapeConfig;
use hltv_match_details::fetch::SolverFetcher;
use hltv_match_details::update::update_results_file;

const DEFAULT_INPUT: &str = "results.json";
const DEFAULT_OUTPUT: &str = "updated_results.json";
const USAGE: &str = "Usage: hltv_match_details [--input <results.json>] [--output <updated_results.json>]";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        eprintln!("{USAGE}");
        return Ok(());
    }

    init_logging();

    let input = path_arg(&args, "--input", "-i").unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let output = path_arg(&args, "--output", "-o").unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let config = ScrapeConfig::from_env();
    let fetcher = SolverFetcher::new(&config)?;
    let summary = update_results_file(&input, &output, &config, &fetcher)
        .with_context(|| format!("update of {} failed", input.display()))?;

    println!("Match details update complete");
    println!("Started: {}", summary.started_at.to_rfc3339());
    println!("Input: {}", summary.input_path.display());
    println!("Output: {}", summary.output_path.display());
    println!(
        "Entries: {} (unique urls {})",
        summary.entries, summary.unique_urls
    );
    println!(
        "Fetched: {} ok, {} failed, {} without report",
        summary.fetched, summary.fetch_failed, summary.empty_records
    );
    println!("Entries updated: {}", summary.entries_updated);
    if !summary.errors.is_empty() {
        println!("  errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(6) {
            println!("   - {err}");
        }
    }

    Ok(())
}

fn init_logging() {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|raw| Level::from_str(raw.trim()).ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[WARN] logging disabled: {err}");
    }
}

fn path_arg(args: &[String], long: &str, short: &str) -> Option<PathBuf> {
    let prefix = format!("{long}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(prefix.as_str()) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if (arg == long || arg == short)
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
