use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::dataset::{load_dataset, merge_records, save_dataset, unique_urls};
use crate::fetch::PageFetcher;
use crate::model::MatchRecord;
use crate::report_parse::{ExtractOptions, parse_match_details_with};

#[derive(Debug, Clone)]
pub struct UpdateSummary {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub entries: usize,
    pub unique_urls: usize,
    pub fetched: usize,
    pub fetch_failed: usize,
    /// Fetched pages that produced nothing (no report section, error pages).
    pub empty_records: usize,
    pub entries_updated: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeBatch {
    pub records: HashMap<String, MatchRecord>,
    pub fetched: usize,
    pub empty_records: usize,
    pub errors: Vec<String>,
}

/// Loads `input`, refreshes every distinct url, writes the merged snapshot to `output`.
/// A dataset that cannot be loaded aborts before any fetch and leaves `output` alone.
pub fn update_results_file(
    input: &Path,
    output: &Path,
    config: &ScrapeConfig,
    fetcher: &dyn PageFetcher,
) -> Result<UpdateSummary> {
    let started_at = Utc::now();
    let mut entries = load_dataset(input)?;
    let urls = unique_urls(&entries);
    info!(entries = entries.len(), urls = urls.len(), "found unique urls to scrape");

    let batch = scrape_urls(fetcher, &urls, config.parallelism, &config.extract_options());
    let entries_updated = merge_records(&mut entries, &batch.records)?;

    save_dataset(output, &entries)?;
    info!(path = %output.display(), "saved updated results");

    Ok(UpdateSummary {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        started_at,
        entries: entries.len(),
        unique_urls: urls.len(),
        fetched: batch.fetched,
        fetch_failed: batch.errors.len(),
        empty_records: batch.empty_records,
        entries_updated,
        errors: batch.errors,
    })
}

/// Fetches and extracts each url. A failed fetch still yields an empty record for that url.
pub fn scrape_urls(
    fetcher: &dyn PageFetcher,
    urls: &[String],
    parallelism: usize,
    options: &ExtractOptions,
) -> ScrapeBatch {
    let results: Vec<(MatchRecord, Option<String>)> = with_fetch_pool(parallelism, || {
        urls.par_iter()
            .map(|url| scrape_one(fetcher, url, options))
            .collect()
    });

    let mut batch = ScrapeBatch::default();
    for (record, err) in results {
        match err {
            Some(err) => batch.errors.push(err),
            None => {
                batch.fetched += 1;
                if record.is_empty() {
                    batch.empty_records += 1;
                }
            }
        }
        batch.records.insert(record.url.clone(), record);
    }
    batch
}

fn scrape_one(
    fetcher: &dyn PageFetcher,
    url: &str,
    options: &ExtractOptions,
) -> (MatchRecord, Option<String>) {
    match fetcher.fetch_page(url) {
        Ok(html) => {
            let record = parse_match_details_with(&html, url, options);
            info!(
                url,
                format = %record.format,
                veto = record.veto.len(),
                maps = record.maps.len(),
                "scraped match details"
            );
            (record, None)
        }
        Err(err) => {
            warn!(url, error = %format!("{err:#}"), "failed to fetch page");
            (MatchRecord::empty(url), Some(format!("{url}: {err:#}")))
        }
    }
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads.max(1)).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
