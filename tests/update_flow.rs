use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use hltv_match_details::config::ScrapeConfig;
use hltv_match_details::dataset::{merge_records, parse_dataset};
use hltv_match_details::fetch::PageFetcher;
use hltv_match_details::update::{scrape_urls, update_results_file};
use hltv_match_details::{ExtractOptions, MatchRecord};

const REPORT: &str = r#"<html><body><div class="col-6 col-7-small">
  <div class="standard-box veto-box"><div class="padding preformatted-text">Best of 1
* Group A</div></div>
  <div class="standard-box veto-box"><div class="padding">
    <div>1. Alpha removed Train</div><div>2. Omega picked Ancient</div>
  </div></div>
  <div class="mapholder"><div class="mapname">Ancient</div><div class="results">
    <div class="results-left won"><div class="results-teamname">Alpha</div><div class="results-team-score">13</div></div>
    <div class="results-center-half-score">(7:5; 6:3)</div>
    <span class="results-right"><div class="results-teamname">Omega</div><div class="results-team-score">8</div></span>
  </div></div>
</div></body></html>"#;

struct StubFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl PageFetcher for StubFetcher {
    fn fetch_page(&self, url: &str) -> Result<String> {
        self.calls.lock().expect("calls lock").push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("solver status \"error\": timeout"))
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hltv_match_details_{}_{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn read_json(path: &PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("output readable")).expect("output json")
}

#[test]
fn updates_duplicates_and_keeps_one_entry_per_input() {
    let dir = scratch_dir("dups");
    let input = dir.join("results.json");
    let output = dir.join("updated_results.json");
    let dataset = json!([
        {"url": "m/1", "team1": "Alpha", "team2": "Omega", "event": "Cup"},
        {"url": "m/2", "team1": "Beta", "team2": "Gamma"},
        {"url": "m/1", "team1": "Alpha", "team2": "Omega", "event": "Cup", "note": "dup"}
    ]);
    fs::write(&input, dataset.to_string()).unwrap();

    let fetcher = StubFetcher::new(&[("m/1", REPORT)]);
    let config = ScrapeConfig {
        parallelism: 2,
        ..ScrapeConfig::default()
    };
    let summary = update_results_file(&input, &output, &config, &fetcher).unwrap();

    let mut calls = fetcher.calls();
    calls.sort();
    assert_eq!(calls, vec!["m/1", "m/2"]);
    assert_eq!(summary.entries, 3);
    assert_eq!(summary.unique_urls, 2);
    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.fetch_failed, 1);
    assert_eq!(summary.entries_updated, 3);

    let out = read_json(&output);
    let rows = out.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    for idx in [0, 2] {
        assert_eq!(rows[idx]["format"], "Best of 1");
        assert_eq!(rows[idx]["stage"], "Group A");
        assert_eq!(rows[idx]["veto"], json!(["1. Alpha removed Train", "2. Omega picked Ancient"]));
        assert_eq!(rows[idx]["maps"][0]["half_scores"], "(7:5; 6:3)");
        assert_eq!(rows[idx]["event"], "Cup");
    }
    assert_eq!(rows[2]["note"], "dup");
    assert_eq!(rows[1]["team1"], "Beta");
    assert_eq!(rows[1]["format"], "");
    assert_eq!(rows[1]["veto"], json!([]));
    assert_eq!(rows[1]["maps"], json!([]));

    // input is never rewritten
    assert_eq!(read_json(&input), dataset);
}

#[test]
fn corrupt_dataset_stops_before_fetching() {
    let dir = scratch_dir("corrupt");
    let input = dir.join("results.json");
    let output = dir.join("updated_results.json");
    fs::write(&input, "[{\"url\": \"m/1\"},").unwrap();
    fs::write(&output, "previous snapshot").unwrap();

    let fetcher = StubFetcher::new(&[("m/1", REPORT)]);
    let result = update_results_file(&input, &output, &ScrapeConfig::default(), &fetcher);

    assert!(result.is_err());
    assert!(fetcher.calls().is_empty());
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous snapshot");
}

#[test]
fn missing_dataset_is_an_error() {
    let dir = scratch_dir("missing");
    let fetcher = StubFetcher::new(&[]);
    let result = update_results_file(
        &dir.join("nope.json"),
        &dir.join("out.json"),
        &ScrapeConfig::default(),
        &fetcher,
    );
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("nope.json"));
    assert!(!dir.join("out.json").exists());
}

#[test]
fn merge_is_idempotent_and_url_scoped() {
    let mut entries = parse_dataset(
        r#"[{"url":"m/1","score":"2-0"},{"url":"m/9","score":"1-2","format":"Best of 3"}]"#,
    )
    .unwrap();
    let untouched = entries[1].clone();

    let fetcher = StubFetcher::new(&[("m/1", REPORT)]);
    let batch = scrape_urls(&fetcher, &["m/1".to_string()], 1, &ExtractOptions::default());

    merge_records(&mut entries, &batch.records).unwrap();
    let once = entries.clone();
    merge_records(&mut entries, &batch.records).unwrap();

    assert_eq!(entries, once);
    assert_eq!(entries[1], untouched);
    assert_eq!(
        serde_json::to_string(&entries[1]).unwrap(),
        serde_json::to_string(&untouched).unwrap()
    );
    assert_eq!(entries[0]["score"], "2-0");
    assert_eq!(entries[0]["format"], "Best of 1");
}

#[test]
fn failed_fetch_still_produces_record() {
    let fetcher = StubFetcher::new(&[]);
    let batch = scrape_urls(&fetcher, &["m/5".to_string()], 4, &ExtractOptions::default());
    assert_eq!(batch.records.get("m/5"), Some(&MatchRecord::empty("m/5")));
    assert_eq!(batch.errors.len(), 1);
}
