use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use crate::model::MatchRecord;

/// Persisted match entries. Fields other than the extracted four are carried as-is.
pub type Dataset = Vec<Value>;

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read dataset {}", path.display()))?;
    parse_dataset(&raw).with_context(|| format!("decode dataset {}", path.display()))
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let value: Value = serde_json::from_str(raw).context("invalid dataset json")?;
    let Value::Array(entries) = value else {
        return Err(anyhow!("dataset must be a json array"));
    };
    for (idx, entry) in entries.iter().enumerate() {
        if entry_url(entry).is_none() {
            return Err(anyhow!("entry {idx} has no string url"));
        }
    }
    Ok(entries)
}

pub fn save_dataset(path: &Path, entries: &[Value]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(entries).context("serialize dataset")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

pub fn entry_url(entry: &Value) -> Option<&str> {
    entry.get("url").and_then(Value::as_str)
}

/// Distinct urls in first-seen order.
pub fn unique_urls(entries: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for url in entries.iter().filter_map(entry_url) {
        if seen.insert(url) {
            out.push(url.to_string());
        }
    }
    out
}

/// Overwrites format/stage/veto/maps on every entry with a fresh record for its url.
/// Returns the number of entries touched.
pub fn merge_records(entries: &mut [Value], fresh: &HashMap<String, MatchRecord>) -> Result<usize> {
    let mut updated = 0;
    for entry in entries.iter_mut() {
        let Some(record) = entry_url(entry).and_then(|url| fresh.get(url)) else {
            continue;
        };
        let Value::Object(fields) = entry else {
            continue;
        };
        apply_record(fields, record)?;
        updated += 1;
    }
    Ok(updated)
}

fn apply_record(fields: &mut Map<String, Value>, record: &MatchRecord) -> Result<()> {
    fields.insert("format".to_string(), Value::String(record.format.clone()));
    fields.insert("stage".to_string(), Value::String(record.stage.clone()));
    fields.insert(
        "veto".to_string(),
        Value::Array(record.veto.iter().cloned().map(Value::String).collect()),
    );
    let maps = serde_json::to_value(&record.maps)
        .with_context(|| format!("serialize maps for {}", record.url))?;
    fields.insert("maps".to_string(), maps);
    Ok(())
}
