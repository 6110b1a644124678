use std::env;
use std::time::Duration;

use crate::report_parse::ExtractOptions;

const DEFAULT_SOLVER_URL: &str = "http://localhost:8191/v1";
const DEFAULT_TIMEZONE: &str = "Europe/Copenhagen";
const DEFAULT_REFERER: &str = "https://www.hltv.org/stats";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Process-wide settings handed to the fetcher and the update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub solver_url: String,
    /// Sent to the report site as the `hltvTimeZone` cookie.
    pub target_timezone: String,
    /// Upper bound the solver may spend on one page.
    pub fetch_timeout: Duration,
    pub referer: String,
    pub user_agent: String,
    pub parallelism: usize,
    pub skip_unplayed_maps: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            solver_url: DEFAULT_SOLVER_URL.to_string(),
            target_timezone: DEFAULT_TIMEZONE.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            parallelism: 2,
            skip_unplayed_maps: false,
        }
    }
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
                .unwrap_or(default)
        };

        let fetch_timeout_secs = lookup("FETCH_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
            .clamp(5, 600);
        let parallelism = lookup("FETCH_PARALLELISM")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.parallelism)
            .clamp(1, 16);
        let skip_unplayed_maps = lookup("SKIP_UNPLAYED_MAPS")
            .map(|val| parse_flag(&val))
            .unwrap_or(defaults.skip_unplayed_maps);

        Self {
            solver_url: text("SOLVER_URL", defaults.solver_url),
            target_timezone: text("TARGET_TIMEZONE", defaults.target_timezone),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            referer: text("FETCH_REFERER", defaults.referer),
            user_agent: text("FETCH_USER_AGENT", defaults.user_agent),
            parallelism,
            skip_unplayed_maps,
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            skip_unplayed_maps: self.skip_unplayed_maps,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
