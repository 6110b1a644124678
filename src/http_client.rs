use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::config::ScrapeConfig;

// Leaves room for the solver to report its own timeout before the socket gives up.
const TIMEOUT_SLACK_SECS: u64 = 10;

pub fn http_client(config: &ScrapeConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.fetch_timeout + Duration::from_secs(TIMEOUT_SLACK_SECS))
        .user_agent(config.user_agent.as_str())
        .build()
        .context("failed to build http client")
}
