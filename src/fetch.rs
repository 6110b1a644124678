use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::REFERER;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ScrapeConfig;
use crate::http_client::http_client;

const TIMEZONE_COOKIE: &str = "hltvTimeZone";

/// Source of rendered report HTML.
pub trait PageFetcher: Sync {
    fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Fetches pages through a FlareSolverr-compatible `request.get` endpoint.
pub struct SolverFetcher {
    client: Client,
    config: ScrapeConfig,
}

#[derive(Debug, Serialize)]
struct SolverRequest<'a> {
    cmd: &'static str,
    url: &'a str,
    #[serde(rename = "maxTimeout")]
    max_timeout: u64,
    cookies: Vec<SolverCookie<'a>>,
}

#[derive(Debug, Serialize)]
struct SolverCookie<'a> {
    name: &'static str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct SolverResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    solution: Option<SolverSolution>,
}

#[derive(Debug, Deserialize)]
struct SolverSolution {
    #[serde(default)]
    response: String,
}

impl SolverFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            config: config.clone(),
        })
    }

    fn request_body<'a>(&'a self, url: &'a str) -> SolverRequest<'a> {
        SolverRequest {
            cmd: "request.get",
            url,
            max_timeout: u64::try_from(self.config.fetch_timeout.as_millis()).unwrap_or(u64::MAX),
            cookies: vec![SolverCookie {
                name: TIMEZONE_COOKIE,
                value: &self.config.target_timezone,
            }],
        }
    }
}

impl PageFetcher for SolverFetcher {
    fn fetch_page(&self, url: &str) -> Result<String> {
        info!(url, "fetching page");
        let resp = self
            .client
            .post(self.config.solver_url.as_str())
            .header(REFERER, self.config.referer.as_str())
            .json(&self.request_body(url))
            .send()
            .context("solver request failed")?;

        let status = resp.status();
        let body = resp.text().context("failed reading solver body")?;
        if !status.is_success() {
            return Err(anyhow!("solver http {status}: {body}"));
        }

        let html = parse_solver_response(&body)?;
        info!(url, bytes = html.len(), "fetched page");
        Ok(html)
    }
}

/// Pulls the rendered HTML out of a solver reply; any status other than "ok" is a failure.
pub fn parse_solver_response(raw: &str) -> Result<String> {
    let parsed: SolverResponse =
        serde_json::from_str(raw.trim()).context("invalid solver json")?;
    if parsed.status != "ok" {
        return Err(anyhow!(
            "solver status {:?}: {}",
            parsed.status,
            parsed.message
        ));
    }
    parsed
        .solution
        .map(|solution| solution.response)
        .ok_or_else(|| anyhow!("solver reply has no solution"))
}
