use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::map_parse::extract_maps;
use crate::model::MatchRecord;
use crate::veto_parse::{VetoSource, extract_veto};

/// Compiled selectors for the match report layout.
pub(crate) struct ReportSelectors {
    pub section: Selector,
    pub veto_box: Selector,
    pub preformatted: Selector,
    pub padding: Selector,
    pub div: Selector,
    pub map_holder: Selector,
    pub map_name: Selector,
    pub results: Selector,
    pub results_left: Selector,
    pub results_right: Selector,
    pub team_name: Selector,
    pub team_score: Selector,
    pub half_score: Selector,
}

impl ReportSelectors {
    fn new() -> Self {
        Self {
            section: selector("div.col-6.col-7-small"),
            veto_box: selector("div.standard-box.veto-box"),
            preformatted: selector("div.padding.preformatted-text"),
            padding: selector("div.padding"),
            div: selector("div"),
            map_holder: selector("div.mapholder"),
            map_name: selector("div.mapname"),
            results: selector("div.results"),
            results_left: selector(".results-left"),
            results_right: selector(".results-right"),
            team_name: selector("div.results-teamname"),
            team_score: selector("div.results-team-score"),
            half_score: selector("div.results-center-half-score"),
        }
    }
}

// Every pattern above is a literal; a parse failure is a typo caught by the tests.
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css:?}: {err}"))
}

pub(crate) static SELECTORS: Lazy<ReportSelectors> = Lazy::new(ReportSelectors::new);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Drop maps whose two teams both carry the not-played override.
    pub skip_unplayed_maps: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatStage {
    pub format: String,
    pub stage: String,
}

pub fn parse_match_details(html: &str, url: &str) -> MatchRecord {
    parse_match_details_with(html, url, &ExtractOptions::default())
}

pub fn parse_match_details_with(html: &str, url: &str, options: &ExtractOptions) -> MatchRecord {
    let document = Html::parse_document(html);
    parse_document(&document, url, options)
}

pub fn parse_document(document: &Html, url: &str, options: &ExtractOptions) -> MatchRecord {
    let mut record = MatchRecord::empty(url);

    let Some(section) = locate_report_section(document) else {
        warn!(url, "no match report section found");
        return record;
    };

    let FormatStage { format, stage } = extract_format_stage(section);
    debug!(url, %format, %stage, "extracted format and stage");
    record.format = format;
    record.stage = stage;

    let veto = extract_veto(section);
    match veto.source {
        VetoSource::Primary => debug!(url, steps = veto.steps.len(), "extracted veto steps"),
        VetoSource::Fallback => {
            debug!(url, steps = veto.steps.len(), "extracted veto steps via fallback")
        }
        VetoSource::None => warn!(url, "no veto steps found"),
    }
    record.veto = veto.steps;

    let mut maps = extract_maps(section);
    if options.skip_unplayed_maps {
        maps.retain(|map| {
            let keep = !map.is_unplayed();
            if !keep {
                debug!(url, map = %map.map, "skipping unplayed map");
            }
            keep
        });
    }
    record.maps = maps;

    record
}

/// The primary content column holding the format, veto and map boxes.
pub fn locate_report_section(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&SELECTORS.section).next()
}

/// The first metadata box with at least one non-empty line supplies both labels.
pub fn extract_format_stage(section: ElementRef<'_>) -> FormatStage {
    for veto_box in section.select(&SELECTORS.veto_box) {
        let Some(text_block) = veto_box.select(&SELECTORS.preformatted).next() else {
            continue;
        };
        let raw = text_block.text().collect::<String>();
        let parsed = split_format_stage(&raw);
        if !parsed.format.is_empty() {
            return parsed;
        }
    }
    FormatStage::default()
}

pub fn split_format_stage(raw: &str) -> FormatStage {
    let mut lines = raw.lines().map(str::trim).filter(|line| !line.is_empty());
    let format = lines.next().unwrap_or_default().to_string();
    let stage = lines
        .next()
        .map(|line| line.trim_start_matches(|c: char| c == '*' || c.is_whitespace()))
        .unwrap_or_default()
        .trim()
        .to_string();
    FormatStage { format, stage }
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub(crate) fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).next().map(element_text)
}
