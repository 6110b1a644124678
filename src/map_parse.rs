use scraper::{CaseSensitivity, ElementRef, Selector};
use tracing::debug;

use crate::model::{
    MapResult, MapStatus, NOT_PLAYED_SCORE, TeamMapResult, TeamStatus, UNKNOWN_MAP,
};
use crate::report_parse::{SELECTORS, first_text};

/// One result per map holder that carries a results block, in document order.
pub fn extract_maps(section: ElementRef<'_>) -> Vec<MapResult> {
    let mut maps = Vec::new();
    for holder in section.select(&SELECTORS.map_holder) {
        let map = first_text(holder, &SELECTORS.map_name).unwrap_or_else(|| UNKNOWN_MAP.to_string());
        match holder.select(&SELECTORS.results).next() {
            Some(results) => maps.push(parse_map_result(map, results)),
            None => debug!(%map, "no results block for map holder"),
        }
    }
    maps
}

fn parse_map_result(map: String, results: ElementRef<'_>) -> MapResult {
    let mut team1 = parse_side(results, &SELECTORS.results_left);
    let mut team2 = parse_side(results, &SELECTORS.results_right);
    let half_scores = first_text(results, &SELECTORS.half_score).unwrap_or_default();

    if team1.score == NOT_PLAYED_SCORE && team2.score == NOT_PLAYED_SCORE && half_scores.is_empty() {
        debug!(%map, "map was not played");
        team1.status = TeamStatus::NotPlayed;
        team2.status = TeamStatus::NotPlayed;
    }

    // Deliberately independent of the team override above: a reported final
    // score without half-time text still counts as not played here.
    let status = MapStatus::from_half_scores(&half_scores);

    MapResult {
        map,
        team1,
        team2,
        half_scores,
        status,
    }
}

fn parse_side(results: ElementRef<'_>, marker: &Selector) -> TeamMapResult {
    let Some(side) = results.select(marker).next() else {
        return TeamMapResult::default();
    };
    let status = if side.value().has_class("won", CaseSensitivity::CaseSensitive) {
        TeamStatus::Won
    } else {
        TeamStatus::Lost
    };
    TeamMapResult {
        name: first_text(side, &SELECTORS.team_name).unwrap_or_default(),
        score: first_text(side, &SELECTORS.team_score).unwrap_or_default(),
        status,
    }
}
