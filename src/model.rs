use serde::{Deserialize, Serialize};

/// Score text the report uses for a map that was never contested.
pub const NOT_PLAYED_SCORE: &str = "-";
pub const UNKNOWN_MAP: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatchRecord {
    pub url: String,
    pub format: String,
    pub stage: String,
    pub veto: Vec<String>,
    pub maps: Vec<MapResult>,
}

impl MatchRecord {
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.format.is_empty() && self.stage.is_empty() && self.veto.is_empty() && self.maps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapResult {
    pub map: String,
    pub team1: TeamMapResult,
    pub team2: TeamMapResult,
    pub half_scores: String,
    pub status: MapStatus,
}

impl MapResult {
    /// Both sides carry the joint not-played override.
    pub fn is_unplayed(&self) -> bool {
        self.team1.status == TeamStatus::NotPlayed && self.team2.status == TeamStatus::NotPlayed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TeamMapResult {
    pub name: String,
    pub score: String,
    pub status: TeamStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    Won,
    #[default]
    Lost,
    NotPlayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStatus {
    Played,
    NotPlayed,
}

impl MapStatus {
    // Derived from the half-time text only; team scores do not enter into it.
    pub fn from_half_scores(half_scores: &str) -> Self {
        if half_scores.trim().is_empty() {
            MapStatus::NotPlayed
        } else {
            MapStatus::Played
        }
    }
}
