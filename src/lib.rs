pub mod config;
pub mod dataset;
pub mod fetch;
pub mod http_client;
pub mod map_parse;
pub mod model;
pub mod report_parse;
pub mod update;
pub mod veto_parse;

pub use model::{MapResult, MapStatus, MatchRecord, TeamMapResult, TeamStatus};
pub use report_parse::{ExtractOptions, parse_match_details, parse_match_details_with};
