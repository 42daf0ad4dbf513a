use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A completed game as it enters the rating engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_points: u32,
    pub away_points: u32,
}

impl GameRecord {
    /// Home points minus away points.
    pub fn point_diff(&self) -> i64 {
        i64::from(self.home_points) - i64::from(self.away_points)
    }
}

/// One player's box-score line for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameRecord {
    pub player: String,
    pub team: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
}

/// An unvalidated CSV row: header name → cell text.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        RawRow { line, fields }
    }

    /// Build a row from `(header, value)` pairs.
    #[cfg(test)]
    pub fn from_pairs(line: u64, pairs: &[(&str, &str)]) -> Self {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawRow { line, fields }
    }

    /// Trimmed, non-empty cell value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A game row as written by the updater (carries the provider's game id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRow {
    pub id: u64,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_points: u32,
    pub away_points: u32,
}

/// A player stat row as written by the updater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatRow {
    pub game_id: u64,
    pub player_id: u64,
    pub player: String,
    pub team: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub fgm: u32,
    pub fga: u32,
    pub ftm: u32,
    pub fta: u32,
}
