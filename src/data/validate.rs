//! Row validation for game and player-stat datasets.
//!
//! A row either converts completely into a record or is rejected with a
//! [`RowRejection`]. Rejections are logged and handed back to the caller;
//! they never stop the remaining rows from being processed.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use super::models::{GameRecord, PlayerGameRecord, RawRow};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` is not a non-negative integer: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field `date` is not a calendar date: {value:?}")]
    InvalidDate { value: String },
}

/// A dropped row and why it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub line: u64,
    pub reason: String,
}

/// Records that validated, plus diagnostics for the rows that did not.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RowRejection>,
}

impl<T> Default for IngestReport<T> {
    fn default() -> Self {
        IngestReport {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> IngestReport<T> {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Validate game rows, preserving input order.
pub fn validate_games<I>(rows: I) -> IngestReport<GameRecord>
where
    I: IntoIterator<Item = RawRow>,
{
    collect(rows, "game", parse_game_row)
}

/// Validate player box-score rows, preserving input order.
pub fn validate_player_stats<I>(rows: I) -> IngestReport<PlayerGameRecord>
where
    I: IntoIterator<Item = RawRow>,
{
    collect(rows, "player stat", parse_player_row)
}

fn collect<T, I, F>(rows: I, kind: &str, parse: F) -> IngestReport<T>
where
    I: IntoIterator<Item = RawRow>,
    F: Fn(&RawRow) -> Result<T, RecordError>,
{
    let mut report = IngestReport::default();
    for row in rows {
        match parse(&row) {
            Ok(record) => report.records.push(record),
            Err(e) => {
                warn!("Skipping bad {} row at line {}: {}", kind, row.line, e);
                report.rejected.push(RowRejection {
                    line: row.line,
                    reason: e.to_string(),
                });
            }
        }
    }
    report
}

pub fn parse_game_row(row: &RawRow) -> Result<GameRecord, RecordError> {
    let date = parse_date(required(row, "date")?)?;
    let home_team = required(row, "home_team")?.to_string();
    let away_team = required(row, "away_team")?.to_string();
    let home_points = count(row, "home_points", &[])?;
    let away_points = count(row, "away_points", &[])?;
    Ok(GameRecord {
        date,
        home_team,
        away_team,
        home_points,
        away_points,
    })
}

pub fn parse_player_row(row: &RawRow) -> Result<PlayerGameRecord, RecordError> {
    Ok(PlayerGameRecord {
        player: required(row, "player")?.to_string(),
        team: required(row, "team")?.to_string(),
        points: count(row, "points", &[])?,
        rebounds: count(row, "rebounds", &[])?,
        assists: count(row, "assists", &[])?,
        steals: count(row, "steals", &[])?,
        field_goals_made: count(row, "fgm", &["field_goals_made"])?,
        field_goals_attempted: count(row, "fga", &["field_goals_attempted"])?,
        free_throws_made: count(row, "ftm", &["free_throws_made"])?,
        free_throws_attempted: count(row, "fta", &["free_throws_attempted"])?,
    })
}

fn required<'a>(row: &'a RawRow, field: &'static str) -> Result<&'a str, RecordError> {
    row.get(field).ok_or(RecordError::MissingField { field })
}

fn count(row: &RawRow, field: &'static str, aliases: &[&str]) -> Result<u32, RecordError> {
    let raw = std::iter::once(field)
        .chain(aliases.iter().copied())
        .find_map(|name| row.get(name))
        .ok_or(RecordError::MissingField { field })?;
    raw.parse::<u32>().map_err(|_| RecordError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a `T` or space and a time.
pub fn parse_date(raw: &str) -> Result<NaiveDate, RecordError> {
    let invalid = || RecordError::InvalidDate {
        value: raw.to_string(),
    };
    let day = match raw.as_bytes().get(10) {
        None => raw,
        Some(b'T') | Some(b' ') => raw.get(..10).ok_or_else(invalid)?,
        Some(_) => return Err(invalid()),
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| invalid())
}
