//! CSV datasets: reading raw rows, validating them into records and
//! appending rows fetched by the updater.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod models;
pub mod validate;

use models::*;
pub use validate::{IngestReport, RowRejection};

/// Locations of the two CSV datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub games: PathBuf,
    pub stats: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Raw rows read from one CSV file, plus lines the CSV reader itself could
/// not decode.
#[derive(Debug, Default)]
pub struct RowSet {
    pub rows: Vec<RawRow>,
    pub unreadable: Vec<RowRejection>,
}

/// Read a headed CSV file into raw rows.
pub fn read_rows(path: &Path) -> Result<RowSet, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_rows_from_reader(file).map_err(|source| DatasetError::Csv {
        path: path.display().to_string(),
        source,
    })
}

pub fn read_rows_from_reader<R: Read>(rdr: R) -> Result<RowSet, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut set = RowSet::default();
    for (idx, result) in reader.records().enumerate() {
        // Header occupies line 1.
        let fallback_line = idx as u64 + 2;
        match result {
            Ok(record) => {
                let line = record.position().map_or(fallback_line, |p| p.line());
                let fields: HashMap<String, String> = headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect();
                set.rows.push(RawRow::new(line, fields));
            }
            Err(e) => {
                warn!("Skipping unreadable CSV line {}: {}", fallback_line, e);
                set.unreadable.push(RowRejection {
                    line: fallback_line,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(set)
}

/// Read and validate the games dataset.
pub fn load_games(path: &Path) -> Result<IngestReport<GameRecord>, DatasetError> {
    let set = read_rows(path)?;
    let report = merge(validate::validate_games(set.rows), set.unreadable);
    debug!(
        "Loaded {} games from {} ({} rejected)",
        report.records.len(),
        path.display(),
        report.rejected.len()
    );
    Ok(report)
}

/// Read and validate the player box-score dataset.
pub fn load_player_stats(path: &Path) -> Result<IngestReport<PlayerGameRecord>, DatasetError> {
    let set = read_rows(path)?;
    let report = merge(validate::validate_player_stats(set.rows), set.unreadable);
    debug!(
        "Loaded {} player stat lines from {} ({} rejected)",
        report.records.len(),
        path.display(),
        report.rejected.len()
    );
    Ok(report)
}

fn merge<T>(mut report: IngestReport<T>, unreadable: Vec<RowRejection>) -> IngestReport<T> {
    if !unreadable.is_empty() {
        report.rejected.extend(unreadable);
        report.rejected.sort_by_key(|r| r.line);
    }
    report
}

/// Append rows to a CSV file. The header is written only when the file is
/// new or empty.
pub fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    };
    let csv_err = |source| DatasetError::Csv {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}

pub fn append_games(path: &Path, rows: &[GameRow]) -> Result<(), DatasetError> {
    append_rows(path, rows)
}

pub fn append_player_stats(path: &Path, rows: &[PlayerStatRow]) -> Result<(), DatasetError> {
    append_rows(path, rows)
}

/// Keys already present on disk, used to skip rows the updater has written
/// before.
#[derive(Debug, Default, Clone)]
pub struct ExistingKeys {
    pub game_ids: HashSet<u64>,
    /// `(game_id, player_id)` pairs.
    pub stat_keys: HashSet<(u64, u64)>,
}

/// Collect existing game ids and stat keys. Missing files yield empty sets.
pub fn existing_keys(games_path: &Path, stats_path: &Path) -> Result<ExistingKeys, DatasetError> {
    let mut keys = ExistingKeys::default();

    if games_path.exists() {
        for row in read_rows(games_path)?.rows {
            if let Some(id) = row.get("id").and_then(|v| v.parse().ok()) {
                keys.game_ids.insert(id);
            }
        }
    }
    if stats_path.exists() {
        for row in read_rows(stats_path)?.rows {
            let Some(game_id) = row.get("game_id").and_then(|v| v.parse().ok()) else {
                continue;
            };
            let player_id = row
                .get("player_id")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            keys.stat_keys.insert((game_id, player_id));
        }
    }
    Ok(keys)
}
