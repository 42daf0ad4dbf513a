//! Dataset updater: pulls completed games and box scores from a
//! [`StatsProvider`] and appends whatever is not on disk yet.

pub mod client;
pub mod provider;

pub use client::BallDontLie;
pub use provider::StatsProvider;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::data::models::{GameRow, PlayerStatRow};
use crate::data::{append_games, append_player_stats, existing_keys, DatasetPaths};

/// Starting year of the season `today` belongs to. Seasons tip off in
/// October.
pub fn current_season_start(today: NaiveDate) -> i32 {
    if today.month() >= 10 {
        today.year()
    } else {
        today.year() - 1
    }
}

/// October 1st of the current season through `today`.
pub fn season_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(current_season_start(today), 10, 1).unwrap_or(today);
    (start, today)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub games_fetched: usize,
    pub new_games: usize,
    pub new_stat_lines: usize,
    pub failed_stat_fetches: usize,
}

/// Fetch games in `[start, end]`, skip ids already on disk, fetch stats for
/// each new game (at most `concurrency` requests in flight) and append both
/// CSV files. A game whose stats fetch fails is logged and left out of both
/// files, so the next run picks it up again.
pub async fn update_dataset(
    provider: &dyn StatsProvider,
    paths: &DatasetPaths,
    start: NaiveDate,
    end: NaiveDate,
    concurrency: usize,
) -> Result<UpdateSummary> {
    let mut keys = existing_keys(&paths.games, &paths.stats)
        .context("Failed to read existing dataset keys")?;

    let fetched = provider
        .fetch_games(start, end)
        .await
        .with_context(|| format!("Error fetching games from {}", provider.name()))?;

    let mut summary = UpdateSummary {
        games_fetched: fetched.len(),
        ..UpdateSummary::default()
    };

    let candidates: Vec<GameRow> = fetched
        .into_iter()
        .filter(|g| keys.game_ids.insert(g.id))
        .collect();

    let ids: Vec<u64> = candidates.iter().map(|g| g.id).collect();
    let results: Vec<(u64, Result<Vec<PlayerStatRow>>)> = stream::iter(ids)
        .map(|id| async move { (id, provider.fetch_game_stats(id).await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut new_stats: Vec<PlayerStatRow> = Vec::new();
    let mut seen_in_batch: HashSet<(u64, u64)> = HashSet::new();
    let mut failed: HashSet<u64> = HashSet::new();
    for (game_id, result) in results {
        match result {
            Ok(rows) => new_stats.extend(rows.into_iter().filter(|s| {
                let key = (s.game_id, s.player_id);
                !keys.stat_keys.contains(&key) && seen_in_batch.insert(key)
            })),
            Err(e) => {
                warn!("Failed to fetch stats for game {}: {:#}", game_id, e);
                failed.insert(game_id);
            }
        }
    }

    let new_games: Vec<GameRow> = candidates
        .into_iter()
        .filter(|g| !failed.contains(&g.id))
        .collect();
    summary.new_games = new_games.len();
    summary.new_stat_lines = new_stats.len();
    summary.failed_stat_fetches = failed.len();

    if new_games.is_empty() {
        info!("No new games found");
    } else {
        append_games(&paths.games, &new_games)?;
        info!("{} new games added to {}", new_games.len(), paths.games.display());
    }

    if new_stats.is_empty() {
        info!("No new player stats found");
    } else {
        append_player_stats(&paths.stats, &new_stats)?;
        info!(
            "{} new player stat lines added to {}",
            new_stats.len(),
            paths.stats.display()
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{load_games, load_player_stats};
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct FakeProvider {
        games: Vec<GameRow>,
        failing_game: Option<u64>,
    }

    fn game(id: u64, day: u32) -> GameRow {
        GameRow {
            id,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            home_team: "Denver Nuggets".into(),
            away_team: "Phoenix Suns".into(),
            home_points: 112,
            away_points: 104,
        }
    }

    fn line(game_id: u64, player_id: u64, name: &str) -> PlayerStatRow {
        PlayerStatRow {
            game_id,
            player_id,
            player: name.into(),
            team: "Denver Nuggets".into(),
            points: 25,
            rebounds: 12,
            assists: 9,
            steals: 1,
            fgm: 10,
            fga: 18,
            ftm: 5,
            fta: 6,
        }
    }

    #[async_trait]
    impl StatsProvider for FakeProvider {
        async fn fetch_games(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<GameRow>> {
            Ok(self.games.clone())
        }

        async fn fetch_game_stats(&self, game_id: u64) -> Result<Vec<PlayerStatRow>> {
            if self.failing_game == Some(game_id) {
                anyhow::bail!("boom");
            }
            Ok(vec![line(game_id, 1, "Nikola Jokic"), line(game_id, 2, "Jamal Murray")])
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn scratch_paths(name: &str) -> DatasetPaths {
        let dir: PathBuf =
            std::env::temp_dir().join(format!("hoopcast_update_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        DatasetPaths {
            games: dir.join("games.csv"),
            stats: dir.join("player_stats.csv"),
        }
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn season_start_rolls_over_in_october() {
        assert_eq!(current_season_start(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()), 2023);
        assert_eq!(current_season_start(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()), 2024);
        let (start, end) = season_window(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
    }

    #[tokio::test]
    async fn second_run_adds_nothing() {
        let paths = scratch_paths("rerun");
        let provider = FakeProvider {
            games: vec![game(1, 5), game(2, 6)],
            failing_game: None,
        };
        let (start, end) = window();

        let first = update_dataset(&provider, &paths, start, end, 4).await.unwrap();
        assert_eq!(first.new_games, 2);
        assert_eq!(first.new_stat_lines, 4);

        let second = update_dataset(&provider, &paths, start, end, 4).await.unwrap();
        assert_eq!(second.games_fetched, 2);
        assert_eq!(second.new_games, 0);
        assert_eq!(second.new_stat_lines, 0);

        let games = load_games(&paths.games).unwrap();
        assert_eq!(games.records.len(), 2);
        assert!(games.is_clean());
        let stats = load_player_stats(&paths.stats).unwrap();
        assert_eq!(stats.records.len(), 4);
    }

    #[tokio::test]
    async fn failed_stats_fetch_is_retried_next_run() {
        let paths = scratch_paths("failing");
        let (start, end) = window();
        let flaky = FakeProvider {
            games: vec![game(10, 5), game(11, 6)],
            failing_game: Some(11),
        };

        let summary = update_dataset(&flaky, &paths, start, end, 1).await.unwrap();
        assert_eq!(summary.new_games, 1);
        assert_eq!(summary.failed_stat_fetches, 1);
        assert_eq!(summary.new_stat_lines, 2);
        assert_eq!(load_games(&paths.games).unwrap().records.len(), 1);

        let healthy = FakeProvider {
            games: vec![game(10, 5), game(11, 6)],
            failing_game: None,
        };
        let summary = update_dataset(&healthy, &paths, start, end, 1).await.unwrap();
        assert_eq!(summary.new_games, 1);
        assert_eq!(summary.new_stat_lines, 2);
        assert_eq!(load_games(&paths.games).unwrap().records.len(), 2);
        assert_eq!(load_player_stats(&paths.stats).unwrap().records.len(), 4);
    }

    #[tokio::test]
    async fn duplicate_ids_in_one_batch_written_once() {
        let paths = scratch_paths("dupes");
        let provider = FakeProvider {
            games: vec![game(5, 5), game(5, 5)],
            failing_game: None,
        };
        let (start, end) = window();

        let summary = update_dataset(&provider, &paths, start, end, 2).await.unwrap();
        assert_eq!(summary.games_fetched, 2);
        assert_eq!(summary.new_games, 1);
        assert_eq!(summary.new_stat_lines, 2);
    }
}
