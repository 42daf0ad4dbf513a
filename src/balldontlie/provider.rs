use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::data::models::{GameRow, PlayerStatRow};

/// Trait that every box-score source must implement.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Completed regular-season games dated within `[start, end]`.
    async fn fetch_games(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<GameRow>>;

    /// Every player's stat line for one game.
    async fn fetch_game_stats(&self, game_id: u64) -> Result<Vec<PlayerStatRow>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
