//! Recency decay and trade-date cutover shared by the team models.
//!
//! `w = 1 / (1 + recency_bias * age_days)`, multiplied by
//! `post_trade_weight` for games on or after `trade_date`. Age is measured
//! from the latest game in the dataset, not from today.

use chrono::NaiveDate;

use super::ModelParams;
use crate::data::models::GameRecord;

/// Most recent game date, or `None` for an empty slice.
pub fn latest_date(games: &[GameRecord]) -> Option<NaiveDate> {
    games.iter().map(|g| g.date).max()
}

/// Weight of a game played on `date` when the dataset ends on `latest`.
pub fn game_weight(date: NaiveDate, latest: NaiveDate, params: &ModelParams) -> f64 {
    let age_days = (latest - date).num_days() as f64;
    let mut w = 1.0 / (1.0 + params.recency_bias * age_days);
    if params.trade_date.is_some_and(|cutover| date >= cutover) {
        w *= params.post_trade_weight;
    }
    w
}

/// Pair every game with its weight, in input order.
pub fn weighted_games<'a>(
    games: &'a [GameRecord],
    params: &'a ModelParams,
) -> impl Iterator<Item = (&'a GameRecord, f64)> + 'a {
    let latest = latest_date(games);
    games.iter().filter_map(move |g| {
        latest.map(|latest| (g, game_weight(g.date, latest, params)))
    })
}
