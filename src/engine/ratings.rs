//! Team strength as a weighted average point differential per game.

use serde::Serialize;
use std::collections::BTreeMap;

use super::weighting::weighted_games;
use super::ModelParams;
use crate::data::models::GameRecord;

/// Team name → rating. Positive ratings favour the team.
///
/// Lookups for a team that played no games return `0.0`: an unseen team is
/// treated as exactly average.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TeamRatings {
    ratings: BTreeMap<String, f64>,
}

impl TeamRatings {
    pub fn get(&self, team: &str) -> f64 {
        self.ratings.get(team).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ratings.iter().map(|(t, r)| (t.as_str(), *r))
    }

    /// Teams ordered strongest first; ties broken by name.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut rows: Vec<_> = self.iter().collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

impl FromIterator<(String, f64)> for TeamRatings {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        TeamRatings {
            ratings: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct DiffTotals {
    pub weighted_diff: f64,
    pub weight: f64,
}

/// Per-team weighted differential sums before normalisation.
pub(crate) fn accumulate(games: &[GameRecord], params: &ModelParams) -> BTreeMap<String, DiffTotals> {
    let mut totals: BTreeMap<String, DiffTotals> = BTreeMap::new();
    for (game, w) in weighted_games(games, params) {
        let diff = game.point_diff() as f64;

        let home = totals.entry(game.home_team.clone()).or_default();
        home.weighted_diff += diff * w;
        home.weight += w;

        let away = totals.entry(game.away_team.clone()).or_default();
        away.weighted_diff -= diff * w;
        away.weight += w;
    }
    totals
}

/// Compute ratings for every team that appears in `games`.
///
/// With `recency_bias = 0` and no trade date this is the plain mean point
/// differential per game.
pub fn compute_team_ratings(games: &[GameRecord], params: &ModelParams) -> TeamRatings {
    accumulate(games, params)
        .into_iter()
        .map(|(team, t)| (team, t.weighted_diff / t.weight))
        .collect()
}
