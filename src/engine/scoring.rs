//! Weighted points scored and allowed per team, for final-score projection.

use serde::Serialize;
use std::collections::BTreeMap;

use super::weighting::weighted_games;
use super::ModelParams;
use crate::data::models::GameRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamScoringProfile {
    pub average_scored: f64,
    pub average_allowed: f64,
}

/// Team name → scoring profile. Unknown teams read as `{0, 0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoringProfiles {
    profiles: BTreeMap<String, TeamScoringProfile>,
}

impl ScoringProfiles {
    pub fn get(&self, team: &str) -> TeamScoringProfile {
        self.profiles.get(team).copied().unwrap_or_default()
    }
}

#[derive(Default)]
struct PointTotals {
    scored: f64,
    allowed: f64,
    weight: f64,
}

/// Compute scoring profiles using the same weights as the rating model.
pub fn compute_team_scoring(games: &[GameRecord], params: &ModelParams) -> ScoringProfiles {
    let mut totals: BTreeMap<String, PointTotals> = BTreeMap::new();
    for (game, w) in weighted_games(games, params) {
        let home_pts = f64::from(game.home_points);
        let away_pts = f64::from(game.away_points);

        let home = totals.entry(game.home_team.clone()).or_default();
        home.scored += home_pts * w;
        home.allowed += away_pts * w;
        home.weight += w;

        let away = totals.entry(game.away_team.clone()).or_default();
        away.scored += away_pts * w;
        away.allowed += home_pts * w;
        away.weight += w;
    }

    let profiles = totals
        .into_iter()
        .map(|(team, t)| {
            (
                team,
                TeamScoringProfile {
                    average_scored: t.scored / t.weight,
                    average_allowed: t.allowed / t.weight,
                },
            )
        })
        .collect();
    ScoringProfiles { profiles }
}
