//! All derived models for one dataset load.
//!
//! Built once from validated records, then only read. Front-ends share it
//! behind an `Arc` and never mutate it; reloading means building a new one.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use super::players::{compute_player_averages, compute_rosters, predict_player, PlayerAverages, Rosters};
use super::prediction::{predict_final_score, predict_outcome, GamePrediction, ScorePrediction};
use super::ratings::{compute_team_ratings, TeamRatings};
use super::scoring::{compute_team_scoring, ScoringProfiles};
use super::ModelParams;
use crate::data::models::{GameRecord, PlayerGameRecord};
use crate::data::{IngestReport, RowRejection};
use crate::teams::team_choices;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotStatus {
    pub games: usize,
    pub player_lines: usize,
    pub teams_rated: usize,
    pub players: usize,
    pub rejected_game_rows: Vec<RowRejection>,
    pub rejected_player_rows: Vec<RowRejection>,
}

/// Everything a front-end needs to answer a matchup query.
#[derive(Debug, Clone, Serialize)]
pub struct Matchup {
    pub prediction: GamePrediction,
    pub score: ScorePrediction,
    pub home_players: Vec<String>,
    pub away_players: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    params: ModelParams,
    ratings: TeamRatings,
    scoring: ScoringProfiles,
    player_averages: BTreeMap<String, PlayerAverages>,
    rosters: Rosters,
    status: SnapshotStatus,
}

impl ModelSnapshot {
    pub fn build(games: &[GameRecord], stats: &[PlayerGameRecord], params: ModelParams) -> Self {
        let ratings = compute_team_ratings(games, &params);
        let scoring = compute_team_scoring(games, &params);
        let player_averages = compute_player_averages(stats);
        let rosters = compute_rosters(stats);
        let status = SnapshotStatus {
            games: games.len(),
            player_lines: stats.len(),
            teams_rated: ratings.len(),
            players: player_averages.len(),
            ..SnapshotStatus::default()
        };
        info!(
            "Models built: {} games, {} teams rated, {} players",
            status.games, status.teams_rated, status.players
        );
        ModelSnapshot {
            params,
            ratings,
            scoring,
            player_averages,
            rosters,
            status,
        }
    }

    /// Build from ingest reports, keeping their rejections for display.
    pub fn from_reports(
        games: IngestReport<GameRecord>,
        stats: IngestReport<PlayerGameRecord>,
        params: ModelParams,
    ) -> Self {
        let mut snapshot = Self::build(&games.records, &stats.records, params);
        snapshot.status.rejected_game_rows = games.rejected;
        snapshot.status.rejected_player_rows = stats.rejected;
        snapshot
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn ratings(&self) -> &TeamRatings {
        &self.ratings
    }

    pub fn status(&self) -> &SnapshotStatus {
        &self.status
    }

    pub fn matchup(&self, home_team: &str, away_team: &str) -> Matchup {
        Matchup {
            prediction: predict_outcome(home_team, away_team, &self.ratings, &self.params),
            score: predict_final_score(home_team, away_team, &self.scoring, &self.params),
            home_players: self.roster(home_team),
            away_players: self.roster(away_team),
        }
    }

    pub fn player(&self, name: &str) -> Option<&PlayerAverages> {
        predict_player(name, &self.player_averages)
    }

    /// Players on a team's roster; empty for an unknown team.
    pub fn roster(&self, team: &str) -> Vec<String> {
        self.rosters
            .get(team)
            .map(|players| players.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// League directory plus any team seen in games or player lines.
    pub fn teams(&self) -> Vec<String> {
        let seen: BTreeSet<&str> = self
            .ratings
            .iter()
            .map(|(t, _)| t)
            .chain(self.rosters.keys().map(String::as_str))
            .collect();
        team_choices(seen)
    }

    pub fn players(&self) -> Vec<String> {
        self.player_averages.keys().cloned().collect()
    }
}
