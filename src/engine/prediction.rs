//! Win probability and final-score projection for a single matchup.
//!
//! Unknown teams are never an error: they rate 0 and score `{0, 0}`.

use serde::Serialize;

use super::ratings::TeamRatings;
use super::scoring::ScoringProfiles;
use super::ModelParams;

/// Outcome of [`predict_outcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamePrediction {
    pub home_team: String,
    pub away_team: String,
    pub home_rating: f64,
    pub away_rating: f64,
    pub home_weight: f64,
    /// `home_rating * home_weight - away_rating`
    pub diff: f64,
    pub win_probability: f64,
    pub rationale: String,
}

impl GamePrediction {
    /// Team favoured to win. The home side takes a dead-even matchup.
    pub fn favorite(&self) -> &str {
        if self.win_probability >= 0.5 {
            &self.home_team
        } else {
            &self.away_team
        }
    }

    /// One-sentence verdict for dashboards.
    pub fn verdict(&self) -> String {
        format!(
            "{} are predicted to win because their rating is higher than the opponent's by {:.2} points, based on season performance.",
            self.favorite(),
            self.diff.abs()
        )
    }
}

/// Rounded final score from [`predict_final_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScorePrediction {
    pub home_score: i64,
    pub away_score: i64,
}

/// Logistic squash of `x` with steepness `k`.
pub fn logistic(x: f64, k: f64) -> f64 {
    let z = k * x;
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

pub fn predict_outcome(
    home_team: &str,
    away_team: &str,
    ratings: &TeamRatings,
    params: &ModelParams,
) -> GamePrediction {
    let home_rating = ratings.get(home_team);
    let away_rating = ratings.get(away_team);
    let weighted_home = home_rating * params.home_weight;
    let diff = weighted_home - away_rating;
    let win_probability = logistic(diff, params.logistic_k);

    let rationale = format!(
        "Home rating {:.2} (x{:.2} home weight = {:.2}), Away rating {:.2}, diff {:.2} -> prob {:.3}",
        home_rating, params.home_weight, weighted_home, away_rating, diff, win_probability
    );

    GamePrediction {
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        home_rating,
        away_rating,
        home_weight: params.home_weight,
        diff,
        win_probability,
        rationale,
    }
}

/// Average each side's offence against the other's defence, add the home
/// advantage, and round half away from zero.
pub fn predict_final_score(
    home_team: &str,
    away_team: &str,
    profiles: &ScoringProfiles,
    params: &ModelParams,
) -> ScorePrediction {
    let home = profiles.get(home_team);
    let away = profiles.get(away_team);
    let home_score = (home.average_scored + away.average_allowed) / 2.0 + params.home_advantage;
    let away_score = (away.average_scored + home.average_allowed) / 2.0;
    ScorePrediction {
        home_score: home_score.round() as i64,
        away_score: away_score.round() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::GameRecord;
    use crate::engine::ratings::compute_team_ratings;
    use crate::engine::scoring::compute_team_scoring;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn one_game() -> Vec<GameRecord> {
        vec![GameRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            home_team: "A".into(),
            away_team: "B".into(),
            home_points: 100,
            away_points: 90,
        }]
    }

    fn params(home_weight: f64) -> ModelParams {
        ModelParams {
            recency_bias: 0.0,
            home_weight,
            ..ModelParams::default()
        }
    }

    #[test]
    fn neutral_home_weight_scenario() {
        let p = params(1.0);
        let ratings = compute_team_ratings(&one_game(), &p);
        let pred = predict_outcome("A", "B", &ratings, &p);
        assert_relative_eq!(pred.diff, 20.0);
        assert_relative_eq!(pred.win_probability, 1.0 / (1.0 + (-2.0f64).exp()), epsilon = 1e-12);
        assert_relative_eq!(pred.win_probability, 0.8808, epsilon = 1e-4);
        assert_eq!(pred.favorite(), "A");
    }

    #[test]
    fn amplified_home_weight_scenario() {
        let p = params(1.2);
        let ratings = compute_team_ratings(&one_game(), &p);
        let pred = predict_outcome("A", "B", &ratings, &p);
        assert_relative_eq!(pred.diff, 22.0, epsilon = 1e-12);
        assert_relative_eq!(pred.win_probability, 0.9002, epsilon = 1e-4);
    }

    #[test]
    fn home_weight_only_scales_home_rating() {
        let p = params(1.2);
        let ratings = compute_team_ratings(&one_game(), &p);
        // Home team B has a negative rating; amplification makes it worse.
        let pred = predict_outcome("B", "A", &ratings, &p);
        assert_relative_eq!(pred.diff, -12.0 - 10.0, epsilon = 1e-12);
        assert_eq!(pred.favorite(), "A");
    }

    #[test]
    fn unknown_teams_are_even() {
        let pred = predict_outcome("X", "Y", &TeamRatings::default(), &ModelParams::default());
        assert_eq!(pred.home_rating, 0.0);
        assert_eq!(pred.away_rating, 0.0);
        assert_eq!(pred.win_probability, 0.5);
    }

    #[test]
    fn probability_strictly_increasing_in_diff() {
        let mut prev = logistic(-100.0, 0.1);
        for step in -99..=100 {
            let p = logistic(step as f64, 0.1);
            assert!(p > prev, "not increasing at diff {}", step);
            prev = p;
        }
        assert_eq!(logistic(0.0, 0.1), 0.5);
    }

    #[test]
    fn rationale_reports_the_numbers() {
        let p = params(1.2);
        let ratings = compute_team_ratings(&one_game(), &p);
        let pred = predict_outcome("A", "B", &ratings, &p);
        assert_eq!(
            pred.rationale,
            "Home rating 10.00 (x1.20 home weight = 12.00), Away rating -10.00, diff 22.00 -> prob 0.900"
        );
    }

    #[test]
    fn verdict_names_favorite() {
        let p = params(1.0);
        let ratings = compute_team_ratings(&one_game(), &p);
        let pred = predict_outcome("B", "A", &ratings, &p);
        assert!(pred.verdict().starts_with("A are predicted to win"));
        assert!(pred.verdict().contains("by 20.00 points"));
    }

    #[test]
    fn final_score_formula() {
        let p = params(1.0);
        let profiles = compute_team_scoring(&one_game(), &p);
        let score = predict_final_score("A", "B", &profiles, &p);
        // (100 + 100) / 2 + 3, (90 + 90) / 2
        assert_eq!(score, ScorePrediction { home_score: 103, away_score: 90 });
    }

    #[test]
    fn final_score_rounds_half_away_from_zero() {
        let games = vec![GameRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            home_team: "A".into(),
            away_team: "B".into(),
            home_points: 101,
            away_points: 90,
        }];
        let p = ModelParams { home_advantage: 0.0, ..params(1.0) };
        let profiles = compute_team_scoring(&games, &p);
        // A vs B: (101 + 101) / 2 = 101; B vs A at home: (90 + 90) / 2 = 90
        let score = predict_final_score("A", "B", &profiles, &p);
        assert_eq!(score.home_score, 101);
        let half = predict_final_score("Z", "B", &profiles, &p);
        // (0 + 101) / 2 = 50.5 -> 51, (90 + 0) / 2 = 45
        assert_eq!(half, ScorePrediction { home_score: 51, away_score: 45 });
    }

    #[test]
    fn final_score_is_deterministic() {
        let p = ModelParams::default();
        let profiles = compute_team_scoring(&one_game(), &p);
        let first = predict_final_score("A", "B", &profiles, &p);
        for _ in 0..10 {
            assert_eq!(predict_final_score("A", "B", &profiles, &p), first);
        }
    }

    #[test]
    fn unknown_teams_score_only_home_advantage() {
        let score = predict_final_score("X", "Y", &ScoringProfiles::default(), &ModelParams::default());
        assert_eq!(score, ScorePrediction { home_score: 3, away_score: 0 });
    }
}
