//! Rating and prediction engine.
//!
//! Every function here is a pure transformation over immutable records:
//! the same `(records, params)` always produce the same models. Derived
//! models are rebuilt from scratch on each dataset load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod players;
pub mod prediction;
pub mod ratings;
pub mod scoring;
pub mod snapshot;
pub mod weighting;

pub use players::PlayerAverages;
pub use ratings::TeamRatings;
pub use snapshot::{Matchup, ModelSnapshot, SnapshotStatus};

/// Decay constant applied per day of game age.
pub const DEFAULT_RECENCY_BIAS: f64 = 0.02;
/// Multiplier for games on or after the trade date.
pub const DEFAULT_POST_TRADE_WEIGHT: f64 = 1.5;
/// Home-court amplification of the home team's rating.
pub const DEFAULT_HOME_WEIGHT: f64 = 1.1;
/// Steepness of the logistic squash.
pub const DEFAULT_LOGISTIC_K: f64 = 0.1;
/// Points added to the home side of a projected final score.
pub const DEFAULT_HOME_ADVANTAGE: f64 = 3.0;

/// Tunable engine parameters, passed explicitly into every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub recency_bias: f64,
    /// Roster-change cutover. Games dated on or after it are boosted.
    pub trade_date: Option<NaiveDate>,
    pub post_trade_weight: f64,
    pub home_weight: f64,
    pub logistic_k: f64,
    pub home_advantage: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            recency_bias: DEFAULT_RECENCY_BIAS,
            trade_date: None,
            post_trade_weight: DEFAULT_POST_TRADE_WEIGHT,
            home_weight: DEFAULT_HOME_WEIGHT,
            logistic_k: DEFAULT_LOGISTIC_K,
            home_advantage: DEFAULT_HOME_ADVANTAGE,
        }
    }
}

impl ModelParams {
    /// Plain averages: no decay, no trade boost, no home amplification.
    pub fn unweighted() -> Self {
        ModelParams {
            recency_bias: 0.0,
            trade_date: None,
            home_weight: 1.0,
            ..Self::default()
        }
    }
}
