use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::balldontlie::client::DEFAULT_BASE_URL;
use crate::data::DatasetPaths;
use crate::engine::ModelParams;

/// Basketball ratings, win probabilities and player averages
#[derive(Parser, Debug, Clone)]
#[command(name = "hoopcast", version, about)]
pub struct Config {
    /// Games CSV (date, home_team, away_team, home_points, away_points)
    #[arg(long, env = "HOOPCAST_GAMES", default_value = "data/sample_games.csv")]
    pub games: PathBuf,

    /// Player box-score CSV (player, team, points, rebounds, assists, steals, fgm, fga, ftm, fta)
    #[arg(long, env = "HOOPCAST_STATS", default_value = "data/sample_player_stats.csv")]
    pub stats: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Engine parameters. Each one can be overridden per run.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Per-day decay constant for older games (0 disables decay)
    #[arg(long, env = "HOOPCAST_RECENCY_BIAS", default_value = "0.02", allow_hyphen_values = true)]
    pub recency_bias: f64,

    /// Roster-change cutover date (YYYY-MM-DD); later games are boosted
    #[arg(long, env = "HOOPCAST_TRADE_DATE")]
    pub trade_date: Option<NaiveDate>,

    /// Weight multiplier for games on or after --trade-date
    #[arg(long, env = "HOOPCAST_POST_TRADE_WEIGHT", default_value = "1.5", allow_hyphen_values = true)]
    pub post_trade_weight: f64,

    /// Multiplier applied to the home team's rating
    #[arg(long, env = "HOOPCAST_HOME_WEIGHT", default_value = "1.1", allow_hyphen_values = true)]
    pub home_weight: f64,

    /// Steepness of the logistic win-probability curve
    #[arg(long, env = "HOOPCAST_LOGISTIC_K", default_value = "0.1", allow_hyphen_values = true)]
    pub logistic_k: f64,

    /// Points added to the home team's projected score
    #[arg(long, env = "HOOPCAST_HOME_ADVANTAGE", default_value = "3", allow_hyphen_values = true)]
    pub home_advantage: f64,
}

impl ModelArgs {
    pub fn params(&self) -> ModelParams {
        ModelParams {
            recency_bias: self.recency_bias,
            trade_date: self.trade_date,
            post_trade_weight: self.post_trade_weight,
            home_weight: self.home_weight,
            logistic_k: self.logistic_k,
            home_advantage: self.home_advantage,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Predict a game: win probability, final score and rosters
    Predict {
        /// Home team name
        home: String,
        /// Away team name
        away: String,
    },
    /// Show a player's season averages
    Player {
        /// Player name
        name: String,
    },
    /// List team ratings, strongest first
    Ratings {
        /// Only show the top N teams
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Menu-driven prompt on stdin
    Interactive,
    /// Serve the web dashboard
    Serve {
        /// Dashboard listen address
        #[arg(long, env = "HOOPCAST_DASHBOARD_ADDR", default_value = "127.0.0.1:8080")]
        addr: String,
    },
    /// Append new games and box scores from balldontlie.io
    Update(UpdateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// First game date to fetch (defaults to October 1st of the current season)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last game date to fetch (defaults to today)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// balldontlie API key
    #[arg(long, env = "BALLDONTLIE_API_KEY")]
    pub api_key: Option<String>,

    /// balldontlie API base URL
    #[arg(long, env = "BALLDONTLIE_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Box-score requests in flight at once
    #[arg(long, default_value = "4")]
    pub concurrency: usize,
}

impl Config {
    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths {
            games: self.games.clone(),
            stats: self.stats.clone(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.model;
        for (name, value) in [
            ("recency_bias", m.recency_bias),
            ("post_trade_weight", m.post_trade_weight),
            ("home_weight", m.home_weight),
            ("logistic_k", m.logistic_k),
            ("home_advantage", m.home_advantage),
        ] {
            if !value.is_finite() {
                anyhow::bail!("{} must be a finite number", name);
            }
        }

        match &self.command {
            Command::Predict { home, away } if home == away => {
                anyhow::bail!("Teams must be different");
            }
            Command::Update(args) => {
                if args.concurrency == 0 {
                    anyhow::bail!("concurrency must be at least 1");
                }
                if let (Some(start), Some(end)) = (args.start, args.end) {
                    if start > end {
                        anyhow::bail!("--start {} is after --end {}", start, end);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
