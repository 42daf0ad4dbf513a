use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod balldontlie;
mod cli;
mod config;
mod dashboard;
mod data;
mod engine;
mod teams;

use balldontlie::{season_window, update_dataset, BallDontLie};
use config::{Command, Config, UpdateArgs};
use dashboard::AppState;
use data::{load_games, load_player_stats, DatasetPaths};
use engine::ModelSnapshot;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let paths = config.dataset_paths();
    let snapshot = || load_snapshot(&config, &paths);

    match &config.command {
        Command::Predict { home, away } => {
            let snapshot = snapshot()?;
            println!("{}", cli::render_matchup(&snapshot.matchup(home, away)));
        }
        Command::Player { name } => {
            let snapshot = snapshot()?;
            println!("{}", cli::render_player(name, snapshot.player(name)));
        }
        Command::Ratings { limit } => {
            println!("{}", cli::render_ratings(snapshot()?.ratings(), *limit));
        }
        Command::Interactive => {
            let snapshot = snapshot()?;
            let stdin = io::stdin();
            cli::run_interactive(&snapshot, &mut stdin.lock(), &mut io::stdout())?;
        }
        Command::Serve { addr } => {
            let app = dashboard::router(AppState {
                snapshot: Arc::new(snapshot()?),
            });
            let addr: SocketAddr = addr
                .parse()
                .with_context(|| format!("Invalid dashboard address {}", addr))?;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Dashboard listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        // The updater works on files, not models.
        Command::Update(args) => run_update(args, &paths).await?,
    }

    Ok(())
}

fn load_snapshot(config: &Config, paths: &DatasetPaths) -> Result<ModelSnapshot> {
    let games = load_games(&paths.games).context("Failed to load games dataset")?;
    let stats = load_player_stats(&paths.stats).context("Failed to load player stats dataset")?;

    if !games.is_clean() {
        warn!(
            "Skipped {} malformed row(s) in {}",
            games.rejected.len(),
            paths.games.display()
        );
    }
    if !stats.is_clean() {
        warn!(
            "Skipped {} malformed row(s) in {}",
            stats.rejected.len(),
            paths.stats.display()
        );
    }

    Ok(ModelSnapshot::from_reports(games, stats, config.model.params()))
}

async fn run_update(args: &UpdateArgs, paths: &DatasetPaths) -> Result<()> {
    let (season_start, today) = season_window(chrono::Local::now().date_naive());
    let start = args.start.unwrap_or(season_start);
    let end = args.end.unwrap_or(today);
    if start > end {
        anyhow::bail!("--start {} is after --end {}", start, end);
    }

    if args.api_key.is_none() {
        warn!("No BALLDONTLIE_API_KEY set; requests may be rejected");
    }
    let provider = BallDontLie::new(args.api_key.clone(), Some(args.api_url.as_str()))?;

    info!("Fetching games from {} to {}", start, end);
    let summary = update_dataset(&provider, paths, start, end, args.concurrency).await?;
    info!(
        "Update finished: {} fetched, {} new games, {} new player lines, {} failed box scores",
        summary.games_fetched, summary.new_games, summary.new_stat_lines, summary.failed_stat_fetches
    );
    Ok(())
}
