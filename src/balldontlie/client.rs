use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::Rng;
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::provider::StatsProvider;
use crate::data::models::{GameRow, PlayerStatRow};
use crate::data::validate::parse_date;

pub const DEFAULT_BASE_URL: &str = "https://api.balldontlie.io/v1";
const PER_PAGE: u32 = 100;
const MAX_ATTEMPTS: u32 = 5;
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Box-score provider backed by the balldontlie.io REST API.
/// Docs: <https://docs.balldontlie.io>
pub struct BallDontLie {
    http: Client,
    api_key: Option<String>,
    /// Base URL for overriding in tests
    base_url: String,
    retry_base: Duration,
}

impl BallDontLie {
    pub fn new(api_key: Option<String>, base_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(BallDontLie {
            http,
            api_key,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            retry_base: Duration::from_secs(1),
        })
    }

    /// First delay before retrying a throttled or failed request.
    #[cfg(test)]
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}/{}", self.base_url, path), params)
            .with_context(|| format!("invalid balldontlie URL for /{}", path))
    }

    /// GET with retries on 429 and 5xx: exponential backoff plus jitter.
    async fn get_text(&self, url: Url) -> Result<String> {
        let mut backoff = self.retry_base;
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("GET {} (attempt {})", url, attempt);

            let mut req = self.http.get(url.clone());
            if let Some(key) = &self.api_key {
                req = req.header(AUTHORIZATION, key);
            }
            let resp = req.send().await.context("balldontlie request failed")?;
            let status = resp.status();
            if status.is_success() {
                return resp
                    .text()
                    .await
                    .context("Failed to read balldontlie response");
            }

            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < MAX_ATTEMPTS {
                let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..250));
                warn!(
                    "balldontlie returned {}, retrying in {:?}",
                    status,
                    backoff + jitter
                );
                tokio::time::sleep(backoff + jitter).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }

            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("balldontlie error {}: {}", status, body);
        }
    }
}

#[async_trait]
impl StatsProvider for BallDontLie {
    fn name(&self) -> &str {
        "balldontlie"
    }

    async fn fetch_games(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<GameRow>> {
        info!("Fetching games from {} to {}", start, end);
        let mut games = Vec::new();
        let mut cursor: Option<u64> = None;

        loop {
            let mut params = vec![
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("postseason", "false".to_string()),
            ];
            if let Some(c) = cursor {
                params.push(("cursor", c.to_string()));
            }
            let body = self.get_text(self.endpoint("games", &params)?).await?;
            let (page, next) = parse_games_page(&body)?;
            games.extend(page);
            debug!("Retrieved games page, total so far: {}", games.len());

            match next {
                Some(c) if cursor != Some(c) => cursor = Some(c),
                _ => break,
            }
        }

        info!("Total completed games fetched: {}", games.len());
        Ok(games)
    }

    async fn fetch_game_stats(&self, game_id: u64) -> Result<Vec<PlayerStatRow>> {
        let mut stats = Vec::new();
        let mut cursor: Option<u64> = None;

        loop {
            let mut params = vec![
                ("game_ids[]", game_id.to_string()),
                ("per_page", PER_PAGE.to_string()),
            ];
            if let Some(c) = cursor {
                params.push(("cursor", c.to_string()));
            }
            let body = self.get_text(self.endpoint("stats", &params)?).await?;
            let (page, next) = parse_stats_page(&body)?;
            stats.extend(page);

            match next {
                Some(c) if cursor != Some(c) => cursor = Some(c),
                _ => break,
            }
        }
        Ok(stats)
    }
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    next_cursor: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiGame {
    id: u64,
    date: String,
    #[serde(default)]
    status: Option<String>,
    home_team: ApiTeam,
    visitor_team: ApiTeam,
    home_team_score: Option<u32>,
    visitor_team_score: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiPlayer {
    id: u64,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    full_name: Option<String>,
}

impl ApiPlayer {
    fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("{} {}", self.first_name.trim(), self.last_name.trim())
                .trim()
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiGameRef {
    id: u64,
}

/// Counting stats are null for players who did not play.
#[derive(Debug, Deserialize)]
struct ApiStat {
    player: ApiPlayer,
    team: ApiTeam,
    game: ApiGameRef,
    #[serde(default)]
    pts: Option<u32>,
    #[serde(default)]
    reb: Option<u32>,
    #[serde(default)]
    ast: Option<u32>,
    #[serde(default)]
    stl: Option<u32>,
    #[serde(default)]
    fgm: Option<u32>,
    #[serde(default)]
    fga: Option<u32>,
    #[serde(default)]
    ftm: Option<u32>,
    #[serde(default)]
    fta: Option<u32>,
}

/// Parse one `/games` page into completed games and the next cursor.
/// Games without both scores, or whose status is not final, are skipped.
fn parse_games_page(body: &str) -> Result<(Vec<GameRow>, Option<u64>)> {
    let page: Page<ApiGame> =
        serde_json::from_str(body).context("Failed to parse balldontlie games page")?;

    let games = page
        .data
        .into_iter()
        .filter_map(|g| {
            if let Some(status) = &g.status {
                if !status.starts_with("Final") {
                    return None;
                }
            }
            let (home_points, away_points) = (g.home_team_score?, g.visitor_team_score?);
            let date = match parse_date(&g.date) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping game {}: {}", g.id, e);
                    return None;
                }
            };
            Some(GameRow {
                id: g.id,
                date,
                home_team: g.home_team.full_name,
                away_team: g.visitor_team.full_name,
                home_points,
                away_points,
            })
        })
        .collect();

    Ok((games, page.meta.next_cursor))
}

fn parse_stats_page(body: &str) -> Result<(Vec<PlayerStatRow>, Option<u64>)> {
    let page: Page<ApiStat> =
        serde_json::from_str(body).context("Failed to parse balldontlie stats page")?;

    let stats = page
        .data
        .into_iter()
        .map(|s| PlayerStatRow {
            game_id: s.game.id,
            player_id: s.player.id,
            player: s.player.display_name(),
            team: s.team.full_name,
            points: s.pts.unwrap_or(0),
            rebounds: s.reb.unwrap_or(0),
            assists: s.ast.unwrap_or(0),
            steals: s.stl.unwrap_or(0),
            fgm: s.fgm.unwrap_or(0),
            fga: s.fga.unwrap_or(0),
            ftm: s.ftm.unwrap_or(0),
            fta: s.fta.unwrap_or(0),
        })
        .collect();

    Ok((stats, page.meta.next_cursor))
}
