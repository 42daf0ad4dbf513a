use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::engine::{Matchup, ModelParams, ModelSnapshot, PlayerAverages, SnapshotStatus};

#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<ModelSnapshot>,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/players", get(players_handler))
        .route("/api/ratings", get(ratings_handler))
        .route("/api/predict", get(predict_handler))
        .route("/api/player", get(player_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub home: String,
    pub away: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub name: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    #[serde(flatten)]
    status: SnapshotStatus,
    params: ModelParams,
}

#[derive(Debug, Serialize)]
struct RatingRow {
    team: String,
    rating: f64,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    #[serde(flatten)]
    matchup: Matchup,
    favorite: String,
    verdict: String,
}

#[derive(Debug, Serialize)]
struct PlayerResponse {
    name: String,
    #[serde(flatten)]
    averages: PlayerAverages,
}

/// Serve the dashboard HTML page.
async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        status: state.snapshot.status().clone(),
        params: *state.snapshot.params(),
    })
}

/// GET /api/teams
async fn teams_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.snapshot.teams())
}

/// GET /api/players
async fn players_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.snapshot.players())
}

/// GET /api/ratings
async fn ratings_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rows: Vec<RatingRow> = state
        .snapshot
        .ratings()
        .ranked()
        .into_iter()
        .map(|(team, rating)| RatingRow {
            team: team.to_string(),
            rating,
        })
        .collect();
    Json(rows)
}

/// GET /api/predict?home=..&away=..
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PredictQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let home = q.home.trim();
    let away = q.away.trim();
    if home.is_empty() || away.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Choose two teams.".to_string()));
    }
    if home == away {
        return Err((StatusCode::BAD_REQUEST, "Choose two different teams.".to_string()));
    }
    let matchup = state.snapshot.matchup(home, away);
    Ok(Json(PredictResponse {
        favorite: matchup.prediction.favorite().to_string(),
        verdict: matchup.prediction.verdict(),
        matchup,
    }))
}

/// GET /api/player?name=..
async fn player_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PlayerQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let name = q.name.trim();
    match state.snapshot.player(name) {
        Some(averages) => Ok(Json(PlayerResponse {
            name: name.to_string(),
            averages: *averages,
        })),
        None => Err((StatusCode::NOT_FOUND, format!("No data for player {}", name))),
    }
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Hoopcast</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #ff7a1a;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .two-col { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
  @media (max-width: 768px) { .two-col { grid-template-columns: 1fr; } }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel-header { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; }
  .panel-body { padding: 1.2rem; display: grid; gap: .8rem; }
  label { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; }
  select, button { width: 100%; padding: .5rem; border-radius: 6px; border: 1px solid var(--border); background: var(--bg); color: var(--text); }
  button { background: var(--accent); color: #000; font-weight: 700; cursor: pointer; border: none; }
  .result { text-align: center; padding: 1rem; }
  .result h2 { font-size: 1.5rem; margin-bottom: .5rem; }
  .muted { color: var(--muted); font-size: .85rem; }
  .error { color: var(--red); }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  td { padding: .55rem 1rem; font-size: .88rem; border-bottom: 1px solid #1e2130; }
  .pos { color: var(--green); }
  .neg { color: var(--red); }
</style>
</head>
<body>
<header>
  <h1>🏀 Hoopcast</h1>
  <span style="margin-left:auto;" class="muted" id="status"></span>
</header>

<main>
  <div class="two-col">
    <div class="panel">
      <div class="panel-header">Game Outcome</div>
      <div class="panel-body">
        <label for="home">Home Team</label><select id="home"></select>
        <label for="away">Away Team</label><select id="away"></select>
        <button onclick="predictGame()">Predict</button>
        <div class="result" id="game-result"></div>
      </div>
    </div>

    <div class="panel">
      <div class="panel-header">Player Averages</div>
      <div class="panel-body">
        <label for="player">Player</label><select id="player"></select>
        <button onclick="showPlayer()">Predict</button>
        <div class="result" id="player-result"></div>
      </div>
    </div>
  </div>

  <div class="panel">
    <div class="panel-header">Team Ratings</div>
    <table>
      <thead><tr><th>#</th><th>Team</th><th>Rating</th></tr></thead>
      <tbody id="ratings-tbody"><tr><td colspan="3" class="muted">Loading…</td></tr></tbody>
    </table>
  </div>
</main>

<script>
const pct = v => (v*100).toFixed(1)+'%';
const esc = s => String(s).replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
const fill = (id, items, idx) => {
  const el = document.getElementById(id);
  el.innerHTML = items.map(t => `<option>${esc(t)}</option>`).join('');
  if (items.length > idx) el.selectedIndex = idx;
};

async function loadPickers() {
  const [teams, players] = await Promise.all([fetch('/api/teams'), fetch('/api/players')]);
  if (teams.ok) { const t = await teams.json(); fill('home', t, 0); fill('away', t, 1); }
  if (players.ok) fill('player', await players.json(), 0);
}

async function loadStatus() {
  const r = await fetch('/api/status');
  if (!r.ok) return;
  const s = await r.json();
  const skipped = s.rejected_game_rows.length + s.rejected_player_rows.length;
  document.getElementById('status').textContent =
    `${s.games} games · ${s.player_lines} player lines` + (skipped ? ` · ${skipped} bad rows skipped` : '');
}

async function loadRatings() {
  const r = await fetch('/api/ratings');
  if (!r.ok) return;
  const rows = await r.json();
  const tbody = document.getElementById('ratings-tbody');
  if (!rows.length) { tbody.innerHTML = '<tr><td colspan="3" class="muted">No games loaded</td></tr>'; return; }
  tbody.innerHTML = rows.map((row, i) => `<tr>
    <td>${i+1}</td><td>${esc(row.team)}</td>
    <td class="${row.rating >= 0 ? 'pos' : 'neg'}">${(row.rating >= 0 ? '+' : '') + row.rating.toFixed(2)}</td>
  </tr>`).join('');
}

async function predictGame() {
  const home = document.getElementById('home').value;
  const away = document.getElementById('away').value;
  const out = document.getElementById('game-result');
  const r = await fetch(`/api/predict?home=${encodeURIComponent(home)}&away=${encodeURIComponent(away)}`);
  if (!r.ok) { out.innerHTML = `<p class="error">${esc(await r.text())}</p>`; return; }
  const m = await r.json();
  const p = m.prediction;
  out.innerHTML = `<h2>${esc(m.favorite)} 🏆</h2>
    <p>${esc(m.verdict)}</p>
    <p>Win probability for ${esc(p.home_team)}: ${pct(p.win_probability)}</p>
    <p>Predicted score: ${esc(p.home_team)} ${m.score.home_score} – ${esc(p.away_team)} ${m.score.away_score}</p>
    <p class="muted">${esc(p.rationale)}</p>`;
}

async function showPlayer() {
  const name = document.getElementById('player').value;
  const out = document.getElementById('player-result');
  const r = await fetch(`/api/player?name=${encodeURIComponent(name)}`);
  if (!r.ok) { out.innerHTML = `<p class="error">${esc(await r.text())}</p>`; return; }
  const s = await r.json();
  out.innerHTML = `<h2>${esc(s.name)}</h2>
    <p>Points: ${s.points.toFixed(1)} · Rebounds: ${s.rebounds.toFixed(1)} · Assists: ${s.assists.toFixed(1)} · Steals: ${s.steals.toFixed(1)}</p>
    <p>FG: ${pct(s.fg_pct)} · FT: ${pct(s.ft_pct)}</p>
    <p class="muted">${s.games} games</p>`;
}

loadPickers();
loadStatus();
loadRatings();
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{GameRecord, PlayerGameRecord};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt;

    fn app() -> Router {
        let games = vec![GameRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            home_team: "Boston Celtics".into(),
            away_team: "Miami Heat".into(),
            home_points: 100,
            away_points: 90,
        }];
        let stats = vec![PlayerGameRecord {
            player: "Jayson Tatum".into(),
            team: "Boston Celtics".into(),
            points: 30,
            rebounds: 8,
            assists: 4,
            steals: 1,
            field_goals_made: 11,
            field_goals_attempted: 20,
            free_throws_made: 6,
            free_throws_attempted: 8,
        }];
        let snapshot = ModelSnapshot::build(&games, &stats, ModelParams::unweighted());
        router(AppState {
            snapshot: Arc::new(snapshot),
        })
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request");
        let response = app().oneshot(request).await.expect("router request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn index_serves_html() {
        let (status, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Hoopcast</title>"));
    }

    #[tokio::test]
    async fn predict_returns_matchup() {
        let (status, body) = get("/api/predict?home=Boston%20Celtics&away=Miami%20Heat").await;
        assert_eq!(status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["favorite"], "Boston Celtics");
        assert_eq!(v["score"]["home_score"], 103);
        assert_eq!(v["home_players"][0], "Jayson Tatum");
        let p = v["prediction"]["win_probability"].as_f64().unwrap();
        assert!((p - 0.8808).abs() < 1e-4);
    }

    #[tokio::test]
    async fn predict_same_team_is_bad_request() {
        let (status, _) = get("/api/predict?home=Miami%20Heat&away=Miami%20Heat").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_teams_predict_even() {
        let (status, body) = get("/api/predict?home=Utah%20Jazz&away=Orlando%20Magic").await;
        assert_eq!(status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["prediction"]["win_probability"].as_f64(), Some(0.5));
    }

    #[tokio::test]
    async fn player_found_and_missing() {
        let (status, body) = get("/api/player?name=Jayson%20Tatum").await;
        assert_eq!(status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["points"].as_f64(), Some(30.0));
        assert_eq!(v["fg_pct"].as_f64(), Some(0.55));

        let (status, body) = get("/api/player?name=Nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "No data for player Nobody");
    }

    #[tokio::test]
    async fn ratings_and_status() {
        let (status, body) = get("/api/ratings").await;
        assert_eq!(status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v[0]["team"], "Boston Celtics");
        assert_eq!(v[0]["rating"].as_f64(), Some(10.0));

        let (_, body) = get("/api/status").await;
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["games"], 1);
        assert_eq!(v["params"]["home_weight"].as_f64(), Some(1.0));
    }
}
