//! Terminal front-end: one-shot reports and the interactive menu.
//!
//! Everything here only formats numbers the engine returns.

use anyhow::Result;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

use crate::engine::{Matchup, ModelSnapshot, PlayerAverages, TeamRatings};

pub fn render_matchup(m: &Matchup) -> String {
    let p = &m.prediction;
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.rationale);
    let _ = writeln!(
        out,
        "Predicted probability {} beats {}: {:.3}",
        p.home_team, p.away_team, p.win_probability
    );
    let _ = writeln!(
        out,
        "Predicted final score: {} {} - {} {}",
        p.home_team, m.score.home_score, p.away_team, m.score.away_score
    );
    let _ = writeln!(out, "Players {}: {}", p.home_team, m.home_players.join(", "));
    let _ = write!(out, "Players {}: {}", p.away_team, m.away_players.join(", "));
    out
}

pub fn render_player(name: &str, averages: Option<&PlayerAverages>) -> String {
    let Some(s) = averages else {
        return format!("No data for player {}", name);
    };
    format!(
        "Predicted stats for {} (averages over {} games):\n  \
         Points: {:.1}\n  Rebounds: {:.1}\n  Assists: {:.1}\n  Steals: {:.1}\n  \
         FG%: {:.3}\n  FT%: {:.3}",
        name, s.games, s.points, s.rebounds, s.assists, s.steals, s.fg_pct, s.ft_pct
    )
}

pub fn render_ratings(ratings: &TeamRatings, limit: Option<usize>) -> String {
    if ratings.is_empty() {
        return "No rated teams (no games loaded)".to_string();
    }
    let ranked = ratings.ranked();
    let shown = limit.unwrap_or(ranked.len()).min(ranked.len());
    let width = ranked.iter().map(|(t, _)| t.len()).max().unwrap_or(4).max(4);

    let mut out = String::new();
    let _ = writeln!(out, "{:>3}  {:<width$}  {:>7}", "#", "Team", "Rating", width = width);
    for (i, (team, rating)) in ranked.into_iter().take(shown).enumerate() {
        let _ = writeln!(out, "{:>3}  {:<width$}  {:>+7.2}", i + 1, team, rating, width = width);
    }
    out.trim_end().to_string()
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Menu loop: 1 predicts a game, 2 shows a player. One selection per run.
pub fn run_interactive<R: BufRead, W: Write>(
    snapshot: &ModelSnapshot,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    writeln!(output, "Select an option:\n1) Predict game outcome\n2) Predict player stats")?;
    let choice = prompt(input, output, "Enter 1 or 2: ")?;

    match choice.as_str() {
        "1" => {
            writeln!(output, "Available teams: {}", snapshot.teams().join(", "))?;
            let home = prompt(input, output, "Home team: ")?;
            let away = prompt(input, output, "Away team: ")?;
            if home == away {
                writeln!(output, "Teams must be different")?;
                return Ok(());
            }
            writeln!(output, "{}", render_matchup(&snapshot.matchup(&home, &away)))?;
        }
        "2" => {
            writeln!(output, "Available players: {}", snapshot.players().join(", "))?;
            let player = prompt(input, output, "Player name: ")?;
            writeln!(output, "{}", render_player(&player, snapshot.player(&player)))?;
        }
        _ => writeln!(output, "Invalid selection")?,
    }
    Ok(())
}
