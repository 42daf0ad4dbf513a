//! Per-player season averages and team rosters.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::data::models::PlayerGameRecord;

/// A player's per-game averages over every recorded game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlayerAverages {
    pub games: u32,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    /// Field-goal percentage in [0, 1]; 0 when the player never attempted one.
    pub fg_pct: f64,
    /// Free-throw percentage in [0, 1]; 0 when the player never attempted one.
    pub ft_pct: f64,
}

/// Team name → sorted player names.
pub type Rosters = BTreeMap<String, BTreeSet<String>>;

#[derive(Default)]
struct StatTotals {
    games: u32,
    points: u64,
    rebounds: u64,
    assists: u64,
    steals: u64,
    fgm: u64,
    fga: u64,
    ftm: u64,
    fta: u64,
}

fn ratio(made: u64, attempted: u64) -> f64 {
    if attempted == 0 {
        0.0
    } else {
        made as f64 / attempted as f64
    }
}

pub fn compute_player_averages(stats: &[PlayerGameRecord]) -> BTreeMap<String, PlayerAverages> {
    let mut totals: BTreeMap<&str, StatTotals> = BTreeMap::new();
    for s in stats {
        let t = totals.entry(s.player.as_str()).or_default();
        t.games += 1;
        t.points += u64::from(s.points);
        t.rebounds += u64::from(s.rebounds);
        t.assists += u64::from(s.assists);
        t.steals += u64::from(s.steals);
        t.fgm += u64::from(s.field_goals_made);
        t.fga += u64::from(s.field_goals_attempted);
        t.ftm += u64::from(s.free_throws_made);
        t.fta += u64::from(s.free_throws_attempted);
    }

    totals
        .into_iter()
        .map(|(player, t)| {
            let n = f64::from(t.games);
            let avgs = PlayerAverages {
                games: t.games,
                points: t.points as f64 / n,
                rebounds: t.rebounds as f64 / n,
                assists: t.assists as f64 / n,
                steals: t.steals as f64 / n,
                fg_pct: ratio(t.fgm, t.fga),
                ft_pct: ratio(t.ftm, t.fta),
            };
            (player.to_string(), avgs)
        })
        .collect()
}

/// The player's averages stand in as the prediction. `None` means no data.
pub fn predict_player<'a>(
    player: &str,
    averages: &'a BTreeMap<String, PlayerAverages>,
) -> Option<&'a PlayerAverages> {
    averages.get(player)
}

/// Group players under every team they have a stat line for.
pub fn compute_rosters(stats: &[PlayerGameRecord]) -> Rosters {
    let mut rosters = Rosters::new();
    for s in stats {
        rosters
            .entry(s.team.clone())
            .or_default()
            .insert(s.player.clone());
    }
    rosters
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(player: &str, team: &str, points: u32, fgm: u32, fga: u32, ftm: u32, fta: u32) -> PlayerGameRecord {
        PlayerGameRecord {
            player: player.into(),
            team: team.into(),
            points,
            rebounds: 6,
            assists: 3,
            steals: 1,
            field_goals_made: fgm,
            field_goals_attempted: fga,
            free_throws_made: ftm,
            free_throws_attempted: fta,
        }
    }

    #[test]
    fn two_game_scenario() {
        let stats = vec![
            line("P", "T", 20, 5, 10, 4, 5),
            line("P", "T", 30, 6, 10, 6, 5),
        ];
        let avgs = compute_player_averages(&stats);
        let p = predict_player("P", &avgs).unwrap();
        assert_eq!(p.games, 2);
        assert_relative_eq!(p.points, 25.0);
        assert_relative_eq!(p.fg_pct, 0.55);
        assert_relative_eq!(p.rebounds, 6.0);
    }

    #[test]
    fn zero_attempts_give_zero_pct() {
        let avgs = compute_player_averages(&[line("Bench", "T", 0, 0, 0, 0, 0)]);
        let p = &avgs["Bench"];
        assert_eq!(p.fg_pct, 0.0);
        assert_eq!(p.ft_pct, 0.0);
    }

    #[test]
    fn single_game_is_its_own_average() {
        let avgs = compute_player_averages(&[line("Solo", "T", 17, 7, 12, 3, 4)]);
        let p = &avgs["Solo"];
        assert_relative_eq!(p.points, 17.0);
        assert_relative_eq!(p.ft_pct, 0.75);
    }

    #[test]
    fn percentages_stay_in_unit_interval() {
        let stats = vec![
            line("A", "T", 10, 4, 9, 2, 2),
            line("A", "T", 12, 5, 5, 0, 1),
            line("B", "T", 3, 1, 7, 1, 3),
        ];
        for p in compute_player_averages(&stats).values() {
            assert!((0.0..=1.0).contains(&p.fg_pct));
            assert!((0.0..=1.0).contains(&p.ft_pct));
        }
    }

    #[test]
    fn unknown_player_has_no_prediction() {
        let avgs = compute_player_averages(&[]);
        assert!(predict_player("Ghost", &avgs).is_none());
    }

    #[test]
    fn rosters_follow_team_column() {
        let stats = vec![
            line("Zed", "Lakers", 1, 0, 1, 0, 0),
            line("Amy", "Lakers", 1, 0, 1, 0, 0),
            line("Zed", "Lakers", 1, 0, 1, 0, 0),
            line("Bo", "Heat", 1, 0, 1, 0, 0),
        ];
        let rosters = compute_rosters(&stats);
        let lakers: Vec<&str> = rosters["Lakers"].iter().map(String::as_str).collect();
        assert_eq!(lakers, vec!["Amy", "Zed"]);
        assert_eq!(rosters["Heat"].len(), 1);
    }
}
