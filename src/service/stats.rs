//! Derived statistics over raw stat rows. Nothing here touches the store;
//! totals and averages are recomputed from the rows the repository hands in,
//! there is no denormalized points column anywhere in the schema.

use crate::model::entities::StatLine;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// The one scoring rule: two-point and three-point makes plus free throws.
/// Attempted counts never contribute to scoring.
pub fn game_points(line: &StatLine) -> i32 {
    2 * line.two_pt_made + 3 * line.three_pt_made + line.ft_made
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CareerTotals {
    pub games_played: usize,
    pub points: i64,
    pub rebounds: i64,
    pub assists: i64,
    pub blocks: i64,
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
}

impl CareerTotals {
    /// Sums every counting stat across the given rows. A player with no
    /// recorded games gets zero averages, not NaN.
    pub fn from_lines(lines: &[StatLine]) -> Self {
        let games_played = lines.len();
        let points: i64 = lines.iter().map(|line| i64::from(game_points(line))).sum();
        let rebounds: i64 = lines.iter().map(|line| i64::from(line.rebounds)).sum();
        let assists: i64 = lines.iter().map(|line| i64::from(line.assists)).sum();
        let blocks: i64 = lines.iter().map(|line| i64::from(line.blocks)).sum();

        CareerTotals {
            games_played,
            points,
            rebounds,
            assists,
            blocks,
            ppg: per_game(points, games_played),
            rpg: per_game(rebounds, games_played),
            apg: per_game(assists, games_played),
        }
    }
}

fn per_game(total: i64, games: usize) -> f64 {
    if games == 0 {
        0.0
    } else {
        round_one_decimal(total as f64 / games as f64)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub player_id: i32,
    pub player_name: String,
    pub total_points: i64,
}

/// Career scoring leaderboard over every recorded stat row. Ties on total
/// points order alphabetically by player name.
pub fn leaderboard(rows: &[(i32, String, StatLine)], limit: usize) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<i32, (String, i64)> = HashMap::new();
    for (player_id, player_name, line) in rows {
        let entry = totals
            .entry(*player_id)
            .or_insert_with(|| (player_name.clone(), 0));
        entry.1 += i64::from(game_points(line));
    }

    let mut entries: Vec<LeaderboardEntry> = totals
        .into_iter()
        .map(|(player_id, (player_name, total_points))| LeaderboardEntry {
            player_id,
            player_name,
            total_points,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    entries.truncate(limit);
    entries
}

/// Counts per non-empty category, in ascending category order. Null and blank
/// values are excluded, so the counts sum to the rows actually categorized.
pub fn distribution<I>(values: I) -> Vec<(String, i64)>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for value in values {
        if let Some(raw) = value {
            let category = raw.trim();
            if !category.is_empty() {
                *counts.entry(category.to_string()).or_insert(0) += 1;
            }
        }
    }
    counts.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamePerformance {
    pub player_name: String,
    pub game_code: String,
    pub game_date: NaiveDate,
    pub points: i32,
}

/// Best individual single-game scoring lines, points descending.
pub fn top_performances(
    rows: &[(String, String, NaiveDate, StatLine)],
    limit: usize,
) -> Vec<GamePerformance> {
    let mut performances: Vec<GamePerformance> = rows
        .iter()
        .map(
            |(player_name, game_code, game_date, line)| GamePerformance {
                player_name: player_name.clone(),
                game_code: game_code.clone(),
                game_date: *game_date,
                points: game_points(line),
            },
        )
        .collect();
    performances.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.player_name.cmp(&b.player_name))
            .then_with(|| a.game_date.cmp(&b.game_date))
    });
    performances.truncate(limit);
    performances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(two: i32, three: i32, ft: i32) -> StatLine {
        StatLine {
            two_pt_made: two,
            three_pt_made: three,
            ft_made: ft,
            ..StatLine::default()
        }
    }

    #[test]
    fn points_ignore_attempted_counts() {
        let row = StatLine {
            two_pt_made: 11,
            two_pt_attempted: 25,
            three_pt_made: 3,
            three_pt_attempted: 12,
            ft_made: 11,
            ft_attempted: 14,
            ..StatLine::default()
        };
        assert_eq!(game_points(&row), 42);
    }

    #[test]
    fn empty_career_has_zero_averages() {
        let totals = CareerTotals::from_lines(&[]);
        assert_eq!(totals.games_played, 0);
        assert_eq!(totals.points, 0);
        assert_eq!(totals.ppg, 0.0);
        assert_eq!(totals.rpg, 0.0);
        assert_eq!(totals.apg, 0.0);
    }

    #[test]
    fn averages_round_to_one_decimal() {
        // 100 points over 3 games -> 33.3 ppg
        let lines = vec![line(20, 0, 0), line(20, 0, 0), line(10, 0, 0)];
        let totals = CareerTotals::from_lines(&lines);
        assert_eq!(totals.points, 100);
        assert_eq!(totals.ppg, 33.3);
    }

    #[test]
    fn career_totals_sum_counting_stats() {
        let mut first = line(5, 2, 4);
        first.rebounds = 7;
        first.assists = 3;
        first.blocks = 1;
        let mut second = line(4, 1, 2);
        second.rebounds = 9;
        second.assists = 5;
        second.blocks = 0;

        let totals = CareerTotals::from_lines(&[first, second]);
        assert_eq!(totals.games_played, 2);
        assert_eq!(totals.points, 20 + 13);
        assert_eq!(totals.rebounds, 16);
        assert_eq!(totals.assists, 8);
        assert_eq!(totals.blocks, 1);
        assert_eq!(totals.rpg, 8.0);
    }

    #[test]
    fn leaderboard_caps_and_orders() {
        let rows = vec![
            (1, "Aris".to_string(), line(10, 0, 0)),
            (1, "Aris".to_string(), line(10, 0, 0)),
            (2, "Bogdan".to_string(), line(2, 0, 0)),
            (3, "Ceslav".to_string(), line(3, 0, 0)),
            (4, "Dino".to_string(), line(1, 0, 0)),
            (5, "Emir".to_string(), line(1, 0, 1)),
            (6, "Filip".to_string(), line(0, 0, 1)),
        ];
        let board = leaderboard(&rows, 5);
        assert_eq!(board.len(), 5);
        assert_eq!(board[0].player_name, "Aris");
        assert_eq!(board[0].total_points, 40);
        for pair in board.windows(2) {
            assert!(pair[0].total_points >= pair[1].total_points);
        }
    }

    #[test]
    fn leaderboard_breaks_ties_alphabetically() {
        let rows = vec![
            (2, "Zoran".to_string(), line(5, 0, 0)),
            (1, "Ante".to_string(), line(5, 0, 0)),
        ];
        let board = leaderboard(&rows, 10);
        assert_eq!(board[0].player_name, "Ante");
        assert_eq!(board[1].player_name, "Zoran");
        assert_eq!(board[0].total_points, board[1].total_points);
    }

    #[test]
    fn distribution_skips_blank_categories() {
        let values = vec![
            Some("Serbia".to_string()),
            Some("France".to_string()),
            Some("Serbia".to_string()),
            Some("  ".to_string()),
            Some(String::new()),
            None,
        ];
        let non_empty = 3;
        let counted = distribution(values);
        assert_eq!(
            counted,
            vec![("France".to_string(), 1), ("Serbia".to_string(), 2)]
        );
        assert_eq!(counted.iter().map(|(_, n)| n).sum::<i64>(), non_empty);
    }

    #[test]
    fn top_performances_rank_single_games() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
        let rows = vec![
            ("Aris".to_string(), "G-01".to_string(), date, line(11, 3, 11)),
            ("Bogdan".to_string(), "G-02".to_string(), date, line(8, 0, 0)),
            ("Aris".to_string(), "G-03".to_string(), date, line(2, 0, 0)),
        ];
        let top = top_performances(&rows, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].points, 42);
        assert_eq!(top[0].game_code, "G-01");
        assert_eq!(top[1].player_name, "Bogdan");
    }
}
