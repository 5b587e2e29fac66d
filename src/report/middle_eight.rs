use serde::Serialize;

use super::{average, games_by_week, last_n_games, special_teams, LastGames, LAST_GAMES_WINDOW};
use crate::analytics::classify::{is_touchdown, scoring_points};
use crate::models::ClassifiedPlay;

/// Team that put up the points on a scoring play
pub fn scoring_team(play: &ClassifiedPlay) -> &str {
    if play.play.turnover && is_touchdown(&play.play) {
        &play.play.defense
    } else {
        special_teams::scored_by(play)
    }
}

/// One score inside the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiddleEightScore {
    pub game_id: String,
    pub week: Option<u32>,
    pub scoring_team: String,
    pub opponent: String,
    /// Scored by the subject team
    pub ours: bool,
    pub points: u32,
    pub play: ClassifiedPlay,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MiddleEightTotals {
    pub games: usize,
    pub points_scored: u32,
    pub points_allowed: u32,
    pub net_points: i64,
    pub avg_points_scored_per_game: f64,
    pub avg_points_allowed_per_game: f64,
    pub avg_net_per_game: f64,
}

impl MiddleEightTotals {
    fn new<'a>(scores: impl Iterator<Item = &'a MiddleEightScore>, games: usize) -> Self {
        let (scored, allowed) = scores.fold((0u32, 0u32), |(s, a), score| {
            if score.ours {
                (s + score.points, a)
            } else {
                (s, a + score.points)
            }
        });
        let net = scored as i64 - allowed as i64;
        MiddleEightTotals {
            games,
            points_scored: scored,
            points_allowed: allowed,
            net_points: net,
            avg_points_scored_per_game: average(scored as f64, games),
            avg_points_allowed_per_game: average(allowed as f64, games),
            avg_net_per_game: average(net as f64, games),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiddleEightGame {
    pub game_id: String,
    pub week: Option<u32>,
    pub points_scored: u32,
    pub points_allowed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiddleEightBreakdowns {
    pub by_game: Vec<MiddleEightGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiddleEightAnalysis {
    pub totals: MiddleEightTotals,
    pub last_3_games: LastGames<MiddleEightTotals>,
    pub breakdowns: MiddleEightBreakdowns,
    /// Scoring plays inside the window
    pub plays: Vec<MiddleEightScore>,
}

/// Scoring margin over the last four minutes of the first half and the
/// first four of the second.
pub fn analyze(plays: &[ClassifiedPlay], team: &str) -> MiddleEightAnalysis {
    let scores: Vec<MiddleEightScore> = plays
        .iter()
        .filter(|p| p.middle_eight && p.play.scoring)
        .filter(|p| p.play.is_offense(team) || p.play.is_defense(team))
        .filter_map(|p| {
            let points = scoring_points(&p.play);
            if points == 0 {
                return None;
            }
            let scorer = scoring_team(p);
            let opponent = if scorer.eq_ignore_ascii_case(&p.play.offense) {
                &p.play.defense
            } else {
                &p.play.offense
            };
            Some(MiddleEightScore {
                game_id: p.play.game_id.clone(),
                week: p.play.week,
                scoring_team: scorer.to_string(),
                opponent: opponent.clone(),
                ours: scorer.eq_ignore_ascii_case(team),
                points,
                play: p.clone(),
            })
        })
        .collect();

    let games = games_by_week(plays);
    let by_game = games
        .iter()
        .map(|g| {
            let t = MiddleEightTotals::new(scores.iter().filter(|s| s.game_id == g.game_id), 1);
            MiddleEightGame {
                game_id: g.game_id.clone(),
                week: g.week,
                points_scored: t.points_scored,
                points_allowed: t.points_allowed,
            }
        })
        .collect();

    let recent = last_n_games(plays, LAST_GAMES_WINDOW);
    let recent_totals = MiddleEightTotals::new(
        scores.iter().filter(|s| recent.contains(&s.game_id)),
        recent.len(),
    );

    MiddleEightAnalysis {
        totals: MiddleEightTotals::new(scores.iter(), games.len()),
        last_3_games: LastGames {
            games: recent,
            stats: recent_totals,
        },
        breakdowns: MiddleEightBreakdowns { by_game },
        plays: scores,
    }
}
