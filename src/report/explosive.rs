use serde::Serialize;
use std::collections::BTreeMap;

use super::{
    average, games_by_week, last_n_games, scrimmage_kind, LastGames, ScrimmageKind,
    LAST_GAMES_WINDOW,
};
use crate::models::{ClassifiedPlay, PlayClassification};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplosiveTotals {
    pub total: usize,
    pub games: usize,
    pub avg_per_game: f64,
}

impl ExplosiveTotals {
    fn new(total: usize, games: usize) -> Self {
        ExplosiveTotals {
            total,
            games,
            avg_per_game: average(total as f64, games),
        }
    }
}

/// Explosive plays in one game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosiveGame {
    pub game_id: String,
    pub week: Option<u32>,
    pub count: usize,
    /// Longest explosive gain of the game
    pub longest: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosiveBreakdowns {
    pub by_game: Vec<ExplosiveGame>,
    pub by_kind: BTreeMap<ScrimmageKind, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosiveAnalysis {
    pub totals: ExplosiveTotals,
    pub last_3_games: LastGames<ExplosiveTotals>,
    pub breakdowns: ExplosiveBreakdowns,
    pub plays: Vec<ClassifiedPlay>,
}

/// Explosive offensive plays by `team`; kicks and returns are left to the
/// special-teams analysis.
pub fn analyze(plays: &[ClassifiedPlay], team: &str) -> ExplosiveAnalysis {
    let explosive: Vec<ClassifiedPlay> = plays
        .iter()
        .filter(|p| {
            p.explosive
                && p.play.is_offense(team)
                && p.play_classification != PlayClassification::SpecialTeams
        })
        .cloned()
        .collect();

    let games = games_by_week(plays);
    let by_game: Vec<ExplosiveGame> = games
        .iter()
        .map(|g| {
            let in_game = explosive.iter().filter(|p| p.play.game_id == g.game_id);
            ExplosiveGame {
                game_id: g.game_id.clone(),
                week: g.week,
                count: in_game.clone().count(),
                longest: in_game.map(|p| p.play.yards_gained).max().unwrap_or(0),
            }
        })
        .collect();

    let recent = last_n_games(plays, LAST_GAMES_WINDOW);
    let recent_total = by_game
        .iter()
        .filter(|g| recent.contains(&g.game_id))
        .map(|g| g.count)
        .sum();

    let mut by_kind = BTreeMap::new();
    for p in &explosive {
        if let Some(kind) = scrimmage_kind(p) {
            *by_kind.entry(kind).or_insert(0) += 1;
        }
    }

    ExplosiveAnalysis {
        totals: ExplosiveTotals::new(explosive.len(), games.len()),
        last_3_games: LastGames {
            stats: ExplosiveTotals::new(recent_total, recent.len()),
            games: recent,
        },
        breakdowns: ExplosiveBreakdowns { by_game, by_kind },
        plays: explosive,
    }
}
