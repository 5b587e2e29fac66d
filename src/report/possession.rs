use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::drives::{split_possession, Drive};
use crate::models::Play;

/// Possession bookkeeping for one period of one game
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodPossession {
    /// Drives that touched the period
    pub drives: usize,
    /// Plays of every drive that touched the period; a drive spanning two
    /// periods counts in both
    pub plays: usize,
    pub yards: i32,
    /// Seconds of possession per team
    pub seconds: BTreeMap<String, u32>,
    /// Same, as "M:SS"
    pub display: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamePossession {
    pub game_id: String,
    pub periods: BTreeMap<u8, PeriodPossession>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PossessionAnalysis {
    pub games: Vec<GamePossession>,
}

pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Time of possession per period, splitting quarter-spanning drives.
pub fn analyze<P: AsRef<Play>>(drives: &[Drive<'_, P>]) -> PossessionAnalysis {
    let mut games: Vec<GamePossession> = Vec::new();

    for drive in drives {
        let index = match games.iter().position(|g| g.game_id == drive.game_id) {
            Some(i) => i,
            None => {
                games.push(GamePossession {
                    game_id: drive.game_id.clone(),
                    periods: BTreeMap::new(),
                });
                games.len() - 1
            }
        };
        let game = &mut games[index];
        let yards = drive.yards();

        for (period, seconds) in split_possession(drive).shares() {
            let entry = game.periods.entry(period).or_default();
            entry.drives += 1;
            entry.plays += drive.plays.len();
            entry.yards += yards;
            *entry.seconds.entry(drive.offense_team.clone()).or_insert(0) += seconds;
        }
    }

    for game in &mut games {
        for period in game.periods.values_mut() {
            period.display = period
                .seconds
                .iter()
                .map(|(team, &s)| (team.clone(), format_clock(s)))
                .collect();
        }
    }

    PossessionAnalysis { games }
}
