use serde::Serialize;
use std::collections::BTreeMap;

use super::{
    format_rate, in_last_games, last_n_games, rate, scrimmage_kind, DistanceBucket, LastGames,
    ScrimmageKind, LAST_GAMES_WINDOW,
};
use crate::analytics::classify::ordinal;
use crate::models::ClassifiedPlay;

/// Success-rate summary over a set of graded plays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessSummary {
    pub total_attempts: usize,
    pub successes: usize,
    /// "NN.N%"
    pub success_rate: String,
    pub plays: Vec<ClassifiedPlay>,
}

pub fn success_summary(plays: &[ClassifiedPlay]) -> SuccessSummary {
    let totals = SuccessTotals::from_plays(plays.iter());
    SuccessSummary {
        total_attempts: totals.total_attempts,
        successes: totals.successes,
        success_rate: totals.success_rate,
        plays: plays.to_vec(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuccessTotals {
    pub total_attempts: usize,
    pub successes: usize,
    pub success_rate: String,
}

impl SuccessTotals {
    fn from_plays<'a>(plays: impl Iterator<Item = &'a ClassifiedPlay>) -> Self {
        let (attempts, successes) = plays.fold((0, 0), |(n, s), p| {
            (n + 1, s + usize::from(p.is_successful))
        });
        SuccessTotals {
            total_attempts: attempts,
            successes,
            success_rate: format_rate(rate(successes, attempts)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessBreakdowns {
    /// Keyed "1st down" … "4th down"
    pub by_down: BTreeMap<String, SuccessTotals>,
    pub by_kind: BTreeMap<ScrimmageKind, SuccessTotals>,
    pub by_distance: BTreeMap<DistanceBucket, SuccessTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessAnalysis {
    pub totals: SuccessTotals,
    pub last_3_games: LastGames<SuccessTotals>,
    pub breakdowns: SuccessBreakdowns,
    pub plays: Vec<ClassifiedPlay>,
}

/// Success rate of `team`'s rushes and passes.
pub fn analyze(plays: &[ClassifiedPlay], team: &str) -> SuccessAnalysis {
    let graded: Vec<ClassifiedPlay> = plays
        .iter()
        .filter(|p| p.play.is_offense(team) && scrimmage_kind(p).is_some())
        .cloned()
        .collect();

    let games = last_n_games(plays, LAST_GAMES_WINDOW);
    let recent = in_last_games(&graded, &games);

    let mut by_down = BTreeMap::new();
    for down in 1..=4u8 {
        let of_down = graded.iter().filter(|p| p.play.down == down);
        by_down.insert(format!("{} down", ordinal(down)), SuccessTotals::from_plays(of_down));
    }

    let mut by_kind = BTreeMap::new();
    for kind in [ScrimmageKind::Rush, ScrimmageKind::Pass] {
        let of_kind = graded.iter().filter(|p| scrimmage_kind(p) == Some(kind));
        by_kind.insert(kind, SuccessTotals::from_plays(of_kind));
    }

    let by_distance = DistanceBucket::ALL
        .into_iter()
        .map(|bucket| {
            let in_bucket = graded
                .iter()
                .filter(|p| DistanceBucket::from_distance(p.play.distance) == bucket);
            (bucket, SuccessTotals::from_plays(in_bucket))
        })
        .collect();

    SuccessAnalysis {
        totals: SuccessTotals::from_plays(graded.iter()),
        last_3_games: LastGames {
            games,
            stats: SuccessTotals::from_plays(recent.iter()),
        },
        breakdowns: SuccessBreakdowns {
            by_down,
            by_kind,
            by_distance,
        },
        plays: graded,
    }
}
