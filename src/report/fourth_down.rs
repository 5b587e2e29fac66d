use serde::Serialize;
use std::collections::BTreeMap;

use super::{
    games_by_week, last_n_games, Conversions, DistanceBucket, LastGames, LAST_GAMES_WINDOW,
};
use crate::analytics::fourth_down::{conversion_evidence, is_go_for_it, ConversionEvidence};
use crate::models::{ClassifiedPlay, SpecialTeamsKind};

/// A go-for-it play and how it was graded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourthDownPlay {
    #[serde(flatten)]
    pub play: ClassifiedPlay,
    pub converted: bool,
    pub evidence: Option<ConversionEvidence>,
    pub bucket: DistanceBucket,
}

/// What the offense chose on every 4th down
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Decisions {
    pub go_for_it: usize,
    pub punts: usize,
    pub field_goals: usize,
    pub other: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourthDownGame {
    pub game_id: String,
    pub week: Option<u32>,
    #[serde(flatten)]
    pub conversions: Conversions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourthDownBreakdowns {
    pub by_distance: BTreeMap<DistanceBucket, Conversions>,
    pub by_game: Vec<FourthDownGame>,
    pub decisions: Decisions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourthDownAnalysis {
    pub totals: Conversions,
    pub last_3_games: LastGames<Conversions>,
    pub breakdowns: FourthDownBreakdowns,
    pub plays: Vec<FourthDownPlay>,
}

/// Go-for-it decisions by `team` and how often they converted.
pub fn analyze(plays: &[ClassifiedPlay], team: &str) -> FourthDownAnalysis {
    let fourth_downs: Vec<&ClassifiedPlay> = plays
        .iter()
        .filter(|p| p.play.down == 4 && p.play.is_offense(team))
        .collect();

    let mut decisions = Decisions::default();
    for p in &fourth_downs {
        if is_go_for_it(&p.play) {
            decisions.go_for_it += 1;
        } else {
            match p.special_teams {
                Some(
                    SpecialTeamsKind::Punt
                    | SpecialTeamsKind::PuntReturn
                    | SpecialTeamsKind::BlockedPunt,
                ) => decisions.punts += 1,
                Some(SpecialTeamsKind::FieldGoal) => decisions.field_goals += 1,
                _ => decisions.other += 1,
            }
        }
    }

    let attempts: Vec<&ClassifiedPlay> = fourth_downs
        .into_iter()
        .filter(|p| is_go_for_it(&p.play))
        .collect();

    let by_distance = DistanceBucket::ALL
        .into_iter()
        .map(|bucket| {
            let in_bucket = attempts
                .iter()
                .copied()
                .filter(|p| DistanceBucket::from_distance(p.play.distance) == bucket);
            (bucket, Conversions::count(in_bucket))
        })
        .collect();

    let by_game = games_by_week(plays)
        .into_iter()
        .map(|g| FourthDownGame {
            conversions: Conversions::count(
                attempts.iter().copied().filter(|p| p.play.game_id == g.game_id),
            ),
            game_id: g.game_id,
            week: g.week,
        })
        .collect();

    let games = last_n_games(plays, LAST_GAMES_WINDOW);
    let recent = Conversions::count(
        attempts
            .iter()
            .copied()
            .filter(|p| games.contains(&p.play.game_id)),
    );

    let graded = attempts
        .iter()
        .map(|p| {
            let evidence = conversion_evidence(&p.play);
            FourthDownPlay {
                play: (*p).clone(),
                converted: evidence.is_some(),
                evidence,
                bucket: DistanceBucket::from_distance(p.play.distance),
            }
        })
        .collect();

    FourthDownAnalysis {
        totals: Conversions::count(attempts.iter().copied()),
        last_3_games: LastGames {
            games,
            stats: recent,
        },
        breakdowns: FourthDownBreakdowns {
            by_distance,
            by_game,
            decisions,
        },
        plays: graded,
    }
}
