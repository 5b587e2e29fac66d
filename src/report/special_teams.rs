//! Special-teams grading from one team's point of view.
//!
//! Returns belong to the receiving team (listed as the defense); every other
//! kick belongs to the kicking team (the offense).

use serde::Serialize;
use std::collections::BTreeMap;

use super::{games_by_week, last_n_games, LastGames, LAST_GAMES_WINDOW};
use crate::analytics::classify::is_touchdown;
use crate::models::{ClassifiedPlay, PlayClassification, SpecialTeamsKind};

fn is_return(kind: Option<SpecialTeamsKind>) -> bool {
    matches!(
        kind,
        Some(SpecialTeamsKind::KickoffReturn | SpecialTeamsKind::PuntReturn)
    )
}

/// Team the play is credited to
pub fn unit_team(play: &ClassifiedPlay) -> &str {
    if is_return(play.special_teams) {
        &play.play.defense
    } else {
        &play.play.offense
    }
}

/// Team that scored a special-teams touchdown
pub fn scored_by(play: &ClassifiedPlay) -> &str {
    match play.special_teams {
        Some(
            SpecialTeamsKind::KickoffReturn
            | SpecialTeamsKind::PuntReturn
            | SpecialTeamsKind::BlockedPunt,
        ) => &play.play.defense,
        _ => &play.play.offense,
    }
}

fn is_explosive_return(play: &ClassifiedPlay) -> bool {
    is_return(play.special_teams) && play.explosive
}

/// A special-teams play with its grade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialTeamsPlay {
    #[serde(flatten)]
    pub play: ClassifiedPlay,
    /// Credited to the subject team's unit
    pub ours: bool,
    pub explosive_return: bool,
    pub bad_result: bool,
}

/// Grade every special-teams play in games involving `team`.
///
/// A play is a bad result for its unit when it is a turnover or when the
/// other side broke an explosive return on the same drive.
pub fn grade(plays: &[ClassifiedPlay], team: &str) -> Vec<SpecialTeamsPlay> {
    let st: Vec<&ClassifiedPlay> = plays
        .iter()
        .filter(|p| p.play_classification == PlayClassification::SpecialTeams)
        .filter(|p| p.play.is_offense(team) || p.play.is_defense(team))
        .collect();

    st.iter()
        .map(|p| {
            let unit = unit_team(p);
            let explosive_against = st.iter().any(|other| {
                other.play.game_id == p.play.game_id
                    && other.play.drive_id == p.play.drive_id
                    && !unit_team(other).eq_ignore_ascii_case(unit)
                    && is_explosive_return(other)
            });
            SpecialTeamsPlay {
                ours: unit.eq_ignore_ascii_case(team),
                explosive_return: is_explosive_return(p),
                bad_result: p.play.turnover || explosive_against,
                play: (*p).clone(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpecialTeamsTotals {
    pub plays: usize,
    pub explosive_returns: usize,
    pub explosive_returns_allowed: usize,
    pub bad_results: usize,
    /// Opponent units' bad results
    pub bad_results_forced: usize,
    pub touchdowns_scored: usize,
    pub touchdowns_allowed: usize,
    pub punt_blocks: usize,
    pub punt_blocks_allowed: usize,
}

impl SpecialTeamsTotals {
    fn from_graded<'a>(graded: impl Iterator<Item = &'a SpecialTeamsPlay>, team: &str) -> Self {
        let mut t = SpecialTeamsTotals::default();
        for g in graded {
            let p = &g.play;
            if g.ours {
                t.plays += 1;
                t.explosive_returns += usize::from(g.explosive_return);
                t.bad_results += usize::from(g.bad_result);
            } else {
                t.explosive_returns_allowed += usize::from(g.explosive_return);
                t.bad_results_forced += usize::from(g.bad_result);
            }
            if p.play.scoring && is_touchdown(&p.play) {
                if scored_by(p).eq_ignore_ascii_case(team) {
                    t.touchdowns_scored += 1;
                } else {
                    t.touchdowns_allowed += 1;
                }
            }
            if p.special_teams == Some(SpecialTeamsKind::BlockedPunt) {
                if p.play.is_offense(team) {
                    t.punt_blocks_allowed += 1;
                } else {
                    t.punt_blocks += 1;
                }
            }
        }
        t
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialTeamsGame {
    pub game_id: String,
    pub week: Option<u32>,
    #[serde(flatten)]
    pub totals: SpecialTeamsTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialTeamsBreakdowns {
    /// Our unit's plays by kind
    pub by_kind: BTreeMap<SpecialTeamsKind, usize>,
    pub by_game: Vec<SpecialTeamsGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialTeamsAnalysis {
    pub totals: SpecialTeamsTotals,
    pub last_3_games: LastGames<SpecialTeamsTotals>,
    pub breakdowns: SpecialTeamsBreakdowns,
    pub plays: Vec<SpecialTeamsPlay>,
}

pub fn analyze(plays: &[ClassifiedPlay], team: &str) -> SpecialTeamsAnalysis {
    let graded = grade(plays, team);

    let mut by_kind = BTreeMap::new();
    for g in graded.iter().filter(|g| g.ours) {
        if let Some(kind) = g.play.special_teams {
            *by_kind.entry(kind).or_insert(0) += 1;
        }
    }

    let by_game = games_by_week(plays)
        .into_iter()
        .map(|g| SpecialTeamsGame {
            totals: SpecialTeamsTotals::from_graded(
                graded.iter().filter(|s| s.play.play.game_id == g.game_id),
                team,
            ),
            game_id: g.game_id,
            week: g.week,
        })
        .collect();

    let games = last_n_games(plays, LAST_GAMES_WINDOW);
    let recent = SpecialTeamsTotals::from_graded(
        graded.iter().filter(|s| games.contains(&s.play.play.game_id)),
        team,
    );

    SpecialTeamsAnalysis {
        totals: SpecialTeamsTotals::from_graded(graded.iter(), team),
        last_3_games: LastGames {
            games,
            stats: recent,
        },
        breakdowns: SpecialTeamsBreakdowns { by_kind, by_game },
        plays: graded,
    }
}
