//! Points off turnovers.
//!
//! Only possession-losing interceptions and fumbles count. Turnovers on
//! downs, wiped-out plays and fumbles the offense fell on are dropped.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{games_by_week, last_n_games, rate, LastGames, LAST_GAMES_WINDOW};
use crate::analytics::classify::{is_touchdown, scoring_points};
use crate::analytics::drives::Drive;
use crate::models::{ClassifiedPlay, Play, SpecialTeamsKind, TurnoverKind};

/// What the forcing team did with the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupResult {
    /// The turnover itself went for six
    ReturnTouchdown,
    Touchdown,
    FieldGoal,
    NoScore,
}

/// One turnover and the drive that followed it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverFollowup {
    pub game_id: String,
    pub week: Option<u32>,
    pub kind: TurnoverKind,
    pub committed_by: String,
    pub forced_by: String,
    pub next_drive_id: Option<String>,
    /// Credited to `forced_by`
    pub points: u32,
    pub result: FollowupResult,
    pub turnover: ClassifiedPlay,
}

/// True for an interception or a lost fumble that changed possession.
pub fn is_possession_turnover(play: &ClassifiedPlay) -> bool {
    let p = &play.play;
    if !p.turnover || p.text_mentions("no play") {
        return false;
    }
    match play.turnover_kind {
        Some(TurnoverKind::Interception) => true,
        Some(TurnoverKind::Fumble) => !is_own_recovery(p),
        _ => false,
    }
}

/// "(Own)" recoveries are not turnovers unless the text shows the defense
/// came up with the ball.
fn is_own_recovery(play: &Play) -> bool {
    if !play.type_mentions("(own)") {
        return false;
    }
    let defense = play.defense.to_lowercase();
    let abbreviation: String = defense.chars().take(3).collect();
    !(play.text_mentions(&format!("recovered by {}", defense))
        || (!abbreviation.is_empty()
            && play.text_mentions(&format!("recovered by {}", abbreviation))))
}

/// Team that gave the ball away. On a muffed kick that is the receiving
/// team, which the feeds list as the defense.
pub fn committed_by(play: &ClassifiedPlay) -> &str {
    let muffed_kick = matches!(
        play.special_teams,
        Some(
            SpecialTeamsKind::Punt
                | SpecialTeamsKind::PuntReturn
                | SpecialTeamsKind::Kickoff
                | SpecialTeamsKind::KickoffReturn
        )
    ) && play.play.mentions("fumble");
    if muffed_kick {
        &play.play.defense
    } else {
        &play.play.offense
    }
}

/// Follow one turnover to the next drive of the same game and credit its
/// points to the team that forced it.
pub fn follow_up<P: AsRef<Play>>(
    turnover: &ClassifiedPlay,
    kind: TurnoverKind,
    drives: &[Drive<'_, P>],
) -> TurnoverFollowup {
    let t = &turnover.play;
    let committed = committed_by(turnover).to_string();
    let forced = if committed.eq_ignore_ascii_case(&t.offense) {
        t.defense.clone()
    } else {
        t.offense.clone()
    };

    let next_drive = drives
        .iter()
        .skip_while(|d| !(d.game_id == t.game_id && d.drive_id == t.drive_id))
        .find(|d| d.game_id == t.game_id && d.drive_id != t.drive_id);

    let (points, result) = if t.scoring && is_touchdown(t) {
        (scoring_points(t), FollowupResult::ReturnTouchdown)
    } else {
        let points = next_drive.map_or(0, |d| d.points());
        let result = match points {
            0 => FollowupResult::NoScore,
            3 => FollowupResult::FieldGoal,
            _ => FollowupResult::Touchdown,
        };
        (points, result)
    };

    TurnoverFollowup {
        game_id: t.game_id.clone(),
        week: t.week,
        kind,
        committed_by: committed,
        forced_by: forced,
        next_drive_id: next_drive.map(|d| d.drive_id.clone()),
        points,
        result,
        turnover: turnover.clone(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TurnoverTotals {
    pub turnovers: usize,
    pub points: u32,
    pub scoring_drives: usize,
    /// Share of turnovers that led to points
    pub score_rate: f64,
}

impl TurnoverTotals {
    fn from_followups<'a>(followups: impl Iterator<Item = &'a TurnoverFollowup>) -> Self {
        let mut totals = TurnoverTotals::default();
        for f in followups {
            totals.turnovers += 1;
            totals.points += f.points;
            if f.points > 0 {
                totals.scoring_drives += 1;
            }
        }
        totals.score_rate = rate(totals.scoring_drives, totals.turnovers);
        totals
    }
}

/// Both sides of the ledger for the subject team
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TurnoverSides {
    /// Opponent turnovers and what the team scored off them
    pub forced: TurnoverTotals,
    /// Own turnovers and what the opponent scored off them
    pub committed: TurnoverTotals,
}

impl TurnoverSides {
    fn from_followups(followups: &[&TurnoverFollowup], team: &str) -> Self {
        TurnoverSides {
            forced: TurnoverTotals::from_followups(
                followups.iter().copied().filter(|f| f.forced_by.eq_ignore_ascii_case(team)),
            ),
            committed: TurnoverTotals::from_followups(
                followups.iter().copied().filter(|f| f.committed_by.eq_ignore_ascii_case(team)),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverGame {
    pub game_id: String,
    pub week: Option<u32>,
    /// Forced minus committed
    pub margin: i64,
    pub points_for: u32,
    pub points_against: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverBreakdowns {
    pub by_kind: BTreeMap<String, TurnoverSides>,
    pub by_game: Vec<TurnoverGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverAnalysis {
    pub totals: TurnoverSides,
    pub last_3_games: LastGames<TurnoverSides>,
    pub breakdowns: TurnoverBreakdowns,
    pub plays: Vec<TurnoverFollowup>,
}

/// Points scored off turnovers in games involving `team`.
pub fn analyze<P: AsRef<Play>>(
    plays: &[ClassifiedPlay],
    drives: &[Drive<'_, P>],
    team: &str,
) -> TurnoverAnalysis {
    let followups: Vec<TurnoverFollowup> = plays
        .iter()
        .filter(|p| p.play.is_offense(team) || p.play.is_defense(team))
        .filter(|p| is_possession_turnover(p))
        .filter_map(|p| p.turnover_kind.map(|kind| follow_up(p, kind, drives)))
        .collect();
    let all: Vec<&TurnoverFollowup> = followups.iter().collect();

    let games = last_n_games(plays, LAST_GAMES_WINDOW);
    let recent: Vec<&TurnoverFollowup> = followups
        .iter()
        .filter(|f| games.contains(&f.game_id))
        .collect();

    let mut by_kind = BTreeMap::new();
    for (label, kind) in [
        ("interception", TurnoverKind::Interception),
        ("fumble", TurnoverKind::Fumble),
    ] {
        let of_kind: Vec<&TurnoverFollowup> =
            followups.iter().filter(|f| f.kind == kind).collect();
        by_kind.insert(label.to_string(), TurnoverSides::from_followups(&of_kind, team));
    }

    let by_game = games_by_week(plays)
        .into_iter()
        .map(|g| {
            let in_game: Vec<&TurnoverFollowup> =
                followups.iter().filter(|f| f.game_id == g.game_id).collect();
            let sides = TurnoverSides::from_followups(&in_game, team);
            TurnoverGame {
                game_id: g.game_id,
                week: g.week,
                margin: sides.forced.turnovers as i64 - sides.committed.turnovers as i64,
                points_for: sides.forced.points,
                points_against: sides.committed.points,
            }
        })
        .collect();

    TurnoverAnalysis {
        totals: TurnoverSides::from_followups(&all, team),
        last_3_games: LastGames {
            stats: TurnoverSides::from_followups(&recent, team),
            games,
        },
        breakdowns: TurnoverBreakdowns { by_kind, by_game },
        plays: followups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::classify::{classify, tests::play};
    use crate::analytics::drives::aggregate_drives;

    fn snap(drive: u32, number: u32, offense: &str, defense: &str) -> Play {
        Play {
            drive_number: drive,
            drive_id: format!("d{}", drive),
            play_number: number,
            play_id: format!("{}-{}", drive, number),
            offense: offense.into(),
            defense: defense.into(),
            ..play(1, 10, 3)
        }
    }

    fn turnover(drive: u32, offense: &str, defense: &str, play_type: &str, text: &str) -> Play {
        Play {
            turnover: true,
            play_type: play_type.into(),
            play_text: text.into(),
            ..snap(drive, 2, offense, defense)
        }
    }

    fn scoring(drive: u32, offense: &str, defense: &str, play_type: &str) -> Play {
        Play {
            scoring: true,
            play_type: play_type.into(),
            ..snap(drive, 2, offense, defense)
        }
    }

    #[test]
    fn test_points_credited_to_forcing_team() {
        let plays: Vec<ClassifiedPlay> = vec![
            snap(1, 1, "Purdue", "Minnesota"),
            turnover(1, "Purdue", "Minnesota", "Pass Interception Return", "intercepted"),
            snap(2, 1, "Minnesota", "Purdue"),
            scoring(2, "Minnesota", "Purdue", "Passing Touchdown"),
            snap(3, 1, "Minnesota", "Purdue"),
            turnover(3, "Minnesota", "Purdue", "Fumble Recovery (Opponent)", "fumbled"),
            snap(4, 1, "Purdue", "Minnesota"),
            scoring(4, "Purdue", "Minnesota", "Field Goal Good"),
        ]
        .into_iter()
        .map(classify)
        .collect();
        let drives = aggregate_drives(&plays);
        let analysis = analyze(&plays, &drives, "Purdue");

        assert_eq!(analysis.plays.len(), 2);
        let pick = &analysis.plays[0];
        assert_eq!(pick.forced_by, "Minnesota");
        assert_eq!(pick.next_drive_id.as_deref(), Some("d2"));
        assert_eq!(pick.points, 7);
        assert_eq!(pick.result, FollowupResult::Touchdown);

        assert_eq!(analysis.totals.committed.turnovers, 1);
        assert_eq!(analysis.totals.committed.points, 7);
        assert_eq!(analysis.totals.forced.turnovers, 1);
        assert_eq!(analysis.totals.forced.points, 3);
        assert_eq!(analysis.breakdowns.by_kind["fumble"].forced.points, 3);
        assert_eq!(analysis.breakdowns.by_game[0].margin, 0);
    }

    #[test]
    fn test_pick_six_scores_directly() {
        let mut pick_six = turnover(
            1,
            "Purdue",
            "Minnesota",
            "Interception Return Touchdown",
            "intercepted, TOUCHDOWN",
        );
        pick_six.scoring = true;
        let plays: Vec<ClassifiedPlay> = vec![snap(1, 1, "Purdue", "Minnesota"), pick_six]
            .into_iter()
            .map(classify)
            .collect();
        let drives = aggregate_drives(&plays);
        let analysis = analyze(&plays, &drives, "Purdue");
        assert_eq!(analysis.plays[0].result, FollowupResult::ReturnTouchdown);
        assert_eq!(analysis.plays[0].points, 7);
        assert_eq!(analysis.plays[0].next_drive_id, None);
        assert_eq!(analysis.totals.committed.points, 7);
    }

    #[test]
    fn test_excluded_turnovers() {
        let candidates = vec![
            turnover(1, "Purdue", "Minnesota", "Turnover on Downs", ""),
            turnover(1, "Purdue", "Minnesota", "Pass Interception Return", "intercepted, NO PLAY"),
            turnover(
                1,
                "Purdue",
                "Minnesota",
                "Fumble Recovery (Own)",
                "fumbled, recovered by PUR",
            ),
            turnover(1, "Purdue", "Minnesota", "Penalty", "holding"),
        ];
        for p in candidates {
            assert!(!is_possession_turnover(&classify(p)));
        }
        let lost = turnover(
            1,
            "Purdue",
            "Minnesota",
            "Fumble Recovery (Own)",
            "fumbled, recovered by Minnesota",
        );
        assert!(is_possession_turnover(&classify(lost)));
    }

    #[test]
    fn test_muffed_punt_committed_by_receiver() {
        let muff = classify(turnover(
            5,
            "Minnesota",
            "Purdue",
            "Punt",
            "punt for 40 yds, muffed, fumble recovered by MINN",
        ));
        assert_eq!(committed_by(&muff), "Purdue");
    }
}
