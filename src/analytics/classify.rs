//! Per-play situational classification.
//!
//! Every function here is pure and total over a canonical [`Play`]: grading a
//! malformed situation (down 0, missing field position) produces a failed or
//! negative classification rather than an error.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{
    ClassifiedPlay, Play, PlayClassification, SpecialTeamsKind, SuccessGrade, TurnoverKind,
};

/// Scrimmage gain that makes a play explosive
pub const EXPLOSIVE_SCRIMMAGE_YARDS: i32 = 20;
/// Kickoff return yardage that makes a return explosive
pub const EXPLOSIVE_KICKOFF_RETURN_YARDS: i32 = 35;
/// Punt return yardage that makes a return explosive
pub const EXPLOSIVE_PUNT_RETURN_YARDS: i32 = 20;

pub const RED_ZONE_YARDS: u32 = 20;
pub const GREEN_ZONE_YARDS: u32 = 30;

/// Middle-eight window length on each side of halftime
const MIDDLE_EIGHT_SECONDS: u32 = 4 * 60;
const PERIOD_SECONDS: u32 = 15 * 60;

/// Slack on the 0.4 threshold so 11 × 0.4 = 4.4000000000000004 still rounds down.
const ROUNDING_TOLERANCE: f64 = 1e-9;

// ── Success grading ──────────────────────────────────────────────────────────

/// Round required yardage: a fractional part up to 0.4 rounds down,
/// anything above rounds up (4.4 → 4, 4.45 → 5).
pub fn round_required_yards(yards: f64) -> u32 {
    if !yards.is_finite() || yards <= 0.0 {
        return 0;
    }
    let whole = yards.floor();
    if yards - whole <= 0.4 + ROUNDING_TOLERANCE {
        whole as u32
    } else {
        yards.ceil() as u32
    }
}

/// Grade a play as a success or failure for the offense.
///
/// Scoring plays always succeed. Otherwise 1st down needs 40% of the
/// distance, 2nd down 60%, 3rd and 4th down the full distance.
pub fn classify_success(play: &Play) -> SuccessGrade {
    if play.scoring {
        return SuccessGrade {
            is_successful: true,
            reason: "Touchdown".to_string(),
            yards_needed: 0,
        };
    }

    let distance = play.distance;
    let gained = play.yards_gained;
    let (needed, share) = match play.down {
        1 => (round_required_yards(distance as f64 * 0.4), "40%"),
        2 => (round_required_yards(distance as f64 * 0.6), "60%"),
        3 | 4 => (distance, "100%"),
        _ => {
            return SuccessGrade {
                is_successful: false,
                reason: "Unknown down".to_string(),
                yards_needed: 0,
            }
        }
    };

    SuccessGrade {
        is_successful: gained >= needed as i32,
        reason: format!(
            "{} down: need {} yards ({} of {}), gained {}",
            ordinal(play.down),
            needed,
            share,
            distance,
            gained
        ),
        yards_needed: needed,
    }
}

pub fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

// ── Play type heuristics ─────────────────────────────────────────────────────

pub fn is_touchdown(play: &Play) -> bool {
    play.type_mentions("touchdown")
        || (play.scoring && (play.text_mentions("touchdown") || play.text_mentions(" td")))
}

pub fn is_field_goal(play: &Play) -> bool {
    play.type_mentions("field goal")
}

pub fn is_kneel(play: &Play) -> bool {
    play.mentions("kneel")
}

fn is_return(play: &Play) -> bool {
    play.mentions("return")
}

/// Special-teams sub-kind from the play type, refined by the text.
pub fn special_teams_kind(play: &Play) -> Option<SpecialTeamsKind> {
    if play.mentions("blocked punt") || play.mentions("punt blocked") {
        return Some(SpecialTeamsKind::BlockedPunt);
    }
    if play.type_mentions("kickoff") {
        return Some(if is_return(play) {
            SpecialTeamsKind::KickoffReturn
        } else {
            SpecialTeamsKind::Kickoff
        });
    }
    if play.type_mentions("punt") {
        return Some(if is_return(play) {
            SpecialTeamsKind::PuntReturn
        } else {
            SpecialTeamsKind::Punt
        });
    }
    if is_field_goal(play) {
        return Some(SpecialTeamsKind::FieldGoal);
    }
    if play.type_mentions("extra point") || play.type_mentions("pat ") {
        return Some(SpecialTeamsKind::ExtraPoint);
    }
    None
}

pub fn classify_play(play: &Play) -> PlayClassification {
    if special_teams_kind(play).is_some() {
        PlayClassification::SpecialTeams
    } else if play.type_mentions("penalty") {
        PlayClassification::Penalty
    } else {
        PlayClassification::Normal
    }
}

fn return_pattern() -> Option<&'static Regex> {
    static RETURN_RE: OnceLock<Option<Regex>> = OnceLock::new();
    RETURN_RE
        .get_or_init(|| Regex::new(r"(?i)returns? for (?:no gain|(-?\d+) (?:yds?|yards?))").ok())
        .as_ref()
}

/// Return yardage as stated in the play text, 0 when the text does not say.
///
/// `yards_gained` is not used: some feeds fold the kick distance into it.
pub fn return_yards(play: &Play) -> i32 {
    return_pattern()
        .and_then(|re| re.captures(&play.play_text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(0)
}

/// Explosive scrimmage gain or explosive return.
pub fn classify_explosive(play: &Play) -> bool {
    if is_kneel(play) {
        return false;
    }
    match special_teams_kind(play) {
        Some(SpecialTeamsKind::KickoffReturn) => {
            return_yards(play) >= EXPLOSIVE_KICKOFF_RETURN_YARDS
        }
        Some(SpecialTeamsKind::PuntReturn) => return_yards(play) >= EXPLOSIVE_PUNT_RETURN_YARDS,
        Some(_) => false,
        None => {
            classify_play(play) != PlayClassification::Penalty
                && play.yards_gained >= EXPLOSIVE_SCRIMMAGE_YARDS
        }
    }
}

// ── Field position and clock ─────────────────────────────────────────────────

pub fn in_red_zone(play: &Play) -> bool {
    play.yards_to_goal.is_some_and(|y| y <= RED_ZONE_YARDS)
}

pub fn in_green_zone(play: &Play) -> bool {
    play.yards_to_goal.is_some_and(|y| y <= GREEN_ZONE_YARDS)
}

/// Last four minutes of the 2nd period or first four of the 3rd.
pub fn is_middle_eight(play: &Play) -> bool {
    match (play.period, play.clock) {
        (2, Some(remaining)) => remaining <= MIDDLE_EIGHT_SECONDS,
        (3, Some(remaining)) => remaining >= PERIOD_SECONDS - MIDDLE_EIGHT_SECONDS,
        _ => false,
    }
}

// ── Turnovers and scoring ────────────────────────────────────────────────────

/// Kind of a flagged turnover; `None` for plays without the flag.
pub fn classify_turnover(play: &Play) -> Option<TurnoverKind> {
    if !play.turnover {
        return None;
    }
    if play.type_mentions("downs") {
        Some(TurnoverKind::Downs)
    } else if play.mentions("interception") || play.text_mentions("intercepted") {
        Some(TurnoverKind::Interception)
    } else if play.mentions("fumble") {
        Some(TurnoverKind::Fumble)
    } else if play.text_mentions("downs") {
        Some(TurnoverKind::Downs)
    } else {
        None
    }
}

/// Points a scoring play is worth, assuming the extra point on touchdowns.
pub fn scoring_points(play: &Play) -> u32 {
    if !play.scoring {
        return 0;
    }
    if is_touchdown(play) {
        7
    } else if is_field_goal(play) || play.text_mentions("field goal") {
        3
    } else if play.mentions("safety") {
        2
    } else {
        0
    }
}

// ── Whole-play classification ────────────────────────────────────────────────

pub fn classify(play: Play) -> ClassifiedPlay {
    debug_assert!(
        play.yard_line.zip(play.yards_to_goal).map_or(true, |(yl, ytg)| yl + ytg == 100),
        "yard line and yards to goal disagree for play {}",
        play.play_id
    );
    let grade = classify_success(&play);
    ClassifiedPlay {
        is_successful: grade.is_successful,
        success_reason: grade.reason,
        yards_needed: grade.yards_needed,
        explosive: classify_explosive(&play),
        play_classification: classify_play(&play),
        special_teams: special_teams_kind(&play),
        turnover_kind: classify_turnover(&play),
        middle_eight: is_middle_eight(&play),
        in_red_zone: in_red_zone(&play),
        in_green_zone: in_green_zone(&play),
        play,
    }
}

pub fn classify_all(plays: Vec<Play>) -> Vec<ClassifiedPlay> {
    plays.into_iter().map(classify).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn play(down: u8, distance: u32, gained: i32) -> Play {
        Play {
            play_id: "1".into(),
            game_id: "g1".into(),
            week: Some(1),
            drive_id: "d1".into(),
            drive_number: 1,
            play_number: 1,
            period: 1,
            clock: Some(600),
            down,
            distance,
            yard_line: Some(50),
            yards_to_goal: Some(50),
            offense: "Purdue".into(),
            defense: "Minnesota".into(),
            play_type: "Rush".into(),
            play_text: String::new(),
            yards_gained: gained,
            scoring: false,
            ppa: None,
            turnover: false,
        }
    }

    fn typed(play_type: &str, gained: i32) -> Play {
        Play {
            play_type: play_type.into(),
            ..play(4, 10, gained)
        }
    }

    #[test]
    fn rounding_threshold_is_point_four() {
        assert_eq!(round_required_yards(4.0), 4);
        assert_eq!(round_required_yards(4.4), 4);
        assert_eq!(round_required_yards(4.41), 5);
        assert_eq!(round_required_yards(4.45), 5);
        assert_eq!(round_required_yards(4.5), 5);
        assert_eq!(round_required_yards(4.6), 5);
        assert_eq!(round_required_yards(0.0), 0);
        // 11 × 0.4 is not exactly 4.4 in binary
        assert_eq!(round_required_yards(11.0 * 0.4), 4);
    }

    #[test]
    fn first_down_needs_forty_percent() {
        assert!(classify_success(&play(1, 10, 4)).is_successful);
        let miss = classify_success(&play(1, 10, 3));
        assert!(!miss.is_successful);
        assert_eq!(miss.yards_needed, 4);
        assert_eq!(miss.reason, "1st down: need 4 yards (40% of 10), gained 3");
    }

    #[test]
    fn second_down_needs_sixty_percent() {
        let grade = classify_success(&play(2, 5, 3));
        assert!(grade.is_successful);
        assert_eq!(grade.yards_needed, 3);
        assert!(!classify_success(&play(2, 5, 2)).is_successful);
    }

    #[test]
    fn third_and_fourth_need_full_distance() {
        assert!(classify_success(&play(3, 7, 7)).is_successful);
        assert!(!classify_success(&play(3, 7, 6)).is_successful);
        let fourth = classify_success(&play(4, 2, 1));
        assert!(!fourth.is_successful);
        assert!(fourth.reason.starts_with("4th down"));
    }

    #[test]
    fn scoring_play_always_succeeds() {
        for down in 0..=4 {
            let p = Play {
                scoring: true,
                play_type: "Rushing Touchdown".into(),
                ..play(down, 10, 1)
            };
            let grade = classify_success(&p);
            assert!(grade.is_successful);
            assert_eq!(grade.reason, "Touchdown");
        }
    }

    #[test]
    fn unknown_down_fails() {
        let grade = classify_success(&play(0, 10, 30));
        assert!(!grade.is_successful);
        assert_eq!(grade.reason, "Unknown down");
    }

    #[test]
    fn scrimmage_explosive_boundary() {
        assert!(classify_explosive(&play(1, 10, 20)));
        assert!(!classify_explosive(&play(1, 10, 19)));
        assert!(!classify_explosive(&typed("Penalty", 25)));
    }

    fn returned(play_type: &str, yards: i32) -> Play {
        Play {
            play_text: format!("kick for 50 yds, return for {} yds", yards),
            ..typed(play_type, yards)
        }
    }

    #[test]
    fn kickoff_return_boundary() {
        assert!(classify_explosive(&returned("Kickoff Return (Offense)", 35)));
        assert!(!classify_explosive(&returned("Kickoff Return (Offense)", 34)));
    }

    #[test]
    fn punt_return_boundary() {
        assert!(classify_explosive(&returned("Punt Return", 20)));
        assert!(!classify_explosive(&returned("Punt Return", 19)));
    }

    #[test]
    fn return_without_stated_yardage_is_zero() {
        // yards_gained carries the punt distance here
        let p = Play {
            play_text: "Brett Thorson punt for 44 yds , Koi Perich return to the MINN 40".into(),
            ..typed("Punt Return", 44)
        };
        assert_eq!(return_yards(&p), 0);
        assert!(!classify_explosive(&p));
    }

    #[test]
    fn return_yards_prefer_text() {
        let p = Play {
            play_text: "Brady Denaburg kickoff for 62 yds , Quincy Craig return for 41 yds to the PUR 44"
                .into(),
            ..typed("Kickoff Return (Offense)", 21)
        };
        assert_eq!(return_yards(&p), 41);
        assert!(classify_explosive(&p));

        let fair = Play {
            play_text: "punt for 45 yds, returns for no gain".into(),
            ..typed("Punt Return", 45)
        };
        assert_eq!(return_yards(&fair), 0);
        assert!(!classify_explosive(&fair));
    }

    #[test]
    fn kicks_without_return_never_explosive() {
        assert!(!classify_explosive(&typed("Punt", 55)));
        assert!(!classify_explosive(&typed("Field Goal Good", 45)));
        let kneel = Play {
            play_text: "Ryan Browne kneels for -2 yds".into(),
            ..typed("Rush", 25)
        };
        assert!(!classify_explosive(&kneel));
    }

    #[test]
    fn zone_boundaries() {
        let at = |ytg| Play {
            yards_to_goal: Some(ytg),
            yard_line: Some(100 - ytg),
            ..play(1, 10, 0)
        };
        assert!(in_red_zone(&at(20)));
        assert!(!in_red_zone(&at(21)));
        assert!(in_green_zone(&at(30)));
        assert!(!in_green_zone(&at(31)));
        assert!(in_red_zone(&at(15)) && in_green_zone(&at(15)));

        let unknown = Play {
            yards_to_goal: None,
            yard_line: None,
            ..play(1, 10, 0)
        };
        assert!(!in_red_zone(&unknown));
    }

    #[test]
    fn middle_eight_window() {
        let at = |period, clock| Play {
            period,
            clock: Some(clock),
            ..play(1, 10, 0)
        };
        assert!(is_middle_eight(&at(2, 240)));
        assert!(!is_middle_eight(&at(2, 241)));
        assert!(is_middle_eight(&at(3, 660)));
        assert!(is_middle_eight(&at(3, 900)));
        assert!(!is_middle_eight(&at(3, 659)));
        assert!(!is_middle_eight(&at(1, 100)));
        assert!(!is_middle_eight(&Play {
            clock: None,
            ..at(2, 0)
        }));
    }

    #[test]
    fn classification_and_special_teams_kind() {
        assert_eq!(classify_play(&typed("Rush", 3)), PlayClassification::Normal);
        assert_eq!(classify_play(&typed("Penalty", 5)), PlayClassification::Penalty);
        assert_eq!(
            classify_play(&typed("Field Goal Missed", 0)),
            PlayClassification::SpecialTeams
        );
        assert_eq!(
            special_teams_kind(&typed("Blocked Punt", 0)),
            Some(SpecialTeamsKind::BlockedPunt)
        );
        assert_eq!(special_teams_kind(&typed("Kickoff", 0)), Some(SpecialTeamsKind::Kickoff));
        assert_eq!(
            special_teams_kind(&typed("Extra Point Good", 0)),
            Some(SpecialTeamsKind::ExtraPoint)
        );
    }

    #[test]
    fn turnover_kinds() {
        let flagged = |play_type: &str, text: &str| Play {
            turnover: true,
            play_text: text.into(),
            ..typed(play_type, 0)
        };
        assert_eq!(
            classify_turnover(&flagged("Pass Interception Return", "")),
            Some(TurnoverKind::Interception)
        );
        assert_eq!(
            classify_turnover(&flagged("Fumble Recovery (Opponent)", "")),
            Some(TurnoverKind::Fumble)
        );
        assert_eq!(
            classify_turnover(&flagged("Turnover on Downs", "")),
            Some(TurnoverKind::Downs)
        );
        assert_eq!(classify_turnover(&typed("Pass Interception Return", 0)), None);
    }

    #[test]
    fn points_by_scoring_play() {
        let scored = |play_type: &str| Play {
            scoring: true,
            ..typed(play_type, 0)
        };
        assert_eq!(scoring_points(&scored("Passing Touchdown")), 7);
        assert_eq!(scoring_points(&scored("Field Goal Good")), 3);
        assert_eq!(scoring_points(&scored("Safety")), 2);
        assert_eq!(scoring_points(&typed("Passing Touchdown", 0)), 0);
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
    }

    #[test]
    fn classify_fills_every_flag() {
        let p = Play {
            period: 2,
            clock: Some(120),
            yards_to_goal: Some(12),
            yard_line: Some(88),
            ..play(1, 10, 12)
        };
        let c = classify(p);
        assert!(c.is_successful);
        assert!(!c.explosive);
        assert!(c.middle_eight);
        assert!(c.in_red_zone && c.in_green_zone);
        assert_eq!(c.play_classification, PlayClassification::Normal);
        assert_eq!(c.special_teams, None);
    }
}
