use serde::{Deserialize, Serialize};

use crate::models::Play;

/// What showed that a go-for-it (or 3rd-down) play moved the chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionEvidence {
    /// Text annotates "1st down" / "first down"
    FirstDownText,
    /// Type or text mentions a touchdown
    Touchdown,
    /// No textual evidence; `yards_gained >= distance`
    Yardage,
}

/// True for a 4th-down play where the offense actually went for it.
///
/// Punts, field goals and timeouts are not decisions to go, and a penalty
/// marked "no play" never happened.
pub fn is_go_for_it(play: &Play) -> bool {
    if play.down != 4 {
        return false;
    }
    if play.mentions("punt") || play.mentions("field goal") || play.mentions("timeout") {
        return false;
    }
    !(play.type_mentions("penalty") && play.text_mentions("no play"))
}

/// Conversion evidence in priority order: text first, then touchdown, then
/// the numeric fallback. `None` means the play did not convert.
pub fn conversion_evidence(play: &Play) -> Option<ConversionEvidence> {
    if play.text_mentions("1st down") || play.text_mentions("first down") {
        Some(ConversionEvidence::FirstDownText)
    } else if play.mentions("touchdown") {
        Some(ConversionEvidence::Touchdown)
    } else if play.yards_gained >= play.distance as i32 {
        Some(ConversionEvidence::Yardage)
    } else {
        None
    }
}

pub fn is_converted(play: &Play) -> bool {
    conversion_evidence(play).is_some()
}

/// 3rd-down conversion check used by the zone breakdowns.
pub fn is_third_down_conversion(play: &Play) -> bool {
    play.down == 3 && is_converted(play)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::classify::tests::play;

    fn fourth(play_type: &str, text: &str, distance: u32, gained: i32) -> Play {
        Play {
            play_type: play_type.into(),
            play_text: text.into(),
            ..play(4, distance, gained)
        }
    }

    #[test]
    fn test_kicks_and_timeouts_are_not_decisions() {
        assert!(!is_go_for_it(&fourth("Punt", "punt for 40 yds", 8, 0)));
        assert!(!is_go_for_it(&fourth("Field Goal Good", "33 yd FG GOOD", 3, 0)));
        assert!(!is_go_for_it(&fourth("Timeout", "Timeout PURDUE", 2, 0)));
        assert!(!is_go_for_it(&fourth(
            "Penalty",
            "PURDUE Penalty, False Start (5 Yards) NO PLAY",
            2,
            0
        )));
        assert!(is_go_for_it(&fourth("Rush", "run for 3 yds", 2, 3)));
    }

    #[test]
    fn test_only_fourth_down_counts() {
        let third = Play {
            down: 3,
            ..fourth("Rush", "", 2, 3)
        };
        assert!(!is_go_for_it(&third));
    }

    #[test]
    fn test_text_overrides_short_yardage() {
        let p = fourth(
            "Pass Incompletion",
            "pass incomplete, defensive pass interference, first down",
            6,
            0,
        );
        assert_eq!(conversion_evidence(&p), Some(ConversionEvidence::FirstDownText));
        assert!(is_converted(&p));
    }

    #[test]
    fn test_touchdown_then_yardage_fallback() {
        let td = fourth("Passing Touchdown", "pass complete for 9 yds", 10, 9);
        assert_eq!(conversion_evidence(&td), Some(ConversionEvidence::Touchdown));

        let gained = fourth("Rush", "run for 2 yds", 1, 2);
        assert_eq!(conversion_evidence(&gained), Some(ConversionEvidence::Yardage));

        let stopped = fourth("Rush", "run for no gain", 1, 0);
        assert_eq!(conversion_evidence(&stopped), None);
    }

    #[test]
    fn test_third_down_conversion() {
        let p = Play {
            play_text: "run for 4 yds to the MINN 30 for a 1ST down".into(),
            ..play(3, 4, 4)
        };
        assert!(is_third_down_conversion(&p));
        assert!(!is_third_down_conversion(&play(3, 5, 4)));
        assert!(!is_third_down_conversion(&play(2, 5, 6)));
    }
}
