//! Drive aggregation and period bookkeeping.
//!
//! A [`Drive`] borrows its plays from the caller's slice; nothing is cloned.
//! Grouping is by `(game_id, drive_number)` in input order, so callers must
//! hand plays over in game order (normalized batches already are).

use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::debug;

use super::classify::{is_field_goal, is_touchdown, scoring_points};
use crate::models::Play;

pub const PERIOD_SECONDS: u32 = 900;

/// How a drive ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveResult {
    Touchdown,
    FieldGoal,
    Safety,
    Punt,
    MissedFieldGoal,
    Turnover,
    Downs,
    EndOfHalf,
    Other,
}

impl DriveResult {
    /// Whether the offense put points on the board
    pub fn is_offensive_score(self) -> bool {
        matches!(self, DriveResult::Touchdown | DriveResult::FieldGoal)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Drive<'a, P> {
    pub drive_id: String,
    pub game_id: String,
    pub drive_number: u32,
    pub offense_team: String,
    pub plays: Vec<&'a P>,
    pub start_period: u8,
    pub start_clock: Option<u32>,
    pub end_period: u8,
    pub end_clock: Option<u32>,
    /// Clock-derived unless overridden by [`Drive::with_recorded_elapsed`]
    pub elapsed_seconds: Option<u32>,
    pub is_score: bool,
    pub result: DriveResult,
}

fn as_play<P: AsRef<Play>>(p: &P) -> &Play {
    p.as_ref()
}

impl<'a, P: AsRef<Play>> Drive<'a, P> {
    fn seal(plays: Vec<&'a P>) -> Option<Self> {
        let first = as_play(*plays.first()?);
        let last = as_play(*plays.last()?);
        let result = drive_result(plays.iter().map(|p| as_play(*p)));
        Some(Drive {
            drive_id: first.drive_id.clone(),
            game_id: first.game_id.clone(),
            drive_number: first.drive_number,
            offense_team: first.offense.clone(),
            start_period: first.period,
            start_clock: first.clock,
            end_period: last.period,
            end_clock: last.clock,
            elapsed_seconds: clock_elapsed(first.period, first.clock, last.period, last.clock),
            is_score: result.is_offensive_score(),
            result,
            plays,
        })
    }

    /// Replace the clock-derived elapsed time with the provider's own total.
    pub fn with_recorded_elapsed(mut self, seconds: u32) -> Self {
        self.elapsed_seconds = Some(seconds);
        self
    }

    pub fn spans_periods(&self) -> bool {
        self.start_period != self.end_period
    }

    pub fn iter_plays(&self) -> impl Iterator<Item = &Play> + Clone + '_ {
        self.plays.iter().map(|p| as_play(*p))
    }

    /// Net yards from scrimmage; special-teams plays excluded
    pub fn yards(&self) -> i32 {
        self.iter_plays()
            .filter(|p| super::classify::special_teams_kind(p).is_none())
            .map(|p| p.yards_gained)
            .sum()
    }

    /// Points the offense scored on this drive
    pub fn points(&self) -> u32 {
        self.iter_plays()
            .filter(|p| p.offense == self.offense_team && !p.turnover)
            .map(scoring_points)
            .max()
            .unwrap_or(0)
    }
}

fn clock_elapsed(
    start_period: u8,
    start_clock: Option<u32>,
    end_period: u8,
    end_clock: Option<u32>,
) -> Option<u32> {
    let (start, end) = (start_clock?, end_clock?);
    if end_period <= start_period {
        return Some(start.saturating_sub(end));
    }
    let full_periods = (end_period - start_period - 1) as u32;
    Some(start + full_periods * PERIOD_SECONDS + PERIOD_SECONDS.saturating_sub(end))
}

fn drive_result<'p>(plays: impl Iterator<Item = &'p Play> + Clone) -> DriveResult {
    if plays.clone().any(|p| p.turnover && !p.type_mentions("downs")) {
        return DriveResult::Turnover;
    }
    if plays.clone().any(|p| p.scoring && is_touchdown(p)) {
        return DriveResult::Touchdown;
    }
    if plays.clone().any(|p| p.scoring && is_field_goal(p)) {
        return DriveResult::FieldGoal;
    }
    if plays.clone().any(|p| p.scoring && p.mentions("safety")) {
        return DriveResult::Safety;
    }

    let Some(last) = plays.clone().last() else {
        return DriveResult::Other;
    };
    if last.type_mentions("punt") {
        DriveResult::Punt
    } else if is_field_goal(last) {
        DriveResult::MissedFieldGoal
    } else if last.type_mentions("downs")
        || (last.down == 4 && !super::fourth_down::is_converted(last))
    {
        DriveResult::Downs
    } else if last.mentions("end of half")
        || last.mentions("end of game")
        || (matches!(last.period, 2 | 4) && last.clock == Some(0))
    {
        DriveResult::EndOfHalf
    } else {
        DriveResult::Other
    }
}

/// Group plays into drives, sealing a drive whenever the game or the drive
/// number changes.
pub fn aggregate_drives<P: AsRef<Play>>(plays: &[P]) -> Vec<Drive<'_, P>> {
    let mut drives = Vec::new();
    let mut current: Vec<&P> = Vec::new();

    for play in plays {
        let p = as_play(play);
        let same_drive = current.last().is_some_and(|prev| {
            let prev = as_play(*prev);
            prev.game_id == p.game_id && prev.drive_number == p.drive_number
        });
        if !same_drive {
            drives.extend(Drive::seal(std::mem::take(&mut current)));
        }
        current.push(play);
    }
    drives.extend(Drive::seal(current));
    drives
}

// ── Possession split ─────────────────────────────────────────────────────────

/// Possession time of one drive, per period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PossessionSplit {
    Single {
        period: u8,
        seconds: u32,
    },
    Spanning {
        start_period: u8,
        start_seconds: u32,
        end_period: u8,
        end_seconds: u32,
    },
}

impl PossessionSplit {
    /// (period, seconds) pairs
    pub fn shares(&self) -> Vec<(u8, u32)> {
        match *self {
            PossessionSplit::Single { period, seconds } => vec![(period, seconds)],
            PossessionSplit::Spanning {
                start_period,
                start_seconds,
                end_period,
                end_seconds,
            } => vec![(start_period, start_seconds), (end_period, end_seconds)],
        }
    }

    pub fn total(&self) -> u32 {
        self.shares().iter().map(|(_, s)| s).sum()
    }
}

/// Split a drive's elapsed time between the periods it touched.
///
/// The start period gets the clock that was left in it, the end period the
/// time run off its clock. When that exceeds the drive's total the two are
/// scaled down to sum exactly to it, start share floored. Without both
/// clocks the whole drive lands in the end period.
pub fn split_possession<P: AsRef<Play>>(drive: &Drive<'_, P>) -> PossessionSplit {
    let total = drive.elapsed_seconds.unwrap_or(0);
    if !drive.spans_periods() {
        return PossessionSplit::Single {
            period: drive.start_period,
            seconds: total,
        };
    }

    let (start_seconds, end_seconds) = match (drive.start_clock, drive.end_clock) {
        (Some(start_clock), Some(end_clock)) => {
            let in_start = start_clock;
            let in_end = PERIOD_SECONDS.saturating_sub(end_clock);
            let sum = in_start + in_end;
            if sum > total {
                let scaled = (in_start as u64 * total as u64 / sum as u64) as u32;
                (scaled, total - scaled)
            } else {
                (in_start, in_end)
            }
        }
        _ => {
            debug!(
                "Drive {}: clock missing, crediting {}s to period {}",
                drive.drive_id, total, drive.end_period
            );
            (0, total)
        }
    };

    PossessionSplit::Spanning {
        start_period: drive.start_period,
        start_seconds,
        end_period: drive.end_period,
        end_seconds,
    }
}

// ── Period boundaries ────────────────────────────────────────────────────────

fn sentinel_pattern() -> Option<&'static Regex> {
    static SENTINEL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    SENTINEL_RE
        .get_or_init(|| {
            Regex::new(concat!(
                r"(?i)\bend of (?:the )?",
                r"(?:\d+(?:st|nd|rd|th)|first|second|third|fourth) quarter",
            ))
            .ok()
        })
        .as_ref()
}

pub fn is_period_sentinel(play: &Play) -> bool {
    sentinel_pattern().is_some_and(|re| re.is_match(&play.play_text))
}

/// Index of the first play of each new period, in order.
///
/// The only signal is a sentinel play whose text reads "End of Nth Quarter";
/// the play right after it opens the next period.
pub fn detect_period_boundaries<P: AsRef<Play>>(plays: &[P]) -> Vec<usize> {
    let mut boundaries: Vec<usize> = plays
        .iter()
        .enumerate()
        .filter(|(_, p)| is_period_sentinel(as_play(*p)))
        .map(|(i, _)| i + 1)
        .collect();
    boundaries.dedup();
    boundaries
}

/// Half-open play-index range of each period; entry 0 is the 1st period.
pub fn period_ranges<P>(plays: &[P], boundaries: &[usize]) -> Vec<Range<usize>> {
    let len = plays.len();
    let mut starts = vec![0];
    starts.extend(boundaries.iter().map(|&b| b.min(len)));
    let mut ranges = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(len);
        ranges.push(start..end.max(start));
    }
    ranges
}

/// All plays of one period (1-based), e.g. `plays_in_period(&plays, 4)`.
pub fn plays_in_period<P: AsRef<Play>>(plays: &[P], period: u8) -> &[P] {
    if period == 0 {
        return &plays[..0];
    }
    let boundaries = detect_period_boundaries(plays);
    period_ranges(plays, &boundaries)
        .get(period as usize - 1)
        .map(|range| &plays[range.clone()])
        .unwrap_or(&plays[..0])
}
