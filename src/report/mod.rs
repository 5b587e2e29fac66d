//! Roll-ups of classified plays into scouting-report summaries.
//!
//! Every analysis follows the same layout: season `totals`, a
//! `last_3_games` window, concern-specific `breakdowns`, and the `plays`
//! that fed it. Rates are percentages and never divide by zero.

pub mod explosive;
pub mod fourth_down;
pub mod middle_eight;
pub mod possession;
pub mod special_teams;
pub mod success;
pub mod turnovers;
pub mod zones;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use crate::analytics::drives::aggregate_drives;
use crate::analytics::fourth_down::is_converted;
use crate::models::{ClassifiedPlay, Play, PlayClassification};

/// Number of most recent games in the trailing window
pub const LAST_GAMES_WINDOW: usize = 3;

// ── Rates ────────────────────────────────────────────────────────────────────

/// `numerator / denominator × 100`, or 0 for an empty denominator.
pub fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

/// Percentage with one decimal, e.g. "42.9%"
pub fn format_rate(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

/// Mean of a sum over `count` items, 0 when there are none.
pub fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

// ── Games ────────────────────────────────────────────────────────────────────

/// One game seen in a play set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRef {
    pub game_id: String,
    pub week: Option<u32>,
}

/// Distinct games in week order; games with the same (or no) week keep the
/// order they first appear in.
pub fn games_by_week<P: AsRef<Play>>(plays: &[P]) -> Vec<GameRef> {
    let mut seen = HashSet::new();
    let mut games: Vec<GameRef> = plays
        .iter()
        .map(AsRef::<Play>::as_ref)
        .filter(|p| seen.insert(p.game_id.as_str()))
        .map(|p| GameRef {
            game_id: p.game_id.clone(),
            week: p.week,
        })
        .collect();
    // Stable sort; unknown weeks sort last
    games.sort_by_key(|g| g.week.unwrap_or(u32::MAX));
    games
}

/// Ids of the last `n` distinct games present, oldest first.
pub fn last_n_games<P: AsRef<Play>>(plays: &[P], n: usize) -> Vec<String> {
    let games = games_by_week(plays);
    let skip = games.len().saturating_sub(n);
    games.into_iter().skip(skip).map(|g| g.game_id).collect()
}

/// A statistic computed over the trailing game window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastGames<T> {
    pub games: Vec<String>,
    #[serde(flatten)]
    pub stats: T,
}

/// Plays from any of `games`
pub(crate) fn in_last_games(plays: &[ClassifiedPlay], games: &[String]) -> Vec<ClassifiedPlay> {
    plays
        .iter()
        .filter(|p| games.contains(&p.play.game_id))
        .cloned()
        .collect()
}

/// Attempts and conversions on 3rd or go-for-it 4th downs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Conversions {
    pub attempts: usize,
    pub conversions: usize,
    pub rate: f64,
}

impl Conversions {
    pub(crate) fn count<'a>(plays: impl Iterator<Item = &'a ClassifiedPlay>) -> Self {
        let (attempts, conversions) = plays.fold((0, 0), |(n, c), p| {
            (n + 1, c + usize::from(is_converted(&p.play)))
        });
        Conversions {
            attempts,
            conversions,
            rate: rate(conversions, attempts),
        }
    }
}

// ── Scrimmage plays ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrimmageKind {
    Rush,
    Pass,
}

/// Rush or pass for plays from scrimmage; `None` for kicks, penalties and
/// administrative entries (timeouts, end of period).
pub fn scrimmage_kind(play: &ClassifiedPlay) -> Option<ScrimmageKind> {
    if play.play_classification != PlayClassification::Normal {
        return None;
    }
    let p = &play.play;
    if p.type_mentions("rush") || p.type_mentions("run") {
        Some(ScrimmageKind::Rush)
    } else if ["pass", "sack", "interception", "reception", "incompletion"]
        .iter()
        .any(|kind| p.type_mentions(kind))
    {
        Some(ScrimmageKind::Pass)
    } else if p.type_mentions("touchdown") || p.type_mentions("fumble") {
        // "Rushing Touchdown" is caught above; these are the odd leftovers
        if p.text_mentions("pass") {
            Some(ScrimmageKind::Pass)
        } else {
            Some(ScrimmageKind::Rush)
        }
    } else {
        None
    }
}

// ── Distance buckets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DistanceBucket {
    #[serde(rename = "1 yard or less")]
    OneOrLess,
    #[serde(rename = "2-3 yards")]
    TwoToThree,
    #[serde(rename = "4-5 yards")]
    FourToFive,
    #[serde(rename = "6-10 yards")]
    SixToTen,
    #[serde(rename = "11+ yards")]
    ElevenPlus,
}

impl DistanceBucket {
    pub const ALL: [DistanceBucket; 5] = [
        DistanceBucket::OneOrLess,
        DistanceBucket::TwoToThree,
        DistanceBucket::FourToFive,
        DistanceBucket::SixToTen,
        DistanceBucket::ElevenPlus,
    ];

    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0..=1 => DistanceBucket::OneOrLess,
            2..=3 => DistanceBucket::TwoToThree,
            4..=5 => DistanceBucket::FourToFive,
            6..=10 => DistanceBucket::SixToTen,
            _ => DistanceBucket::ElevenPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DistanceBucket::OneOrLess => "1 yard or less",
            DistanceBucket::TwoToThree => "2-3 yards",
            DistanceBucket::FourToFive => "4-5 yards",
            DistanceBucket::SixToTen => "6-10 yards",
            DistanceBucket::ElevenPlus => "11+ yards",
        }
    }
}

// ── Filtering ────────────────────────────────────────────────────────────────

/// Narrows a play set before analysis. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayFilter {
    #[serde(default)]
    pub game_ids: Vec<String>,
    #[serde(default)]
    pub weeks: Vec<u32>,
    #[serde(default)]
    pub periods: Vec<u8>,
    /// Keep only the last 3 games (by week) that survive the other filters
    #[serde(default)]
    pub last_3_games: bool,
}

impl PlayFilter {
    pub fn is_empty(&self) -> bool {
        self.game_ids.is_empty()
            && self.weeks.is_empty()
            && self.periods.is_empty()
            && !self.last_3_games
    }

    pub fn matches(&self, play: &Play) -> bool {
        (self.game_ids.is_empty() || self.game_ids.contains(&play.game_id))
            && (self.weeks.is_empty() || play.week.is_some_and(|w| self.weeks.contains(&w)))
            && (self.periods.is_empty() || self.periods.contains(&play.period))
    }

    pub fn apply(&self, plays: &[ClassifiedPlay]) -> Vec<ClassifiedPlay> {
        let kept: Vec<ClassifiedPlay> = plays
            .iter()
            .filter(|p| self.matches(&p.play))
            .cloned()
            .collect();
        if !self.last_3_games {
            return kept;
        }
        let games = last_n_games(&kept, LAST_GAMES_WINDOW);
        in_last_games(&kept, &games)
    }
}

// ── Scouting report ──────────────────────────────────────────────────────────

/// Every analysis for one team over one filtered play set
#[derive(Debug, Clone, Serialize)]
pub struct ScoutingReport {
    pub team: String,
    pub games: Vec<GameRef>,
    pub success: success::SuccessAnalysis,
    pub explosive: explosive::ExplosiveAnalysis,
    pub red_zone: zones::ZoneAnalysis,
    pub green_zone: zones::ZoneAnalysis,
    pub fourth_down: fourth_down::FourthDownAnalysis,
    pub turnovers: turnovers::TurnoverAnalysis,
    pub special_teams: special_teams::SpecialTeamsAnalysis,
    pub middle_eight: middle_eight::MiddleEightAnalysis,
    pub possession: possession::PossessionAnalysis,
}

impl ScoutingReport {
    pub fn build(plays: &[ClassifiedPlay], team: &str, filter: &PlayFilter) -> Self {
        Self::build_with_drive_times(plays, team, filter, &BTreeMap::new())
    }

    /// Same as [`ScoutingReport::build`], with provider-recorded drive
    /// durations (keyed by drive id) taking precedence over the clock.
    pub fn build_with_drive_times(
        plays: &[ClassifiedPlay],
        team: &str,
        filter: &PlayFilter,
        drive_times: &BTreeMap<String, u32>,
    ) -> Self {
        let plays = filter.apply(plays);
        let games = games_by_week(&plays);
        info!(
            "Building report for {}: {} plays across {} games",
            team,
            plays.len(),
            games.len()
        );

        let drives: Vec<_> = aggregate_drives(&plays)
            .into_iter()
            .map(|d| match drive_times.get(&d.drive_id) {
                Some(&seconds) => d.with_recorded_elapsed(seconds),
                None => d,
            })
            .collect();

        ScoutingReport {
            team: team.to_string(),
            success: success::analyze(&plays, team),
            explosive: explosive::analyze(&plays, team),
            red_zone: zones::analyze(&plays, team, zones::Zone::Red),
            green_zone: zones::analyze(&plays, team, zones::Zone::Green),
            fourth_down: fourth_down::analyze(&plays, team),
            turnovers: turnovers::analyze(&plays, &drives, team),
            special_teams: special_teams::analyze(&plays, team),
            middle_eight: middle_eight::analyze(&plays, team),
            possession: possession::analyze(&drives),
            games,
        }
    }
}
