use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which upstream feed a raw record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Proprietary advanced-stats feed (flat play records)
    Advanced,
    /// Public sports network feed (nested start/end state, `$ref` team links)
    Network,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Advanced => write!(f, "advanced"),
            Provider::Network => write!(f, "network"),
        }
    }
}

/// A team as identified by one game's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    /// Provider team id ("2509"); absent for feeds that only use names
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Per-game metadata stamped onto every play of the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    pub game_id: String,
    /// Week of the season; drives the "last 3 games" ordering
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub home: TeamRef,
    pub away: TeamRef,
}

impl GameContext {
    /// Resolve a provider team reference to one of this game's teams.
    ///
    /// Accepts a bare id ("2509"), a `$ref` link
    /// (".../teams/2509?lang=en") or a team name.
    pub fn resolve_team(&self, reference: &str) -> Option<&TeamRef> {
        let id = team_id_from_ref(reference).unwrap_or(reference);
        [&self.home, &self.away].into_iter().find(|team| {
            team.id.as_deref() == Some(id) || team.name.eq_ignore_ascii_case(reference)
        })
    }

    /// The other team in this game
    pub fn opponent_of(&self, team_name: &str) -> Option<&TeamRef> {
        if self.home.name.eq_ignore_ascii_case(team_name) {
            Some(&self.away)
        } else if self.away.name.eq_ignore_ascii_case(team_name) {
            Some(&self.home)
        } else {
            None
        }
    }
}

/// Pull the numeric team id out of a `$ref` style link.
fn team_id_from_ref(reference: &str) -> Option<&str> {
    let start = reference.find("teams/")? + "teams/".len();
    let rest = &reference[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        None
    } else {
        Some(&rest[..end])
    }
}

/// Canonical play record shared by both providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub play_id: String,
    pub game_id: String,
    #[serde(default)]
    pub week: Option<u32>,
    pub drive_id: String,
    pub drive_number: u32,
    /// 1-based, strictly increasing within the drive
    pub play_number: u32,
    /// 1–4, overtime periods continue from 5
    pub period: u8,
    /// Seconds remaining in the period at the snap
    #[serde(default)]
    pub clock: Option<u32>,
    pub down: u8,
    /// Yards to go for a first down
    pub distance: u32,
    /// Own-goal-relative yard line (0–100)
    #[serde(default)]
    pub yard_line: Option<u32>,
    /// Always `100 - yard_line` when both are known
    #[serde(default)]
    pub yards_to_goal: Option<u32>,
    pub offense: String,
    pub defense: String,
    /// Free-text category from the source, e.g. "Rush", "Punt Return"
    pub play_type: String,
    pub play_text: String,
    pub yards_gained: i32,
    pub scoring: bool,
    /// Predicted points added, passed through untouched
    #[serde(default)]
    pub ppa: Option<f64>,
    pub turnover: bool,
}

impl Play {
    pub fn is_offense(&self, team: &str) -> bool {
        self.offense.eq_ignore_ascii_case(team)
    }

    pub fn is_defense(&self, team: &str) -> bool {
        self.defense.eq_ignore_ascii_case(team)
    }

    /// Case-insensitive search over both the play type and the play text.
    pub fn mentions(&self, needle: &str) -> bool {
        self.type_mentions(needle) || self.text_mentions(needle)
    }

    pub fn type_mentions(&self, needle: &str) -> bool {
        self.play_type.to_lowercase().contains(needle)
    }

    pub fn text_mentions(&self, needle: &str) -> bool {
        self.play_text.to_lowercase().contains(needle)
    }
}

impl AsRef<Play> for Play {
    fn as_ref(&self) -> &Play {
        self
    }
}

/// Fill in whichever of yard line / yards-to-goal is missing.
///
/// When both are present yards-to-goal wins: it is offense-relative in every
/// feed, while a provider's raw yard line may be measured from either goal.
pub fn reconcile_field_position(
    yard_line: Option<u32>,
    yards_to_goal: Option<u32>,
) -> (Option<u32>, Option<u32>) {
    match (yard_line, yards_to_goal) {
        (_, Some(ytg)) => {
            let ytg = ytg.min(100);
            (Some(100 - ytg), Some(ytg))
        }
        (Some(yl), None) => {
            let yl = yl.min(100);
            (Some(yl), Some(100 - yl))
        }
        (None, None) => (None, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayClassification {
    Normal,
    SpecialTeams,
    Penalty,
}

/// Finer split of special-teams plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialTeamsKind {
    KickoffReturn,
    Kickoff,
    PuntReturn,
    Punt,
    BlockedPunt,
    FieldGoal,
    ExtraPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    Interception,
    Fumble,
    Downs,
}

/// Outcome of success grading for one play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessGrade {
    pub is_successful: bool,
    pub reason: String,
    /// Yards the play had to gain; 0 when not applicable
    pub yards_needed: u32,
}

/// A canonical play plus everything the classifier derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPlay {
    #[serde(flatten)]
    pub play: Play,
    pub is_successful: bool,
    pub success_reason: String,
    pub yards_needed: u32,
    pub explosive: bool,
    pub play_classification: PlayClassification,
    pub special_teams: Option<SpecialTeamsKind>,
    pub turnover_kind: Option<TurnoverKind>,
    pub middle_eight: bool,
    pub in_red_zone: bool,
    pub in_green_zone: bool,
}

impl AsRef<Play> for ClassifiedPlay {
    fn as_ref(&self) -> &Play {
        &self.play
    }
}

/// Identifier a win-probability sample was keyed by
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayKey {
    Number(u32),
    Id(String),
}

impl fmt::Display for PlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayKey::Number(n) => write!(f, "{}", n),
            PlayKey::Id(id) => write!(f, "{}", id),
        }
    }
}

/// One point of a provider's home-team win-probability series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinProbabilitySample {
    pub key: PlayKey,
    /// 0-based position in the provider's time-ordered stream
    pub sequence_index: usize,
    /// Home win probability in [0, 1]
    pub home_win_probability: f64,
}
