//! Provider records and their mapping into the canonical [`Play`].
//!
//! Each feed gets its own typed record ([`AdvancedPlay`], [`NetworkPlay`])
//! and one total mapping function into [`Play`]. Callers hold a [`RawPlay`]
//! and never look at provider field names themselves.

pub mod advanced;
pub mod network;
pub mod win_probability;

pub use advanced::AdvancedPlay;
pub use network::{flatten_drives, NetworkDrive, NetworkPlay};
pub use win_probability::{normalize_win_probability, RawWinProbability, WinProbabilityFeed};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::error::NormalizationError;
use crate::models::{GameContext, Play, Provider};

/// A play record exactly as one provider shaped it
#[derive(Debug, Clone)]
pub enum RawPlay {
    Advanced(AdvancedPlay),
    Network(NetworkPlay),
}

impl RawPlay {
    pub fn provider(&self) -> Provider {
        match self {
            RawPlay::Advanced(_) => Provider::Advanced,
            RawPlay::Network(_) => Provider::Network,
        }
    }

    /// Decode an untyped JSON record for the given provider.
    pub fn from_value(
        provider: Provider,
        value: serde_json::Value,
    ) -> Result<Self, NormalizationError> {
        match provider {
            Provider::Advanced => serde_json::from_value(value)
                .map(RawPlay::Advanced)
                .map_err(|e| NormalizationError::malformed(provider, e)),
            Provider::Network => serde_json::from_value(value)
                .map(RawPlay::Network)
                .map_err(|e| NormalizationError::malformed(provider, e)),
        }
    }
}

/// Map one raw record into the canonical play shape.
pub fn normalize(raw: &RawPlay, game: &GameContext) -> Result<Play, NormalizationError> {
    match raw {
        RawPlay::Advanced(play) => play.normalize(game),
        RawPlay::Network(play) => play.normalize(game),
    }
}

/// A record that could not be normalized, kept for the caller
#[derive(Debug, Clone, Serialize)]
pub struct NormalizationFailure {
    /// Position of the record in the input batch
    pub index: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: NormalizationError,
}

/// Result of normalizing a whole game: good plays plus per-record failures
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedBatch {
    /// Sorted by (drive_number, play_number), duplicates removed
    pub plays: Vec<Play>,
    pub failures: Vec<NormalizationFailure>,
}

impl NormalizedBatch {
    pub fn extend(&mut self, other: NormalizedBatch) {
        self.plays.extend(other.plays);
        self.failures.extend(other.failures);
    }
}

/// Normalize every record of one game, collecting failures instead of
/// aborting on the first one.
pub fn normalize_batch<I>(raws: I, game: &GameContext) -> NormalizedBatch
where
    I: IntoIterator<Item = RawPlay>,
{
    let results = raws
        .into_iter()
        .map(|raw| normalize(&raw, game))
        .collect::<Vec<_>>();
    collect_batch(results, game)
}

/// Decode and normalize untyped JSON records. Records that fail to decode
/// are reported the same way as records that fail to normalize.
pub fn decode_batch(
    provider: Provider,
    values: Vec<serde_json::Value>,
    game: &GameContext,
) -> NormalizedBatch {
    let results = values
        .into_iter()
        .map(|value| RawPlay::from_value(provider, value).and_then(|raw| normalize(&raw, game)))
        .collect::<Vec<_>>();
    collect_batch(results, game)
}

fn collect_batch(
    results: Vec<Result<Play, NormalizationError>>,
    game: &GameContext,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(play) => batch.plays.push(play),
            Err(error) => {
                warn!("Game {}: dropping play #{}: {}", game.game_id, index, error);
                batch.failures.push(NormalizationFailure { index, error });
            }
        }
    }

    // Both feeds can repeat a play when fetched per team; keep the first copy.
    batch
        .plays
        .sort_by_key(|p| (p.drive_number, p.play_number));
    let mut seen = HashSet::new();
    batch.plays.retain(|p| {
        let fresh = seen.insert((p.drive_number, p.play_number));
        if !fresh {
            debug!(
                "Game {}: duplicate play {}/{} ignored",
                game.game_id, p.drive_number, p.play_number
            );
        }
        fresh
    });
    batch
}

/// One game's worth of provider input: plays as flat records, or (network
/// only) nested inside drive containers.
#[derive(Debug, Clone, Deserialize)]
pub struct GameFeed {
    pub game: GameContext,
    pub provider: Provider,
    #[serde(default)]
    pub plays: Vec<serde_json::Value>,
    #[serde(default)]
    pub drives: Vec<NetworkDrive>,
}

impl GameFeed {
    /// Normalize the feed. Drive containers win over flat plays when both
    /// are present; failure indices then count flattened plays.
    pub fn normalize(&self) -> NormalizedBatch {
        if self.drives.is_empty() {
            return decode_batch(self.provider, self.plays.clone(), &self.game);
        }
        if !self.plays.is_empty() {
            debug!(
                "Game {}: ignoring {} flat plays in favour of drive containers",
                self.game.game_id,
                self.plays.len()
            );
        }
        let raws = flatten_drives(&self.drives)
            .into_iter()
            .map(RawPlay::Network);
        normalize_batch(raws, &self.game)
    }

    /// Possession time the provider recorded per drive, keyed by the
    /// canonical drive id.
    pub fn recorded_drive_times(&self) -> BTreeMap<String, u32> {
        self.drives
            .iter()
            .enumerate()
            .filter_map(|(d, drive)| {
                let seconds = drive.recorded_elapsed()?;
                let id = drive
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}", self.game.game_id, d + 1));
                Some((id, seconds))
            })
            .collect()
    }
}

/// Guess the turnover flag from the play type when a feed does not carry one.
pub(crate) fn infer_turnover(play_type: &str) -> bool {
    let t = play_type.to_lowercase();
    t.contains("interception")
        || t.contains("fumble recovery (opponent)")
        || t.contains("fumble return touchdown")
}

/// Parse a "MM:SS" clock display into seconds.
pub(crate) fn parse_clock_display(display: &str) -> Option<u32> {
    let (minutes, seconds) = display.trim().split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

/// Ids arrive as strings in one feed and integers in the other.
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Int(i64),
        Unsigned(u64),
    }

    Ok(Option::<IdValue>::deserialize(deserializer)?.map(|v| match v {
        IdValue::Text(s) => s,
        IdValue::Int(i) => i.to_string(),
        IdValue::Unsigned(u) => u.to_string(),
    }))
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamRef;
    use serde_json::json;

    fn game() -> GameContext {
        GameContext {
            game_id: "401752864".into(),
            week: Some(7),
            date: None,
            home: TeamRef {
                id: Some("135".into()),
                name: "Minnesota".into(),
            },
            away: TeamRef {
                id: Some("2509".into()),
                name: "Purdue".into(),
            },
        }
    }

    fn advanced(drive: u32, play: u32, offense: Option<&str>) -> serde_json::Value {
        json!({
            "id": format!("{}{:02}", drive, play),
            "driveId": format!("d{}", drive),
            "driveNumber": drive,
            "playNumber": play,
            "offense": offense,
            "defense": "Minnesota",
            "period": 1,
            "clock": { "minutes": 10, "seconds": 0 },
            "yardsToGoal": 75,
            "down": 1,
            "distance": 10,
            "yardsGained": 4,
            "scoring": false,
            "playType": "Rush",
            "playText": "Run for 4 yds"
        })
    }

    #[test]
    fn batch_keeps_good_plays_and_reports_bad_ones() {
        let values = vec![
            advanced(1, 2, Some("Purdue")),
            advanced(1, 1, None),
            json!("not a play"),
            advanced(1, 1, Some("Purdue")),
        ];
        let batch = decode_batch(Provider::Advanced, values, &game());
        assert_eq!(batch.plays.len(), 2);
        assert_eq!(batch.plays[0].play_number, 1);
        assert_eq!(batch.plays[1].play_number, 2);
        assert_eq!(batch.failures.len(), 2);
        assert_eq!(batch.failures[0].index, 1);
        assert_eq!(
            batch.failures[0].error,
            NormalizationError::missing(Provider::Advanced, "offense")
        );
        assert!(matches!(
            batch.failures[1].error,
            NormalizationError::Malformed { .. }
        ));
    }

    #[test]
    fn duplicate_plays_are_collapsed() {
        let values = vec![advanced(2, 1, Some("Purdue")), advanced(2, 1, Some("Purdue"))];
        let batch = decode_batch(Provider::Advanced, values, &game());
        assert_eq!(batch.plays.len(), 1);
        assert!(batch.failures.is_empty());
    }

    #[test]
    fn failure_serializes_error_as_text() {
        let failure = NormalizationFailure {
            index: 4,
            error: NormalizationError::missing(Provider::Network, "down"),
        };
        let v = serde_json::to_value(&failure).unwrap();
        assert_eq!(v["index"], 4);
        assert_eq!(v["error"], "network play is missing required field `down`");
    }

    #[test]
    fn feed_with_drive_containers() {
        let feed: GameFeed = serde_json::from_value(json!({
            "game": {
                "game_id": "401752864",
                "week": 7,
                "home": { "id": "135", "name": "Minnesota" },
                "away": { "id": "2509", "name": "Purdue" }
            },
            "provider": "network",
            "drives": [{
                "id": "4017528641",
                "timeElapsed": { "displayValue": "2:48" },
                "plays": [{
                    "id": "1",
                    "type": { "text": "Rush" },
                    "text": "Run for 6 yds",
                    "period": { "number": 1 },
                    "clock": { "displayValue": "15:00" },
                    "start": { "down": 1, "distance": 10, "yardsToEndzone": 75, "team": { "id": "2509" } },
                    "statYardage": 6
                }]
            }]
        }))
        .unwrap();

        let batch = feed.normalize();
        assert!(batch.failures.is_empty());
        assert_eq!(batch.plays[0].drive_id, "4017528641");
        assert_eq!(batch.plays[0].offense, "Purdue");
        assert_eq!(feed.recorded_drive_times()["4017528641"], 168);
    }

    #[test]
    fn clock_display_parsing() {
        assert_eq!(parse_clock_display("14:09"), Some(849));
        assert_eq!(parse_clock_display("0:20"), Some(20));
        assert_eq!(parse_clock_display("15:00"), Some(900));
        assert_eq!(parse_clock_display("1:75"), None);
        assert_eq!(parse_clock_display("end"), None);
    }

    #[test]
    fn turnover_inferred_from_type() {
        assert!(infer_turnover("Pass Interception Return"));
        assert!(infer_turnover("Fumble Recovery (Opponent)"));
        assert!(!infer_turnover("Fumble Recovery (Own)"));
        assert!(!infer_turnover("Rush"));
    }
}
