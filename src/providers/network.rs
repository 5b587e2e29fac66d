use serde::Deserialize;
use tracing::debug;

use super::{de_opt_id, infer_turnover, parse_clock_display};
use crate::error::NormalizationError;
use crate::models::{reconcile_field_position, GameContext, Play, Provider};

const PROVIDER: Provider = Provider::Network;

/// Team link: either an inline id or a `$ref` URL to the team resource
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamLink {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

impl TeamLink {
    fn as_reference(&self) -> Option<&str> {
        self.id.as_deref().or(self.reference.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Participant {
    /// "offense" / "defense"
    #[serde(rename = "type")]
    pub role: Option<String>,
    pub team: Option<TeamLink>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
}

/// Down/distance/field position at the start or end of a play
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Situation {
    pub down: Option<u8>,
    pub distance: Option<u32>,
    pub yard_line: Option<u32>,
    pub yards_to_endzone: Option<u32>,
    pub team: Option<TeamLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clock {
    /// Seconds, as a float
    pub value: Option<f64>,
    pub display_value: Option<String>,
}

impl Clock {
    pub fn seconds(&self) -> Option<u32> {
        self.value
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u32)
            .or_else(|| self.display_value.as_deref().and_then(parse_clock_display))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Period {
    pub number: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeText {
    pub text: Option<String>,
}

/// Nested play record from the sports-network feed.
///
/// `drive_id`, `drive_number` and `play_number` are not part of the
/// network's play object; [`flatten_drives`] fills them from the drive
/// container the play was found in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPlay {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub sequence_number: Option<String>,
    #[serde(rename = "type")]
    pub play_type: Option<TypeText>,
    pub text: Option<String>,
    pub period: Option<Period>,
    pub clock: Option<Clock>,
    pub start: Option<Situation>,
    pub end: Option<Situation>,
    pub stat_yardage: Option<i32>,
    pub scoring_play: Option<bool>,
    #[serde(default)]
    pub team_participants: Vec<Participant>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub drive_id: Option<String>,
    pub drive_number: Option<u32>,
    pub play_number: Option<u32>,
}

impl NetworkPlay {
    /// Offense comes from the participant tagged "offense" first, then from
    /// the team owning the starting situation.
    fn offense_reference(&self) -> Option<&str> {
        let participant = self
            .team_participants
            .iter()
            .filter(|p| {
                p.role
                    .as_deref()
                    .is_some_and(|r| r.eq_ignore_ascii_case("offense"))
            })
            .find_map(|p| p.team.as_ref().and_then(TeamLink::as_reference).or(p.id.as_deref()));

        participant.or_else(|| {
            self.start
                .as_ref()
                .and_then(|s| s.team.as_ref())
                .and_then(TeamLink::as_reference)
        })
    }

    pub fn normalize(&self, game: &GameContext) -> Result<Play, NormalizationError> {
        let play_id = self
            .id
            .clone()
            .or_else(|| self.sequence_number.clone())
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "id"))?;
        let drive_number = self
            .drive_number
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "driveNumber"))?;
        let play_number = self
            .play_number
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "playNumber"))?;

        let reference = self
            .offense_reference()
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "offense"))?;
        let offense = game
            .resolve_team(reference)
            .ok_or_else(|| NormalizationError::UnknownTeam {
                provider: PROVIDER,
                reference: reference.to_string(),
                game_id: game.game_id.clone(),
            })?;
        let defense = game
            .opponent_of(&offense.name)
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "defense"))?;

        let start = self
            .start
            .as_ref()
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "start"))?;
        let down = start
            .down
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "start.down"))?;
        let distance = start
            .distance
            .ok_or_else(|| NormalizationError::missing(PROVIDER, "start.distance"))?;

        // yardsToEndzone is offense-relative; the network's yardLine is not,
        // so it is only a fallback when the endzone distance is absent.
        let (yard_line, yards_to_goal) = match start.yards_to_endzone {
            Some(ytg) => reconcile_field_position(None, Some(ytg)),
            None => reconcile_field_position(start.yard_line, None),
        };

        let clock = self.clock.as_ref().and_then(Clock::seconds);
        if clock.is_none() {
            debug!("Network play {} has no usable clock", play_id);
        }
        let play_type = self
            .play_type
            .as_ref()
            .and_then(|t| t.text.clone())
            .unwrap_or_default();

        Ok(Play {
            drive_id: self
                .drive_id
                .clone()
                .unwrap_or_else(|| format!("{}-{}", game.game_id, drive_number)),
            play_id,
            game_id: game.game_id.clone(),
            week: game.week,
            drive_number,
            play_number,
            period: self.period.as_ref().and_then(|p| p.number).unwrap_or(0),
            clock,
            down,
            distance,
            yard_line,
            yards_to_goal,
            offense: offense.name.clone(),
            defense: defense.name.clone(),
            play_text: self.text.clone().unwrap_or_default(),
            turnover: infer_turnover(&play_type),
            play_type,
            yards_gained: self.stat_yardage.unwrap_or(0),
            scoring: self.scoring_play.unwrap_or(false),
            ppa: None,
        })
    }
}

/// Drive container as the network nests it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDrive {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    pub team: Option<TeamLink>,
    pub time_elapsed: Option<Clock>,
    pub result: Option<String>,
    #[serde(default)]
    pub plays: Vec<NetworkPlay>,
}

impl NetworkDrive {
    /// Possession time the network recorded for the drive
    pub fn recorded_elapsed(&self) -> Option<u32> {
        self.time_elapsed.as_ref().and_then(Clock::seconds)
    }
}

/// Unnest drive containers into plays carrying drive identity.
///
/// Drive numbers follow drive order and play numbers follow play order
/// inside each drive, both 1-based. Values already present on a play win.
pub fn flatten_drives(drives: &[NetworkDrive]) -> Vec<NetworkPlay> {
    drives
        .iter()
        .enumerate()
        .flat_map(|(d, drive)| {
            drive.plays.iter().enumerate().map(move |(p, play)| {
                let mut play = play.clone();
                play.drive_number = play.drive_number.or(Some(d as u32 + 1));
                play.play_number = play.play_number.or(Some(p as u32 + 1));
                if play.drive_id.is_none() {
                    play.drive_id = drive.id.clone();
                }
                play
            })
        })
        .collect()
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

    fn nested_play() -> serde_json::Value {
        json!({
            "id": "401752864101849902",
            "sequenceNumber": "101849902",
            "type": { "id": "24", "text": "Pass Reception" },
            "text": "Ryan Browne pass complete to Max Klare for 9 yds to the MINN 37",
            "period": { "number": 2 },
            "clock": { "value": 229.0, "displayValue": "3:49" },
            "start": {
                "down": 3, "distance": 6, "yardLine": 54, "yardsToEndzone": 46,
                "team": { "$ref": "http://sports.core.api.espn.com/v2/sports/football/leagues/college-football/seasons/2025/teams/2509?lang=en" }
            },
            "statYardage": 9,
            "scoringPlay": false,
            "teamParticipants": [
                { "type": "offense", "team": { "$ref": "http://sports.core.api.espn.com/v2/sports/football/teams/2509?lang=en" } },
                { "type": "defense", "team": { "$ref": "http://sports.core.api.espn.com/v2/sports/football/teams/135?lang=en" } }
            ]
        })
    }

    #[test]
    fn maps_nested_record_through_participants() {
        let drive: NetworkDrive = serde_json::from_value(json!({
            "id": "40175286410",
            "timeElapsed": { "displayValue": "2:48" },
            "plays": [nested_play()]
        }))
        .unwrap();
        let plays = flatten_drives(&[NetworkDrive::default(), drive]);
        assert_eq!(plays.len(), 1);

        let play = plays[0].normalize(&game()).unwrap();
        assert_eq!(play.offense, "Purdue");
        assert_eq!(play.defense, "Minnesota");
        assert_eq!(play.drive_id, "40175286410");
        assert_eq!(play.drive_number, 2);
        assert_eq!(play.play_number, 1);
        assert_eq!(play.period, 2);
        assert_eq!(play.clock, Some(229));
        assert_eq!(play.down, 3);
        assert_eq!(play.distance, 6);
        assert_eq!(play.yards_to_goal, Some(46));
        assert_eq!(play.yard_line, Some(54));
        assert_eq!(play.yards_gained, 9);
        assert_eq!(play.play_type, "Pass Reception");
        assert_eq!(play.ppa, None);
    }

    #[test]
    fn falls_back_to_start_team_and_display_clock() {
        let mut raw: NetworkPlay = serde_json::from_value(nested_play()).unwrap();
        raw.team_participants.clear();
        raw.clock = Some(Clock {
            value: None,
            display_value: Some("14:09".into()),
        });
        raw.drive_number = Some(1);
        raw.play_number = Some(1);
        let play = raw.normalize(&game()).unwrap();
        assert_eq!(play.offense, "Purdue");
        assert_eq!(play.clock, Some(849));
        assert_eq!(play.drive_id, "401752864-1");
    }

    #[test]
    fn recorded_drive_time() {
        let drive: NetworkDrive =
            serde_json::from_value(json!({ "timeElapsed": { "displayValue": "2:48" } })).unwrap();
        assert_eq!(drive.recorded_elapsed(), Some(168));
    }

    #[test]
    fn unknown_team_reference() {
        let mut raw: NetworkPlay = serde_json::from_value(nested_play()).unwrap();
        raw.team_participants = vec![Participant {
            role: Some("offense".into()),
            team: Some(TeamLink {
                id: Some("99".into()),
                reference: None,
            }),
            id: None,
        }];
        raw.drive_number = Some(1);
        raw.play_number = Some(1);
        assert!(matches!(
            raw.normalize(&game()),
            Err(NormalizationError::UnknownTeam { .. })
        ));
    }

    #[test]
    fn missing_sequence_identity() {
        let raw: NetworkPlay = serde_json::from_value(nested_play()).unwrap();
        assert_eq!(
            raw.normalize(&game()).unwrap_err(),
            NormalizationError::missing(Provider::Network, "driveNumber")
        );
    }

    #[test]
    fn missing_start_down() {
        let mut raw: NetworkPlay = serde_json::from_value(nested_play()).unwrap();
        raw.drive_number = Some(1);
        raw.play_number = Some(1);
        if let Some(start) = raw.start.as_mut() {
            start.down = None;
        }
        assert_eq!(
            raw.normalize(&game()).unwrap_err(),
            NormalizationError::missing(Provider::Network, "start.down")
        );
    }
}
