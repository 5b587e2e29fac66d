use serde::Deserialize;

use super::{de_opt_id, infer_turnover};
use crate::error::NormalizationError;
use crate::models::{reconcile_field_position, GameContext, Play, Provider};

const PROVIDER: Provider = Provider::Advanced;

/// Game clock as the advanced-stats feed sends it
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AdvancedClock {
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

impl AdvancedClock {
    pub fn total_seconds(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }
}

/// Flat play record from the advanced-stats feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedPlay {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub game_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub drive_id: Option<String>,
    pub drive_number: Option<u32>,
    pub play_number: Option<u32>,
    pub offense: Option<String>,
    pub defense: Option<String>,
    pub period: Option<u8>,
    pub clock: Option<AdvancedClock>,
    #[serde(alias = "yardLine")]
    pub yardline: Option<u32>,
    pub yards_to_goal: Option<u32>,
    pub down: Option<u8>,
    pub distance: Option<u32>,
    pub yards_gained: Option<i32>,
    pub scoring: Option<bool>,
    pub play_type: Option<String>,
    pub play_text: Option<String>,
    pub ppa: Option<f64>,
    /// Not every export carries this; inferred from the play type otherwise
    pub turnover: Option<bool>,
}

impl AdvancedPlay {
    pub fn normalize(&self, game: &GameContext) -> Result<Play, NormalizationError> {
        let play_id = required(self.id.clone(), "id")?;
        let drive_number = required(self.drive_number, "driveNumber")?;
        let play_number = required(self.play_number, "playNumber")?;
        let offense = required(non_empty(self.offense.as_deref()), "offense")?;
        let defense = required(non_empty(self.defense.as_deref()), "defense")?;
        let down = required(self.down, "down")?;
        let distance = required(self.distance, "distance")?;

        let game_id = self.game_id.clone().unwrap_or_else(|| game.game_id.clone());
        let drive_id = self
            .drive_id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", game_id, drive_number));
        let (yard_line, yards_to_goal) =
            reconcile_field_position(self.yardline, self.yards_to_goal);
        let play_type = self.play_type.clone().unwrap_or_default();
        let turnover = self.turnover.unwrap_or_else(|| infer_turnover(&play_type));

        Ok(Play {
            play_id,
            game_id,
            week: game.week,
            drive_id,
            drive_number,
            play_number,
            period: self.period.unwrap_or(0),
            clock: self.clock.map(|c| c.total_seconds()),
            down,
            distance,
            yard_line,
            yards_to_goal,
            offense,
            defense,
            play_text: self.play_text.clone().unwrap_or_default(),
            play_type,
            yards_gained: self.yards_gained.unwrap_or(0),
            scoring: self.scoring.unwrap_or(false),
            ppa: self.ppa,
            turnover,
        })
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, NormalizationError> {
    value.ok_or_else(|| NormalizationError::missing(PROVIDER, field))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
