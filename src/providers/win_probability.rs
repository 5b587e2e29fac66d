use serde::Deserialize;

use super::de_opt_id;
use crate::error::NormalizationError;
use crate::models::{PlayKey, Provider, WinProbabilitySample};

/// One win-probability record in either provider's shape.
///
/// The network sends `{playId, homeWinPercentage}` (a 0–1 fraction despite
/// the name); the advanced feed sends `{playId, playNumber,
/// homeWinProbability}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWinProbability {
    #[serde(default, alias = "play_id", deserialize_with = "de_opt_id")]
    pub play_id: Option<String>,
    #[serde(alias = "play_number")]
    pub play_number: Option<u32>,
    #[serde(alias = "homeWinPercentage", alias = "home_win_probability")]
    pub home_win_probability: Option<f64>,
}

/// A game's win-probability series as delivered by one provider
#[derive(Debug, Clone, Deserialize)]
pub struct WinProbabilityFeed {
    pub game_id: String,
    pub provider: Provider,
    #[serde(default)]
    pub samples: Vec<serde_json::Value>,
}

impl WinProbabilityFeed {
    pub fn normalize(self) -> Result<Vec<WinProbabilitySample>, NormalizationError> {
        normalize_win_probability(self.provider, self.samples)
    }
}

/// Turn one provider's raw series into samples, keeping input order.
///
/// The series is all-or-nothing: a gap would shift every later delta onto
/// the wrong play.
pub fn normalize_win_probability(
    provider: Provider,
    values: Vec<serde_json::Value>,
) -> Result<Vec<WinProbabilitySample>, NormalizationError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw: RawWinProbability = serde_json::from_value(value)
                .map_err(|e| NormalizationError::malformed(provider, e))?;
            raw.into_sample(provider, index)
        })
        .collect()
}

impl RawWinProbability {
    pub fn into_sample(
        self,
        provider: Provider,
        sequence_index: usize,
    ) -> Result<WinProbabilitySample, NormalizationError> {
        let key = match (self.play_id, self.play_number) {
            (Some(id), _) => PlayKey::Id(id),
            (None, Some(n)) => PlayKey::Number(n),
            (None, None) => return Err(NormalizationError::missing(provider, "playId")),
        };
        let value = self
            .home_win_probability
            .ok_or_else(|| NormalizationError::missing(provider, "homeWinProbability"))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(NormalizationError::ProbabilityOutOfRange {
                index: sequence_index,
                value,
            });
        }
        Ok(WinProbabilitySample {
            key,
            sequence_index,
            home_win_probability: value,
        })
    }
}
