use thiserror::Error;

use crate::models::Provider;

/// A single raw record could not be turned into a canonical value.
///
/// Fatal for that record only: batch normalization collects these next to
/// the plays that did succeed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("{provider} play is missing required field `{field}`")]
    MissingField {
        provider: Provider,
        field: &'static str,
    },

    #[error("{provider} play references team `{reference}` which is not part of game {game_id}")]
    UnknownTeam {
        provider: Provider,
        reference: String,
        game_id: String,
    },

    #[error("{provider} record could not be decoded: {message}")]
    Malformed { provider: Provider, message: String },

    #[error("win probability {value} at sample {index} is outside [0, 1]")]
    ProbabilityOutOfRange { index: usize, value: f64 },
}

impl NormalizationError {
    pub fn missing(provider: Provider, field: &'static str) -> Self {
        NormalizationError::MissingField { provider, field }
    }

    pub fn malformed(provider: Provider, err: serde_json::Error) -> Self {
        NormalizationError::Malformed {
            provider,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_provider_and_field() {
        let err = NormalizationError::missing(Provider::Network, "offense");
        assert_eq!(
            err.to_string(),
            "network play is missing required field `offense`"
        );
    }

    #[test]
    fn probability_message_includes_value() {
        let err = NormalizationError::ProbabilityOutOfRange {
            index: 3,
            value: 1.2,
        };
        assert!(err.to_string().contains("1.2"));
        assert!(err.to_string().contains("sample 3"));
    }
}
