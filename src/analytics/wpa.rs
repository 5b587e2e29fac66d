use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{PlayKey, WinProbabilitySample};

/// WPA of one sample, keyed like the sample it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WpaEntry {
    pub key: PlayKey,
    pub sequence_index: usize,
    pub home_win_probability: f64,
    /// Change in home win probability since the previous sample
    pub wpa: f64,
    pub wpa_percentage: f64,
}

/// Output shape of the `{play_key → {wpa, wpa_percentage}}` mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WpaValue {
    pub wpa: f64,
    pub wpa_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WpaSeries {
    pub entries: Vec<WpaEntry>,
}

impl WpaSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every delta; equals last minus first probability
    pub fn net(&self) -> f64 {
        self.entries.iter().map(|e| e.wpa).sum()
    }

    /// Largest swing in either direction
    pub fn biggest_swing(&self) -> Option<&WpaEntry> {
        self.entries
            .iter()
            .max_by(|a, b| a.wpa.abs().total_cmp(&b.wpa.abs()))
    }

    pub fn get(&self, key: &PlayKey) -> Option<&WpaEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Keyed map for report output. A key repeated in the stream keeps its
    /// last delta.
    pub fn to_map(&self) -> BTreeMap<String, WpaValue> {
        self.entries
            .iter()
            .map(|e| {
                (
                    e.key.to_string(),
                    WpaValue {
                        wpa: e.wpa,
                        wpa_percentage: e.wpa_percentage,
                    },
                )
            })
            .collect()
    }
}

/// Per-sample win probability added for one provider's stream.
///
/// Samples are ordered by `sequence_index` with a stable sort, so ties keep
/// their input order. The first sample always has a WPA of zero.
pub fn compute_wpa(samples: &[WinProbabilitySample]) -> WpaSeries {
    let mut ordered: Vec<&WinProbabilitySample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.sequence_index);

    let mut previous: Option<f64> = None;
    let entries = ordered
        .into_iter()
        .map(|sample| {
            let p = sample.home_win_probability;
            let wpa = previous.map_or(0.0, |prev| p - prev);
            previous = Some(p);
            WpaEntry {
                key: sample.key.clone(),
                sequence_index: sample.sequence_index,
                home_win_probability: p,
                wpa,
                wpa_percentage: wpa * 100.0,
            }
        })
        .collect();

    WpaSeries { entries }
}
