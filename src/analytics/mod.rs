pub mod classify;
pub mod drives;
pub mod fourth_down;
pub mod wpa;

pub use classify::{
    classify, classify_all, classify_explosive, classify_success, round_required_yards,
};
pub use drives::{
    aggregate_drives, detect_period_boundaries, period_ranges, plays_in_period, split_possession,
    Drive, DriveResult, PossessionSplit,
};
pub use fourth_down::{conversion_evidence, is_go_for_it, ConversionEvidence};
pub use wpa::{compute_wpa, WpaEntry, WpaSeries, WpaValue};
