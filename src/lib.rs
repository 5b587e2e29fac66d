//! Play-by-play normalization and situational analytics for college
//! football scouting reports.
//!
//! Raw records from either provider go through [`providers`] into a
//! canonical [`models::Play`], get tagged by [`analytics::classify`], and
//! are rolled up by [`report`].

pub mod analytics;
pub mod error;
pub mod models;
pub mod providers;
pub mod report;

pub use error::NormalizationError;
pub use models::{ClassifiedPlay, GameContext, Play, Provider};
pub use report::{PlayFilter, ScoutingReport};
