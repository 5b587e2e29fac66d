use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use gridiron_analytics::analytics::{classify_all, compute_wpa, WpaValue};
use gridiron_analytics::providers::{GameFeed, NormalizationFailure, WinProbabilityFeed};
use gridiron_analytics::report::{PlayFilter, ScoutingReport};

mod config;

use config::Config;

/// Records a game's provider feed could not turn into plays
#[derive(Debug, Serialize)]
struct GameFailures {
    game_id: String,
    plays: usize,
    failures: Vec<NormalizationFailure>,
}

#[derive(Debug, Serialize)]
struct Output {
    report: ScoutingReport,
    /// Per game, keyed by play id / number
    win_probability_added: BTreeMap<String, BTreeMap<String, WpaValue>>,
    normalization: Vec<GameFailures>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let feeds: Vec<GameFeed> = read_json(&config.input)?;
    info!("Loaded {} game feed(s) from {}", feeds.len(), config.input.display());

    let mut plays = Vec::new();
    let mut drive_times = BTreeMap::new();
    let mut normalization = Vec::with_capacity(feeds.len());

    for feed in &feeds {
        let batch = feed.normalize();
        if !batch.failures.is_empty() {
            warn!(
                "Game {} ({}): {} record(s) could not be normalized",
                feed.game.game_id,
                feed.provider,
                batch.failures.len()
            );
        }
        drive_times.extend(feed.recorded_drive_times());
        normalization.push(GameFailures {
            game_id: feed.game.game_id.clone(),
            plays: batch.plays.len(),
            failures: batch.failures,
        });
        plays.extend(batch.plays);
    }

    let classified = classify_all(plays);
    let filter = PlayFilter {
        game_ids: config.game_ids.clone(),
        weeks: config.weeks.clone(),
        periods: config.periods.clone(),
        last_3_games: config.last_3_games,
    };
    let report =
        ScoutingReport::build_with_drive_times(&classified, &config.team, &filter, &drive_times);

    let mut win_probability_added = BTreeMap::new();
    if let Some(path) = &config.win_probability {
        let series: Vec<WinProbabilityFeed> = read_json(path)?;
        for feed in series {
            let game_id = feed.game_id.clone();
            match feed.normalize() {
                Ok(samples) => {
                    let wpa = compute_wpa(&samples);
                    info!("Game {}: {} WPA entries, net {:+.3}", game_id, wpa.len(), wpa.net());
                    win_probability_added.insert(game_id, wpa.to_map());
                }
                Err(e) => warn!("Game {}: skipping win probability series: {}", game_id, e),
            }
        }
    }

    let output = Output {
        report,
        win_probability_added,
        normalization,
    };
    let json = if config.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match &config.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
