use clap::Parser;
use std::path::PathBuf;

/// Build a scouting report from college football play-by-play
#[derive(Parser, Debug, Clone)]
#[command(name = "gridiron-analytics", version, about)]
pub struct Config {
    /// JSON array of game feeds ({game, provider, plays | drives})
    #[arg(long, env = "PBP_INPUT")]
    pub input: PathBuf,

    /// Team the report is written for
    #[arg(long, env = "PBP_TEAM")]
    pub team: String,

    /// JSON array of win-probability series ({game_id, provider, samples})
    #[arg(long, env = "PBP_WIN_PROBABILITY")]
    pub win_probability: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long, env = "PBP_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long, env = "PBP_PRETTY", default_value = "false")]
    pub pretty: bool,

    /// Only these game ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub game_ids: Vec<String>,

    /// Only these weeks (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub weeks: Vec<u32>,

    /// Only these periods (comma separated, 1-4 plus overtime)
    #[arg(long, value_delimiter = ',')]
    pub periods: Vec<u8>,

    /// Keep only the three most recent games after the other filters
    #[arg(long, default_value = "false")]
    pub last_3_games: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.team.trim().is_empty() {
            anyhow::bail!("team must not be empty");
        }
        if !self.input.is_file() {
            anyhow::bail!("input file {} does not exist", self.input.display());
        }
        if let Some(path) = &self.win_probability {
            if !path.is_file() {
                anyhow::bail!("win probability file {} does not exist", path.display());
            }
        }
        if self.periods.iter().any(|&p| p == 0) {
            anyhow::bail!("periods are numbered from 1");
        }
        Ok(())
    }
}
