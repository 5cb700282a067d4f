use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    algo::LearnerConfig,
    error::{Error, Result},
    grid::{COLS, ROWS},
    reward::RewardParams,
    store::QTABLE_KEY,
    trainer::TrainerConfig,
};

/// Board dimensions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: i32,
    pub rows: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: COLS,
            rows: ROWS,
        }
    }
}

/// Live-play exploration schedule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    /// Rate at startup, after pretraining and after a restart
    ///
    /// **Default**: `0.2`
    pub default: f32,
    /// Multiplier applied each time a level is completed
    ///
    /// **Default**: `0.9`
    pub level_decay: f32,
    /// Lowest rate reachable through level decay
    ///
    /// **Default**: `0.02`
    pub level_floor: f32,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            default: 0.2,
            level_decay: 0.9,
            level_floor: 0.02,
        }
    }
}

/// Where the table is persisted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Record name, versioned so an incompatible layout never gets read back
    pub key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: QTABLE_KEY.to_owned(),
        }
    }
}

/// Everything tunable about the pursuers
///
/// Every section falls back to its defaults, so a TOML file only needs the values it changes:
///
/// ```toml
/// [learner]
/// alpha = 0.5
///
/// [trainer]
/// episodes = 200
/// ```
///
/// Reward tables are read whole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub learner: LearnerConfig,
    /// Live-play reward shaping
    ///
    /// **Default**: [`RewardParams::LIVE`]
    pub rewards: RewardParams,
    pub exploration: ExplorationConfig,
    pub trainer: TrainerConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Parse and [validate](Config::validate) a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Check the values no later stage can recover from: a board with at least one cell and a
    /// default exploration rate in `[0,1]`
    pub fn validate(&self) -> Result<()> {
        let GridConfig { cols, rows } = self.grid;
        if cols < 1 || rows < 1 {
            return Err(Error::InvalidParameter(format!(
                "board must have at least one cell, got {cols}x{rows}"
            )));
        }
        let rate = self.exploration.default;
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::InvalidParameter(format!(
                "default exploration rate must be in [0, 1], got {rate}"
            )));
        }
        Ok(())
    }
}
