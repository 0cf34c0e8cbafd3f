//! Player-tunable run configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Stats;
use crate::weather::Weather;

/// Smallest grid width that still leaves room for a path and its shoulders.
const MIN_MAP_WIDTH: u32 = 3;

/// Errors raised when run configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("map width must be at least {min} (got {value})")]
    MapTooNarrow { min: u32, value: u32 },
    #[error("map height must be at least {min} to leave room before the goal (got {value})")]
    MapTooShort { min: u32, value: u32 },
    #[error("viewport size must be odd and non-zero (got {0})")]
    Viewport(u32),
    #[error("{field} must be between 0.00 and 1.00 (got {value:.2})")]
    Probability { field: &'static str, value: f64 },
    #[error("starting {field} must be in 1..=100 (got {value})")]
    StartStat { field: &'static str, value: i32 },
}

/// Tuning for a single run: grid shape, starting resources and event rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_map_width")]
    pub map_width: u32,
    #[serde(default = "GameConfig::default_map_height")]
    pub map_height: u32,
    #[serde(default = "GameConfig::default_viewport_size")]
    pub viewport_size: u32,
    #[serde(default = "GameConfig::default_start_money")]
    pub start_money: i64,
    #[serde(default)]
    pub start_stats: Stats,
    #[serde(default)]
    pub start_weather: Weather,
    /// Chance per accepted move of asking the oracle for a random encounter.
    #[serde(default = "GameConfig::default_encounter_chance")]
    pub encounter_chance: f64,
    /// Chance per accepted move of resampling the weather.
    #[serde(default = "GameConfig::default_weather_change_chance")]
    pub weather_change_chance: f64,
    /// Rows before the far edge at which the summit counts as reached.
    #[serde(default = "GameConfig::default_goal_margin")]
    pub goal_margin: u32,
}

impl GameConfig {
    const fn default_map_width() -> u32 {
        15
    }

    const fn default_map_height() -> u32 {
        45
    }

    const fn default_viewport_size() -> u32 {
        9
    }

    const fn default_start_money() -> i64 {
        2_000
    }

    const fn default_encounter_chance() -> f64 {
        0.08
    }

    const fn default_weather_change_chance() -> f64 {
        0.12
    }

    const fn default_goal_margin() -> u32 {
        2
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value violates its bounds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every bound the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < MIN_MAP_WIDTH {
            return Err(ConfigError::MapTooNarrow {
                min: MIN_MAP_WIDTH,
                value: self.map_width,
            });
        }
        let min_height = self.goal_margin + 2;
        if self.map_height < min_height {
            return Err(ConfigError::MapTooShort {
                min: min_height,
                value: self.map_height,
            });
        }
        if self.viewport_size == 0 || self.viewport_size % 2 == 0 {
            return Err(ConfigError::Viewport(self.viewport_size));
        }
        for (field, value) in [
            ("encounter_chance", self.encounter_chance),
            ("weather_change_chance", self.weather_change_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { field, value });
            }
        }
        for (field, value) in [
            ("health", self.start_stats.health),
            ("energy", self.start_stats.energy),
            ("warmth", self.start_stats.warmth),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::StartStat { field, value });
            }
        }
        Ok(())
    }

    /// First row that counts as reaching the summit.
    #[must_use]
    pub const fn goal_row(&self) -> i32 {
        self.map_height.saturating_sub(self.goal_margin) as i32
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: Self::default_map_width(),
            map_height: Self::default_map_height(),
            viewport_size: Self::default_viewport_size(),
            start_money: Self::default_start_money(),
            start_stats: Stats::default(),
            start_weather: Weather::default(),
            encounter_chance: Self::default_encounter_chance(),
            weather_change_chance: Self::default_weather_change_chance(),
            goal_margin: Self::default_goal_margin(),
        }
    }
}
