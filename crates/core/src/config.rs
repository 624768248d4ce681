//! Simulation tuning, loadable from TOML.
//! Every field has a default so a config file only needs the values it overrides.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Player sight radius.
    pub fov_radius: i32,
    /// Beyond this distance monsters stop evaluating the player.
    pub alert_radius: i32,
    /// A* results at or above this length fall back to greedy stepping.
    pub max_path_len: usize,
    /// Upper bound of the random delay added to an actor's first turn.
    pub spawn_jitter: u32,
    pub min_turns_before_sleep: u32,
    pub max_chase_turns: u32,
    pub flee_lookahead: i32,
    pub flee_ahead_bonus: f64,
    pub flee_min_score: f64,
    pub flee_ally_radius: f64,
    /// Allies already fighting nearby at or above this count keep a monster from fleeing.
    pub flee_outnumber_threshold: usize,
    pub ally_cache_radius: f64,
    pub wander_samples: u32,
    pub wander_stuck_limit: u32,
    pub taunt_volume: i32,
    pub roar_volume: i32,
    pub song_volume: i32,
    pub attack_volume: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fov_radius: 10,
            alert_radius: 9,
            max_path_len: 25,
            spawn_jitter: 3,
            min_turns_before_sleep: 10,
            max_chase_turns: 20,
            flee_lookahead: 3,
            flee_ahead_bonus: 1.0,
            flee_min_score: 1.5,
            flee_ally_radius: 8.0,
            flee_outnumber_threshold: 2,
            ally_cache_radius: 6.0,
            wander_samples: 20,
            wander_stuck_limit: 3,
            taunt_volume: 8,
            roar_volume: 16,
            song_volume: 10,
            attack_volume: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}
