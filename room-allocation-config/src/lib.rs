use core::fmt::{Debug, Display};
use std::path::{Path, PathBuf};

use figment::providers::{Data, Env, Format, Serialized, Toml};
use figment::Figment;
use room_allocation_optimizer::model::{Room, Weekday};
use room_allocation_optimizer::{Resources, DEFAULT_DAILY_CAPACITY};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "room-allocation.toml";
pub const ENV_PREFIX: &str = "RAL_";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OasisConfig {
    pub daily_capacity: u32,
    pub weekdays: Vec<Weekday>,
}

impl Default for OasisConfig {
    fn default() -> Self {
        Self {
            daily_capacity: DEFAULT_DAILY_CAPACITY,
            weekdays: Weekday::ALL.to_vec(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub rooms: Vec<Room>,
    pub oasis: OasisConfig,
    /// Fixed seed for reproducible runs, a fresh one is drawn per run otherwise.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rooms: Resources::default().rooms,
            oasis: OasisConfig::default(),
            seed: None,
        }
    }
}

impl Config {
    #[must_use]
    pub fn resources(&self) -> Resources {
        Resources {
            rooms: self.rooms.clone(),
            daily_capacity: self.oasis.daily_capacity,
            weekdays: self.oasis.weekdays.clone(),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
    #[error("config file {} does not exist", .0.display())]
    MissingFile(PathBuf),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

fn extract(file: Data<Toml>) -> Result<Config, ConfigError> {
    Ok(Figment::from(Serialized::defaults(Config::default()))
        .merge(file)
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?)
}

/// Built-in defaults, overridden by [`CONFIG_FILE`] (if it exists) and then
/// by `RAL_` environment variables, e.g. `RAL_OASIS__DAILY_CAPACITY=12`.
pub fn get_config() -> Result<Config, ConfigError> {
    extract(Toml::file(CONFIG_FILE))
}

/// Like [`get_config`], but the file at `path` has to exist.
pub fn get_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_owned()));
    }
    extract(Toml::file_exact(path))
}
