use std::env;
use std::env::VarError;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use config::{Config as ConfigLib, File as ConfigFile};
use serde::{Deserialize, Serialize};

const CONFIG_PATHNAME_ENV: &str = "CONFIG_PATHNAME";
const CONFIG_PATHNAME_DEFAULT: &str = "config.yaml";

const FILE_PREAMBLE: &str = "# Strata world-core configuration file\n\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: Network,
    pub world: World,
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            world: World::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub port: u16,
    pub outbound_queue_capacity: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            port: 25565,
            outbound_queue_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct World {
    pub view_distance: u8,
    pub spawn_position: [f64; 3],
    pub spawn_angle: f32,
    pub tick_rate_hz: u32,
    /// Global chunk loads admitted per second, shared by every loader.
    pub global_chunk_load_rate: u32,
    /// Per-player chunk loads admitted per second.
    pub player_chunk_load_rate: u32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            view_distance: 8,
            spawn_position: [0.0, 64.0, 0.0],
            spawn_angle: 0.0,
            tick_rate_hz: 50,
            global_chunk_load_rate: 200,
            player_chunk_load_rate: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub terminal_level: LogLevel,
    pub file_enabled: bool,
    pub file_level: LogLevel,
    pub file_directory: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            terminal_level: LogLevel::Info,
            file_enabled: true,
            file_level: LogLevel::Debug,
            file_directory: "./log".to_string(),
        }
    }
}

pub enum ConfigResult {
    Presented(Config),
    Created(Config),
}

impl ConfigResult {
    pub fn into_inner(self) -> Config {
        match self {
            Self::Presented(cfg) => cfg,
            Self::Created(cfg) => cfg,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid CONFIG_PATHNAME: {0:?}")]
    Env(VarError),
}

/// Reads the config file at `config_pathname`, creating it (with defaults)
/// if it does not yet exist.
pub fn build_config(config_pathname: PathBuf) -> Result<ConfigResult, Error> {
    let presented = config_pathname.exists();
    if !presented {
        File::create(&config_pathname)?;
    }

    let builder = ConfigLib::builder().add_source(ConfigFile::from(config_pathname.clone()));
    let built = builder.build()?;

    let config_entity: Config = built.try_deserialize().unwrap_or_default();

    if !presented {
        let mut file = File::create(&config_pathname)?;
        file.write_all(FILE_PREAMBLE.as_bytes())?;
        serde_yaml::to_writer(file, &config_entity)?;
    }

    if presented {
        Ok(ConfigResult::Presented(config_entity))
    } else {
        Ok(ConfigResult::Created(config_entity))
    }
}

pub fn build_config_from_env() -> Result<ConfigResult, Error> {
    match env::var(CONFIG_PATHNAME_ENV) {
        Ok(val) => build_config(PathBuf::from(val)),
        Err(VarError::NotPresent) => build_config(PathBuf::from(CONFIG_PATHNAME_DEFAULT)),
        Err(e @ VarError::NotUnicode(_)) => Err(Error::Env(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.network.port, 25565);
        assert_eq!(cfg.world.view_distance, 8);
        assert_eq!(cfg.world.tick_rate_hz, 50);
    }
}
