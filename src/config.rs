use log::{info, log, Level};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path};

use crate::error::Error;

pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Settings of the `movingmedian` executable, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of most recent observations the median is computed over.
    pub window_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl Config {
    /// Reads the configuration from `path`, falling back to the defaults
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_json(&content).map_err(|e| match e {
            Error::InvalidConfig(source) => {
                log!(target: "config", Level::Warn, "Error parsing {}: {}", path.display(), source);
                Error::ConfigParse {
                    path: path.to_path_buf(),
                    source,
                }
            }
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(content).map_err(Error::InvalidConfig)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.window_size == 0 {
            return Err(Error::ZeroWindowSize);
        }
        Ok(())
    }

    pub fn schema() -> String {
        serde_json::to_string_pretty(&schemars::schema_for!(Config)).unwrap_or_default()
    }
}
