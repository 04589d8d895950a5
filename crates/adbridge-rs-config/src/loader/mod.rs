//! Layered configuration loader.
//!
//! Discovers the user, working-directory, and runtime layers, validates each
//! against the schema, merges them in precedence order, and produces the
//! effective `BridgeConfig`.

mod discovery;
mod merge;
mod schema;


use crate::{BridgeConfig, ConfigError};
use log::{debug, info};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
pub const DEFAULT_CONFIG_FILE: &str = "adbridge.json5";
/// Default config directory under the user's home.
pub const DEFAULT_CONFIG_DIR: &str = ".adbridge";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: BridgeConfig,
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// `~/.adbridge/adbridge.json5`.
    User,
    /// `adbridge.json5` in the working directory.
    Cwd,
    /// Explicit override paths (highest precedence).
    Runtime,
}

impl fmt::Display for ConfigLayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigLayerSource::User => "user",
            ConfigLayerSource::Cwd => "cwd",
            ConfigLayerSource::Runtime => "runtime",
        })
    }
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory searched for the cwd layer.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.adbridge/adbridge.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last, in order.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: discovery::default_user_config_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Replace the user layer location; `None` skips the user layer.
    pub fn with_user_path(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl BridgeConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading bridge config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading bridge config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack.
    ///
    /// Layer precedence (low -> high): user, cwd, runtime overrides. A path
    /// reachable through two layers is only applied once.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut merged = Value::Object(serde_json::Map::new());
        let mut layers = Vec::new();
        for candidate in discovery::candidates(&options)? {
            let Some(layer) = discovery::read_layer(&candidate)? else {
                continue;
            };
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta);
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered bridge config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<BridgeConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: BridgeConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
