//! Bridge configuration: the JSON5 model, its validation rules, and the
//! user/cwd/runtime layer stack the `adbridge` CLI and embedding apps load.

mod error;
mod loader;
mod model;

pub use error::ConfigError;
pub use loader::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, LayeredConfig,
    LayeredConfigOptions,
};
pub use model::*;
