//! Finding and reading the files that make up the layer stack.

use super::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, LayeredConfigOptions,
    LoadedLayer, schema,
};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A file that may contribute a layer.
#[derive(Debug, Clone)]
pub(super) struct LayerCandidate {
    source: ConfigLayerSource,
    path: PathBuf,
    required: bool,
}

/// Candidates in precedence order (low -> high).
///
/// User and cwd files are optional and applied once even when both point at
/// the same file. Runtime paths must exist.
pub(super) fn candidates(
    options: &LayeredConfigOptions,
) -> Result<Vec<LayerCandidate>, ConfigError> {
    let cwd = match options.cwd.canonicalize() {
        Ok(path) => path,
        Err(err) if err.kind() == ErrorKind::NotFound => options.cwd.clone(),
        Err(err) => return Err(ConfigError::Io(err)),
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let discovered = options
        .user_config_path
        .iter()
        .map(|path| (ConfigLayerSource::User, path.clone()))
        .chain([(ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE))]);
    for (source, path) in discovered {
        let identity = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !seen.insert(identity) {
            debug!(
                "skipping duplicate layer (source={:?}, path={})",
                source,
                path.display()
            );
            continue;
        }
        out.push(LayerCandidate {
            source,
            path,
            required: false,
        });
    }

    out.extend(options.runtime_paths.iter().map(|path| LayerCandidate {
        source: ConfigLayerSource::Runtime,
        path: path.clone(),
        required: true,
    }));
    Ok(out)
}

/// Read and schema-check a candidate. Missing optional files yield `None`.
pub(super) fn read_layer(candidate: &LayerCandidate) -> Result<Option<LoadedLayer>, ConfigError> {
    let LayerCandidate {
        source,
        path,
        required,
    } = candidate;
    if !*required && !path.exists() {
        debug!(
            "optional layer missing (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(None);
    }

    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    schema::validate_layer_schema(&value, &label(*source, path))?;
    Ok(Some(LoadedLayer {
        meta: ConfigLayer {
            source: *source,
            path: path.clone(),
        },
        value,
    }))
}

fn label(source: ConfigLayerSource, path: &Path) -> String {
    format!("{source}({})", path.display())
}

/// `~/.adbridge/adbridge.json5`, when a home directory is known.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(dirs.home_dir().join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE))
}
