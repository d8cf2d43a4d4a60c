use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::{ConfigError, ConfigResult, LabConfig};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "LABXR_CONFIG";

const CONFIG_FILE_NAME: &str = "labxr.toml";

/// `labxr.toml` inside the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "labxr", "labxr").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Pick the config file to read.
///
/// Prefers the explicit path, then the env override, then the platform
/// config file if it exists.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .or_else(|| default_config_path().filter(|p| p.exists()))
}

/// Read and validate a config file
pub fn load_from_path(path: &Path) -> ConfigResult<LabConfig> {
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = LabConfig::from_toml_str(&source).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load the resolved config file, or defaults when none is found
pub fn load(explicit: Option<&Path>) -> ConfigResult<(LabConfig, Option<PathBuf>)> {
    match resolve_path(explicit) {
        Some(path) => {
            let config = load_from_path(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            tracing::debug!("No configuration file found; using defaults");
            Ok((LabConfig::default(), None))
        }
    }
}
