//! Configuration for the labxr manipulation engine
//!
//! A single TOML file holds every tunable of the engine. All fields have
//! defaults, so an empty or missing file yields a working configuration.

mod error;
mod loader;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{default_config_path, load, load_from_path, resolve_path, CONFIG_ENV_VAR};
pub use types::{AnchorsConfig, InputConfig, LabConfig, LoggingConfig, ManipulationConfig};
