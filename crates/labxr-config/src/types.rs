use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};

/// Root of `labxr.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub manipulation: ManipulationConfig,
    pub anchors: AnchorsConfig,
    pub input: InputConfig,
    pub logging: LoggingConfig,
}

/// Grab and release animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationConfig {
    /// Distance covered per frame while an object flies to the hand
    #[serde(default = "default_grab_step")]
    pub grab_step: f32,
    /// Distance covered per frame while an object returns to its destination
    #[serde(default = "default_release_step")]
    pub release_step: f32,
    /// Offset of the holding point along the controller's forward axis
    #[serde(default = "default_holding_offset")]
    pub holding_offset: f32,
    #[serde(default = "default_grab_pulse_intensity")]
    pub grab_pulse_intensity: f32,
    #[serde(default = "default_grab_pulse_ms")]
    pub grab_pulse_ms: u64,
}

fn default_grab_step() -> f32 {
    0.1
}

fn default_release_step() -> f32 {
    0.08
}

fn default_holding_offset() -> f32 {
    0.08
}

fn default_grab_pulse_intensity() -> f32 {
    0.3
}

fn default_grab_pulse_ms() -> u64 {
    40
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            grab_step: default_grab_step(),
            release_step: default_release_step(),
            holding_offset: default_holding_offset(),
            grab_pulse_intensity: default_grab_pulse_intensity(),
            grab_pulse_ms: default_grab_pulse_ms(),
        }
    }
}

impl ManipulationConfig {
    pub fn grab_pulse_duration(&self) -> Duration {
        Duration::from_millis(self.grab_pulse_ms)
    }
}

/// Anchor discovery and snapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorsConfig {
    /// Snap distance for kinds without an override
    #[serde(default = "default_min_distance")]
    pub default_min_distance: f32,
    /// Edge length of the tiles an anchor surface is divided into
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// Keep free anchor markers visible
    #[serde(default)]
    pub show_markers: bool,
    /// Per-kind snap distance, keyed by anchor kind name
    #[serde(default)]
    pub min_distance: BTreeMap<String, f32>,
}

fn default_min_distance() -> f32 {
    0.1
}

fn default_tile_size() -> f32 {
    0.15
}

impl Default for AnchorsConfig {
    fn default() -> Self {
        Self {
            default_min_distance: default_min_distance(),
            tile_size: default_tile_size(),
            show_markers: false,
            min_distance: BTreeMap::new(),
        }
    }
}

impl AnchorsConfig {
    /// Snap distance for a kind, falling back to `fallback` then to the default
    pub fn min_distance_for(&self, kind: &str, fallback: Option<f32>) -> f32 {
        self.min_distance
            .get(kind)
            .copied()
            .or(fallback)
            .unwrap_or(self.default_min_distance)
    }
}

/// Gamepad thumbstick tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f32,
    #[serde(default = "default_hold_threshold")]
    pub hold_threshold: f32,
    #[serde(default = "default_hold_interval_secs")]
    pub hold_interval_secs: f32,
}

fn default_dead_zone() -> f32 {
    0.4
}

fn default_hold_threshold() -> f32 {
    0.7
}

fn default_hold_interval_secs() -> f32 {
    0.8
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dead_zone: default_dead_zone(),
            hold_threshold: default_hold_threshold(),
            hold_interval_secs: default_hold_interval_secs(),
        }
    }
}

impl InputConfig {
    pub fn hold_interval(&self) -> Duration {
        Duration::from_secs_f32(self.hold_interval_secs.max(0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn require_positive(field: &str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::validation(field, format!("must be positive, got {}", value)))
    }
}

impl LabConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check numeric ranges
    pub fn validate(&self) -> ConfigResult<()> {
        let m = &self.manipulation;
        require_positive("manipulation.grab_step", m.grab_step)?;
        require_positive("manipulation.release_step", m.release_step)?;
        if !(0.0..=1.0).contains(&m.grab_pulse_intensity) {
            return Err(ConfigError::validation(
                "manipulation.grab_pulse_intensity",
                "must be within 0.0..=1.0",
            ));
        }

        let a = &self.anchors;
        require_positive("anchors.default_min_distance", a.default_min_distance)?;
        require_positive("anchors.tile_size", a.tile_size)?;
        for (kind, distance) in &a.min_distance {
            require_positive(&format!("anchors.min_distance.{}", kind), *distance)?;
        }

        let i = &self.input;
        if !(0.0..1.0).contains(&i.dead_zone) {
            return Err(ConfigError::validation("input.dead_zone", "must be within 0.0..1.0"));
        }
        require_positive("input.hold_threshold", i.hold_threshold)?;
        require_positive("input.hold_interval_secs", i.hold_interval_secs)?;

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::validation("logging.level", "must not be empty"));
        }
        Ok(())
    }

    /// Check that every per-kind override names a known anchor kind
    pub fn validate_anchor_kinds<'a, I>(&self, known: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: Vec<&str> = known.into_iter().collect();
        match self
            .anchors
            .min_distance
            .keys()
            .find(|k| !known.contains(&k.as_str()))
        {
            Some(unknown) => Err(ConfigError::UnknownAnchorKind(unknown.clone())),
            None => Ok(()),
        }
    }
}
