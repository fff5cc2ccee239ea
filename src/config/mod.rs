use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::clock::TICKS_PER_SECOND;

/// Complete SpeedMeter configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeedMeterConfig {
    #[serde(default)]
    pub units: UnitsConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Unit table source
#[derive(Debug, Clone, Deserialize)]
pub struct UnitsConfig {
    /// Path of the unit file; a missing file means base unit only
    #[serde(default = "default_units_path")]
    pub path: PathBuf,
}

fn default_units_path() -> PathBuf {
    PathBuf::from("units")
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            path: default_units_path(),
        }
    }
}

/// Sampling behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Interval used when a start request gives none (seconds)
    #[serde(default = "default_interval_seconds")]
    pub default_interval_seconds: u32,
    /// Movement below this (meters) pauses text reporting
    #[serde(default = "default_min_move_delta")]
    pub min_move_delta: f64,
    /// Host ticks per second
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
}

fn default_interval_seconds() -> u32 {
    1
}

fn default_min_move_delta() -> f64 {
    0.01
}

fn default_ticks_per_second() -> u32 {
    TICKS_PER_SECOND
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_interval_seconds: default_interval_seconds(),
            min_move_delta: default_min_move_delta(),
            ticks_per_second: default_ticks_per_second(),
        }
    }
}

/// Overlay label placement
#[derive(Debug, Clone, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_label_offset")]
    pub x: i32,
    #[serde(default = "default_label_offset")]
    pub y: i32,
}

fn default_label_offset() -> i32 {
    3
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            x: default_label_offset(),
            y: default_label_offset(),
        }
    }
}

impl SpeedMeterConfig {
    /// Apply `SPEEDMETER_*` environment overrides. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("SPEEDMETER_UNITS_PATH") {
            self.units.path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SPEEDMETER_DEFAULT_INTERVAL_SECONDS") {
            if let Ok(n) = v.parse::<u32>() {
                if n > 0 {
                    self.tracking.default_interval_seconds = n;
                }
            }
        }
        if let Ok(v) = std::env::var("SPEEDMETER_MIN_MOVE_DELTA") {
            if let Ok(d) = v.parse::<f64>() {
                if d >= 0.0 {
                    self.tracking.min_move_delta = d;
                }
            }
        }
        self
    }
}

/// Highest supported host tick rate; the tokio clock needs whole-millisecond ticks.
pub const MAX_TICKS_PER_SECOND: u32 = 1000;

impl TrackingConfig {
    /// Reject settings the sampling clock cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_second == 0 || self.ticks_per_second > MAX_TICKS_PER_SECOND {
            bail!(
                "tracking.ticks_per_second must be between 1 and {}, got {}",
                MAX_TICKS_PER_SECOND,
                self.ticks_per_second
            );
        }
        if self.default_interval_seconds == 0 {
            bail!("tracking.default_interval_seconds must be positive");
        }
        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &Path) -> Result<SpeedMeterConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SpeedMeterConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .tracking
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}
