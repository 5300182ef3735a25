//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-widget.toml
//! file. It centralizes the station, the CORS relay, the upstream endpoint and the
//! chart presentation mode.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file, relative to the working directory
pub const CONFIG_FILE: &str = "tide-widget.toml";

/// Application configuration loaded from tide-widget.toml
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// NOAA station and upstream query settings
    pub station: StationConfig,
    /// Pass-through relay used to reach the upstream service
    pub relay: RelayConfig,
    /// Chart presentation mode
    pub chart: ChartConfig,
}

/// NOAA tide station configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StationConfig {
    /// NOAA station ID (e.g., "8418150" for Portland, ME)
    pub id: String,
    /// Human-readable station name for the chart header
    pub name: String,
    /// CO-OPS datagetter endpoint
    pub api_url: String,
    /// Value sent as the `application` query parameter
    pub application: String,
    /// Forward window in hours (120 = 5 days)
    pub range_hours: u32,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

/// CORS relay configuration.
///
/// The relay receives the full upstream URL, percent-encoded, in a single query
/// parameter and returns the upstream body and status unchanged.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Send requests through the relay instead of straight upstream
    pub enabled: bool,
    /// Relay endpoint
    pub url: String,
    /// Query parameter that carries the upstream URL
    pub param: String,
}

/// Sign applied to every sample before charting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Heights as reported
    Upright,
    /// Every height negated, flipping the fill direction
    Inverted,
}

impl SignConvention {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            SignConvention::Upright => value,
            SignConvention::Inverted => -value,
        }
    }
}

/// What goes under the curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// Bare line, no tick labels
    Plain,
    /// Sun/moon glyphs under the quartile ticks
    GlyphTicks,
}

/// Chart presentation configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ChartConfig {
    pub mode: ChartMode,
    pub sign: SignConvention,
    /// Raster width in pixels for `--ppm` output
    pub width: u32,
    /// Raster height in pixels for `--ppm` output
    pub height: u32,
    /// Rows used by the terminal chart
    pub ascii_rows: usize,
    /// Columns used by the terminal chart
    pub ascii_columns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            station: StationConfig {
                id: "8418150".to_string(),
                name: "Portland, ME".to_string(),
                api_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string(),
                application: "tide_widget".to_string(),
                range_hours: 120,
                timeout_secs: 20,
            },
            relay: RelayConfig {
                enabled: true,
                url: "https://api.allorigins.win/raw".to_string(),
                param: "url".to_string(),
            },
            chart: ChartConfig {
                mode: ChartMode::GlyphTicks,
                sign: SignConvention::Upright,
                width: 400,
                height: 200,
                ascii_rows: 12,
                ascii_columns: 60,
            },
        }
    }
}

impl Config {
    /// Load configuration from tide-widget.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(station = %config.station.id, name = %config.station.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
