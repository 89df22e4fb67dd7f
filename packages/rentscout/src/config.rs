//! Runtime configuration and pipeline presets.
//!
//! Everything that used to live as module-level globals in earlier versions
//! of this tool is an explicit value here, constructed once at process start
//! and passed by reference into each component.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::types::listing::Coords;

/// Process-wide configuration.
pub struct ScoutConfig {
    pub openrouteservice_api_key: SecretString,
    pub openai_api_key: SecretString,
    /// Commute destination (the office).
    pub work: Coords,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ScoutConfig {
    /// Read configuration from the environment.
    ///
    /// Requires `OPENROUTESERVICE_API_KEY`, `OPENAI_API_KEY`, `WORK_LAT` and
    /// `WORK_LON`. `CACHE_DIR` and `OUTPUT_DIR` default to `cache/` and
    /// `output/` in the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openrouteservice_api_key: SecretString::from(require("OPENROUTESERVICE_API_KEY")?),
            openai_api_key: SecretString::from(require("OPENAI_API_KEY")?),
            work: Coords {
                lat: require_f64("WORK_LAT")?,
                lng: require_f64("WORK_LON")?,
            },
            cache_dir: dir_or("CACHE_DIR", "cache"),
            output_dir: dir_or("OUTPUT_DIR", "output"),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn require_f64(name: &'static str) -> Result<f64, ConfigError> {
    let value = require(name)?;
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn dir_or(name: &str, default: &str) -> PathBuf {
    std::env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Knobs for one pipeline variant.
///
/// Named presets replace the historical near-duplicate pipeline scripts that
/// diverged only in these constants.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePreset {
    /// Monthly rent the price parabola is centered on.
    pub price_target: f64,
    /// Steepness of the price parabola.
    pub price_weight: f64,
    /// Commute window in seconds; the distance score crosses zero here.
    pub commute_cap_secs: f64,
    /// Admission threshold for the commute filter, in minutes.
    pub commute_threshold_mins: f64,
    /// Hard cap on search pages per fetch.
    pub page_limit: u32,
    /// External quota for the routing service, calls per minute.
    pub route_calls_per_minute: u32,
    /// Server-side price band for the search.
    pub rental_price_min: u32,
    pub rental_price_max: u32,
}

impl Default for PipelinePreset {
    fn default() -> Self {
        Self::wide_net()
    }
}

impl PipelinePreset {
    /// Accepts commutes up to 40 minutes and scores gently on price.
    pub fn wide_net() -> Self {
        Self {
            price_target: 2100.0,
            price_weight: 50.0,
            commute_cap_secs: 2400.0,
            commute_threshold_mins: 40.0,
            page_limit: 10,
            route_calls_per_minute: 30,
            rental_price_min: 1400,
            rental_price_max: 2800,
        }
    }

    /// Tighter 30-minute commute window with a steeper price penalty.
    pub fn near_office() -> Self {
        Self {
            price_weight: 75.0,
            commute_cap_secs: 1800.0,
            commute_threshold_mins: 30.0,
            page_limit: 15,
            ..Self::wide_net()
        }
    }

    /// Admission threshold in seconds.
    pub fn commute_threshold_secs(&self) -> f64 {
        self.commute_threshold_mins * 60.0
    }
}
