use crate::error::{GlobeError, Result};
use crate::geo::geojson::DEFAULT_COUNTRIES_URL;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CLOUDS_URL: &str = "https://unpkg.com/three-globe/example/img/earth-clouds.png";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scene: SceneSettings,
    pub travel: TravelSettings,
    pub map: MapSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub steps: usize,
    pub fill_count: usize,
    pub particles: usize,
    pub neural_points: usize,
    pub color_scheme: u8,
    pub rates: RateSettings,
}

/// Yaw/pitch rates in radians per second for each hero-scene layer
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateSettings {
    pub globe: f64,
    pub landmass: f64,
    pub glow: f64,
    pub glow_wobble: f64,
    pub particles_yaw: f64,
    pub particles_pitch: f64,
    pub neural: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TravelSettings {
    pub countries_url: Option<String>,
    pub clouds_url: Option<String>,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f64,
    pub color_scheme: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub api_key: Option<String>,
    pub map_id: Option<String>,
    pub pin_lat: Option<f64>,
    pub pin_lng: Option<f64>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            steps: 8,
            fill_count: 50,
            particles: 2000,
            neural_points: 500,
            color_scheme: 0,
            rates: RateSettings::default(),
        }
    }
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            globe: 0.05,
            landmass: 0.05,
            glow: 0.03,
            glow_wobble: 0.1,
            particles_yaw: 0.02,
            particles_pitch: 0.01,
            neural: 0.03,
        }
    }
}

impl Default for TravelSettings {
    fn default() -> Self {
        Self {
            countries_url: Some(DEFAULT_COUNTRIES_URL.to_string()),
            clouds_url: Some(DEFAULT_CLOUDS_URL.to_string()),
            auto_rotate: false,
            auto_rotate_speed: 0.5,
            color_scheme: 0,
        }
    }
}

impl Settings {
    /// Load from the default path. A missing file gives defaults; a broken one
    /// is logged and also gives defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| GlobeError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("globefolio")
            .join("config.toml")
    }
}
