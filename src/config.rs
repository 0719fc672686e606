use crate::geo::GeoPoint;
use crate::settings::MapSettings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

pub const API_KEY_VAR: &str = "GLOBEFOLIO_MAPS_API_KEY";
pub const MAP_ID_VAR: &str = "GLOBEFOLIO_MAP_ID";
pub const PIN_LAT_VAR: &str = "GLOBEFOLIO_PIN_LAT";
pub const PIN_LNG_VAR: &str = "GLOBEFOLIO_PIN_LNG";
pub const DEFAULT_MAP_ID: &str = "DEMO_MAP_ID";

/// Configuration shared by every view
#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub time_step: f32,
    pub seed: Option<u64>,
    pub color_scheme: Option<u8>,
    /// Skip remote overlays (country borders, clouds)
    pub offline: bool,
}

impl ViewConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// One-shot render to stdout instead of the interactive loop
#[derive(Clone, Copy, Debug)]
pub struct PrintFrame {
    pub width: u16,
    pub height: u16,
    /// Elapsed seconds the frame is rendered at
    pub at: f64,
}

impl PrintFrame {
    /// `at` as a duration; negative or non-finite values mean the start.
    pub fn elapsed(&self) -> Duration {
        if self.at.is_finite() && self.at > 0.0 {
            Duration::try_from_secs_f64(self.at).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

/// Map view configuration; only exists when an API key is set.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub api_key: String,
    pub map_id: String,
    pub pin: Option<GeoPoint>,
}

impl MapConfig {
    /// Resolve from the process environment, falling back to settings.
    pub fn from_env(settings: &MapSettings) -> Option<Self> {
        Self::resolve(|name| std::env::var(name).ok(), settings)
    }

    /// Environment values win over settings. An empty key counts as missing.
    /// The pin is used only when both coordinates are finite numbers.
    pub fn resolve<F>(env: F, settings: &MapSettings) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let api_key = non_empty(env(API_KEY_VAR)).or_else(|| non_empty(settings.api_key.clone()))?;
        let map_id = non_empty(env(MAP_ID_VAR))
            .or_else(|| non_empty(settings.map_id.clone()))
            .unwrap_or_else(|| DEFAULT_MAP_ID.to_string());

        let coord = |var: &str, fallback: Option<f64>| -> Option<f64> {
            match env(var) {
                Some(raw) => raw.trim().parse::<f64>().ok(),
                None => fallback,
            }
        };
        let pin = match (coord(PIN_LAT_VAR, settings.pin_lat), coord(PIN_LNG_VAR, settings.pin_lng)) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };

        Some(Self { api_key, map_id, pin })
    }
}
