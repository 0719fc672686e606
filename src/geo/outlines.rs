//! Static outline and travel tables

use super::{GeoPoint, Outline};
use std::sync::LazyLock;

const fn p(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

/// Simplified continent outlines, closed rings.
pub static CONTINENTS: LazyLock<Vec<Outline>> = LazyLock::new(|| vec![
    // North America
    vec![
        p(60.0, -140.0), p(70.0, -140.0), p(70.0, -100.0), p(60.0, -80.0), p(50.0, -60.0),
        p(45.0, -65.0), p(40.0, -75.0), p(30.0, -85.0), p(25.0, -80.0), p(25.0, -100.0),
        p(30.0, -115.0), p(35.0, -120.0), p(45.0, -125.0), p(55.0, -130.0), p(60.0, -140.0),
    ],
    // South America
    vec![
        p(10.0, -75.0), p(5.0, -80.0), p(-5.0, -80.0), p(-15.0, -75.0), p(-25.0, -65.0),
        p(-35.0, -55.0), p(-55.0, -70.0), p(-55.0, -75.0), p(-45.0, -75.0), p(-35.0, -70.0),
        p(-25.0, -70.0), p(-15.0, -75.0), p(-5.0, -70.0), p(0.0, -50.0), p(5.0, -60.0),
        p(10.0, -75.0),
    ],
    // Europe
    vec![
        p(35.0, -10.0), p(40.0, -5.0), p(45.0, 0.0), p(50.0, 5.0), p(55.0, 10.0),
        p(60.0, 10.0), p(70.0, 25.0), p(70.0, 30.0), p(60.0, 30.0), p(55.0, 20.0),
        p(50.0, 15.0), p(45.0, 15.0), p(40.0, 20.0), p(35.0, 25.0), p(35.0, -10.0),
    ],
    // Africa
    vec![
        p(35.0, -5.0), p(35.0, 10.0), p(30.0, 30.0), p(20.0, 40.0), p(10.0, 50.0),
        p(0.0, 45.0), p(-10.0, 40.0), p(-25.0, 35.0), p(-35.0, 20.0), p(-35.0, 15.0),
        p(-25.0, 15.0), p(-15.0, 10.0), p(-5.0, 10.0), p(5.0, -5.0), p(15.0, -15.0),
        p(25.0, -15.0), p(35.0, -5.0),
    ],
    // Asia
    vec![
        p(70.0, 30.0), p(75.0, 100.0), p(70.0, 140.0), p(60.0, 160.0), p(50.0, 140.0),
        p(40.0, 130.0), p(35.0, 120.0), p(25.0, 120.0), p(20.0, 110.0), p(10.0, 105.0),
        p(5.0, 100.0), p(10.0, 80.0), p(25.0, 65.0), p(35.0, 45.0), p(40.0, 35.0),
        p(50.0, 40.0), p(60.0, 30.0), p(70.0, 30.0),
    ],
    // Australia
    vec![
        p(-15.0, 130.0), p(-20.0, 115.0), p(-30.0, 115.0), p(-35.0, 140.0), p(-40.0, 145.0),
        p(-35.0, 150.0), p(-25.0, 155.0), p(-15.0, 145.0), p(-10.0, 140.0), p(-15.0, 130.0),
    ],
]);

/// Country names as they appear in the Natural Earth `NAME` property.
pub const VISITED_COUNTRIES: &[&str] = &[
    "United States of America",
    "Canada",
    "South Korea",
    "Japan",
    "Puerto Rico",
    "Germany",
    "France",
    "Luxembourg",
    "El Salvador",
    "Guatemala",
];

/// Countries in the world, for the "explored" figure.
pub const WORLD_COUNTRY_COUNT: usize = 195;

#[derive(Clone, Copy, Debug)]
pub struct City {
    pub name: &'static str,
    pub location: GeoPoint,
}

pub const CITIES: &[City] = &[
    City { name: "Boston", location: p(42.3601, -71.0589) },
    City { name: "New York City", location: p(40.7128, -74.0060) },
    City { name: "Mexico City", location: p(19.4326, -99.1332) },
    City { name: "Seoul", location: p(37.5665, 126.9780) },
    City { name: "Tokyo", location: p(35.6762, 139.6503) },
    City { name: "San Juan", location: p(18.4655, -66.1057) },
    City { name: "Berlin", location: p(52.5200, 13.4050) },
    City { name: "Paris", location: p(48.8566, 2.3522) },
    City { name: "Luxembourg City", location: p(49.6116, 6.1319) },
    City { name: "San Salvador", location: p(13.6929, -89.2182) },
    City { name: "Guatemala City", location: p(14.6349, -90.5069) },
];

/// Initial travel-globe point of view.
pub const TRAVEL_VIEW_CENTER: GeoPoint = p(20.0, -30.0);

/// Map-view center (Boston).
pub const MAP_CENTER: GeoPoint = p(42.3601, -71.0589);

/// Approximate East Boston outline highlighted on the map view.
pub const HOME_DISTRICT: &[GeoPoint] = &[
    p(42.3979, -71.0205),
    p(42.3962, -71.0062),
    p(42.3890, -70.9978),
    p(42.3811, -70.9888),
    p(42.3724, -70.9909),
    p(42.3651, -71.0021),
    p(42.3609, -71.0176),
    p(42.3636, -71.0327),
    p(42.3723, -71.0406),
    p(42.3848, -71.0382),
    p(42.3942, -71.0307),
];

pub fn is_visited(country: &str) -> bool {
    VISITED_COUNTRIES.contains(&country)
}

/// Visited-country progress, as shown in the travel stats panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TravelStats {
    pub visited: usize,
    pub total: usize,
    pub percent: u32,
}

impl TravelStats {
    pub fn new(visited: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (visited as f64 / total as f64 * 100.0).round() as u32
        };
        Self { visited, total, percent }
    }

    pub fn current() -> Self {
        Self::new(VISITED_COUNTRIES.len(), WORLD_COUNTRY_COUNT)
    }

    /// Filled cells of a progress bar `width` wide; never less than 2%.
    pub fn bar_fill(&self, width: usize) -> usize {
        let pct = self.percent.max(2) as usize;
        (width * pct / 100).clamp(1, width.max(1))
    }
}
