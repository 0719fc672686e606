//! Country boundaries from a GeoJSON FeatureCollection

use super::outlines::is_visited;
use super::{GeoPoint, Outline};
use crate::error::{GlobeError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Natural Earth 110m admin-0 countries, the dataset the travel overlay expects.
pub const DEFAULT_COUNTRIES_URL: &str =
    "https://raw.githubusercontent.com/vasturiano/react-globe.gl/master/example/datasets/ne_110m_admin_0_countries.geojson";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    geometry: Option<Geometry>,
}

impl Feature {
    /// `NAME` first, then `name`; anything else leaves the shape unnamed.
    fn name(&self) -> String {
        let props = self.properties.as_ref();
        ["NAME", "name"]
            .iter()
            .find_map(|key| props?.get(*key)?.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

/// One country's outer boundary rings.
#[derive(Clone, Debug)]
pub struct CountryShape {
    pub name: String,
    pub rings: Vec<Outline>,
    pub visited: bool,
}

/// GeoJSON positions are `[lon, lat(, alt)]`; anything shorter is skipped.
fn ring(positions: &[Position]) -> Outline {
    positions
        .iter()
        .filter_map(|p| match p.as_slice() {
            [lon, lat, ..] => Some(GeoPoint::new(*lat, *lon)),
            _ => None,
        })
        .collect()
}

/// Parse a FeatureCollection; holes are dropped, only outer rings kept.
pub fn parse_countries(json: &[u8]) -> Result<Vec<CountryShape>> {
    let collection: FeatureCollection = serde_json::from_slice(json)?;

    let shapes: Vec<CountryShape> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let name = feature.name();
            let rings: Vec<Outline> = match feature.geometry? {
                Geometry::Polygon { coordinates } => {
                    coordinates.first().map(|r| ring(r)).into_iter().collect()
                }
                Geometry::MultiPolygon { coordinates } => coordinates
                    .iter()
                    .filter_map(|poly| poly.first().map(|r| ring(r)))
                    .collect(),
                Geometry::Unsupported => return None,
            };
            let rings: Vec<Outline> = rings.into_iter().filter(|r| r.len() >= 3).collect();
            if rings.is_empty() {
                return None;
            }
            let visited = is_visited(&name);
            Some(CountryShape { name, rings, visited })
        })
        .collect();

    if shapes.is_empty() {
        return Err(GlobeError::GeoJson("no polygon features".into()));
    }
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "NAME": "Japan", "ISO_A2": "JP" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[141.0, 37.1], [135.8, 33.5], [131.0, 33.9], [141.0, 37.1]]],
                        [[[140.3, 41.2], [139.4, 38.2], [141.0, 40.0], [140.3, 41.2]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Peru" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[-81.4, -4.7], [-70.4, -18.3], [-69.0, -10.0], [-81.4, -4.7]],
                        [[-75.0, -10.0], [-74.0, -10.0], [-74.0, -9.0], [-75.0, -10.0]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Nowhere" },
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Null Island" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn parses_polygon_and_multipolygon() {
        let shapes = parse_countries(SAMPLE.as_bytes()).unwrap();
        assert_eq!(shapes.len(), 2);

        let japan = &shapes[0];
        assert_eq!(japan.name, "Japan");
        assert!(japan.visited);
        assert_eq!(japan.rings.len(), 2);
        assert_eq!(japan.rings[0][0], GeoPoint::new(37.1, 141.0));

        let peru = &shapes[1];
        assert!(!peru.visited);
        // Hole ring is dropped
        assert_eq!(peru.rings.len(), 1);
        assert_eq!(peru.rings[0].len(), 4);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_countries(b"not json"), Err(GlobeError::GeoJson(_))));
        assert!(matches!(
            parse_countries(br#"{"type":"FeatureCollection","features":[]}"#),
            Err(GlobeError::GeoJson(_))
        ));
    }

    #[test]
    fn short_positions_are_skipped() {
        let json = br#"{"features":[{"properties":{"name":"Canada"},"geometry":{"type":"Polygon","coordinates":[[[1.0],[-100.0,50.0],[-90.0,55.0],[-80.0,50.0,12.0]]]}}]}"#;
        let shapes = parse_countries(json).unwrap();
        assert_eq!(shapes[0].name, "Canada");
        assert!(shapes[0].visited);
        assert_eq!(shapes[0].rings[0].len(), 3);
    }

    #[test]
    fn odd_properties_do_not_sink_the_document() {
        let json = br#"{"features":[
            {"properties":{"NAME":"Japan","name":"Nippon"},"geometry":{"type":"Polygon","coordinates":[[[141.0,37.1],[135.8,33.5],[131.0,33.9],[141.0,37.1]]]}},
            {"properties":null,"geometry":{"type":"Polygon","coordinates":[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,0.0]]]}},
            {"properties":{"NAME":42,"name":"Peru"},"geometry":{"type":"Polygon","coordinates":[[[-81.4,-4.7],[-70.4,-18.3],[-69.0,-10.0],[-81.4,-4.7]]]}}
        ]}"#;
        let shapes = parse_countries(json).unwrap();
        assert_eq!(shapes.len(), 3);

        assert_eq!(shapes[0].name, "Japan");
        assert!(shapes[0].visited);

        assert_eq!(shapes[1].name, "");
        assert!(!shapes[1].visited);

        assert_eq!(shapes[2].name, "Peru");
    }
}
