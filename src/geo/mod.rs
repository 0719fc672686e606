//! Geographic coordinates and their projection onto a sphere

pub mod geojson;
pub mod outlines;
pub mod sampler;

use std::f64::consts::PI;

const DEG_TO_RAD: f64 = PI / 180.0;

/// A latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Linear interpolation in lat/lon space (not along the great circle).
    /// Exact at `t = 0` and `t = 1`.
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat * (1.0 - t) + other.lat * t,
            lon: self.lon * (1.0 - t) + other.lon * t,
        }
    }
}

/// An ordered ring of points approximating a landmass or country boundary.
pub type Outline = Vec<GeoPoint>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[cfg(test)]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[cfg(test)]
    pub fn distance(self, other: Vector3) -> f64 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z).length()
    }

    /// Rotate about the X axis (pitch).
    pub fn rotate_x(self, angle: f64) -> Vector3 {
        let (s, c) = angle.sin_cos();
        Vector3::new(self.x, self.y * c - self.z * s, self.y * s + self.z * c)
    }

    /// Rotate about the Y axis (yaw). Positive angles turn +Z toward +X.
    pub fn rotate_y(self, angle: f64) -> Vector3 {
        let (s, c) = angle.sin_cos();
        Vector3::new(self.x * c + self.z * s, self.y, -self.x * s + self.z * c)
    }
}

/// A flat buffer of projected points, owned by whichever surface layer draws it.
pub type PointCloud = Vec<Vector3>;

/// Project a latitude/longitude (degrees) onto a sphere of `radius`.
///
/// The longitude is offset by 180 degrees and x is negated so the texture
/// seam lines up with a camera looking down -Z. Inputs outside the usual
/// ranges are projected as-is.
pub fn project(lat: f64, lon: f64, radius: f64) -> Vector3 {
    let phi = (90.0 - lat) * DEG_TO_RAD;
    let theta = (lon + 180.0) * DEG_TO_RAD;

    let x = -radius * phi.sin() * theta.cos();
    let y = radius * phi.cos();
    let z = radius * phi.sin() * theta.sin();

    Vector3::new(x, y, z)
}

pub fn project_point(p: GeoPoint, radius: f64) -> Vector3 {
    project(p.lat, p.lon, radius)
}

/// Yaw that brings longitude `lon` to face a camera sitting on +Z.
pub fn facing_yaw(lon: f64) -> f64 {
    // project() puts lon at azimuth theta = lon + 180 measured from -X toward +Z;
    // the point faces +Z when rotated by -(lon + 90) degrees about Y.
    -(lon + 90.0) * DEG_TO_RAD
}

/// Pitch that brings latitude `lat` level with the camera after the facing yaw.
pub fn facing_pitch(lat: f64) -> f64 {
    lat * DEG_TO_RAD
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Vector3, b: Vector3) -> bool {
        a.distance(b) < EPS
    }

    #[test]
    fn magnitude_matches_radius_over_domain() {
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(20) {
                for &r in &[0.5, 2.0, 2.01, 100.0] {
                    let v = project(lat as f64, lon as f64, r);
                    assert!((v.length() - r).abs() < 1e-9 * r.max(1.0), "lat={lat} lon={lon} r={r}");
                }
            }
        }
    }

    #[test]
    fn poles_collapse_to_y_axis() {
        for lon in [-180.0, -73.5, 0.0, 42.0, 180.0] {
            assert!(close(project(90.0, lon, 3.0), Vector3::new(0.0, 3.0, 0.0)));
            assert!(close(project(-90.0, lon, 3.0), Vector3::new(0.0, -3.0, 0.0)));
        }
    }

    #[test]
    fn orientation_convention() {
        // lon 0 sits on +X after the 180 degree offset and the x flip.
        assert!(close(project(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0)));
        assert!(close(project(0.0, 90.0, 1.0), Vector3::new(0.0, 0.0, -1.0)));
        assert!(close(project(0.0, -90.0, 1.0), Vector3::new(0.0, 0.0, 1.0)));
        assert!(close(project(0.0, 180.0, 1.0), Vector3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn small_input_changes_give_small_output_changes() {
        let r = 2.0;
        let d = 1e-4;
        for lat in (-80..=80).step_by(20) {
            for lon in (-170..=170).step_by(34) {
                let (lat, lon) = (lat as f64, lon as f64);
                let base = project(lat, lon, r);
                let moved = project(lat + d, lon + d, r);
                // Arc length bound: r * (dlat + dlon) in radians.
                assert!(base.distance(moved) <= r * 2.0 * d * DEG_TO_RAD + EPS);
            }
        }
    }

    #[test]
    fn seam_is_continuous_in_space() {
        let a = project(10.0, 180.0, 1.0);
        let b = project(10.0, -180.0, 1.0);
        assert!(close(a, b));
    }

    #[test]
    fn facing_rotation_brings_point_to_camera() {
        for (lat, lon) in [(20.0, -30.0), (42.36, -71.06), (-33.9, 151.2), (0.0, 0.0)] {
            let p = project(lat, lon, 1.0)
                .rotate_y(facing_yaw(lon))
                .rotate_x(facing_pitch(lat));
            assert!(close(p, Vector3::new(0.0, 0.0, 1.0)), "lat={lat} lon={lon} -> {p:?}");
        }
    }

    #[test]
    fn lerp_endpoints() {
        let a = GeoPoint::new(10.0, -20.0);
        let b = GeoPoint::new(-5.0, 40.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), GeoPoint::new(2.5, 10.0));
    }
}
