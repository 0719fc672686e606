//! Procedural point generation for the decorative globe layers

use super::{project, project_point, GeoPoint, Outline, PointCloud, Vector3};
use rand::Rng;
use std::f64::consts::TAU;

/// Parameters for turning outlines into a dotted landmass cloud.
#[derive(Clone, Copy, Debug)]
pub struct SamplerConfig {
    pub radius: f64,
    /// Interpolation steps per outline segment (each segment emits steps + 1 samples).
    pub steps: usize,
    /// Random samples scattered inside each outline's bounding box.
    pub fill_count: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            radius: 2.01,
            steps: 8,
            fill_count: 50,
        }
    }
}

/// Samples along one segment, endpoints included.
pub fn interpolate_segment(start: GeoPoint, end: GeoPoint, steps: usize, radius: f64) -> impl Iterator<Item = Vector3> {
    let steps = steps.max(1);
    (0..=steps).map(move |j| {
        let t = j as f64 / steps as f64;
        project_point(start.lerp(end, t), radius)
    })
}

/// Samples along every consecutive pair of an outline.
///
/// Shared vertices are emitted once per adjacent segment.
pub fn interpolate_outline(outline: &[GeoPoint], steps: usize, radius: f64) -> PointCloud {
    outline
        .windows(2)
        .flat_map(|pair| interpolate_segment(pair[0], pair[1], steps, radius))
        .collect()
}

/// Lat/lon bounding box of an outline as (min, max) corners.
pub fn bounding_box(outline: &[GeoPoint]) -> Option<(GeoPoint, GeoPoint)> {
    let first = outline.first()?;
    let init = (*first, *first);
    Some(outline.iter().fold(init, |(lo, hi), q| {
        (
            GeoPoint::new(lo.lat.min(q.lat), lo.lon.min(q.lon)),
            GeoPoint::new(hi.lat.max(q.lat), hi.lon.max(q.lon)),
        )
    }))
}

/// Uniform random samples inside the outline's bounding box.
pub fn scatter_in_bounds<R: Rng + ?Sized>(outline: &[GeoPoint], count: usize, radius: f64, rng: &mut R) -> PointCloud {
    let Some((lo, hi)) = bounding_box(outline) else {
        return Vec::new();
    };
    (0..count)
        .map(|_| {
            let lat = lo.lat + rng.gen::<f64>() * (hi.lat - lo.lat);
            let lon = lo.lon + rng.gen::<f64>() * (hi.lon - lo.lon);
            project(lat, lon, radius)
        })
        .collect()
}

/// Outline dots followed by bounding-box fill dots for every outline.
pub fn landmass_cloud<R: Rng + ?Sized>(outlines: &[Outline], config: &SamplerConfig, rng: &mut R) -> PointCloud {
    let mut cloud: PointCloud = outlines
        .iter()
        .flat_map(|o| interpolate_outline(o, config.steps, config.radius))
        .collect();

    for outline in outlines {
        cloud.extend(scatter_in_bounds(outline, config.fill_count, config.radius, rng));
    }
    cloud
}

/// Random points in a spherical shell, uniform in direction.
pub fn particle_shell<R: Rng + ?Sized>(count: usize, inner: f64, depth: f64, rng: &mut R) -> PointCloud {
    (0..count)
        .map(|_| {
            let theta = rng.gen::<f64>() * TAU;
            let phi = (rng.gen::<f64>() * 2.0 - 1.0).acos();
            let r = inner + rng.gen::<f64>() * depth;
            Vector3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
            )
        })
        .collect()
}

/// Random points in an axis-aligned cube centred on the origin.
pub fn cube_scatter<R: Rng + ?Sized>(count: usize, side: f64, rng: &mut R) -> PointCloud {
    (0..count)
        .map(|_| {
            Vector3::new(
                (rng.gen::<f64>() - 0.5) * side,
                (rng.gen::<f64>() - 0.5) * side,
                (rng.gen::<f64>() - 0.5) * side,
            )
        })
        .collect()
}

/// Latitude rings and meridians of a wireframe sphere, as dots.
///
/// `segments` matches a UV sphere's width/height segment count; each line
/// is sampled finely enough to read as continuous at terminal resolution.
pub fn wireframe_sphere(radius: f64, segments: usize, samples_per_line: usize) -> PointCloud {
    let segments = segments.max(2);
    let samples = samples_per_line.max(2);
    let mut cloud = Vec::with_capacity(segments * samples * 2);

    // Parallels, poles excluded
    for i in 1..segments {
        let lat = 90.0 - 180.0 * i as f64 / segments as f64;
        for k in 0..samples {
            let lon = -180.0 + 360.0 * k as f64 / samples as f64;
            cloud.push(project(lat, lon, radius));
        }
    }

    // Meridians
    for i in 0..segments {
        let lon = -180.0 + 360.0 * i as f64 / segments as f64;
        for k in 0..=samples / 2 {
            let lat = 90.0 - 180.0 * k as f64 / (samples / 2) as f64;
            cloud.push(project(lat, lon, radius));
        }
    }
    cloud
}

/// Dots on a lat/lon grid of a shell, used for the cloud layer before masking.
pub fn shell_grid(radius: f64, lat_steps: usize, lon_steps: usize) -> Vec<(GeoPoint, Vector3)> {
    let lat_steps = lat_steps.max(1);
    let lon_steps = lon_steps.max(1);
    let mut out = Vec::with_capacity(lat_steps * lon_steps);
    for i in 0..lat_steps {
        let lat = 90.0 - 180.0 * (i as f64 + 0.5) / lat_steps as f64;
        for k in 0..lon_steps {
            let lon = -180.0 + 360.0 * (k as f64 + 0.5) / lon_steps as f64;
            let at = GeoPoint::new(lat, lon);
            out.push((at, project_point(at, radius)));
        }
    }
    out
}

/// Even-odd point-in-polygon test in lat/lon space.
pub fn contains(outline: &[GeoPoint], at: GeoPoint) -> bool {
    let n = outline.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (outline[i], outline[j]);
        if (a.lat > at.lat) != (b.lat > at.lat) {
            let cross = (b.lon - a.lon) * (at.lat - a.lat) / (b.lat - a.lat) + a.lon;
            if at.lon < cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Random samples inside an outline (rejection sampled in its bounding box).
///
/// Gives up after `count * 20` attempts so slivers cannot stall a frame.
pub fn fill_polygon<R: Rng + ?Sized>(outline: &[GeoPoint], count: usize, radius: f64, rng: &mut R) -> PointCloud {
    let Some((lo, hi)) = bounding_box(outline) else {
        return Vec::new();
    };
    let mut cloud = Vec::with_capacity(count);
    let mut attempts = 0;
    while cloud.len() < count && attempts < count * 20 {
        attempts += 1;
        let at = GeoPoint::new(
            lo.lat + rng.gen::<f64>() * (hi.lat - lo.lat),
            lo.lon + rng.gen::<f64>() * (hi.lon - lo.lon),
        );
        if contains(outline, at) {
            cloud.push(project_point(at, radius));
        }
    }
    cloud
}

/// Angular distance between two points in radians (haversine).
pub fn angular_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (la1, la2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = la2 - la1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + la1.cos() * la2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn equator_quarter_scenario() {
        let outline = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 90.0)];
        let cloud = interpolate_outline(&outline, 8, 2.0);
        assert_eq!(cloud.len(), 9);
        for (j, v) in cloud.iter().enumerate() {
            let expected = project(0.0, 90.0 * j as f64 / 8.0, 2.0);
            assert!(v.distance(expected) < 1e-12);
            assert!((v.length() - 2.0).abs() < 1e-12);
            assert!(v.y.abs() < 1e-12);
        }
    }

    #[test]
    fn interpolation_reproduces_endpoints_exactly() {
        let a = GeoPoint::new(35.0, -10.0);
        let b = GeoPoint::new(-55.0, 145.0);
        let samples: Vec<_> = interpolate_segment(a, b, 8, 2.01).collect();
        assert_eq!(samples.first().copied(), Some(project_point(a, 2.01)));
        assert_eq!(samples.last().copied(), Some(project_point(b, 2.01)));
    }

    #[test]
    fn outline_emits_steps_plus_one_per_segment() {
        let ring = &crate::geo::outlines::CONTINENTS[0];
        let cloud = interpolate_outline(ring, 8, 1.0);
        assert_eq!(cloud.len(), (ring.len() - 1) * 9);
    }

    #[test]
    fn degenerate_outlines() {
        assert!(interpolate_outline(&[], 8, 1.0).is_empty());
        assert!(interpolate_outline(&[GeoPoint::new(1.0, 1.0)], 8, 1.0).is_empty());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(scatter_in_bounds(&[], 10, 1.0, &mut rng).is_empty());
    }

    #[test]
    fn scatter_stays_inside_bounding_box() {
        let outline = vec![
            GeoPoint::new(-15.0, 130.0),
            GeoPoint::new(-40.0, 145.0),
            GeoPoint::new(-10.0, 155.0),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let cloud = scatter_in_bounds(&outline, 200, 2.01, &mut rng);
        assert_eq!(cloud.len(), 200);
        let lo = project(-40.0, 0.0, 2.01).y;
        let hi = project(-10.0, 0.0, 2.01).y;
        for v in cloud {
            assert!((v.length() - 2.01).abs() < 1e-9);
            // y depends only on latitude
            assert!(v.y >= lo - 1e-9 && v.y <= hi + 1e-9);
        }
    }

    #[test]
    fn landmass_cloud_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = SamplerConfig::default();
        let outlines = &*crate::geo::outlines::CONTINENTS;
        let cloud = landmass_cloud(outlines, &config, &mut rng);
        let segments: usize = outlines.iter().map(|o| o.len() - 1).sum();
        assert_eq!(cloud.len(), segments * 9 + outlines.len() * 50);
    }

    #[test]
    fn particle_shell_radius_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let cloud = particle_shell(500, 2.5, 2.0, &mut rng);
        assert_eq!(cloud.len(), 500);
        assert!(cloud.iter().all(|v| v.length() >= 2.5 - 1e-9 && v.length() < 4.5));
    }

    #[test]
    fn cube_scatter_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let cloud = cube_scatter(300, 8.0, &mut rng);
        assert!(cloud.iter().all(|v| v.x.abs() <= 4.0 && v.y.abs() <= 4.0 && v.z.abs() <= 4.0));
    }

    #[test]
    fn wireframe_points_on_sphere() {
        let cloud = wireframe_sphere(2.0, 16, 32);
        assert!(!cloud.is_empty());
        assert!(cloud.iter().all(|v| (v.length() - 2.0).abs() < 1e-9));
    }

    #[test]
    fn point_in_polygon() {
        let square = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ];
        assert!(contains(&square, GeoPoint::new(5.0, 5.0)));
        assert!(!contains(&square, GeoPoint::new(15.0, 5.0)));
        assert!(!contains(&square, GeoPoint::new(5.0, -1.0)));
    }

    #[test]
    fn fill_polygon_only_inside() {
        let tri = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 20.0),
            GeoPoint::new(20.0, 0.0),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let cloud = fill_polygon(&tri, 40, 1.0, &mut rng);
        assert_eq!(cloud.len(), 40);
        for v in cloud {
            // Back out latitude from y and check it is inside the triangle's span.
            let lat = v.y.asin().to_degrees();
            assert!((0.0..=20.0).contains(&lat));
        }
    }

    #[test]
    fn angular_distance_quarter_turn() {
        let d = angular_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 90.0));
        assert!((d - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(angular_distance(GeoPoint::new(3.0, 4.0), GeoPoint::new(3.0, 4.0)), 0.0);
    }
}
