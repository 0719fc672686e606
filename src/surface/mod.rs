//! Rotating render surface
//!
//! A surface owns a stack of point-cloud layers, each spinning at its own
//! constant rate, plus any textures loaded for it. Rotation is driven by an
//! injected [`Clock`] through [`Surface::tick`]. Teardown releases everything
//! exactly once and ends the surface lifetime, so loads still in flight are
//! discarded rather than applied.

pub mod assets;
pub mod clock;
pub mod texture;

use crate::error::Result;
use crate::geo::{PointCloud, Vector3};
use assets::{spawn_load, CancelToken, Lifetime, Pending};
use clock::Clock;
use std::time::Duration;
use texture::CloudMask;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Wireframe,
    Glow,
    Landmass,
    Particles,
    Neural,
    Borders,
    VisitedFill,
    Clouds,
    Cities,
    District,
    Pin,
}

/// Sinusoidal pitch added on top of the linear rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wobble {
    pub amplitude: f64,
    pub frequency: f64,
}

/// Angular rates in radians per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerMotion {
    pub yaw_rate: f64,
    pub pitch_rate: f64,
    pub wobble: Option<Wobble>,
}

impl LayerMotion {
    pub const STILL: LayerMotion = LayerMotion {
        yaw_rate: 0.0,
        pitch_rate: 0.0,
        wobble: None,
    };

    pub const fn spin(yaw_rate: f64) -> Self {
        Self {
            yaw_rate,
            pitch_rate: 0.0,
            wobble: None,
        }
    }

    /// (yaw, pitch) after `t` seconds.
    pub fn angles_at(&self, t: f64) -> (f64, f64) {
        let wobble = self
            .wobble
            .map(|w| (t * w.frequency).sin() * w.amplitude)
            .unwrap_or(0.0);
        (self.yaw_rate * t, self.pitch_rate * t + wobble)
    }
}

pub struct Layer {
    pub kind: LayerKind,
    pub cloud: PointCloud,
    pub motion: LayerMotion,
    /// Braille intensity level (1 = faint, 4 = marker).
    pub intensity: u8,
    /// Skip points on the far side of the globe.
    pub cull_back: bool,
    yaw: f64,
    pitch: f64,
}

impl Layer {
    pub fn new(kind: LayerKind, cloud: PointCloud, motion: LayerMotion, intensity: u8) -> Self {
        Self {
            kind,
            cloud,
            motion,
            intensity,
            cull_back: false,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn culled(mut self) -> Self {
        self.cull_back = true;
        self
    }

    #[cfg(test)]
    pub fn rotation(&self) -> (f64, f64) {
        (self.yaw, self.pitch)
    }

    fn update(&mut self, t: f64) {
        let (yaw, pitch) = self.motion.angles_at(t);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Layer points after the layer's own rotation.
    pub fn rotated(&self) -> impl Iterator<Item = Vector3> + '_ {
        let (yaw, pitch) = (self.yaw, self.pitch);
        self.cloud.iter().map(move |p| p.rotate_y(yaw).rotate_x(pitch))
    }
}

struct Resources {
    layers: Vec<Layer>,
    clouds: Option<CloudMask>,
}

pub struct Surface<C: Clock> {
    clock: C,
    lifetime: Lifetime,
    resources: Option<Resources>,
    release_hook: Option<Box<dyn FnMut()>>,
    elapsed: Duration,
}

impl<C: Clock> Surface<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            lifetime: Lifetime::new(),
            resources: Some(Resources {
                layers: Vec::new(),
                clouds: None,
            }),
            release_hook: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Called once, when the surface's resources are released.
    pub fn on_release(&mut self, hook: impl FnMut() + 'static) {
        self.release_hook = Some(Box::new(hook));
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    #[cfg(test)]
    pub fn is_torn_down(&self) -> bool {
        self.resources.is_none()
    }

    pub fn token(&self) -> CancelToken {
        self.lifetime.token()
    }

    /// Start a background load bound to this surface's lifetime.
    pub fn request<T, F>(&self, label: &str, job: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
    {
        spawn_load(label, self.lifetime.token(), job)
    }

    /// Insert a layer, replacing any existing layer of the same kind.
    /// Returns false (and drops the layer) once torn down.
    pub fn set_layer(&mut self, mut layer: Layer) -> bool {
        let Some(res) = self.resources.as_mut() else {
            return false;
        };
        layer.update(self.elapsed.as_secs_f64());
        match res.layers.iter_mut().find(|l| l.kind == layer.kind) {
            Some(slot) => *slot = layer,
            None => res.layers.push(layer),
        }
        true
    }

    pub fn set_cloud_mask(&mut self, mask: CloudMask) -> bool {
        match self.resources.as_mut() {
            Some(res) => {
                res.clouds = Some(mask);
                true
            }
            None => false,
        }
    }

    pub fn cloud_mask(&self) -> Option<&CloudMask> {
        self.resources.as_ref()?.clouds.as_ref()
    }

    pub fn layers(&self) -> &[Layer] {
        self.resources.as_ref().map(|r| r.layers.as_slice()).unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers().iter().find(|l| l.kind == kind)
    }

    /// Per-frame update: read the clock and set every layer's rotation.
    pub fn tick(&mut self) -> Duration {
        self.elapsed = self.clock.elapsed();
        let t = self.elapsed.as_secs_f64();
        if let Some(res) = self.resources.as_mut() {
            for layer in &mut res.layers {
                layer.update(t);
            }
        }
        self.elapsed
    }

    /// Release layers and textures. Safe to call any number of times.
    pub fn teardown(&mut self) {
        let Some(res) = self.resources.take() else {
            return;
        };
        self.lifetime.end();
        let points: usize = res.layers.iter().map(|l| l.cloud.len()).sum();
        debug!(layers = res.layers.len(), points, "surface torn down");
        drop(res);
        if let Some(mut hook) = self.release_hook.take() {
            hook();
        }
    }
}

impl<C: Clock> Drop for Surface<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::assets::LoadState;
    use super::clock::ManualClock;
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::mpsc;

    fn dots(n: usize) -> PointCloud {
        (0..n).map(|i| Vector3::new(i as f64, 0.0, 1.0)).collect()
    }

    #[test]
    fn rotation_is_linear_in_time() {
        let clock = ManualClock::new();
        let mut surface = Surface::new(clock.clone());
        surface.set_layer(Layer::new(LayerKind::Landmass, dots(3), LayerMotion::spin(0.05), 3));

        clock.set(Duration::from_secs(10));
        surface.tick();
        let (yaw10, _) = surface.layer(LayerKind::Landmass).unwrap().rotation();
        assert!((yaw10 - 0.5).abs() < 1e-12);

        clock.set(Duration::from_secs(20));
        surface.tick();
        let (yaw20, _) = surface.layer(LayerKind::Landmass).unwrap().rotation();
        assert!((yaw20 - 2.0 * yaw10).abs() < 1e-12);
    }

    #[test]
    fn layers_rotate_independently() {
        let clock = ManualClock::starting_at(Duration::from_secs(4));
        let mut surface = Surface::new(clock.clone());
        surface.set_layer(Layer::new(LayerKind::Wireframe, dots(1), LayerMotion::spin(0.05), 1));
        surface.set_layer(Layer::new(
            LayerKind::Particles,
            dots(1),
            LayerMotion { yaw_rate: 0.02, pitch_rate: 0.01, wobble: None },
            2,
        ));
        surface.set_layer(Layer::new(
            LayerKind::Glow,
            dots(1),
            LayerMotion {
                yaw_rate: 0.03,
                pitch_rate: 0.0,
                wobble: Some(Wobble { amplitude: 0.1, frequency: 0.2 }),
            },
            2,
        ));
        surface.tick();

        let wire = surface.layer(LayerKind::Wireframe).unwrap().rotation();
        let parts = surface.layer(LayerKind::Particles).unwrap().rotation();
        let glow = surface.layer(LayerKind::Glow).unwrap().rotation();
        assert!((wire.0 - 0.2).abs() < 1e-12 && wire.1 == 0.0);
        assert!((parts.0 - 0.08).abs() < 1e-12 && (parts.1 - 0.04).abs() < 1e-12);
        assert!((glow.0 - 0.12).abs() < 1e-12);
        assert!((glow.1 - (0.8f64).sin() * 0.1).abs() < 1e-12);
    }

    #[test]
    fn set_layer_replaces_same_kind() {
        let mut surface = Surface::new(ManualClock::new());
        surface.set_layer(Layer::new(LayerKind::Borders, dots(2), LayerMotion::STILL, 1));
        surface.set_layer(Layer::new(LayerKind::Borders, dots(5), LayerMotion::STILL, 1));
        assert_eq!(surface.layers().len(), 1);
        assert_eq!(surface.layer(LayerKind::Borders).unwrap().cloud.len(), 5);
    }

    #[test]
    fn rotated_points_keep_length() {
        let clock = ManualClock::starting_at(Duration::from_secs(7));
        let mut surface = Surface::new(clock);
        let cloud = vec![crate::geo::project(12.0, 34.0, 2.01)];
        surface.set_layer(Layer::new(
            LayerKind::Landmass,
            cloud,
            LayerMotion { yaw_rate: 0.3, pitch_rate: 0.2, wobble: None },
            3,
        ));
        surface.tick();
        let p = surface.layer(LayerKind::Landmass).unwrap().rotated().next().unwrap();
        assert!((p.length() - 2.01).abs() < 1e-9);
    }

    #[test]
    fn teardown_releases_exactly_once() {
        let released = Rc::new(Cell::new(0));
        {
            let mut surface = Surface::new(ManualClock::new());
            surface.set_layer(Layer::new(LayerKind::Landmass, dots(10), LayerMotion::STILL, 3));
            let counter = released.clone();
            surface.on_release(move || counter.set(counter.get() + 1));

            surface.teardown();
            surface.teardown();
            assert!(surface.is_torn_down());
            assert!(surface.layers().is_empty());
            assert!(!surface.set_layer(Layer::new(LayerKind::Glow, dots(1), LayerMotion::STILL, 1)));
            assert!(surface.layers().is_empty());
        }
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn drop_releases_when_never_torn_down() {
        let released = Rc::new(Cell::new(0));
        {
            let mut surface = Surface::new(ManualClock::new());
            let counter = released.clone();
            surface.on_release(move || counter.set(counter.get() + 1));
        }
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn teardown_before_async_load_completes() {
        let mut surface = Surface::new(ManualClock::new());
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut pending = surface.request("geometry", move |_| {
            let _ = gate_rx.recv();
            Ok(dots(100))
        });

        surface.teardown();
        let _ = gate_tx.send(());

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            match pending.poll() {
                LoadState::Waiting if std::time::Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5));
                }
                LoadState::Ready(cloud) => {
                    // Even if a result slipped through, the disposed surface refuses it.
                    assert!(!surface.set_layer(Layer::new(LayerKind::Landmass, cloud, LayerMotion::STILL, 3)));
                    break;
                }
                _ => break,
            }
        }
        assert!(surface.layers().is_empty());
        surface.tick();
    }
}
