//! Decorative hero scene: wireframe globe, glow shell, continent dots,
//! particle field and a neural-network scatter, each spinning at its own rate.

use super::{build_help, sync_size, VizState};
use crate::config::{PrintFrame, ViewConfig};
use crate::geo::outlines::CONTINENTS;
use crate::geo::sampler::{cube_scatter, landmass_cloud, particle_shell, wireframe_sphere, SamplerConfig};
use crate::render::{BrailleCanvas, Camera};
use crate::settings::SceneSettings;
use crate::surface::clock::{Clock, ManualClock, PausableClock};
use crate::surface::{Layer, LayerKind, LayerMotion, Surface, Wobble};
use crate::terminal::Terminal;
use rand::Rng;
use std::io::{self, Write};
use tracing::info;

const GLOBE_RADIUS: f64 = 2.0;
const GLOBE_SEGMENTS: usize = 64;
const GLOW_RADIUS: f64 = 2.1;
const GLOW_SEGMENTS: usize = 32;
const PARTICLE_INNER: f64 = 2.5;
const PARTICLE_DEPTH: f64 = 2.0;
const NEURAL_SIDE: f64 = 8.0;

/// Build every hero-scene layer.
pub fn build_layers<R: Rng + ?Sized>(settings: &SceneSettings, rng: &mut R) -> Vec<Layer> {
    let rates = &settings.rates;
    let sampler = SamplerConfig {
        steps: settings.steps,
        fill_count: settings.fill_count,
        ..SamplerConfig::default()
    };

    vec![
        Layer::new(
            LayerKind::Wireframe,
            wireframe_sphere(GLOBE_RADIUS, GLOBE_SEGMENTS, 192),
            LayerMotion::spin(rates.globe),
            1,
        )
        .culled(),
        Layer::new(
            LayerKind::Glow,
            wireframe_sphere(GLOW_RADIUS, GLOW_SEGMENTS, 96),
            LayerMotion {
                yaw_rate: rates.glow,
                pitch_rate: 0.0,
                wobble: Some(Wobble { amplitude: rates.glow_wobble, frequency: 0.2 }),
            },
            1,
        ),
        Layer::new(
            LayerKind::Landmass,
            landmass_cloud(&CONTINENTS, &sampler, rng),
            LayerMotion::spin(rates.landmass),
            3,
        )
        .culled(),
        Layer::new(
            LayerKind::Particles,
            particle_shell(settings.particles, PARTICLE_INNER, PARTICLE_DEPTH, rng),
            LayerMotion {
                yaw_rate: rates.particles_yaw,
                pitch_rate: rates.particles_pitch,
                wobble: None,
            },
            2,
        ),
        Layer::new(
            LayerKind::Neural,
            cube_scatter(settings.neural_points, NEURAL_SIDE, rng),
            LayerMotion::spin(rates.neural),
            2,
        ),
    ]
}

pub struct HeroScene<C: Clock> {
    surface: Surface<C>,
    camera: Camera,
    canvas: BrailleCanvas,
}

impl<C: Clock> HeroScene<C> {
    pub fn new<R: Rng + ?Sized>(clock: C, settings: &SceneSettings, rng: &mut R, cols: u16, rows: u16) -> Self {
        let mut surface = Surface::new(clock);
        for layer in build_layers(settings, rng) {
            surface.set_layer(layer);
        }
        Self {
            surface,
            camera: Camera::default(),
            canvas: BrailleCanvas::for_cells(cols, rows),
        }
    }

    pub fn surface(&self) -> &Surface<C> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<C> {
        &mut self.surface
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas = BrailleCanvas::for_cells(cols, rows);
    }

    /// Advance the surface clock and draw one frame into the terminal buffer.
    pub fn render(&mut self, term: &mut Terminal, scheme: u8) {
        self.surface.tick();
        self.canvas.clear();
        for layer in self.surface.layers() {
            for p in layer.rotated() {
                self.canvas.plot_world(&self.camera, p, layer.intensity, layer.cull_back);
            }
        }
        term.clear();
        self.canvas.draw(term, scheme);
    }
}

/// Run the hero scene
pub fn run(term: &mut Terminal, config: &ViewConfig, settings: &SceneSettings) -> io::Result<()> {
    let scheme = config.color_scheme.unwrap_or(settings.color_scheme);
    let mut state = VizState::new(config.time_step, scheme, build_help("HERO SCENE", ""));
    let mut rng = config.rng();

    let (w, h) = term.size();
    let mut scene = HeroScene::new(PausableClock::new(), settings, &mut rng, w, h);
    let points: usize = scene.surface().layers().iter().map(|l| l.cloud.len()).sum();
    info!(points, "hero scene ready");
    scene.surface_mut().on_release(|| info!("hero scene released"));

    loop {
        if sync_size(term)? {
            let (w, h) = term.size();
            scene.resize(w, h);
        }

        if let Some((code, mods)) = term.check_key()? {
            if state.handle_key(code, mods) {
                break;
            }
        }
        scene.surface_mut().clock_mut().set_paused(state.paused);

        scene.render(term, state.color_scheme());
        state.render_help(term);
        term.present()?;
        term.sleep(state.speed);
    }

    scene.surface_mut().teardown();
    Ok(())
}

/// Render a single frame at `frame.at` seconds and write it as ANSI text.
pub fn print<W: Write>(out: &mut W, config: &ViewConfig, settings: &SceneSettings, frame: PrintFrame) -> io::Result<()> {
    let mut term = Terminal::headless(frame.width, frame.height);
    let mut rng = config.rng();
    let clock = ManualClock::starting_at(frame.elapsed());
    let mut scene = HeroScene::new(clock, settings, &mut rng, frame.width, frame.height);
    scene.render(&mut term, config.color_scheme.unwrap_or(settings.color_scheme));
    term.write_ansi(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn small_settings() -> SceneSettings {
        SceneSettings {
            particles: 200,
            neural_points: 50,
            ..SceneSettings::default()
        }
    }

    #[test]
    fn layers_use_scene_rates() {
        let layers = build_layers(&SceneSettings::default(), &mut StdRng::seed_from_u64(1));
        let find = |kind| layers.iter().find(|l| l.kind == kind).unwrap();

        assert_eq!(find(LayerKind::Wireframe).motion, LayerMotion::spin(0.05));
        assert_eq!(find(LayerKind::Landmass).motion, LayerMotion::spin(0.05));
        assert_eq!(find(LayerKind::Neural).motion, LayerMotion::spin(0.03));
        let particles = find(LayerKind::Particles);
        assert_eq!((particles.motion.yaw_rate, particles.motion.pitch_rate), (0.02, 0.01));
        assert_eq!(particles.cloud.len(), 2000);
        assert_eq!(find(LayerKind::Neural).cloud.len(), 500);
        let glow = find(LayerKind::Glow).motion;
        assert_eq!(glow.wobble, Some(Wobble { amplitude: 0.1, frequency: 0.2 }));
    }

    #[test]
    fn landmass_sits_just_above_the_globe() {
        let layers = build_layers(&small_settings(), &mut StdRng::seed_from_u64(2));
        let land = layers.iter().find(|l| l.kind == LayerKind::Landmass).unwrap();
        assert!(!land.cloud.is_empty());
        assert!(land.cloud.iter().all(|p| (p.length() - 2.01).abs() < 1e-9));
    }

    #[test]
    fn frame_draws_and_moves_with_time() {
        let clock = ManualClock::new();
        let mut term = Terminal::headless(60, 30);
        let mut scene = HeroScene::new(clock.clone(), &small_settings(), &mut StdRng::seed_from_u64(3), 60, 30);

        scene.render(&mut term, 0);
        let first: Vec<String> = (0..30).map(|y| term.row_text(y)).collect();
        assert!(first.iter().any(|row| row.chars().any(|c| ('\u{2801}'..='\u{28ff}').contains(&c))));

        clock.set(Duration::from_secs(30));
        scene.render(&mut term, 0);
        let later: Vec<String> = (0..30).map(|y| term.row_text(y)).collect();
        assert_ne!(first, later);
    }

    #[test]
    fn print_is_reproducible_with_seed() {
        let config = ViewConfig { time_step: 0.03, seed: Some(9), color_scheme: None, offline: true };
        let frame = PrintFrame { width: 40, height: 20, at: 12.0 };
        let mut a = Vec::new();
        let mut b = Vec::new();
        print(&mut a, &config, &small_settings(), frame).unwrap();
        print(&mut b, &config, &small_settings(), frame).unwrap();
        assert_eq!(a, b);
        assert_eq!(String::from_utf8(a).unwrap().lines().count(), 20);
    }
}
