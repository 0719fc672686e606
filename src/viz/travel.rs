//! Travel globe: visited cities, country borders with visited countries
//! filled in, a cloud shell and the travel stats panel.
//!
//! The globe geometry is generated off the frame loop; until it arrives the
//! view shows a loading placeholder. Borders and clouds are fetched
//! best-effort and simply left out when they cannot be loaded.

use super::{build_help, poll_slot, skip_asset, sync_size, VizState};
use crate::colors::scheme_color;
use crate::config::{PrintFrame, ViewConfig};
use crate::error::Result;
use crate::geo::geojson::{parse_countries, CountryShape};
use crate::geo::outlines::{City, TravelStats, CITIES, CONTINENTS, TRAVEL_VIEW_CENTER};
use crate::geo::sampler::{
    angular_distance, bounding_box, contains, fill_polygon, interpolate_outline, shell_grid, wireframe_sphere,
};
use crate::geo::{facing_pitch, facing_yaw, project_point, GeoPoint, PointCloud, Vector3};
use crate::help::{render_panel, Anchor};
use crate::render::{BrailleCanvas, Camera};
use crate::settings::TravelSettings;
use crate::surface::assets::{load_bytes, CancelToken, Pending};
use crate::surface::clock::{Clock, ManualClock, PausableClock};
use crate::surface::texture::CloudMask;
use crate::surface::{Layer, LayerKind, LayerMotion, Surface};
use crate::terminal::Terminal;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};
use std::time::Duration;
use tracing::info;

const GLOBE_RADIUS: f64 = 2.0;
const BORDER_RADIUS: f64 = 2.02;
const CITY_RADIUS: f64 = 2.04;
const CLOUD_RADIUS: f64 = 2.04;
const BORDER_STEPS: usize = 3;
/// Cloud coverage above which a grid dot is drawn
const CLOUD_THRESHOLD: f32 = 0.5;
/// A city is labelled when the view center is this close (degrees)
const CITY_LABEL_RANGE: f64 = 3.0;
const STATS_BAR_WIDTH: usize = 20;

const HELP: &str = "\
←→↑↓   Rotate (or h/j/k/l)
+/-    Zoom in/out
n/p    Next/prev city
r      Reset view";

/// Point of view: the geographic point facing the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub center: GeoPoint,
}

impl View {
    pub fn new(center: GeoPoint) -> Self {
        Self { center }
    }

    /// World point after turning the globe so `center` faces the camera.
    pub fn apply(&self, p: Vector3) -> Vector3 {
        p.rotate_y(facing_yaw(self.center.lon))
            .rotate_x(facing_pitch(self.center.lat))
    }

    pub fn pan(&mut self, dlat: f64, dlon: f64) {
        self.center.lat = (self.center.lat + dlat).clamp(-85.0, 85.0);
        self.center.lon = (self.center.lon + dlon + 180.0).rem_euclid(360.0) - 180.0;
    }
}

/// Static travel-globe geometry, built off the frame loop.
pub struct TravelGeometry {
    pub graticule: PointCloud,
    pub landmass: PointCloud,
    pub cities: PointCloud,
}

pub fn build_geometry(token: &CancelToken) -> Result<TravelGeometry> {
    let graticule = wireframe_sphere(GLOBE_RADIUS, 12, 180);
    token.check()?;
    let landmass = CONTINENTS
        .iter()
        .flat_map(|outline| interpolate_outline(outline, 8, GLOBE_RADIUS))
        .collect();
    let cities = CITIES
        .iter()
        .map(|city| project_point(city.location, CITY_RADIUS))
        .collect();
    Ok(TravelGeometry { graticule, landmass, cities })
}

/// Country borders plus the fill dots of visited countries.
pub struct CountryOverlay {
    pub shapes: Vec<CountryShape>,
    pub borders: PointCloud,
    pub visited: PointCloud,
}

/// Fill density follows the ring's lat/lon extent.
fn fill_count(ring: &[GeoPoint]) -> usize {
    bounding_box(ring)
        .map(|(lo, hi)| ((hi.lat - lo.lat) * (hi.lon - lo.lon) * 0.5).clamp(12.0, 1500.0) as usize)
        .unwrap_or(0)
}

pub fn build_overlay<R: Rng + ?Sized>(shapes: Vec<CountryShape>, rng: &mut R) -> CountryOverlay {
    let mut borders = Vec::new();
    let mut visited = Vec::new();
    for shape in &shapes {
        for ring in &shape.rings {
            borders.extend(interpolate_outline(ring, BORDER_STEPS, BORDER_RADIUS));
            if shape.visited {
                visited.extend(fill_polygon(ring, fill_count(ring), BORDER_RADIUS, rng));
            }
        }
    }
    CountryOverlay { shapes, borders, visited }
}

/// Dots of the cloud shell where the texture is cloudy.
pub fn cloud_points(mask: &CloudMask) -> PointCloud {
    shell_grid(CLOUD_RADIUS, 90, 180)
        .into_iter()
        .filter(|(at, _)| mask.sample(*at) > CLOUD_THRESHOLD)
        .map(|(_, p)| p)
        .collect()
}

fn load_countries(url: String, seed: u64) -> impl FnOnce(&CancelToken) -> Result<CountryOverlay> + Send + 'static {
    move |token| {
        let bytes = load_bytes(&url, token)?;
        let shapes = parse_countries(&bytes)?;
        token.check()?;
        Ok(build_overlay(shapes, &mut StdRng::seed_from_u64(seed)))
    }
}

fn load_clouds(url: String) -> impl FnOnce(&CancelToken) -> Result<CloudMask> + Send + 'static {
    move |token| CloudMask::decode(&load_bytes(&url, token)?)
}

fn country_at(countries: &[CountryShape], at: GeoPoint) -> Option<&CountryShape> {
    countries
        .iter()
        .find(|c| c.rings.iter().any(|ring| contains(ring, at)))
}

pub struct TravelGlobe<C: Clock> {
    surface: Surface<C>,
    camera: Camera,
    canvas: BrailleCanvas,
    pub view: View,
    countries: Vec<CountryShape>,
    focus: Option<usize>,
    geometry: Option<Pending<TravelGeometry>>,
    overlay: Option<Pending<CountryOverlay>>,
    clouds: Option<Pending<CloudMask>>,
    loaded: bool,
}

impl<C: Clock> TravelGlobe<C> {
    pub fn new(clock: C, cols: u16, rows: u16) -> Self {
        Self {
            surface: Surface::new(clock),
            camera: Camera::default(),
            canvas: BrailleCanvas::for_cells(cols, rows),
            view: View::new(TRAVEL_VIEW_CENTER),
            countries: Vec::new(),
            focus: None,
            geometry: None,
            overlay: None,
            clouds: None,
            loaded: false,
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

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    /// Loads requested but not yet resolved.
    #[cfg(test)]
    pub fn pending_loads(&self) -> usize {
        [self.geometry.is_some(), self.overlay.is_some(), self.clouds.is_some()]
            .iter()
            .filter(|&&p| p)
            .count()
    }

    pub fn request_geometry(&mut self) {
        self.geometry = Some(self.surface.request("globe geometry", build_geometry));
    }

    pub fn request_overlays(&mut self, settings: &TravelSettings, seed: u64) {
        if let Some(url) = settings.countries_url.clone() {
            self.overlay = Some(self.surface.request("country borders", load_countries(url, seed)));
        }
        if let Some(url) = settings.clouds_url.clone() {
            self.clouds = Some(self.surface.request("cloud texture", load_clouds(url)));
        }
    }

    /// Run the overlay loads on the calling thread (print mode).
    pub fn load_overlays_now(&mut self, settings: &TravelSettings, seed: u64) {
        let token = self.surface.token();
        if let Some(url) = settings.countries_url.clone() {
            match load_countries(url, seed)(&token) {
                Ok(overlay) => self.apply_overlay(overlay),
                Err(e) => skip_asset("country borders", &e),
            }
        }
        if let Some(url) = settings.clouds_url.clone() {
            match load_clouds(url)(&token) {
                Ok(mask) => self.apply_clouds(mask),
                Err(e) => skip_asset("cloud texture", &e),
            }
        }
    }

    pub fn apply_geometry(&mut self, geometry: TravelGeometry) {
        let still = LayerMotion::STILL;
        self.surface
            .set_layer(Layer::new(LayerKind::Wireframe, geometry.graticule, still, 1).culled());
        self.surface
            .set_layer(Layer::new(LayerKind::Landmass, geometry.landmass, still, 2).culled());
        self.loaded = self
            .surface
            .set_layer(Layer::new(LayerKind::Cities, geometry.cities, still, 4).culled());
    }

    pub fn apply_overlay(&mut self, overlay: CountryOverlay) {
        info!(
            countries = overlay.shapes.len(),
            border_points = overlay.borders.len(),
            "country borders loaded"
        );
        let still = LayerMotion::STILL;
        self.surface
            .set_layer(Layer::new(LayerKind::Borders, overlay.borders, still, 1).culled());
        if self
            .surface
            .set_layer(Layer::new(LayerKind::VisitedFill, overlay.visited, still, 3).culled())
        {
            self.countries = overlay.shapes;
        }
    }

    pub fn apply_clouds(&mut self, mask: CloudMask) {
        let points = cloud_points(&mask);
        info!(points = points.len(), "cloud shell loaded");
        self.surface
            .set_layer(Layer::new(LayerKind::Clouds, points, LayerMotion::STILL, 1).culled());
        self.surface.set_cloud_mask(mask);
    }

    /// Apply whatever background loads finished since the last frame.
    pub fn poll(&mut self) {
        if let Some(geometry) = poll_slot(&mut self.geometry) {
            self.apply_geometry(geometry);
        }
        if let Some(overlay) = poll_slot(&mut self.overlay) {
            self.apply_overlay(overlay);
        }
        if let Some(mask) = poll_slot(&mut self.clouds) {
            self.apply_clouds(mask);
        }
    }

    /// Country under the view center.
    pub fn hovered(&self) -> Option<&CountryShape> {
        country_at(&self.countries, self.view.center)
    }

    pub fn nearest_city(&self) -> Option<&'static City> {
        let range = CITY_LABEL_RANGE.to_radians();
        CITIES
            .iter()
            .map(|city| (city, angular_distance(city.location, self.view.center)))
            .filter(|&(_, d)| d <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(city, _)| city)
    }

    pub fn label(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(city) = self.nearest_city() {
            lines.push(city.name.to_string());
        }
        if let Some(shape) = self.hovered() {
            if shape.visited {
                lines.push(format!("{} ✓ Visited", shape.name));
            } else {
                lines.push(shape.name.clone());
            }
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    pub fn focus_step(&mut self, forward: bool) {
        let n = CITIES.len();
        let next = match (self.focus, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.focus = Some(next);
        self.view.center = CITIES[next].location;
    }

    pub fn zoom(&mut self, factor: f64) {
        self.camera.zoom = (self.camera.zoom * factor).clamp(0.5, 3.0);
    }

    pub fn reset_view(&mut self) {
        self.view = View::new(TRAVEL_VIEW_CENTER);
        self.camera.zoom = 1.0;
        self.focus = None;
    }

    /// View controls. Returns true if the key was used.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let step = 5.0 / self.camera.zoom;
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.view.pan(0.0, -step),
            KeyCode::Right | KeyCode::Char('l') => self.view.pan(0.0, step),
            KeyCode::Up | KeyCode::Char('k') => self.view.pan(step, 0.0),
            KeyCode::Down | KeyCode::Char('j') => self.view.pan(-step, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(1.2),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(1.0 / 1.2),
            KeyCode::Char('n') => self.focus_step(true),
            KeyCode::Char('p') => self.focus_step(false),
            KeyCode::Char('r') => self.reset_view(),
            _ => return false,
        }
        true
    }

    pub fn render(&mut self, term: &mut Terminal, scheme: u8) {
        self.surface.tick();
        term.clear();

        if !self.loaded {
            render_panel(term, Anchor::Center, "Loading globe...", Color::DarkGrey, Color::Grey);
            return;
        }

        self.canvas.clear();
        let view = self.view;
        let (dots_w, dots_h) = self.canvas.dims();
        for layer in self.surface.layers() {
            for p in layer.rotated() {
                let q = view.apply(p);
                if layer.kind == LayerKind::Cities {
                    if !self.camera.faces(q) {
                        continue;
                    }
                    if let Some((x, y)) = self.camera.project(q, dots_w, dots_h) {
                        self.canvas.blob(x, y, 1, layer.intensity);
                    }
                } else {
                    self.canvas.plot_world(&self.camera, q, layer.intensity, layer.cull_back);
                }
            }
        }

        if let Some(shape) = country_at(&self.countries, view.center) {
            for ring in &shape.rings {
                for p in interpolate_outline(ring, BORDER_STEPS, BORDER_RADIUS) {
                    self.canvas.plot_world(&self.camera, view.apply(p), 4, true);
                }
            }
        }

        self.canvas.draw(term, scheme);
        self.draw_panels(term, scheme);
    }

    fn draw_panels(&self, term: &mut Terminal, scheme: u8) {
        let (accent, _) = scheme_color(scheme, 2, false);
        let stats = TravelStats::current();
        let fill = stats.bar_fill(STATS_BAR_WIDTH);
        let text = format!(
            "Travel Stats\n\nCountries {:>10}\n{}{}\n{}% explored",
            format!("{} / {}", stats.visited, stats.total),
            "█".repeat(fill),
            "░".repeat(STATS_BAR_WIDTH - fill),
            stats.percent,
        );
        render_panel(term, Anchor::TopLeft, &text, Color::DarkGrey, accent);
        let legend = match self.surface.cloud_mask() {
            Some(_) => "● Visited\n░ Clouds",
            None => "● Visited",
        };
        render_panel(term, Anchor::TopRight, legend, Color::DarkGrey, accent);

        if let Some(label) = self.label() {
            render_panel(term, Anchor::BottomLeft, &label, Color::DarkGrey, Color::White);
        }

        let hint = "arrows rotate · +/- zoom · ? help";
        let (w, h) = term.size();
        let x = w as i32 - hint.chars().count() as i32 - 1;
        term.set_str(x, h as i32 - 1, hint, Some(Color::DarkGrey), false);
    }
}

/// Run the travel globe
pub fn run(term: &mut Terminal, config: &ViewConfig, settings: &TravelSettings) -> io::Result<()> {
    let scheme = config.color_scheme.unwrap_or(settings.color_scheme);
    let mut state = VizState::new(config.time_step, scheme, build_help("TRAVEL GLOBE", HELP));
    let mut rng = config.rng();

    let (w, h) = term.size();
    let mut globe = TravelGlobe::new(PausableClock::new(), w, h);
    globe.surface_mut().on_release(|| info!("travel globe released"));
    globe.request_geometry();
    if config.offline {
        info!("offline: skipping borders and clouds");
    } else {
        globe.request_overlays(settings, rng.gen());
    }

    // speed 1.0 turns the globe 6° per second
    let spin = settings.auto_rotate.then_some(settings.auto_rotate_speed * 6.0);
    let mut last = Duration::ZERO;

    loop {
        if sync_size(term)? {
            let (w, h) = term.size();
            globe.resize(w, h);
        }

        if let Some((code, mods)) = term.check_key()? {
            if state.handle_key(code, mods) {
                break;
            }
            globe.handle_key(code);
        }
        globe.surface_mut().clock_mut().set_paused(state.paused);
        globe.poll();

        let now = globe.surface().clock().elapsed();
        if let Some(deg_per_sec) = spin {
            globe.view.pan(0.0, -deg_per_sec * now.saturating_sub(last).as_secs_f64());
        }
        last = now;

        globe.render(term, state.color_scheme());
        state.render_help(term);
        term.present()?;
        term.sleep(state.speed);
    }

    globe.surface_mut().teardown();
    Ok(())
}

/// Render a single frame with overlays loaded synchronously.
pub fn print<W: Write>(out: &mut W, config: &ViewConfig, settings: &TravelSettings, frame: PrintFrame) -> io::Result<()> {
    let mut term = Terminal::headless(frame.width, frame.height);
    let mut globe = TravelGlobe::new(ManualClock::starting_at(frame.elapsed()), frame.width, frame.height);

    match build_geometry(&globe.surface().token()) {
        Ok(geometry) => globe.apply_geometry(geometry),
        Err(e) => skip_asset("globe geometry", &e),
    }
    if !config.offline {
        let seed = config.rng().gen();
        globe.load_overlays_now(settings, seed);
    }

    globe.render(&mut term, config.color_scheme.unwrap_or(settings.color_scheme));
    term.write_ansi(out)
}
