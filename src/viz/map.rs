//! Tilted local map around the home district
//!
//! Only available when a maps API key is configured; otherwise the view is a
//! static message and nothing is loaded.

use super::{build_help, poll_slot, skip_asset, sync_size, VizState};
use crate::colors::scheme_color;
use crate::config::{MapConfig, PrintFrame, ViewConfig, API_KEY_VAR, MAP_ID_VAR};
use crate::error::Result;
use crate::geo::geojson::{parse_countries, CountryShape};
use crate::geo::outlines::{TravelStats, CITIES, HOME_DISTRICT, MAP_CENTER};
use crate::geo::sampler::{bounding_box, contains};
use crate::geo::{GeoPoint, Outline, PointCloud, Vector3};
use crate::help::{render_panel, Anchor};
use crate::render::{BrailleCanvas, Camera};
use crate::settings::TravelSettings;
use crate::surface::assets::{load_bytes, CancelToken, Pending};
use crate::surface::clock::{Clock, ManualClock, PausableClock};
use crate::surface::{Layer, LayerKind, LayerMotion, Surface};
use crate::terminal::Terminal;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};
use tracing::{info, warn};

/// World-space width of the visible ground span
const PLANE_WIDTH: f64 = 6.0;
const GRID_LINES: usize = 8;
const FILL_GRID: usize = 48;
const DISTRICT_FILL: usize = 400;

const HELP: &str = "\
←→↑↓   Pan (or h/j/k/l)
+/-    Zoom in/out
t/T    Tilt more/less
r      Reset view";

pub fn missing_key_message() -> String {
    format!(
        "Map view unavailable\n\nSet {API_KEY_VAR} (and optionally\n{MAP_ID_VAR}) to enable the 3D map view."
    )
}

/// Ground-plane camera: zoom level, tilt and heading like a web map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f64,
    pub tilt_deg: f64,
    pub heading_deg: f64,
}

impl MapView {
    /// Pin close-up when a pin is set, otherwise the city overview.
    pub fn for_pin(pin: Option<GeoPoint>) -> Self {
        match pin {
            Some(pin) => Self {
                center: pin,
                zoom: 18.0,
                tilt_deg: 67.5,
                heading_deg: 20.0,
            },
            None => Self {
                center: MAP_CENTER,
                zoom: 12.0,
                tilt_deg: 45.0,
                heading_deg: 0.0,
            },
        }
    }

    /// Longitude span (degrees) across the ground plane.
    pub fn span(&self) -> f64 {
        360.0 / 2f64.powf(self.zoom) * 4.0
    }

    pub fn is_visible(&self, at: GeoPoint) -> bool {
        let span = self.span();
        let dlon = (at.lon - self.center.lon) * self.center.lat.to_radians().cos();
        (at.lat - self.center.lat).abs() <= span && dlon.abs() <= span
    }

    /// Lat/lon window worth loading data for.
    pub fn window(&self) -> (GeoPoint, GeoPoint) {
        let span = self.span();
        let lon_span = span / self.center.lat.to_radians().cos().max(0.01);
        (
            GeoPoint::new(self.center.lat - span, self.center.lon - lon_span),
            GeoPoint::new(self.center.lat + span, self.center.lon + lon_span),
        )
    }

    /// Ground point in world space. North recedes from the camera as tilt grows.
    pub fn to_world(&self, at: GeoPoint) -> Vector3 {
        let k = PLANE_WIDTH / self.span();
        let x = (at.lon - self.center.lon) * self.center.lat.to_radians().cos() * k;
        let y = (at.lat - self.center.lat) * k;
        let (s, c) = (-self.heading_deg.to_radians()).sin_cos();
        Vector3::new(x * c - y * s, x * s + y * c, 0.0).rotate_x(-self.tilt_deg.to_radians())
    }

    pub fn pan(&mut self, north: f64, east: f64) {
        let step = self.span() * 0.1;
        self.center.lat = (self.center.lat + north * step).clamp(-85.0, 85.0);
        self.center.lon += east * step / self.center.lat.to_radians().cos().max(0.01);
    }
}

/// Samples along each segment, spaced to the current zoom.
fn densify(ring: &[GeoPoint], spacing: f64) -> Vec<GeoPoint> {
    ring.windows(2)
        .flat_map(|pair| {
            let len = (pair[1].lat - pair[0].lat).hypot(pair[1].lon - pair[0].lon);
            let steps = ((len / spacing).ceil() as usize).clamp(1, 4000);
            (0..=steps).map(move |j| pair[0].lerp(pair[1], j as f64 / steps as f64))
        })
        .collect()
}

fn overlaps(ring: &[GeoPoint], window: (GeoPoint, GeoPoint)) -> bool {
    let (lo, hi) = window;
    bounding_box(ring).is_some_and(|(rlo, rhi)| {
        rlo.lat <= hi.lat && rhi.lat >= lo.lat && rlo.lon <= hi.lon && rhi.lon >= lo.lon
    })
}

fn load_country_shapes(url: String) -> impl FnOnce(&CancelToken) -> Result<Vec<CountryShape>> + Send + 'static {
    move |token| parse_countries(&load_bytes(&url, token)?)
}

pub struct LocalMap<C: Clock> {
    surface: Surface<C>,
    camera: Camera,
    canvas: BrailleCanvas,
    pub view: MapView,
    home: MapView,
    pin: Option<GeoPoint>,
    map_id: String,
    countries: Vec<CountryShape>,
    overlay: Option<Pending<Vec<CountryShape>>>,
    seed: u64,
}

impl<C: Clock> LocalMap<C> {
    pub fn new(clock: C, config: &MapConfig, seed: u64, cols: u16, rows: u16) -> Self {
        let home = MapView::for_pin(config.pin);
        let mut map = Self {
            surface: Surface::new(clock),
            camera: Camera::default(),
            canvas: BrailleCanvas::for_cells(cols, rows),
            view: home,
            home,
            pin: config.pin,
            map_id: config.map_id.clone(),
            countries: Vec::new(),
            overlay: None,
            seed,
        };
        map.rebuild();
        map
    }

    #[cfg(test)]
    pub fn surface(&self) -> &Surface<C> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<C> {
        &mut self.surface
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas = BrailleCanvas::for_cells(cols, rows);
    }

    pub fn request_borders(&mut self, url: String) {
        self.overlay = Some(self.surface.request("country borders", load_country_shapes(url)));
    }

    pub fn load_borders_now(&mut self, url: String) {
        match load_country_shapes(url)(&self.surface.token()) {
            Ok(shapes) => self.apply_countries(shapes),
            Err(e) => skip_asset("country borders", &e),
        }
    }

    pub fn poll(&mut self) {
        if let Some(shapes) = poll_slot(&mut self.overlay) {
            self.apply_countries(shapes);
        }
    }

    pub fn apply_countries(&mut self, shapes: Vec<CountryShape>) {
        info!(countries = shapes.len(), "map borders loaded");
        self.countries = shapes;
        self.rebuild();
    }

    /// Re-project every layer for the current view.
    pub fn rebuild(&mut self) {
        let view = self.view;
        let still = LayerMotion::STILL;
        let world = |points: &mut dyn Iterator<Item = GeoPoint>| -> PointCloud {
            points.filter(|p| view.is_visible(*p)).map(|p| view.to_world(p)).collect()
        };
        let spacing = view.span() / 150.0;
        let window = view.window();

        let (lo, hi) = window;
        let mut grid = Vec::new();
        for i in 0..=GRID_LINES {
            let f = i as f64 / GRID_LINES as f64;
            let lat = lo.lat + (hi.lat - lo.lat) * f;
            let lon = lo.lon + (hi.lon - lo.lon) * f;
            grid.extend(densify(&[GeoPoint::new(lat, lo.lon), GeoPoint::new(lat, hi.lon)], spacing * 2.0));
            grid.extend(densify(&[GeoPoint::new(lo.lat, lon), GeoPoint::new(hi.lat, lon)], spacing * 2.0));
        }

        let mut district: Outline = HOME_DISTRICT.to_vec();
        if let Some(&first) = district.first() {
            district.push(first);
        }
        let mut district_dots = densify(&district, spacing);
        let mut rng = StdRng::seed_from_u64(self.seed);
        if let Some((dlo, dhi)) = bounding_box(&district) {
            let mut attempts = 0;
            let mut filled = 0;
            while filled < DISTRICT_FILL && attempts < DISTRICT_FILL * 20 {
                attempts += 1;
                let at = GeoPoint::new(
                    rng.gen_range(dlo.lat..=dhi.lat),
                    rng.gen_range(dlo.lon..=dhi.lon),
                );
                if contains(&district, at) {
                    district_dots.push(at);
                    filled += 1;
                }
            }
        }

        let mut borders = Vec::new();
        let visited_rings: Vec<&[GeoPoint]> = self
            .countries
            .iter()
            .filter(|c| c.visited)
            .flat_map(|c| c.rings.iter().map(|r| r.as_slice()))
            .filter(|r| overlaps(r, window))
            .collect();
        for shape in &self.countries {
            for ring in shape.rings.iter().filter(|r| overlaps(r, window)) {
                borders.extend(densify(ring, spacing));
            }
        }
        let mut visited = Vec::new();
        if !visited_rings.is_empty() {
            for i in 0..FILL_GRID {
                for k in 0..FILL_GRID {
                    let at = GeoPoint::new(
                        lo.lat + (hi.lat - lo.lat) * (i as f64 + 0.5) / FILL_GRID as f64,
                        lo.lon + (hi.lon - lo.lon) * (k as f64 + 0.5) / FILL_GRID as f64,
                    );
                    if visited_rings.iter().any(|r| contains(r, at)) {
                        visited.push(at);
                    }
                }
            }
        }

        let cities: Vec<GeoPoint> = CITIES.iter().map(|c| c.location).collect();

        let layers = [
            (LayerKind::Wireframe, world(&mut grid.into_iter()), 1),
            (LayerKind::VisitedFill, world(&mut visited.into_iter()), 1),
            (LayerKind::Borders, world(&mut borders.into_iter()), 2),
            (LayerKind::District, world(&mut district_dots.into_iter()), 3),
            (LayerKind::Cities, world(&mut cities.into_iter()), 4),
            (LayerKind::Pin, world(&mut self.pin.into_iter()), 4),
        ];
        for (kind, cloud, level) in layers {
            self.surface.set_layer(Layer::new(kind, cloud, still, level));
        }
    }

    /// View controls. Returns true if the key was used.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.view.pan(0.0, -1.0),
            KeyCode::Right | KeyCode::Char('l') => self.view.pan(0.0, 1.0),
            KeyCode::Up | KeyCode::Char('k') => self.view.pan(1.0, 0.0),
            KeyCode::Down | KeyCode::Char('j') => self.view.pan(-1.0, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.view.zoom = (self.view.zoom + 1.0).min(20.0),
            KeyCode::Char('-') | KeyCode::Char('_') => self.view.zoom = (self.view.zoom - 1.0).max(3.0),
            KeyCode::Char('t') => self.view.tilt_deg = (self.view.tilt_deg + 5.0).min(67.5),
            KeyCode::Char('T') => self.view.tilt_deg = (self.view.tilt_deg - 5.0).max(0.0),
            KeyCode::Char('r') => self.view = self.home,
            _ => return false,
        }
        self.rebuild();
        true
    }

    pub fn render(&mut self, term: &mut Terminal, scheme: u8) {
        self.surface.tick();
        self.canvas.clear();
        let (dots_w, dots_h) = self.canvas.dims();
        for layer in self.surface.layers() {
            let radius = match layer.kind {
                LayerKind::Pin => 2,
                LayerKind::Cities => 1,
                _ => 0,
            };
            for p in layer.rotated() {
                if let Some((x, y)) = self.camera.project(p, dots_w, dots_h) {
                    self.canvas.blob(x, y, radius, layer.intensity);
                }
            }
        }
        term.clear();
        self.canvas.draw(term, scheme);

        let (accent, _) = scheme_color(scheme, 2, false);
        let stats = TravelStats::current();
        let text = format!("Travel Stats (3D)\n\nVisited: {} / {}", stats.visited, stats.total);
        render_panel(term, Anchor::TopLeft, &text, Color::DarkGrey, accent);

        let status = format!(
            "{} · zoom {} · tilt {}°",
            self.map_id, self.view.zoom, self.view.tilt_deg
        );
        let (w, h) = term.size();
        let x = w as i32 - status.chars().count() as i32 - 1;
        term.set_str(x, h as i32 - 1, &status, Some(Color::DarkGrey), false);
    }
}

/// Static message shown instead of the map.
pub fn render_unavailable(term: &mut Terminal) {
    term.clear();
    render_panel(term, Anchor::Center, &missing_key_message(), Color::DarkGrey, Color::White);
}

/// Run the map view
pub fn run(term: &mut Terminal, config: &ViewConfig, map: Option<&MapConfig>, settings: &TravelSettings) -> io::Result<()> {
    let scheme = config.color_scheme.unwrap_or(settings.color_scheme);
    let mut state = VizState::new(config.time_step, scheme, build_help("MAP VIEW", HELP));

    let Some(map_config) = map else {
        warn!("{API_KEY_VAR} is missing; the map view cannot load");
        loop {
            if sync_size(term)? {
                term.clear();
            }
            if let Some((code, mods)) = term.check_key()? {
                if state.handle_key(code, mods) {
                    break;
                }
            }
            render_unavailable(term);
            state.render_help(term);
            term.present()?;
            term.sleep(0.1);
        }
        return Ok(());
    };

    info!(map_id = %map_config.map_id, pin = map_config.pin.is_some(), "map view starting");
    let (w, h) = term.size();
    let mut local = LocalMap::new(PausableClock::new(), map_config, config.rng().gen(), w, h);
    local.surface_mut().on_release(|| info!("map view released"));
    if !config.offline {
        if let Some(url) = settings.countries_url.clone() {
            local.request_borders(url);
        }
    }

    loop {
        if sync_size(term)? {
            let (w, h) = term.size();
            local.resize(w, h);
        }
        if let Some((code, mods)) = term.check_key()? {
            if state.handle_key(code, mods) {
                break;
            }
            local.handle_key(code);
        }
        local.surface_mut().clock_mut().set_paused(state.paused);
        local.poll();

        local.render(term, state.color_scheme());
        state.render_help(term);
        term.present()?;
        term.sleep(state.speed);
    }

    local.surface_mut().teardown();
    Ok(())
}

/// Render a single frame of the map view (or its message) as ANSI text.
pub fn print<W: Write>(
    out: &mut W,
    config: &ViewConfig,
    map: Option<&MapConfig>,
    settings: &TravelSettings,
    frame: PrintFrame,
) -> io::Result<()> {
    let mut term = Terminal::headless(frame.width, frame.height);
    match map {
        None => render_unavailable(&mut term),
        Some(map_config) => {
            let clock = ManualClock::starting_at(frame.elapsed());
            let mut local = LocalMap::new(clock, map_config, config.rng().gen(), frame.width, frame.height);
            if !config.offline {
                if let Some(url) = settings.countries_url.clone() {
                    local.load_borders_now(url);
                }
            }
            local.render(&mut term, config.color_scheme.unwrap_or(settings.color_scheme));
        }
    }
    term.write_ansi(out)
}
