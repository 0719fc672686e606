//! Perspective camera and braille dot canvas

use crate::colors::dot_color;
use crate::geo::Vector3;
use crate::terminal::Terminal;

/// Pinhole camera on the +Z axis looking at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub distance: f64,
    pub fov_deg: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            distance: 7.0,
            fov_deg: 45.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Dot coordinates for a world point, or None when behind the camera.
    pub fn project(&self, p: Vector3, dots_w: usize, dots_h: usize) -> Option<(i32, i32)> {
        let depth = self.distance - p.z;
        if depth <= 0.1 {
            return None;
        }
        let focal = (dots_h as f64 / 2.0) / (self.fov_deg.to_radians() / 2.0).tan() * self.zoom;
        let sx = dots_w as f64 / 2.0 + p.x * focal / depth;
        let sy = dots_h as f64 / 2.0 - p.y * focal / depth;
        Some((sx.floor() as i32, sy.floor() as i32))
    }

    /// True when a point on a sphere around the origin faces the camera.
    pub fn faces(&self, p: Vector3) -> bool {
        let len2 = p.x * p.x + p.y * p.y + p.z * p.z;
        p.z * self.distance >= len2
    }
}

const DOT_BITS: [(usize, usize, u32); 8] = [
    (0, 0, 0x01), (1, 0, 0x02), (2, 0, 0x04),
    (0, 1, 0x08), (1, 1, 0x10), (2, 1, 0x20),
    (3, 0, 0x40), (3, 1, 0x80),
];

/// 2x4 dots per terminal cell; each dot stores the brightest level drawn on it.
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    dots: Vec<u8>,
}

impl BrailleCanvas {
    pub fn for_cells(cols: u16, rows: u16) -> Self {
        let width = cols as usize * 2;
        let height = rows as usize * 4;
        Self {
            width,
            height,
            dots: vec![0; width * height],
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.dots.fill(0);
    }

    pub fn plot(&mut self, x: i32, y: i32, level: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let cell = &mut self.dots[y as usize * self.width + x as usize];
        *cell = (*cell).max(level);
    }

    /// Filled diamond of the given radius (in dots).
    pub fn blob(&mut self, x: i32, y: i32, radius: i32, level: u8) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() + dy.abs() <= radius {
                    self.plot(x + dx, y + dy, level);
                }
            }
        }
    }

    /// Project and plot a point; returns whether it landed on the canvas.
    pub fn plot_world(&mut self, camera: &Camera, p: Vector3, level: u8, cull_back: bool) -> bool {
        if cull_back && !camera.faces(p) {
            return false;
        }
        match camera.project(p, self.width, self.height) {
            Some((x, y)) if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height => {
                self.plot(x, y, level);
                true
            }
            _ => false,
        }
    }

    /// Braille glyph and brightest level for a cell, if any dot is set.
    pub fn cell(&self, cx: usize, cy: usize) -> Option<(char, u8)> {
        let (bx, by) = (cx * 2, cy * 4);
        if bx + 1 >= self.width || by + 3 >= self.height {
            return None;
        }
        let mut bits: u32 = 0;
        let mut level = 0;
        for &(dy, dx, bit) in &DOT_BITS {
            let v = self.dots[(by + dy) * self.width + bx + dx];
            if v > 0 {
                bits |= bit;
                level = level.max(v);
            }
        }
        if bits == 0 {
            return None;
        }
        char::from_u32(0x2800 + bits).map(|ch| (ch, level))
    }

    pub fn draw(&self, term: &mut Terminal, scheme: u8) {
        let (cols, rows) = (self.width / 2, self.height / 4);
        for cy in 0..rows {
            for cx in 0..cols {
                if let Some((ch, level)) = self.cell(cx, cy) {
                    let (color, bold) = dot_color(scheme, level);
                    term.set(cx as i32, cy as i32, ch, Some(color), bold);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_encoding() {
        let mut canvas = BrailleCanvas::for_cells(2, 1);
        canvas.plot(0, 0, 1);
        assert_eq!(canvas.cell(0, 0), Some(('⠁', 1)));
        canvas.plot(1, 3, 3);
        assert_eq!(canvas.cell(0, 0), Some(('⢁', 3)));
        assert_eq!(canvas.cell(1, 0), None);

        canvas.clear();
        for y in 0..4 {
            canvas.plot(2, y, 2);
            canvas.plot(3, y, 2);
        }
        assert_eq!(canvas.cell(1, 0), Some(('⣿', 2)));
    }

    #[test]
    fn plot_clips_and_keeps_brightest() {
        let mut canvas = BrailleCanvas::for_cells(1, 1);
        canvas.plot(-1, 0, 4);
        canvas.plot(2, 0, 4);
        canvas.plot(0, 4, 4);
        assert_eq!(canvas.cell(0, 0), None);
        canvas.plot(0, 0, 3);
        canvas.plot(0, 0, 1);
        assert_eq!(canvas.cell(0, 0), Some(('⠁', 3)));
    }

    #[test]
    fn camera_centre_and_axes() {
        let cam = Camera::default();
        assert_eq!(cam.project(Vector3::new(0.0, 0.0, 0.0), 100, 80), Some((50, 40)));
        let (rx, _) = cam.project(Vector3::new(1.0, 0.0, 0.0), 100, 80).unwrap();
        let (_, uy) = cam.project(Vector3::new(0.0, 1.0, 0.0), 100, 80).unwrap();
        assert!(rx > 50);
        assert!(uy < 40);
        assert!(cam.project(Vector3::new(0.0, 0.0, 7.5), 100, 80).is_none());
    }

    #[test]
    fn globe_fits_the_canvas() {
        let cam = Camera::default();
        let (_, top) = cam.project(Vector3::new(0.0, 2.0, 0.0), 160, 96).unwrap();
        let (_, bottom) = cam.project(Vector3::new(0.0, -2.0, 0.0), 160, 96).unwrap();
        assert!(top > 0 && bottom < 96);
    }

    #[test]
    fn back_face_test() {
        let cam = Camera::default();
        assert!(cam.faces(Vector3::new(0.0, 0.0, 2.0)));
        assert!(!cam.faces(Vector3::new(0.0, 0.0, -2.0)));
        assert!(!cam.faces(Vector3::new(2.0, 0.0, 0.0)));
    }
}
