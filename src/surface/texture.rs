//! Equirectangular texture used to mask the cloud shell

use crate::error::Result;
use crate::geo::GeoPoint;
use image::imageops::FilterType;
use image::GrayImage;

/// Working resolution; cloud maps are far larger than a terminal can show.
const MASK_WIDTH: u32 = 360;
const MASK_HEIGHT: u32 = 180;

/// Cloud coverage in [0, 1] per lat/lon, from luminance weighted by alpha.
pub struct CloudMask {
    coverage: GrayImage,
}

impl CloudMask {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        let rgba = image
            .resize_exact(MASK_WIDTH, MASK_HEIGHT, FilterType::Triangle)
            .to_rgba8();

        let coverage = GrayImage::from_fn(MASK_WIDTH, MASK_HEIGHT, |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let lum = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            image::Luma([(lum * a as f32 / 255.0).round() as u8])
        });

        Ok(Self { coverage })
    }

    /// Coverage at a point, nearest texel.
    pub fn sample(&self, at: GeoPoint) -> f32 {
        let (w, h) = self.coverage.dimensions();
        let u = ((at.lon + 180.0) / 360.0).rem_euclid(1.0);
        let v = ((90.0 - at.lat) / 180.0).clamp(0.0, 1.0);
        let x = ((u * w as f64) as u32).min(w - 1);
        let y = ((v * h as f64) as u32).min(h - 1);
        self.coverage.get_pixel(x, y).0[0] as f32 / 255.0
    }
}
