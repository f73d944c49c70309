//! Web Mercator view onto the slippy-map tile grid.

use std::f64::consts::PI;

use crate::config::MapConfig;
use crate::fetch::TILE_SIZE;

/// Latitude where Web Mercator is clipped.
const MAX_LAT: f64 = 85.051_128_78;

/// A fixed center, zoom and pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    /// World-pixel coordinates of the top-left corner
    origin_x: f64,
    origin_y: f64,
}

/// World-pixel position of (lat, lon) at `zoom`.
pub fn world_pixel(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE as f64 * 2f64.powi(zoom as i32)
}

impl Viewport {
    pub fn new(center_lat: f64, center_lon: f64, zoom: u8, width: u32, height: u32) -> Self {
        let (cx, cy) = world_pixel(center_lat, center_lon, zoom);
        Self {
            zoom,
            width,
            height,
            origin_x: cx - width as f64 / 2.0,
            origin_y: cy - height as f64 / 2.0,
        }
    }

    pub fn from_config(map: &MapConfig) -> Self {
        Self::new(map.center_lat, map.center_lon, map.zoom, map.width, map.height)
    }

    /// Frame pixel for (lat, lon); may fall outside the frame.
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = world_pixel(lat, lon, self.zoom);
        (x - self.origin_x, y - self.origin_y)
    }

    /// Top-left corner in world pixels.
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    /// Inclusive tile index ranges `(x0..=x1, y0..=y1)` covering the frame.
    /// X indices may fall outside the grid and must be wrapped by the caller.
    pub fn tile_span(&self) -> ((i64, i64), (i64, i64)) {
        let t = TILE_SIZE as f64;
        let x0 = (self.origin_x / t).floor() as i64;
        let y0 = (self.origin_y / t).floor() as i64;
        let x1 = ((self.origin_x + self.width as f64 - 1.0) / t).floor() as i64;
        let y1 = ((self.origin_y + self.height as f64 - 1.0) / t).floor() as i64;
        ((x0, x1), (y0, y1))
    }

    /// Number of tiles along each axis at this zoom.
    pub fn grid_size(&self) -> i64 {
        1i64 << self.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_lands_mid_frame() {
        let vp = Viewport::new(34.5, -106.0, 7, 800, 800);
        let (x, y) = vp.project(34.5, -106.0);
        assert!((x - 400.0).abs() < 1e-6);
        assert!((y - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_orientation() {
        let vp = Viewport::new(34.5, -106.0, 7, 800, 800);
        let (ex, _) = vp.project(34.5, -105.0);
        let (_, ny) = vp.project(35.5, -106.0);
        assert!(ex > 400.0, "east should be right");
        assert!(ny < 400.0, "north should be up");
    }

    #[test]
    fn test_zoom_zero_world() {
        let (x, y) = world_pixel(0.0, 0.0, 0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);

        let vp = Viewport::new(0.0, 0.0, 0, 256, 256);
        assert_eq!(vp.tile_span(), ((0, 0), (0, 0)));
        assert_eq!(vp.grid_size(), 1);
    }

    #[test]
    fn test_tile_span_covers_frame() {
        let vp = Viewport::new(34.5, -106.0, 7, 800, 800);
        let ((x0, x1), (y0, y1)) = vp.tile_span();
        assert!((x1 - x0 + 1) * 256 >= 800);
        assert!((y1 - y0 + 1) * 256 >= 800);
        let (ox, oy) = vp.origin();
        assert!(x0 as f64 * 256.0 <= ox);
        assert!(y0 as f64 * 256.0 <= oy);
    }
}
