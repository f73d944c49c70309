use anyhow::{Context, Result};
use image::{imageops, DynamicImage, Rgba, RgbImage, RgbaImage};
use tracing::{debug, instrument};

use super::viewport::Viewport;
use crate::fetch::{TileSource, TILE_SIZE};

/// Background map for one viewport, stitched from tiles.
#[derive(Debug, Clone)]
pub struct Basemap {
    image: RgbImage,
    tiles: usize,
}

impl Basemap {
    /// Fetch every tile under `viewport` and paste it at its pixel offset.
    ///
    /// Columns wrap around the antimeridian; rows beyond the poles are left
    /// white.
    #[instrument(level = "info", skip_all, fields(zoom = viewport.zoom))]
    pub fn render(viewport: &Viewport, source: &dyn TileSource) -> Result<Self> {
        let mut canvas = RgbaImage::from_pixel(
            viewport.width,
            viewport.height,
            Rgba([255, 255, 255, 255]),
        );
        let ((x0, x1), (y0, y1)) = viewport.tile_span();
        let (ox, oy) = viewport.origin();
        let (ox, oy) = (ox.floor() as i64, oy.floor() as i64);
        let grid = viewport.grid_size();
        let size = TILE_SIZE as i64;

        let mut tiles = 0;
        for ty in y0..=y1 {
            if ty < 0 || ty >= grid {
                continue;
            }
            for tx in x0..=x1 {
                let wrapped = tx.rem_euclid(grid);
                let tile = source
                    .tile(viewport.zoom, wrapped as u32, ty as u32)
                    .with_context(|| {
                        format!("tile z={} x={} y={}", viewport.zoom, wrapped, ty)
                    })?;
                imageops::overlay(&mut canvas, &tile, tx * size - ox, ty * size - oy);
                tiles += 1;
            }
        }
        debug!(tiles, "stitched basemap");

        Ok(Self {
            image: DynamicImage::ImageRgba8(canvas).into_rgb8(),
            tiles,
        })
    }

    /// A fresh copy to draw on.
    pub fn canvas(&self) -> RgbImage {
        self.image.clone()
    }

    pub fn tiles_drawn(&self) -> usize {
        self.tiles
    }
}
