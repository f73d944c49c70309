use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use reqwest::blocking::Client;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use url::Url;

use crate::config::{TileKind, TilesConfig};
use crate::render::palette::parse_hex_color;

/// Edge length of a slippy-map tile, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Something that can hand out basemap tiles by slippy-map address.
pub trait TileSource {
    fn tile(&self, z: u8, x: u32, y: u32) -> Result<RgbaImage>;
}

/// Tiles fetched over HTTP, optionally mirrored into a local directory.
pub struct HttpTileSource {
    client: Client,
    url_template: String,
    cache_dir: Option<PathBuf>,
}

impl HttpTileSource {
    pub fn new(
        url_template: impl Into<String>,
        user_agent: &str,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("building HTTP client for tiles")?;
        Ok(Self {
            client,
            url_template: url_template.into(),
            cache_dir,
        })
    }

    /// Fill `{z}`, `{x}`, `{y}` in the template.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> Result<Url> {
        let s = self
            .url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string());
        Url::parse(&s).with_context(|| format!("parsing tile URL {}", s))
    }

    fn cache_path(&self, z: u8, x: u32, y: u32) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| {
            dir.join(z.to_string())
                .join(x.to_string())
                .join(format!("{}.png", y))
        })
    }

    fn download(&self, url: &Url, dest: Option<&Path>) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url.as_str())
            .send()
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {}", url))?;
        let bytes = resp
            .bytes()
            .with_context(|| format!("reading body from {}", url))?
            .to_vec();

        if let Some(dest) = dest {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(dest, &bytes)
                .with_context(|| format!("caching tile at {}", dest.display()))?;
        }
        Ok(bytes)
    }
}

impl TileSource for HttpTileSource {
    fn tile(&self, z: u8, x: u32, y: u32) -> Result<RgbaImage> {
        let cached = self.cache_path(z, x, y);
        if let Some(path) = cached.as_deref().filter(|p| p.exists()) {
            debug!(z, x, y, "tile cache hit");
            let bytes =
                fs::read(path).with_context(|| format!("reading cached tile {}", path.display()))?;
            return decode_tile(&bytes).with_context(|| format!("decoding {}", path.display()));
        }

        let url = self.tile_url(z, x, y)?;
        debug!(%url, "downloading tile");
        let bytes = self.download(&url, cached.as_deref())?;
        decode_tile(&bytes).with_context(|| format!("decoding tile from {}", url))
    }
}

fn decode_tile(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// A flat background; lets every output render without network access.
pub struct BlankTileSource {
    color: Rgba<u8>,
}

impl BlankTileSource {
    pub fn new(rgb: [u8; 3]) -> Self {
        Self {
            color: Rgba([rgb[0], rgb[1], rgb[2], 255]),
        }
    }
}

impl TileSource for BlankTileSource {
    fn tile(&self, _z: u8, _x: u32, _y: u32) -> Result<RgbaImage> {
        Ok(RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, self.color))
    }
}

pub fn tile_source_from_config(cfg: &TilesConfig) -> Result<Box<dyn TileSource>> {
    match cfg.kind {
        TileKind::Http => {
            info!(template = %cfg.url_template, cache = ?cfg.cache_dir, "using HTTP tiles");
            Ok(Box::new(HttpTileSource::new(
                cfg.url_template.clone(),
                &cfg.user_agent,
                cfg.cache_dir.clone(),
            )?))
        }
        TileKind::Blank => {
            let rgb = parse_hex_color(&cfg.blank_color)
                .with_context(|| format!("map.tiles.blank_color {:?}", cfg.blank_color))?;
            info!("using blank tiles");
            Ok(Box::new(BlankTileSource::new(rgb)))
        }
    }
}
