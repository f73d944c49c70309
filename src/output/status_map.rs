use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use super::ensure_parent;
use crate::config::{StaticMapsConfig, StatusCodes, StatusFilter};
use crate::project::ProjectedWell;
use crate::render::{draw_markers, palette::parse_hex_color, Basemap, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColors {
    pub active: [u8; 3],
    pub other: [u8; 3],
}

impl StatusColors {
    pub fn from_config(cfg: &StaticMapsConfig) -> Result<Self> {
        let active = parse_hex_color(&cfg.active_color)
            .with_context(|| format!("static_maps.active_color {:?}", cfg.active_color))?;
        let other = parse_hex_color(&cfg.other_color)
            .with_context(|| format!("static_maps.other_color {:?}", cfg.other_color))?;
        Ok(Self { active, other })
    }
}

/// One still map of the wells selected by `filter`.
///
/// `combined` draws every non-active well first and the active wells on top
/// in their own color.
pub fn render_status_map(
    basemap: &Basemap,
    viewport: &Viewport,
    wells: &[ProjectedWell],
    filter: StatusFilter,
    codes: &StatusCodes,
    colors: StatusColors,
    radius: u32,
) -> Result<RgbImage> {
    let mut canvas = basemap.canvas();
    let is_active = |w: &&ProjectedWell| codes.is_active(&w.record.pod_status);
    let latlon = |w: &ProjectedWell| (w.lat, w.lon);

    match filter {
        StatusFilter::Combined => {
            let others = wells.iter().filter(|w| !is_active(w)).map(latlon);
            draw_markers(&mut canvas, viewport, others, colors.other, radius)?;
            let active = wells.iter().filter(is_active).map(latlon);
            draw_markers(&mut canvas, viewport, active, colors.active, radius)?;
        }
        StatusFilter::Active => {
            let active = wells.iter().filter(is_active).map(latlon);
            draw_markers(&mut canvas, viewport, active, colors.active, radius)?;
        }
        StatusFilter::Plugged | StatusFilter::NonActive => {
            let selected = wells
                .iter()
                .filter(|w| filter.matches(&w.record.pod_status, codes))
                .map(latlon);
            draw_markers(&mut canvas, viewport, selected, colors.other, radius)?;
        }
    }
    Ok(canvas)
}

/// Render and save `pods_<filter>.png` under `dir`.
#[allow(clippy::too_many_arguments)]
#[instrument(level = "info", skip_all, fields(filter = filter.as_str()))]
pub fn write_status_map(
    dir: &Path,
    basemap: &Basemap,
    viewport: &Viewport,
    wells: &[ProjectedWell],
    filter: StatusFilter,
    codes: &StatusCodes,
    colors: StatusColors,
    radius: u32,
) -> Result<PathBuf> {
    let path = dir.join(format!("pods_{}.png", filter.as_str()));
    ensure_parent(&path)?;
    let img = render_status_map(basemap, viewport, wells, filter, codes, colors, radius)?;
    img.save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote status map");
    Ok(path)
}
