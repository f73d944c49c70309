use anyhow::{Context, Result};
use image::{RgbImage, RgbaImage};
use plotters::prelude::*;
use std::path::Path;

use super::{draw_on, fonts, palette::parse_hex_color};
use crate::aggregate::Granularity;
use crate::config::OverlayConfig;

/// Pixels between the logo and the frame edge.
const LOGO_MARGIN: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub font_size: f64,
    /// Baseline of the first line is this far below the top edge
    pub top_offset: i32,
    pub line_spacing: i32,
    pub color: [u8; 3],
}

impl OverlayStyle {
    pub fn from_config(cfg: &OverlayConfig) -> Result<Self> {
        let color = parse_hex_color(&cfg.color)
            .with_context(|| format!("overlay color {:?}", cfg.color))?;
        Ok(Self {
            font_size: cfg.font_size as f64,
            top_offset: cfg.top_offset,
            line_spacing: cfg.line_spacing,
            color,
        })
    }
}

/// Text for one frame: the period covered so far, then the running total.
pub fn overlay_lines(
    granularity: Granularity,
    first_key: i32,
    key: i32,
    cumulative: usize,
    show_cumulative: bool,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{}-{}",
        granularity.label(first_key),
        granularity.last_year(key)
    )];
    if show_cumulative {
        lines.push(format!("Cumulative PODs: {:>6}", cumulative));
    }
    lines
}

/// Draw `lines` horizontally centered, stacked down from the top offset.
pub fn draw_overlay(canvas: &mut RgbImage, lines: &[String], style: &OverlayStyle) -> Result<()> {
    let text = fonts::text_style(style.font_size, style.color)?;
    let width = canvas.width() as i32;

    draw_on(canvas, |area| {
        let mut y = style.top_offset;
        for line in lines {
            let (tw, th) = area.estimate_text_size(line, &text)?;
            let x = (width - tw as i32) / 2;
            area.draw(&Text::new(line.clone(), (x, y), text.clone()))?;
            y += th as i32 + style.line_spacing;
        }
        Ok(())
    })
}

pub fn load_logo(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("opening logo {}", path.display()))?;
    Ok(img.into_rgba8())
}

/// Alpha-blend `logo` into the bottom-right corner of `frame`.
///
/// A logo larger than the frame is clipped at the top-left.
pub fn composite_logo(frame: &mut RgbImage, logo: &RgbaImage) {
    let (fw, fh) = frame.dimensions();
    let (lw, lh) = logo.dimensions();
    let left = fw as i64 - lw as i64 - LOGO_MARGIN as i64;
    let top = fh as i64 - lh as i64 - LOGO_MARGIN as i64;

    for (lx, ly, px) in logo.enumerate_pixels() {
        let (x, y) = (left + lx as i64, top + ly as i64);
        if x < 0 || y < 0 || x >= fw as i64 || y >= fh as i64 {
            continue;
        }
        let alpha = px[3] as u32;
        if alpha == 0 {
            continue;
        }
        let dst = frame.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let blended = (px[c] as u32 * alpha + dst[c] as u32 * (255 - alpha) + 127) / 255;
            dst[c] = blended as u8;
        }
    }
}
