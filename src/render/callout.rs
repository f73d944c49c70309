//! Speech-bubble labels pinned to a map position.

use anyhow::Result;
use image::RgbImage;
use plotters::prelude::*;

use super::{draw_on, fonts, viewport::Viewport};
use crate::config::CalloutConfig;

const MARGIN: i32 = 4;
const ARROW: i32 = 16;
const FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub lat: f64,
    pub lon: f64,
    pub text: String,
}

impl From<&CalloutConfig> for Callout {
    fn from(cfg: &CalloutConfig) -> Self {
        Self {
            lat: cfg.lat,
            lon: cfg.lon,
            text: cfg.text.clone(),
        }
    }
}

/// Outline of a bubble whose arrow tip sits at (x, y), sized for a
/// `tw` x `th` text box.
pub fn bubble_path(x: i32, y: i32, tw: i32, th: i32) -> Vec<(i32, i32)> {
    let w = ARROW.max(tw + 2 * MARGIN);
    let h = th + 2 * MARGIN;
    vec![
        (x, y),
        (x + ARROW / 2, y - ARROW),
        (x + w / 2, y - ARROW),
        (x + w / 2, y - ARROW - h),
        (x - w / 2, y - ARROW - h),
        (x - w / 2, y - ARROW),
        (x - ARROW / 2, y - ARROW),
    ]
}

impl Callout {
    pub fn draw(&self, canvas: &mut RgbImage, viewport: &Viewport) -> Result<()> {
        let (px, py) = viewport.project(self.lat, self.lon);
        let (x, y) = (px.round() as i32, py.round() as i32);
        let text = fonts::text_style(FONT_SIZE, [0, 0, 0])?;

        draw_on(canvas, |area| {
            let (tw, th) = area.estimate_text_size(&self.text, &text)?;
            let (tw, th) = (tw as i32, th as i32);
            let path = bubble_path(x, y, tw, th);
            let h = th + 2 * MARGIN;

            let mut outline = path.clone();
            outline.push((x, y));
            area.draw(&Polygon::new(path, WHITE.filled()))?;
            area.draw(&PathElement::new(outline, RED))?;
            area.draw(&Text::new(
                self.text.clone(),
                (x - tw / 2, y - ARROW - h / 2 - th / 2),
                text.clone(),
            ))?;
            Ok(())
        })
    }
}
