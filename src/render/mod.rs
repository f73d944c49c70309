//! Everything that turns projected wells into pixels.

pub mod basemap;
pub mod callout;
pub mod fonts;
pub mod frames;
pub mod markers;
pub mod overlay;
pub mod palette;
pub mod viewport;

pub use basemap::Basemap;
pub use callout::Callout;
pub use frames::{Frame, FrameRenderer};
pub use markers::draw_markers;
pub use overlay::{composite_logo, draw_overlay, load_logo, OverlayStyle};
pub use palette::{GroupColors, PALETTE_REGISTRY};
pub use viewport::Viewport;

use anyhow::Result;
use image::RgbImage;
use plotters::{coord::Shift, prelude::*};

/// Run `draw` against a plotting surface backed by `canvas`.
pub(crate) fn draw_on<F>(canvas: &mut RgbImage, draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    let (w, h) = canvas.dimensions();
    let root = BitMapBackend::with_buffer(&mut **canvas, (w, h)).into_drawing_area();
    draw(&root)?;
    root.present()?;
    Ok(())
}
