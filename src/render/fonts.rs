//! Text rendering needs a TrueType font registered with the plotting
//! backend before the first string is drawn. It is registered once per
//! process under the `sans-serif` family.

use anyhow::{anyhow, ensure, Context, Result};
use once_cell::sync::OnceCell;
use plotters::style::{FontDesc, FontFamily, FontStyle, RGBColor, TextStyle};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

static REGISTERED: OnceCell<PathBuf> = OnceCell::new();

pub fn register_font(path: &Path) -> Result<()> {
    let registered = REGISTERED.get_or_try_init(|| -> Result<PathBuf> {
        // the backend keeps a reference for the life of the process
        let bytes: &'static [u8] = Box::leak(read_font(path)?.into_boxed_slice());
        plotters::style::register_font(FontFamily::SansSerif.as_str(), FontStyle::Normal, bytes)
            .map_err(|_| anyhow!("{} is not a usable TrueType font", path.display()))?;
        info!(font = %path.display(), "registered font");
        Ok(path.to_path_buf())
    })?;

    if registered != path {
        warn!(
            requested = %path.display(),
            active = %registered.display(),
            "font already registered; keeping the first one"
        );
    }
    Ok(())
}

fn read_font(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    ensure!(!bytes.is_empty(), "font {} is empty", path.display());
    Ok(bytes)
}

pub fn is_registered() -> bool {
    REGISTERED.get().is_some()
}

/// Text style in the registered family; fails if no font was registered.
pub fn text_style(size: f64, rgb: [u8; 3]) -> Result<TextStyle<'static>> {
    ensure!(is_registered(), "drawing text needs a font; none registered");
    Ok(FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
        .color(&RGBColor(rgb[0], rgb[1], rgb[2])))
}

#[cfg(test)]
pub(crate) const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// Register the system font for a test; false on machines without it.
#[cfg(test)]
pub(crate) fn register_system_font() -> bool {
    let path = Path::new(SYSTEM_FONT);
    path.exists() && register_font(path).is_ok()
}
