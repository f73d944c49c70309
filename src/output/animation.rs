use anyhow::{bail, Context, Result};
use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, DynamicImage, Frame as GifFrame,
};
use std::{fs::File, io::BufWriter, path::Path};
use tracing::{info, instrument};

use super::ensure_parent;
use crate::render::Frame;

/// Encode `frames` as a looping GIF, `duration_ms` per frame.
#[instrument(level = "info", skip(frames), fields(frames = frames.len(), path = %path.display()))]
pub fn write_animation(path: &Path, frames: &[Frame], duration_ms: u32) -> Result<()> {
    if frames.is_empty() {
        bail!("no frames to write to {}", path.display());
    }
    ensure_parent(path)?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder
        .set_repeat(Repeat::Infinite)
        .context("setting GIF loop")?;

    let delay = Delay::from_numer_denom_ms(duration_ms, 1);
    for frame in frames {
        let rgba = DynamicImage::ImageRgb8(frame.image.clone()).into_rgba8();
        encoder
            .encode_frame(GifFrame::from_parts(rgba, 0, 0, delay))
            .with_context(|| format!("encoding frame {} into {}", frame.label, path.display()))?;
    }

    info!("wrote animation");
    Ok(())
}
