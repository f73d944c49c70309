use anyhow::{Context, Result};
use image::{RgbImage, RgbaImage};
use std::{fs, path::PathBuf};
use tracing::{debug, info, instrument};

use super::{
    basemap::Basemap,
    callout::Callout,
    markers::draw_markers,
    overlay::{composite_logo, draw_overlay, overlay_lines, OverlayStyle},
    palette::GroupColors,
    viewport::Viewport,
};
use crate::aggregate::{Granularity, RenderGroup};
use crate::project::ProjectedWell;

/// One rendered animation step.
#[derive(Debug, Clone)]
pub struct Frame {
    /// First year of the group this frame ends on
    pub label: i32,
    pub text: Vec<String>,
    pub image: RgbImage,
}

/// Draws groups in order onto a canvas that keeps every earlier marker, so
/// each frame shows all wells finished up to and including its group.
pub struct FrameRenderer {
    viewport: Viewport,
    canvas: RgbImage,
    colors: GroupColors,
    granularity: Granularity,
    marker_radius: u32,
    overlay: Option<OverlayStyle>,
    show_cumulative: bool,
    logo: Option<RgbaImage>,
    callouts: Vec<Callout>,
    frames_dir: Option<PathBuf>,
    first_key: Option<i32>,
}

impl FrameRenderer {
    pub fn new(
        basemap: &Basemap,
        viewport: Viewport,
        colors: GroupColors,
        granularity: Granularity,
        marker_radius: u32,
    ) -> Self {
        Self {
            viewport,
            canvas: basemap.canvas(),
            colors,
            granularity,
            marker_radius,
            overlay: None,
            show_cumulative: true,
            logo: None,
            callouts: Vec::new(),
            frames_dir: None,
            first_key: None,
        }
    }

    pub fn with_overlay(mut self, style: OverlayStyle, show_cumulative: bool) -> Self {
        self.overlay = Some(style);
        self.show_cumulative = show_cumulative;
        self
    }

    pub fn with_logo(mut self, logo: RgbaImage) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn with_callouts(mut self, callouts: Vec<Callout>) -> Self {
        self.callouts = callouts;
        self
    }

    /// Also write every frame as `frame_<label>.png` under `dir`.
    pub fn with_frames_dir(mut self, dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating frames dir {}", dir.display()))?;
        self.frames_dir = Some(dir);
        Ok(self)
    }

    pub fn render_group(&mut self, group: &RenderGroup<ProjectedWell>) -> Result<Frame> {
        let first_key = *self.first_key.get_or_insert(group.key);
        let label = self.granularity.label(group.key);
        let color = self.colors.color_for(group.position);

        let drawn = draw_markers(
            &mut self.canvas,
            &self.viewport,
            group.members.iter().map(|w| (w.lat, w.lon)),
            color,
            self.marker_radius,
        )?;
        debug!(label, members = group.count(), drawn, ?color, "drew group");

        let text = overlay_lines(
            self.granularity,
            first_key,
            group.key,
            group.cumulative,
            self.show_cumulative,
        );

        let mut image = self.canvas.clone();
        for callout in &self.callouts {
            callout.draw(&mut image, &self.viewport)?;
        }
        if let Some(style) = &self.overlay {
            draw_overlay(&mut image, &text, style)?;
        }
        if let Some(logo) = &self.logo {
            composite_logo(&mut image, logo);
        }

        if let Some(dir) = &self.frames_dir {
            let path = dir.join(format!("frame_{}.png", label));
            image
                .save(&path)
                .with_context(|| format!("writing frame {}", path.display()))?;
        }

        Ok(Frame { label, text, image })
    }

    #[instrument(level = "info", skip_all, fields(groups = groups.len()))]
    pub fn render_all(&mut self, groups: &[RenderGroup<ProjectedWell>]) -> Result<Vec<Frame>> {
        let frames = groups
            .iter()
            .map(|g| self.render_group(g))
            .collect::<Result<Vec<_>>>()?;
        info!(frames = frames.len(), "rendered frames");
        Ok(frames)
    }
}
