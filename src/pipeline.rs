//! One batch run from POD export to finished artifacts.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf, time::Instant};
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{cumulative_series, group_records};
use crate::config::Config;
use crate::fetch::tile_source_from_config;
use crate::output::{draw_cumulative_chart, write_animation, write_points, write_status_map, StatusColors};
use crate::process::load_pod_file;
use crate::project::{project_wells, ProjectionCache};
use crate::render::{fonts, load_logo, Basemap, Callout, FrameRenderer, GroupColors, OverlayStyle, Viewport};

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Rows that survived parsing and the year window
    pub records: usize,
    pub groups: usize,
    pub frames: usize,
    /// UTM zones seen
    pub zones: usize,
    pub outputs: Vec<PathBuf>,
}

#[instrument(level = "info", skip_all, fields(input = %cfg.input.display()))]
pub fn run(cfg: &Config) -> Result<RunSummary> {
    let started = Instant::now();
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output dir {}", cfg.output_dir.display()))?;

    if cfg.needs_font() {
        fonts::register_font(&cfg.overlay.font_path)?;
    }

    // ─── parse & filter ───────────────────────────────────────────────
    let mut records = load_pod_file(&cfg.input, &cfg.filter)?;
    let loaded = records.len();
    records.retain(|r| cfg.filter.year_in_range(r.finish_year()));
    info!(
        loaded,
        in_range = records.len(),
        min_year = cfg.filter.min_year,
        max_year = cfg.filter.max_year,
        "applied year window"
    );

    // ─── project ──────────────────────────────────────────────────────
    let mut cache = ProjectionCache::new();
    let wells = project_wells(records, &mut cache)?;
    let mut summary = RunSummary {
        records: wells.len(),
        zones: cache.len(),
        ..RunSummary::default()
    };

    if let Some(points) = &cfg.points {
        let path = cfg.output_path(&points.path);
        write_points(&path, &wells, points.filter, &cfg.status)?;
        summary.outputs.push(path);
    }

    // ─── maps ─────────────────────────────────────────────────────────
    let viewport = Viewport::from_config(&cfg.map);
    let wants_frames = cfg.animation.enabled || cfg.frames_dir.is_some();
    let basemap = if wants_frames || !cfg.static_maps.filters.is_empty() {
        let source = tile_source_from_config(&cfg.map.tiles)?;
        let basemap = Basemap::render(&viewport, source.as_ref())?;
        info!(tiles = basemap.tiles_drawn(), zoom = cfg.map.zoom, "basemap ready");
        Some(basemap)
    } else {
        None
    };

    if let Some(basemap) = &basemap {
        let colors = StatusColors::from_config(&cfg.static_maps)?;
        for &filter in &cfg.static_maps.filters {
            let path = write_status_map(
                &cfg.output_dir,
                basemap,
                &viewport,
                &wells,
                filter,
                &cfg.status,
                colors,
                cfg.map.marker_radius,
            )?;
            summary.outputs.push(path);
        }
    }

    // ─── group & chart ────────────────────────────────────────────────
    let groups = group_records(wells, cfg.granularity);
    let series = cumulative_series(&groups, cfg.granularity);
    for group in &groups {
        debug!(
            label = cfg.granularity.label(group.key),
            members = group.count(),
            cumulative = group.cumulative,
            "group"
        );
    }
    summary.groups = groups.len();

    if let Some(chart) = &cfg.chart {
        if series.is_empty() {
            warn!("no wells left; skipping chart");
        } else {
            let path = cfg.output_path(&chart.path);
            draw_cumulative_chart(&path, &series, cfg.granularity, (chart.width, chart.height))?;
            summary.outputs.push(path);
        }
    }

    // ─── frames & animation ───────────────────────────────────────────
    if let (true, Some(basemap)) = (wants_frames, &basemap) {
        let colors = GroupColors::from_scheme(&cfg.colors)?;
        let mut renderer = FrameRenderer::new(
            basemap,
            viewport,
            colors,
            cfg.granularity,
            cfg.map.marker_radius,
        );
        if cfg.overlay.enabled {
            renderer = renderer.with_overlay(
                OverlayStyle::from_config(&cfg.overlay)?,
                cfg.overlay.show_cumulative,
            );
        }
        if let Some(logo) = &cfg.logo {
            renderer = renderer.with_logo(load_logo(logo)?);
        }
        if !cfg.callouts.is_empty() {
            renderer = renderer.with_callouts(cfg.callouts.iter().map(Callout::from).collect());
        }
        if let Some(dir) = &cfg.frames_dir {
            renderer = renderer.with_frames_dir(cfg.output_path(dir))?;
        }

        let frames = renderer.render_all(&groups)?;
        summary.frames = frames.len();

        if cfg.animation.enabled {
            if frames.is_empty() {
                warn!("no frames rendered; skipping animation");
            } else {
                let path = cfg.animation_path();
                write_animation(&path, &frames, cfg.animation.frame_duration_ms)?;
                summary.outputs.push(path);
            }
        }
    }

    info!(
        records = summary.records,
        groups = summary.groups,
        frames = summary.frames,
        outputs = summary.outputs.len(),
        elapsed = ?started.elapsed(),
        "run complete"
    );
    Ok(summary)
}
