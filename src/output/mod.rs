//! Files the pipeline leaves behind.

pub mod animation;
pub mod chart;
pub mod points;
pub mod status_map;

pub use animation::write_animation;
pub use chart::draw_cumulative_chart;
pub use points::write_points;
pub use status_map::{render_status_map, write_status_map, StatusColors};

use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Make sure the directory `path` will be written into exists.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}
