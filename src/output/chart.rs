use anyhow::{bail, Context, Result};
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::path::Path;
use tracing::{info, instrument};

use super::ensure_parent;
use crate::aggregate::Granularity;

pub const Y_AXIS_TITLE: &str = "Cumulative Number of PODs";

/// Line chart of the running total, one point per group.
#[instrument(level = "info", skip(series), fields(points = series.len(), path = %path.display()))]
pub fn draw_cumulative_chart(
    path: &Path,
    series: &[(i32, usize)],
    granularity: Granularity,
    size: (u32, u32),
) -> Result<()> {
    let (Some(&(x_min, _)), Some(&(x_max, _))) = (series.first(), series.last()) else {
        bail!("no data for chart {}", path.display());
    };
    ensure_parent(path)?;

    let pad = match granularity {
        Granularity::Year => 1,
        Granularity::Decade => 10,
    };
    let y_max = series.iter().map(|&(_, n)| n).max().unwrap_or(0);
    let y_top = (y_max + y_max / 20).max(1);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d((x_min - pad)..(x_max + pad), 0usize..y_top)?;

    chart
        .configure_mesh()
        .x_desc(granularity.axis_title())
        .y_desc(Y_AXIS_TITLE)
        .x_label_formatter(&|v| format!("{}", v))
        .label_style(FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal))
        .draw()?;

    chart.draw_series(LineSeries::new(
        series.iter().copied(),
        &RGBColor(31, 119, 180),
    ))?;

    root.present()
        .with_context(|| format!("writing chart {}", path.display()))?;
    info!("wrote chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fonts;

    #[test]
    fn test_empty_series_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = draw_cumulative_chart(
            &dir.path().join("c.png"),
            &[],
            Granularity::Decade,
            (400, 300),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn test_chart_png_written() -> Result<()> {
        // axis labels need a real font; skip on machines without one
        if !fonts::register_system_font() {
            return Ok(());
        }

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("charts").join("cumulative.png");
        draw_cumulative_chart(
            &path,
            &[(1950, 3), (1960, 10), (1970, 42)],
            Granularity::Decade,
            (400, 300),
        )?;

        let img = image::open(&path)?;
        assert_eq!((img.width(), img.height()), (400, 300));
        Ok(())
    }
}
