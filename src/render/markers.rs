use anyhow::Result;
use image::RgbImage;
use plotters::prelude::*;

use super::{draw_on, viewport::Viewport};

/// Draw a filled circle for every (lat, lon) and return how many landed on
/// the canvas.
pub fn draw_markers<I>(
    canvas: &mut RgbImage,
    viewport: &Viewport,
    points: I,
    rgb: [u8; 3],
    radius: u32,
) -> Result<usize>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let style = RGBColor(rgb[0], rgb[1], rgb[2]).filled();
    let r = radius as f64;
    let (w, h) = (canvas.width() as f64, canvas.height() as f64);
    let mut drawn = 0;

    draw_on(canvas, |area| {
        for (lat, lon) in points {
            let (x, y) = viewport.project(lat, lon);
            if x < -r || y < -r || x > w + r || y > h + r {
                continue;
            }
            area.draw(&Circle::new(
                (x.round() as i32, y.round() as i32),
                radius,
                style,
            ))?;
            drawn += 1;
        }
        Ok(())
    })?;

    Ok(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_markers_paint_at_projected_pixel() -> Result<()> {
        let vp = Viewport::new(34.5, -106.0, 7, 200, 200);
        let mut canvas = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));

        let drawn = draw_markers(
            &mut canvas,
            &vp,
            vec![(34.5, -106.0), (10.0, 10.0)],
            [200, 0, 0],
            3,
        )?;
        assert_eq!(drawn, 1, "off-screen point is skipped");
        assert_eq!(canvas.get_pixel(100, 100), &Rgb([200, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([255, 255, 255]));
        Ok(())
    }
}
