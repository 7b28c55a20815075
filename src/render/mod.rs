//! Render the skew-T log-P diagram and the hodograph as SVG files.
//!
//! Drawing is done with `plotters`. Errors from the backend are collected into a boxed error
//! while drawing and converted to `SoundingError::Render` at the public functions.
use crate::error::SoundingError;
use plotters::{
    coord::{cartesian::Cartesian2d, types::RangedCoordf64},
    prelude::*,
};
use std::path::Path;

mod hodograph;
mod skewt;

pub use self::{hodograph::render_hodograph, skewt::render_skewt};

/// Figure sizes are given in inches.
pub const PIXELS_PER_INCH: f64 = 100.0;

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

type Chart<'a, 'b> =
    ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const PINK: RGBColor = RGBColor(255, 105, 180);
const LIGHT_BLUE: RGBColor = RGBColor(135, 206, 235);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const DARK_GREEN: RGBColor = RGBColor(0, 100, 0);
const DARK_BLUE: RGBColor = RGBColor(0, 0, 139);
const ORANGE: RGBColor = RGBColor(255, 140, 0);
const GREY: RGBColor = RGBColor(160, 160, 160);

/// Size of a figure in pixels.
pub fn figure_pixels(figsize: (f64, f64)) -> (u32, u32) {
    let to_px = |inches: f64| (inches * PIXELS_PER_INCH).round().max(1.0) as u32;
    (to_px(figsize.0), to_px(figsize.1))
}

fn render_error(path: &Path, err: Box<dyn std::error::Error>) -> SoundingError {
    SoundingError::Render {
        path: path.to_owned(),
        message: err.to_string(),
    }
}

/// Draw a line clipped to the chart, adding it to the legend if it has a label.
fn draw_line(
    chart: &mut Chart,
    points: Vec<(f64, f64)>,
    bounds: Bounds,
    style: ShapeStyle,
    label: Option<&str>,
) -> DrawResult<()> {
    for (i, run) in clip_polyline(&points, bounds).into_iter().enumerate() {
        let anno = chart.draw_series(LineSeries::new(run, style))?;

        // Only label once for the legend.
        if let (0, Some(label)) = (i, label) {
            anno.label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    Ok(())
}

/// A rectangle in chart coordinates, `(x_min, x_max, y_min, y_max)`.
type Bounds = (f64, f64, f64, f64);

/// Clip a polyline to a rectangle.
///
/// Each segment is clipped on its own (Liang-Barsky), and the visible parts are joined back
/// into runs. Points with non-finite coordinates break the line.
pub(crate) fn clip_polyline(points: &[(f64, f64)], bounds: Bounds) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], bounds) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(start);
                }
                current.push(end);
            }
            None => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }

    if current.len() > 1 {
        runs.push(current);
    }

    runs
}

fn clip_segment(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    (x_min, x_max, y_min, y_max): Bounds,
) -> Option<((f64, f64), (f64, f64))> {
    if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
        return None;
    }

    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    for &(p, q) in &[
        (-dx, x0 - x_min),
        (dx, x_max - x0),
        (-dy, y0 - y_min),
        (dy, y_max - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }

    if t0 > t1 {
        return None;
    }

    let at = |t: f64| {
        if t == 0.0 {
            (x0, y0)
        } else if t == 1.0 {
            (x1, y1)
        } else {
            (x0 + t * dx, y0 + t * dy)
        }
    };

    Some((at(t0), at(t1)))
}
