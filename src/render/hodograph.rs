//! The hodograph.
use super::{draw_line, figure_pixels, render_error, Bounds, Chart, DrawResult, GREY};
use crate::{config::HodographConfig, error::Result, units::UnitTaggedSeries};
use itertools::{izip, Itertools};
use log::{debug, info};
use metfor::{Knots, Quantity, WindUV};
use plotters::prelude::*;
use std::path::Path;

/// Number of points along each range ring.
const RING_POINTS: usize = 181;
/// Hue of the lowest level, the highest level is at 0.0.
const HUE_RANGE: f64 = 0.75;

/// Draw the hodograph of the (subsampled) wind profile.
///
/// The trace is colored by geopotential height when the series has it, otherwise by the order of
/// the samples.
pub fn render_hodograph<P: AsRef<Path>>(
    path: P,
    wind: &UnitTaggedSeries,
    config: &HodographConfig,
) -> Result<()> {
    let path = path.as_ref();

    let winds = wind.wind()?;
    let heights: Vec<f64> = match wind.height() {
        Ok(heights) => heights.into_iter().map(Quantity::unpack).collect(),
        Err(_) => {
            debug!("No geopotential height, coloring the hodograph by sample order");
            (0..winds.len()).map(|i| i as f64).collect()
        }
    };

    draw_hodograph(path, &winds, &heights, config).map_err(|err| render_error(path, err))?;

    info!("Hodograph written to {}", path.display());
    Ok(())
}

fn draw_hodograph(
    path: &Path,
    winds: &[WindUV<Knots>],
    heights: &[f64],
    config: &HodographConfig,
) -> DrawResult<()> {
    let (width, height) = figure_pixels(config.figsize);
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let range = if config.component_range.is_finite() && config.component_range.abs() > 0.0 {
        config.component_range.abs()
    } else {
        1.0
    };
    let bounds: Bounds = (-range, range, -range, range);

    let mut chart = ChartBuilder::on(&root)
        .caption("Hodograph", ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(-range..range, -range..range)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("u (kt)")
        .y_desc("v (kt)")
        .draw()?;

    draw_rings(&mut chart, bounds, config.grid_increment)?;

    // Axes through the origin.
    let axis_style = ShapeStyle::from(&BLACK.mix(0.6)).stroke_width(1);
    draw_line(&mut chart, vec![(-range, 0.0), (range, 0.0)], bounds, axis_style, None)?;
    draw_line(&mut chart, vec![(0.0, -range), (0.0, range)], bounds, axis_style, None)?;

    draw_trace(&mut chart, winds, heights, bounds)?;

    root.present()?;
    Ok(())
}

/// Range rings every `increment` knots, out to the corners of the chart.
fn draw_rings(chart: &mut Chart, bounds: Bounds, increment: f64) -> DrawResult<()> {
    let style = ShapeStyle::from(&GREY).stroke_width(1);

    for radius in ring_radii(bounds.1, increment) {
        draw_line(chart, ring(radius), bounds, style, None)?;

        // Label along the upper right diagonal while it is on the chart.
        let (x, y) = (
            radius * std::f64::consts::FRAC_1_SQRT_2,
            radius * std::f64::consts::FRAC_1_SQRT_2,
        );
        if x < bounds.1 && y < bounds.3 {
            chart.draw_series(std::iter::once(Text::new(
                format!("{} kt", radius),
                (x, y),
                ("sans-serif", 10).into_font().color(&GREY),
            )))?;
        }
    }

    Ok(())
}

/// Radii of the range rings that are at least partly visible in a chart spanning
/// `[-range, range]` on both axes.
fn ring_radii(range: f64, increment: f64) -> Vec<f64> {
    if !(increment.is_finite() && increment > 0.0) {
        debug!("Invalid range ring increment {}, skipping the rings", increment);
        return vec![];
    }

    let max_radius = range * std::f64::consts::SQRT_2;
    (1..)
        .map(|i: u32| f64::from(i) * increment)
        .take_while(|&radius| radius < max_radius)
        .collect()
}

fn ring(radius: f64) -> Vec<(f64, f64)> {
    (0..RING_POINTS)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / (RING_POINTS - 1) as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// The wind trace, one segment per pair of consecutive samples.
fn draw_trace(
    chart: &mut Chart,
    winds: &[WindUV<Knots>],
    heights: &[f64],
    bounds: Bounds,
) -> DrawResult<()> {
    let (h_min, h_max) = heights
        .iter()
        .copied()
        .filter(|h| h.is_finite())
        .fold((std::f64::INFINITY, std::f64::NEG_INFINITY), |(lo, hi), h| {
            (lo.min(h), hi.max(h))
        });

    for ((w0, h0), (w1, h1)) in izip!(winds, heights).tuple_windows() {
        let color = height_color((h0 + h1) / 2.0, h_min, h_max);
        let style = ShapeStyle::from(&color).stroke_width(3);

        let segment = vec![
            (w0.u.unpack(), w0.v.unpack()),
            (w1.u.unpack(), w1.v.unpack()),
        ];
        draw_line(chart, segment, bounds, style, None)?;
    }

    Ok(())
}

/// Color for a height, running from purple at the lowest level to red at the highest.
fn height_color(height: f64, h_min: f64, h_max: f64) -> HSLColor {
    let frac = if h_max > h_min && height.is_finite() {
        ((height - h_min) / (h_max - h_min)).max(0.0).min(1.0)
    } else {
        0.0
    };

    HSLColor(HUE_RANGE * (1.0 - frac), 0.8, 0.5)
}
