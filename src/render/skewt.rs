//! The skew-T log-P diagram.
use super::{
    draw_line, figure_pixels, render_error, Bounds, Chart, DrawResult, DARK_BLUE, DARK_GREEN,
    GREY, LIGHT_BLUE, ORANGE, PINK, PIXELS_PER_INCH, PURPLE,
};
use crate::{
    analysis::{DerivedParameters, ParamValue},
    config::Config,
    display::panel_layout,
    error::Result,
    interpolation::crossing,
    keys::{Param, ParamCategory},
    parcel_profile::ParcelProfile,
    units::UnitTaggedSeries,
};
use itertools::{izip, Itertools};
use log::{debug, info};
use metfor::{self, Celsius, HectoPascal, Kelvin, Knots, Quantity, WindUV};
use optional::Optioned;
use plotters::prelude::*;
use std::path::Path;

/// Number of points along each background line.
const BACKGROUND_POINTS: usize = 40;
/// Length of a wind barb staff in pixels.
const BARB_LENGTH: f64 = 28.0;

/// Draw the skew-T log-P diagram.
///
/// `series` holds the full profiles, `wind` the subsampled levels to draw wind barbs at. The
/// parameter panel is drawn to the right of the diagram when enabled.
pub fn render_skewt<P: AsRef<Path>>(
    path: P,
    series: &UnitTaggedSeries,
    wind: &UnitTaggedSeries,
    params: &DerivedParameters,
    config: &Config,
) -> Result<()> {
    let path = path.as_ref();

    let profiles = Profiles {
        pressure: series.pressure()?,
        temperature: series.temperature()?,
        dew_point: series.dew_point()?,
    };

    let barbs: Vec<(HectoPascal, WindUV<Knots>)> = match (wind.pressure(), wind.wind()) {
        (Ok(p), Ok(w)) => izip!(p, w).collect(),
        _ => {
            debug!("No wind data, skipping wind barbs");
            vec![]
        }
    };

    draw_skewt(path, &profiles, &barbs, params, config).map_err(|err| render_error(path, err))?;

    info!("Skew-T written to {}", path.display());
    Ok(())
}

struct Profiles {
    pressure: Vec<HectoPascal>,
    temperature: Vec<Kelvin>,
    dew_point: Vec<Kelvin>,
}

/// Maps temperature and pressure to chart coordinates.
///
/// The y axis is `-ln(p)`. Isotherms are leaned to the right so they cross the plot at
/// `rotation` degrees from the horizontal.
#[derive(Debug, Clone, Copy)]
struct Skew {
    skew: f64,
    ln_p_bottom: f64,
}

impl Skew {
    fn new(rotation: f64, bounds: Bounds, plot_aspect: f64) -> Self {
        let (x_min, x_max, y_min, y_max) = bounds;
        let rotation = rotation.max(1.0).min(90.0).to_radians();

        Skew {
            skew: (x_max - x_min) / (y_max - y_min) * plot_aspect / rotation.tan(),
            ln_p_bottom: -y_min,
        }
    }

    fn point(&self, t: Celsius, p: HectoPascal) -> (f64, f64) {
        let ln_p = p.unpack().ln();
        (t.unpack() + self.skew * (self.ln_p_bottom - ln_p), -ln_p)
    }

    fn line<I>(&self, pnts: I) -> Vec<(f64, f64)>
    where
        I: IntoIterator<Item = (Celsius, HectoPascal)>,
    {
        pnts.into_iter().map(|(t, p)| self.point(t, p)).collect()
    }
}

fn draw_skewt(
    path: &Path,
    profiles: &Profiles,
    barbs: &[(HectoPascal, WindUV<Knots>)],
    params: &DerivedParameters,
    config: &Config,
) -> DrawResult<()> {
    let skewt_config = &config.skewt;
    let functionalities = &skewt_config.functionalities;

    let (width, height) = figure_pixels(skewt_config.figsize);
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let panel = if functionalities.description {
        panel_layout(&config.param_display, params)
    } else {
        vec![]
    };

    // Leave the right side of the figure to the parameter panel.
    let chart_width = panel
        .iter()
        .map(|text| text.x)
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |acc| acc.min(x))))
        .map(|x| ((x - 0.02).max(0.5).min(1.0) * f64::from(width)) as u32)
        .unwrap_or(width);
    let (chart_area, _) = root.split_horizontally(chart_width);

    let (x_min, x_max) = ordered(skewt_config.xlim);
    let (y_min, y_max) = ordered((-skewt_config.ylim.0.ln(), -skewt_config.ylim.1.ln()));
    let bounds = (x_min, x_max, y_min, y_max);

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(&skewt_config.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let pressure_label = |y: &f64| format!("{:.0}", (-*y).exp());
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_desc("Temperature (°C)")
        .y_desc("Pressure (hPa)")
        .y_label_formatter(&pressure_label);
    if !skewt_config.grid {
        mesh.disable_y_mesh();
    }
    mesh.draw()?;

    let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
    let skew = Skew::new(
        skewt_config.rotation,
        bounds,
        f64::from(plot_h) / f64::from(plot_w.max(1)),
    );

    let levels = log_levels(
        HectoPascal((-y_min).exp()),
        HectoPascal((-y_max).exp()),
        BACKGROUND_POINTS,
    );
    draw_background(&mut chart, &skew, bounds, &levels, skewt_config.grid)?;

    let profile = params.parcel_profile();
    if functionalities.show_cape_cin && !profile.pressure.is_empty() {
        let lfc = match params.get(Param::LFC) {
            Some(ParamValue::Point { pressure, .. }) => pressure.into_option(),
            _ => None,
        };
        draw_cape_cin(&mut chart, &skew, bounds, profile, lfc)?;
    }

    let Profiles {
        pressure,
        temperature,
        dew_point,
    } = profiles;

    let as_line = |ts: &[Kelvin], ps: &[HectoPascal]| {
        skew.line(izip!(ts, ps).map(|(&t, &p)| (Celsius::from(t), p)))
    };
    let as_line_opt = |ts: &[Optioned<Kelvin>]| {
        skew.line(
            izip!(ts, pressure)
                .filter_map(|(t, &p)| t.into_option().map(|t| (Celsius::from(t), p))),
        )
    };

    draw_line(
        &mut chart,
        as_line(temperature, pressure),
        bounds,
        RED.stroke_width(2),
        Some("Temperature"),
    )?;
    draw_line(
        &mut chart,
        as_line(dew_point, pressure),
        bounds,
        BLUE.stroke_width(2),
        Some("Dewpoint"),
    )?;
    draw_line(
        &mut chart,
        as_line(&profile.parcel_t, &profile.pressure),
        bounds,
        BLACK.stroke_width(2),
        Some("Parcel Trace"),
    )?;

    if functionalities.show_equiv_pot_temp {
        draw_line(
            &mut chart,
            as_line_opt(params.theta_e_profile()),
            bounds,
            PINK.stroke_width(2),
            Some("Equivalent Potential Temperature"),
        )?;
    }
    if functionalities.show_wb_temp {
        draw_line(
            &mut chart,
            as_line_opt(params.wet_bulb_profile()),
            bounds,
            LIGHT_BLUE.stroke_width(2),
            Some("Wet-Bulb Temperature"),
        )?;
    }
    if functionalities.show_wb_pot_temp {
        draw_line(
            &mut chart,
            as_line_opt(params.theta_w_profile()),
            bounds,
            LIGHT_BLUE.stroke_width(1),
            Some("Wet-Bulb Potential Temperature"),
        )?;
    }

    if functionalities.show_params {
        draw_points(&mut chart, &skew, bounds, params)?;
    }

    if skewt_config.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 12))
            .draw()?;
    }

    // Barbs are drawn in pixels, just inside the right edge of the plot.
    let barb_x = x_max - 0.06 * (x_max - x_min);
    for (p, wind) in barbs {
        let y = -p.unpack().ln();
        if y < y_min || y > y_max {
            continue;
        }

        let (bx, by) = chart.backend_coord(&(barb_x, y));
        draw_barb(&root, (f64::from(bx), f64::from(by)), wind_barb(*wind, BARB_LENGTH))?;
    }

    // Font sizes are in points.
    let px_per_pt = PIXELS_PER_INCH / 72.0;
    for text in &panel {
        let pos = (
            (text.x * f64::from(width)) as i32,
            ((1.0 - text.y) * f64::from(height)) as i32,
        );
        root.draw(&Text::new(
            text.text.clone(),
            pos,
            ("sans-serif", text.font_size * px_per_pt).into_font(),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn ordered((a, b): (f64, f64)) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pressure levels evenly spaced in `ln(p)` from `bottom` to `top`.
fn log_levels(bottom: HectoPascal, top: HectoPascal, n: usize) -> Vec<HectoPascal> {
    let (ln_b, ln_t) = (bottom.unpack().ln(), top.unpack().ln());
    let n = n.max(2);

    (0..n)
        .map(|i| HectoPascal((ln_b + (ln_t - ln_b) * i as f64 / (n - 1) as f64).exp()))
        .collect()
}

// Isotherms, dry adiabats, moist adiabats and mixing lines.
fn draw_background(
    chart: &mut Chart,
    skew: &Skew,
    bounds: Bounds,
    levels: &[HectoPascal],
    grid: bool,
) -> DrawResult<()> {
    let (bottom, top) = match (levels.first(), levels.last()) {
        (Some(&bottom), Some(&top)) => (bottom, top),
        _ => return Ok(()),
    };

    if grid {
        for t in (-150..=50).step_by(10) {
            let t = Celsius(f64::from(t));
            draw_line(
                chart,
                skew.line(vec![(t, bottom), (t, top)]),
                bounds,
                GREY.mix(0.5).stroke_width(1),
                None,
            )?;
        }
    }

    let dry_style = DARK_GREEN.mix(0.4).stroke_width(1);
    for theta in (-30..=200).step_by(10) {
        let theta = Kelvin::from(Celsius(f64::from(theta)));
        let pnts = levels
            .iter()
            .map(|&p| (Celsius::from(metfor::temperature_from_pot_temp(theta, p)), p));
        draw_line(chart, skew.line(pnts), bounds, dry_style, None)?;
    }

    let moist_style = DARK_GREEN.mix(0.4).stroke_width(1);
    for theta_w in (-10..=40).step_by(5) {
        let theta_w = Kelvin::from(Celsius(f64::from(theta_w)));
        let theta_e = match metfor::equiv_pot_temperature(theta_w, theta_w, HectoPascal(1000.0)) {
            Some(theta_e) => theta_e,
            None => continue,
        };

        let pnts = levels.iter().filter_map(|&p| {
            metfor::temperature_from_equiv_pot_temp_saturated_and_pressure(p, theta_e)
                .map(|t| (t, p))
        });
        draw_line(chart, skew.line(pnts), bounds, moist_style, None)?;
    }

    let mixing_style = DARK_BLUE.mix(0.4).stroke_width(1);
    for &mw in &[0.4, 1.0, 2.0, 4.0, 7.0, 10.0, 16.0, 24.0] {
        let pnts = levels
            .iter()
            .take_while(|&&p| p >= HectoPascal(600.0))
            .filter_map(|&p| metfor::dew_point_from_p_and_mw(p, mw / 1000.0).map(|t| (t, p)));
        draw_line(chart, skew.line(pnts), bounds, mixing_style, None)?;
    }

    Ok(())
}

fn draw_cape_cin(
    chart: &mut Chart,
    skew: &Skew,
    bounds: Bounds,
    profile: &ParcelProfile,
    lfc: Option<HectoPascal>,
) -> DrawResult<()> {
    let (x_min, x_max, y_min, y_max) = bounds;
    let inside = |&(x, y): &(f64, f64)| x >= x_min && x <= x_max && y >= y_min && y <= y_max;

    let polygons = buoyancy_polygons(profile)
        .into_iter()
        .filter_map(|(buoyant, pnts)| {
            let color = if buoyant {
                ORANGE
            } else {
                // Negative area only counts as CIN below the LFC.
                let lfc = lfc?;
                let mean_p = pnts.iter().map(|(_, p)| p.unpack()).sum::<f64>() / pnts.len() as f64;
                if mean_p <= lfc.unpack() {
                    return None;
                }
                BLUE
            };

            let pnts = skew.line(pnts);
            if pnts.iter().all(|pnt| inside(pnt)) {
                Some(Polygon::new(pnts, color.mix(0.3).filled()))
            } else {
                None
            }
        });

    chart.draw_series(polygons)?;
    Ok(())
}

/// Split the area between the parcel and the environment into polygons of one sign.
///
/// Returns whether the parcel is warmer over the polygon, and its corners.
fn buoyancy_polygons(profile: &ParcelProfile) -> Vec<(bool, Vec<(Celsius, HectoPascal)>)> {
    let ParcelProfile {
        pressure,
        parcel_t,
        environment_t,
    } = profile;

    izip!(pressure, parcel_t, environment_t)
        .map(|(&p, &pt, &et)| (p, pt.unpack(), et.unpack()))
        .tuple_windows::<(_, _)>()
        .flat_map(|((p0, pt0, et0), (p1, pt1, et1))| {
            let (b0, b1) = (pt0 - et0, pt1 - et1);
            let pnt = |t: f64, p: HectoPascal| (Celsius::from(Kelvin(t)), p);

            if b0 * b1 < 0.0 {
                let (pc, tc) = crossing((p0.unpack(), b0, et0), (p1.unpack(), b1, et1));
                let pc = HectoPascal(pc);

                vec![
                    (b0 > 0.0, vec![pnt(et0, p0), pnt(pt0, p0), pnt(tc, pc)]),
                    (b1 > 0.0, vec![pnt(tc, pc), pnt(pt1, p1), pnt(et1, p1)]),
                ]
            } else if b0 == 0.0 && b1 == 0.0 {
                vec![]
            } else {
                vec![(
                    b0 + b1 > 0.0,
                    vec![pnt(et0, p0), pnt(pt0, p0), pnt(pt1, p1), pnt(et1, p1)],
                )]
            }
        })
        .collect()
}

fn draw_points(
    chart: &mut Chart,
    skew: &Skew,
    bounds: Bounds,
    params: &DerivedParameters,
) -> DrawResult<()> {
    let (x_min, x_max, y_min, y_max) = bounds;

    for (param, value) in params.category(ParamCategory::Points) {
        let (p, t) = match value {
            ParamValue::Point {
                pressure,
                temperature,
            } => match (pressure.into_option(), temperature.into_option()) {
                (Some(p), Some(t)) => (p, Celsius::from(t)),
                _ => continue,
            },
            _ => continue,
        };

        let (x, y) = skew.point(t, p);
        if x < x_min || x > x_max || y < y_min || y > y_max {
            continue;
        }

        chart.draw_series(std::iter::once(Cross::new((x, y), 4, PURPLE.stroke_width(2))))?;
        chart.draw_series(std::iter::once(Text::new(
            param.as_ref().to_owned(),
            (x + 1.0, y),
            ("sans-serif", 11).into_font().color(&PURPLE),
        )))?;
    }

    Ok(())
}

/// A wind barb in pixel offsets from the point it is drawn at.
#[derive(Debug, Default, PartialEq)]
struct Barb {
    lines: Vec<[(f64, f64); 2]>,
    pennants: Vec<[(f64, f64); 3]>,
    calm: bool,
}

/// Build a wind barb: the staff points into the wind, pennants are 50 kt, full barbs 10 kt and
/// half barbs 5 kt.
fn wind_barb(wind: WindUV<Knots>, length: f64) -> Barb {
    let (u, v) = (wind.u.unpack(), wind.v.unpack());
    let speed = u.hypot(v);
    let mut remaining = ((speed / 5.0).round() as u32) * 5;

    if remaining == 0 {
        return Barb {
            calm: true,
            ..Barb::default()
        };
    }

    // Pixel y grows downward.
    let (dx, dy) = (-u / speed, v / speed);
    let (px, py) = (-dy, dx);

    let along = |dist: f64| (dx * dist, dy * dist);
    let feather = 0.4 * length;
    let spacing = 0.12 * length;

    let mut barb = Barb {
        lines: vec![[(0.0, 0.0), along(length)]],
        ..Barb::default()
    };

    let mut dist = length;
    while remaining >= 50 {
        let (x0, y0) = along(dist);
        let (x1, y1) = along(dist - spacing);
        barb.pennants.push([
            (x0, y0),
            (x0 + px * feather, y0 + py * feather),
            (x1, y1),
        ]);
        dist -= 1.5 * spacing;
        remaining -= 50;
    }

    while remaining >= 10 {
        let (x0, y0) = along(dist);
        barb.lines.push([
            (x0, y0),
            (x0 + px * feather + dx * spacing, y0 + py * feather + dy * spacing),
        ]);
        dist -= spacing;
        remaining -= 10;
    }

    if remaining >= 5 {
        // A lone half barb is set in from the end of the staff.
        if dist >= length {
            dist -= spacing;
        }
        let (x0, y0) = along(dist);
        let half = 0.5 * feather;
        barb.lines.push([
            (x0, y0),
            (x0 + px * half + dx * 0.5 * spacing, y0 + py * half + dy * 0.5 * spacing),
        ]);
    }

    barb
}

fn draw_barb(
    area: &DrawingArea<SVGBackend, plotters::coord::Shift>,
    (bx, by): (f64, f64),
    barb: Barb,
) -> DrawResult<()> {
    let to_px = |(x, y): (f64, f64)| ((bx + x).round() as i32, (by + y).round() as i32);
    let style = BLACK.stroke_width(1);

    if barb.calm {
        area.draw(&Circle::new(to_px((0.0, 0.0)), 3, style))?;
        return Ok(());
    }

    for [start, end] in barb.lines {
        area.draw(&PathElement::new(vec![to_px(start), to_px(end)], style))?;
    }
    for corners in barb.pennants {
        let corners: Vec<(i32, i32)> = corners.iter().copied().map(to_px).collect();
        area.draw(&Polygon::new(corners, BLACK.filled()))?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
        (val1 - val2).abs() < eps
    }

    #[test]
    fn test_skew_at_bottom_is_unskewed() {
        let bounds = (-40.0, 50.0, -(1050.0f64.ln()), -(100.0f64.ln()));
        let skew = Skew::new(45.0, bounds, 1.0);

        let (x, y) = skew.point(Celsius(10.0), HectoPascal(1050.0));
        assert!(approx_equal(x, 10.0, 1.0e-9));
        assert!(approx_equal(y, -(1050.0f64.ln()), 1.0e-12));

        // Isotherms lean right with height.
        let (x_top, _) = skew.point(Celsius(10.0), HectoPascal(500.0));
        assert!(x_top > x);

        // No lean at 90 degrees.
        let upright = Skew::new(90.0, bounds, 1.0);
        let (x_up, _) = upright.point(Celsius(10.0), HectoPascal(500.0));
        assert!(approx_equal(x_up, 10.0, 1.0e-9));
    }

    #[test]
    fn test_log_levels() {
        let levels = log_levels(HectoPascal(1000.0), HectoPascal(100.0), 3);
        assert_eq!(levels.len(), 3);
        assert!(approx_equal(levels[0].unpack(), 1000.0, 1.0e-9));
        assert!(approx_equal(levels[1].unpack(), 1000.0f64.sqrt() * 10.0, 1.0e-9));
        assert!(approx_equal(levels[2].unpack(), 100.0, 1.0e-9));
    }

    #[test]
    fn test_buoyancy_polygons() {
        let profile = ParcelProfile {
            pressure: vec![HectoPascal(1000.0), HectoPascal(900.0), HectoPascal(800.0)],
            parcel_t: vec![Kelvin(300.0), Kelvin(294.0), Kelvin(290.0)],
            environment_t: vec![Kelvin(300.0), Kelvin(296.0), Kelvin(287.0)],
        };

        let polygons = buoyancy_polygons(&profile);

        // A negative quad, then a sign change split into two triangles.
        assert_eq!(polygons.len(), 3);
        assert!(!polygons[0].0);
        assert_eq!(polygons[0].1.len(), 4);
        assert!(!polygons[1].0);
        assert!(polygons[2].0);
        assert_eq!(polygons[2].1.len(), 3);

        let (_, cross_p) = polygons[1].1[2];
        assert!(cross_p < HectoPascal(900.0) && cross_p > HectoPascal(800.0));
    }

    #[test]
    fn test_wind_barbs() {
        let calm = wind_barb(
            WindUV {
                u: Knots(1.0),
                v: Knots(1.0),
            },
            BARB_LENGTH,
        );
        assert!(calm.calm);

        // 65 knots from the west: one pennant, one full and one half barb.
        let barb = wind_barb(
            WindUV {
                u: Knots(65.0),
                v: Knots(0.0),
            },
            BARB_LENGTH,
        );
        assert!(!barb.calm);
        assert_eq!(barb.pennants.len(), 1);
        assert_eq!(barb.lines.len(), 3);

        // The staff points west, feathers go north (up in pixels).
        let [_, tip] = barb.lines[0];
        assert!(approx_equal(tip.0, -BARB_LENGTH, 1.0e-9));
        assert!(approx_equal(tip.1, 0.0, 1.0e-9));
        assert!(barb.pennants[0][1].1 < 0.0);
    }
}
