//! Thin out the wind data for wind barbs and the hodograph.
use crate::extract::ExtractedSeries;
use log::{debug, warn};

/// How many samples beyond the number of levels a sounding may have before it gets thinned.
const SPARSE_MARGIN: usize = 5;

/// Thin the series down to at most one sample per bracket of `pressure_levels`.
///
/// `pressure_levels` must be strictly descending. The pressure series is walked once: while
/// looking at the bracket `(levels[k], levels[k + 1])`, the first sample at or below
/// `levels[k]` moves the walk on to the next bracket, and it is kept if it is also at or above
/// `levels[k + 1]`. A bracket is never revisited, so a pressure trace that goes back up (an
/// inversion in the data) can end up with fewer samples than brackets.
///
/// Soundings with `pressure_levels.len() + 5` or fewer samples, or without pressure, are
/// returned unchanged, as are all soundings when the levels do not form at least one bracket
/// in strictly descending order. Rows are selected from every field so the series stay aligned.
pub fn subsample_for_display(series: &ExtractedSeries, pressure_levels: &[f64]) -> ExtractedSeries {
    if series.len() <= pressure_levels.len() + SPARSE_MARGIN {
        return series.clone();
    }

    let pressure = match series.get("pressure") {
        Some(p) => p,
        None => {
            warn!("No pressure to subsample the wind data with, using all samples");
            return series.clone();
        }
    };

    if pressure_levels.len() < 2
        || pressure_levels
            .windows(2)
            .any(|w| !(w[0] > w[1]) || !w[0].is_finite() || !w[1].is_finite())
    {
        warn!(
            "Pressure levels {:?} are not strictly descending, using all samples",
            pressure_levels
        );
        return series.clone();
    }

    let mut rows = Vec::with_capacity(pressure_levels.len());
    let mut brackets = pressure_levels.windows(2);
    let mut bracket = brackets.next();

    for (i, &p) in pressure.iter().enumerate() {
        let (top, bottom) = match bracket {
            Some(&[top, bottom]) => (top, bottom),
            _ => break,
        };

        if p <= top {
            if p >= bottom {
                rows.push(i);
            }
            bracket = brackets.next();
        }
    }

    debug!(
        "Selected {} of {} samples for wind display",
        rows.len(),
        series.len()
    );

    series.select_rows(&rows)
}
