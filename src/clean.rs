//! Remove samples with values outside of configured ranges.
use crate::{error::Result, extract::ExtractedSeries};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{collections::BTreeMap, iter::FromIterator};

/// Admissible `[min, max]` ranges keyed by field name.
///
/// The raw JSON is kept so that a malformed entry only disables that one range instead of
/// rejecting the whole configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RangeConfig(BTreeMap<String, Value>);

impl RangeConfig {
    /// Generous physical limits for the standard fields.
    pub fn default_ranges() -> Self {
        RangeConfig::from_iter(vec![
            ("pressure", (100.0, 1100.0)),
            ("temp", (170.0, 340.0)),
            ("dewpoint", (150.0, 330.0)),
            ("gpheight", (-500.0, 40_000.0)),
            ("wind_u", (-300.0, 300.0)),
            ("wind_v", (-300.0, 300.0)),
        ])
    }

    /// Number of configured entries, malformed or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `(min, max)` bounds of a field, `None` if not configured or malformed.
    pub fn bounds(&self, field: &str) -> Option<(f64, f64)> {
        self.0.get(field).and_then(parse_range)
    }

    /// Add or replace a raw entry.
    pub fn insert_raw<S: Into<String>>(&mut self, field: S, range: Value) {
        self.0.insert(field.into(), range);
    }
}

impl<S: Into<String>> FromIterator<(S, (f64, f64))> for RangeConfig {
    fn from_iter<I: IntoIterator<Item = (S, (f64, f64))>>(iter: I) -> Self {
        RangeConfig(
            iter.into_iter()
                .map(|(field, (min, max))| (field.into(), json!([min, max])))
                .collect(),
        )
    }
}

/// Accepts `[min, max]` or `{"min": .., "max": ..}` with `min <= max`.
fn parse_range(raw: &Value) -> Option<(f64, f64)> {
    let (min, max) = match raw {
        Value::Array(vals) if vals.len() == 2 => (vals[0].as_f64()?, vals[1].as_f64()?),
        Value::Object(map) => (map.get("min")?.as_f64()?, map.get("max")?.as_f64()?),
        _ => return None,
    };

    if min <= max {
        Some((min, max))
    } else {
        None
    }
}

/// Remove every row that has a value outside its field's range in any field.
///
/// Fields without a range never cause a removal. A malformed range is reported and ignored.
/// The surviving rows keep their relative order. Fails if the fields have different lengths.
pub fn clean(mut series: ExtractedSeries, ranges: &RangeConfig) -> Result<ExtractedSeries> {
    series.check_aligned()?;

    let mut keep = vec![true; series.len()];

    for (field, vals) in series.iter() {
        let raw = match ranges.0.get(field) {
            Some(raw) => raw,
            None => continue,
        };

        let (min, max) = match parse_range(raw) {
            Some(bounds) => bounds,
            None => {
                warn!(
                    "Ignoring malformed range for '{}': {}, expected [min, max]",
                    field, raw
                );
                continue;
            }
        };

        for (flag, val) in keep.iter_mut().zip(vals) {
            // Written so NaN is flagged too.
            if !(min <= *val && *val <= max) {
                *flag = false;
            }
        }
    }

    let removed = keep.iter().filter(|&&k| !k).count();
    if removed > 0 {
        debug!("Removing {} of {} samples out of range", removed, keep.len());
        series.retain_rows(&keep);
    }

    Ok(series)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{DataShortfall, SoundingError};

    fn make_test_series() -> ExtractedSeries {
        ExtractedSeries::from_columns(vec![
            ("pressure", vec![950.0, 900.0, 850.0, 700.0, 500.0, 300.0]),
            ("temp", vec![290.0, 287.0, 350.0, 275.0, 260.0, 230.0]),
            ("dewpoint", vec![285.0, 283.0, 280.0, 265.0, 250.0, 215.0]),
        ])
    }

    #[test]
    fn test_removes_row_from_every_field() {
        let ranges: RangeConfig = vec![("temp", (200.0, 320.0))].into_iter().collect();
        let cleaned = clean(make_test_series(), &ranges).unwrap();

        assert_eq!(cleaned.len(), 5);
        assert_eq!(cleaned.get("pressure").unwrap(), &[950.0, 900.0, 700.0, 500.0, 300.0]);
        assert_eq!(cleaned.get("temp").unwrap(), &[290.0, 287.0, 275.0, 260.0, 230.0]);
        assert_eq!(cleaned.get("dewpoint").unwrap(), &[285.0, 283.0, 265.0, 250.0, 215.0]);
    }

    #[test]
    fn test_union_of_flags() {
        let ranges: RangeConfig = vec![("temp", (200.0, 320.0)), ("dewpoint", (220.0, 320.0))]
            .into_iter()
            .collect();
        let cleaned = clean(make_test_series(), &ranges).unwrap();

        // index 2 for temp, index 5 for dewpoint
        assert_eq!(cleaned.get("pressure").unwrap(), &[950.0, 900.0, 700.0, 500.0]);
    }

    #[test]
    fn test_closed_interval_and_unranged_fields() {
        let ranges: RangeConfig = vec![("temp", (230.0, 290.0)), ("rh", (0.0, 1.0))]
            .into_iter()
            .collect();
        let cleaned = clean(make_test_series(), &ranges).unwrap();

        assert_eq!(cleaned.get("temp").unwrap(), &[290.0, 287.0, 275.0, 260.0, 230.0]);
    }

    #[test]
    fn test_idempotent() {
        let ranges: RangeConfig = vec![("temp", (200.0, 320.0)), ("dewpoint", (220.0, 320.0))]
            .into_iter()
            .collect();
        let once = clean(make_test_series(), &ranges).unwrap();
        let twice = clean(once.clone(), &ranges).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_ranges_ignored() {
        let mut ranges = RangeConfig::default();
        ranges.insert_raw("temp", json!([200.0]));
        ranges.insert_raw("dewpoint", json!([null, 250.0]));
        ranges.insert_raw("pressure", json!("everything"));

        let cleaned = clean(make_test_series(), &ranges).unwrap();
        assert_eq!(cleaned, make_test_series());

        assert_eq!(ranges.bounds("temp"), None);
        assert_eq!(ranges.len(), 3);
    }

    #[test]
    fn test_range_forms() {
        assert_eq!(parse_range(&json!([1, 2.5])), Some((1.0, 2.5)));
        assert_eq!(parse_range(&json!({"min": -1, "max": 1})), Some((-1.0, 1.0)));
        assert_eq!(parse_range(&json!([3, 2])), None);
        assert_eq!(parse_range(&json!([1, 2, 3])), None);
    }

    #[test]
    fn test_nan_removed() {
        let series = ExtractedSeries::from_columns(vec![
            ("pressure", vec![900.0, 800.0, 700.0]),
            ("temp", vec![280.0, std::f64::NAN, 270.0]),
        ]);
        let ranges: RangeConfig = vec![("temp", (200.0, 320.0))].into_iter().collect();

        let cleaned = clean(series, &ranges).unwrap();
        assert_eq!(cleaned.get("pressure").unwrap(), &[900.0, 700.0]);
    }

    #[test]
    fn test_misaligned_series_is_error() {
        let series = ExtractedSeries::from_columns(vec![
            ("temp", vec![280.0, 350.0, 270.0]),
            ("pressure", vec![900.0, 800.0]),
        ]);
        let ranges: RangeConfig = vec![("temp", (200.0, 320.0))].into_iter().collect();

        match clean(series, &ranges) {
            Err(SoundingError::InsufficientData(DataShortfall::MismatchedLengths {
                field,
                len,
                expected,
            })) => {
                assert_eq!(field, "pressure");
                assert_eq!((len, expected), (2, 3));
            }
            other => panic!("expected mismatched lengths, got {:?}", other),
        }
    }
}
