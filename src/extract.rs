//! Pull aligned numeric series out of a sounding document.
use crate::{
    document::SoundingDocument,
    error::{DataShortfall, Result, SoundingError},
};
use log::debug;

/// Minimum number of complete samples required unless configured otherwise.
pub const DEFAULT_MIN_POINTS: usize = 5;

/// Plausible pressure bounds (hPa), exclusive. Samples outside are corrupt or in other units.
const PLAUSIBLE_PRESSURE: (f64, f64) = (100.0, 1000.0);

/// Named numeric series stored as parallel vectors.
///
/// Index `i` in every series describes the same sample, so rows are only ever added or removed
/// across all fields at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedSeries {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl ExtractedSeries {
    /// Create a series set from name and values pairs.
    ///
    /// Lengths are not checked here; `extract` and `validate` do that.
    pub fn from_columns<S, I>(columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Vec<f64>)>,
    {
        let (names, values) = columns
            .into_iter()
            .map(|(name, vals)| (name.into(), vals))
            .unzip();

        ExtractedSeries { names, values }
    }

    /// Field names in the order they were requested.
    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.names
    }

    /// Get the values of a field.
    #[inline]
    pub fn get(&self, field: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|name| name == field)
            .map(|idx| self.values[idx].as_slice())
    }

    /// Iterate over `(name, values)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Number of samples, the length of the first field.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.first().map(Vec::len).unwrap_or(0)
    }

    /// True if there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the rows whose flag in `keep` is true, preserving order.
    ///
    /// Rows past the end of `keep` are dropped.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for vals in self.values.iter_mut() {
            let mut flags = keep.iter();
            vals.retain(|_| *flags.next().unwrap_or(&false));
        }
    }

    /// Build a new series from the given row indexes, in the given order.
    pub(crate) fn select_rows(&self, rows: &[usize]) -> Self {
        let values = self
            .values
            .iter()
            .map(|vals| rows.iter().filter_map(|&i| vals.get(i).copied()).collect())
            .collect();

        ExtractedSeries {
            names: self.names.clone(),
            values,
        }
    }

    /// Check all fields have equal length.
    pub fn check_aligned(&self) -> Result<()> {
        let expected = self.len();

        match self.iter().find(|(_, vals)| vals.len() != expected) {
            Some((name, vals)) => Err(SoundingError::InsufficientData(
                DataShortfall::MismatchedLengths {
                    field: name.to_owned(),
                    len: vals.len(),
                    expected,
                },
            )),
            None => Ok(()),
        }
    }

    /// Check every field has at least `min_points` values and all fields have equal length.
    pub fn validate(&self, min_points: usize) -> Result<()> {
        let expected = match self.values.first() {
            Some(first) => first.len(),
            None => return Err(SoundingError::InsufficientData(DataShortfall::NoFields)),
        };

        for (name, vals) in self.iter() {
            if vals.len() < min_points {
                return Err(SoundingError::InsufficientData(
                    DataShortfall::TooFewPoints {
                        field: name.to_owned(),
                        found: vals.len(),
                        required: min_points,
                    },
                ));
            }

            if vals.len() != expected {
                return Err(SoundingError::InsufficientData(
                    DataShortfall::MismatchedLengths {
                        field: name.to_owned(),
                        len: vals.len(),
                        expected,
                    },
                ));
            }
        }

        Ok(())
    }
}

/// Extract the requested fields from every feature of the document.
///
/// A feature missing any requested field is skipped entirely. When `pressure` is requested,
/// features with a pressure outside (100, 1000) hPa are skipped as well. The minimum length and
/// equal length checks happen after the whole document has been scanned.
pub fn extract<S: AsRef<str>>(
    document: &SoundingDocument,
    fields: &[S],
    min_points: usize,
) -> Result<ExtractedSeries> {
    let names: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    let pressure_idx = names.iter().position(|&name| name == "pressure");

    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(document.features.len()); names.len()];
    let mut row: Vec<f64> = Vec::with_capacity(names.len());
    let mut skipped = 0;

    for feature in &document.features {
        row.clear();
        row.extend(names.iter().filter_map(|name| feature.number(name)));

        // Some field was missing, skip the whole record.
        if row.len() != names.len() {
            skipped += 1;
            continue;
        }

        if let Some(p) = pressure_idx.map(|idx| row[idx]) {
            let (low, high) = PLAUSIBLE_PRESSURE;
            if !(p > low && p < high) {
                skipped += 1;
                continue;
            }
        }

        for (vals, &val) in values.iter_mut().zip(row.iter()) {
            vals.push(val);
        }
    }

    debug!(
        "Extracted {} of {} records, skipped {}",
        document.features.len() - skipped,
        document.features.len(),
        skipped
    );

    let series = ExtractedSeries {
        names: names.into_iter().map(str::to_owned).collect(),
        values,
    };
    series.validate(min_points)?;

    Ok(series)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn make_test_document(pressure: &[f64]) -> SoundingDocument {
        let features: Vec<_> = pressure
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let t = 290.0 - 5.0 * i as f64;
                let dp = 285.0 - 6.0 * i as f64;
                json!({"properties": {"pressure": p, "temp": t, "dewpoint": dp}})
            })
            .collect();

        SoundingDocument::from_value(json!({ "features": features })).unwrap()
    }

    #[test]
    fn test_strict_pressure_bounds() {
        let doc = make_test_document(&[1010.0, 900.0, 850.0, 700.0, 500.0, 300.0]);

        let series = extract(&doc, &["pressure", "temp", "dewpoint"], 5).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.get("pressure").unwrap(), &[900.0, 850.0, 700.0, 500.0, 300.0]);
        assert_eq!(series.get("temp").unwrap()[0], 285.0);

        match extract(&doc, &["pressure", "temp", "dewpoint"], 6) {
            Err(SoundingError::InsufficientData(DataShortfall::TooFewPoints {
                found,
                required,
                ..
            })) => {
                assert_eq!(found, 5);
                assert_eq!(required, 6);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_boundary_pressures_excluded() {
        let doc = make_test_document(&[1000.0, 950.0, 900.0, 850.0, 700.0, 500.0, 100.0]);
        let series = extract(&doc, &["pressure"], 1).unwrap();
        assert_eq!(series.get("pressure").unwrap(), &[950.0, 900.0, 850.0, 700.0, 500.0]);
    }

    #[test]
    fn test_no_pressure_filter_without_pressure() {
        let doc = make_test_document(&[1010.0, 900.0, 850.0, 700.0, 500.0, 300.0]);
        let series = extract(&doc, &["temp", "dewpoint"], 6).unwrap();
        assert_eq!(series.len(), 6);
    }

    #[test]
    fn test_incomplete_records_skipped() {
        let doc = SoundingDocument::from_value(json!({"features": [
            {"properties": {"pressure": 950.0, "temp": 290.0}},
            {"properties": {"pressure": 900.0, "temp": null}},
            {"properties": {"pressure": 850.0}},
            {"properties": {"pressure": "800", "temp": "280.0"}},
            {"properties": {"pressure": 700.0, "temp": 275.0}},
        ]}))
        .unwrap();

        let series = extract(&doc, &["pressure", "temp"], 3).unwrap();
        assert_eq!(series.get("pressure").unwrap(), &[950.0, 800.0, 700.0]);
        assert_eq!(series.get("temp").unwrap(), &[290.0, 280.0, 275.0]);
    }

    #[test]
    fn test_uniformly_missing_field() {
        let doc = make_test_document(&[950.0, 900.0, 850.0, 700.0, 500.0, 300.0]);

        let result = extract(&doc, &["pressure", "temp", "gpheight"], 5);
        assert!(matches!(
            result,
            Err(SoundingError::InsufficientData(DataShortfall::TooFewPoints { found: 0, .. }))
        ));
    }

    #[test]
    fn test_no_fields() {
        let doc = make_test_document(&[950.0, 900.0, 850.0, 700.0, 500.0, 300.0]);
        let fields: [&str; 0] = [];
        assert!(matches!(
            extract(&doc, &fields, 5),
            Err(SoundingError::InsufficientData(DataShortfall::NoFields))
        ));
    }

    #[test]
    fn test_validate_mismatched_lengths() {
        let series = ExtractedSeries::from_columns(vec![
            ("pressure", vec![900.0, 800.0, 700.0]),
            ("temp", vec![280.0, 275.0]),
        ]);

        assert!(matches!(
            series.validate(2),
            Err(SoundingError::InsufficientData(DataShortfall::MismatchedLengths {
                len: 2,
                expected: 3,
                ..
            }))
        ));
    }

    #[test]
    fn test_select_rows() {
        let series = ExtractedSeries::from_columns(vec![
            ("pressure", vec![900.0, 800.0, 700.0, 600.0]),
            ("wind_u", vec![1.0, 2.0, 3.0, 4.0]),
        ]);

        let selected = series.select_rows(&[0, 2]);
        assert_eq!(selected.get("pressure").unwrap(), &[900.0, 700.0]);
        assert_eq!(selected.get("wind_u").unwrap(), &[1.0, 3.0]);
        assert_eq!(selected.fields(), series.fields());
    }
}
