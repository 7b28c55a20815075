//! Run a loaded sounding through every stage up to rendering.
use crate::{
    analysis::{derive_parameters, DerivedParameters},
    clean::clean,
    config::Config,
    document::SoundingDocument,
    error::Result,
    extract::extract,
    keys::ALL_FIELDS,
    units::{tag, UnitTaggedSeries},
    wind::subsample_for_display,
};
use log::{debug, info};

/// Everything needed to draw the charts.
#[derive(Debug, Clone)]
pub struct ProcessedSounding {
    /// The full cleaned profile.
    pub series: UnitTaggedSeries,
    /// The profile thinned to the configured pressure levels, for barbs and the hodograph.
    pub wind: UnitTaggedSeries,
    /// Parameters derived from the full profile.
    pub params: DerivedParameters,
}

/// Extract, clean, tag, subsample, and analyze a sounding.
///
/// The minimum number of points is checked again after cleaning, so a sounding with too many
/// out of range values is rejected the same way as one with too few records. Fails before
/// touching the document if the configuration is unusable.
pub fn process(document: &SoundingDocument, config: &Config) -> Result<ProcessedSounding> {
    config.validate()?;

    let extracted = extract(document, &ALL_FIELDS, config.min_points)?;
    let extracted_len = extracted.len();

    let cleaned = clean(extracted, &config.default_ranges)?;
    cleaned.validate(config.min_points)?;
    debug!(
        "Cleaning kept {} of {} samples",
        cleaned.len(),
        extracted_len
    );

    let thinned = subsample_for_display(&cleaned, &config.hodograph.pressure_levels);

    let series = tag(&cleaned);
    let wind = tag(&thinned);
    let params = derive_parameters(&series)?;

    info!(
        "Processed sounding with {} samples, {} wind levels",
        series.len(),
        wind.len()
    );

    Ok(ProcessedSounding {
        series,
        wind,
        params,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{error::SoundingError, keys::Param};
    use serde_json::json;

    fn make_document(pressures: &[f64]) -> SoundingDocument {
        let features: Vec<_> = pressures
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let t = 300.0 - 6.5 * i as f64;
                json!({
                    "properties": {
                        "pressure": p,
                        "temp": t,
                        "dewpoint": t - 3.0 - i as f64,
                        "gpheight": 100.0 + 1000.0 * i as f64,
                        "wind_u": 5.0 + 2.0 * i as f64,
                        "wind_v": 3.0 * i as f64,
                    }
                })
            })
            .collect();

        SoundingDocument::from_value(json!({ "features": features })).unwrap()
    }

    #[test]
    fn test_process() {
        let doc = make_document(&[990.0, 900.0, 850.0, 700.0, 600.0, 500.0, 400.0, 300.0]);
        let processed = process(&doc, &Config::default()).unwrap();

        assert_eq!(processed.series.len(), 8);
        // Too few samples to thin.
        assert_eq!(processed.wind.len(), 8);
        assert!(processed.series.unrecognized().is_empty());
        assert!(!processed.params.parcel_profile().pressure.is_empty());
        assert!(!processed.params.get(Param::LCL).unwrap().is_missing());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let doc = make_document(&[990.0, 900.0, 850.0, 700.0, 600.0, 500.0]);

        let mut config = Config::default();
        config.hodograph.pressure_levels = vec![100.0, 500.0, 1000.0];

        match process(&doc, &config) {
            Err(SoundingError::InvalidConfig(_)) => {}
            other => panic!("expected InvalidConfig, got {:?}", other.map(|p| p.series.len())),
        }
    }

    #[test]
    fn test_cleaning_below_min_points() {
        let doc = make_document(&[990.0, 900.0, 850.0, 700.0, 600.0, 500.0]);

        let mut config = Config::default();
        config.min_points = 6;
        config
            .default_ranges
            .insert_raw("pressure", json!([650.0, 1000.0]));

        match process(&doc, &config) {
            Err(SoundingError::InsufficientData(_)) => {}
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }
}
