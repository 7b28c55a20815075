mod utils;

use metfor::Quantity;
use sounding_plot::{
    describe, extract, load, process, tag, Config, DataShortfall, Param, ParamValue,
    SoundingError, ALL_FIELDS,
};

fn is_missing(params: &sounding_plot::DerivedParameters, param: Param) -> bool {
    params
        .get(param)
        .unwrap_or_else(|| panic!("{} not derived", param.as_ref()))
        .is_missing()
}

#[test]
fn all_test_files_process() {
    let config = Config::default();

    for fname in utils::TEST_FILES.iter() {
        let doc = utils::load_test_file(fname);
        let processed =
            process(&doc, &config).unwrap_or_else(|err| panic!("{} failed: {}", fname, err));

        assert!(processed.series.len() >= config.min_points, "{}", fname);
        assert!(processed.wind.len() <= processed.series.len(), "{}", fname);
        assert!(processed.series.unrecognized().is_empty(), "{}", fname);
    }
}

#[test]
fn unstable_sounding() {
    let doc = utils::load_test_file("unstable.json");
    let processed = process(&doc, &Config::default()).unwrap();

    assert_eq!(processed.series.len(), 87);
    // One sample per bracket of the configured levels.
    assert_eq!(processed.wind.len(), 15);

    let params = &processed.params;
    assert!(!is_missing(params, Param::LCL));
    assert!(!is_missing(params, Param::LFC));

    match params.get(Param::CAPE) {
        Some(ParamValue::Energy(cape)) => assert!(cape.unwrap().unpack() > 500.0),
        other => panic!("unexpected CAPE {:?}", other),
    }
    match params.get(Param::LiftedIndex) {
        Some(ParamValue::Index(li)) => assert!(li.unwrap() < 0.0),
        other => panic!("unexpected lifted index {:?}", other),
    }

    for &param in &[Param::KIndex, Param::TotalTotals, Param::Showalter, Param::ThetaE] {
        assert!(!is_missing(params, param), "{}", param.as_ref());
    }
}

#[test]
fn stable_sounding_has_no_convection() {
    let doc = utils::load_test_file("stable.json");
    let processed = process(&doc, &Config::default()).unwrap();
    let params = &processed.params;

    assert!(!is_missing(params, Param::LCL));
    assert!(is_missing(params, Param::LFC));
    assert!(is_missing(params, Param::EL));

    for &param in &[Param::CAPE, Param::CIN] {
        match params.get(param) {
            Some(ParamValue::Energy(val)) => {
                assert!(utils::approx_equal(val.unwrap().unpack(), 0.0, 1.0e-9))
            }
            other => panic!("unexpected {} {:?}", param.as_ref(), other),
        }
    }

    assert!(describe(params).contains("LFC: --\n"));
}

#[test]
fn messy_records_skipped_and_cleaned() {
    let doc = utils::load_test_file("messy.json");

    // Null, missing, and implausible records are skipped on extraction.
    let extracted = extract(&doc, &ALL_FIELDS, 5).unwrap();
    assert_eq!(extracted.len(), 7);
    assert_eq!(
        extracted.get("pressure").unwrap(),
        &[990.0, 950.0, 900.0, 800.0, 700.0, 500.0, 300.0][..]
    );

    // The -9999 dew point is cleaned out.
    let processed = process(&doc, &Config::default()).unwrap();
    assert_eq!(
        processed.series.values(sounding_plot::Field::Pressure).unwrap(),
        &[990.0, 950.0, 900.0, 700.0, 500.0, 300.0][..]
    );
    assert_eq!(processed.wind.len(), processed.series.len());
}

#[test]
fn too_few_points_after_cleaning() {
    let doc = utils::load_test_file("messy.json");
    let mut config = Config::default();
    config.min_points = 7;

    match process(&doc, &config) {
        Err(err @ SoundingError::InsufficientData(DataShortfall::TooFewPoints { .. })) => {
            assert!(err.is_user_correctable())
        }
        other => panic!("expected too few points, got {:?}", other.map(|p| p.series.len())),
    }
}

#[test]
fn tag_then_strip() {
    let doc = utils::load_test_file("unstable.json");
    let extracted = extract(&doc, &ALL_FIELDS, 5).unwrap();

    assert_eq!(tag(&extracted).strip(), extracted);
}

#[test]
fn missing_file() {
    match load(utils::test_file_path("no_such_sounding.json")) {
        Err(err @ SoundingError::NotFound { .. }) => assert!(err.is_user_correctable()),
        other => panic!("expected NotFound, got {:?}", other.map(|d| d.features.len())),
    }
}

#[test]
fn describe_sections_in_order() {
    let doc = utils::load_test_file("unstable.json");
    let processed = process(&doc, &Config::default()).unwrap();
    let description = describe(&processed.params);

    let positions: Vec<usize> = [
        "[ POINTS ]",
        "[ CAPE & CIN ]",
        "[ TEMPERATURES AT GROUND ]",
        "[ INDICES ]",
    ]
    .iter()
    .map(|headline| description.find(headline).unwrap())
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(description.contains("Total Totals Index: "));
}
