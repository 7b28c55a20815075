//! Configuration for the pipeline and the plots.
//!
//! Every section has defaults, so a configuration file only needs to list what it changes.
use crate::{
    clean::RangeConfig,
    document::load_json,
    error::{Result, SoundingError},
};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

/// Top level configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Skew-T diagram settings.
    pub skewt: SkewTConfig,
    /// Hodograph settings, including the pressure levels used to thin the wind data.
    pub hodograph: HodographConfig,
    /// Layout of the parameter panel.
    pub param_display: ParamDisplayConfig,
    /// Admissible `[min, max]` per field, used by the cleaner.
    pub default_ranges: RangeConfig,
    /// Minimum number of complete samples required to plot.
    pub min_points: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            skewt: SkewTConfig::default(),
            hodograph: HodographConfig::default(),
            param_display: ParamDisplayConfig::default(),
            default_ranges: RangeConfig::default_ranges(),
            min_points: crate::extract::DEFAULT_MIN_POINTS,
        }
    }
}

impl Config {
    /// Load the configuration from a JSON file and check it can be used.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Config = load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.hodograph.validate()
    }
}

/// Skew-T diagram settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkewTConfig {
    /// Figure size in inches (width, height).
    pub figsize: (f64, f64),
    /// Temperature axis limits in Celsius at the bottom of the diagram.
    pub xlim: (f64, f64),
    /// Pressure axis limits in hPa (bottom, top).
    pub ylim: (f64, f64),
    /// Angle of the isotherms in degrees.
    pub rotation: f64,
    /// Draw the background grid.
    pub grid: bool,
    /// Chart title.
    pub title: String,
    /// Draw the legend.
    pub legend: bool,
    /// Optional overlays.
    pub functionalities: Functionalities,
}

impl Default for SkewTConfig {
    fn default() -> Self {
        SkewTConfig {
            figsize: (9.0, 9.0),
            xlim: (-40.0, 50.0),
            ylim: (1050.0, 100.0),
            rotation: 45.0,
            grid: true,
            title: "Skew-T Log-P".to_owned(),
            legend: true,
            functionalities: Functionalities::default(),
        }
    }
}

/// Toggles for the skew-T overlays.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Functionalities {
    /// Shade the positive and negative areas between parcel and environment.
    pub show_cape_cin: bool,
    /// Plot the equivalent potential temperature profile.
    pub show_equiv_pot_temp: bool,
    /// Plot the wet bulb temperature profile.
    pub show_wb_temp: bool,
    /// Plot the wet bulb potential temperature profile.
    pub show_wb_pot_temp: bool,
    /// Mark LCL, LFC, EL and CCL on the diagram.
    pub show_params: bool,
    /// Draw the parameter panel beside the diagram.
    pub description: bool,
}

impl Default for Functionalities {
    fn default() -> Self {
        Functionalities {
            show_cape_cin: true,
            show_equiv_pot_temp: false,
            show_wb_temp: true,
            show_wb_pot_temp: false,
            show_params: true,
            description: true,
        }
    }
}

/// Hodograph settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HodographConfig {
    /// Figure size in inches (width, height).
    pub figsize: (f64, f64),
    /// Maximum wind component shown, in knots.
    pub component_range: f64,
    /// Spacing of the range rings, in knots.
    pub grid_increment: f64,
    /// Strictly descending pressure levels (hPa) for thinning wind data.
    pub pressure_levels: Vec<f64>,
}

impl HodographConfig {
    /// The pressure levels must be at least two finite values in strictly descending order.
    pub fn validate(&self) -> Result<()> {
        let levels = &self.pressure_levels;

        if levels.len() < 2 {
            return Err(SoundingError::InvalidConfig(format!(
                "hodograph.pressure_levels needs at least 2 levels, found {}",
                levels.len()
            )));
        }

        if let Some(val) = levels.iter().find(|val| !val.is_finite()) {
            return Err(SoundingError::InvalidConfig(format!(
                "hodograph.pressure_levels has a non-finite level {}",
                val
            )));
        }

        if let Some(pair) = levels.windows(2).find(|pair| pair[0] <= pair[1]) {
            return Err(SoundingError::InvalidConfig(format!(
                "hodograph.pressure_levels must be strictly descending, {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        Ok(())
    }
}

impl Default for HodographConfig {
    fn default() -> Self {
        HodographConfig {
            figsize: (6.0, 6.0),
            component_range: 80.0,
            grid_increment: 10.0,
            pressure_levels: vec![
                1000.0, 975.0, 950.0, 925.0, 900.0, 850.0, 800.0, 700.0, 600.0, 500.0, 400.0,
                300.0, 250.0, 200.0, 150.0, 100.0,
            ],
        }
    }
}

/// Layout of the parameter panel, positions are fractions of the figure size.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParamDisplayConfig {
    /// Settings shared by all categories.
    pub general: GeneralDisplay,
    /// Per category settings keyed by category name.
    pub categories: BTreeMap<String, CategoryDisplay>,
}

impl Default for ParamDisplayConfig {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            "points".to_owned(),
            CategoryDisplay {
                rel_position: (0.0, 0.0),
                unit: UnitLabel::Pair("°C".to_owned(), " hPa".to_owned()),
                headline: "Points".to_owned(),
                key_val_spacing: None,
            },
        );
        categories.insert(
            "cape_cin".to_owned(),
            CategoryDisplay {
                rel_position: (0.0, -0.17),
                unit: UnitLabel::Single(" J/kg".to_owned()),
                headline: "CAPE & CIN".to_owned(),
                key_val_spacing: None,
            },
        );
        categories.insert(
            "temperatures".to_owned(),
            CategoryDisplay {
                rel_position: (0.0, -0.28),
                unit: UnitLabel::Single(" K".to_owned()),
                headline: "Temperatures at ground".to_owned(),
                key_val_spacing: None,
            },
        );
        categories.insert(
            "indices".to_owned(),
            CategoryDisplay {
                rel_position: (0.0, -0.39),
                unit: UnitLabel::Single(String::new()),
                headline: "Indices".to_owned(),
                key_val_spacing: Some(0.14),
            },
        );

        ParamDisplayConfig {
            general: GeneralDisplay::default(),
            categories,
        }
    }
}

/// Settings shared by all panel categories.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GeneralDisplay {
    /// Anchor of the panel (x, y).
    pub abs_position: (f64, f64),
    /// Offset of a category headline above its first line.
    pub headline_elevation: f64,
    /// Horizontal indent of the parameter lines.
    pub indent: f64,
    /// Vertical distance between parameter lines.
    pub line_spacing: f64,
    /// Horizontal distance between a key and its value.
    pub key_val_spacing: f64,
}

impl Default for GeneralDisplay {
    fn default() -> Self {
        GeneralDisplay {
            abs_position: (0.76, 0.88),
            headline_elevation: 0.03,
            indent: 0.01,
            line_spacing: 0.025,
            key_val_spacing: 0.06,
        }
    }
}

/// Panel settings for one category of parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDisplay {
    /// Position relative to the panel anchor.
    #[serde(default)]
    pub rel_position: (f64, f64),
    /// Unit suffix printed after the values.
    #[serde(default)]
    pub unit: UnitLabel,
    /// Headline printed above the category.
    #[serde(default)]
    pub headline: String,
    /// Overrides the general key to value spacing.
    #[serde(default)]
    pub key_val_spacing: Option<f64>,
}

/// Unit suffix for a panel category, points carry a temperature and a pressure unit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UnitLabel {
    /// One suffix for scalar values.
    Single(String),
    /// Temperature and pressure suffixes for points.
    Pair(String, String),
}

impl Default for UnitLabel {
    fn default() -> Self {
        UnitLabel::Single(String::new())
    }
}

impl UnitLabel {
    /// The first (or only) suffix.
    pub fn first(&self) -> &str {
        match self {
            UnitLabel::Single(unit) => unit,
            UnitLabel::Pair(unit, _) => unit,
        }
    }

    /// The second suffix, falls back to the only one.
    pub fn second(&self) -> &str {
        match self {
            UnitLabel::Single(unit) => unit,
            UnitLabel::Pair(_, unit) => unit,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_value(json!({
            "skewt": {"title": "Test", "functionalities": {"show_cape_cin": false}},
            "hodograph": {"pressure_levels": [1000, 850, 700]},
            "default_ranges": {"temp": [200, 320]}
        }))
        .unwrap();

        assert_eq!(config.skewt.title, "Test");
        assert!(!config.skewt.functionalities.show_cape_cin);
        assert!(config.skewt.functionalities.show_params);
        assert_eq!(config.skewt.xlim, (-40.0, 50.0));
        assert_eq!(config.hodograph.pressure_levels, vec![1000.0, 850.0, 700.0]);
        assert_eq!(config.hodograph.component_range, 80.0);
        assert_eq!(config.default_ranges.bounds("temp"), Some((200.0, 320.0)));
        assert_eq!(config.default_ranges.bounds("pressure"), None);
        assert_eq!(config.min_points, 5);
        assert_eq!(config.param_display.categories.len(), 4);
    }

    #[test]
    fn test_unit_labels() {
        let category: CategoryDisplay = serde_json::from_value(json!({
            "rel_position": [0.0, -0.1],
            "unit": ["°C", " hPa"],
            "headline": "Points"
        }))
        .unwrap();
        assert_eq!(category.unit.first(), "°C");
        assert_eq!(category.unit.second(), " hPa");
        assert_eq!(category.key_val_spacing, None);

        let single = UnitLabel::Single(" J/kg".to_owned());
        assert_eq!(single.first(), single.second());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config.json");
        let config = Config::load(path).unwrap();
        assert!(config.hodograph.pressure_levels.windows(2).all(|w| w[0] > w[1]));
        assert!(!config.default_ranges.is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_bad_pressure_levels_rejected() {
        for levels in vec![
            vec![100.0, 500.0, 1000.0],
            vec![1000.0, 850.0, 850.0],
            vec![850.0],
            vec![],
            vec![1000.0, std::f64::NAN, 500.0],
        ] {
            let config = HodographConfig {
                pressure_levels: levels.clone(),
                ..HodographConfig::default()
            };

            match config.validate() {
                Err(SoundingError::InvalidConfig(_)) => {}
                other => panic!("{:?} accepted: {:?}", levels, other),
            }
        }
    }

    #[test]
    fn test_load_rejects_ascending_levels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            json!({"hodograph": {"pressure_levels": [100, 500, 1000]}}).to_string(),
        )
        .unwrap();

        match Config::load(&path) {
            Err(err @ SoundingError::InvalidConfig(_)) => assert!(err.is_user_correctable()),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }
}
