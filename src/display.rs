//! Format the derived parameters for the parameter panel and as a plain text description.
use crate::{
    analysis::{DerivedParameters, ParamValue},
    config::{CategoryDisplay, ParamDisplayConfig, UnitLabel},
    keys::ParamCategory,
};
use log::warn;
use metfor::{Celsius, Quantity};
use std::fmt::Write;
use strum::IntoEnumIterator;

/// Font size of category headlines.
pub const HEADLINE_FONT_SIZE: f64 = 11.0;
/// Font size of parameter keys and values.
pub const VALUE_FONT_SIZE: f64 = 9.0;

/// Text shown when a value is missing.
const MISSING: &str = "--";

/// A piece of text on the figure, anchored at its top left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelText {
    /// Horizontal position as a fraction of the figure width, from the left.
    pub x: f64,
    /// Vertical position as a fraction of the figure height, from the bottom.
    pub y: f64,
    /// The text.
    pub text: String,
    /// Font size in points.
    pub font_size: f64,
}

/// Lay out the parameter panel.
///
/// Every category gets a headline, then one line per parameter with the key indented and the
/// value offset from the key. Categories missing from the configuration are not shown.
pub fn panel_layout(config: &ParamDisplayConfig, params: &DerivedParameters) -> Vec<PanelText> {
    let general = &config.general;
    let (x, y) = general.abs_position;

    let mut texts = Vec::new();

    for cat in ParamCategory::iter() {
        let cat_config: &CategoryDisplay = match config.categories.get(cat.as_ref()) {
            Some(cat_config) => cat_config,
            None => {
                warn!("No display settings for category '{}'", cat.as_ref());
                continue;
            }
        };

        let cat_x = x + cat_config.rel_position.0;
        let cat_y = y + cat_config.rel_position.1;
        let key_val_spacing = cat_config
            .key_val_spacing
            .unwrap_or(general.key_val_spacing);

        texts.push(PanelText {
            x: cat_x,
            y: cat_y + general.headline_elevation,
            text: cat_config.headline.clone(),
            font_size: HEADLINE_FONT_SIZE,
        });

        for (i, (param, value)) in params.category(cat).enumerate() {
            let line_y = cat_y - (i + 1) as f64 * general.line_spacing;

            texts.push(PanelText {
                x: cat_x + general.indent,
                y: line_y,
                text: format!("{}:", param.as_ref()),
                font_size: VALUE_FONT_SIZE,
            });
            texts.push(PanelText {
                x: cat_x + general.indent + key_val_spacing,
                y: line_y,
                text: format_value(value, &cat_config.unit),
                font_size: VALUE_FONT_SIZE,
            });
        }
    }

    texts
}

/// Format a value rounded to one decimal with the unit suffixes from the configuration.
///
/// Points are shown as temperature in °C, then pressure.
pub fn format_value(value: &ParamValue, unit: &UnitLabel) -> String {
    match value {
        ParamValue::Point {
            pressure,
            temperature,
        } => match (pressure.into_option(), temperature.into_option()) {
            (Some(p), Some(t)) => format!(
                "{:.1}{} | {:.1}{}",
                Celsius::from(t).unpack(),
                unit.first(),
                p.unpack(),
                unit.second()
            ),
            _ => MISSING.to_owned(),
        },
        ParamValue::Energy(val) => {
            format_scalar(val.into_option().map(Quantity::unpack), unit.first())
        }
        ParamValue::Temperature(val) => {
            format_scalar(val.into_option().map(Quantity::unpack), unit.first())
        }
        ParamValue::Index(val) => format_scalar(val.into_option(), unit.first()),
    }
}

fn format_scalar(val: Option<f64>, unit: &str) -> String {
    match val {
        Some(val) => format!("{:.1}{}", val, unit),
        None => MISSING.to_owned(),
    }
}

/// Describe the parameters as plain text, one section per category.
pub fn describe(params: &DerivedParameters) -> String {
    let mut description = String::new();

    for cat in ParamCategory::iter() {
        let (headline, unit) = match cat {
            ParamCategory::Points => ("POINTS", UnitLabel::Pair("°C".into(), " hPa".into())),
            ParamCategory::CapeCin => ("CAPE & CIN", UnitLabel::Single(" J/kg".into())),
            ParamCategory::Temperatures => {
                ("TEMPERATURES AT GROUND", UnitLabel::Single(" K".into()))
            }
            ParamCategory::Indices => ("INDICES", UnitLabel::Single(String::new())),
        };

        // Writing to a String cannot fail.
        let _ = write!(description, "\n[ {} ]\n", headline);
        for (param, value) in params.category(cat) {
            let _ = writeln!(description, "{}: {}", param.as_ref(), format_value(value, &unit));
        }
    }

    description
}
