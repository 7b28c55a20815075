//! Enums used as keys for the sounding fields, their units, and the derived parameters.
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// The sounding fields this crate knows how to attach units to.
///
/// The string form is the property name used in the sounding document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, AsRefStr)]
pub enum Field {
    /// Pressure (hPa)
    #[strum(serialize = "pressure")]
    Pressure,
    /// Temperature (K)
    #[strum(serialize = "temp")]
    Temperature,
    /// Dew point (K)
    #[strum(serialize = "dewpoint")]
    DewPoint,
    /// Geopotential height (m)
    #[strum(serialize = "gpheight")]
    GeopotentialHeight,
    /// West to east wind component (knots)
    #[strum(serialize = "wind_u")]
    WindU,
    /// South to north wind component (knots)
    #[strum(serialize = "wind_v")]
    WindV,
}

/// Physical units attached to a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum Unit {
    /// Hectopascals
    #[strum(serialize = "hPa")]
    HectoPascal,
    /// Kelvin
    #[strum(serialize = "K")]
    Kelvin,
    /// Meters
    #[strum(serialize = "m")]
    Meters,
    /// Knots
    #[strum(serialize = "kt")]
    Knots,
    /// Joules per kilogram
    #[strum(serialize = "J/kg")]
    JoulesPerKilogram,
}

/// The groups derived parameters are reported in, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, AsRefStr)]
pub enum ParamCategory {
    /// Characteristic points of the parcel ascent.
    #[strum(serialize = "points")]
    Points,
    /// Convective energy.
    #[strum(serialize = "cape_cin")]
    CapeCin,
    /// Temperatures of the surface parcel.
    #[strum(serialize = "temperatures")]
    Temperatures,
    /// Stability indexes.
    #[strum(serialize = "indices")]
    Indices,
}

/// Derived parameters, in display order.
///
/// The string form is the label shown in the parameter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, AsRefStr)]
pub enum Param {
    /// Lifting condensation level
    #[strum(serialize = "LCL")]
    LCL,
    /// Level of free convection
    #[strum(serialize = "LFC")]
    LFC,
    /// Equilibrium level
    #[strum(serialize = "EL")]
    EL,
    /// Convective condensation level
    #[strum(serialize = "CCL")]
    CCL,
    /// Convective available potential energy
    #[strum(serialize = "CAPE")]
    CAPE,
    /// Convective inhibition
    #[strum(serialize = "CIN")]
    CIN,
    /// Equivalent potential temperature
    #[strum(serialize = "θe")]
    ThetaE,
    /// Wet bulb temperature
    #[strum(serialize = "Tw")]
    WetBulb,
    /// Wet bulb potential temperature
    #[strum(serialize = "θw")]
    ThetaW,
    /// Lifted index
    #[strum(serialize = "Lifted Index")]
    LiftedIndex,
    /// K index
    #[strum(serialize = "K Index")]
    KIndex,
    /// Total totals index
    #[strum(serialize = "Total Totals Index")]
    TotalTotals,
    /// Showalter index
    #[strum(serialize = "Showalter Index")]
    Showalter,
}

impl Param {
    /// The category this parameter is reported in.
    pub fn category(self) -> ParamCategory {
        use self::Param::*;

        match self {
            LCL | LFC | EL | CCL => ParamCategory::Points,
            CAPE | CIN => ParamCategory::CapeCin,
            ThetaE | WetBulb | ThetaW => ParamCategory::Temperatures,
            LiftedIndex | KIndex | TotalTotals | Showalter => ParamCategory::Indices,
        }
    }
}

impl Field {
    /// The property name for this field in a sounding document.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Field::Pressure => "pressure",
            Field::Temperature => "temp",
            Field::DewPoint => "dewpoint",
            Field::GeopotentialHeight => "gpheight",
            Field::WindU => "wind_u",
            Field::WindV => "wind_v",
        }
    }

    /// The unit values of this field are stored in.
    #[inline]
    pub fn unit(self) -> Unit {
        match self {
            Field::Pressure => Unit::HectoPascal,
            Field::Temperature | Field::DewPoint => Unit::Kelvin,
            Field::GeopotentialHeight => Unit::Meters,
            Field::WindU | Field::WindV => Unit::Knots,
        }
    }
}

/// All the fields needed for a full plot, in the order they are usually requested.
pub const ALL_FIELDS: [&str; 6] = ["pressure", "temp", "dewpoint", "gpheight", "wind_u", "wind_v"];

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_names_round_trip() {
        for field in Field::iter() {
            assert_eq!(Field::from_str(field.name()).unwrap(), field);
            assert_eq!(field.as_ref(), field.name());
        }

        assert!(Field::from_str("relative_humidity").is_err());
    }

    #[test]
    fn test_all_fields_are_known() {
        assert_eq!(Field::iter().count(), ALL_FIELDS.len());
        assert!(ALL_FIELDS.iter().all(|name| Field::from_str(name).is_ok()));
    }

    #[test]
    fn test_units() {
        assert_eq!(Field::Pressure.unit(), Unit::HectoPascal);
        assert_eq!(Field::Temperature.unit(), Unit::Kelvin);
        assert_eq!(Field::DewPoint.unit(), Unit::Kelvin);
        assert_eq!(Field::GeopotentialHeight.unit(), Unit::Meters);
        assert_eq!(Field::WindU.unit().as_ref(), "kt");
    }

    #[test]
    fn test_params_grouped_in_order() {
        // Parameters of one category are contiguous and categories come in display order.
        let cats: Vec<ParamCategory> = Param::iter().map(Param::category).collect();
        assert!(cats.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(cats.first(), Some(&ParamCategory::Points));
        assert_eq!(cats.last(), Some(&ParamCategory::Indices));

        assert_eq!(Param::ThetaE.as_ref(), "θe");
        assert_eq!(Param::TotalTotals.as_ref(), "Total Totals Index");
        assert_eq!(ParamCategory::CapeCin.as_ref(), "cape_cin");
        assert_eq!(ParamCategory::from_str("indices").unwrap(), ParamCategory::Indices);
    }
}
