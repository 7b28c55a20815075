//! Data type and methods for building and describing the derived parameters of a sounding.
use crate::{
    error::Result,
    indexes::{k_index, lifted_index, showalter, total_totals},
    keys::{Param, ParamCategory, Unit},
    parcel::surface_parcel,
    parcel_profile::{convective_condensation_level, lift_parcel, ParcelProfile},
    units::UnitTaggedSeries,
};
use itertools::izip;
use log::{debug, info, warn};
use metfor::{self, HectoPascal, JpKg, Kelvin};
use optional::{none, some, Optioned};
use std::collections::BTreeMap;

/// The value of a derived parameter.
///
/// Missing values, like the LFC of a stable sounding, are stored as `none()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// A point on the diagram.
    Point {
        /// Pressure of the point.
        pressure: Optioned<HectoPascal>,
        /// Temperature at the point.
        temperature: Optioned<Kelvin>,
    },
    /// Convective energy.
    Energy(Optioned<JpKg>),
    /// A temperature at the surface.
    Temperature(Optioned<Kelvin>),
    /// A dimensionless index.
    Index(Optioned<f64>),
}

impl ParamValue {
    /// The units of the value, pressure before temperature for points.
    pub fn units(&self) -> &'static [Unit] {
        match self {
            ParamValue::Point { .. } => &[Unit::HectoPascal, Unit::Kelvin],
            ParamValue::Energy(_) => &[Unit::JoulesPerKilogram],
            ParamValue::Temperature(_) => &[Unit::Kelvin],
            ParamValue::Index(_) => &[],
        }
    }

    /// True if the value, or any part of it, is missing.
    pub fn is_missing(&self) -> bool {
        match self {
            ParamValue::Point {
                pressure,
                temperature,
            } => pressure.is_none() || temperature.is_none(),
            ParamValue::Energy(val) => val.is_none(),
            ParamValue::Temperature(val) => val.is_none(),
            ParamValue::Index(val) => val.is_none(),
        }
    }

    fn point(pnt: Option<(HectoPascal, Kelvin)>) -> Self {
        let (pressure, temperature) = pnt
            .map(|(p, t)| (some(p), some(t)))
            .unwrap_or((none(), none()));

        ParamValue::Point {
            pressure,
            temperature,
        }
    }
}

/// Convenient package for the derived parameters and the profiles needed to plot them.
#[derive(Debug, Clone, Default)]
pub struct DerivedParameters {
    values: BTreeMap<Param, ParamValue>,

    parcel_profile: ParcelProfile,
    theta_e: Vec<Optioned<Kelvin>>,
    wet_bulb: Vec<Optioned<Kelvin>>,
    theta_w: Vec<Optioned<Kelvin>>,
}

impl DerivedParameters {
    /// Create a new, empty, `DerivedParameters`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn with_param(mut self, param: Param, value: ParamValue) -> Self {
        self.values.insert(param, value);
        self
    }

    /// Set the surface parcel profile.
    pub fn with_parcel_profile(self, parcel_profile: ParcelProfile) -> Self {
        DerivedParameters {
            parcel_profile,
            ..self
        }
    }

    /// Set the equivalent potential temperature, wet bulb, and wet bulb potential temperature
    /// profiles.
    pub fn with_temperature_profiles(
        self,
        theta_e: Vec<Optioned<Kelvin>>,
        wet_bulb: Vec<Optioned<Kelvin>>,
        theta_w: Vec<Optioned<Kelvin>>,
    ) -> Self {
        DerivedParameters {
            theta_e,
            wet_bulb,
            theta_w,
            ..self
        }
    }

    /// Get a value, `None` if it was never set.
    pub fn get(&self, param: Param) -> Option<&ParamValue> {
        self.values.get(&param)
    }

    /// Iterate over the parameters of a category in display order.
    pub fn category(&self, cat: ParamCategory) -> impl Iterator<Item = (Param, &ParamValue)> {
        self.values
            .iter()
            .filter(move |(param, _)| param.category() == cat)
            .map(|(&param, val)| (param, val))
    }

    /// Iterate over all parameters in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Param, &ParamValue)> {
        self.values.iter().map(|(&param, val)| (param, val))
    }

    /// The surface parcel and environment profiles.
    #[inline]
    pub fn parcel_profile(&self) -> &ParcelProfile {
        &self.parcel_profile
    }

    /// Equivalent potential temperature at every sounding level.
    #[inline]
    pub fn theta_e_profile(&self) -> &[Optioned<Kelvin>] {
        &self.theta_e
    }

    /// Wet bulb temperature at every sounding level.
    #[inline]
    pub fn wet_bulb_profile(&self) -> &[Optioned<Kelvin>] {
        &self.wet_bulb
    }

    /// Wet bulb potential temperature at every sounding level.
    #[inline]
    pub fn theta_w_profile(&self) -> &[Optioned<Kelvin>] {
        &self.theta_w
    }
}

/// Derive all the parameters for a sounding.
///
/// The first sample is used as the surface parcel. Only missing pressure, temperature, or dew
/// point series are an error; a value that cannot be calculated is stored as missing.
pub fn derive_parameters(series: &UnitTaggedSeries) -> Result<DerivedParameters> {
    let pressure = series.pressure()?;
    let temperature = series.temperature()?;
    let dew_point = series.dew_point()?;

    let (theta_e, wet_bulb, theta_w) = temperature_profiles(&pressure, &temperature, &dew_point);
    let surface = |profile: &[Optioned<Kelvin>]| {
        ParamValue::Temperature(profile.first().copied().unwrap_or_else(none))
    };

    let mut params = DerivedParameters::new()
        .with_param(Param::ThetaE, surface(&theta_e))
        .with_param(Param::WetBulb, surface(&wet_bulb))
        .with_param(Param::ThetaW, surface(&theta_w))
        .with_temperature_profiles(theta_e, wet_bulb, theta_w);

    let parcel = surface_parcel(&pressure, &temperature, &dew_point)?;

    let ccl = convective_condensation_level(parcel, &pressure, &temperature)
        .map_err(|err| debug!("No CCL: {}", err))
        .ok();
    params = params.with_param(Param::CCL, ParamValue::point(ccl));

    let ascent = lift_parcel(parcel, &pressure, &temperature)
        .map_err(|err| warn!("Unable to lift the surface parcel: {}", err))
        .ok();

    let li = match ascent {
        Some(anal) => {
            let (lfc_p, lfc_t) = anal.lfc();
            let (el_p, el_t) = anal.el();

            let li = lifted_index(&pressure, &temperature, anal.profile()).ok();

            params = params
                .with_param(Param::LCL, ParamValue::point(Some(anal.lcl())))
                .with_param(
                    Param::LFC,
                    ParamValue::Point {
                        pressure: lfc_p,
                        temperature: lfc_t,
                    },
                )
                .with_param(
                    Param::EL,
                    ParamValue::Point {
                        pressure: el_p,
                        temperature: el_t,
                    },
                )
                .with_param(Param::CAPE, ParamValue::Energy(some(anal.cape())))
                .with_param(Param::CIN, ParamValue::Energy(some(anal.cin())))
                .with_parcel_profile(anal.profile().clone());

            li
        }
        None => {
            for &param in &[Param::LCL, Param::LFC, Param::EL] {
                params = params.with_param(param, ParamValue::point(None));
            }
            params = params
                .with_param(Param::CAPE, ParamValue::Energy(none()))
                .with_param(Param::CIN, ParamValue::Energy(none()));

            None
        }
    };

    let index = |val: Option<f64>| ParamValue::Index(Optioned::from(val));
    params = params
        .with_param(Param::LiftedIndex, index(li))
        .with_param(
            Param::KIndex,
            index(k_index(&pressure, &temperature, &dew_point).ok()),
        )
        .with_param(
            Param::TotalTotals,
            index(total_totals(&pressure, &temperature, &dew_point).ok()),
        )
        .with_param(
            Param::Showalter,
            index(showalter(&pressure, &temperature, &dew_point).ok()),
        );

    let missing = params.iter().filter(|(_, val)| val.is_missing()).count();
    info!(
        "Derived {} parameters, {} missing",
        params.values.len(),
        missing
    );

    Ok(params)
}

/// Equivalent potential temperature, wet bulb and wet bulb potential temperature profiles.
fn temperature_profiles(
    pressure: &[HectoPascal],
    temperature: &[Kelvin],
    dew_point: &[Kelvin],
) -> (
    Vec<Optioned<Kelvin>>,
    Vec<Optioned<Kelvin>>,
    Vec<Optioned<Kelvin>>,
) {
    let mut theta_e = Vec::with_capacity(pressure.len());
    let mut wet_bulb = Vec::with_capacity(pressure.len());
    let mut theta_w = Vec::with_capacity(pressure.len());

    for (&p, &t, &dp) in izip!(pressure, temperature, dew_point) {
        let th_e = metfor::equiv_pot_temperature(t, dp, p);

        theta_e.push(Optioned::from(th_e));
        wet_bulb.push(Optioned::from(metfor::wet_bulb(t, dp, p).map(Kelvin::from)));
        theta_w.push(Optioned::from(th_e.and_then(|th_e| {
            metfor::temperature_from_equiv_pot_temp_saturated_and_pressure(
                HectoPascal(1000.0),
                th_e,
            )
            .map(Kelvin::from)
        })));
    }

    (theta_e, wet_bulb, theta_w)
}
