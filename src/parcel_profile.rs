//! Create and analyze a profile from lifting a parcel.
use crate::{
    error::{Result, SoundingError},
    interpolation::{crossing, log_p_interpolate},
    parcel::Parcel,
};
use itertools::{izip, Itertools};
use metfor::{self, HectoPascal, JpKg, Kelvin, Quantity};
use optional::{none, some, Optioned};
use std::cmp::Ordering;

/// Gas constant for dry air (J kg-1 K-1).
const RD: f64 = 287.04;

/// Hold profiles for a parcel and its environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelProfile {
    /// Pressure profile
    pub pressure: Vec<HectoPascal>,
    /// Parcel temperature profile
    pub parcel_t: Vec<Kelvin>,
    /// Environment temperature profile
    pub environment_t: Vec<Kelvin>,
}

/// Parcel analysis, this is a way to package the analysis of a parcel.
#[derive(Debug, Clone)]
pub struct ParcelAscentAnalysis {
    parcel: Parcel,
    profile: ParcelProfile,

    lcl_pressure: HectoPascal,
    lcl_temperature: Kelvin,
    lfc_pressure: Optioned<HectoPascal>,
    lfc_temperature: Optioned<Kelvin>,
    el_pressure: Optioned<HectoPascal>,
    el_temperature: Optioned<Kelvin>,
    cape: JpKg,
    cin: JpKg,
}

impl ParcelAscentAnalysis {
    /// Get the parcel that was lifted.
    #[inline]
    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    /// Get the parcel and environment profiles.
    #[inline]
    pub fn profile(&self) -> &ParcelProfile {
        &self.profile
    }

    /// Pressure and temperature at the lifting condensation level.
    #[inline]
    pub fn lcl(&self) -> (HectoPascal, Kelvin) {
        (self.lcl_pressure, self.lcl_temperature)
    }

    /// Pressure and temperature at the level of free convection.
    #[inline]
    pub fn lfc(&self) -> (Optioned<HectoPascal>, Optioned<Kelvin>) {
        (self.lfc_pressure, self.lfc_temperature)
    }

    /// Pressure and temperature at the equilibrium level.
    #[inline]
    pub fn el(&self) -> (Optioned<HectoPascal>, Optioned<Kelvin>) {
        (self.el_pressure, self.el_temperature)
    }

    /// Convective available potential energy, zero when there is no LFC.
    #[inline]
    pub fn cape(&self) -> JpKg {
        self.cape
    }

    /// Convective inhibition, never positive.
    #[inline]
    pub fn cin(&self) -> JpKg {
        self.cin
    }
}

// A level in the analysis.
#[derive(Clone, Copy, Debug)]
struct AnalLevel {
    pressure: HectoPascal,
    pcl_t: Kelvin,
    env_t: Kelvin,
}

impl AnalLevel {
    // Parcel minus environment temperature.
    #[inline]
    fn buoyancy(&self) -> f64 {
        self.pcl_t.unpack() - self.env_t.unpack()
    }
}

/// Lift a parcel through the environment.
///
/// The parcel follows a dry adiabat up to its LCL and a pseudo-adiabat of constant equivalent
/// potential temperature above it. The profile has every environment level at or above the
/// parcel, with the LCL inserted.
pub fn lift_parcel(
    parcel: Parcel,
    pressure: &[HectoPascal],
    env_t: &[Kelvin],
) -> Result<ParcelAscentAnalysis> {
    let (lcl_pressure, lcl_temperature) = parcel.lcl()?;
    let parcel_calc_t = create_parcel_calc_t(parcel, lcl_pressure)?;

    let mut levels: Vec<AnalLevel> = izip!(pressure, env_t)
        .filter(|(&p, _)| p <= parcel.pressure)
        .filter_map(|(&p, &env_t)| {
            parcel_calc_t(p).map(|pcl_t| AnalLevel {
                pressure: p,
                pcl_t,
                env_t,
            })
        })
        .collect();

    if levels.len() < 2 {
        return Err(SoundingError::MissingValue);
    }

    // Insert the LCL, if it is inside the sounding.
    if let Some(lcl_env_t) = log_p_interpolate(pressure, env_t, lcl_pressure).into_option() {
        let lcl_level = AnalLevel {
            pressure: lcl_pressure,
            pcl_t: lcl_temperature,
            env_t: lcl_env_t,
        };

        let idx = levels
            .iter()
            .position(|lvl| lvl.pressure <= lcl_pressure)
            .unwrap_or_else(|| levels.len());
        if levels
            .get(idx)
            .map(|lvl| lvl.pressure != lcl_pressure)
            .unwrap_or(true)
        {
            levels.insert(idx, lcl_level);
        }
    }

    let (lfc, el) = find_lfc_el(&levels, lcl_pressure);

    let (lfc_pressure, lfc_temperature) = lfc
        .map(|(p, t)| (some(p), some(t)))
        .unwrap_or((none(), none()));
    let (el_pressure, el_temperature) = el
        .map(|(p, t)| (some(p), some(t)))
        .unwrap_or((none(), none()));

    let (cape, cin) = cape_cin(&levels, lfc_pressure, el_pressure);

    let profile = ParcelProfile {
        pressure: levels.iter().map(|lvl| lvl.pressure).collect(),
        parcel_t: levels.iter().map(|lvl| lvl.pcl_t).collect(),
        environment_t: levels.iter().map(|lvl| lvl.env_t).collect(),
    };

    Ok(ParcelAscentAnalysis {
        parcel,
        profile,
        lcl_pressure,
        lcl_temperature,
        lfc_pressure,
        lfc_temperature,
        el_pressure,
        el_temperature,
        cape,
        cin,
    })
}

/// Get the temperature of a lifted parcel at a pressure level.
///
/// Fails if the parcel cannot be lifted to that level.
pub fn lifted_parcel_temperature(parcel: Parcel, target_p: HectoPascal) -> Result<Kelvin> {
    let (lcl_pressure, _) = parcel.lcl()?;
    let parcel_calc_t = create_parcel_calc_t(parcel, lcl_pressure)?;

    parcel_calc_t(target_p).ok_or(SoundingError::MetFor("lifted parcel temperature"))
}

/// Find the convective condensation level.
///
/// This is where the environmental temperature first meets the constant mixing ratio line
/// through the parcel dew point.
pub fn convective_condensation_level(
    parcel: Parcel,
    pressure: &[HectoPascal],
    env_t: &[Kelvin],
) -> Result<(HectoPascal, Kelvin)> {
    let mw = parcel.mixing_ratio()?;

    let levels: Vec<(HectoPascal, f64, Kelvin)> = izip!(pressure, env_t)
        .filter(|(&p, _)| p <= parcel.pressure)
        .filter_map(|(&p, &t)| {
            metfor::dew_point_from_p_and_mw(p, mw)
                .map(|dp| (p, t.unpack() - Kelvin::from(dp).unpack(), t))
        })
        .collect();

    match levels.first() {
        Some(&(p, diff, t)) if diff <= 0.0 => return Ok((p, t)),
        None => return Err(SoundingError::MissingValue),
        _ => {}
    }

    levels
        .iter()
        .tuple_windows::<(_, _)>()
        .find(|((_, d0, _), (_, d1, _))| *d0 > 0.0 && *d1 <= 0.0)
        .map(|(&(p0, d0, t0), &(p1, d1, t1))| {
            let (p, t) = crossing(
                (p0.unpack(), d0, t0.unpack()),
                (p1.unpack(), d1, t1.unpack()),
            );
            (HectoPascal(p), Kelvin(t))
        })
        .ok_or(SoundingError::MissingValue)
}

fn create_parcel_calc_t(
    parcel: Parcel,
    lcl_pressure: HectoPascal,
) -> Result<impl Fn(HectoPascal) -> Option<Kelvin>> {
    let theta = parcel.theta();
    let theta_e = parcel.theta_e()?;

    Ok(move |tgt_pres: HectoPascal| {
        if tgt_pres > lcl_pressure {
            // Dry adiabatic lifting
            Some(metfor::temperature_from_pot_temp(theta, tgt_pres))
        } else {
            // Moist adiabatic lifting
            metfor::temperature_from_equiv_pot_temp_saturated_and_pressure(tgt_pres, theta_e)
                .map(Kelvin::from)
        }
    })
}

// The LFC is the lowest level at or above the LCL where the parcel becomes warmer than the
// environment; the EL is the highest level above the LFC where it becomes cooler again.
fn find_lfc_el(
    levels: &[AnalLevel],
    lcl_pressure: HectoPascal,
) -> (Option<(HectoPascal, Kelvin)>, Option<(HectoPascal, Kelvin)>) {
    let cloud_layer: Vec<&AnalLevel> = levels
        .iter()
        .filter(|lvl| lvl.pressure <= lcl_pressure)
        .collect();

    let start = match cloud_layer.first() {
        Some(lvl) if lvl.buoyancy() > 0.0 => Some((lvl.pressure, lvl.pcl_t)),
        _ => None,
    };

    cloud_layer
        .iter()
        .tuple_windows::<(_, _)>()
        .fold((start, None), |(lfc, el), (lvl0, lvl1)| {
            let (b0, b1) = (lvl0.buoyancy(), lvl1.buoyancy());

            let cross = || {
                let (p, t) = crossing(
                    (lvl0.pressure.unpack(), b0, lvl0.env_t.unpack()),
                    (lvl1.pressure.unpack(), b1, lvl1.env_t.unpack()),
                );
                (HectoPascal(p), Kelvin(t))
            };

            if b0 <= 0.0 && b1 > 0.0 && lfc.is_none() {
                (Some(cross()), el)
            } else if b0 > 0.0 && b1 <= 0.0 && lfc.is_some() {
                (lfc, Some(cross()))
            } else {
                (lfc, el)
            }
        })
}

// Integrate Rd * (Tp - Te) d ln(p). Positive area between the LFC and EL is CAPE, negative
// area below the LFC is CIN.
fn cape_cin(
    levels: &[AnalLevel],
    lfc: Optioned<HectoPascal>,
    el: Optioned<HectoPascal>,
) -> (JpKg, JpKg) {
    let lfc = match lfc.into_option() {
        Some(lfc) => lfc.unpack(),
        None => return (JpKg(0.0), JpKg(0.0)),
    };
    let el = el.into_option().map(|el| el.unpack()).unwrap_or(0.0);

    let (cape, cin) = levels
        .iter()
        .map(|lvl| (lvl.pressure.unpack(), lvl.buoyancy()))
        .tuple_windows::<(_, _)>()
        // Split layers where the buoyancy changes sign.
        .flat_map(|((p0, b0), (p1, b1))| {
            if b0 * b1 < 0.0 {
                let (pc, _) = crossing((p0, b0, 0.0), (p1, b1, 0.0));
                vec![((p0, b0), (pc, 0.0)), ((pc, 0.0), (p1, b1))]
            } else {
                vec![((p0, b0), (p1, b1))]
            }
        })
        .fold((0.0, 0.0), |(cape, cin), ((p0, b0), (p1, b1))| {
            let area = RD * 0.5 * (b0 + b1) * (p0.ln() - p1.ln());
            let p_mid = (0.5 * (p0.ln() + p1.ln())).exp();

            match area.partial_cmp(&0.0) {
                Some(Ordering::Greater) if p_mid <= lfc && p_mid >= el => (cape + area, cin),
                Some(Ordering::Less) if p_mid > lfc => (cape, cin + area),
                _ => (cape, cin),
            }
        });

    (JpKg(cape), JpKg(cin))
}
