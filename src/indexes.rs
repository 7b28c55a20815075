//! Stability indexes computed from mandatory pressure levels.
//!
//! Values at mandatory levels are interpolated linearly in the log of pressure. A level outside
//! the sounding is reported as `SoundingError::MissingValue`.
use crate::{
    error::{Result, SoundingError},
    interpolation::log_p_interpolate,
    parcel::pressure_parcel,
    parcel_profile::{lifted_parcel_temperature, ParcelProfile},
};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};

const P850: HectoPascal = HectoPascal(850.0);
const P700: HectoPascal = HectoPascal(700.0);
const P500: HectoPascal = HectoPascal(500.0);

fn value_at(pressure: &[HectoPascal], profile: &[Kelvin], target_p: HectoPascal) -> Result<f64> {
    log_p_interpolate(pressure, profile, target_p)
        .into_option()
        .map(|t| Celsius::from(t).unpack())
        .ok_or(SoundingError::MissingValue)
}

/// The K index, in °C.
///
/// (T850 - T500) + Td850 - (T700 - Td700)
pub fn k_index(pressure: &[HectoPascal], temperature: &[Kelvin], dew_point: &[Kelvin]) -> Result<f64> {
    let t850 = value_at(pressure, temperature, P850)?;
    let t700 = value_at(pressure, temperature, P700)?;
    let t500 = value_at(pressure, temperature, P500)?;
    let td850 = value_at(pressure, dew_point, P850)?;
    let td700 = value_at(pressure, dew_point, P700)?;

    Ok((t850 - t500) + td850 - (t700 - td700))
}

/// The Total Totals index.
///
/// (T850 - T500) + (Td850 - T500)
pub fn total_totals(
    pressure: &[HectoPascal],
    temperature: &[Kelvin],
    dew_point: &[Kelvin],
) -> Result<f64> {
    let t850 = value_at(pressure, temperature, P850)?;
    let t500 = value_at(pressure, temperature, P500)?;
    let td850 = value_at(pressure, dew_point, P850)?;

    Ok((t850 - t500) + (td850 - t500))
}

/// The lifted index, the environment minus the parcel temperature at 500 hPa.
pub fn lifted_index(pressure: &[HectoPascal], temperature: &[Kelvin], profile: &ParcelProfile) -> Result<f64> {
    let env_t500 = value_at(pressure, temperature, P500)?;
    let pcl_t500 = value_at(&profile.pressure, &profile.parcel_t, P500)?;

    Ok(env_t500 - pcl_t500)
}

/// The Showalter index, the lifted index of a parcel starting at 850 hPa.
pub fn showalter(pressure: &[HectoPascal], temperature: &[Kelvin], dew_point: &[Kelvin]) -> Result<f64> {
    let parcel = pressure_parcel(pressure, temperature, dew_point, P850)?;

    let env_t500 = value_at(pressure, temperature, P500)?;
    let pcl_t500 = Celsius::from(lifted_parcel_temperature(parcel, P500)?).unpack();

    Ok(env_t500 - pcl_t500)
}
