//! Functions for creating the parcels used in parcel analysis.
use crate::{
    error::{Result, SoundingError},
    interpolation::log_p_interpolate,
};
use metfor::{self, HectoPascal, Kelvin};

/// Variables defining a parcel as used in parcel analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcel {
    /// Temperature
    pub temperature: Kelvin,
    /// Pressure
    pub pressure: HectoPascal,
    /// Dew point
    pub dew_point: Kelvin,
}

impl Parcel {
    /// Get the potential temperature of the parcel.
    pub fn theta(&self) -> Kelvin {
        metfor::potential_temperature(self.pressure, self.temperature)
    }

    /// Get the equivalent potential temperature of the parcel.
    pub fn theta_e(&self) -> Result<Kelvin> {
        metfor::equiv_pot_temperature(self.temperature, self.dew_point, self.pressure)
            .ok_or(SoundingError::MetFor("equivalent potential temperature"))
    }

    /// Get the mixing ratio of the parcel.
    pub fn mixing_ratio(&self) -> Result<f64> {
        metfor::mixing_ratio(self.dew_point, self.pressure)
            .ok_or(SoundingError::MetFor("mixing ratio"))
    }

    /// Pressure and temperature at the lifting condensation level of the parcel.
    pub fn lcl(&self) -> Result<(HectoPascal, Kelvin)> {
        metfor::pressure_and_temperature_at_lcl(self.temperature, self.dew_point, self.pressure)
            .ok_or(SoundingError::MetFor("lifting condensation level"))
    }
}

/// Get a surface parcel, the first level of the profiles.
pub fn surface_parcel(
    pressure: &[HectoPascal],
    temperature: &[Kelvin],
    dew_point: &[Kelvin],
) -> Result<Parcel> {
    match (pressure.first(), temperature.first(), dew_point.first()) {
        (Some(&pressure), Some(&temperature), Some(&dew_point)) => Ok(Parcel {
            temperature,
            pressure,
            dew_point,
        }),
        _ => Err(SoundingError::MissingValue),
    }
}

/// Get a parcel at a given pressure level, interpolating the profiles if needed.
pub fn pressure_parcel(
    pressure: &[HectoPascal],
    temperature: &[Kelvin],
    dew_point: &[Kelvin],
    target_p: HectoPascal,
) -> Result<Parcel> {
    let temperature = log_p_interpolate(pressure, temperature, target_p)
        .into_option()
        .ok_or(SoundingError::MissingValue)?;
    let dew_point = log_p_interpolate(pressure, dew_point, target_p)
        .into_option()
        .ok_or(SoundingError::MissingValue)?;

    Ok(Parcel {
        temperature,
        pressure: target_p,
        dew_point,
    })
}
