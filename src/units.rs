//! Attach physical units to extracted series.
use crate::{
    error::{Result, SoundingError},
    extract::ExtractedSeries,
    keys::{Field, Unit},
};
use log::warn;
use metfor::{HectoPascal, Kelvin, Knots, Meters, WindUV};
use std::{collections::BTreeMap, str::FromStr};

/// A series of values with the unit they are measured in.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSeries {
    /// The unit of every value.
    pub unit: Unit,
    /// The values.
    pub values: Vec<f64>,
}

/// Series keyed by known field, each tagged with its unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTaggedSeries {
    series: BTreeMap<Field, TaggedSeries>,
    unrecognized: Vec<String>,
}

/// Tag every known field with its unit.
///
/// Field names that are not a [`Field`] are left out of the result and listed in
/// [`UnitTaggedSeries::unrecognized`].
pub fn tag(series: &ExtractedSeries) -> UnitTaggedSeries {
    let mut tagged = UnitTaggedSeries::default();

    for (name, vals) in series.iter() {
        match Field::from_str(name) {
            Ok(field) => {
                tagged.series.insert(
                    field,
                    TaggedSeries {
                        unit: field.unit(),
                        values: vals.to_vec(),
                    },
                );
            }
            Err(_) => {
                warn!("No unit known for field '{}', leaving it out", name);
                tagged.unrecognized.push(name.to_owned());
            }
        }
    }

    tagged
}

impl UnitTaggedSeries {
    /// Get a tagged series.
    #[inline]
    pub fn get(&self, field: Field) -> Option<&TaggedSeries> {
        self.series.get(&field)
    }

    /// Get the raw values of a field.
    #[inline]
    pub fn values(&self, field: Field) -> Option<&[f64]> {
        self.series.get(&field).map(|s| s.values.as_slice())
    }

    /// Names that were given to `tag` but have no known unit.
    #[inline]
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.series.values().next().map(|s| s.values.len()).unwrap_or(0)
    }

    /// True if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the units again, known fields only.
    pub fn strip(&self) -> ExtractedSeries {
        ExtractedSeries::from_columns(
            self.series
                .iter()
                .map(|(field, tagged)| (field.name(), tagged.values.clone())),
        )
    }

    fn required(&self, field: Field) -> Result<&[f64]> {
        self.values(field)
            .ok_or_else(|| SoundingError::MissingField(field.name()))
    }

    /// The pressure profile.
    pub fn pressure(&self) -> Result<Vec<HectoPascal>> {
        Ok(self.required(Field::Pressure)?.iter().copied().map(HectoPascal).collect())
    }

    /// The temperature profile.
    pub fn temperature(&self) -> Result<Vec<Kelvin>> {
        Ok(self.required(Field::Temperature)?.iter().copied().map(Kelvin).collect())
    }

    /// The dew point profile.
    pub fn dew_point(&self) -> Result<Vec<Kelvin>> {
        Ok(self.required(Field::DewPoint)?.iter().copied().map(Kelvin).collect())
    }

    /// The geopotential height profile.
    pub fn height(&self) -> Result<Vec<Meters>> {
        Ok(self
            .required(Field::GeopotentialHeight)?
            .iter()
            .copied()
            .map(Meters)
            .collect())
    }

    /// The wind profile as u-v components.
    pub fn wind(&self) -> Result<Vec<WindUV<Knots>>> {
        let u = self.required(Field::WindU)?;
        let v = self.required(Field::WindV)?;

        Ok(u.iter()
            .zip(v)
            .map(|(&u, &v)| WindUV {
                u: Knots(u),
                v: Knots(v),
            })
            .collect())
    }
}
