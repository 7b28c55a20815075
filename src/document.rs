//! Loading JSON documents and the sounding document structure.
use crate::error::{Result, SoundingError};
use log::debug;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

/// A sounding as a collection of feature records, one per level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoundingDocument {
    /// Feature records in file order.
    pub features: Vec<Feature>,
}

/// One level of the sounding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    /// Named values at this level. Values are usually numbers, but numeric strings and nulls
    /// show up in some sources.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Feature {
    /// Get a property as a number.
    ///
    /// Returns `None` if the property is absent, null, or not something that parses as a finite
    /// number. Strings like `"NaN"` or `"inf"` count as missing.
    pub fn number(&self, name: &str) -> Option<f64> {
        let val = match self.properties.get(name)? {
            Value::Number(num) => num.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };

        val.filter(|val| val.is_finite())
    }
}

/// Load and parse a JSON file.
///
/// A missing file is reported as [`SoundingError::NotFound`] so it can be told apart from a file
/// that exists but is unreadable or malformed.
pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => SoundingError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SoundingError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    })?;

    let parsed = serde_json::from_reader(BufReader::new(file)).map_err(|err| {
        SoundingError::Parse {
            path: path.to_path_buf(),
            source: err,
        }
    })?;

    debug!("Loaded {}", path.display());
    Ok(parsed)
}

/// Load a sounding document from a file.
#[inline]
pub fn load<P: AsRef<Path>>(path: P) -> Result<SoundingDocument> {
    load_json(path)
}

impl SoundingDocument {
    /// Build a document from any JSON value already in memory.
    pub fn from_value(value: Value) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
