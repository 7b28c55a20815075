//! Error types for the sounding-plot crate.
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the crate.
#[derive(Debug, Error)]
pub enum SoundingError {
    /// A configuration or sounding file does not exist.
    #[error("File '{}' not found. Terminating program.", path.display())]
    NotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("Failed to read '{}'", path.display())]
    Io {
        /// The path that was attempted.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid JSON for the expected structure.
    #[error("Failed to parse '{}': {source}", path.display())]
    Parse {
        /// The path that was parsed.
        path: PathBuf,
        /// The underlying parser failure.
        #[source]
        source: serde_json::Error,
    },

    /// Not enough data survived extraction to make a plot.
    #[error("Too few data points or mismatched lengths: {0}")]
    InsufficientData(DataShortfall),

    /// A field required for the analysis was not extracted.
    #[error("Missing field '{0}' required for analysis.")]
    MissingField(&'static str),

    /// A thermodynamic calculation from the metfor crate had no solution.
    #[error("Thermodynamic calculation failed: {0}")]
    MetFor(&'static str),

    /// A value required for the analysis is not available.
    #[error("Missing value required for analysis.")]
    MissingValue,

    /// The configuration is readable but its values cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The plotting backend failed.
    #[error("Failed to render '{}': {message}", path.display())]
    Render {
        /// Where the chart was being written.
        path: PathBuf,
        /// Backend error description.
        message: String,
    },
}

/// Details of why a dataset failed the minimum sample checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataShortfall {
    /// No fields were requested, so there is nothing to check.
    #[error("no fields requested")]
    NoFields,
    /// A field has fewer values than required.
    #[error("field '{field}' has {found} points, at least {required} required")]
    TooFewPoints {
        /// Name of the short field.
        field: String,
        /// Number of values found.
        found: usize,
        /// Number of values required.
        required: usize,
    },
    /// Two fields ended up with different lengths.
    #[error("field '{field}' has {len} points but other fields have {expected}")]
    MismatchedLengths {
        /// Name of the field that disagrees with the first field.
        field: String,
        /// Its length.
        len: usize,
        /// Length of the first field.
        expected: usize,
    },
}

impl SoundingError {
    /// True for the error kinds a user is expected to correct by supplying other input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            SoundingError::NotFound { .. }
                | SoundingError::InsufficientData(_)
                | SoundingError::InvalidConfig(_)
        )
    }
}

/// Shorthand for results.
pub type Result<T> = ::std::result::Result<T, SoundingError>;
