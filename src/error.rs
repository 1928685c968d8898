//! Cell-specific error types.
//!
//! Only precondition violations surface as errors: a malformed spawn volume or
//! an out-of-range tuning value.  Degenerate geometry during migration (a
//! bubble sitting exactly on its electrode) is handled locally by the engine
//! and never reaches the caller.

use std::fmt;

/// Top-level error enum for the electrocell simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum CellError {
    /// A spawn volume axis has zero or negative extent.
    DegenerateVolume {
        /// Axis name (`"x"`, `"y"` or `"z"`).
        axis: &'static str,
        min: f32,
        max: f32,
    },

    /// A spawn volume bound is NaN or infinite.
    NonFiniteVolume,

    /// Config value is outside its validated range.
    InvalidConstant {
        /// Name of the config key (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        safe_range: &'static str,
    },

    /// `cell.toml` could not be parsed.
    ConfigParse(String),
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::DegenerateVolume { axis, min, max } => write!(
                f,
                "spawn volume has no extent on the {} axis (min {}, max {})",
                axis, min, max
            ),
            CellError::NonFiniteVolume => {
                write!(f, "spawn volume bounds must be finite")
            }
            CellError::InvalidConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "config '{}' = {} is outside accepted range {}",
                name, value, safe_range
            ),
            CellError::ConfigParse(msg) => write!(f, "failed to parse cell config: {}", msg),
        }
    }
}

impl std::error::Error for CellError {}

impl From<toml::de::Error> for CellError {
    fn from(err: toml::de::Error) -> Self {
        CellError::ConfigParse(err.to_string())
    }
}

/// Convenience alias: a `Result` using `CellError` as the error type.
pub type CellResult<T> = Result<T, CellError>;
