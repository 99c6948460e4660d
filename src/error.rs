//! Error types for the mazerl crate

use thiserror::Error;

use crate::maze::{Action, Coordinate};

/// Main error type for the mazerl crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("rewards do not have the correct shape: expected {expected_width}x{expected_height}, got {got}")]
    InvalidShape {
        expected_width: usize,
        expected_height: usize,
        got: String,
    },

    #[error("coordinate {coordinate} is out of range in a {width}x{height} maze")]
    OutOfBounds {
        coordinate: Coordinate,
        width: usize,
        height: usize,
    },

    #[error("action {action} from {from} leaves a {width}x{height} maze")]
    InvalidMove {
        from: Coordinate,
        action: Action,
        width: usize,
        height: usize,
    },

    #[error("state {state} not found in maze")]
    StateNotFound { state: String },

    #[error("non-terminal state {coordinate} has no available actions")]
    NoAvailableActions { coordinate: Coordinate },

    #[error("{name} = {value} must be in range [{min}, {max}]")]
    InvalidParameter {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("policy has no entry for state {coordinate}")]
    MissingPolicyEntry { coordinate: Coordinate },

    #[error("invalid policy glyph '{glyph}' at row {row}, column {column}")]
    InvalidPolicyGlyph {
        glyph: char,
        row: usize,
        column: usize,
    },

    #[error("value iteration did not converge after {sweeps} sweeps (delta {delta})")]
    NotConverged { sweeps: usize, delta: f64 },

    #[error("unknown scenario '{input}'. Expected one of: {expected}")]
    UnknownScenario { input: String, expected: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unsupported save format version {found} (expected {expected})")]
    UnsupportedSaveVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed navigation script: {message}")]
    NavScript { message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
