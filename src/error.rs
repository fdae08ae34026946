//! Error types for configuration and host interchange.

use thiserror::Error;

/// Errors raised while loading configuration or decoding host data.
///
/// The filter core itself never fails; these only surface at the edges.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed configuration JSON.
    #[error("failed to parse effect config: {0}")]
    Parse(#[from] serde_json::Error),

    /// No built-in preset with this name.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// Packed pose buffer has the wrong number of floats.
    #[error("packed pose buffer has {found} floats, expected {expected}")]
    PackedLength {
        /// Expected float count.
        expected: usize,
        /// Actual float count.
        found: usize,
    },
}
