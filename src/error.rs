//! Error type shared by every stage of the codec.

use thiserror::Error;

/// Errors that abort an embed or extract call.
///
/// None of these are transient; every stage is deterministic given its inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AirglowError {
    /// The passphrase is empty after trimming whitespace.
    #[error("secret key cannot be empty")]
    EmptyKey,

    /// The secret does not fit into the top half of the carrier even once.
    #[error(
        "secret image is too large: use an image whose width <= {max_width} and height <= {max_height}"
    )]
    Geometry {
        /// Largest secret width the carrier accepts.
        max_width: u32,
        /// Largest secret height the carrier accepts.
        max_height: u32,
    },

    /// An input image has no pixels.
    #[error("the {0} image is empty")]
    EmptyImage(&'static str),

    /// Failure reported by the transform backend.
    #[error("transform failed: {0}")]
    Transform(String),

    /// Alpha must be finite and strictly positive.
    #[error("alpha must be a finite value > 0, got {0}")]
    InvalidAlpha(f32),

    /// At least one copy of the secret must be placed.
    #[error("repetition count must be at least 1")]
    InvalidRepetitions,

    /// A raster buffer does not hold `width * height * 4` samples.
    #[error("raster buffer holds {actual} samples, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// The permutation does not match the buffer it is applied to.
    #[error("invalid permutation: {0}")]
    Permutation(String),
}

pub type Result<T> = std::result::Result<T, AirglowError>;
