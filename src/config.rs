//! Options shared by embedding and extraction.

use crate::error::{AirglowError, Result};

/// Parameters of a single embed or extract call.
///
/// The same `secret_key` and `alpha` must be used for both directions.
#[derive(Clone, Debug, PartialEq)]
pub struct AirglowOptions {
    /// Passphrase seeding the permutation, surrounding whitespace is ignored.
    pub secret_key: String,
    /// Strength of the watermark in the mix.
    pub alpha: f32,
    /// Number of copies of the secret to place, capped by what fits into the carrier.
    pub repetitions: usize,
    /// Blur the secret before tiling it.
    pub smoothing: bool,
}

impl Default for AirglowOptions {
    /// An empty key, which must be replaced, alpha of 0.05 and a single smoothed copy.
    fn default() -> Self {
        AirglowOptions {
            secret_key: String::new(),
            alpha: 0.05,
            repetitions: 1,
            smoothing: true,
        }
    }
}

impl AirglowOptions {
    /// Default options with the given passphrase.
    pub fn new(secret_key: impl Into<String>) -> Self {
        AirglowOptions {
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// The passphrase as used for seeding.
    pub fn key(&self) -> &str {
        self.secret_key.trim()
    }

    /// Check the passphrase and alpha, the parts needed by both directions.
    pub fn validate_key_and_alpha(&self) -> Result<()> {
        if self.key().is_empty() {
            return Err(AirglowError::EmptyKey);
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(AirglowError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }

    /// Check everything needed for embedding.
    pub fn validate(&self) -> Result<()> {
        self.validate_key_and_alpha()?;
        if self.repetitions == 0 {
            return Err(AirglowError::InvalidRepetitions);
        }
        Ok(())
    }
}
