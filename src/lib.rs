//! Hide a secret image inside a carrier image by mixing it into the carrier's frequency domain.
//!
//! The secret is tiled over the top half of a carrier sized canvas, scattered with a permutation
//! derived from a passphrase and added to the carrier's spectrum with strength `alpha`. Extraction
//! requires the original carrier, the passphrase and the same `alpha`.
//!
//! ```no_run
//! use airglow::{embed, extract, AirglowOptions, NoProgress, PixelRaster};
//!
//! let carrier = PixelRaster::filled(64, 64, [10, 10, 10, 255]);
//! let secret = PixelRaster::filled(8, 8, [200, 0, 0, 255]);
//! let options = AirglowOptions::new("passphrase").alpha(0.2);
//!
//! let marked = embed(&carrier, &secret, &options, &mut NoProgress)?;
//! let recovered = extract(&carrier, &marked, &options, &mut NoProgress)?;
//! # Ok::<(), airglow::AirglowError>(())
//! ```

pub mod algorithm;
pub mod config;
pub mod dct2d;
pub mod error;
pub mod fft2d;
pub mod permute;
pub mod prng;
pub mod progress;
pub mod raster;
pub mod tile;
pub mod transform;
pub mod util;

// expose the traits in the prelude.
pub mod prelude {
    pub use crate::progress::Progress;
    pub use crate::transform::Transform;
}

// Export the public components from the algorithm here.
pub use algorithm::{embed, extract};
pub use algorithm::{Reader, Writer};
pub use algorithm::{Difference, Tester};
pub use config::AirglowOptions;
pub use error::{AirglowError, Result};
pub use prng::{Prng, PrngState, Seed};
pub use progress::{NoProgress, Progress, Severity};
pub use raster::PixelRaster;
pub use transform::{DctTransform, FftTransform, SpectralImage, Transform};

// Coefficient type of the transforms.
pub use rustfft::num_complex::Complex;
