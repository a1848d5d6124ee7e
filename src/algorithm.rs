//! Contains the actual logic that ties everything together.
//!
//! The main steps in embedding are:
//! - Tile the secret over the top half of a carrier sized canvas.
//! - Scatter the canvas with the permutation seeded by the passphrase, mirroring every pixel.
//! - Compute the 2D transform of the color channels of both the carrier and the canvas.
//! - Mix the coefficients; x_i' = x_i + alpha * w_i.
//! - Perform the inverse transform using the mixed coefficients and quantize to 8 bits.
//!
//! Extraction needs the original carrier and the passphrase:
//! - Resample the watermarked image to the carrier size if it was resized.
//! - Compute the 2D transform of both.
//! - Unmix the coefficients; w_i = (x_i' - x_i) / alpha.
//! - Perform the inverse transform and gather the scattered pixels back into the tiled layout.
//!
//! The alpha channel never enters the transform. Embedding keeps the carrier's alpha, extraction
//! produces an opaque image.

use rustfft::num_complex::Complex;

use crate::config::AirglowOptions;
use crate::error::{AirglowError, Result};
use crate::permute;
use crate::progress::{Progress, Reporter, Stage};
use crate::raster::{PixelRaster, COLOR_CHANNELS};
use crate::tile;
use crate::transform::{FftTransform, SpectralImage, Transform};

/// Mix a watermark into coefficients in place; x_i' = x_i + alpha * w_i.
///
/// Panics if the lengths differ.
pub fn mix_coefficients(coefficients: &mut [Complex<f32>], watermark: &[Complex<f32>], alpha: f32) {
    assert_eq!(coefficients.len(), watermark.len());
    for (c, w) in coefficients.iter_mut().zip(watermark.iter()) {
        *c += *w * alpha;
    }
}

/// Recover the watermark from base and derived coefficients; w_i = (x_i' - x_i) / alpha.
///
/// Panics if the lengths of the three slices differ.
pub fn unmix_coefficients(
    base_coefficients: &[Complex<f32>],
    derived_coefficients: &[Complex<f32>],
    alpha: f32,
    extracted: &mut [Complex<f32>],
) {
    if derived_coefficients.len() != base_coefficients.len() {
        panic!("Derived coefficient length not equal to base coefficient length.");
    }
    assert_eq!(extracted.len(), base_coefficients.len());
    for ((out, base), derived) in extracted
        .iter_mut()
        .zip(base_coefficients.iter())
        .zip(derived_coefficients.iter())
    {
        *out = (derived - base) / alpha;
    }
}

fn check_same_size(a: &SpectralImage, b: &SpectralImage) -> Result<()> {
    let (expected, actual) = (
        a.width() as usize * a.height() as usize,
        b.width() as usize * b.height() as usize,
    );
    if (a.width(), a.height()) != (b.width(), b.height()) {
        return Err(AirglowError::BufferSize { expected, actual });
    }
    Ok(())
}

/// Mix the watermark spectrum into the carrier spectrum, keeping the carrier's alpha channel.
pub fn mix(carrier: &SpectralImage, watermark: &SpectralImage, alpha: f32) -> Result<SpectralImage> {
    check_same_size(carrier, watermark)?;
    let mut channels = carrier.channels().clone();
    for (c, w) in channels.iter_mut().zip(watermark.channels().iter()) {
        mix_coefficients(c, w, alpha);
    }
    SpectralImage::from_parts(
        carrier.width(),
        carrier.height(),
        channels,
        carrier.alpha().to_vec(),
    )
}

/// Separate the watermark spectrum from an encoded spectrum, the result is opaque.
pub fn unmix(carrier: &SpectralImage, encoded: &SpectralImage, alpha: f32) -> Result<SpectralImage> {
    check_same_size(carrier, encoded)?;
    let count = carrier.width() as usize * carrier.height() as usize;
    let mut channels: [Vec<Complex<f32>>; COLOR_CHANNELS] = Default::default();
    for (c, out) in channels.iter_mut().enumerate() {
        out.resize(count, Complex::new(0.0, 0.0));
        unmix_coefficients(carrier.channel(c), encoded.channel(c), alpha, out);
    }
    SpectralImage::from_parts(carrier.width(), carrier.height(), channels, vec![255; count])
}

/// Writer to embed a secret image into a carrier.
pub struct Writer {
    carrier: PixelRaster,
    options: AirglowOptions,
    transform: Box<dyn Transform>,
}

impl Writer {
    /// Create a writer using the FFT backend.
    pub fn new(carrier: PixelRaster, options: AirglowOptions) -> Self {
        Writer::with_transform(carrier, options, Box::new(FftTransform::new()))
    }

    /// Create a writer with a specific transform backend.
    pub fn with_transform(
        carrier: PixelRaster,
        options: AirglowOptions,
        transform: Box<dyn Transform>,
    ) -> Self {
        Writer {
            carrier,
            options,
            transform,
        }
    }

    pub fn carrier(&self) -> &PixelRaster {
        &self.carrier
    }

    /// How many copies of `secret` fit into this carrier.
    pub fn max_repetitions(&self, secret: &PixelRaster) -> usize {
        tile::max_repetitions(
            self.carrier.width(),
            self.carrier.height(),
            secret.width(),
            secret.height(),
        )
    }

    /// Build the scattered watermark raster, without mixing it into the carrier.
    ///
    /// This is useful to inspect what ends up in the frequency domain. Usually, it is better to
    /// use the [`Writer::mark`] method instead.
    pub fn watermark(&self, secret: &PixelRaster) -> Result<PixelRaster> {
        self.options.validate()?;
        tile::build(
            self.carrier.width(),
            self.carrier.height(),
            secret,
            self.options.repetitions,
            self.options.smoothing,
            self.options.key(),
        )
    }

    /// Consume the writer, embedding `secret` and returning the watermarked image.
    pub fn mark(mut self, secret: &PixelRaster, progress: &mut dyn Progress) -> Result<PixelRaster> {
        let mut reporter = Reporter::new(progress);
        reporter.stage(Stage::Initializing);
        let result = self.mark_impl(secret, &mut reporter);
        match &result {
            Ok(_) => reporter.stage(Stage::Finished),
            Err(e) => reporter.fail(e),
        }
        result
    }

    fn mark_impl(&mut self, secret: &PixelRaster, reporter: &mut Reporter) -> Result<PixelRaster> {
        self.options.validate()?;
        if self.carrier.pixel_count() == 0 {
            return Err(AirglowError::EmptyImage("carrier"));
        }

        reporter.stage(Stage::MakingWatermarks);
        let watermark = self.watermark(secret)?;

        reporter.stage(Stage::CarrierSpectrum);
        let carrier = SpectralImage::forward(self.transform.as_mut(), &self.carrier)?;

        reporter.stage(Stage::WatermarkSpectrum);
        let watermark = SpectralImage::forward(self.transform.as_mut(), &watermark)?;

        reporter.stage(Stage::EncodedSpectrum);
        let encoded = mix(&carrier, &watermark, self.options.alpha)?;

        reporter.stage(Stage::EncodedImage);
        let result = encoded.inverse(self.transform.as_mut())?;
        tracing::info!(
            width = result.width(),
            height = result.height(),
            alpha = self.options.alpha,
            "embedded watermark"
        );
        Ok(result)
    }
}

/// Reader to extract a secret, holding the original carrier as base.
pub struct Reader {
    carrier: PixelRaster,
    options: AirglowOptions,
    transform: Box<dyn Transform>,
    base: Option<SpectralImage>,
}

impl Reader {
    /// Create a reader using the FFT backend.
    pub fn new(carrier: PixelRaster, options: AirglowOptions) -> Self {
        Reader::with_transform(carrier, options, Box::new(FftTransform::new()))
    }

    /// Create a reader with a specific transform backend, it must match the one used to embed.
    pub fn with_transform(
        carrier: PixelRaster,
        options: AirglowOptions,
        transform: Box<dyn Transform>,
    ) -> Self {
        Reader {
            carrier,
            options,
            transform,
            base: None,
        }
    }

    pub fn carrier(&self) -> &PixelRaster {
        &self.carrier
    }

    /// Extract the tiled secret from a watermarked image.
    ///
    /// The carrier spectrum is computed on the first call and reused by later ones.
    pub fn extract(
        &mut self,
        watermarked: &PixelRaster,
        progress: &mut dyn Progress,
    ) -> Result<PixelRaster> {
        let mut reporter = Reporter::new(progress);
        reporter.stage(Stage::Initializing);
        let result = self.extract_impl(watermarked, &mut reporter);
        match &result {
            Ok(_) => reporter.stage(Stage::Finished),
            Err(e) => reporter.fail(e),
        }
        result
    }

    fn extract_impl(
        &mut self,
        watermarked: &PixelRaster,
        reporter: &mut Reporter,
    ) -> Result<PixelRaster> {
        self.options.validate_key_and_alpha()?;
        if self.carrier.pixel_count() == 0 {
            return Err(AirglowError::EmptyImage("carrier"));
        }
        if watermarked.pixel_count() == 0 {
            return Err(AirglowError::EmptyImage("watermarked"));
        }

        reporter.stage(Stage::ExtractCarrierSpectrum);
        let base = match self.base.take() {
            Some(base) => base,
            None => SpectralImage::forward(self.transform.as_mut(), &self.carrier)?,
        };
        let base = self.base.insert(base);

        reporter.stage(Stage::Scaling);
        let (width, height) = self.carrier.dimensions();
        let scaled;
        let derived = if watermarked.dimensions() != (width, height) {
            tracing::warn!(
                from_width = watermarked.width(),
                from_height = watermarked.height(),
                width,
                height,
                "resampling watermarked image to carrier size"
            );
            scaled = watermarked.resized(width, height);
            &scaled
        } else {
            watermarked
        };

        reporter.stage(Stage::ExtractEncodedSpectrum);
        let derived = SpectralImage::forward(self.transform.as_mut(), derived)?;

        reporter.stage(Stage::ExtractWatermarkSpectrum);
        let watermark = unmix(base, &derived, self.options.alpha)?;

        reporter.stage(Stage::WatermarkImage);
        let watermark = watermark.inverse(self.transform.as_mut())?;

        reporter.stage(Stage::ResultImage);
        let result = permute::gather(&watermark, self.options.key())?;
        tracing::info!(width, height, alpha = self.options.alpha, "extracted watermark");
        Ok(result)
    }
}

/// Embed `secret` into `carrier` using the FFT backend.
pub fn embed(
    carrier: &PixelRaster,
    secret: &PixelRaster,
    options: &AirglowOptions,
    progress: &mut dyn Progress,
) -> Result<PixelRaster> {
    Writer::new(carrier.clone(), options.clone()).mark(secret, progress)
}

/// Extract the tiled secret from `watermarked` using the FFT backend.
pub fn extract(
    carrier: &PixelRaster,
    watermarked: &PixelRaster,
    options: &AirglowOptions,
    progress: &mut dyn Progress,
) -> Result<PixelRaster> {
    Reader::new(carrier.clone(), options.clone()).extract(watermarked, progress)
}

/// Per channel deviation between an extracted image and what was expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    /// Mean absolute error over the compared color samples.
    pub mean_abs_error: f32,
    /// Largest absolute error over the compared color samples.
    pub max_error: u8,
}

impl Difference {
    /// True if no sample deviates more than `tolerance`.
    pub fn within(&self, tolerance: u8) -> bool {
        self.max_error <= tolerance
    }
}

/// Compare an extracted image against the expected secret.
pub struct Tester<'a> {
    extracted: &'a PixelRaster,
}

impl<'a> Tester<'a> {
    pub fn new(extracted: &'a PixelRaster) -> Self {
        Tester { extracted }
    }

    /// Compare the color channels of `expected` against the region at `(x0, y0)`.
    ///
    /// Panics if the region does not fit into the extracted image.
    pub fn compare_at(&self, expected: &PixelRaster, x0: u32, y0: u32) -> Difference {
        let fits = |offset: u32, len: u32, limit: u32| {
            offset.checked_add(len).map_or(false, |end| end <= limit)
        };
        assert!(
            fits(x0, expected.width(), self.extracted.width())
                && fits(y0, expected.height(), self.extracted.height()),
            "comparison region exceeds extracted image"
        );
        let mut total = 0u64;
        let mut max_error = 0u8;
        for y in 0..expected.height() {
            for x in 0..expected.width() {
                let a = self.extracted.pixel(x0 + x, y0 + y);
                let b = expected.pixel(x, y);
                for c in 0..COLOR_CHANNELS {
                    let d = a[c].abs_diff(b[c]);
                    total += d as u64;
                    max_error = max_error.max(d);
                }
            }
        }
        let samples = expected.pixel_count() * COLOR_CHANNELS;
        Difference {
            mean_abs_error: if samples == 0 {
                0.0
            } else {
                total as f32 / samples as f32
            },
            max_error,
        }
    }

    /// Compare against the first tile, the top left corner of the extracted image.
    pub fn compare_secret(&self, secret: &PixelRaster) -> Difference {
        self.compare_at(secret, 0, 0)
    }

    /// Compare the whole image against `expected`, which must have the same size.
    pub fn compare(&self, expected: &PixelRaster) -> Difference {
        assert_eq!(self.extracted.dimensions(), expected.dimensions());
        self.compare_at(expected, 0, 0)
    }
}
