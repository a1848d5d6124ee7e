//! The frequency domain the watermark is mixed in.
//!
//! The codec only needs a linear transform with an (approximate) inverse. Two backends are
//! provided, [`FftTransform`] is the default; [`DctTransform`] stores its real coefficients in the
//! real part of the complex values.

use rustdct::DctPlanner;
use rustfft::num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

use crate::dct2d;
use crate::error::{AirglowError, Result};
use crate::fft2d;
use crate::raster::{PixelRaster, CHANNELS, COLOR_CHANNELS};

/// Forward and inverse transform of a single channel.
pub trait Transform {
    /// Transform `width * height` samples into as many coefficients.
    fn forward(&mut self, width: usize, height: usize, samples: &[f32]) -> Result<Vec<Complex<f32>>>;

    /// Transform coefficients back into samples, not yet rounded or clipped.
    fn inverse(
        &mut self,
        width: usize,
        height: usize,
        coefficients: &[Complex<f32>],
    ) -> Result<Vec<f32>>;
}

fn check_len(width: usize, height: usize, len: usize) -> Result<()> {
    if width * height != len {
        return Err(AirglowError::Transform(format!(
            "{len} values do not match a {width}x{height} channel"
        )));
    }
    Ok(())
}

/// Complex 2D DFT.
pub struct FftTransform {
    planner: FftPlanner<f32>,
}

impl FftTransform {
    pub fn new() -> Self {
        FftTransform {
            planner: FftPlanner::new(),
        }
    }
}

impl Default for FftTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for FftTransform {
    fn forward(&mut self, width: usize, height: usize, samples: &[f32]) -> Result<Vec<Complex<f32>>> {
        check_len(width, height, samples.len())?;
        let mut data: Vec<Complex<f32>> = samples.iter().map(|v| Complex::new(*v, 0.0)).collect();
        fft2d::fft_2d(&mut self.planner, FftDirection::Forward, width, height, &mut data);
        Ok(data)
    }

    fn inverse(
        &mut self,
        width: usize,
        height: usize,
        coefficients: &[Complex<f32>],
    ) -> Result<Vec<f32>> {
        check_len(width, height, coefficients.len())?;
        let mut data = coefficients.to_vec();
        fft2d::fft_2d(&mut self.planner, FftDirection::Inverse, width, height, &mut data);
        Ok(data.iter().map(|v| v.re).collect())
    }
}

/// 2D DCT type II, inverted with type III.
pub struct DctTransform {
    planner: DctPlanner<f32>,
}

impl DctTransform {
    pub fn new() -> Self {
        DctTransform {
            planner: DctPlanner::new(),
        }
    }
}

impl Default for DctTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for DctTransform {
    fn forward(&mut self, width: usize, height: usize, samples: &[f32]) -> Result<Vec<Complex<f32>>> {
        check_len(width, height, samples.len())?;
        let mut data = samples.to_vec();
        dct2d::dct2_2d(&mut self.planner, dct2d::Type::DCT2, width, height, &mut data);
        Ok(data.iter().map(|v| Complex::new(*v, 0.0)).collect())
    }

    fn inverse(
        &mut self,
        width: usize,
        height: usize,
        coefficients: &[Complex<f32>],
    ) -> Result<Vec<f32>> {
        check_len(width, height, coefficients.len())?;
        let mut data: Vec<f32> = coefficients.iter().map(|v| v.re).collect();
        dct2d::dct2_2d(&mut self.planner, dct2d::Type::DCT3, width, height, &mut data);
        Ok(data)
    }
}

/// The color channels of a raster in the frequency domain, with its alpha channel set aside.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralImage {
    width: u32,
    height: u32,
    channels: [Vec<Complex<f32>>; COLOR_CHANNELS],
    alpha: Vec<u8>,
}

impl SpectralImage {
    /// Transform the color channels of `raster`, the alpha channel is stored as is.
    pub fn forward(transform: &mut dyn Transform, raster: &PixelRaster) -> Result<Self> {
        let (w, h) = (raster.width() as usize, raster.height() as usize);
        let channels = [
            transform.forward(w, h, &raster.channel_f32(0))?,
            transform.forward(w, h, &raster.channel_f32(1))?,
            transform.forward(w, h, &raster.channel_f32(2))?,
        ];
        Ok(SpectralImage {
            width: raster.width(),
            height: raster.height(),
            channels,
            alpha: raster.channel(COLOR_CHANNELS),
        })
    }

    /// Assemble from parts, all channels must hold `width * height` values.
    pub fn from_parts(
        width: u32,
        height: u32,
        channels: [Vec<Complex<f32>>; COLOR_CHANNELS],
        alpha: Vec<u8>,
    ) -> Result<Self> {
        let count = width as usize * height as usize;
        if let Some(bad) = channels.iter().map(|c| c.len()).find(|len| *len != count) {
            return Err(AirglowError::BufferSize {
                expected: count,
                actual: bad,
            });
        }
        if alpha.len() != count {
            return Err(AirglowError::BufferSize {
                expected: count,
                actual: alpha.len(),
            });
        }
        Ok(SpectralImage {
            width,
            height,
            channels,
            alpha,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coefficients of color channel `index` (0, 1 or 2).
    pub fn channel(&self, index: usize) -> &[Complex<f32>] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<Complex<f32>>; COLOR_CHANNELS] {
        &self.channels
    }

    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Invert the color channels, rounding and clipping to `[0, 255]`, and restore alpha.
    pub fn inverse(&self, transform: &mut dyn Transform) -> Result<PixelRaster> {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut raster = PixelRaster::new(self.width, self.height);
        for (c, coefficients) in self.channels.iter().enumerate() {
            let samples = transform.inverse(w, h, coefficients)?;
            for (pixel, v) in raster.as_raw_mut().chunks_mut(CHANNELS).zip(samples) {
                pixel[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
        for (pixel, a) in raster.as_raw_mut().chunks_mut(CHANNELS).zip(self.alpha.iter()) {
            pixel[COLOR_CHANNELS] = *a;
        }
        Ok(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelRaster {
        let mut r = PixelRaster::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = (x * 31 + y * 17) as u8;
                r.put_pixel(x, y, [v, 255 - v, v / 2, (x * 40) as u8]);
            }
        }
        r
    }

    fn backends() -> Vec<Box<dyn Transform>> {
        vec![Box::new(FftTransform::new()), Box::new(DctTransform::new())]
    }

    #[test]
    fn test_spectral_round_trip() {
        let raster = gradient(7, 5);
        for mut backend in backends() {
            let spectral = SpectralImage::forward(backend.as_mut(), &raster).unwrap();
            assert_eq!(spectral.alpha(), raster.channel(3).as_slice());
            assert_eq!(spectral.channel(0).len(), 35);
            let back = spectral.inverse(backend.as_mut()).unwrap();
            assert_eq!(back, raster);
        }
    }

    #[test]
    fn test_linearity() {
        let (w, h) = (4, 6);
        let x: Vec<f32> = (0..w * h).map(|i| (i * 7 % 13) as f32).collect();
        let y: Vec<f32> = (0..w * h).map(|i| (i * 5 % 11) as f32).collect();
        let sum: Vec<f32> = x.iter().zip(y.iter()).map(|(a, b)| a + b).collect();
        for mut backend in backends() {
            let fx = backend.forward(w, h, &x).unwrap();
            let fy = backend.forward(w, h, &y).unwrap();
            let fsum = backend.forward(w, h, &sum).unwrap();
            for ((a, b), s) in fx.iter().zip(fy.iter()).zip(fsum.iter()) {
                assert!((a + b - s).norm() < 1e-3);
            }
        }
    }

    #[test]
    fn test_inverse_clips() {
        let mut t = FftTransform::new();
        let mut coefficients = t.forward(2, 2, &[0.0; 4]).unwrap();
        // A DC of 2000 over 4 samples is 500 per sample.
        coefficients[0] = Complex::new(2000.0, 0.0);
        let spectral = SpectralImage::from_parts(
            2,
            2,
            [coefficients.clone(), vec![Complex::new(-400.0, 0.0); 4], coefficients],
            vec![9; 4],
        )
        .unwrap();
        let raster = spectral.inverse(&mut t).unwrap();
        assert_eq!(raster.pixel(1, 1)[0], 255);
        assert_eq!(raster.pixel(1, 1)[3], 9);
    }

    #[test]
    fn test_length_mismatch() {
        for mut backend in backends() {
            assert!(matches!(
                backend.forward(3, 3, &[0.0; 8]),
                Err(AirglowError::Transform(_))
            ));
            assert!(matches!(
                backend.inverse(3, 3, &[Complex::new(0.0, 0.0); 10]),
                Err(AirglowError::Transform(_))
            ));
        }
        assert!(matches!(
            SpectralImage::from_parts(2, 2, [vec![], vec![], vec![]], vec![0; 4]),
            Err(AirglowError::BufferSize { .. })
        ));
    }
}
