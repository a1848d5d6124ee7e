//! The pixel buffer that flows between the stages of the codec.
//!
//! A [`PixelRaster`] is always RGBA, 8 bits per sample, row major with the channels interleaved.
//! The first three channels enter the transform, the fourth is carried alongside untouched.

use crate::error::{AirglowError, Result};

/// Number of samples per pixel.
pub const CHANNELS: usize = 4;

/// Number of channels that go through the transform.
pub const COLOR_CHANNELS: usize = 3;

/// Owned RGBA8 raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelRaster {
    /// Create a raster with all samples set to zero.
    pub fn new(width: u32, height: u32) -> Self {
        PixelRaster {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Create a raster where every pixel has the provided value.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        PixelRaster {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing buffer, checking it holds exactly `width * height * 4` samples.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(AirglowError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelRaster {
            width,
            height,
            data,
        })
    }

    /// Convert any image into an RGBA8 raster.
    pub fn from_dynamic(image: image::DynamicImage) -> Self {
        image.into_rgba8().into()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels, not samples.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel at column `x`, row `y`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = self.offset(x, y);
        let mut p = [0u8; 4];
        p.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        p
    }

    /// Overwrite the pixel at column `x`, row `y`. Panics when out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        let offset = self.offset(x, y);
        self.data[offset..offset + CHANNELS].copy_from_slice(&pixel);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} raster",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Copy one channel out as floats, the input format of the transforms.
    pub fn channel_f32(&self, channel: usize) -> Vec<f32> {
        self.data
            .iter()
            .skip(channel)
            .step_by(CHANNELS)
            .map(|v| *v as f32)
            .collect()
    }

    /// Copy one channel out as raw samples.
    pub fn channel(&self, channel: usize) -> Vec<u8> {
        self.data
            .iter()
            .skip(channel)
            .step_by(CHANNELS)
            .copied()
            .collect()
    }

    /// Resample to the given dimensions with bilinear filtering.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        let img = self.to_rgba_image();
        image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle).into()
    }

    /// Convert into an [`image::RgbaImage`], the buffer is moved.
    pub fn into_rgba_image(self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .expect("buffer length is checked on construction")
    }

    fn to_rgba_image(&self) -> image::RgbaImage {
        self.clone().into_rgba_image()
    }
}

impl From<image::RgbaImage> for PixelRaster {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        PixelRaster {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<PixelRaster> for image::DynamicImage {
    fn from(raster: PixelRaster) -> Self {
        image::DynamicImage::ImageRgba8(raster.into_rgba_image())
    }
}
