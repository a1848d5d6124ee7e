#![allow(dead_code)]
use airglow as wm;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use wm::{Complex, PixelRaster, Severity};

/// Opaque raster with every color sample drawn uniformly from `range`.
pub fn generate_fixed_raster(
    seed: u64,
    width: u32,
    height: u32,
    range: std::ops::RangeInclusive<u8>,
) -> PixelRaster {
    let mut generator = ChaCha8Rng::seed_from_u64(seed);
    let mut raster = PixelRaster::new(width, height);
    for pixel in raster.as_raw_mut().chunks_mut(4) {
        for v in pixel.iter_mut().take(3) {
            *v = generator.gen_range(range.clone());
        }
        pixel[3] = 255;
    }
    raster
}

pub fn generate_fixed_normal_sequence(seed: u64, length: usize) -> Vec<Complex<f32>> {
    use rand_distr::StandardNormal;
    let mut generator = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(length);
    data.resize_with(length, || {
        Complex::new(
            generator.sample(StandardNormal),
            generator.sample(StandardNormal),
        )
    });
    data
}

/// Embed `secret` into `carrier` and return the watermarked image.
pub fn embed_watermark_into(
    carrier: &PixelRaster,
    secret: &PixelRaster,
    options: &wm::AirglowOptions,
) -> PixelRaster {
    let writer = wm::Writer::new(carrier.clone(), options.clone());
    writer
        .mark(secret, &mut wm::NoProgress)
        .expect("embedding succeeds")
}

/// Progress sink recording every update.
#[derive(Default, Debug)]
pub struct Recorder {
    pub updates: Vec<(u8, String, Severity)>,
}

impl wm::Progress for Recorder {
    fn report(&mut self, percent: u8, message: &str, severity: Severity) {
        self.updates.push((percent, message.to_owned(), severity));
    }
}

impl Recorder {
    pub fn percents(&self) -> Vec<u8> {
        self.updates.iter().map(|u| u.0).collect()
    }
}
