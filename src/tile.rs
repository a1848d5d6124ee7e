//! Builds the watermark raster: the secret repeated in a grid over the top half of a
//! carrier-sized canvas, then scattered with the passphrase permutation.

use crate::error::{AirglowError, Result};
use crate::permute;
use crate::raster::{PixelRaster, CHANNELS};

/// Grid of tiles that fits the top half of the carrier, as `(rows, cols)`.
fn grid(carrier_width: u32, carrier_height: u32, secret_width: u32, secret_height: u32) -> (u32, u32) {
    if secret_width == 0 || secret_height == 0 {
        return (0, 0);
    }
    (carrier_height / 2 / secret_height, carrier_width / secret_width)
}

/// How many copies of the secret fit into the carrier.
pub fn max_repetitions(
    carrier_width: u32,
    carrier_height: u32,
    secret_width: u32,
    secret_height: u32,
) -> usize {
    let (rows, cols) = grid(carrier_width, carrier_height, secret_width, secret_height);
    rows as usize * cols as usize
}

/// Index into a line of `n` samples with the border mirrored, excluding the edge sample itself.
fn reflect_101(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let i = if i < 0 { -i } else { i };
    (if i >= n { 2 * n - 2 - i } else { i }) as usize
}

/// Blur with the 3x3 binomial kernel `[1 2 1]^T [1 2 1] / 16`, on all four channels.
pub fn smooth(raster: &PixelRaster) -> PixelRaster {
    let (width, height) = (raster.width() as usize, raster.height() as usize);
    let src = raster.as_raw();

    // Horizontal pass, kept as integer sums.
    let mut horizontal = vec![0u16; src.len()];
    for y in 0..height {
        for x in 0..width {
            let l = reflect_101(x as isize - 1, width);
            let r = reflect_101(x as isize + 1, width);
            for c in 0..CHANNELS {
                let at = |xx: usize| src[(y * width + xx) * CHANNELS + c] as u16;
                horizontal[(y * width + x) * CHANNELS + c] = at(l) + 2 * at(x) + at(r);
            }
        }
    }

    let mut out = PixelRaster::new(raster.width(), raster.height());
    let dst = out.as_raw_mut();
    for y in 0..height {
        let u = reflect_101(y as isize - 1, height);
        let d = reflect_101(y as isize + 1, height);
        for x in 0..width {
            for c in 0..CHANNELS {
                let at = |yy: usize| horizontal[(yy * width + x) * CHANNELS + c] as u32;
                let total = at(u) + 2 * at(y) + at(d);
                dst[(y * width + x) * CHANNELS + c] = ((total + 8) / 16) as u8;
            }
        }
    }
    out
}

/// Place up to `repetitions` copies of `secret` on a zeroed canvas, row by row.
///
/// Fails if not even a single copy fits into the top half of the canvas.
pub fn tile(
    carrier_width: u32,
    carrier_height: u32,
    secret: &PixelRaster,
    repetitions: usize,
) -> Result<PixelRaster> {
    let (rows, cols) = grid(carrier_width, carrier_height, secret.width(), secret.height());
    if rows == 0 || cols == 0 {
        return Err(AirglowError::Geometry {
            max_width: carrier_width,
            max_height: carrier_height / 2,
        });
    }

    let mut canvas = PixelRaster::new(carrier_width, carrier_height);
    let row_len = secret.width() as usize * CHANNELS;
    let canvas_stride = carrier_width as usize * CHANNELS;
    let cells = (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c)));
    for (row, col) in cells.take(repetitions) {
        let x0 = (col * secret.width()) as usize;
        let y0 = (row * secret.height()) as usize;
        for (sy, src_row) in secret.as_raw().chunks(row_len).enumerate() {
            let start = (y0 + sy) * canvas_stride + x0 * CHANNELS;
            canvas.as_raw_mut()[start..start + row_len].copy_from_slice(src_row);
        }
    }
    Ok(canvas)
}

/// Build the scattered watermark raster for a carrier of the given size.
pub fn build(
    carrier_width: u32,
    carrier_height: u32,
    secret: &PixelRaster,
    repetitions: usize,
    smoothing: bool,
    key: &str,
) -> Result<PixelRaster> {
    let canvas = if smoothing {
        tile(carrier_width, carrier_height, &smooth(secret), repetitions)?
    } else {
        tile(carrier_width, carrier_height, secret, repetitions)?
    };
    tracing::debug!(
        carrier_width,
        carrier_height,
        secret_width = secret.width(),
        secret_height = secret.height(),
        repetitions,
        smoothing,
        "tiled secret"
    );
    permute::scatter(&canvas, key)
}
