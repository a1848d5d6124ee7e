//! Mirrored pixel scatter keyed by the passphrase.
//!
//! The forward direction takes a permutation of the first half of the pixels and writes every
//! selected pixel twice: once at the permuted position `i` and once at its point mirror
//! `count - 1 - i`. The result is point symmetric, which is the redundancy the extraction relies
//! on; the reverse direction reads both mirrored slots.
//!
//! With an odd pixel count the centre pixel belongs to neither half. Neither direction writes it,
//! so it is always zero in the output.

use crate::error::{AirglowError, Result};
use crate::prng::Prng;
use crate::raster::{PixelRaster, CHANNELS};

/// Number of pixels addressed by the permutation for a buffer of `pixel_count` pixels.
pub fn half_len(pixel_count: usize) -> usize {
    pixel_count / 2
}

/// Draw the permutation for a buffer of `pixel_count` pixels from a fresh generator.
pub fn permutation_for(key: &str, pixel_count: usize) -> Vec<usize> {
    Prng::new(key).permutation(half_len(pixel_count))
}

fn check(buffer: &[u8], permutation: &[usize]) -> Result<usize> {
    if buffer.len() % CHANNELS != 0 {
        return Err(AirglowError::Permutation(format!(
            "buffer length {} is not a multiple of {CHANNELS}",
            buffer.len()
        )));
    }
    let pixel_count = buffer.len() / CHANNELS;
    let half = half_len(pixel_count);
    if permutation.len() != half {
        return Err(AirglowError::Permutation(format!(
            "permutation has {} entries, buffer of {pixel_count} pixels needs {half}",
            permutation.len()
        )));
    }
    if let Some(v) = permutation.iter().find(|v| **v >= half) {
        return Err(AirglowError::Permutation(format!(
            "entry {v} out of range for {half} entries"
        )));
    }
    Ok(pixel_count)
}

fn copy_pixel(dst: &mut [u8], dst_index: usize, src: &[u8], src_index: usize) {
    let d = dst_index * CHANNELS;
    let s = src_index * CHANNELS;
    dst[d..d + CHANNELS].copy_from_slice(&src[s..s + CHANNELS]);
}

/// Scatter `buffer`, writing pixel `permutation[i]` to both `i` and its mirror.
pub fn apply(buffer: &[u8], permutation: &[usize]) -> Result<Vec<u8>> {
    let count = check(buffer, permutation)?;
    let mut out = vec![0u8; buffer.len()];
    for (i, v) in permutation.iter().enumerate() {
        copy_pixel(&mut out, i, buffer, *v);
        copy_pixel(&mut out, count - 1 - i, buffer, *v);
    }
    Ok(out)
}

/// Undo [`apply`], restoring pixel `permutation[i]` from slot `i` and its mirror from the mirror.
pub fn reverse(buffer: &[u8], permutation: &[usize]) -> Result<Vec<u8>> {
    let count = check(buffer, permutation)?;
    let mut out = vec![0u8; buffer.len()];
    for (i, v) in permutation.iter().enumerate() {
        copy_pixel(&mut out, *v, buffer, i);
        copy_pixel(&mut out, count - 1 - *v, buffer, count - 1 - i);
    }
    Ok(out)
}

/// Scatter a raster with the permutation derived from `key`.
pub fn scatter(raster: &PixelRaster, key: &str) -> Result<PixelRaster> {
    let permutation = permutation_for(key, raster.pixel_count());
    let data = apply(raster.as_raw(), &permutation)?;
    PixelRaster::from_raw(raster.width(), raster.height(), data)
}

/// Gather a raster scattered by [`scatter`] with the same `key`.
pub fn gather(raster: &PixelRaster, key: &str) -> Result<PixelRaster> {
    let permutation = permutation_for(key, raster.pixel_count());
    let data = reverse(raster.as_raw(), &permutation)?;
    PixelRaster::from_raw(raster.width(), raster.height(), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Buffer where pixel `i` is `[i, i, i, 255]`.
    fn indexed(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| [i as u8, i as u8, i as u8, 255])
            .collect()
    }

    fn pixel(buffer: &[u8], i: usize) -> &[u8] {
        &buffer[i * CHANNELS..(i + 1) * CHANNELS]
    }

    #[test]
    fn test_apply_small() {
        let buffer = indexed(6);
        let out = apply(&buffer, &[2, 0, 1]).unwrap();
        let firsts: Vec<u8> = out.chunks(CHANNELS).map(|p| p[0]).collect();
        assert_eq!(firsts, &[2, 0, 1, 1, 0, 2]);
    }

    #[test]
    fn test_mirror_invariant() {
        for count in [2usize, 9, 64, 101] {
            let buffer = indexed(count);
            let permutation = permutation_for("mirror", count);
            let out = apply(&buffer, &permutation).unwrap();
            for i in 0..half_len(count) {
                assert_eq!(pixel(&out, i), pixel(&out, count - 1 - i));
            }
        }
    }

    #[test]
    fn test_round_trip_even() {
        let count = 64;
        let buffer = indexed(count);
        let permutation = permutation_for("round trip", count);
        let scattered = apply(&buffer, &permutation).unwrap();
        let restored = reverse(&scattered, &permutation).unwrap();
        // Only the first half is addressed by the permutation, the second half is restored from
        // the mirror copies of the first half.
        for v in 0..half_len(count) {
            assert_eq!(pixel(&restored, v), pixel(&buffer, v));
            assert_eq!(pixel(&restored, count - 1 - v), pixel(&buffer, v));
        }
    }

    #[test]
    fn test_odd_middle_pixel_is_zero() {
        let count = 9;
        let buffer = indexed(count);
        let permutation = permutation_for("odd", count);
        let scattered = apply(&buffer, &permutation).unwrap();
        assert_eq!(pixel(&scattered, 4), &[0, 0, 0, 0]);
        let restored = reverse(&scattered, &permutation).unwrap();
        assert_eq!(pixel(&restored, 4), &[0, 0, 0, 0]);
        for v in 0..4 {
            assert_eq!(pixel(&restored, v), pixel(&buffer, v));
        }
    }

    #[test]
    fn test_reverse_reads_both_mirrors() {
        // Break the symmetry by hand, reverse must take the mirror slot from the mirror source.
        let mut scattered = vec![0u8; 4 * CHANNELS];
        scattered[0] = 10; // slot 0
        scattered[3 * CHANNELS] = 20; // slot 3, mirror of 0
        let restored = reverse(&scattered, &[1, 0]).unwrap();
        assert_eq!(restored[CHANNELS], 10); // pixel 1 from slot 0
        assert_eq!(restored[2 * CHANNELS], 20); // pixel 2 = mirror of 1, from slot 3
    }

    #[test]
    fn test_rejects_bad_permutation() {
        let buffer = indexed(4);
        assert!(matches!(
            apply(&buffer, &[0]),
            Err(AirglowError::Permutation(_))
        ));
        assert!(matches!(
            apply(&buffer, &[0, 2]),
            Err(AirglowError::Permutation(_))
        ));
        assert!(matches!(
            reverse(&buffer[..15], &[0, 1]),
            Err(AirglowError::Permutation(_))
        ));
    }

    #[test]
    fn test_scatter_gather_raster() {
        let mut raster = PixelRaster::new(4, 4);
        raster.put_pixel(1, 0, [200, 0, 0, 255]);
        raster.put_pixel(2, 1, [0, 100, 0, 255]);
        let scattered = scatter(&raster, "key").unwrap();
        assert_ne!(scattered, raster);
        let gathered = gather(&scattered, "key").unwrap();
        assert_eq!(gathered.pixel(1, 0), [200, 0, 0, 255]);
        assert_eq!(gathered.pixel(2, 1), [0, 100, 0, 255]);
        // The bottom half mirrors the top half.
        assert_eq!(gathered.pixel(2, 3), [200, 0, 0, 255]);
    }
}
