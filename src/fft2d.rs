//! Two dimensional complex DFT, rows then columns, on top of rustfft.

use rustfft::num_complex::Complex;
use rustfft::{FftDirection, FftNum, FftPlanner};

/// Perform a two dimensional FFT in place on row first ordered data.
///
/// The forward direction is unnormalized, the inverse direction divides by `width * height` so
/// that a forward pass followed by an inverse pass is the identity.
pub fn fft_2d<T: FftNum>(
    planner: &mut FftPlanner<T>,
    direction: FftDirection,
    width: usize,
    height: usize,
    data: &mut [Complex<T>],
) {
    assert_eq!(data.len(), width * height);
    if data.is_empty() {
        return;
    }

    // Rows are contiguous, they can be processed in one go.
    let row_fft = planner.plan_fft(width, direction);
    let mut scratch = vec![Complex::new(T::zero(), T::zero()); row_fft.get_inplace_scratch_len()];
    row_fft.process_with_scratch(data, &mut scratch);

    // Columns are gathered into a buffer, transformed and scattered back.
    let col_fft = planner.plan_fft(height, direction);
    scratch.resize(
        col_fft.get_inplace_scratch_len(),
        Complex::new(T::zero(), T::zero()),
    );
    let mut column = vec![Complex::new(T::zero(), T::zero()); height];
    for x in 0..width {
        for (y, v) in column.iter_mut().enumerate() {
            *v = data[y * width + x];
        }
        col_fft.process_with_scratch(&mut column, &mut scratch);
        for (y, v) in column.iter().enumerate() {
            data[y * width + x] = *v;
        }
    }

    if direction == FftDirection::Inverse {
        let scale = T::one() / T::from_usize(width * height).expect("size fits the float type");
        for v in data.iter_mut() {
            *v = *v * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex<f32>, b: Complex<f32>) -> bool {
        (a - b).norm() < 1e-3
    }

    #[test]
    fn test_dc_component() {
        let (width, height) = (4, 3);
        let mut data = vec![Complex::new(2.0f32, 0.0); width * height];
        let mut planner = FftPlanner::new();
        fft_2d(&mut planner, FftDirection::Forward, width, height, &mut data);
        assert!(close(data[0], Complex::new(24.0, 0.0)));
        assert!(data.iter().skip(1).all(|v| close(*v, Complex::new(0.0, 0.0))));
    }

    #[test]
    fn test_impulse_is_flat() {
        let (width, height) = (3, 5);
        let mut data = vec![Complex::new(0.0f32, 0.0); width * height];
        data[0] = Complex::new(1.0, 0.0);
        let mut planner = FftPlanner::new();
        fft_2d(&mut planner, FftDirection::Forward, width, height, &mut data);
        assert!(data.iter().all(|v| close(*v, Complex::new(1.0, 0.0))));
    }

    #[test]
    fn test_round_trip() {
        let (width, height) = (6, 7);
        let original: Vec<Complex<f32>> = (0..width * height)
            .map(|i| Complex::new(((i * 53) % 256) as f32, 0.0))
            .collect();
        let mut data = original.clone();
        let mut planner = FftPlanner::new();
        fft_2d(&mut planner, FftDirection::Forward, width, height, &mut data);
        fft_2d(&mut planner, FftDirection::Inverse, width, height, &mut data);
        for (a, b) in original.iter().zip(data.iter()) {
            assert!(close(*a, *b), "{a} != {b}");
        }
    }
}
