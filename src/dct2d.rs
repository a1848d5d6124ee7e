use rustdct::DctNum;
use rustdct::DctPlanner;

// Two dimensional DCT built from the one dimensional transforms of rustdct, applied to every row
// and then every column. The forward transform follows the scipy.fftpack scaling, which is twice
// the rustdct type II output:
//
//   y_k = 2 \Sum_{n=0}^{N-1} x_n \cos\left(\frac{\pi k \left( 2n + 1 \right)}{2 N}\right)
//
// The inverse is the type III transform scaled by 1/N per dimension, so that
// dct2_2d(DCT3, dct2_2d(DCT2, x)) == x.

/// Which transform to perform.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum Type {
    /// Forward transform.
    DCT2,
    /// Inverse of [`Type::DCT2`].
    DCT3,
}

#[derive(PartialEq, Debug, Copy, Clone)]
enum Direction {
    Row,
    Column,
}

/// Perform a two dimensional discrete cosine transform of the given type.
/// Data is assumed to be ordered row first and will be overwritten with the result.
pub fn dct2_2d<T: DctNum>(
    planner: &mut DctPlanner<T>,
    transform: Type,
    width: usize,
    height: usize,
    data: &mut [T],
) {
    assert_eq!(data.len(), (width * height));
    if data.is_empty() {
        return;
    }
    // The order of rows / columns and then columns / rows does not matter.
    // We can do the largest dimension first, to allow reuse of the scratch buffer.
    let first = if width >= height {
        Direction::Row
    } else {
        Direction::Column
    };
    let second = if first == Direction::Row {
        Direction::Column
    } else {
        Direction::Row
    };

    // Allocate the vector we'll use for the intermediate row / column storage.
    let mut tmp: Vec<T> = Vec::<T>::new();

    // Allocate the scratch buffer.
    let mut scratch: Vec<T> = Vec::<T>::new();

    for current in [first, second] {
        let (iter_max, step, skip_mult, take) = match current {
            Direction::Row => (height, 1, width, width),
            Direction::Column => (width, width, 1, height),
        };
        let length = take;

        let dct = planner.plan_dct2(length);
        tmp.resize(length, T::zero());
        scratch.resize(dct.get_scratch_len(), T::zero());

        let scale = match transform {
            Type::DCT2 => T::two(),
            Type::DCT3 => T::one() / T::from_usize(length).expect("length fits the float type"),
        };

        for i in 0..iter_max {
            // Copy the row into tmp.
            let row_iter = data.iter().skip(i * skip_mult).step_by(step).take(take);
            for (orig, out) in row_iter.zip(tmp.iter_mut()) {
                *out = *orig;
            }

            match transform {
                Type::DCT2 => dct.process_dct2_with_scratch(&mut tmp, &mut scratch),
                Type::DCT3 => dct.process_dct3_with_scratch(&mut tmp, &mut scratch),
            }

            // Copy tmp back into the data, overwriting the original input.
            let row_iter_mut = data.iter_mut().skip(i * skip_mult).step_by(step).take(take);
            for (data_dct, result) in row_iter_mut.zip(tmp.iter()) {
                *data_dct = scale * *result;
            }
        }
    }
}
