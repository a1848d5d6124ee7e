/// Assert that two slices have equal length and differ by at most `max_error` per element.
pub fn approx_equal<T>(a: &[T], b: &[T], max_error: T)
where
    T: Copy + PartialOrd + std::ops::Sub<Output = T> + std::fmt::Debug + std::fmt::Display,
{
    assert_eq!(a.len(), b.len(), "a and b are not equal length");
    for (av, bv) in a.iter().zip(b.iter()) {
        let delta = if av > bv { *av - *bv } else { *bv - *av };
        assert!(
            delta <= max_error,
            "a: {a:?}, b: {b:?}, delta was {delta}, this exceeded allowed {max_error}."
        );
    }
}

/// Dump a single channel of floats as a grey image, stretched to the full range.
///
/// The first value is skipped when determining the range, for a spectrum that is the DC term which
/// would otherwise dominate.
pub fn dump_buffer_as_image(
    width: u32,
    height: u32,
    data: &[f32],
    path: &std::path::Path,
) -> image::ImageResult<()> {
    let min = data
        .iter()
        .skip(1)
        .copied()
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or(0.0);
    let max = data
        .iter()
        .skip(1)
        .copied()
        .max_by(|a, b| a.total_cmp(b))
        .unwrap_or(0.0);
    let range = if max > min { max - min } else { 1.0 };

    let samples = data
        .iter()
        .map(|x| (((x - min) / range) * 255.0).clamp(0.0, 255.0) as u8)
        .collect::<Vec<u8>>();
    match image::GrayImage::from_raw(width, height, samples) {
        Some(img) => img.save(path),
        None => Err(image::ImageError::Parameter(
            image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ),
        )),
    }
}
