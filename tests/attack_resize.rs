use airglow as wm;
mod util;
use util::{embed_watermark_into, Recorder};
use wm::{AirglowOptions, PixelRaster};

/// Carrier and secret where the secret covers the whole top half, which makes the scattered
/// watermark, and with that the watermarked image, a solid color that survives resampling.
fn solid_setup() -> (PixelRaster, PixelRaster, AirglowOptions) {
    let carrier = PixelRaster::filled(32, 32, [20, 30, 40, 255]);
    let secret = PixelRaster::filled(4, 4, [200, 100, 50, 255]);
    let options = AirglowOptions::new("resize").alpha(0.2).repetitions(32);
    (carrier, secret, options)
}

#[test]
fn test_attack_resize_up() {
    // ================ Start of embedding section. ================

    let (carrier, secret, options) = solid_setup();
    let marked = embed_watermark_into(&carrier, &secret, &options);
    assert!(marked.as_raw().chunks(4).all(|p| p == [60, 50, 50, 255]));

    // ================ End of embedding section. ================

    // ================ Start of attack section. ================

    let resized: PixelRaster = image::imageops::resize(
        &marked.into_rgba_image(),
        80,
        64,
        image::imageops::FilterType::Nearest,
    )
    .into();

    // ================ End of attack section. ================

    // ================ Start of extraction section. ================

    let mut progress = Recorder::default();
    let recovered = wm::extract(&carrier, &resized, &options, &mut progress).unwrap();
    assert_eq!(recovered.dimensions(), carrier.dimensions());

    // ================ End of extraction section. ================

    // ================ Start of testing section. ================

    let tester = wm::Tester::new(&recovered);
    assert!(tester.compare_secret(&secret).within(2));
    let full = PixelRaster::filled(32, 32, [200, 100, 50, 255]);
    assert!(tester.compare(&full).within(2));

    // ================ End of testing section. ================
}

#[test]
fn test_attack_resize_down() {
    let (carrier, secret, options) = solid_setup();
    let marked = embed_watermark_into(&carrier, &secret, &options);

    let resized = marked.resized(16, 16);
    let recovered = wm::extract(&carrier, &resized, &options, &mut wm::NoProgress).unwrap();
    assert_eq!(recovered.dimensions(), (32, 32));
    assert!(wm::Tester::new(&recovered).compare_secret(&secret).within(2));
}
