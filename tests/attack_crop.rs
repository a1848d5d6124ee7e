use airglow as wm;
mod util;
use util::{embed_watermark_into, generate_fixed_raster};
use wm::{AirglowOptions, PixelRaster};

#[test]
fn test_attack_crop_bottom_half() {
    // ================ Start of embedding section. ================

    let carrier = generate_fixed_raster(21, 32, 32, 20..=120);
    let secret = generate_fixed_raster(22, 8, 8, 0..=255);
    let options = AirglowOptions::new("crop")
        .alpha(0.5)
        .repetitions(8)
        .smoothing(false);
    let marked = embed_watermark_into(&carrier, &secret, &options);

    // ================ End of embedding section. ================

    // ================ Start of attack section. ================

    // Restore the bottom half to the carrier, this removes all mirrored copies.
    let mut attacked = marked.clone();
    for y in 16..32 {
        for x in 0..32 {
            attacked.put_pixel(x, y, carrier.pixel(x, y));
        }
    }

    // ================ End of attack section. ================

    // ================ Start of extraction section. ================

    let recovered = wm::extract(&carrier, &attacked, &options, &mut wm::NoProgress).unwrap();

    // ================ End of extraction section. ================

    // ================ Start of testing section. ================

    let tester = wm::Tester::new(&recovered);
    for y in [0, 8] {
        for x in [0, 8, 16, 24] {
            let diff = tester.compare_at(&secret, x, y);
            assert!(diff.within(2), "tile at ({x}, {y}): {diff:?}");
        }
    }

    // The mirrored half is gone.
    let empty = PixelRaster::filled(32, 16, [0, 0, 0, 255]);
    assert!(tester.compare_at(&empty, 0, 16).within(2));

    // ================ End of testing section. ================
}
