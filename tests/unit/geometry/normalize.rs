use super::*;

fn solid(width: u32, height: u32) -> SourceImage {
    SourceImage::new("src", Raster::from_pixel(width, height, image::Rgba([40, 80, 120, 255])))
        .unwrap()
}

#[test]
fn landscape_1920x1080_at_970_is_970x546() {
    assert_eq!(
        canonical_dims(1920, 1080, 970).unwrap(),
        (970, 546, Orientation::Landscape)
    );
}

#[test]
fn portrait_scales_height_to_max() {
    let (w, h, o) = canonical_dims(1080, 1920, 970).unwrap();
    assert_eq!((w, h, o), (546, 970, Orientation::Portrait));
}

#[test]
fn small_landscape_is_upscaled_to_max() {
    assert_eq!(canonical_dims(400, 200, 970).unwrap(), (970, 485, Orientation::Landscape));
}

#[test]
fn square_is_never_resized() {
    for max in [1, 64, 970, 4096] {
        assert_eq!(canonical_dims(1024, 1024, max).unwrap(), (1024, 1024, Orientation::Square));
    }
    let canon = normalize(&solid(37, 37), 970).unwrap();
    assert_eq!((canon.width(), canon.height()), (37, 37));
    assert_eq!(canon.orientation(), Orientation::Square);
}

#[test]
fn extreme_aspect_keeps_at_least_one_pixel() {
    assert_eq!(canonical_dims(10_000, 1, 100).unwrap(), (100, 1, Orientation::Landscape));
}

#[test]
fn long_edge_never_exceeds_max() {
    for (w, h) in [(1920, 1080), (333, 1000), (1001, 1000), (5, 3)] {
        let (cw, ch, _) = canonical_dims(w, h, 970).unwrap();
        assert!(cw.max(ch) <= 970, "{w}x{h} -> {cw}x{ch}");
    }
}

#[test]
fn zero_dimension_is_invalid_image() {
    let err = canonical_dims(0, 10, 970).unwrap_err();
    assert!(matches!(err, AdsmithError::InvalidImage(_)));
}

#[test]
fn normalize_produces_new_raster_with_canonical_dims() {
    let src = solid(192, 108);
    let canon = normalize(&src, 97).unwrap();
    assert_eq!((canon.width(), canon.height()), (97, 55));
    assert_eq!(src.raster().dimensions(), (192, 108));
    assert_eq!(canon.raster().get_pixel(10, 10).0[3], 255);
}
