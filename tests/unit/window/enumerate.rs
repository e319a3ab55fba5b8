use super::*;

fn medium_rectangle() -> TargetSize {
    TargetSize::new("medium_rectangle", 304, 248)
}

#[test]
fn regular_grid_on_canonical_landscape() {
    let windows: Vec<_> = Windows::new(970, 546, &medium_rectangle(), 50)
        .unwrap()
        .collect();
    assert_eq!(windows.len(), 14 * 6);

    let xs: std::collections::BTreeSet<u32> = windows.iter().map(|w| w.x).collect();
    let ys: std::collections::BTreeSet<u32> = windows.iter().map(|w| w.y).collect();
    assert_eq!(xs, (0..=650).step_by(50).collect::<std::collections::BTreeSet<u32>>());
    assert_eq!(ys, (0..=250).step_by(50).collect::<std::collections::BTreeSet<u32>>());

    for w in &windows {
        assert!(w.fits_within(970, 546));
        assert_eq!((w.width, w.height), (304, 248));
        assert!(w.x <= 666 && w.y <= 298);
    }
}

#[test]
fn order_is_row_major() {
    let first: Vec<_> = Windows::new(970, 546, &medium_rectangle(), 50)
        .unwrap()
        .take(15)
        .map(|w| w.origin())
        .collect();
    assert_eq!(first[0], (0, 0));
    assert_eq!(first[1], (50, 0));
    assert_eq!(first[13], (650, 0));
    assert_eq!(first[14], (0, 50));
}

#[test]
fn enumeration_is_deterministic_and_restartable() {
    let a: Vec<_> = Windows::new(800, 600, &medium_rectangle(), 37).unwrap().collect();
    let b: Vec<_> = Windows::new(800, 600, &medium_rectangle(), 37).unwrap().collect();
    assert_eq!(a, b);

    let mut it = Windows::new(800, 600, &medium_rectangle(), 37).unwrap();
    let first_pass: Vec<_> = it.by_ref().collect();
    assert_eq!(it.next(), None);
    it.rewind();
    let second_pass: Vec<_> = it.collect();
    assert_eq!(first_pass, second_pass);
}

#[test]
fn exact_fit_yields_single_window() {
    let windows: Vec<_> = Windows::new(304, 248, &medium_rectangle(), 50).unwrap().collect();
    assert_eq!(
        windows,
        vec![CropWindow { x: 0, y: 0, width: 304, height: 248 }]
    );
}

#[test]
fn oversized_target_is_empty_not_error() {
    let it = Windows::new(970, 546, &TargetSize::new("wide_skyscraper", 160, 600), 50).unwrap();
    assert_eq!(it.total(), 0);
    assert_eq!(it.len(), 0);
    assert_eq!(it.count(), 0);
}

#[test]
fn size_hint_tracks_progress() {
    let mut it = Windows::new(970, 546, &medium_rectangle(), 50).unwrap();
    assert_eq!(it.len(), 84);
    it.next();
    assert_eq!(it.len(), 83);
}

#[test]
fn get_matches_iteration() {
    let it = Windows::new(970, 546, &medium_rectangle(), 50).unwrap();
    for (i, w) in it.clone().enumerate() {
        assert_eq!(it.get(i as u64), Some(w));
    }
    assert_eq!(it.get(84), None);
}

#[test]
fn zero_step_is_rejected() {
    assert!(Windows::new(970, 546, &medium_rectangle(), 0).is_err());
}

#[test]
fn crop_copies_window_pixels() {
    let mut raster = Raster::new(10, 10);
    raster.put_pixel(3, 4, image::Rgba([1, 2, 3, 255]));
    let out = crop(&raster, CropWindow { x: 3, y: 4, width: 2, height: 2 }).unwrap();
    assert_eq!(out.dimensions(), (2, 2));
    assert_eq!(out.get_pixel(0, 0).0, [1, 2, 3, 255]);
    assert!(crop(&raster, CropWindow { x: 9, y: 0, width: 2, height: 1 }).is_err());
}
