use super::*;
use crate::overlay::font::{SystemFontProvider, default_display_families};

fn gray_crop(width: u32, height: u32) -> Raster {
    Raster::from_pixel(width, height, image::Rgba([90, 110, 130, 255]))
}

fn spec(text: &str, font_size: u32, position: Position) -> OverlaySpec {
    OverlaySpec {
        text: text.to_string(),
        font_size,
        position,
    }
}

fn changed_rows(a: &Raster, b: &Raster) -> Vec<u32> {
    let mut rows = Vec::new();
    for y in 0..a.height() {
        if (0..a.width()).any(|x| a.get_pixel(x, y) != b.get_pixel(x, y)) {
            rows.push(y);
        }
    }
    rows
}

#[test]
fn preview_is_unmodified_crop() {
    let fonts = SystemFontProvider::builtin_only();
    let crop = gray_crop(64, 48);
    let out = apply_overlay(&crop, None, &fonts, OverlayStyle::default()).unwrap();
    assert_eq!(out, crop);
}

#[test]
fn overlay_is_deterministic_and_keeps_dims() {
    let fonts = SystemFontProvider::builtin_only();
    let crop = gray_crop(120, 100);
    let s = spec("Buy Now!", 16, Position::Middle);
    let a = apply_overlay(&crop, Some(&s), &fonts, OverlayStyle::default()).unwrap();
    let b = apply_overlay(&crop, Some(&s), &fonts, OverlayStyle::default()).unwrap();
    assert_eq!(a.dimensions(), (120, 100));
    assert_eq!(a.as_raw(), b.as_raw());
    assert_ne!(a, crop);
}

#[test]
fn overlay_uses_light_fill_and_dark_outline() {
    let fonts = SystemFontProvider::builtin_only();
    let crop = gray_crop(120, 100);
    let out = apply_overlay(
        &crop,
        Some(&spec("Buy Now!", 16, Position::Middle)),
        &fonts,
        OverlayStyle::default(),
    )
    .unwrap();
    assert!(out.pixels().any(|p| p.0[..3] == [255, 255, 255]));
    assert!(out.pixels().any(|p| p.0[0] < 20 && p.0[1] < 20 && p.0[2] < 20));
}

#[test]
fn position_controls_vertical_placement() {
    let fonts = SystemFontProvider::builtin_only();
    let crop = gray_crop(120, 100);
    let style = OverlayStyle::default();

    let top = apply_overlay(&crop, Some(&spec("Buy Now!", 16, Position::Top)), &fonts, style)
        .unwrap();
    let rows = changed_rows(&crop, &top);
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&y| y < 30), "top rows: {rows:?}");

    let bottom =
        apply_overlay(&crop, Some(&spec("Buy Now!", 16, Position::Bottom)), &fonts, style)
            .unwrap();
    let rows = changed_rows(&crop, &bottom);
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&y| y >= 70), "bottom rows: {rows:?}");

    let middle =
        apply_overlay(&crop, Some(&spec("Buy Now!", 16, Position::Middle)), &fonts, style)
            .unwrap();
    let rows = changed_rows(&crop, &middle);
    assert!(rows.iter().all(|&y| (35..65).contains(&y)), "middle rows: {rows:?}");
}

#[test]
fn overlay_is_horizontally_centered() {
    let fonts = SystemFontProvider::builtin_only();
    let crop = gray_crop(120, 100);
    let out = apply_overlay(
        &crop,
        Some(&spec("Buy Now!", 16, Position::Middle)),
        &fonts,
        OverlayStyle::default(),
    )
    .unwrap();
    let y = 48;
    let changed: Vec<u32> = (0..120)
        .filter(|&x| out.get_pixel(x, y) != crop.get_pixel(x, y))
        .collect();
    let left = *changed.first().unwrap();
    let right = *changed.last().unwrap();
    assert!((left as i64 - (119 - right) as i64).abs() <= 1, "{left}..{right}");
}

#[test]
fn system_face_renders_outlined_text_in_each_band() {
    let fonts = SystemFontProvider::new(&default_display_families(), &Vec::<std::path::PathBuf>::new());
    if fonts.resolved_family().is_none() {
        // No installed faces on this machine.
        return;
    }
    let FontHandle::Face { fontdb, family, .. } = fonts.resolve_font(FontStyle::BoldDisplay, 24)
    else {
        panic!("resolved family must yield a face handle");
    };
    let short = measure_text(&fontdb, &family, 24, "Buy").unwrap();
    let long = measure_text(&fontdb, &family, 24, "Buy Now!").unwrap();
    assert!(short.width > 0.0 && long.width > short.width);
    assert!(long.ascent > 0.0 && long.ascent <= long.height);

    let crop = gray_crop(304, 248);
    let style = OverlayStyle::default();
    let band = 248 / 3;
    for (position, rows_in) in [
        (Position::Top, 0..band),
        (Position::Middle, band..2 * band),
        (Position::Bottom, 2 * band..248),
    ] {
        let out = apply_overlay(&crop, Some(&spec("Buy Now!", 24, position)), &fonts, style)
            .unwrap();
        let rows = changed_rows(&crop, &out);
        assert!(!rows.is_empty(), "{position:?} drew nothing");
        assert!(rows.iter().all(|y| rows_in.contains(y)), "{position:?} rows: {rows:?}");
        assert!(out.pixels().any(|p| p.0[..3] == [255, 255, 255]));
        assert!(out.pixels().any(|p| p.0[0] < 20 && p.0[1] < 20 && p.0[2] < 20));
    }
}

#[test]
fn zero_font_size_is_rejected() {
    let fonts = SystemFontProvider::builtin_only();
    let crop = gray_crop(10, 10);
    assert!(
        apply_overlay(&crop, Some(&spec("x", 0, Position::Top)), &fonts, OverlayStyle::default())
            .is_err()
    );
}

#[test]
fn renderer_caches_layout_per_text_size_and_width() {
    let fonts = SystemFontProvider::builtin_only();
    let mut renderer = OverlayRenderer::new(&fonts, OverlayStyle::default());
    let crop = gray_crop(120, 100);
    for position in Position::ALL {
        renderer
            .apply_overlay(&crop, Some(&spec("Buy Now!", 16, position)))
            .unwrap();
    }
    assert_eq!(renderer.cached_layouts(), 1);
    renderer
        .apply_overlay(&gray_crop(200, 100), Some(&spec("Buy Now!", 16, Position::Top)))
        .unwrap();
    assert_eq!(renderer.cached_layouts(), 2);
}

fn fixed_width(s: &str) -> TextExtent {
    TextExtent {
        width: s.chars().count() as f32 * 10.0,
        height: 12.0,
        ascent: 9.0,
    }
}

#[test]
fn wrap_breaks_on_measured_width() {
    let block = wrap_text("Limited Time Offer!", 100.0, fixed_width);
    let lines: Vec<&str> = block.lines.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(lines, vec!["Limited", "Time", "Offer!"]);
    assert_eq!(block.line_height, 12.0);
    assert_eq!(block.height(), 36.0);
}

#[test]
fn wrap_keeps_fitting_words_together() {
    let block = wrap_text("Buy Now!", 100.0, fixed_width);
    assert_eq!(block.lines, vec![("Buy Now!".to_string(), 80.0)]);
}

#[test]
fn overlong_word_gets_its_own_line() {
    let block = wrap_text("a Supercalifragilistic b", 100.0, fixed_width);
    let lines: Vec<&str> = block.lines.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(lines, vec!["a", "Supercalifragilistic", "b"]);
}
