use super::*;

#[test]
fn sanitize_collapses_separators() {
    assert_eq!(
        sanitize_component("Sunny beach, golden hour!"),
        "sunny_beach_golden_hour"
    );
    assert_eq!(sanitize_component("  IMG--0042.final "), "img_0042_final");
    assert_eq!(sanitize_component("___"), "");
    assert_eq!(sanitize_component("café"), "caf");
}

#[test]
fn slug_keeps_first_eight_alphanumerics() {
    assert_eq!(text_slug("Buy Now!"), "buynow");
    assert_eq!(text_slug("Limited Time Offer!"), "limitedt");
    assert_eq!(text_slug("Best Prices Guaranteed!"), "bestpric");
    assert_eq!(text_slug("!!!"), "");
}

#[test]
fn overlay_id_display() {
    let id = OverlayId::new(20, 1, "Limited Time Offer!", Position::Bottom);
    assert_eq!(id.to_string(), "f20-t1-limitedt-bottom");
}

#[test]
fn same_slug_texts_stay_distinct() {
    let a = OverlayId::new(16, 0, "Limited Time!", Position::Top);
    let b = OverlayId::new(16, 1, "Limited Time Only!", Position::Top);
    assert_eq!(a.slug, b.slug);
    assert_ne!(a.to_string(), b.to_string());
}

#[test]
fn artifact_id_paths() {
    assert_eq!(
        ArtifactId::preview("beach", "leaderboard", 3).to_string(),
        "beach/leaderboard/crop3/preview"
    );
    let overlay = OverlayId::new(24, 0, "Buy Now!", Position::Middle);
    let id = ArtifactId::overlay("beach", "square", 0, overlay);
    assert_eq!(id.to_string(), "beach/square/crop0/f24-t0-buynow-middle");
    assert_eq!(id.crop(), Some(0));

    let pan = ArtifactId::pan("beach", "billboard");
    assert_eq!(pan.to_string(), "beach/billboard/pan");
    assert_eq!(pan.frame_key(7), "beach/billboard/pan/f007");
    assert_eq!(pan.crop(), None);
    assert_eq!(ArtifactId::fit("beach", "square").to_string(), "beach/square/fit");
}
