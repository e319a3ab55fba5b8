use super::*;

#[test]
fn orientation_classifies_edges() {
    assert_eq!(Orientation::of(1920, 1080), Orientation::Landscape);
    assert_eq!(Orientation::of(1080, 1920), Orientation::Portrait);
    assert_eq!(Orientation::of(512, 512), Orientation::Square);
}

#[test]
fn crop_window_containment_is_inclusive_at_edges() {
    let w = CropWindow {
        x: 666,
        y: 298,
        width: 304,
        height: 248,
    };
    assert!(w.fits_within(970, 546));
    assert!(!w.fits_within(969, 546));
    assert!(!w.fits_within(970, 545));
}

#[test]
fn crop_window_containment_does_not_overflow() {
    let w = CropWindow {
        x: u32::MAX,
        y: 0,
        width: 2,
        height: 1,
    };
    assert!(!w.fits_within(u32::MAX, 1));
}

#[test]
fn target_size_validation_rejects_degenerate_entries() {
    assert!(TargetSize::new("ok", 10, 10).validate().is_ok());
    assert!(TargetSize::new("", 10, 10).validate().is_err());
    assert!(TargetSize::new("a/b", 10, 10).validate().is_err());
    assert!(TargetSize::new("zero", 0, 10).validate().is_err());
}

#[test]
fn target_size_names_cannot_escape_the_source_directory() {
    for name in [".", "..", "...", "a\\b"] {
        assert!(
            matches!(
                TargetSize::new(name, 10, 10).validate(),
                Err(AdsmithError::Validation(_))
            ),
            "{name} accepted"
        );
    }
    assert!(TargetSize::new("v1.2", 10, 10).validate().is_ok());
}

#[test]
fn position_serde_uses_lowercase_names() {
    let json = serde_json::to_string(&Position::ALL).unwrap();
    assert_eq!(json, r#"["top","middle","bottom"]"#);
}
