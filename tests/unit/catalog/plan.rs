use super::*;
use crate::catalog::config::{PanConfig, SizeCatalog};

fn config_with(sizes: Vec<TargetSize>) -> CatalogConfig {
    CatalogConfig {
        sizes: SizeCatalog {
            desktop: sizes,
            mobile: vec![],
        },
        ..CatalogConfig::default()
    }
}

#[test]
fn each_crop_yields_preview_plus_27_overlays() {
    let cfg = CatalogConfig {
        fit: false,
        pan: PanConfig {
            enabled: false,
            ..PanConfig::default()
        },
        ..config_with(vec![TargetSize::new("medium_rectangle", 304, 248)])
    };
    let plan = plan_source("beach", 970, 546, &cfg).unwrap();
    assert_eq!(plan.crop_count("medium_rectangle"), 84);
    assert_eq!(plan.tasks.len(), 84 * 28);

    let first_crop: Vec<_> = plan.tasks[..28].iter().map(|t| t.id.to_string()).collect();
    assert_eq!(first_crop[0], "beach/medium_rectangle/crop0/preview");
    assert_eq!(first_crop[1], "beach/medium_rectangle/crop0/f16-t0-buynow-top");
    assert!(first_crop.iter().all(|id| id.contains("/crop0/")));
    assert_eq!(
        plan.tasks[28].id.to_string(),
        "beach/medium_rectangle/crop1/preview"
    );
}

#[test]
fn fit_and_pan_follow_crops_per_size() {
    let cfg = config_with(vec![
        TargetSize::new("a", 500, 500),
        TargetSize::new("b", 960, 540),
    ]);
    let plan = plan_source("s", 970, 546, &cfg).unwrap();
    let tail: Vec<_> = plan
        .tasks
        .iter()
        .filter(|t| !matches!(t.kind, TaskKind::Crop { .. }))
        .map(|t| t.id.to_string())
        .collect();
    assert_eq!(tail, ["s/a/fit", "s/a/pan", "s/b/fit", "s/b/pan"]);
    assert!(matches!(
        plan.tasks.last().map(|t| &t.kind),
        Some(TaskKind::Pan { frame_count: 40 })
    ));
}

#[test]
fn oversized_target_is_skipped_not_failed() {
    let cfg = config_with(vec![
        TargetSize::new("huge", 2000, 100),
        TargetSize::new("ok", 100, 100),
    ]);
    let plan = plan_source("s", 970, 546, &cfg).unwrap();
    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].size, "huge");
    assert_eq!(plan.crop_count("huge"), 0);
    assert!(plan.crop_count("ok") > 0);
}

#[test]
fn planning_is_reproducible() {
    let cfg = CatalogConfig::default();
    let a = plan_source("s", 970, 546, &cfg).unwrap();
    let b = plan_source("s", 970, 546, &cfg).unwrap();
    assert_eq!(a.tasks, b.tasks);
}

#[test]
fn summary_groups_by_size() {
    let cfg = CatalogConfig {
        pan: PanConfig {
            enabled: false,
            ..PanConfig::default()
        },
        ..config_with(vec![
            TargetSize::new("a", 970, 546),
            TargetSize::new("b", 2000, 2000),
        ])
    };
    let plan = plan_source("s", 970, 546, &cfg).unwrap();
    let summary = plan.summary();
    assert_eq!(summary.len(), 2);
    assert_eq!(
        summary[0],
        SizeSummary {
            size: "a".to_string(),
            crops: 1,
            stills: 29,
            pans: 0
        }
    );
    assert_eq!((summary[1].crops, summary[1].stills), (0, 1));
}
