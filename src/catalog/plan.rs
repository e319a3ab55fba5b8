use crate::catalog::config::CatalogConfig;
use crate::catalog::id::ArtifactId;
use crate::foundation::core::{CropWindow, OverlaySpec, TargetSize};
use crate::foundation::error::AdsmithResult;
use crate::window::enumerate::Windows;

/// How a task's pixels are produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Crop `window` from the canonical image, optionally applying an overlay.
    Crop {
        window: CropWindow,
        overlay: Option<OverlaySpec>,
    },
    /// Center-crop-and-resize the canonical image.
    Fit,
    /// Pan across the canonical image.
    Pan { frame_count: u32 },
}

/// One artifact to materialize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: ArtifactId,
    pub size: TargetSize,
    pub kind: TaskKind,
}

/// Size with no crop windows on the canvas.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SkippedSize {
    pub size: String,
    pub reason: String,
}

/// Full task list for one source, in materialization order.
#[derive(Clone, Debug, Default)]
pub struct SourcePlan {
    pub source: String,
    pub canvas: (u32, u32),
    pub tasks: Vec<Task>,
    pub skipped: Vec<SkippedSize>,
}

/// Per-size task counts, as reported by `adsmith plan`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SizeSummary {
    pub size: String,
    pub crops: u64,
    pub stills: u64,
    pub pans: u64,
}

impl SourcePlan {
    /// Number of crop windows planned for `size`.
    pub fn crop_count(&self, size: &str) -> u64 {
        self.tasks
            .iter()
            .filter(|t| t.size.name == size)
            .filter(|t| matches!(t.kind, TaskKind::Crop { overlay: None, .. }))
            .count() as u64
    }

    /// Counts grouped by size, in catalog order.
    pub fn summary(&self) -> Vec<SizeSummary> {
        let mut out = Vec::<SizeSummary>::new();
        for task in &self.tasks {
            if out.last().is_none_or(|s| s.size != task.size.name) {
                out.push(SizeSummary {
                    size: task.size.name.clone(),
                    crops: 0,
                    stills: 0,
                    pans: 0,
                });
            }
            let Some(entry) = out.last_mut() else {
                continue;
            };
            match task.kind {
                TaskKind::Crop { overlay: None, .. } => {
                    entry.crops += 1;
                    entry.stills += 1;
                }
                TaskKind::Crop { .. } | TaskKind::Fit => entry.stills += 1,
                TaskKind::Pan { .. } => entry.pans += 1,
            }
        }
        out
    }
}

/// Expand `config` over a `canvas_width x canvas_height` canonical image of `source`.
///
/// Per size, in catalog order: every crop window (row-major) followed by its preview and overlay
/// combinations, then the fit still, then the pan. Sizes with no fitting window still get fit
/// and pan tasks and are listed in `skipped`. Pure: no pixels are touched.
pub fn plan_source(
    source: &str,
    canvas_width: u32,
    canvas_height: u32,
    config: &CatalogConfig,
) -> AdsmithResult<SourcePlan> {
    let combos = config.overlays.combinations();
    let mut plan = SourcePlan {
        source: source.to_string(),
        canvas: (canvas_width, canvas_height),
        ..SourcePlan::default()
    };

    for size in config.sizes.iter() {
        let windows = Windows::new(canvas_width, canvas_height, size, config.step)?;
        if windows.total() == 0 {
            plan.skipped.push(SkippedSize {
                size: size.name.clone(),
                reason: format!(
                    "{}x{} does not fit the {canvas_width}x{canvas_height} canvas",
                    size.width, size.height
                ),
            });
        }

        for (crop, window) in windows.enumerate() {
            let crop = crop as u64;
            plan.tasks.push(Task {
                id: ArtifactId::preview(source, &size.name, crop),
                size: size.clone(),
                kind: TaskKind::Crop {
                    window,
                    overlay: None,
                },
            });
            for (overlay_id, spec) in &combos {
                plan.tasks.push(Task {
                    id: ArtifactId::overlay(source, &size.name, crop, overlay_id.clone()),
                    size: size.clone(),
                    kind: TaskKind::Crop {
                        window,
                        overlay: Some(spec.clone()),
                    },
                });
            }
        }

        if config.fit {
            plan.tasks.push(Task {
                id: ArtifactId::fit(source, &size.name),
                size: size.clone(),
                kind: TaskKind::Fit,
            });
        }
        if config.pan.enabled {
            plan.tasks.push(Task {
                id: ArtifactId::pan(source, &size.name),
                size: size.clone(),
                kind: TaskKind::Pan {
                    frame_count: config.pan.frame_count,
                },
            });
        }
    }
    Ok(plan)
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/plan.rs"]
mod tests;
