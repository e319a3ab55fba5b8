use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use xxhash_rust::xxh3::Xxh3;

use crate::catalog::config::CatalogConfig;
use crate::catalog::plan::{SourcePlan, Task, TaskKind, plan_source};
use crate::encode::sink::ArtifactSink;
use crate::foundation::core::Raster;
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::geometry::fit::fit_to_size;
use crate::geometry::normalize::{canonical_dims, normalize};
use crate::overlay::compositor::OverlayRenderer;
use crate::overlay::font::{FontProvider, SystemFontProvider};
use crate::pan::sequencer::{PanFrame, PanPath, generate_pan};
use crate::source::input::SourceImage;
use crate::source::master::{MasterImageProvider, MasterRequest};
use crate::window::enumerate::crop;

/// Lifecycle of one source within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    NormalizingSource,
    EnumeratingSizes,
    EnumeratingCrops,
    BuildingPanSequence,
    MaterializingVariants,
    Done,
}

/// Artifact family reported per size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Crops,
    Fit,
    Pan,
}

impl Stage {
    const ALL: [Stage; 3] = [Stage::Crops, Stage::Fit, Stage::Pan];

    fn of(kind: &TaskKind) -> Self {
        match kind {
            TaskKind::Crop { .. } => Self::Crops,
            TaskKind::Fit => Self::Fit,
            TaskKind::Pan { .. } => Self::Pan,
        }
    }
}

/// Outcome of one stage for one size.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SizeOutcome {
    /// Every planned artifact was written.
    Written { artifacts: u64 },
    /// Nothing to produce; not an error.
    Skipped { reason: String },
    /// At least one artifact failed; `written` others still made it to the sink.
    Failed { error: String, written: u64, failed: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SizeReport {
    pub size: String,
    pub stage: Stage,
    pub outcome: SizeOutcome,
}

/// Result of running one source.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SourceReport {
    pub source: String,
    /// Canonical dimensions, once normalized.
    pub canvas: Option<(u32, u32)>,
    /// States entered, in order.
    pub states: Vec<RunState>,
    pub sizes: Vec<SizeReport>,
    /// Source-level failure (load, decode, normalize, synthesis).
    pub error: Option<String>,
    /// Artifacts accepted by the sink.
    pub artifacts: u64,
}

impl SourceReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            canvas: None,
            states: vec![RunState::Idle],
            sizes: Vec::new(),
            error: None,
            artifacts: 0,
        }
    }

    fn failed(source: &str, err: &AdsmithError) -> Self {
        Self::new(source).fail(err)
    }

    fn fail(mut self, err: &AdsmithError) -> Self {
        tracing::warn!(source = %self.source, "source failed: {err}");
        self.error = Some(err.to_string());
        self
    }

    fn enter(&mut self, state: RunState) {
        tracing::debug!(source = %self.source, ?state, "state transition");
        self.states.push(state);
    }

    /// Outcome recorded for `size` at `stage`.
    pub fn outcome(&self, size: &str, stage: Stage) -> Option<&SizeOutcome> {
        self.sizes
            .iter()
            .find(|r| r.size == size && r.stage == stage)
            .map(|r| &r.outcome)
    }
}

/// Result of a whole run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
    pub artifacts: u64,
    /// xxh3 of every written identifier in write order, as hex.
    pub ids_digest: String,
}

impl RunReport {
    /// Sources that failed as a whole.
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }

    /// Source report by id.
    pub fn source(&self, id: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.source == id)
    }
}

enum Rendered {
    Still(Raster),
    Sequence(Vec<PanFrame>),
}

#[derive(Default)]
struct StageTally {
    written: u64,
    failed: u64,
    first_error: Option<String>,
}

/// Drives normalization, planning and materialization for a fixed configuration.
///
/// Rendering runs on a private rayon pool in chunks of `chunk_size` artifacts; sink writes
/// happen on the calling thread in plan order, so output order never depends on thread count.
pub struct Catalog {
    config: CatalogConfig,
    fonts: Arc<dyn FontProvider>,
    pool: rayon::ThreadPool,
}

impl Catalog {
    /// Validate `config` and build the worker pool. An invalid configuration is fatal.
    pub fn new(config: CatalogConfig, fonts: Arc<dyn FontProvider>) -> AdsmithResult<Self> {
        config.validate()?;
        let pool = build_thread_pool(config.threads)?;
        Ok(Self {
            config,
            fonts,
            pool,
        })
    }

    /// Catalog resolving fonts from the system plus `config.fonts.font_dirs`.
    pub fn with_system_fonts(config: CatalogConfig) -> AdsmithResult<Self> {
        let fonts = SystemFontProvider::new(
            &config.fonts.display_families,
            &config.fonts.font_dirs,
        );
        Self::new(config, Arc::new(fonts))
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Plan a source of `width x height` without decoding it.
    pub fn plan_dims(&self, source: &str, width: u32, height: u32) -> AdsmithResult<SourcePlan> {
        let (w, h, _) = canonical_dims(width, height, self.config.max_dimension)?;
        plan_source(source, w, h, &self.config)
    }

    /// Plan a loaded source.
    pub fn plan(&self, source: &SourceImage) -> AdsmithResult<SourcePlan> {
        let (w, h) = source.raster().dimensions();
        self.plan_dims(source.id(), w, h)
    }

    /// Run every source; per-source failures are reported, not returned.
    pub fn run_sources(
        &self,
        sources: &[SourceImage],
        sink: &mut dyn ArtifactSink,
    ) -> AdsmithResult<RunReport> {
        let mut ids = Xxh3::new();
        let mut taken = SourceIds::default();
        let reports = sources
            .iter()
            .map(|s| {
                let id = taken.claim(s.id());
                self.run_one(&id, s, sink, &mut ids)
            })
            .collect();
        finish(reports, ids, sink)
    }

    /// Load and run every image file; unreadable files become failed source reports.
    pub fn run_paths(
        &self,
        paths: &[PathBuf],
        sink: &mut dyn ArtifactSink,
    ) -> AdsmithResult<RunReport> {
        let mut ids = Xxh3::new();
        let mut taken = SourceIds::default();
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            match SourceImage::open(path) {
                Ok(source) => {
                    let id = taken.claim(source.id());
                    reports.push(self.run_one(&id, &source, sink, &mut ids));
                }
                Err(e) => reports.push(SourceReport::failed(&path.display().to_string(), &e)),
            }
        }
        finish(reports, ids, sink)
    }

    /// Synthesize a master through `provider`, then run it as the only source.
    pub fn run_master(
        &self,
        provider: &dyn MasterImageProvider,
        request: &MasterRequest,
        sink: &mut dyn ArtifactSink,
    ) -> AdsmithResult<RunReport> {
        let id = request.source_id();
        let mut ids = Xxh3::new();
        let report = match provider
            .synthesize(request)
            .and_then(|raster| SourceImage::new(&id, raster))
        {
            Ok(master) => self.run_one(master.id(), &master, sink, &mut ids),
            Err(e) => SourceReport::failed(&id, &e),
        };
        finish(vec![report], ids, sink)
    }

    #[tracing::instrument(skip(self, source, sink, ids))]
    fn run_one(
        &self,
        id: &str,
        source: &SourceImage,
        sink: &mut dyn ArtifactSink,
        ids: &mut Xxh3,
    ) -> SourceReport {
        let mut report = SourceReport::new(id);

        report.enter(RunState::NormalizingSource);
        let canonical = match normalize(source, self.config.max_dimension) {
            Ok(c) => c,
            Err(e) => return report.fail(&e),
        };
        report.canvas = Some((canonical.width(), canonical.height()));

        report.enter(RunState::EnumeratingSizes);
        report.enter(RunState::EnumeratingCrops);
        let plan = match plan_source(
            id,
            canonical.width(),
            canonical.height(),
            &self.config,
        ) {
            Ok(p) => p,
            Err(e) => return report.fail(&e),
        };
        for skipped in &plan.skipped {
            tracing::debug!(size = %skipped.size, "no crop windows: {}", skipped.reason);
        }
        if self.config.pan.enabled {
            report.enter(RunState::BuildingPanSequence);
            log_pan_paths(&plan);
        }

        report.enter(RunState::MaterializingVariants);
        let tallies = self.materialize(canonical.raster(), &plan, sink, ids);
        report.artifacts = tallies.values().map(|t| t.written).sum();
        report.sizes = self.size_reports(&plan, tallies);

        report.enter(RunState::Done);
        tracing::info!(
            "{}: {} artifacts over {} sizes ({} skipped)",
            id,
            report.artifacts,
            self.config.sizes.len(),
            plan.skipped.len()
        );
        report
    }

    fn materialize(
        &self,
        canvas: &Raster,
        plan: &SourcePlan,
        sink: &mut dyn ArtifactSink,
        ids: &mut Xxh3,
    ) -> BTreeMap<(usize, Stage), StageTally> {
        let size_index: HashMap<&str, usize> = self
            .config
            .sizes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.as_str(), i))
            .collect();
        let fonts: &dyn FontProvider = self.fonts.as_ref();
        let style = self.config.overlay_style();
        let delay_ms = self.config.pan.frame_delay_ms;
        let mut tallies = BTreeMap::<(usize, Stage), StageTally>::new();

        for chunk in plan.tasks.chunks(self.config.chunk_size.max(1)) {
            let rendered = self.pool.install(|| {
                chunk
                    .par_iter()
                    .map_init(
                        || OverlayRenderer::new(fonts, style),
                        |renderer, task| render_task(renderer, canvas, task),
                    )
                    .collect::<Vec<_>>()
            });

            for (task, result) in chunk.iter().zip(rendered) {
                let written = result.and_then(|r| match r {
                    Rendered::Still(raster) => sink.write_still(&task.id, &raster),
                    Rendered::Sequence(frames) => sink.write_sequence(&task.id, &frames, delay_ms),
                });
                let key = (
                    size_index.get(task.size.name.as_str()).copied().unwrap_or(usize::MAX),
                    Stage::of(&task.kind),
                );
                let tally = tallies.entry(key).or_default();
                match written {
                    Ok(()) => {
                        ids.update(task.id.to_string().as_bytes());
                        ids.update(b"\n");
                        tally.written += 1;
                    }
                    Err(e) => {
                        tracing::warn!(id = %task.id, "artifact failed: {e}");
                        tally.failed += 1;
                        tally.first_error.get_or_insert_with(|| e.to_string());
                    }
                }
            }
        }
        tallies
    }

    fn size_reports(
        &self,
        plan: &SourcePlan,
        mut tallies: BTreeMap<(usize, Stage), StageTally>,
    ) -> Vec<SizeReport> {
        let mut out = Vec::new();
        for (i, size) in self.config.sizes.iter().enumerate() {
            for stage in Stage::ALL {
                let skipped = plan.skipped.iter().find(|s| s.size == size.name);
                let outcome = match (stage, skipped, tallies.remove(&(i, stage))) {
                    (Stage::Crops, Some(s), _) => SizeOutcome::Skipped {
                        reason: s.reason.clone(),
                    },
                    (_, _, Some(t)) => match t.first_error {
                        None => SizeOutcome::Written {
                            artifacts: t.written,
                        },
                        Some(error) => SizeOutcome::Failed {
                            error,
                            written: t.written,
                            failed: t.failed,
                        },
                    },
                    (_, _, None) => continue,
                };
                out.push(SizeReport {
                    size: size.name.clone(),
                    stage,
                    outcome,
                });
            }
        }
        out
    }
}

fn render_task(
    renderer: &mut OverlayRenderer<'_>,
    canvas: &Raster,
    task: &Task,
) -> AdsmithResult<Rendered> {
    match &task.kind {
        TaskKind::Crop { window, overlay } => {
            let cropped = crop(canvas, *window)?;
            let out = match overlay {
                None => cropped,
                Some(spec) => renderer.apply_overlay(&cropped, Some(spec))?,
            };
            Ok(Rendered::Still(out))
        }
        TaskKind::Fit => Ok(Rendered::Still(fit_to_size(canvas, &task.size)?)),
        TaskKind::Pan { frame_count } => Ok(Rendered::Sequence(
            generate_pan(canvas, &task.size, *frame_count)?.collect(),
        )),
    }
}

fn log_pan_paths(plan: &SourcePlan) {
    let (w, h) = plan.canvas;
    for task in &plan.tasks {
        let TaskKind::Pan { frame_count } = task.kind else {
            continue;
        };
        match PanPath::new(w, h, &task.size, frame_count) {
            Ok(path) => tracing::debug!(
                size = %task.size.name,
                direction = path.direction().arrow(),
                span = path.span(),
                frames = path.frame_count(),
                "pan path"
            ),
            Err(e) => tracing::debug!(size = %task.size.name, "pan path unavailable: {e}"),
        }
    }
}

/// Hands out run-unique source ids; a repeated id gets `_2`, `_3`, ... in input order.
#[derive(Default)]
struct SourceIds {
    taken: HashSet<String>,
}

impl SourceIds {
    fn claim(&mut self, id: &str) -> String {
        if self.taken.insert(id.to_string()) {
            return id.to_string();
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{id}_{n}");
            if self.taken.insert(candidate.clone()) {
                tracing::warn!(source = %id, renamed = %candidate, "duplicate source id");
                return candidate;
            }
            n += 1;
        }
    }
}

fn finish(
    sources: Vec<SourceReport>,
    ids: Xxh3,
    sink: &mut dyn ArtifactSink,
) -> AdsmithResult<RunReport> {
    sink.finish()?;
    let artifacts = sources.iter().map(|s| s.artifacts).sum();
    Ok(RunReport {
        sources,
        artifacts,
        ids_digest: format!("{:016x}", ids.digest()),
    })
}

fn build_thread_pool(threads: Option<usize>) -> AdsmithResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AdsmithError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AdsmithError::render(format!("failed to build rayon thread pool: {e}")))
}
