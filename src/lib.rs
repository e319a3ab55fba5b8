//! adsmith generates deterministic, combinatorial sets of ad creatives from source images.
//!
//! A run takes each source through the same stages:
//!
//! - Normalize it to a canonical working size ([`normalize`])
//! - Enumerate sliding-window crops per target size ([`enumerate_windows`])
//! - Render every crop bare and under each overlay combination ([`apply_overlay`])
//! - Pan target-sized frames across the image ([`generate_pan`])
//!
//! [`Catalog`] plans the full cross product for a [`CatalogConfig`], renders it on a worker pool
//! and hands every artifact to an [`ArtifactSink`] under a stable [`ArtifactId`]. Identical inputs
//! and configuration reproduce identical identifiers.
#![forbid(unsafe_code)]

mod foundation;

pub mod catalog;
pub mod encode;
pub mod geometry;
pub mod overlay;
pub mod pan;
pub mod prune;
pub mod source;
pub mod window;

pub use crate::foundation::core::{
    CropWindow, Orientation, OverlaySpec, Position, Raster, TargetSize,
};
pub use crate::foundation::error::{AdsmithError, AdsmithResult};

pub use crate::catalog::config::{CatalogConfig, FontConfig, OverlayAxes, PanConfig, SizeCatalog};
pub use crate::catalog::id::{ArtifactId, ArtifactKind, OverlayId};
pub use crate::catalog::plan::{SourcePlan, Task, TaskKind, plan_source};
pub use crate::catalog::run::{
    Catalog, RunReport, RunState, SizeOutcome, SizeReport, SourceReport, Stage,
};
pub use crate::encode::dir::{DirSink, StillFormat, write_gif};
pub use crate::encode::ffmpeg::{Mp4SequenceSink, Mp4SinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{ArtifactSink, InMemorySink, StoredArtifact, raster_digest};
pub use crate::geometry::fit::fit_to_size;
pub use crate::geometry::normalize::{CanonicalImage, normalize};
pub use crate::overlay::compositor::{OverlayRenderer, OverlayStyle, apply_overlay};
pub use crate::overlay::font::{FontHandle, FontProvider, FontStyle, SystemFontProvider};
pub use crate::pan::sequencer::{PanDirection, PanFrame, PanPath, PanSequence, generate_pan};
pub use crate::prune::binomial::{
    CtrTest, PerformanceRecord, PrunePolicy, Verdict, binomial_less_p_value, load_records,
};
pub use crate::source::discover::discover_sources;
pub use crate::source::input::SourceImage;
pub use crate::source::master::{MasterImageProvider, MasterRequest, StaticMasterProvider};
pub use crate::window::enumerate::{Windows, enumerate_windows};
