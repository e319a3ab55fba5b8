use xxhash_rust::xxh3::Xxh3;

use crate::catalog::id::ArtifactId;
use crate::foundation::core::Raster;
use crate::foundation::error::AdsmithResult;
use crate::pan::sequencer::PanFrame;

/// Destination for materialized artifacts, keyed by their stable identifier.
///
/// Ordering contract: artifacts of one source arrive in plan order; frames of a sequence arrive
/// with contiguous indices starting at 0.
pub trait ArtifactSink: Send {
    /// Store one still image.
    fn write_still(&mut self, id: &ArtifactId, raster: &Raster) -> AdsmithResult<()>;
    /// Store one looping frame sequence shown `delay_ms` per frame.
    fn write_sequence(
        &mut self,
        id: &ArtifactId,
        frames: &[PanFrame],
        delay_ms: u32,
    ) -> AdsmithResult<()>;
    /// Flush buffered output. Called once after the last artifact of a run.
    fn finish(&mut self) -> AdsmithResult<()> {
        Ok(())
    }
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for &mut S {
    fn write_still(&mut self, id: &ArtifactId, raster: &Raster) -> AdsmithResult<()> {
        (**self).write_still(id, raster)
    }

    fn write_sequence(
        &mut self,
        id: &ArtifactId,
        frames: &[PanFrame],
        delay_ms: u32,
    ) -> AdsmithResult<()> {
        (**self).write_sequence(id, frames, delay_ms)
    }

    fn finish(&mut self) -> AdsmithResult<()> {
        (**self).finish()
    }
}

/// xxh3 digest of a raster's dimensions and pixels.
pub fn raster_digest(raster: &Raster) -> u64 {
    let mut h = Xxh3::new();
    hash_raster(&mut h, raster);
    h.digest()
}

fn hash_raster(h: &mut Xxh3, raster: &Raster) {
    h.update(&raster.width().to_le_bytes());
    h.update(&raster.height().to_le_bytes());
    h.update(raster.as_raw());
}

/// Stored form of one artifact.
#[derive(Clone, Debug)]
pub enum StoredArtifact {
    Still {
        digest: u64,
        raster: Raster,
    },
    Sequence {
        digest: u64,
        /// `(frame key, frame digest)` in sweep order.
        frames: Vec<(String, u64)>,
        delay_ms: u32,
    },
}

impl StoredArtifact {
    /// Content digest.
    pub fn digest(&self) -> u64 {
        match self {
            Self::Still { digest, .. } | Self::Sequence { digest, .. } => *digest,
        }
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    /// Artifacts in arrival order.
    pub(crate) entries: Vec<(String, StoredArtifact)>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured artifacts.
    pub fn entries(&self) -> &[(String, StoredArtifact)] {
        &self.entries
    }

    /// Identifiers in arrival order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Look an artifact up by identifier.
    pub fn get(&self, key: &str) -> Option<&StoredArtifact> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    /// Digest of one pan frame by its frame key (`…/pan/f007`).
    pub fn frame(&self, key: &str) -> Option<u64> {
        self.entries.iter().find_map(|(_, a)| match a {
            StoredArtifact::Sequence { frames, .. } => frames
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, digest)| *digest),
            StoredArtifact::Still { .. } => None,
        })
    }

    /// Number of captured artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArtifactSink for InMemorySink {
    fn write_still(&mut self, id: &ArtifactId, raster: &Raster) -> AdsmithResult<()> {
        self.entries.push((
            id.to_string(),
            StoredArtifact::Still {
                digest: raster_digest(raster),
                raster: raster.clone(),
            },
        ));
        Ok(())
    }

    fn write_sequence(
        &mut self,
        id: &ArtifactId,
        frames: &[PanFrame],
        delay_ms: u32,
    ) -> AdsmithResult<()> {
        let mut h = Xxh3::new();
        h.update(&delay_ms.to_le_bytes());
        let mut keyed = Vec::with_capacity(frames.len());
        for frame in frames {
            keyed.push((id.frame_key(frame.index), raster_digest(&frame.raster)));
            hash_raster(&mut h, &frame.raster);
        }
        self.entries.push((
            id.to_string(),
            StoredArtifact::Sequence {
                digest: h.digest(),
                frames: keyed,
                delay_ms,
            },
        ));
        Ok(())
    }
}
