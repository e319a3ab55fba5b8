use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::{Delay, ExtendedColorType, Frame, ImageFormat};

use crate::catalog::id::ArtifactId;
use crate::encode::sink::ArtifactSink;
use crate::foundation::core::Raster;
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::pan::sequencer::PanFrame;

/// JPEG quality used for still artifacts.
pub const JPEG_QUALITY: u8 = 95;

/// Encoding of still artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StillFormat {
    /// Opaque JPEG; alpha is dropped.
    #[default]
    Jpeg,
    /// Lossless PNG with alpha.
    Png,
}

impl StillFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Sink writing each artifact to `root/<identifier>.<ext>`.
///
/// Stills are JPEG or PNG; sequences are infinitely looping GIFs.
#[derive(Clone, Debug)]
pub struct DirSink {
    root: PathBuf,
    format: StillFormat,
    written: u64,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>, format: StillFormat) -> Self {
        Self {
            root: root.into(),
            format,
            written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the still artifact `id`.
    pub fn still_path(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(format!("{id}.{}", self.format.extension()))
    }

    /// Path of the sequence artifact `id`.
    pub fn sequence_path(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(format!("{id}.gif"))
    }
}

impl ArtifactSink for DirSink {
    fn write_still(&mut self, id: &ArtifactId, raster: &Raster) -> AdsmithResult<()> {
        let path = self.still_path(id);
        ensure_parent_dir(&path)?;
        match self.format {
            StillFormat::Jpeg => write_jpeg(&path, raster)?,
            StillFormat::Png => raster
                .save_with_format(&path, ImageFormat::Png)
                .with_context(|| format!("write png '{}'", path.display()))?,
        }
        self.written += 1;
        Ok(())
    }

    fn write_sequence(
        &mut self,
        id: &ArtifactId,
        frames: &[PanFrame],
        delay_ms: u32,
    ) -> AdsmithResult<()> {
        if frames.is_empty() {
            return Err(AdsmithError::validation(format!(
                "sequence '{id}' has no frames"
            )));
        }
        let path = self.sequence_path(id);
        ensure_parent_dir(&path)?;
        write_gif(&path, frames, delay_ms)?;
        self.written += 1;
        Ok(())
    }
}

fn write_jpeg(path: &Path, raster: &Raster) -> AdsmithResult<()> {
    let rgb = image::DynamicImage::ImageRgba8(raster.clone()).into_rgb8();
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut enc = JpegEncoder::new_with_quality(BufWriter::new(f), JPEG_QUALITY);
    enc.encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .with_context(|| format!("encode jpeg '{}'", path.display()))?;
    Ok(())
}

/// Encode `frames` as an infinitely looping GIF at `path`.
pub fn write_gif(path: &Path, frames: &[PanFrame], delay_ms: u32) -> AdsmithResult<()> {
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut enc = GifEncoder::new(BufWriter::new(f));
    enc.set_repeat(Repeat::Infinite)
        .with_context(|| format!("set gif loop '{}'", path.display()))?;
    let delay = Delay::from_numer_denom_ms(delay_ms, 1);
    enc.encode_frames(
        frames
            .iter()
            .map(|f| Frame::from_parts(f.raster.clone(), 0, 0, delay)),
    )
    .with_context(|| format!("encode gif '{}'", path.display()))?;
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> AdsmithResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/dir.rs"]
mod tests;
