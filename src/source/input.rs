use std::path::Path;

use anyhow::Context as _;

use crate::catalog::id::sanitize_component;
use crate::foundation::core::Raster;
use crate::foundation::error::{AdsmithError, AdsmithResult};

/// Immutable source raster plus the identity used in artifact identifiers.
#[derive(Clone, Debug)]
pub struct SourceImage {
    id: String,
    raster: Raster,
}

impl SourceImage {
    /// Wrap an in-memory raster. `id` is sanitized into an identifier component.
    pub fn new(id: &str, raster: Raster) -> AdsmithResult<Self> {
        let (w, h) = raster.dimensions();
        if w == 0 || h == 0 {
            return Err(AdsmithError::invalid_image(format!(
                "source '{id}' has zero dimension ({w}x{h})"
            )));
        }
        let id = sanitize_component(id);
        if id.is_empty() {
            return Err(AdsmithError::validation(
                "source id must contain at least one alphanumeric character",
            ));
        }
        Ok(Self { id, raster })
    }

    /// Decode an image file; the id is derived from the file stem.
    pub fn open(path: &Path) -> AdsmithResult<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                AdsmithError::invalid_image(format!("'{}' has no usable file stem", path.display()))
            })?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read source image '{}'", path.display()))?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            AdsmithError::invalid_image(format!("decode '{}': {e}", path.display()))
        })?;
        Self::new(stem, decoded.to_rgba8())
    }

    /// Identifier component for this source.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Borrow the source pixels.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}
