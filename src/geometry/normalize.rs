use image::imageops::{self, FilterType};

use crate::foundation::core::{Orientation, Raster};
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::source::input::SourceImage;

/// Source raster after orientation-aware normalization to the working resolution.
#[derive(Clone, Debug)]
pub struct CanonicalImage {
    raster: Raster,
    orientation: Orientation,
}

impl CanonicalImage {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Orientation class of the source (and of the canonical raster).
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Borrow the canonical pixels.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

/// Compute canonical dimensions for a `width x height` source.
///
/// The long edge is scaled to `max_dimension` with the short edge rounded to the nearest pixel.
/// Square sources keep their size regardless of `max_dimension`.
pub fn canonical_dims(
    width: u32,
    height: u32,
    max_dimension: u32,
) -> AdsmithResult<(u32, u32, Orientation)> {
    if width == 0 || height == 0 {
        return Err(AdsmithError::invalid_image(format!(
            "source has zero dimension ({width}x{height})"
        )));
    }
    if max_dimension == 0 {
        return Err(AdsmithError::validation("max_dimension must be > 0"));
    }

    let orientation = Orientation::of(width, height);
    let (w, h) = match orientation {
        Orientation::Square => (width, height),
        Orientation::Landscape => {
            let mut w = max_dimension;
            let mut h = scale_edge(height, max_dimension, width);
            if h > max_dimension {
                h = max_dimension;
                w = scale_edge(width, max_dimension, height);
            }
            (w, h)
        }
        Orientation::Portrait => {
            let mut h = max_dimension;
            let mut w = scale_edge(width, max_dimension, height);
            if w > max_dimension {
                w = max_dimension;
                h = scale_edge(height, max_dimension, width);
            }
            (w, h)
        }
    };
    Ok((w, h, orientation))
}

/// `edge * num / den`, rounded to nearest and clamped to at least one pixel.
fn scale_edge(edge: u32, num: u32, den: u32) -> u32 {
    let den = u64::from(den);
    let scaled = (u64::from(edge) * u64::from(num) + den / 2) / den;
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// Map a source raster to the canonical working size.
///
/// The source is never mutated; a new raster is always produced.
#[tracing::instrument(skip(source), fields(source = %source.id()))]
pub fn normalize(source: &SourceImage, max_dimension: u32) -> AdsmithResult<CanonicalImage> {
    let raster = source.raster();
    let (src_w, src_h) = raster.dimensions();
    let (w, h, orientation) = canonical_dims(src_w, src_h, max_dimension)?;

    let out = if (w, h) == (src_w, src_h) {
        raster.clone()
    } else {
        imageops::resize(raster, w, h, FilterType::Lanczos3)
    };
    tracing::info!(
        "{}: {} {src_w}x{src_h} -> {w}x{h}",
        source.id(),
        orientation.as_str()
    );

    Ok(CanonicalImage {
        raster: out,
        orientation,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/normalize.rs"]
mod tests;
