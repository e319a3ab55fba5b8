//! Canonical sizing of source rasters.

/// Center-crop-and-resize of a raster to an exact ad size.
pub mod fit;
/// Orientation-aware normalization to the working resolution.
pub mod normalize;
