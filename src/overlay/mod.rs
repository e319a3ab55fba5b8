//! Text overlays composited onto crops.

/// Overlay rendering and text layout.
pub mod compositor;
/// Font resolution and fallback.
pub mod font;
mod svg;
