use crate::foundation::core::Position;

/// Maximum number of characters kept in an overlay text slug.
pub const TEXT_SLUG_LEN: usize = 8;

/// Lowercase `raw`, map every run of non-alphanumeric characters to one `_`, trim `_` at both
/// ends.
pub fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// First [`TEXT_SLUG_LEN`] ASCII alphanumerics of `text`, lowercased.
pub fn text_slug(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .take(TEXT_SLUG_LEN)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Identity of one overlay combination within a crop.
///
/// The text index disambiguates texts that share a slug.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId {
    pub font_size: u32,
    pub text_index: usize,
    pub slug: String,
    pub position: Position,
}

impl OverlayId {
    pub fn new(font_size: u32, text_index: usize, text: &str, position: Position) -> Self {
        Self {
            font_size,
            text_index,
            slug: text_slug(text),
            position,
        }
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "f{}-t{}-{}-{}",
            self.font_size,
            self.text_index,
            self.slug,
            self.position.as_str()
        )
    }
}

/// What an artifact is, relative to its source and size.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Unannotated crop.
    Preview { crop: u64 },
    /// Crop with one overlay applied.
    Overlay { crop: u64, overlay: OverlayId },
    /// Whole image center-cropped and resized to the size.
    Fit,
    /// Panning frame sequence.
    Pan,
}

/// Stable identifier of a materialized artifact.
///
/// Displays as a `/`-separated relative path, for example
/// `beach/medium_rectangle/crop7/f20-t0-buynow-top`. Identical inputs and configuration always
/// produce identical identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactId {
    pub source: String,
    pub size: String,
    pub kind: ArtifactKind,
}

impl ArtifactId {
    pub fn preview(source: &str, size: &str, crop: u64) -> Self {
        Self::with_kind(source, size, ArtifactKind::Preview { crop })
    }

    pub fn overlay(source: &str, size: &str, crop: u64, overlay: OverlayId) -> Self {
        Self::with_kind(source, size, ArtifactKind::Overlay { crop, overlay })
    }

    pub fn fit(source: &str, size: &str) -> Self {
        Self::with_kind(source, size, ArtifactKind::Fit)
    }

    pub fn pan(source: &str, size: &str) -> Self {
        Self::with_kind(source, size, ArtifactKind::Pan)
    }

    fn with_kind(source: &str, size: &str, kind: ArtifactKind) -> Self {
        Self {
            source: source.to_string(),
            size: size.to_string(),
            kind,
        }
    }

    /// Crop index for crop-derived artifacts.
    pub fn crop(&self) -> Option<u64> {
        match self.kind {
            ArtifactKind::Preview { crop } | ArtifactKind::Overlay { crop, .. } => Some(crop),
            ArtifactKind::Fit | ArtifactKind::Pan => None,
        }
    }

    /// Key of frame `index` inside a pan sequence (`…/pan/f007`).
    pub fn frame_key(&self, index: u32) -> String {
        format!("{self}/f{index:03}")
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/", self.source, self.size)?;
        match &self.kind {
            ArtifactKind::Preview { crop } => write!(f, "crop{crop}/preview"),
            ArtifactKind::Overlay { crop, overlay } => write!(f, "crop{crop}/{overlay}"),
            ArtifactKind::Fit => f.write_str("fit"),
            ArtifactKind::Pan => f.write_str("pan"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/id.rs"]
mod tests;
