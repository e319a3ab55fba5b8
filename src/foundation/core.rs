use crate::foundation::error::{AdsmithError, AdsmithResult};

/// Straight-alpha RGBA8 raster used for every image flowing through the engine.
pub type Raster = image::RgbaImage;

/// Orientation class of a raster, derived from its edge lengths.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide.
    Portrait,
    /// Wider than tall.
    Landscape,
    /// Equal edges.
    Square,
}

impl Orientation {
    /// Classify a `width x height` pair.
    pub fn of(width: u32, height: u32) -> Self {
        match width.cmp(&height) {
            std::cmp::Ordering::Greater => Self::Landscape,
            std::cmp::Ordering::Less => Self::Portrait,
            std::cmp::Ordering::Equal => Self::Square,
        }
    }

    /// Lowercase name used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
            Self::Square => "square",
        }
    }
}

/// Named output dimension pair from the ad-size catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSize {
    /// Catalog name, unique within a run (for example `medium_rectangle`).
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TargetSize {
    /// Create a target size. Validation happens when the owning catalog is validated.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// `(width, height)` tuple.
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return `true` when the size is strictly wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Return `true` when a `width x height` canvas can hold this size.
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.width <= width && self.height <= height
    }

    pub(crate) fn validate(&self) -> AdsmithResult<()> {
        if self.name.trim().is_empty() {
            return Err(AdsmithError::validation("target size name must be non-empty"));
        }
        if self.name.contains(['/', '\\']) {
            return Err(AdsmithError::validation(format!(
                "target size name '{}' must not contain path separators",
                self.name
            )));
        }
        if self.name.chars().all(|c| c == '.') {
            return Err(AdsmithError::validation(format!(
                "target size name '{}' must not consist only of dots",
                self.name
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(AdsmithError::validation(format!(
                "target size '{}' must have non-zero width and height",
                self.name
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for TargetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}

/// Axis-aligned crop rectangle inside a larger raster.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CropWindow {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropWindow {
    /// Return `true` when the window lies fully inside a `width x height` raster.
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }

    /// `(x, y)` origin.
    pub fn origin(self) -> (u32, u32) {
        (self.x, self.y)
    }
}

/// Vertical placement of an overlay text block.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Near the top edge, offset by the margin.
    Top,
    /// Vertically centered.
    Middle,
    /// Near the bottom edge, offset by the margin.
    Bottom,
}

impl Position {
    /// All positions in enumeration order.
    pub const ALL: [Position; 3] = [Position::Top, Position::Middle, Position::Bottom];

    /// Lowercase name used in identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

/// One text overlay: text, font size and vertical position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct OverlaySpec {
    /// Text to render.
    pub text: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Vertical placement.
    pub position: Position,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
