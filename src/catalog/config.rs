use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::core::{OverlaySpec, Position, TargetSize};
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::catalog::id::OverlayId;
use crate::overlay::compositor::OverlayStyle;
use crate::overlay::font::default_display_families;

/// Target sizes, partitioned into desktop and mobile groups.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeCatalog {
    #[serde(default)]
    pub desktop: Vec<TargetSize>,
    #[serde(default)]
    pub mobile: Vec<TargetSize>,
}

impl Default for SizeCatalog {
    /// Standard IAB sizes snapped to multiples of 8.
    fn default() -> Self {
        let t = TargetSize::new;
        Self {
            desktop: vec![
                t("medium_rectangle", 304, 248),
                t("leaderboard", 728, 88),
                t("wide_skyscraper", 160, 600),
                t("half_page", 304, 600),
                t("large_rectangle", 336, 280),
                t("billboard", 968, 248),
                t("large_leaderboard", 968, 88),
                t("square", 248, 248),
            ],
            mobile: vec![
                t("mobile_leaderboard", 320, 48),
                t("large_mobile_banner", 320, 104),
                t("small_square", 200, 200),
                t("interstitial_portrait", 320, 480),
                t("interstitial_landscape", 480, 320),
            ],
        }
    }
}

impl SizeCatalog {
    /// Desktop sizes followed by mobile sizes.
    pub fn iter(&self) -> impl Iterator<Item = &TargetSize> {
        self.desktop.iter().chain(self.mobile.iter())
    }

    pub fn len(&self) -> usize {
        self.desktop.len() + self.mobile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look a size up by name.
    pub fn get(&self, name: &str) -> Option<&TargetSize> {
        self.iter().find(|s| s.name == name)
    }
}

/// Axes whose cross product yields the overlay combinations of every crop.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayAxes {
    pub texts: Vec<String>,
    pub font_sizes: Vec<u32>,
    pub positions: Vec<Position>,
}

impl Default for OverlayAxes {
    fn default() -> Self {
        Self {
            texts: vec![
                "Buy Now!".to_string(),
                "Limited Time Offer!".to_string(),
                "Best Prices Guaranteed!".to_string(),
            ],
            font_sizes: vec![16, 20, 24],
            positions: Position::ALL.to_vec(),
        }
    }
}

impl OverlayAxes {
    /// Number of overlay combinations per crop.
    pub fn combination_count(&self) -> usize {
        self.texts.len() * self.font_sizes.len() * self.positions.len()
    }

    /// Every combination in enumeration order: font size, then text, then position.
    pub fn combinations(&self) -> Vec<(OverlayId, OverlaySpec)> {
        let mut out = Vec::with_capacity(self.combination_count());
        for &font_size in &self.font_sizes {
            for (text_index, text) in self.texts.iter().enumerate() {
                for &position in &self.positions {
                    out.push((
                        OverlayId::new(font_size, text_index, text, position),
                        OverlaySpec {
                            text: text.clone(),
                            font_size,
                            position,
                        },
                    ));
                }
            }
        }
        out
    }
}

/// Panning animation settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanConfig {
    pub enabled: bool,
    pub frame_count: u32,
    /// Display time of each frame when encoded.
    pub frame_delay_ms: u32,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_count: 40,
            frame_delay_ms: 300,
        }
    }
}

/// Font discovery settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Preferred display families, tried in order.
    pub display_families: Vec<String>,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            display_families: default_display_families(),
            font_dirs: Vec::new(),
        }
    }
}

/// Explicit configuration handed to [`crate::Catalog`] at run start.
///
/// Every field has a default; a JSON file only needs the fields it overrides.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Long-edge cap for canonical images.
    pub max_dimension: u32,
    /// Sliding-window step in pixels.
    pub step: u32,
    pub sizes: SizeCatalog,
    pub overlays: OverlayAxes,
    /// Text block inset from the crop edge.
    pub margin_px: u32,
    /// Text outline thickness.
    pub outline_px: u32,
    pub pan: PanConfig,
    /// Emit one center-crop-and-resize still per size.
    pub fit: bool,
    pub fonts: FontConfig,
    /// Worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Artifacts rendered per scheduling batch.
    pub chunk_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_dimension: 970,
            step: 50,
            sizes: SizeCatalog::default(),
            overlays: OverlayAxes::default(),
            margin_px: 5,
            outline_px: 1,
            pan: PanConfig::default(),
            fit: true,
            fonts: FontConfig::default(),
            threads: None,
            chunk_size: 64,
        }
    }
}

impl CatalogConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> AdsmithResult<Self> {
        serde_json::from_reader(r).map_err(|e| AdsmithError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> AdsmithResult<Self> {
        serde_json::from_str(s).map_err(|e| AdsmithError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> AdsmithResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            AdsmithError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty-printed JSON form.
    pub fn to_json_pretty(&self) -> AdsmithResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AdsmithError::serde(format!("serialize config JSON: {e}")))
    }

    /// Overlay style derived from the margin and outline settings.
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            margin_px: self.margin_px,
            outline_px: self.outline_px,
            ..OverlayStyle::default()
        }
    }

    /// Reject configurations no run can proceed with.
    pub fn validate(&self) -> AdsmithResult<()> {
        if self.sizes.is_empty() {
            return Err(AdsmithError::validation("size catalog must not be empty"));
        }
        let mut seen = HashSet::new();
        for size in self.sizes.iter() {
            size.validate()?;
            if !seen.insert(size.name.as_str()) {
                return Err(AdsmithError::validation(format!(
                    "duplicate target size name '{}'",
                    size.name
                )));
            }
        }

        if self.max_dimension == 0 {
            return Err(AdsmithError::validation("max_dimension must be > 0"));
        }
        if self.step == 0 {
            return Err(AdsmithError::validation("step must be > 0"));
        }
        if self.overlays.font_sizes.contains(&0) {
            return Err(AdsmithError::validation("overlay font sizes must be > 0"));
        }
        if self.overlays.texts.iter().any(|t| t.trim().is_empty()) {
            return Err(AdsmithError::validation("overlay texts must be non-empty"));
        }
        if self.pan.enabled && self.pan.frame_count == 0 {
            return Err(AdsmithError::validation(
                "pan frame_count must be > 0 when panning is enabled",
            ));
        }
        if self.threads == Some(0) {
            return Err(AdsmithError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/config.rs"]
mod tests;
