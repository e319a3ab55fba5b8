use std::collections::HashMap;
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::core::{OverlaySpec, Position, Raster};
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::overlay::font::{FontHandle, FontProvider, FontStyle};
use crate::overlay::svg::{OverlayDoc, Paint, TextExtent, measure_text};

/// Approximate advance of one glyph relative to the font size, used when no face can measure.
const BUILTIN_ADVANCE: f32 = 0.6;
/// Line height relative to the font size for built-in rendering.
const BUILTIN_LINE_HEIGHT: f32 = 1.2;

/// Visual parameters of the fill-plus-outline text treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayStyle {
    /// Distance from the top/bottom edge (and the side wrap inset) in pixels.
    pub margin_px: u32,
    /// Outline thickness in pixels.
    pub outline_px: u32,
    /// Fill color (RGB).
    pub fill_rgb: [u8; 3],
    /// Outline color (RGB).
    pub outline_rgb: [u8; 3],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            margin_px: 5,
            outline_px: 1,
            fill_rgb: [255, 255, 255],
            outline_rgb: [0, 0, 0],
        }
    }
}

impl OverlayStyle {
    fn paint(self) -> Paint {
        Paint {
            fill: self.fill_rgb,
            outline: self.outline_rgb,
            outline_px: self.outline_px,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    font_size: u32,
    crop_width: u32,
}

#[derive(Clone, Debug)]
struct TextBlock {
    lines: Vec<(String, f32)>,
    line_height: f32,
    ascent: f32,
}

impl TextBlock {
    fn height(&self) -> f32 {
        self.line_height * self.lines.len() as f32
    }
}

/// Renders overlay specs onto crops.
///
/// Holds a layout cache so repeated (text, size, crop width) combinations are wrapped once;
/// create one renderer per worker.
pub struct OverlayRenderer<'a> {
    fonts: &'a dyn FontProvider,
    style: OverlayStyle,
    layouts: HashMap<LayoutKey, TextBlock>,
}

impl<'a> OverlayRenderer<'a> {
    /// Renderer resolving fonts through `fonts`.
    pub fn new(fonts: &'a dyn FontProvider, style: OverlayStyle) -> Self {
        Self {
            fonts,
            style,
            layouts: HashMap::new(),
        }
    }

    /// Number of cached text layouts.
    pub fn cached_layouts(&self) -> usize {
        self.layouts.len()
    }

    /// Render `spec` onto a copy of `crop`; `None` returns the unmodified preview.
    pub fn apply_overlay(
        &mut self,
        crop: &Raster,
        spec: Option<&OverlaySpec>,
    ) -> AdsmithResult<Raster> {
        let Some(spec) = spec else {
            return Ok(crop.clone());
        };
        if spec.font_size == 0 {
            return Err(AdsmithError::validation("overlay font_size must be > 0"));
        }

        let (width, height) = crop.dimensions();
        let font = self.fonts.resolve_font(FontStyle::BoldDisplay, spec.font_size);
        let block = self.layout(&font, &spec.text, width);

        let margin = self.style.margin_px as f32;
        let top = match spec.position {
            Position::Top => margin,
            Position::Middle => ((height as f32 - block.height()) / 2.0).floor(),
            Position::Bottom => height as f32 - block.height() - margin,
        };

        let paint = self.style.paint();
        let mut doc = OverlayDoc::new(width, height);
        for (i, (line, line_width)) in block.lines.iter().enumerate() {
            let line_top = top + block.line_height * i as f32;
            match &font {
                FontHandle::Face { family, size, .. } => {
                    doc.text_line(family, *size, line_top + block.ascent, line, paint);
                }
                FontHandle::Builtin { size } => {
                    doc.placeholder_line(line_top, *line_width, *size as f32, paint);
                }
            }
        }

        let mut out = crop.clone();
        let db = match &font {
            FontHandle::Face { fontdb, .. } => Arc::clone(fontdb),
            FontHandle::Builtin { .. } => Arc::new(fontdb::Database::new()),
        };
        doc.composite_over(&mut out, &db)?;
        Ok(out)
    }

    fn layout(&mut self, font: &FontHandle, text: &str, crop_width: u32) -> TextBlock {
        let key = LayoutKey {
            text: text.to_string(),
            font_size: font.size(),
            crop_width,
        };
        if let Some(block) = self.layouts.get(&key) {
            return block.clone();
        }

        let max_width = crop_width.saturating_sub(self.style.margin_px * 2).max(1) as f32;
        let block = wrap_text(text, max_width, |s| measure(font, s));
        self.layouts.insert(key, block.clone());
        block
    }
}

/// One-shot overlay rendering without a layout cache.
pub fn apply_overlay(
    crop: &Raster,
    spec: Option<&OverlaySpec>,
    fonts: &dyn FontProvider,
    style: OverlayStyle,
) -> AdsmithResult<Raster> {
    OverlayRenderer::new(fonts, style).apply_overlay(crop, spec)
}

fn measure(font: &FontHandle, text: &str) -> TextExtent {
    let size = font.size() as f32;
    let estimate = TextExtent {
        width: text.chars().count() as f32 * size * BUILTIN_ADVANCE,
        height: size * BUILTIN_LINE_HEIGHT,
        ascent: size,
    };
    match font {
        FontHandle::Face {
            fontdb,
            family,
            size,
        } => measure_text(fontdb, family, *size, text).unwrap_or(estimate),
        FontHandle::Builtin { .. } => estimate,
    }
}

/// Greedy word wrap to `max_width`; a word wider than the line keeps its own line.
fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> TextExtent) -> TextBlock {
    let mut lines = Vec::<(String, f32)>::new();
    let mut current = String::new();
    let mut current_width = 0.0f32;

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let candidate_width = measure(&candidate).width;
        if candidate_width <= max_width || current.is_empty() {
            current = candidate;
            current_width = candidate_width;
        } else {
            lines.push((std::mem::take(&mut current), current_width));
            current_width = measure(word).width;
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push((current, current_width));
    }

    let metrics = measure("Ay");
    TextBlock {
        lines,
        line_height: metrics.height.ceil(),
        ascent: metrics.ascent,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/compositor.rs"]
mod tests;
