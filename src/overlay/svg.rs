use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context as _;
use usvg::fontdb;

use crate::foundation::core::Raster;
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::foundation::math::blend_premul_over;

/// Horizontal extent and vertical metrics of a laid-out text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TextExtent {
    pub(crate) width: f32,
    pub(crate) height: f32,
    /// Distance from the top of the ink box to the baseline.
    pub(crate) ascent: f32,
}

/// Measure `text` set in `family` at `size_px`; `None` when no glyphs could be shaped.
pub(crate) fn measure_text(
    fontdb: &Arc<fontdb::Database>,
    family: &str,
    size_px: u32,
    text: &str,
) -> Option<TextExtent> {
    let baseline = (size_px * 2) as f32;
    let doc = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"><text x="0" y="{baseline}" font-family="{family}" font-size="{size_px}" font-weight="bold">{text}</text></svg>"#,
        family = escape_xml(&quote_family(family)),
        text = escape_xml(text),
    );
    let tree = parse_tree(&doc, fontdb).ok()?;
    let root = tree.root();
    if !root.has_children() {
        return None;
    }
    let bbox = root.bounding_box();
    if !bbox.width().is_finite() || bbox.width() <= 0.0 {
        return None;
    }
    Some(TextExtent {
        width: bbox.width(),
        height: bbox.height(),
        ascent: baseline - bbox.top(),
    })
}

/// Paint attributes shared by every overlay element.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Paint {
    pub(crate) fill: [u8; 3],
    pub(crate) outline: [u8; 3],
    pub(crate) outline_px: u32,
}

impl Paint {
    fn attrs(self) -> String {
        format!(
            r#"fill="{}" stroke="{}" stroke-width="{}" stroke-linejoin="round" paint-order="stroke""#,
            hex(self.fill),
            hex(self.outline),
            // Stroke straddles the outline, so double it to get `outline_px` outside the glyph.
            self.outline_px * 2,
        )
    }
}

/// Incrementally built SVG document sized to the crop it is composited onto.
pub(crate) struct OverlayDoc {
    body: String,
    width: u32,
    height: u32,
}

impl OverlayDoc {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            body: String::new(),
            width,
            height,
        }
    }

    /// Centered text line with its baseline at `baseline_y`.
    pub(crate) fn text_line(
        &mut self,
        family: &str,
        size_px: u32,
        baseline_y: f32,
        text: &str,
        paint: Paint,
    ) {
        let _ = write!(
            self.body,
            r#"<text x="{cx}" y="{baseline_y}" text-anchor="middle" font-family="{family}" font-size="{size_px}" font-weight="bold" {attrs}>{text}</text>"#,
            cx = self.width as f32 / 2.0,
            family = escape_xml(&quote_family(family)),
            attrs = paint.attrs(),
            text = escape_xml(text),
        );
    }

    /// Outlined bar standing in for a text line when no font face exists.
    pub(crate) fn placeholder_line(&mut self, top: f32, width: f32, height: f32, paint: Paint) {
        let x = (self.width as f32 - width) / 2.0;
        let _ = write!(
            self.body,
            r#"<rect x="{x}" y="{top}" width="{width}" height="{height}" rx="{rx}" {attrs}/>"#,
            rx = height / 4.0,
            attrs = paint.attrs(),
        );
    }

    fn finish(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = self.width,
            h = self.height,
            body = self.body,
        )
    }

    /// Rasterize the document and composite it over `dst`, which must match the doc size.
    pub(crate) fn composite_over(
        &self,
        dst: &mut Raster,
        fontdb: &Arc<fontdb::Database>,
    ) -> AdsmithResult<()> {
        if dst.dimensions() != (self.width, self.height) {
            return Err(AdsmithError::render(format!(
                "overlay doc is {}x{}, target raster is {}x{}",
                self.width,
                self.height,
                dst.width(),
                dst.height()
            )));
        }
        let tree = parse_tree(&self.finish(), fontdb)?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(self.width, self.height)
            .ok_or_else(|| AdsmithError::render("failed to allocate overlay pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::default(),
            &mut pixmap.as_mut(),
        );

        for (px, src) in dst.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
            blend_premul_over(&mut px.0, [src[0], src[1], src[2], src[3]]);
        }
        Ok(())
    }
}

fn parse_tree(doc: &str, fontdb: &Arc<fontdb::Database>) -> AdsmithResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb: Arc::clone(fontdb),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(doc, &opts).context("parse overlay svg")?;
    Ok(tree)
}

fn quote_family(family: &str) -> String {
    format!("'{}'", family.replace('\'', ""))
}

fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
