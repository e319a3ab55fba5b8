use image::imageops;

use crate::foundation::core::{CropWindow, Raster, TargetSize};
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::foundation::math::linear_stop;

/// Sweep axis of a panning sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanDirection {
    /// Top-to-bottom sweep; used for landscape targets.
    Vertical,
    /// Left-to-right sweep; used for portrait and square targets.
    Horizontal,
}

impl PanDirection {
    /// Direction is a function of the target geometry alone.
    pub fn for_target(target: &TargetSize) -> Self {
        if target.is_landscape() {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }

    /// Arrow glyph used in log output.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Vertical => "↓",
            Self::Horizontal => "→",
        }
    }
}

/// One frame of a panning sequence.
#[derive(Clone, Debug)]
pub struct PanFrame {
    /// 0-based position in the sweep.
    pub index: u32,
    /// Number of frames in the sequence.
    pub total: u32,
    /// Window cropped from the master.
    pub window: CropWindow,
    /// Cropped pixels, `target.width x target.height`.
    pub raster: Raster,
}

/// Geometry of a pan: which windows the frames crop, without touching pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanPath {
    direction: PanDirection,
    target_w: u32,
    target_h: u32,
    /// Centered offset on the fixed axis.
    fixed: u32,
    /// Travel along the panning axis; always > 0.
    span: u32,
    frame_count: u32,
}

impl PanPath {
    /// Plan a pan of `target` across a `master_w x master_h` master.
    pub fn new(
        master_w: u32,
        master_h: u32,
        target: &TargetSize,
        frame_count: u32,
    ) -> AdsmithResult<Self> {
        if frame_count == 0 {
            return Err(AdsmithError::validation("pan frame_count must be > 0"));
        }
        let insufficient = || AdsmithError::insufficient_master(target.dims(), (master_w, master_h));
        if !target.fits_in(master_w, master_h) {
            return Err(insufficient());
        }

        let direction = PanDirection::for_target(target);
        let (span, fixed) = match direction {
            PanDirection::Vertical => (master_h - target.height, (master_w - target.width) / 2),
            PanDirection::Horizontal => (master_w - target.width, (master_h - target.height) / 2),
        };
        if span == 0 {
            return Err(insufficient());
        }

        Ok(Self {
            direction,
            target_w: target.width,
            target_h: target.height,
            fixed,
            span,
            frame_count,
        })
    }

    /// Sweep direction.
    pub fn direction(&self) -> PanDirection {
        self.direction
    }

    /// Number of frames.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Travel in pixels along the panning axis.
    pub fn span(&self) -> u32 {
        self.span
    }

    /// Window for frame `index`, or `None` past the end.
    pub fn window(&self, index: u32) -> Option<CropWindow> {
        if index >= self.frame_count {
            return None;
        }
        let offset = linear_stop(self.span, index, self.frame_count);
        let (x, y) = match self.direction {
            PanDirection::Vertical => (self.fixed, offset),
            PanDirection::Horizontal => (offset, self.fixed),
        };
        Some(CropWindow {
            x,
            y,
            width: self.target_w,
            height: self.target_h,
        })
    }
}

/// Lazy sequence of pan frames cropped from a borrowed master.
#[derive(Clone, Debug)]
pub struct PanSequence<'a> {
    master: &'a Raster,
    path: PanPath,
    next: u32,
}

impl Iterator for PanSequence<'_> {
    type Item = PanFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.path.window(self.next)?;
        let index = self.next;
        self.next += 1;
        let raster =
            imageops::crop_imm(self.master, window.x, window.y, window.width, window.height)
                .to_image();
        Some(PanFrame {
            index,
            total: self.path.frame_count,
            window,
            raster,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.path.frame_count.saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for PanSequence<'_> {}

/// Pan `target`-sized crops across `master`.
///
/// Landscape targets sweep top to bottom with a centered horizontal crop; portrait and square
/// targets sweep left to right with a centered vertical crop. Frame `0` starts at offset 0 and
/// the last frame ends at `master extent - target extent`.
pub fn generate_pan<'a>(
    master: &'a Raster,
    target: &TargetSize,
    frame_count: u32,
) -> AdsmithResult<PanSequence<'a>> {
    let path = PanPath::new(master.width(), master.height(), target, frame_count)?;
    Ok(PanSequence {
        master,
        path,
        next: 0,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pan/sequencer.rs"]
mod tests;
