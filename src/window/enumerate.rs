use image::imageops;

use crate::foundation::core::{CropWindow, Raster, TargetSize};
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::geometry::normalize::CanonicalImage;

/// Lazy row-major sequence of crop windows over a canvas.
///
/// Positions advance by `step` along each axis starting at `(0, 0)`; only windows that fit
/// entirely inside the canvas are produced. A target larger than the canvas in either dimension
/// yields an empty sequence. Cloning (or [`Windows::rewind`]) restarts from the first window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Windows {
    width: u32,
    height: u32,
    step: u32,
    cols: u32,
    rows: u32,
    next: u64,
}

impl Windows {
    /// Windows of `target` over a `canvas_width x canvas_height` canvas.
    pub fn new(
        canvas_width: u32,
        canvas_height: u32,
        target: &TargetSize,
        step: u32,
    ) -> AdsmithResult<Self> {
        if step == 0 {
            return Err(AdsmithError::validation("window step must be > 0"));
        }
        let (cols, rows) = if target.fits_in(canvas_width, canvas_height) {
            (
                (canvas_width - target.width) / step + 1,
                (canvas_height - target.height) / step + 1,
            )
        } else {
            (0, 0)
        };
        Ok(Self {
            width: target.width,
            height: target.height,
            step,
            cols,
            rows,
            next: 0,
        })
    }

    /// Total number of windows in the full sequence.
    pub fn total(&self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }

    /// Window at row-major position `index`, independent of iteration state.
    pub fn get(&self, index: u64) -> Option<CropWindow> {
        if index >= self.total() {
            return None;
        }
        let cols = u64::from(self.cols);
        let col = (index % cols) as u32;
        let row = (index / cols) as u32;
        Some(CropWindow {
            x: col * self.step,
            y: row * self.step,
            width: self.width,
            height: self.height,
        })
    }

    /// Restart the sequence from the first window.
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

impl Iterator for Windows {
    type Item = CropWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.get(self.next)?;
        self.next += 1;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total().saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Windows {}

impl std::iter::FusedIterator for Windows {}

/// Enumerate crop windows of `target` over a canonical image.
pub fn enumerate_windows(
    canvas: &CanonicalImage,
    target: &TargetSize,
    step: u32,
) -> AdsmithResult<Windows> {
    Windows::new(canvas.width(), canvas.height(), target, step)
}

/// Copy the pixels under `window` into a new raster.
pub fn crop(raster: &Raster, window: CropWindow) -> AdsmithResult<Raster> {
    let (w, h) = raster.dimensions();
    if !window.fits_within(w, h) {
        return Err(AdsmithError::validation(format!(
            "crop window {}x{}+{}+{} exceeds {w}x{h} raster",
            window.width, window.height, window.x, window.y
        )));
    }
    Ok(imageops::crop_imm(raster, window.x, window.y, window.width, window.height).to_image())
}

#[cfg(test)]
#[path = "../../tests/unit/window/enumerate.rs"]
mod tests;
