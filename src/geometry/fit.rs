use image::imageops::{self, FilterType};

use crate::foundation::core::{CropWindow, Raster, TargetSize};
use crate::foundation::error::{AdsmithError, AdsmithResult};

/// Largest window with the target's aspect ratio, centered in a `width x height` raster.
pub fn center_aspect_window(width: u32, height: u32, target: &TargetSize) -> CropWindow {
    let (tw, th) = (u64::from(target.width), u64::from(target.height));
    let (w, h) = (u64::from(width), u64::from(height));

    // Compare aspect ratios without floats: w/h vs tw/th.
    let (cw, ch) = match (w * th).cmp(&(h * tw)) {
        std::cmp::Ordering::Greater => (((h * tw) / th).max(1), h),
        std::cmp::Ordering::Less => (w, ((w * th) / tw).max(1)),
        std::cmp::Ordering::Equal => (w, h),
    };
    CropWindow {
        x: ((w - cw) / 2) as u32,
        y: ((h - ch) / 2) as u32,
        width: cw as u32,
        height: ch as u32,
    }
}

/// Center-crop `raster` to the target aspect ratio, then resize to the exact target size.
pub fn fit_to_size(raster: &Raster, target: &TargetSize) -> AdsmithResult<Raster> {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return Err(AdsmithError::invalid_image("cannot fit an empty raster"));
    }
    target.validate()?;

    let win = center_aspect_window(w, h, target);
    let cropped = imageops::crop_imm(raster, win.x, win.y, win.width, win.height).to_image();
    if cropped.dimensions() == target.dims() {
        return Ok(cropped);
    }
    Ok(imageops::resize(
        &cropped,
        target.width,
        target.height,
        FilterType::Lanczos3,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/fit.rs"]
mod tests;
