// SPDX-License-Identifier: GPL-3.0-only

//! Collage rendering
//!
//! Composites the filled slots of a job onto the template background, in
//! slot order. Each slot image is rotated (expanding the bounding box),
//! fitted to the slot size by cropping rather than distorting, then pasted
//! twice: once at the slot position and once shifted by the slot's
//! horizontal offset. The second paste is the template's double-exposure
//! look, not an accident.

use super::CollageJob;
use crate::errors::CollageError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use tracing::{debug, info};

/// Render a completed job to `output`.
///
/// Any unreadable source aborts the whole render before anything is
/// written; callers treat the absence of the output file as the failure
/// signal.
pub fn render(job: &CollageJob, output: &std::path::Path) -> Result<(), CollageError> {
    if !job.is_complete() {
        return Err(CollageError::Incomplete);
    }

    info!(template = %job.template().display(), slots = job.slot_count(), "Rendering collage");

    let mut canvas = image::open(job.template())
        .map_err(|e| {
            CollageError::TemplateUnreadable(format!("{}: {}", job.template().display(), e))
        })?
        .to_rgba8();

    for slot in job.slots() {
        let path = slot.image_path.as_ref().ok_or(CollageError::Incomplete)?;
        let source = image::open(path)
            .map_err(|e| CollageError::SlotUnreadable(format!("{}: {}", path.display(), e)))?
            .to_rgba8();

        let rotated = rotate_expanded(&source, slot.spec.angle);
        let fitted = fit(rotated, slot.spec.size.width, slot.spec.size.height);

        let x = slot.spec.position.x;
        let y = slot.spec.position.y;
        imageops::overlay(&mut canvas, &fitted, x, y);
        imageops::overlay(&mut canvas, &fitted, x + slot.spec.offset, y);

        debug!(slot = slot.spec.id, x, y, angle = slot.spec.angle, "Slot pasted");
    }

    // Encode fully in memory so a failure never leaves a partial file
    let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut encoded = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut encoded);
    flattened
        .write_to(&mut cursor, image::ImageFormat::Jpeg)
        .map_err(|e| CollageError::WriteFailed(e.to_string()))?;
    std::fs::write(output, &encoded).map_err(|e| CollageError::WriteFailed(e.to_string()))?;

    info!(output = %output.display(), "Collage saved");
    Ok(())
}

/// Rotate counter-clockwise by `degrees`, growing the canvas so no corner
/// is clipped. Bicubic resampling, transparent fill.
fn rotate_expanded(image: &RgbaImage, degrees: f32) -> RgbaImage {
    if degrees == 0.0 {
        return image.clone();
    }

    let (w, h) = image.dimensions();
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let new_w = ((w as f32 * cos + h as f32 * sin).ceil() as u32).max(1);
    let new_h = ((w as f32 * sin + h as f32 * cos).ceil() as u32).max(1);

    // Rotate inside a square that fits the diagonal, then crop to the
    // rotated bounding box; the diagonal bounds both
    let diagonal = ((w as f32).hypot(h as f32).ceil() as u32).max(new_w).max(new_h);
    let transparent = Rgba([0, 0, 0, 0]);

    let mut padded = RgbaImage::from_pixel(diagonal, diagonal, transparent);
    imageops::overlay(
        &mut padded,
        image,
        ((diagonal - w) / 2) as i64,
        ((diagonal - h) / 2) as i64,
    );

    // Positive slot angles are counter-clockwise; screen coordinates grow
    // downwards, hence the sign flip.
    let rotated = rotate_about_center(&padded, -theta, Interpolation::Bicubic, transparent);

    let left = (diagonal - new_w) / 2;
    let top = (diagonal - new_h) / 2;
    imageops::crop_imm(&rotated, left, top, new_w, new_h).to_image()
}

/// Scale-and-crop to exactly `width` x `height`, preserving aspect ratio
fn fit(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    DynamicImage::ImageRgba8(image)
        .resize_to_fill(width, height, FilterType::Lanczos3)
        .to_rgba8()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_by_zero_is_identity() {
        let image = RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255]));
        let rotated = rotate_expanded(&image, 0.0);
        assert_eq!(rotated.dimensions(), (40, 20));
        assert_eq!(rotated.get_pixel(5, 5), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn rotation_expands_bounding_box() {
        let image = RgbaImage::from_pixel(100, 50, Rgba([255, 0, 0, 255]));
        let rotated = rotate_expanded(&image, 90.0);
        // A quarter turn swaps the sides (within rounding)
        let (w, h) = rotated.dimensions();
        assert!((w as i64 - 50).abs() <= 1, "width {}", w);
        assert!((h as i64 - 100).abs() <= 1, "height {}", h);
    }

    #[test]
    fn fit_crops_instead_of_distorting() {
        let image = RgbaImage::from_pixel(200, 100, Rgba([0, 255, 0, 255]));
        let fitted = fit(image, 50, 50);
        assert_eq!(fitted.dimensions(), (50, 50));
        assert_eq!(fitted.get_pixel(25, 25), &Rgba([0, 255, 0, 255]));
    }
}
