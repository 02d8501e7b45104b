// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame transforms for the live-view pipeline
//!
//! Pure functions over `image` buffers. Pipeline order is fixed:
//! crop/mirror first, collage compositing second, prompt overlay third,
//! display resize last - reordering any of these changes what the user
//! sees.

use crate::collage::SlotSpec;
use crate::constants;
use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// Crop the letterbox margins off a 16:9 stream.
///
/// The useful region is 3h/2 wide, centered; frames already narrower than
/// that pass through untouched.
pub fn crop_side_margins(frame: &RgbImage) -> RgbImage {
    let (width, height) = frame.dimensions();
    let target = constants::cropped_width(height);
    if target >= width {
        return frame.clone();
    }
    let left = (width - target) / 2;
    imageops::crop_imm(frame, left, 0, target, height).to_image()
}

/// Horizontal flip so the booth display behaves like a mirror
pub fn mirror(frame: &RgbImage) -> RgbImage {
    imageops::flip_horizontal(frame)
}

/// Resize to the display surface
pub fn scale_to_display(frame: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(frame, width, height, FilterType::Triangle)
}

/// Paste the current frame into the running collage canvas, filling the
/// active slot. The frame is squeezed to the slot size so the whole shot
/// stays visible while the user lines up.
pub fn paste_slot_frame(canvas: &mut RgbaImage, frame: &RgbImage, slot: &SlotSpec) {
    let resized = imageops::resize(
        frame,
        slot.size.width,
        slot.size.height,
        FilterType::Triangle,
    );
    let rgba = DynamicImage::ImageRgb8(resized).to_rgba8();
    imageops::overlay(canvas, &rgba, slot.position.x, slot.position.y);
}

/// Draw the challenge prompt onto the frame: white text over a
/// half-darkened backing band, centered near the bottom.
pub fn draw_prompt(frame: &mut RgbImage, text: &str, font: &FontArc) {
    let scale = PxScale::from(constants::PROMPT_TEXT_SCALE);
    let (text_width, text_height) = text_size(scale, font, text);

    let (width, height) = frame.dimensions();
    let pad = text_height / 2;
    let band_height = (text_height + 2 * pad).min(height);
    let band_top = height.saturating_sub(2 * band_height);

    darken_band(frame, band_top, band_height);

    let x = (width.saturating_sub(text_width) / 2) as i32;
    let y = (band_top + pad) as i32;
    draw_text_mut(frame, Rgb([255, 255, 255]), x, y, scale, font, text);
}

/// 50% darken of a full-width horizontal band
fn darken_band(frame: &mut RgbImage, top: u32, band_height: u32) {
    let (width, height) = frame.dimensions();
    let bottom = (top + band_height).min(height);
    for y in top..bottom {
        for x in 0..width {
            let pixel = frame.get_pixel_mut(x, y);
            pixel[0] /= 2;
            pixel[1] /= 2;
            pixel[2] /= 2;
        }
    }
}
