use anyhow::Context;
use image::{RgbaImage, imageops};

/// Decode any format the `image` crate recognizes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Crop the largest centered square. Square inputs are returned unchanged.
pub fn center_crop_square(img: RgbaImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w == h {
        return img;
    }
    let side = w.min(h);
    let x = (w - side) / 2;
    let y = (h - side) / 2;
    imageops::crop_imm(&img, x, y, side, side).to_image()
}

/// Lanczos3 resample to `size`×`size`.
pub fn resize_square(img: &RgbaImage, size: u32) -> RgbaImage {
    if img.dimensions() == (size, size) {
        return img.clone();
    }
    imageops::resize(img, size, size, imageops::FilterType::Lanczos3)
}

/// Circular alpha mask, radius `width/2`, centered. Pixels whose center lies at or beyond the
/// radius become fully transparent; the one-pixel band inside the edge is anti-aliased.
pub fn apply_circle_mask(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    let radius = w.min(h) as f32 / 2.0;
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;

    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let coverage = (radius - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
        if coverage >= 1.0 {
            continue;
        }
        px[3] = (f32::from(px[3]) * coverage).round() as u8;
        if px[3] == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
