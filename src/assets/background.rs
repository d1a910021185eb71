use std::path::Path;

use image::{DynamicImage, RgbaImage};

use crate::assets::decode::open_image;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

/// Centred crop rectangle `(x, y, w, h)` of a `width×height` image with the aspect of `canvas`.
pub(crate) fn cover_crop_rect(width: u32, height: u32, canvas: Canvas) -> (u32, u32, u32, u32) {
    let target = f64::from(canvas.width) / f64::from(canvas.height);
    let ratio = f64::from(width) / f64::from(height);
    if ratio > target {
        let w = ((f64::from(height) * target) as u32).clamp(1, width);
        ((width - w) / 2, 0, w, height)
    } else {
        let h = ((f64::from(width) / target) as u32).clamp(1, height);
        (0, (height - h) / 2, width, h)
    }
}

/// Cover-crop `img` to the canvas aspect and resample to the canvas size.
pub(crate) fn cover_to_canvas(img: &DynamicImage, canvas: Canvas) -> RgbaImage {
    let (x, y, w, h) = cover_crop_rect(img.width(), img.height(), canvas);
    img.crop_imm(x, y, w, h)
        .resize_exact(
            canvas.width,
            canvas.height,
            image::imageops::FilterType::Lanczos3,
        )
        .to_rgba8()
}

/// Open the background still and cover it onto `canvas`.
pub(crate) fn load_background(path: &Path, canvas: Canvas) -> ReelResult<RgbaImage> {
    if !path.is_file() {
        return Err(ReelError::precondition(format!(
            "background image '{}' does not exist",
            path.display()
        )));
    }
    let img = open_image(path)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ReelError::precondition("background image is empty"));
    }
    Ok(cover_to_canvas(&img, canvas))
}

/// Composite opaque black at `alpha` over every pixel.
pub(crate) fn darken(img: &mut RgbaImage, alpha: u8) {
    let keep = 255 - u16::from(alpha);
    for px in img.pixels_mut() {
        px.0[0] = mul_div255_u8(u16::from(px.0[0]), keep);
        px.0[1] = mul_div255_u8(u16::from(px.0[1]), keep);
        px.0[2] = mul_div255_u8(u16::from(px.0[2]), keep);
    }
}

/// Vertical black gradient, `top_alpha` at row 0 falling linearly to `bottom_alpha`.
pub(crate) fn darken_gradient(img: &mut RgbaImage, top_alpha: u8, bottom_alpha: u8) {
    let height = img.height().max(1);
    for (_, y, px) in img.enumerate_pixels_mut() {
        let t = f64::from(y) / f64::from(height);
        let alpha = f64::from(top_alpha) - (f64::from(top_alpha) - f64::from(bottom_alpha)) * t;
        let keep = 255 - (alpha.round() as u16).min(255);
        px.0[0] = mul_div255_u8(u16::from(px.0[0]), keep);
        px.0[1] = mul_div255_u8(u16::from(px.0[1]), keep);
        px.0[2] = mul_div255_u8(u16::from(px.0[2]), keep);
    }
}

/// Soft blur plus a dark wash, the base for every lyric and title frame.
pub(crate) fn soften(img: &RgbaImage) -> RgbaImage {
    let mut out = image::imageops::blur(img, 1.5);
    darken(&mut out, 80);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
