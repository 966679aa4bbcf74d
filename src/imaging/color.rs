//! Color-type conversions shared by filters and encoders.

use image::{ColorType, DynamicImage};

/// Convert `img` to `color`, or return it untouched when it already matches.
pub(crate) fn convert_to(img: DynamicImage, color: ColorType) -> DynamicImage {
    if img.color() == color {
        return img;
    }
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(img.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(img.to_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(img.to_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(img.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(img.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(img.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(img.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(img.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(img.to_rgba32f()),
        _ => img,
    }
}

/// The alpha-bearing counterpart of `color` at the same bit depth.
pub(crate) fn with_alpha(color: ColorType) -> ColorType {
    match color {
        ColorType::L8 => ColorType::La8,
        ColorType::Rgb8 => ColorType::Rgba8,
        ColorType::L16 => ColorType::La16,
        ColorType::Rgb16 => ColorType::Rgba16,
        ColorType::Rgb32F => ColorType::Rgba32F,
        other => other,
    }
}

/// `true` for single-channel (optionally alpha) color types.
pub(crate) fn is_gray(color: ColorType) -> bool {
    !color.has_color()
}
