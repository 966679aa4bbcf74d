//! Shared test utilities for the thumbwright test suite.
//!
//! Every fixture is synthesised in memory so tests never depend on binary
//! files checked into the repository.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let png = encode_as(&gradient_rgb(30, 20), ImageFormat::Png);
//! let gif = multi_frame_gif(&[[255, 0, 0, 255], [0, 0, 255, 255]], 8, 8);
//! let rotated = jpeg_with_orientation(&gradient_rgb(30, 20), 6);
//! ```

use image::codecs::gif::GifEncoder;
use image::{DynamicImage, Frame, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// An RGB8 image whose red channel ramps left to right and green top to
/// bottom, so orientation and crop mistakes show up in pixel asserts.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8;
        let g = (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8;
        Rgb([r, g, 128])
    });
    DynamicImage::ImageRgb8(img)
}

/// Encode `img` with the `image` crate's defaults for `format`.
pub fn encode_as(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        ImageFormat::Gif | ImageFormat::WebP => DynamicImage::ImageRgba8(img.to_rgba8()),
        _ => img.clone(),
    };
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

/// A JPEG of `img` carrying an EXIF APP1 segment whose only tag is
/// `Orientation` set to `orientation` (1-8, 6 = rotate 90° clockwise).
pub fn jpeg_with_orientation(img: &DynamicImage, orientation: u16) -> Vec<u8> {
    let jpeg = encode_as(img, ImageFormat::Jpeg);

    // Big-endian TIFF header, one IFD entry, no next IFD
    let mut tiff = b"MM\0\x2a".to_vec();
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&tiff);

    // Right after SOI
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A GIF with one solid-color frame per entry of `colors`.
pub fn multi_frame_gif(colors: &[[u8; 4]], width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        let frames = colors
            .iter()
            .map(|c| Frame::new(RgbaImage::from_pixel(width, height, Rgba(*c))));
        encoder.encode_frames(frames).unwrap();
    }
    buf
}
