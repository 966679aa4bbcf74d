use super::ImageFilter;
use crate::imaging::calculations::calculate_rotated_bounds;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

/// Rotates the input clockwise by an angle in degrees.
///
/// Right angles (any multiple of 90°) are exact pixel permutations and keep
/// the color type. Any other angle grows the canvas to the rotated bounding
/// box, leaves the uncovered area transparent, and yields RGBA8.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    degrees: f64,
}

impl Rotation {
    pub fn new(degrees: f64) -> Self {
        Self { degrees }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    fn rotate_free(&self, img: &DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        let (bw, bh) = calculate_rotated_bounds(width, height, self.degrees);

        // Centre the source on a transparent canvas large enough for the result.
        let mut canvas = RgbaImage::new(bw, bh);
        let x = (bw as i64 - width as i64) / 2;
        let y = (bh as i64 - height as i64) / 2;
        imageops::replace(&mut canvas, &img.to_rgba8(), x, y);

        DynamicImage::ImageRgba8(rotate_about_center(
            &canvas,
            self.degrees.to_radians() as f32,
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 0]),
        ))
    }
}

impl ImageFilter for Rotation {
    fn apply(&self, img: &DynamicImage) -> DynamicImage {
        let normalized = self.degrees.rem_euclid(360.0);
        if normalized == 0.0 {
            img.clone()
        } else if normalized == 90.0 {
            img.rotate90()
        } else if normalized == 180.0 {
            img.rotate180()
        } else if normalized == 270.0 {
            img.rotate270()
        } else {
            self.rotate_free(img)
        }
    }

    fn name(&self) -> &'static str {
        "rotation"
    }
}
