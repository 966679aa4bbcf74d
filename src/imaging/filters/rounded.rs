use super::ImageFilter;
use crate::imaging::calculations::circle_coverage;
use crate::imaging::color::{convert_to, with_alpha};
use crate::imaging::params::ParamError;
use image::{DynamicImage, GenericImageView, Rgba};

/// Cuts the four corners into quarter circles.
///
/// The radius is clamped to half the shorter side. Without a background the
/// corners become transparent and the color type gains an alpha channel;
/// with one they are painted in that color and the color type is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedCorners {
    radius: u32,
    background: Option<Rgba<u8>>,
}

impl RoundedCorners {
    pub fn new(radius: u32) -> Result<Self, ParamError> {
        if radius == 0 {
            return Err(ParamError::ZeroRadius);
        }
        Ok(Self {
            radius,
            background: None,
        })
    }

    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }
}

/// Circle centre along one axis if `p` falls in a corner band, else `None`.
fn corner_centre(p: f64, extent: f64, r: f64) -> Option<f64> {
    if p < r {
        Some(r)
    } else if p > extent - r {
        Some(extent - r)
    } else {
        None
    }
}

impl ImageFilter for RoundedCorners {
    fn apply(&self, img: &DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        let r = self.radius.min(width.min(height) / 2) as f64;
        let target = match self.background {
            Some(_) => img.color(),
            None => with_alpha(img.color()),
        };
        if r == 0.0 {
            return convert_to(img.clone(), target);
        }

        let background = self
            .background
            .map(|bg| bg.0.map(|c| c as f32 / 255.0))
            .unwrap_or([0.0; 4]);
        let (w, h) = (width as f64, height as f64);
        let mut canvas = img.to_rgba32f();

        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
            let (Some(cx), Some(cy)) = (corner_centre(px, w, r), corner_centre(py, h, r)) else {
                continue;
            };
            let coverage = circle_coverage(px, py, cx, cy, r) as f32;
            if coverage >= 1.0 {
                continue;
            }
            if self.background.is_some() {
                for (c, bg) in pixel.0.iter_mut().zip(background) {
                    *c = *c * coverage + bg * (1.0 - coverage);
                }
            } else {
                pixel.0[3] *= coverage;
            }
        }

        convert_to(DynamicImage::ImageRgba32F(canvas), target)
    }

    fn name(&self) -> &'static str {
        "rounded-corners"
    }
}
