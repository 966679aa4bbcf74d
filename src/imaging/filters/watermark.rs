use super::ImageFilter;
use crate::imaging::color::convert_to;
use crate::imaging::params::ParamError;
use crate::imaging::position::{Insets, Position};
use image::{DynamicImage, GenericImageView, imageops};

/// Blends a pre-loaded overlay image on top of the input.
///
/// The overlay is placed by a [`Position`] with optional [`Insets`] and
/// composited source-over with its own alpha multiplied by `opacity`.
/// The result has the input's dimensions and color type; overlay pixels
/// falling outside the input are clipped.
#[derive(Debug)]
pub struct Watermark {
    position: Box<dyn Position>,
    overlay: DynamicImage,
    opacity: f32,
    insets: Insets,
}

impl Watermark {
    /// `opacity` runs from `0.0` (invisible) to `1.0` (the overlay's own alpha).
    pub fn new(
        position: impl Position + 'static,
        overlay: DynamicImage,
        opacity: f32,
    ) -> Result<Self, ParamError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ParamError::OpacityOutOfRange(opacity));
        }
        Ok(Self {
            position: Box::new(position),
            overlay,
            opacity,
            insets: Insets::default(),
        })
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

impl ImageFilter for Watermark {
    fn apply(&self, img: &DynamicImage) -> DynamicImage {
        if self.opacity == 0.0 {
            return img.clone();
        }

        let (width, height) = img.dimensions();
        let (x, y) = self.position.calculate(
            width,
            height,
            self.overlay.width(),
            self.overlay.height(),
            self.insets,
        );

        let mut canvas = img.to_rgba32f();
        let mut mark = self.overlay.to_rgba32f();
        if self.opacity < 1.0 {
            for pixel in mark.pixels_mut() {
                pixel[3] *= self.opacity;
            }
        }
        imageops::overlay(&mut canvas, &mark, x, y);

        convert_to(DynamicImage::ImageRgba32F(canvas), img.color())
    }

    fn name(&self) -> &'static str {
        "watermark"
    }
}
