//! High-level image operations.
//!
//! These functions combine the pure dimension math in
//! [`calculations`](super::calculations) with a [`ThumbnailTask`] that does
//! the I/O. [`create_thumbnail`] is the one entry point every caller (CLI,
//! batch, library users) goes through.

use super::calculations::{
    calculate_fill_dimensions, calculate_fit_dimensions, calculate_scaled_dimensions,
};
use super::filters::ImageFilter;
use super::params::{Sizing, ThumbnailParameter};
use super::position::{Insets, Position};
use super::task::{TaskError, ThumbnailTask};
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("no encoder available for output format '{0}'")]
    UnsupportedFormat(String),
}

/// Target dimensions for `source` under the parameter's sizing rules,
/// before any crop.
pub fn plan_dimensions(source: (u32, u32), param: &ThumbnailParameter) -> (u32, u32) {
    match param.sizing() {
        Sizing::Size { width, height } if param.crop().is_some() => {
            calculate_fill_dimensions(source, (width, height))
        }
        Sizing::Size { width, height } if param.keep_aspect_ratio() => {
            calculate_fit_dimensions(source, (width, height))
        }
        Sizing::Size { width, height } => (width, height),
        Sizing::Scale { x, y } => calculate_scaled_dimensions(source, (x, y)),
    }
}

/// Resize `img` according to `param`: fit, stretch, fill-and-crop, or scale.
pub fn resize(img: &DynamicImage, param: &ThumbnailParameter) -> DynamicImage {
    let (width, height) = plan_dimensions(img.dimensions(), param);
    let filter = param.resampling().filter_type();
    let resized = if (width, height) == img.dimensions() {
        img.clone()
    } else {
        img.resize_exact(width, height, filter)
    };

    match (param.crop(), param.sizing()) {
        (Some(anchor), Sizing::Size { width: tw, height: th }) => {
            let (tw, th) = (tw.min(width), th.min(height));
            let (x, y) = anchor.calculate(width, height, tw, th, Insets::default());
            resized.crop_imm(x.max(0) as u32, y.max(0) as u32, tw, th)
        }
        _ => resized,
    }
}

/// Run a task end to end: read → resize → filters → write.
///
/// A task that finds no encoder for the requested format is reported as
/// [`ThumbnailError::UnsupportedFormat`].
pub fn create_thumbnail<T: ThumbnailTask>(task: &mut T) -> Result<(), ThumbnailError> {
    let source = task.read()?;
    let param = task.param();
    log::debug!(
        "thumbnail {}x{} → {:?}",
        source.width(),
        source.height(),
        param.sizing()
    );

    let resized = resize(&source, param);
    let filtered = if param.filters().is_empty() {
        resized
    } else {
        param.filters().apply(&resized)
    };
    let format = param.output_format().to_string();

    if task.write(&filtered)? {
        Ok(())
    } else {
        Err(ThumbnailError::UnsupportedFormat(format))
    }
}
