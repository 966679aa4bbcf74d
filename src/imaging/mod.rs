//! Image processing: decode, resize, filter, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect + decode** | `image::ImageReader::with_guessed_format`, first frame only |
//! | **EXIF orientation** | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | **Resize** | `DynamicImage::resize_exact` with a selectable filter |
//! | **Free rotation** | `imageproc::geometric_transformations::rotate_about_center` |
//! | **Encode** | per-format `image::codecs` encoders (JPEG/AVIF/PNG take a quality) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`ThumbnailParameter`] and friends, describing what to produce
//! - **Positions**: Where an overlay or a crop window sits inside a larger image
//! - **Filters**: [`ImageFilter`] implementations chained in a [`Pipeline`]
//! - **Codec**: The registry of formats and their capabilities
//! - **Task**: [`ThumbnailTask`] trait + stream and file implementations
//! - **Operations**: [`create_thumbnail`], which drives a task end to end

pub mod calculations;
pub mod codec;
mod color;
pub mod filters;
pub mod operations;
pub mod params;
pub mod position;
pub mod task;

pub use filters::{ImageFilter, Pipeline, Rotation, RoundedCorners, Watermark};
pub use operations::{ThumbnailError, create_thumbnail, resize};
pub use params::{OutputFormat, ParamError, Quality, Resampling, Sizing, ThumbnailParameter};
pub use position::{Coordinate, Insets, Position, Positions};
pub use task::{FileThumbnailTask, StreamThumbnailTask, TaskError, ThumbnailTask};
