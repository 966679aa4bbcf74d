//! Parameter types for thumbnail operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between callers (CLI, config, library users) and the
//! [`task`](super::task) / [`operations`](super::operations) code that does
//! the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality in `[0.0, 1.0]`. Validated on construction.
//! - [`OutputFormat`]: A named format, or [`OutputFormat::Original`] to reuse the input's.
//! - [`Sizing`]: Target box or scale factors.
//! - [`Resampling`]: Which resampling filter the resize uses.
//! - [`ThumbnailParameter`]: The immutable bundle a task is created with.

use super::filters::{ImageFilter, Pipeline};
use super::position::Positions;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("quality must be between 0.0 and 1.0, got {0}")]
    QualityOutOfRange(f32),
    #[error("target size must be non-zero, got {0}x{1}")]
    ZeroSize(u32, u32),
    #[error("scale factors must be finite and positive, got {0}x{1}")]
    InvalidScale(f64, f64),
    #[error("opacity must be between 0.0 and 1.0, got {0}")]
    OpacityOutOfRange(f32),
    #[error("corner radius must be non-zero")]
    ZeroRadius,
    #[error("{0}")]
    Invalid(String),
}

/// Compression quality for lossy encoders, `0.0` (smallest) to `1.0` (best).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Result<Self, ParamError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParamError::QualityOutOfRange(value))
        }
    }

    /// Like [`new`](Self::new), but NaN means "use the codec default".
    pub fn new_or_default(value: f32) -> Result<Option<Self>, ParamError> {
        if value.is_nan() {
            Ok(None)
        } else {
            Self::new(value).map(Some)
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// The same quality on the `image` crate's 1–100 scale.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Output encoding for a task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Encode with whatever format the input was detected as.
    #[default]
    Original,
    /// Encode with the named format (`"png"`, `"JPEG"`, `"jpg"`, ...).
    Named(String),
}

impl OutputFormat {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Original => f.write_str("original"),
            OutputFormat::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(if value.trim().eq_ignore_ascii_case("original") {
            OutputFormat::Original
        } else {
            OutputFormat::Named(value.trim().to_string())
        })
    }
}

/// How the thumbnail's dimensions are derived from the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Target box in pixels.
    Size { width: u32, height: u32 },
    /// Per-axis multipliers of the source dimensions.
    Scale { x: f64, y: f64 },
}

/// Resampling filter used when resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resampling {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl Resampling {
    pub fn filter_type(self) -> FilterType {
        match self {
            Resampling::Nearest => FilterType::Nearest,
            Resampling::Triangle => FilterType::Triangle,
            Resampling::CatmullRom => FilterType::CatmullRom,
            Resampling::Gaussian => FilterType::Gaussian,
            Resampling::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for Resampling {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Resampling::Nearest),
            "triangle" | "bilinear" => Ok(Resampling::Triangle),
            "catmull-rom" | "bicubic" => Ok(Resampling::CatmullRom),
            "gaussian" => Ok(Resampling::Gaussian),
            "lanczos3" => Ok(Resampling::Lanczos3),
            other => Err(format!(
                "unknown resampling '{other}'. Expected nearest, triangle, catmull-rom, gaussian, or lanczos3"
            )),
        }
    }
}

/// Everything a task needs to know about the thumbnail it produces.
///
/// Built once through [`ThumbnailParameter::builder`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ThumbnailParameter {
    sizing: Sizing,
    keep_aspect_ratio: bool,
    crop: Option<Positions>,
    output_format: OutputFormat,
    quality: Option<Quality>,
    resampling: Resampling,
    use_exif_orientation: bool,
    filters: Pipeline,
}

impl ThumbnailParameter {
    pub fn builder(sizing: Sizing) -> ThumbnailParameterBuilder {
        ThumbnailParameterBuilder::new(sizing)
    }

    pub fn sizing(&self) -> Sizing {
        self.sizing
    }

    pub fn keep_aspect_ratio(&self) -> bool {
        self.keep_aspect_ratio
    }

    pub fn crop(&self) -> Option<Positions> {
        self.crop
    }

    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format
    }

    /// `None` means the encoder's default.
    pub fn quality(&self) -> Option<Quality> {
        self.quality
    }

    pub fn resampling(&self) -> Resampling {
        self.resampling
    }

    pub fn use_exif_orientation(&self) -> bool {
        self.use_exif_orientation
    }

    pub fn filters(&self) -> &Pipeline {
        &self.filters
    }
}

pub struct ThumbnailParameterBuilder {
    sizing: Sizing,
    keep_aspect_ratio: bool,
    crop: Option<Positions>,
    output_format: OutputFormat,
    quality: f32,
    resampling: Resampling,
    use_exif_orientation: bool,
    filters: Vec<Arc<dyn ImageFilter>>,
}

impl ThumbnailParameterBuilder {
    fn new(sizing: Sizing) -> Self {
        Self {
            sizing,
            keep_aspect_ratio: true,
            crop: None,
            output_format: OutputFormat::Original,
            quality: f32::NAN,
            resampling: Resampling::default(),
            use_exif_orientation: true,
            filters: Vec::new(),
        }
    }

    pub fn keep_aspect_ratio(mut self, keep: bool) -> Self {
        self.keep_aspect_ratio = keep;
        self
    }

    /// Fill the target box and crop the overflow, keeping the part at `anchor`.
    pub fn crop(mut self, anchor: Positions) -> Self {
        self.crop = Some(anchor);
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// `f32::NAN` (the default) keeps the encoder's own quality.
    pub fn quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = resampling;
        self
    }

    pub fn use_exif_orientation(mut self, enabled: bool) -> Self {
        self.use_exif_orientation = enabled;
        self
    }

    pub fn filter(mut self, filter: impl ImageFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Arc<dyn ImageFilter>>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn build(self) -> Result<ThumbnailParameter, ParamError> {
        match self.sizing {
            Sizing::Size { width, height } if width == 0 || height == 0 => {
                return Err(ParamError::ZeroSize(width, height));
            }
            Sizing::Scale { x, y } if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) => {
                return Err(ParamError::InvalidScale(x, y));
            }
            _ => {}
        }
        if self.crop.is_some() && matches!(self.sizing, Sizing::Scale { .. }) {
            return Err(ParamError::Invalid(
                "crop requires an explicit target size".into(),
            ));
        }

        Ok(ThumbnailParameter {
            sizing: self.sizing,
            keep_aspect_ratio: self.keep_aspect_ratio,
            crop: self.crop,
            output_format: self.output_format,
            quality: Quality::new_or_default(self.quality)?,
            resampling: self.resampling,
            use_exif_orientation: self.use_exif_orientation,
            filters: Pipeline::new(self.filters),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::filters::Rotation;

    fn size(width: u32, height: u32) -> Sizing {
        Sizing::Size { width, height }
    }

    #[test]
    fn quality_rejects_out_of_range() {
        assert!(Quality::new(0.0).is_ok());
        assert!(Quality::new(1.0).is_ok());
        assert_eq!(
            Quality::new(1.5),
            Err(ParamError::QualityOutOfRange(1.5))
        );
        assert!(Quality::new(-0.1).is_err());
    }

    #[test]
    fn quality_nan_means_default() {
        assert_eq!(Quality::new_or_default(f32::NAN), Ok(None));
        assert_eq!(
            Quality::new_or_default(0.5).unwrap().map(Quality::value),
            Some(0.5)
        );
        assert!(Quality::new(f32::NAN).is_err());
    }

    #[test]
    fn quality_percent_mapping() {
        assert_eq!(Quality::new(0.0).unwrap().percent(), 1);
        assert_eq!(Quality::new(0.8).unwrap().percent(), 80);
        assert_eq!(Quality::new(0.856).unwrap().percent(), 86);
        assert_eq!(Quality::new(1.0).unwrap().percent(), 100);
    }

    #[test]
    fn output_format_parses_original_sentinel() {
        assert_eq!("ORIGINAL".parse::<OutputFormat>(), Ok(OutputFormat::Original));
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::named("png")));
    }

    #[test]
    fn resampling_aliases() {
        assert_eq!("bilinear".parse::<Resampling>(), Ok(Resampling::Triangle));
        assert_eq!("Bicubic".parse::<Resampling>(), Ok(Resampling::CatmullRom));
        assert!("cubic-spline".parse::<Resampling>().is_err());
    }

    #[test]
    fn builder_defaults() {
        let param = ThumbnailParameter::builder(size(200, 100)).build().unwrap();
        assert_eq!(param.sizing(), size(200, 100));
        assert!(param.keep_aspect_ratio());
        assert_eq!(param.crop(), None);
        assert_eq!(param.output_format(), &OutputFormat::Original);
        assert_eq!(param.quality(), None);
        assert_eq!(param.resampling(), Resampling::Lanczos3);
        assert!(param.use_exif_orientation());
        assert!(param.filters().is_empty());
    }

    #[test]
    fn builder_rejects_zero_size() {
        let err = ThumbnailParameter::builder(size(0, 100)).build().unwrap_err();
        assert_eq!(err, ParamError::ZeroSize(0, 100));
    }

    #[test]
    fn builder_rejects_bad_scale() {
        for (x, y) in [(0.0, 1.0), (-1.0, 1.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            assert!(
                ThumbnailParameter::builder(Sizing::Scale { x, y })
                    .build()
                    .is_err(),
                "scale {x}x{y} should be rejected"
            );
        }
    }

    #[test]
    fn builder_rejects_quality_out_of_range() {
        let err = ThumbnailParameter::builder(size(10, 10))
            .quality(2.0)
            .build()
            .unwrap_err();
        assert_eq!(err, ParamError::QualityOutOfRange(2.0));
    }

    #[test]
    fn builder_rejects_crop_with_scale() {
        assert!(
            ThumbnailParameter::builder(Sizing::Scale { x: 0.5, y: 0.5 })
                .crop(Positions::Center)
                .build()
                .is_err()
        );
    }

    #[test]
    fn builder_keeps_filter_order() {
        let param = ThumbnailParameter::builder(size(10, 10))
            .filter(Rotation::new(90.0))
            .filter(Rotation::new(180.0))
            .build()
            .unwrap();
        assert_eq!(param.filters().len(), 2);
        assert_eq!(param.filters().names(), vec!["rotation", "rotation"]);
    }
}
