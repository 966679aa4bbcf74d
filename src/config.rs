//! Configuration module.
//!
//! Handles loading, validating, and merging `thumbwright.toml` files. Stock
//! defaults are the base layer, a user config file overrides them, and CLI
//! flags override both (the CLI expresses its flags as one more TOML overlay
//! and goes through the same [`merge_toml`]).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnail]
//! width = 200                    # Target box in pixels
//! height = 200
//! # scale = 0.5                  # Scale factor instead of a box
//! keep_aspect_ratio = true       # Fit inside the box instead of stretching
//! # crop = "center"              # Fill the box and crop at this anchor
//! output_format = "original"     # Or a format name: "png", "jpg", ...
//! # quality = 0.8                # 0.0-1.0, omit for the codec default
//! resampling = "lanczos3"
//! use_exif_orientation = true
//!
//! [[filters]]                    # Applied in order after resizing
//! kind = "watermark"
//! image = "logo.png"             # Relative to the config file
//! position = "bottom-right"
//! opacity = 0.5
//! margin = 8
//!
//! [[filters]]
//! kind = "rotate"
//! degrees = 90
//!
//! [[filters]]
//! kind = "rounded-corners"
//! radius = 12
//! # background = "#ffffff"      # Paint corners instead of clearing them
//!
//! [batch]
//! rename = "prefix-dot-thumbnail"
//! # max_processes = 4           # Omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    ImageFilter, Insets, OutputFormat, ParamError, Positions, Resampling, Rotation,
    RoundedCorners, Sizing, ThumbnailParameter, Watermark,
};
use crate::naming::Rename;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid thumbnail parameters: {0}")]
    Param(#[from] ParamError),
    #[error("Failed to load overlay image {path}: {source}")]
    Overlay {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Configuration loaded from `thumbwright.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbwrightConfig {
    /// Sizing, format, and encoder settings.
    pub thumbnail: ThumbnailSection,
    /// Filters applied in order after resizing.
    pub filters: Vec<FilterConfig>,
    /// Batch mode settings (renaming, parallelism).
    pub batch: BatchConfig,
}

impl ThumbwrightConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thumbnail;
        match t.scale {
            Some(scale) if !(scale.is_finite() && scale > 0.0) => {
                return Err(ConfigError::Validation(
                    "thumbnail.scale must be a positive number".into(),
                ));
            }
            Some(_) if t.crop.is_some() => {
                return Err(ConfigError::Validation(
                    "thumbnail.crop cannot be combined with thumbnail.scale".into(),
                ));
            }
            None if t.width == 0 || t.height == 0 => {
                return Err(ConfigError::Validation(
                    "thumbnail.width and thumbnail.height must be non-zero".into(),
                ));
            }
            _ => {}
        }
        // NaN is the "codec default" sentinel and passes through
        if t.quality.is_some_and(|q| !q.is_nan() && !(0.0..=1.0).contains(&q)) {
            return Err(ConfigError::Validation(
                "thumbnail.quality must be 0.0-1.0 or nan".into(),
            ));
        }
        if self.batch.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "batch.max_processes must be at least 1".into(),
            ));
        }
        for (i, filter) in self.filters.iter().enumerate() {
            filter.validate().map_err(|msg| {
                ConfigError::Validation(format!("filters[{i}] ({}): {msg}", filter.kind()))
            })?;
        }
        Ok(())
    }

    /// Build the immutable [`ThumbnailParameter`] this config describes.
    ///
    /// Relative overlay image paths are resolved against `base_dir`
    /// (normally the directory holding the config file).
    pub fn to_parameter(&self, base_dir: &Path) -> Result<ThumbnailParameter, ConfigError> {
        let t = &self.thumbnail;
        let sizing = match t.scale {
            Some(scale) => Sizing::Scale { x: scale, y: scale },
            None => Sizing::Size {
                width: t.width,
                height: t.height,
            },
        };

        let filters = self
            .filters
            .iter()
            .map(|f| f.build(base_dir))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = ThumbnailParameter::builder(sizing)
            .keep_aspect_ratio(t.keep_aspect_ratio)
            .output_format(t.output_format())
            .quality(t.quality.unwrap_or(f32::NAN))
            .resampling(t.resampling)
            .use_exif_orientation(t.use_exif_orientation)
            .filters(filters);
        if let Some(anchor) = t.crop {
            builder = builder.crop(anchor);
        }
        Ok(builder.build()?)
    }
}

/// Thumbnail sizing and encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailSection {
    pub width: u32,
    pub height: u32,
    /// Uniform scale factor. When set, `width`/`height` from the same layer
    /// are ignored; a later layer setting either of them drops it.
    pub scale: Option<f64>,
    pub keep_aspect_ratio: bool,
    /// Fill the box and crop the overflow at this anchor.
    pub crop: Option<Positions>,
    /// Format name, or `"original"` to reuse the input's format.
    pub output_format: String,
    /// Lossy quality `0.0`-`1.0`. Absent means the codec default.
    pub quality: Option<f32>,
    pub resampling: Resampling,
    pub use_exif_orientation: bool,
}

impl Default for ThumbnailSection {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            scale: None,
            keep_aspect_ratio: true,
            crop: None,
            output_format: "original".to_string(),
            quality: None,
            resampling: Resampling::default(),
            use_exif_orientation: true,
        }
    }
}

impl ThumbnailSection {
    pub fn output_format(&self) -> OutputFormat {
        match self.output_format.parse() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}

fn default_position() -> Positions {
    Positions::BottomRight
}

fn default_opacity() -> f32 {
    0.5
}

/// One entry of the `[[filters]]` array, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum FilterConfig {
    Watermark {
        image: PathBuf,
        #[serde(default = "default_position")]
        position: Positions,
        #[serde(default = "default_opacity")]
        opacity: f32,
        #[serde(default)]
        margin: u32,
    },
    Rotate {
        degrees: f64,
    },
    RoundedCorners {
        radius: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background: Option<String>,
    },
}

impl FilterConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            FilterConfig::Watermark { .. } => "watermark",
            FilterConfig::Rotate { .. } => "rotate",
            FilterConfig::RoundedCorners { .. } => "rounded-corners",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            FilterConfig::Watermark { opacity, .. } if !(0.0..=1.0).contains(opacity) => {
                Err("opacity must be 0.0-1.0".into())
            }
            FilterConfig::Rotate { degrees } if !degrees.is_finite() => {
                Err("degrees must be a finite number".into())
            }
            FilterConfig::RoundedCorners { radius: 0, .. } => {
                Err("radius must be non-zero".into())
            }
            FilterConfig::RoundedCorners {
                background: Some(bg),
                ..
            } => parse_hex_color(bg).map(|_| ()),
            _ => Ok(()),
        }
    }

    /// Instantiate the filter, loading overlay images from disk.
    pub fn build(&self, base_dir: &Path) -> Result<Arc<dyn ImageFilter>, ConfigError> {
        Ok(match self {
            FilterConfig::Watermark {
                image,
                position,
                opacity,
                margin,
            } => {
                let path = base_dir.join(image);
                let overlay = image::open(&path)
                    .map_err(|source| ConfigError::Overlay { path, source })?;
                Arc::new(
                    Watermark::new(*position, overlay, *opacity)?
                        .with_insets(Insets::uniform(*margin)),
                )
            }
            FilterConfig::Rotate { degrees } => Arc::new(Rotation::new(*degrees)),
            FilterConfig::RoundedCorners { radius, background } => {
                let mut filter = RoundedCorners::new(*radius)?;
                if let Some(bg) = background {
                    filter = filter.with_background(
                        parse_hex_color(bg).map_err(ConfigError::Validation)?,
                    );
                }
                Arc::new(filter)
            }
        })
    }
}

/// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa`.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, String> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = || format!("invalid color '{value}', expected #rrggbb or #rrggbbaa");
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let d = c.to_digit(16).ok_or_else(invalid)? as u8;
                *slot = d * 17;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255])),
        8 => Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, channel(6)?])),
        _ => Err(invalid()),
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// How output file names are derived from input file names.
    pub rename: Rename,
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &BatchConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ThumbwrightConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge one config layer, letting a box size in `overlay` replace a
/// `scale` set by earlier layers.
fn merge_layer(mut base: toml::Value, overlay: toml::Value) -> toml::Value {
    let sets_box = overlay
        .get("thumbnail")
        .and_then(toml::Value::as_table)
        .is_some_and(|t| t.contains_key("width") || t.contains_key("height"));
    if let Some(thumbnail) = base
        .get_mut("thumbnail")
        .and_then(toml::Value::as_table_mut)
        .filter(|_| sets_box)
    {
        thumbnail.remove("scale");
    }
    merge_toml(base, overlay)
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<ThumbwrightConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(base, |merged, overlay| merge_layer(merged, overlay));
    let config: ThumbwrightConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<ThumbwrightConfig, ConfigError> {
    resolve_config(stock_defaults_value(), [load_raw_config(path)?])
}

/// Returns a fully-commented stock `thumbwright.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Thumbwright Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Thumbnail
# ---------------------------------------------------------------------------
[thumbnail]
# Target box in pixels.
width = 200
height = 200

# Uniform scale factor applied to the source instead of a target box.
# scale = 0.5

# Fit inside the box (true) or stretch to exactly width x height (false).
keep_aspect_ratio = true

# Fill the box and crop the overflow, keeping the part at this anchor:
# top-left, top-center, top-right, center-left, center, center-right,
# bottom-left, bottom-center, bottom-right.
# crop = "center"

# "original" re-encodes in the input's format. Otherwise a format name:
# jpg, png, gif, bmp, tiff, webp, avif.
output_format = "original"

# Lossy quality from 0.0 (smallest) to 1.0 (best).
# Omit (or set nan) to use each encoder's default. Ignored by formats without
# a quality knob.
# quality = 0.8

# nearest, triangle, catmull-rom, gaussian, lanczos3.
resampling = "lanczos3"

# Rotate/flip according to the EXIF orientation tag before resizing.
use_exif_orientation = true

# ---------------------------------------------------------------------------
# Filters (applied in order after resizing)
# ---------------------------------------------------------------------------
# [[filters]]
# kind = "watermark"
# image = "logo.png"          # Relative to this file
# position = "bottom-right"
# opacity = 0.5
# margin = 8
#
# [[filters]]
# kind = "rotate"
# degrees = 90
#
# [[filters]]
# kind = "rounded-corners"
# radius = 12
# background = "#ffffff"      # Omit for transparent corners

# ---------------------------------------------------------------------------
# Batch
# ---------------------------------------------------------------------------
[batch]
# no-change, prefix-dot-thumbnail, prefix-hyphen-thumbnail,
# suffix-dot-thumbnail, suffix-hyphen-thumbnail.
rename = "prefix-dot-thumbnail"

# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use image::{DynamicImage, GenericImageView, RgbaImage};
    use tempfile::TempDir;

    fn overlay(toml_str: &str) -> toml::Value {
        toml::from_str(toml_str).unwrap()
    }

    // =========================================================================
    // Defaults and parsing
    // =========================================================================

    #[test]
    fn default_config_values() {
        let config = ThumbwrightConfig::default();
        assert_eq!(config.thumbnail.width, 200);
        assert_eq!(config.thumbnail.height, 200);
        assert!(config.thumbnail.keep_aspect_ratio);
        assert_eq!(config.thumbnail.output_format, "original");
        assert!(config.filters.is_empty());
        assert_eq!(config.batch.rename, Rename::PrefixDotThumbnail);
    }

    #[test]
    fn parse_partial_config() {
        let config: ThumbwrightConfig = toml::from_str(
            r#"
[thumbnail]
width = 64
quality = 0.75
"#,
        )
        .unwrap();
        assert_eq!(config.thumbnail.width, 64);
        assert_eq!(config.thumbnail.height, 200);
        assert_eq!(config.thumbnail.quality, Some(0.75));
    }

    #[test]
    fn parse_filters_in_order() {
        let config: ThumbwrightConfig = toml::from_str(
            r##"
[[filters]]
kind = "rotate"
degrees = 90

[[filters]]
kind = "rounded-corners"
radius = 4
background = "#ffffff"

[[filters]]
kind = "watermark"
image = "logo.png"
"##,
        )
        .unwrap();
        assert_eq!(config.filters.len(), 3);
        assert_eq!(config.filters[0], FilterConfig::Rotate { degrees: 90.0 });
        assert_eq!(config.filters[1].kind(), "rounded-corners");
        assert_eq!(
            config.filters[2],
            FilterConfig::Watermark {
                image: PathBuf::from("logo.png"),
                position: Positions::BottomRight,
                opacity: 0.5,
                margin: 0,
            }
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ThumbwrightConfig, _> = toml::from_str(
            r#"
[thumbnail]
widht = 100
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ThumbwrightConfig, _> = toml::from_str("[imgaes]\nsize = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_filter_kind_rejected() {
        let result: Result<ThumbwrightConfig, _> =
            toml::from_str("[[filters]]\nkind = \"sepia\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_filter_key_rejected() {
        let result: Result<ThumbwrightConfig, _> =
            toml::from_str("[[filters]]\nkind = \"rotate\"\ndegrees = 90\nangle = 3\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ThumbwrightConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_out_of_range() {
        let result = resolve_config(
            stock_defaults_value(),
            [overlay("[thumbnail]\nquality = 1.5\n")],
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn nan_quality_means_codec_default() {
        let config = resolve_config(
            stock_defaults_value(),
            [overlay("[thumbnail]\nquality = nan\n")],
        )
        .unwrap();
        assert!(config.thumbnail.quality.is_some_and(f32::is_nan));
        let param = config.to_parameter(Path::new(".")).unwrap();
        assert_eq!(param.quality(), None);
    }

    #[test]
    fn validate_zero_size() {
        let result = resolve_config(stock_defaults_value(), [overlay("[thumbnail]\nwidth = 0\n")]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_size_ignored_with_scale() {
        let result = resolve_config(
            stock_defaults_value(),
            [overlay("[thumbnail]\nwidth = 0\nscale = 0.5\n")],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn validate_crop_with_scale() {
        let result = resolve_config(
            stock_defaults_value(),
            [overlay("[thumbnail]\nscale = 0.5\ncrop = \"center\"\n")],
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_filter_values() {
        let bad_opacity = overlay("[[filters]]\nkind = \"watermark\"\nimage = \"a.png\"\nopacity = 2.0\n");
        let zero_radius = overlay("[[filters]]\nkind = \"rounded-corners\"\nradius = 0\n");
        let bad_color = overlay("[[filters]]\nkind = \"rounded-corners\"\nradius = 3\nbackground = \"red\"\n");
        for value in [bad_opacity, zero_radius, bad_color] {
            let result = resolve_config(stock_defaults_value(), [value]);
            match result {
                Err(ConfigError::Validation(msg)) => assert!(msg.starts_with("filters[0]"), "{msg}"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_zero_max_processes() {
        let result = resolve_config(stock_defaults_value(), [overlay("[batch]\nmax_processes = 0\n")]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("thumbwright.toml");
        fs::write(
            &path,
            r#"
[thumbnail]
output_format = "png"

[batch]
rename = "suffix-hyphen-thumbnail"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.thumbnail.output_format, "png");
        assert_eq!(config.thumbnail.width, 200);
        assert_eq!(config.batch.rename, Rename::SuffixHyphenThumbnail);
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let result = load_config(Path::new("/nonexistent/thumbwright.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("thumbwright.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn later_overlays_win() {
        let config = resolve_config(
            stock_defaults_value(),
            [
                overlay("[thumbnail]\nwidth = 10\nheight = 20\n"),
                overlay("[thumbnail]\nwidth = 30\n"),
            ],
        )
        .unwrap();
        assert_eq!(config.thumbnail.width, 30);
        assert_eq!(config.thumbnail.height, 20);
    }

    // =========================================================================
    // to_parameter
    // =========================================================================

    #[test]
    fn to_parameter_from_defaults() {
        let param = ThumbwrightConfig::default()
            .to_parameter(Path::new("."))
            .unwrap();
        assert_eq!(
            param.sizing(),
            Sizing::Size {
                width: 200,
                height: 200
            }
        );
        assert_eq!(param.output_format(), &OutputFormat::Original);
        assert_eq!(param.quality(), None);
        assert!(param.filters().is_empty());
    }

    #[test]
    fn to_parameter_scale_and_quality() {
        let config = resolve_config(
            stock_defaults_value(),
            [overlay("[thumbnail]\nscale = 0.25\nquality = 0.5\noutput_format = \"JPEG\"\n")],
        )
        .unwrap();
        let param = config.to_parameter(Path::new(".")).unwrap();
        assert_eq!(param.sizing(), Sizing::Scale { x: 0.25, y: 0.25 });
        assert_eq!(param.quality(), Some(Quality::new(0.5).unwrap()));
        assert_eq!(param.output_format(), &OutputFormat::named("JPEG"));
    }

    #[test]
    fn to_parameter_loads_overlay_relative_to_base_dir() {
        let tmp = TempDir::new().unwrap();
        DynamicImage::ImageRgba8(RgbaImage::new(4, 4))
            .save(tmp.path().join("logo.png"))
            .unwrap();
        let config = resolve_config(
            stock_defaults_value(),
            [overlay(
                "[[filters]]\nkind = \"watermark\"\nimage = \"logo.png\"\n\n[[filters]]\nkind = \"rotate\"\ndegrees = 45\n",
            )],
        )
        .unwrap();

        let param = config.to_parameter(tmp.path()).unwrap();
        assert_eq!(param.filters().names(), vec!["watermark", "rotation"]);
    }

    #[test]
    fn to_parameter_missing_overlay_is_error() {
        let tmp = TempDir::new().unwrap();
        let config = resolve_config(
            stock_defaults_value(),
            [overlay("[[filters]]\nkind = \"watermark\"\nimage = \"missing.png\"\n")],
        )
        .unwrap();
        match config.to_parameter(tmp.path()) {
            Err(ConfigError::Overlay { path, .. }) => assert!(path.ends_with("missing.png")),
            other => panic!("expected overlay error, got {other:?}"),
        }
    }

    #[test]
    fn rounded_corners_background_is_applied() {
        let filter = FilterConfig::RoundedCorners {
            radius: 4,
            background: Some("#ff0000".into()),
        }
        .build(Path::new("."))
        .unwrap();
        let out = filter.apply(&DynamicImage::ImageRgb8(image::RgbImage::new(16, 16)));
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(out.to_rgb8().get_pixel(0, 0), &image::Rgb([255, 0, 0]));
    }

    // =========================================================================
    // parse_hex_color
    // =========================================================================

    #[test]
    fn hex_color_forms() {
        assert_eq!(parse_hex_color("#fff"), Ok(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_hex_color("#102030"), Ok(Rgba([16, 32, 48, 255])));
        assert_eq!(parse_hex_color("10203040"), Ok(Rgba([16, 32, 48, 64])));
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
    }

    // =========================================================================
    // effective_threads
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&BatchConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = BatchConfig {
            max_processes: Some(99999),
            ..BatchConfig::default()
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = BatchConfig {
            max_processes: Some(1),
            ..BatchConfig::default()
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn later_box_size_replaces_earlier_scale() {
        let config = resolve_config(
            stock_defaults_value(),
            [
                overlay("[thumbnail]\nscale = 0.5\n"),
                overlay("[thumbnail]\nwidth = 64\n"),
            ],
        )
        .unwrap();
        assert_eq!(config.thumbnail.scale, None);
        assert_eq!(config.thumbnail.width, 64);
        assert_eq!(config.thumbnail.height, 200);
    }

    #[test]
    fn scale_wins_within_one_layer() {
        let config = resolve_config(
            stock_defaults_value(),
            [overlay("[thumbnail]\nscale = 0.5\nwidth = 64\n")],
        )
        .unwrap();
        assert_eq!(config.thumbnail.scale, Some(0.5));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let merged = merge_toml(overlay("a = 1\nb = 2\n"), overlay("b = 3\n"));
        assert_eq!(merged.get("a").and_then(|v| v.as_integer()), Some(1));
        assert_eq!(merged.get("b").and_then(|v| v.as_integer()), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let merged = merge_toml(
            overlay("[thumbnail]\nwidth = 1\nheight = 2\n"),
            overlay("[thumbnail]\nheight = 5\n"),
        );
        let t = merged.get("thumbnail").unwrap();
        assert_eq!(t.get("width").and_then(|v| v.as_integer()), Some(1));
        assert_eq!(t.get("height").and_then(|v| v.as_integer()), Some(5));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let merged = merge_toml(
            overlay("[[filters]]\nkind = \"rotate\"\ndegrees = 1\n"),
            overlay("[[filters]]\nkind = \"rotate\"\ndegrees = 2\n[[filters]]\nkind = \"rotate\"\ndegrees = 3\n"),
        );
        assert_eq!(merged.get("filters").and_then(|v| v.as_array()).map(Vec::len), Some(2));
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ThumbwrightConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ThumbwrightConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[thumbnail]"));
        assert!(content.contains("[[filters]]"));
        assert!(content.contains("[batch]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("thumbnail").is_some());
        assert!(val.get("filters").is_some());
        assert!(val.get("batch").is_some());
    }
}
