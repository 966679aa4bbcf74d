//! The codec registry: which formats can be read, which can be written, and
//! how quality is passed to each encoder.
//!
//! All decoding and encoding is done by the `image` crate. This module only
//! picks the right codec, converts pixels to something the encoder accepts,
//! and applies the requested quality.
//!
//! | Format | Decode | Encode | Quality |
//! |---|---|---|---|
//! | JPEG | yes | yes | `JpegEncoder::new_with_quality` |
//! | PNG | yes | yes | mapped to deflate effort (`CompressionType`) |
//! | GIF | first frame | single frame | no |
//! | BMP | yes | yes | no |
//! | TIFF | yes | yes | no |
//! | WebP | first frame | lossless | no |
//! | AVIF | no | yes | `AvifEncoder::new_with_speed_quality` |
//!
//! AVIF has no decoder: the `image` crate's `"avif"` feature only enables the
//! **encoder** (rav1e). The decoder needs `"avif-native"` (a C library we
//! don't link). `ImageFormat::reading_enabled()` reports `true` for AVIF
//! when `"avif"` is on, so the registry's own flag is what counts.

use super::color::{convert_to, is_gray};
use super::params::Quality;
use super::task::TaskError;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ColorType, DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader};
use std::io::{BufRead, Cursor, Seek};

/// Error message when no registered decoder recognises the input.
pub const NO_DECODER_MESSAGE: &str = "No acceptable decoder found for source data.";

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// One row of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    /// Canonical lowercase name, also used as the output file extension.
    pub name: &'static str,
    /// Names accepted in addition to `name`.
    pub aliases: &'static [&'static str],
    pub format: ImageFormat,
    pub decode: bool,
    pub encode: bool,
    /// Whether the encoder takes a quality setting.
    pub quality: bool,
}

const CODECS: &[Codec] = &[
    Codec {
        name: "jpg",
        aliases: &["jpeg", "jpe", "jfif"],
        format: ImageFormat::Jpeg,
        decode: true,
        encode: true,
        quality: true,
    },
    Codec {
        name: "png",
        aliases: &[],
        format: ImageFormat::Png,
        decode: true,
        encode: true,
        quality: true,
    },
    Codec {
        name: "gif",
        aliases: &[],
        format: ImageFormat::Gif,
        decode: true,
        encode: true,
        quality: false,
    },
    Codec {
        name: "bmp",
        aliases: &["dib"],
        format: ImageFormat::Bmp,
        decode: true,
        encode: true,
        quality: false,
    },
    Codec {
        name: "tiff",
        aliases: &["tif"],
        format: ImageFormat::Tiff,
        decode: true,
        encode: true,
        quality: false,
    },
    Codec {
        name: "webp",
        aliases: &[],
        format: ImageFormat::WebP,
        decode: true,
        encode: true,
        quality: false,
    },
    Codec {
        name: "avif",
        aliases: &[],
        format: ImageFormat::Avif,
        decode: false,
        encode: true,
        quality: true,
    },
];

/// Every format the registry knows about, readable or not.
pub fn codecs() -> &'static [Codec] {
    CODECS
}

impl Codec {
    fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Registered for decoding and compiled into this build.
    pub fn can_decode(&self) -> bool {
        self.decode && self.format.reading_enabled()
    }

    pub fn can_encode(&self) -> bool {
        self.encode && self.format.writing_enabled()
    }
}

/// Look up a format by name or extension, case-insensitively.
pub fn lookup(name: &str) -> Option<&'static Codec> {
    let name = name.trim().trim_start_matches('.');
    CODECS.iter().find(|c| c.matches(name))
}

/// The registry entry for a detected format.
pub fn for_format(format: ImageFormat) -> Option<&'static Codec> {
    CODECS.iter().find(|c| c.format == format)
}

/// Canonical name of a format, falling back to its first extension.
pub fn format_name(format: ImageFormat) -> &'static str {
    for_format(format)
        .map(|c| c.name)
        .or_else(|| format.extensions_str().first().copied())
        .unwrap_or("unknown")
}

/// Find an encoder for a format name. `None` when nothing can write it.
pub fn find_encoder(name: &str) -> Option<&'static Codec> {
    lookup(name).filter(|c| c.can_encode())
}

/// File extensions (lowercase, all aliases) with a working decoder.
pub fn readable_extensions() -> Vec<&'static str> {
    CODECS
        .iter()
        .filter(|c| c.can_decode())
        .flat_map(|c| std::iter::once(c.name).chain(c.aliases.iter().copied()))
        .collect()
}

/// A decoded first frame and the format it was detected as.
#[derive(Debug)]
pub struct Decoded {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// Sniff the format from content, decode exactly the first frame, and
/// optionally apply the EXIF orientation.
///
/// Fails with an `InvalidData` I/O error when no registered decoder claims
/// the content.
pub fn decode_first_frame<R: BufRead + Seek>(
    input: R,
    apply_orientation: bool,
) -> Result<Decoded, TaskError> {
    let reader = ImageReader::new(input).with_guessed_format()?;
    let format = reader
        .format()
        .filter(|f| for_format(*f).is_some_and(Codec::can_decode))
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, NO_DECODER_MESSAGE))?;
    log::debug!("decoding input as {}", format_name(format));

    let mut decoder = reader.into_decoder()?;
    let orientation = if apply_orientation {
        Some(decoder.orientation()?)
    } else {
        None
    };
    let mut image = DynamicImage::from_decoder(decoder)?;
    if let Some(orientation) = orientation {
        image.apply_orientation(orientation);
    }

    Ok(Decoded { image, format })
}

/// Convert `img` to a color type the encoder for `format` accepts.
fn prepare(img: &DynamicImage, format: ImageFormat) -> DynamicImage {
    let color = img.color();
    let alpha = color.has_alpha();
    let target = match format {
        ImageFormat::Jpeg if is_gray(color) => ColorType::L8,
        ImageFormat::Jpeg => ColorType::Rgb8,
        ImageFormat::Gif => ColorType::Rgba8,
        ImageFormat::Png => match color {
            ColorType::Rgb32F => ColorType::Rgb16,
            ColorType::Rgba32F => ColorType::Rgba16,
            other => other,
        },
        // TIFF has no gray+alpha writer
        ImageFormat::Tiff => match color {
            ColorType::La8 => ColorType::Rgba8,
            ColorType::La16 => ColorType::Rgba16,
            ColorType::Rgb32F => ColorType::Rgb16,
            ColorType::Rgba32F => ColorType::Rgba16,
            other => other,
        },
        ImageFormat::WebP | ImageFormat::Avif | ImageFormat::Bmp => {
            if alpha {
                ColorType::Rgba8
            } else {
                ColorType::Rgb8
            }
        }
        _ => color,
    };
    convert_to(img.clone(), target)
}

/// Map quality onto PNG deflate effort. PNG is lossless: higher quality
/// trades file size for speed.
fn png_compression(quality: Quality) -> CompressionType {
    match quality.value() {
        q if q >= 0.75 => CompressionType::Fast,
        q if q <= 0.25 => CompressionType::Best,
        _ => CompressionType::Default,
    }
}

impl Codec {
    /// Encode a single frame. `quality` is ignored by encoders without a
    /// quality setting; `None` keeps the encoder default.
    pub fn encode(&self, img: &DynamicImage, quality: Option<Quality>) -> Result<Vec<u8>, ImageError> {
        let img = prepare(img, self.format);
        let quality = quality.filter(|_| self.quality);
        log::debug!(
            "encoding {}x{} {:?} as {} (quality: {})",
            img.width(),
            img.height(),
            img.color(),
            self.name,
            quality.map_or("default".to_string(), |q| q.value().to_string())
        );

        let mut buf = Vec::new();
        match (self.format, quality) {
            (ImageFormat::Jpeg, Some(q)) => {
                img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q.percent()))?
            }
            (ImageFormat::Avif, Some(q)) => img.write_with_encoder(
                AvifEncoder::new_with_speed_quality(&mut buf, AVIF_SPEED, q.percent()),
            )?,
            (ImageFormat::Png, Some(q)) => img.write_with_encoder(PngEncoder::new_with_quality(
                &mut buf,
                png_compression(q),
                PngFilter::Adaptive,
            ))?,
            (format, _) => img.write_to(&mut Cursor::new(&mut buf), format)?,
        }
        Ok(buf)
    }
}
