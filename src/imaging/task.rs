//! Thumbnail tasks: where the image comes from and where it goes.
//!
//! The [`ThumbnailTask`] trait defines the two I/O operations every task
//! must support, `read` and `write`, plus access to its
//! [`ThumbnailParameter`]. [`create_thumbnail`](super::operations::create_thumbnail)
//! drives a task through `read → resize → filter → write`.
//!
//! | Task | Source | Destination |
//! |---|---|---|
//! | [`StreamThumbnailTask`] | any `Read` (borrowed) | any `Write` (borrowed) |
//! | [`FileThumbnailTask`] | file path | file path |
//!
//! Format detection always looks at the bytes, never at a file name. The
//! detected format is remembered so [`OutputFormat::Original`] can reuse it.

use super::codec::{self, Codec, Decoded};
use super::params::{OutputFormat, ThumbnailParameter};
use image::{DynamicImage, ImageError, ImageFormat};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// A single-use unit of thumbnail work.
pub trait ThumbnailTask {
    fn param(&self) -> &ThumbnailParameter;

    /// Decode the first frame of the source and remember its format.
    fn read(&mut self) -> Result<DynamicImage, TaskError>;

    /// Encode `img` to the destination.
    ///
    /// Returns `Ok(false)` without touching the destination when no encoder
    /// exists for the requested format.
    fn write(&mut self, img: &DynamicImage) -> Result<bool, TaskError>;
}

/// Resolve the encoder for a parameter's output format, given the format
/// detected at read time (if any).
pub fn resolve_encoder(
    output: &OutputFormat,
    input_format: Option<ImageFormat>,
) -> Option<&'static Codec> {
    let name = match output {
        OutputFormat::Named(name) => name.as_str(),
        OutputFormat::Original => codec::format_name(input_format?),
    };
    let encoder = codec::find_encoder(name);
    if encoder.is_none() {
        log::debug!("no encoder available for '{name}'");
    }
    encoder
}

/// Reads from a caller-owned reader and writes to a caller-owned writer.
///
/// The streams are borrowed: the task never closes them, and the caller can
/// keep using them afterwards. The whole input is buffered in memory before
/// decoding so that format sniffing can rewind.
pub struct StreamThumbnailTask<'a, R: Read, W: Write> {
    param: ThumbnailParameter,
    input: &'a mut R,
    output: &'a mut W,
    input_format: Option<ImageFormat>,
}

impl<'a, R: Read, W: Write> StreamThumbnailTask<'a, R, W> {
    pub fn new(param: ThumbnailParameter, input: &'a mut R, output: &'a mut W) -> Self {
        Self {
            param,
            input,
            output,
            input_format: None,
        }
    }

    /// The format detected by the last successful [`read`](ThumbnailTask::read).
    pub fn input_format(&self) -> Option<ImageFormat> {
        self.input_format
    }
}

impl<R: Read, W: Write> ThumbnailTask for StreamThumbnailTask<'_, R, W> {
    fn param(&self) -> &ThumbnailParameter {
        &self.param
    }

    fn read(&mut self) -> Result<DynamicImage, TaskError> {
        let mut buf = Vec::new();
        self.input.read_to_end(&mut buf)?;
        let Decoded { image, format } =
            codec::decode_first_frame(Cursor::new(buf), self.param.use_exif_orientation())?;
        self.input_format = Some(format);
        Ok(image)
    }

    fn write(&mut self, img: &DynamicImage) -> Result<bool, TaskError> {
        let Some(encoder) = resolve_encoder(self.param.output_format(), self.input_format) else {
            return Ok(false);
        };
        let bytes = encoder.encode(img, self.param.quality())?;
        self.output.write_all(&bytes)?;
        self.output.flush()?;
        Ok(true)
    }
}

/// Reads a source file and writes a destination file.
///
/// The destination is created only once the encoded bytes are ready, so an
/// unknown format or a codec error leaves nothing behind.
pub struct FileThumbnailTask {
    param: ThumbnailParameter,
    source: PathBuf,
    destination: PathBuf,
    input_format: Option<ImageFormat>,
}

impl FileThumbnailTask {
    pub fn new(
        param: ThumbnailParameter,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            param,
            source: source.into(),
            destination: destination.into(),
            input_format: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn input_format(&self) -> Option<ImageFormat> {
        self.input_format
    }
}

impl ThumbnailTask for FileThumbnailTask {
    fn param(&self) -> &ThumbnailParameter {
        &self.param
    }

    fn read(&mut self) -> Result<DynamicImage, TaskError> {
        let file = File::open(&self.source)?;
        let Decoded { image, format } =
            codec::decode_first_frame(BufReader::new(file), self.param.use_exif_orientation())?;
        self.input_format = Some(format);
        Ok(image)
    }

    fn write(&mut self, img: &DynamicImage) -> Result<bool, TaskError> {
        let Some(encoder) = resolve_encoder(self.param.output_format(), self.input_format) else {
            return Ok(false);
        };
        let bytes = encoder.encode(img, self.param.quality())?;
        std::fs::write(&self.destination, bytes)?;
        Ok(true)
    }
}
