//! # Thumbwright
//!
//! A thumbnail generator: decode an image, resize it, run it through a chain
//! of filters, and encode the result, either in the format it came in or in
//! one you name.
//!
//! # Architecture: Task + Pipeline
//!
//! Every thumbnail is produced by one call to
//! [`create_thumbnail`](imaging::create_thumbnail) on a single-use task:
//!
//! ```text
//! task.read()  →  resize  →  filters (in order)  →  task.write()
//! ```
//!
//! The task owns the I/O: [`StreamThumbnailTask`](imaging::StreamThumbnailTask)
//! borrows a reader and a writer, [`FileThumbnailTask`](imaging::FileThumbnailTask)
//! works on paths. Everything else (sizing, filters, format, quality) lives in an
//! immutable [`ThumbnailParameter`](imaging::ThumbnailParameter) built once and
//! shared freely between threads.
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use thumbwright::imaging::{
//!     OutputFormat, Positions, Sizing, StreamThumbnailTask, ThumbnailParameter,
//!     Watermark, create_thumbnail,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let logo = image::open("logo.png")?;
//! let param = ThumbnailParameter::builder(Sizing::Size { width: 200, height: 200 })
//!     .output_format(OutputFormat::named("png"))
//!     .filter(Watermark::new(Positions::BottomRight, logo, 0.5)?)
//!     .build()?;
//!
//! let mut input = Cursor::new(std::fs::read("photo.jpg")?);
//! let mut output = Vec::new();
//! let mut task = StreamThumbnailTask::new(param, &mut input, &mut output);
//! create_thumbnail(&mut task)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decoding, resizing, filters, positions, codec registry, tasks |
//! | [`config`] | `thumbwright.toml` loading, validation, merging, and conversion to parameters |
//! | [`batch`] | Input expansion and parallel thumbnailing into an output directory |
//! | [`naming`] | Output file name rules (`thumbnail.a.jpg`, `a-thumbnail.jpg`, ...) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Content Sniffing, Never Extensions
//!
//! The input format is detected from the leading bytes. A PNG named `x.jpg`
//! is a PNG. The detected format is remembered on the task so that
//! [`OutputFormat::Original`](imaging::OutputFormat::Original) can re-encode in
//! kind.
//!
//! ## "No Encoder" Is Not an Error at the Task Level
//!
//! [`ThumbnailTask::write`](imaging::ThumbnailTask::write) returns `Ok(false)`
//! and writes nothing when the requested format has no encoder. Only
//! [`create_thumbnail`](imaging::create_thumbnail) turns that into
//! [`ThumbnailError::UnsupportedFormat`](imaging::ThumbnailError::UnsupportedFormat).
//! Callers driving tasks by hand can test formats without parsing errors.
//!
//! ## Pure-Rust Imaging
//!
//! Codecs come from the `image` crate and free-angle rotation from `imageproc`.
//! There are no system libraries to install, so the binary is self-contained.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
