//! Batch thumbnail generation.
//!
//! Turns a list of files and directories into thumbnails under one output
//! directory. Each input file becomes an independent [`FileThumbnailTask`];
//! files are processed in parallel on the current rayon pool.
//!
//! ## Input Expansion
//!
//! - Files are taken as given, whatever their extension (detection is by
//!   content).
//! - Directories are walked recursively, keeping files whose extension has a
//!   registered decoder. Their layout is mirrored under the output directory.
//!
//! ## Output Structure
//!
//! ```text
//! thumbwright batch photos/ cover.png --out-dir thumbs/
//!
//! thumbs/
//! ├── thumbnail.cover.png
//! ├── thumbnail.a.jpg              # photos/a.jpg
//! └── 2024/
//!     └── thumbnail.b.jpg          # photos/2024/b.jpg
//! ```
//!
//! ## Failures
//!
//! A file that cannot be read, decoded, or encoded is recorded in the
//! [`BatchReport`] and the batch moves on. So is a file whose destination
//! another input already claims (`x/a.png` and `y/a.png` given explicitly).
//! Nothing short of an empty input set aborts the run.

use crate::imaging::codec;
use crate::imaging::{
    FileThumbnailTask, OutputFormat, TaskError, ThumbnailError, ThumbnailParameter,
    create_thumbnail,
};
use crate::naming::Rename;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no readable images found in the given inputs")]
    NoInputs,
}

/// One file to thumbnail, with its path relative to the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInput {
    pub source: PathBuf,
    /// Where the source sits relative to the input it was found under.
    /// Only the parent directories are kept when building the destination.
    pub relative: PathBuf,
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    FileDone {
        index: usize,
        source: PathBuf,
        destination: PathBuf,
    },
    FileFailed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// Result for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a whole batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }
}

fn has_readable_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|known| known.eq_ignore_ascii_case(e)))
}

/// Expand files and directories into the list of files to process.
///
/// Missing paths and unreadable directory entries are skipped with a
/// warning. Returns
/// [`BatchError::NoInputs`] if nothing is left.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<BatchInput>, BatchError> {
    let extensions = codec::readable_extensions();
    let mut collected = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::warn!(
                            "skipping unreadable entry under {}: {e}",
                            input.display()
                        );
                        continue;
                    }
                };
                let path = entry.path();
                if !entry.file_type().is_file() || !has_readable_extension(path, &extensions) {
                    continue;
                }
                let relative = path.strip_prefix(input).unwrap_or(path).to_path_buf();
                collected.push(BatchInput {
                    source: path.to_path_buf(),
                    relative,
                });
            }
        } else if input.is_file() {
            let relative = input
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| input.clone());
            collected.push(BatchInput {
                source: input.clone(),
                relative,
            });
        } else {
            log::warn!("skipping {}: no such file or directory", input.display());
        }
    }

    if collected.is_empty() {
        return Err(BatchError::NoInputs);
    }
    Ok(collected)
}

/// Destination path for `input` under `out_dir`.
///
/// An explicit output format swaps in its canonical extension; `Original`
/// keeps the source's extension.
pub fn output_path(
    input: &BatchInput,
    out_dir: &Path,
    rename: Rename,
    format: &OutputFormat,
) -> PathBuf {
    let extension = match format {
        OutputFormat::Named(name) => codec::lookup(name).map(|c| c.name),
        OutputFormat::Original => None,
    };
    let file_name = input
        .relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match input.relative.parent() {
        Some(parent) => out_dir.join(parent),
        None => out_dir.to_path_buf(),
    };
    dir.join(rename.apply(&file_name, extension))
}

fn process_one(
    input: &BatchInput,
    destination: &Path,
    param: &ThumbnailParameter,
) -> Result<(), ThumbnailError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(TaskError::from)?;
    }
    let mut task = FileThumbnailTask::new(param.clone(), &input.source, destination);
    create_thumbnail(&mut task)
}

/// Thumbnail every input into `out_dir` in parallel.
///
/// Per-file failures are reported, never propagated. When two inputs map
/// to the same destination the first one in input order is written and the
/// others are reported as failures. When `events` is set, progress is
/// streamed to it as files complete.
pub fn run_batch(
    inputs: &[BatchInput],
    out_dir: &Path,
    param: &ThumbnailParameter,
    rename: Rename,
    events: Option<Sender<BatchEvent>>,
) -> BatchReport {
    if let Some(tx) = &events {
        let _ = tx.send(BatchEvent::Started {
            total: inputs.len(),
        });
    }

    let destinations: Vec<PathBuf> = inputs
        .iter()
        .map(|input| output_path(input, out_dir, rename, param.output_format()))
        .collect();
    let mut claimed: HashMap<&Path, usize> = HashMap::new();
    let owners: Vec<usize> = destinations
        .iter()
        .enumerate()
        .map(|(i, dest)| *claimed.entry(dest.as_path()).or_insert(i))
        .collect();

    let files = inputs
        .par_iter()
        .zip(destinations.par_iter().zip(owners.par_iter()))
        .enumerate()
        .map_with(events, |events, (i, (input, (destination, &owner)))| {
            let index = i + 1;
            let destination = destination.clone();
            let outcome = if owner == i {
                process_one(input, &destination, param).map_err(|e| e.to_string())
            } else {
                Err(format!(
                    "{} is already written from {}",
                    destination.display(),
                    inputs[owner].source.display()
                ))
            };
            let error = match outcome {
                Ok(()) => {
                    log::info!(
                        "{} → {}",
                        input.source.display(),
                        destination.display()
                    );
                    if let Some(tx) = events {
                        let _ = tx.send(BatchEvent::FileDone {
                            index,
                            source: input.source.clone(),
                            destination: destination.clone(),
                        });
                    }
                    None
                }
                Err(e) => {
                    log::warn!("failed to thumbnail {}: {e}", input.source.display());
                    if let Some(tx) = events {
                        let _ = tx.send(BatchEvent::FileFailed {
                            index,
                            source: input.source.clone(),
                            error: e.clone(),
                        });
                    }
                    Some(e)
                }
            };
            FileReport {
                source: input.source.clone(),
                destination,
                error,
            }
        })
        .collect();

    BatchReport { files }
}
