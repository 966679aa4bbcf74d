//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Make
//!
//! ```text
//! photo.jpg → thumb.jpg (jpg)
//! ```
//!
//! ## Batch
//!
//! ```text
//! Thumbnailing 3 files
//! 001 photos/a.jpg
//!     → thumbs/thumbnail.a.jpg
//! 002 photos/b.jpg
//!     Error: IO error: No acceptable decoder found for source data.
//!
//! Done: 2 written, 1 failed
//! ```
//!
//! ## Formats
//!
//! ```text
//! Format  Read  Write  Quality  Aliases
//! jpg     yes   yes    yes      jpeg, jpe, jfif
//! avif    no    yes    yes
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport};
use crate::imaging::codec::Codec;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

// ============================================================================
// make
// ============================================================================

/// One-line summary of a single thumbnail. `-` stands for stdin/stdout.
pub fn format_make_result(source: &str, destination: &str, format: &str) -> String {
    format!("{} → {} ({})", source, destination, format)
}

// ============================================================================
// batch
// ============================================================================

pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("Thumbnailing {} {}", total, noun)]
        }
        BatchEvent::FileDone {
            index,
            source,
            destination,
        } => vec![
            format!("{} {}", format_index(*index), source.display()),
            format!("    → {}", destination.display()),
        ],
        BatchEvent::FileFailed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}", format_index(*index), source.display()),
            format!("    Error: {}", error),
        ],
    }
}

pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Done: {} written, {} failed",
            report.succeeded(),
            report.failed()
        ),
    ]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// formats
// ============================================================================

pub fn format_codecs(codecs: &[Codec]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<8}{:<6}{:<7}{:<9}{}",
        "Format", "Read", "Write", "Quality", "Aliases"
    )];
    for codec in codecs {
        let line = format!(
            "{:<8}{:<6}{:<7}{:<9}{}",
            codec.name,
            yes_no(codec.can_decode()),
            yes_no(codec.can_encode()),
            yes_no(codec.quality),
            codec.aliases.join(", ")
        );
        lines.push(line.trim_end().to_string());
    }
    lines
}

pub fn print_codecs(codecs: &[Codec]) {
    for line in format_codecs(codecs) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FileReport;
    use crate::imaging::codec;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn make_result_line() {
        assert_eq!(
            format_make_result("-", "thumb.png", "png"),
            "- → thumb.png (png)"
        );
    }

    #[test]
    fn batch_started_pluralizes() {
        assert_eq!(
            format_batch_event(&BatchEvent::Started { total: 1 }),
            vec!["Thumbnailing 1 file"]
        );
        assert_eq!(
            format_batch_event(&BatchEvent::Started { total: 3 }),
            vec!["Thumbnailing 3 files"]
        );
    }

    #[test]
    fn batch_file_done_lines() {
        let lines = format_batch_event(&BatchEvent::FileDone {
            index: 2,
            source: PathBuf::from("photos/a.jpg"),
            destination: PathBuf::from("thumbs/thumbnail.a.jpg"),
        });
        assert_eq!(lines, vec!["002 photos/a.jpg", "    → thumbs/thumbnail.a.jpg"]);
    }

    #[test]
    fn batch_file_failed_lines() {
        let lines = format_batch_event(&BatchEvent::FileFailed {
            index: 1,
            source: PathBuf::from("b.png"),
            error: "boom".into(),
        });
        assert_eq!(lines, vec!["001 b.png", "    Error: boom"]);
    }

    #[test]
    fn batch_summary_counts() {
        let report = BatchReport {
            files: vec![
                FileReport {
                    source: PathBuf::from("a"),
                    destination: PathBuf::from("b"),
                    error: None,
                },
                FileReport {
                    source: PathBuf::from("c"),
                    destination: PathBuf::from("d"),
                    error: Some("bad".into()),
                },
            ],
        };
        assert_eq!(
            format_batch_summary(&report),
            vec!["", "Done: 1 written, 1 failed"]
        );
    }

    #[test]
    fn codecs_table_lists_every_format() {
        let lines = format_codecs(codec::codecs());
        assert_eq!(lines.len(), codec::codecs().len() + 1);
        assert!(lines[0].starts_with("Format"));
        let jpg = lines.iter().find(|l| l.starts_with("jpg")).unwrap();
        assert!(jpg.ends_with("jpeg, jpe, jfif"));
        let avif = lines.iter().find(|l| l.starts_with("avif")).unwrap();
        assert_eq!(avif, "avif    no    yes    yes");
    }
}
