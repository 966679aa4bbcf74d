//! Output filename rules for batch mode.
//!
//! A [`Rename`] turns a source file name into its thumbnail's file name by
//! adding a `thumbnail` marker before or after the stem:
//!
//! | Rule | `photo.jpg` becomes |
//! |---|---|
//! | `no-change` | `photo.jpg` |
//! | `prefix-dot-thumbnail` | `thumbnail.photo.jpg` |
//! | `prefix-hyphen-thumbnail` | `thumbnail-photo.jpg` |
//! | `suffix-dot-thumbnail` | `photo.thumbnail.jpg` |
//! | `suffix-hyphen-thumbnail` | `photo-thumbnail.jpg` |
//!
//! When the output is encoded in a different format than the source, the
//! caller passes that format's extension and it replaces the original one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MARKER: &str = "thumbnail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rename {
    NoChange,
    #[default]
    PrefixDotThumbnail,
    PrefixHyphenThumbnail,
    SuffixDotThumbnail,
    SuffixHyphenThumbnail,
}

impl Rename {
    pub const ALL: [Rename; 5] = [
        Rename::NoChange,
        Rename::PrefixDotThumbnail,
        Rename::PrefixHyphenThumbnail,
        Rename::SuffixDotThumbnail,
        Rename::SuffixHyphenThumbnail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rename::NoChange => "no-change",
            Rename::PrefixDotThumbnail => "prefix-dot-thumbnail",
            Rename::PrefixHyphenThumbnail => "prefix-hyphen-thumbnail",
            Rename::SuffixDotThumbnail => "suffix-dot-thumbnail",
            Rename::SuffixHyphenThumbnail => "suffix-hyphen-thumbnail",
        }
    }

    /// Apply the rule to `file_name`, optionally swapping its extension.
    ///
    /// Only the last `.`-separated part counts as the extension, and a
    /// leading dot (as in `.hidden`) does not. Names without an extension
    /// gain `extension` if one is given.
    pub fn apply(self, file_name: &str, extension: Option<&str>) -> String {
        let (stem, original_ext) = split_extension(file_name);
        let stem = match self {
            Rename::NoChange => stem.to_string(),
            Rename::PrefixDotThumbnail => format!("{MARKER}.{stem}"),
            Rename::PrefixHyphenThumbnail => format!("{MARKER}-{stem}"),
            Rename::SuffixDotThumbnail => format!("{stem}.{MARKER}"),
            Rename::SuffixHyphenThumbnail => format!("{stem}-{MARKER}"),
        };
        match extension.or(original_ext) {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        }
    }
}

fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, None),
        Some(dot) => (&file_name[..dot], Some(&file_name[dot + 1..])),
    }
}

impl fmt::Display for Rename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rename {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Rename::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<_> = Rename::ALL.iter().map(|r| r.as_str()).collect();
                format!("unknown rename rule '{value}'. Expected one of: {}", known.join(", "))
            })
    }
}
