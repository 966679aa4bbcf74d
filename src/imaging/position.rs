//! Placement of one rectangle inside another.
//!
//! A [`Position`] answers a single question: given an enclosing area and an
//! element of some size, where does the element's top-left corner go? It is
//! used by the watermark filter to place the overlay and by the resize step
//! to pick which part of a filled image survives a crop.
//!
//! ```text
//! TopLeft      TopCenter      TopRight
//! CenterLeft   Center         CenterRight
//! BottomLeft   BottomCenter   BottomRight
//! ```
//!
//! Insets keep the element away from the edges it is anchored to. Centred
//! axes ignore insets. Offsets are signed: an element larger than the
//! enclosing area gets a negative offset on anchored-right/bottom and
//! centred axes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Margins between a placed element and the edges of the enclosing area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Insets {
    /// Same margin on every side.
    pub fn uniform(margin: u32) -> Self {
        Self {
            top: margin,
            right: margin,
            bottom: margin,
            left: margin,
        }
    }
}

/// Computes where an element of `width`×`height` is placed within an
/// enclosing area of `enclosing_width`×`enclosing_height`.
pub trait Position: fmt::Debug + Send + Sync {
    fn calculate(
        &self,
        enclosing_width: u32,
        enclosing_height: u32,
        width: u32,
        height: u32,
        insets: Insets,
    ) -> (i64, i64);
}

/// The nine anchored placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Positions {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Clone, Copy)]
enum Anchor {
    Start,
    Middle,
    End,
}

fn place(anchor: Anchor, enclosing: u32, size: u32, start_inset: u32, end_inset: u32) -> i64 {
    let (enclosing, size) = (enclosing as i64, size as i64);
    match anchor {
        Anchor::Start => start_inset as i64,
        Anchor::Middle => enclosing / 2 - size / 2,
        Anchor::End => enclosing - size - end_inset as i64,
    }
}

impl Positions {
    pub const ALL: [Positions; 9] = [
        Positions::TopLeft,
        Positions::TopCenter,
        Positions::TopRight,
        Positions::CenterLeft,
        Positions::Center,
        Positions::CenterRight,
        Positions::BottomLeft,
        Positions::BottomCenter,
        Positions::BottomRight,
    ];

    fn anchors(self) -> (Anchor, Anchor) {
        use Anchor::*;
        match self {
            Positions::TopLeft => (Start, Start),
            Positions::TopCenter => (Middle, Start),
            Positions::TopRight => (End, Start),
            Positions::CenterLeft => (Start, Middle),
            Positions::Center => (Middle, Middle),
            Positions::CenterRight => (End, Middle),
            Positions::BottomLeft => (Start, End),
            Positions::BottomCenter => (Middle, End),
            Positions::BottomRight => (End, End),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Positions::TopLeft => "top-left",
            Positions::TopCenter => "top-center",
            Positions::TopRight => "top-right",
            Positions::CenterLeft => "center-left",
            Positions::Center => "center",
            Positions::CenterRight => "center-right",
            Positions::BottomLeft => "bottom-left",
            Positions::BottomCenter => "bottom-center",
            Positions::BottomRight => "bottom-right",
        }
    }
}

impl Position for Positions {
    fn calculate(
        &self,
        enclosing_width: u32,
        enclosing_height: u32,
        width: u32,
        height: u32,
        insets: Insets,
    ) -> (i64, i64) {
        let (horizontal, vertical) = self.anchors();
        (
            place(horizontal, enclosing_width, width, insets.left, insets.right),
            place(vertical, enclosing_height, height, insets.top, insets.bottom),
        )
    }
}

impl fmt::Display for Positions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Positions {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Positions::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| format!("unknown position '{value}'. Expected one of: top-left, top-center, top-right, center-left, center, center-right, bottom-left, bottom-center, bottom-right"))
    }
}

/// A fixed offset, independent of sizes and insets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Position for Coordinate {
    fn calculate(&self, _: u32, _: u32, _: u32, _: u32, _: Insets) -> (i64, i64) {
        (self.x, self.y)
    }
}
