//! Filters applied to a decoded, resized image before it is encoded.
//!
//! A filter is a pure function from one buffer to another. The input is
//! borrowed and never mutated; every filter returns a fresh image.
//!
//! | Filter | Effect | Color type of the result |
//! |---|---|---|
//! | [`Watermark`] | alpha-blend an overlay at a [`Position`](super::position::Position) | unchanged |
//! | [`Rotation`] | rotate clockwise by any angle | unchanged at right angles, RGBA8 otherwise |
//! | [`RoundedCorners`] | mask corners with quarter circles | gains alpha unless a background is set |
//!
//! [`Pipeline`] chains filters in a fixed order and is itself a filter.

mod rotation;
mod rounded;
mod watermark;

pub use rotation::Rotation;
pub use rounded::RoundedCorners;
pub use watermark::Watermark;

use image::DynamicImage;
use std::fmt;
use std::sync::Arc;

/// A transformation from one image to another.
pub trait ImageFilter: Send + Sync {
    fn apply(&self, img: &DynamicImage) -> DynamicImage;

    /// Short name for logs and CLI output.
    fn name(&self) -> &'static str;
}

/// An ordered list of filters applied one after the other.
#[derive(Clone, Default)]
pub struct Pipeline {
    filters: Vec<Arc<dyn ImageFilter>>,
}

impl Pipeline {
    pub fn new(filters: Vec<Arc<dyn ImageFilter>>) -> Self {
        Self { filters }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ImageFilter for Pipeline {
    fn apply(&self, img: &DynamicImage) -> DynamicImage {
        let mut current = img.clone();
        for filter in &self.filters {
            log::debug!(
                "applying filter '{}' to {}x{} image",
                filter.name(),
                current.width(),
                current.height()
            );
            current = filter.apply(&current);
        }
        current
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}
