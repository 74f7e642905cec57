//! Labeled templates and their pose transforms.

use crate::image::{ImageView, OwnedImage};
use crate::util::{DiceMatchError, DiceMatchResult};

mod plan;
pub mod rotate;
pub mod transform;

pub use plan::TemplatePlan;

/// Reference pip-pattern image tagged with the pip count it represents.
#[derive(Clone, Debug)]
pub struct Template {
    img: OwnedImage,
    label: u32,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    ///
    /// Labels are pip counts and start at 1.
    pub fn new(data: Vec<u8>, width: usize, height: usize, label: u32) -> DiceMatchResult<Self> {
        Self::from_owned(OwnedImage::new(data, width, height)?, label)
    }

    /// Wraps an owned image as a template.
    pub fn from_owned(img: OwnedImage, label: u32) -> DiceMatchResult<Self> {
        if label == 0 {
            return Err(DiceMatchError::InvalidLabel { label });
        }
        Ok(Self { img, label })
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the pip count this template stands for.
    pub fn label(&self) -> u32 {
        self.label
    }

    /// Returns the full-resolution template width.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the full-resolution template height.
    pub fn height(&self) -> usize {
        self.img.height()
    }
}
