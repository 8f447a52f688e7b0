//! Video frames handed from the frame source to the extractor and encoder.

use crate::{Error, Result};
use image::RgbImage;
use std::sync::Arc;

/// One RGB8 video frame.
///
/// Pixel data is shared, so cloning a frame is cheap; the calibrator keeps a
/// clone alongside its best sample.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbImage>,
}

impl Frame {
    /// Wrap an existing image
    #[must_use]
    pub fn new(image: RgbImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Build a frame from tightly packed RGB8 bytes
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::InvalidInput(format!(
                "Invalid frame data size: {} (expected {expected})",
                data.len()
            )));
        }
        RgbImage::from_raw(width, height, data)
            .map(Self::new)
            .ok_or_else(|| Error::InvalidInput("Frame buffer rejected".to_string()))
    }

    /// Frame filled with a single colour
    #[must_use]
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, image::Rgb(rgb)))
    }

    /// Frame width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the frame carries usable pixel data
    #[must_use]
    pub fn has_pixels(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Underlying image
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}
