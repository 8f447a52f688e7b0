//! JPEG image encoder for captured frames.

use crate::collaborators::ImageEncoder;
use crate::constants::DEFAULT_JPEG_QUALITY;
use crate::frame::Frame;
use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use std::sync::Arc;

/// Encoded image bytes with their media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoded bytes, shared between clones
    pub bytes: Arc<[u8]>,
    /// Media type, e.g. `image/jpeg`
    pub mime: &'static str,
    /// Source width in pixels
    pub width: u32,
    /// Source height in pixels
    pub height: u32,
}

impl EncodedImage {
    /// Encoded size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes were produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encodes frames as baseline JPEG
#[derive(Debug, Clone)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Create an encoder with the given quality (1-100)
    pub fn new(quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidInput(format!(
                "JPEG quality must be between 1 and 100, got {quality}"
            )));
        }
        Ok(Self { quality })
    }

    /// Quality in use
    #[must_use]
    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageEncoder for JpegEncoder {
    type Artifact = EncodedImage;

    fn encode(&mut self, frame: &Frame) -> Result<EncodedImage> {
        if !frame.has_pixels() {
            return Err(Error::Encoder("frame has no pixel data".to_string()));
        }

        let mut bytes = Vec::new();
        ImageJpegEncoder::new_with_quality(&mut bytes, self.quality).encode_image(frame.image())?;

        Ok(EncodedImage {
            bytes: bytes.into(),
            mime: "image/jpeg",
            width: frame.width(),
            height: frame.height(),
        })
    }
}
