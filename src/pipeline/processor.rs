//! Image transformation contract.

use crate::pipeline::format::ImageFormat;

/// An image held fully in memory between load and save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl Image {
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self { bytes, format }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A stateless transformation step.
pub trait ImageProcessor: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &'static str;

    fn process(&self, image: Image) -> Image;
}
