use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The image has zero width or height
    #[error("Image is empty")]
    EmptyImage,
    #[error("Unsupported channel count {0}, expected 1 or 3")]
    UnsupportedChannels(u8),
    #[error("Buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    /// Two images that must have the same size do not
    #[error("Image dimensions {actual:?} do not match {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// The labelling found more connected components than allowed
    #[error("Found {found} connected components, at most {max} allowed")]
    TooManyComponents { found: usize, max: usize },
    /// Error decoding or encoding an image
    #[error("Image could not be processed")]
    Image(#[from] image::ImageError),
    #[error("Image {path} could not be decoded")]
    ImageFile {
        path: String,
        source: image::ImageError,
    },
    #[error("Output could not be written")]
    Io(#[from] io::Error),
}
