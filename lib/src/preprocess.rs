use crate::Error;
use image::{DynamicImage, GrayImage, RgbImage};

/// Convert `image` to a single channel intensity image of the same size.
/// # Errors
/// `Error::EmptyImage` if the image has no pixels.
pub fn to_grey(image: &DynamicImage) -> Result<GrayImage, Error> {
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::EmptyImage);
    }
    Ok(image.to_luma8())
}

/// Build an intensity image from a raw interleaved 8 bit buffer with 1 or 3 (RGB) channels.
/// # Errors
/// * The image is empty
/// * `channels` is not 1 or 3
/// * `data` does not hold exactly `width * height * channels` samples
pub fn grey_from_raw(width: u32, height: u32, channels: u8, data: &[u8]) -> Result<GrayImage, Error> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }
    if channels != 1 && channels != 3 {
        return Err(Error::UnsupportedChannels(channels));
    }
    let expected = width as usize * height as usize * channels as usize;
    if data.len() != expected {
        return Err(Error::BufferSize {
            expected,
            actual: data.len(),
        });
    }
    let buf = data.to_vec();
    let image = if channels == 1 {
        GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8)
    } else {
        RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
    };
    // from_raw only fails on a short buffer, which was checked above
    let image = image.ok_or(Error::BufferSize {
        expected,
        actual: data.len(),
    })?;
    to_grey(&image)
}
