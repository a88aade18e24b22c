use crate::{Error, Params};
use image::math::Rect;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use log::debug;

/// The consolidated text region of a filtered stroke mask.
#[derive(Debug, Clone)]
pub struct Region {
    /// The mask after closing and opening
    pub blobs: GrayImage,
    /// Bounding rectangle of `blobs` before the margin is added, `None` if `blobs` is empty
    pub tight: Option<Rect>,
    /// Bounding rectangle with margin, clamped to the image
    pub rect: Rect,
    /// The stroke mask restricted to `rect`
    pub mask: GrayImage,
}

/// Smallest rectangle containing all non-zero pixels of `mask`.
pub fn bounding_rect(mask: &GrayImage) -> Option<Rect> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| Rect {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    })
}

/// Grow `rect` by `margin` on all sides and clamp it to a `width` x `height` image.
pub fn expand(rect: Rect, margin: u32, width: u32, height: u32) -> Rect {
    let x0 = rect.x.saturating_sub(margin).min(width);
    let y0 = rect.y.saturating_sub(margin).min(height);
    let x1 = rect.x.saturating_add(rect.width).saturating_add(margin).min(width);
    let y1 = rect.y.saturating_add(rect.height).saturating_add(margin).min(height);
    Rect {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    }
}

/// Copy of `mask` with every pixel outside `rect` cleared.
pub fn restrict(mask: &GrayImage, rect: Rect) -> GrayImage {
    let mut out = GrayImage::new(mask.width(), mask.height());
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            if mask.get_pixel(x, y)[0] != 0 {
                out.put_pixel(x, y, Luma([255]));
            }
        }
    }
    out
}

fn kernel_radius(size: u32) -> Result<u8, Error> {
    let radius = size / 2;
    if radius > u8::MAX as u32 {
        return Err(Error::InvalidParameter {
            name: "kernel",
            reason: format!("kernel size {} too large", size),
        });
    }
    Ok(radius as u8)
}

/// Merge the stroke blobs of `mask` into solid regions and find the rectangle enclosing them.
///
/// The mask is closed, then opened, with disk shaped kernels. The bounding rectangle of the
/// result is expanded by the margin and clamped to the image. Without any remaining pixel the
/// rectangle is the whole image.
pub fn consolidate(mask: &GrayImage, params: &Params) -> Result<Region, Error> {
    let (width, height) = mask.dimensions();
    let closed = close(mask, Norm::L2, kernel_radius(params.close_kernel)?);
    let blobs = open(&closed, Norm::L2, kernel_radius(params.open_kernel)?);

    let tight = bounding_rect(&blobs);
    let rect = match tight {
        Some(r) => expand(r, params.margin, width, height),
        None => Rect {
            x: 0,
            y: 0,
            width,
            height,
        },
    };
    debug!("text region {:?} (tight {:?})", rect, tight);
    let mask = match tight {
        Some(_) => restrict(mask, rect),
        None => GrayImage::new(width, height),
    };
    Ok(Region {
        blobs,
        tight,
        rect,
        mask,
    })
}
