use crate::direction::Direction;
use crate::Error;
use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Quantized direction of a Sobel gradient, `None` where the gradient vanishes.
fn gradient_direction(gx: i16, gy: i16) -> Option<Direction> {
    if gx == 0 && gy == 0 {
        return None;
    }
    let mut angle = (gy as f32).atan2(gx as f32).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    if angle >= 360.0 {
        angle = 0.0;
    }
    Some(Direction::from_angle(angle))
}

/// Grow every set pixel of `edges` by one step along the local gradient direction of `grey`.
///
/// The result holds all pixels of `edges` plus, for each of them, the neighbor in the quantized
/// gradient direction. Pixels on the image border are not grown.
/// # Errors
/// `Error::DimensionMismatch` if `edges` and `grey` differ in size.
pub fn grow_edges(grey: &GrayImage, edges: &GrayImage) -> Result<GrayImage, Error> {
    if grey.dimensions() != edges.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: grey.dimensions(),
            actual: edges.dimensions(),
        });
    }
    let (width, height) = grey.dimensions();
    let mut grown = edges.clone();
    if width < 3 || height < 3 {
        return Ok(grown);
    }
    let grad_x = horizontal_sobel(grey);
    let grad_y = vertical_sobel(grey);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if edges.get_pixel(x, y)[0] == 0 {
                continue;
            }
            let gx = grad_x.get_pixel(x, y)[0];
            let gy = grad_y.get_pixel(x, y)[0];
            if let Some(direction) = gradient_direction(gx, gy) {
                let (dx, dy) = direction.offset();
                let (nx, ny) = ((x as i32 + dx) as u32, (y as i32 + dy) as u32);
                grown.put_pixel(nx, ny, Luma([255]));
            }
        }
    }
    Ok(grown)
}
