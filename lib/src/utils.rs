use crate::detector::Stages;
use crate::stroke::StrokeImage;
use crate::Error;
use image::math::Rect;
use image::{GenericImageView, GrayImage, Luma};
use std::fs;
use std::path::{Path, PathBuf};

/// Cut the detected text region out of `source`.
pub fn crop(source: &GrayImage, rect: Rect) -> GrayImage {
    // the detector clamps its rectangles, other callers may not
    let x = rect.x.min(source.width());
    let y = rect.y.min(source.height());
    let width = rect.width.min(source.width() - x);
    let height = rect.height.min(source.height() - y);
    source.view(x, y, width, height).to_image()
}

/// Scale a stroke width image to the full 8 bit range for viewing.
pub fn stroke_to_grey(strokes: &StrokeImage) -> GrayImage {
    let max = strokes.pixels().map(|p| p[0]).max().unwrap_or(0).max(1) as i64;
    GrayImage::from_fn(strokes.width(), strokes.height(), |x, y| {
        let v = strokes.get_pixel(x, y)[0].max(0) as i64;
        Luma([(v * 255 / max) as u8])
    })
}

/// Save all intermediate images of a detection as numbered PNG files in `savedir`.
///
/// Returns the paths of the written files, in pipeline order.
pub fn save_stages<P: AsRef<Path>>(savedir: P, stages: &Stages) -> Result<Vec<PathBuf>, Error> {
    fs::create_dir_all(savedir.as_ref())?;
    let distance = stroke_to_grey(&stages.distance);
    let stroke_width = stroke_to_grey(&stages.stroke_width);
    let region = crop(&stages.grey, stages.detection.rect);
    let images: [(&str, &GrayImage); 13] = [
        ("grey", &stages.grey),
        ("stable_regions", &stages.stable_regions),
        ("edges", &stages.edges),
        ("candidates", &stages.candidates),
        ("grown", &stages.grown),
        ("enhanced", &stages.enhanced),
        ("first_pass", &stages.first_pass),
        ("distance", &distance),
        ("stroke_width", &stroke_width),
        ("second_pass", &stages.second_pass),
        ("blobs", &stages.blobs),
        ("mask", &stages.detection.mask),
        ("region", &region),
    ];
    let mut paths = Vec::new();
    for (i, (name, image)) in images.iter().enumerate() {
        let mut path = PathBuf::new();
        path.push(savedir.as_ref());
        path.push(format!("{:02}_{}.png", i + 1, name));
        image.save(&path)?;
        paths.push(path);
    }
    Ok(paths)
}
