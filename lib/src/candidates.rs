use crate::mser::{MserDetector, MserParams};
use crate::{Error, Params};
use image::{GrayImage, Luma};
use imageproc::edges::canny;
use log::debug;

/// The masks that make up the edge-confirmed text candidates.
#[derive(Debug, Clone)]
pub struct CandidateMasks {
    /// Pixels covered by a maximally stable extremal region
    pub stable_regions: GrayImage,
    /// Canny edge pixels
    pub edges: GrayImage,
    /// Edge pixels that are also part of a stable region
    pub candidates: GrayImage,
}

/// Build the stable region mask, the edge mask and their intersection for `grey`.
pub fn build_candidates(grey: &GrayImage, params: &Params) -> Result<CandidateMasks, Error> {
    let detector = MserDetector::new(MserParams::with_area(
        params.min_mser_area,
        params.max_mser_area,
    ));
    let stable_regions = detector.mask(grey);
    let edges = canny(grey, params.canny_low, params.canny_high);
    let candidates = intersect(&edges, &stable_regions)?;
    debug!(
        "{} stable region pixels, {} edge pixels, {} candidates",
        count_set(&stable_regions),
        count_set(&edges),
        count_set(&candidates)
    );
    Ok(CandidateMasks {
        stable_regions,
        edges,
        candidates,
    })
}

fn check_dimensions(a: &GrayImage, b: &GrayImage) -> Result<(), Error> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: a.dimensions(),
            actual: b.dimensions(),
        });
    }
    Ok(())
}

/// Pixelwise AND of two binary masks, the result is 0 / 255.
pub fn intersect(a: &GrayImage, b: &GrayImage) -> Result<GrayImage, Error> {
    check_dimensions(a, b)?;
    let mut out = GrayImage::new(a.width(), a.height());
    for ((o, p), q) in out.pixels_mut().zip(a.pixels()).zip(b.pixels()) {
        if p[0] != 0 && q[0] != 0 {
            *o = Luma([255]);
        }
    }
    Ok(out)
}

/// Number of non-zero pixels in a mask
pub fn count_set(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}
