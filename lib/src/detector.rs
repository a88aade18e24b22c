use crate::candidates::{build_candidates, count_set, intersect, CandidateMasks};
use crate::consolidate::consolidate;
use crate::filter::{first_pass, second_pass};
use crate::grow::grow_edges;
use crate::preprocess::{grey_from_raw, to_grey};
use crate::stroke::{distance_map, stroke_width_transform, StrokeImage};
use crate::{Error, Params};
use image::math::Rect;
use image::{DynamicImage, GrayImage};
use log::debug;

/// The result of a detection run.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Binary (0 / 255) mask of the text stroke pixels, same size as the input
    pub mask: GrayImage,
    /// Rectangle enclosing all detected text, always inside the image
    pub rect: Rect,
}

impl Detection {
    /// True if no text pixel was found
    pub fn is_empty(&self) -> bool {
        self.mask.pixels().all(|p| p[0] == 0)
    }
}

/// All intermediate images of one detection run.
#[derive(Debug, Clone)]
pub struct Stages {
    pub grey: GrayImage,
    pub stable_regions: GrayImage,
    pub edges: GrayImage,
    /// Edges inside stable regions
    pub candidates: GrayImage,
    /// Candidates grown along the gradient
    pub grown: GrayImage,
    /// Grown candidates inside stable regions
    pub enhanced: GrayImage,
    pub first_pass: GrayImage,
    pub distance: StrokeImage,
    pub stroke_width: StrokeImage,
    pub second_pass: GrayImage,
    /// Closed and opened second pass mask
    pub blobs: GrayImage,
    pub detection: Detection,
}

/// Text region detector, based on edge-enhanced maximally stable extremal regions and a
/// stroke width transform.
#[derive(Debug, Clone)]
pub struct TextDetector {
    params: Params,
}

impl Default for TextDetector {
    fn default() -> Self {
        TextDetector {
            params: Params::default(),
        }
    }
}

impl TextDetector {
    /// Create a detector.
    /// # Errors
    /// `Error::InvalidParameter` if `params` does not validate.
    pub fn new(params: Params) -> Result<TextDetector, Error> {
        params.validate()?;
        Ok(TextDetector { params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Detect the text in an image.
    ///
    /// The detection consists of these phases:
    /// 1. Convert to intensity
    /// 2. Keep the Canny edges that lie inside maximally stable extremal regions
    /// 3. Grow the edges one pixel along the gradient and intersect again with the regions
    /// 4. Drop components with a non-text shape
    /// 5. Compute the stroke width of each pixel
    /// 6. Drop components with a non-uniform stroke width
    /// 7. Merge what remains into a region and find its bounding rectangle
    ///
    /// # Errors
    /// * The image is empty
    /// * Too many connected components are found
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection, Error> {
        let grey = to_grey(image)?;
        self.detect_grey(&grey)
    }

    pub fn detect_grey(&self, grey: &GrayImage) -> Result<Detection, Error> {
        self.run(grey).map(|stages| stages.detection)
    }

    /// Detect the text in a raw interleaved buffer with 1 or 3 channels.
    pub fn detect_raw(
        &self,
        width: u32,
        height: u32,
        channels: u8,
        data: &[u8],
    ) -> Result<Detection, Error> {
        let grey = grey_from_raw(width, height, channels, data)?;
        self.detect_grey(&grey)
    }

    pub fn detect_from_file(&self, filename: &str) -> Result<Detection, Error> {
        let image = image::open(filename).map_err(|source| Error::ImageFile {
            path: filename.to_string(),
            source,
        })?;
        self.detect(&image)
    }

    pub fn detect_from_memory(&self, buffer: &[u8]) -> Result<Detection, Error> {
        let image = image::load_from_memory(buffer)?;
        self.detect(&image)
    }

    /// Like [TextDetector::detect], but also return every intermediate image.
    pub fn detect_stages(&self, image: &DynamicImage) -> Result<Stages, Error> {
        let grey = to_grey(image)?;
        self.run(&grey)
    }

    fn run(&self, grey: &GrayImage) -> Result<Stages, Error> {
        if grey.width() == 0 || grey.height() == 0 {
            return Err(Error::EmptyImage);
        }
        let params = &self.params;
        let CandidateMasks {
            stable_regions,
            edges,
            candidates,
        } = build_candidates(grey, params)?;

        let grown = grow_edges(grey, &candidates)?;
        let enhanced = intersect(&grown, &stable_regions)?;
        debug!("{} edge enhanced pixels", count_set(&enhanced));

        let first = first_pass(&enhanced, params)?;
        let distance = distance_map(&first.mask);
        let stroke_width = stroke_width_transform(&distance);
        let second = second_pass(&stroke_width, params)?;
        let region = consolidate(&second.mask, params)?;

        Ok(Stages {
            grey: grey.clone(),
            stable_regions,
            edges,
            candidates,
            grown,
            enhanced,
            first_pass: first.mask,
            distance,
            stroke_width,
            second_pass: second.mask,
            blobs: region.blobs,
            detection: Detection {
                mask: region.mask,
                rect: region.rect,
            },
        })
    }
}
