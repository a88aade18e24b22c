//! A library that finds the text in an image, for cropping before OCR
//!
//! The detector follows the edge-enhanced MSER approach: Canny edges that border a maximally
//! stable extremal region are taken as stroke candidates, grown along the gradient, and filtered
//! twice, first on shape and then on the uniformity of their stroke width. What survives is
//! returned as a binary mask, together with one rectangle enclosing all of it.
//!
//! # Basic usage
//! ```no_run
//! # use text_regions::{TextDetector, Error};
//! let detector = TextDetector::default();
//! let detection = detector.detect_from_file("tests/sign.png")?;
//! println!("Text region: {:?}", detection.rect);
//! # Ok::<(), Error>(())
//! ```
//!
//! The parameters can be tuned, and all intermediate images are available for inspection:
//! ```
//! # use text_regions::{Params, TextDetector, Error};
//! # use image::{DynamicImage, GrayImage, Luma};
//! let params = Params {
//!     max_component_area: 900,
//!     ..Params::default()
//! };
//! let detector = TextDetector::new(params)?;
//! let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([255])));
//! let stages = detector.detect_stages(&image)?;
//! assert!(stages.detection.is_empty());
//! assert_eq!(stages.detection.rect.width, 64);
//! # Ok::<(), Error>(())
//! ```

mod candidates;
mod components;
mod consolidate;
mod detector;
mod direction;
mod error;
mod filter;
mod grow;
mod mser;
mod params;
mod preprocess;
mod stroke;
mod utils;

pub use candidates::{build_candidates, count_set, intersect, CandidateMasks};
pub use components::{label, ComponentProperty, Components, LabelMap};
pub use consolidate::{bounding_rect, consolidate, expand, Region};
pub use detector::{Detection, Stages, TextDetector};
pub use direction::{Direction, NeighborSet};
pub use error::Error;
pub use filter::{first_pass, is_text_shape, second_pass, stddev_mean_ratio, FilterOutcome};
pub use grow::grow_edges;
pub use mser::{MserDetector, MserParams, Polarity, StableRegion};
pub use params::Params;
pub use preprocess::{grey_from_raw, to_grey};
pub use stroke::{distance_map, stroke_width_transform, StrokeImage};
pub use utils::{crop, save_stages, stroke_to_grey};
