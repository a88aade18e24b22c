//! Connected component labelling and the shape properties of each component.
use crate::Error;
use image::math::Rect;
use image::{GenericImageView, GrayImage, ImageBuffer, Luma, Primitive};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use imageproc::region_labelling::{connected_components, Connectivity};
use log::trace;

/// Each pixel holds the label of its component, 0 is background.
pub type LabelMap = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Shape statistics of one connected component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentProperty {
    pub label: u32,
    /// Number of pixels
    pub area: u32,
    /// Eccentricity of the ellipse with the same second moments, 0 for a disk, towards 1 for a line
    pub eccentricity: f64,
    /// Area divided by the area of the convex hull
    pub solidity: f64,
    pub bounds: Rect,
    /// `(x, y)` mean pixel position
    pub centroid: (f64, f64),
}

/// A label map with the properties of all its components, ordered by label.
#[derive(Debug, Clone)]
pub struct Components {
    pub labels: LabelMap,
    pub properties: Vec<ComponentProperty>,
}

impl Components {
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Per label running sums, collected in one raster scan.
#[derive(Default)]
struct Accumulator {
    area: u32,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    /// Leftmost and rightmost pixel of each row: `(y, min_x, max_x)`
    rows: Vec<(u32, u32, u32)>,
}

impl Accumulator {
    fn add(&mut self, x: u32, y: u32) {
        if self.area == 0 {
            self.min_x = x;
            self.max_x = x;
            self.min_y = y;
            self.max_y = y;
        }
        self.area += 1;
        let (fx, fy) = (x as f64, y as f64);
        self.sum_x += fx;
        self.sum_y += fy;
        self.sum_xx += fx * fx;
        self.sum_yy += fy * fy;
        self.sum_xy += fx * fy;
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        match self.rows.last_mut() {
            Some(row) if row.0 == y => {
                row.1 = row.1.min(x);
                row.2 = row.2.max(x);
            }
            _ => self.rows.push((y, x, x)),
        }
    }

    fn eccentricity(&self) -> f64 {
        let n = self.area as f64;
        let (cx, cy) = (self.sum_x / n, self.sum_y / n);
        // second central moments of unit pixels, 1/12 is the moment of a pixel around its center
        let uxx = self.sum_xx / n - cx * cx + 1.0 / 12.0;
        let uyy = self.sum_yy / n - cy * cy + 1.0 / 12.0;
        let uxy = self.sum_xy / n - cx * cy;
        let common = ((uxx - uyy).powi(2) + 4.0 * uxy * uxy).sqrt();
        let major = (uxx + uyy + common) / 2.0;
        let minor = ((uxx + uyy - common) / 2.0).max(0.0);
        if major <= 0.0 {
            return 0.0;
        }
        (1.0 - minor / major).max(0.0).sqrt()
    }

    fn solidity(&self) -> f64 {
        // the hull of the pixel squares, not of the pixel centers
        let mut corners = Vec::with_capacity(self.rows.len() * 4);
        for &(y, x0, x1) in &self.rows {
            let (y, x0, x1) = (y as i64, x0 as i64, x1 as i64 + 1);
            corners.push(Point::new(x0, y));
            corners.push(Point::new(x0, y + 1));
            corners.push(Point::new(x1, y));
            corners.push(Point::new(x1, y + 1));
        }
        corners.sort_unstable_by_key(|p| (p.y, p.x));
        corners.dedup();
        let hull = convex_hull(&corners[..]);
        let hull_area = polygon_area(&hull);
        if hull_area <= 0.0 {
            return 1.0;
        }
        (self.area as f64 / hull_area).min(1.0)
    }

    fn property(&self, label: u32) -> ComponentProperty {
        let n = self.area as f64;
        ComponentProperty {
            label,
            area: self.area,
            eccentricity: self.eccentricity(),
            solidity: self.solidity(),
            bounds: Rect {
                x: self.min_x,
                y: self.min_y,
                width: self.max_x - self.min_x + 1,
                height: self.max_y - self.min_y + 1,
            },
            centroid: (self.sum_x / n, self.sum_y / n),
        }
    }
}

/// Shoelace area of a closed polygon
fn polygon_area(points: &[Point<i64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x * q.y - q.x * p.y;
    }
    (twice.abs() as f64) / 2.0
}

/// Set every non-zero pixel of `image` to 255.
fn binarize<I, T>(image: &I) -> GrayImage
where
    I: GenericImageView<Pixel = Luma<T>>,
    T: Primitive,
{
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if image.get_pixel(x, y)[0] == T::zero() {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Label the 8-connected components of all non-zero pixels of `image` and compute their
/// shape properties.
///
/// Neighboring non-zero pixels belong to the same component whatever their values.
/// # Errors
/// `Error::TooManyComponents` when more than `max_count` components are found.
pub fn label<I, T>(image: &I, max_count: usize) -> Result<Components, Error>
where
    I: GenericImageView<Pixel = Luma<T>>,
    T: Primitive,
{
    // imageproc only joins neighbors of equal value
    let foreground = binarize(image);
    let labels = connected_components(&foreground, Connectivity::Eight, Luma([0u8]));
    let max_label = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;

    let mut acc: Vec<Accumulator> = Vec::new();
    acc.resize_with(max_label + 1, Accumulator::default);
    for (x, y, p) in labels.enumerate_pixels() {
        let l = p[0] as usize;
        if l != 0 {
            acc[l].add(x, y);
        }
    }
    let properties: Vec<ComponentProperty> = acc
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, a)| a.area > 0)
        .map(|(l, a)| a.property(l as u32))
        .collect();
    trace!("labelled {} components", properties.len());
    if properties.len() > max_count {
        return Err(Error::TooManyComponents {
            found: properties.len(),
            max: max_count,
        });
    }
    Ok(Components { labels, properties })
}
