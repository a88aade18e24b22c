use crate::components::{label, ComponentProperty, Components};
use crate::stroke::StrokeImage;
use crate::{Error, Params};
use image::{GrayImage, Luma};
use log::debug;

/// A filtered binary mask (0 / 255) and how many components were kept.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub mask: GrayImage,
    /// Number of components before filtering
    pub total: usize,
    pub retained: usize,
}

/// Whether the geometry of a component is plausible for a text stroke.
pub fn is_text_shape(prop: &ComponentProperty, params: &Params) -> bool {
    prop.area >= params.min_component_area
        && prop.area <= params.max_component_area
        && prop.eccentricity >= params.min_eccentricity
        && prop.eccentricity <= params.max_eccentricity
        && prop.solidity >= params.min_solidity
}

/// Ratio of the population standard deviation of `values` to their mean.
///
/// Returns `None` for an empty slice or a mean that is not positive.
pub fn stddev_mean_ratio(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    if mean <= 0.0 {
        return None;
    }
    let var = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    Some(var.sqrt() / mean)
}

/// Set the pixels of all components with `keep[label]` in a new mask.
fn paint(comps: &Components, keep: &[bool]) -> GrayImage {
    let mut mask = GrayImage::new(comps.labels.width(), comps.labels.height());
    for (out, l) in mask.pixels_mut().zip(comps.labels.pixels()) {
        if keep[l[0] as usize] {
            *out = Luma([255]);
        }
    }
    mask
}

fn keep_table(comps: &Components) -> Vec<bool> {
    let max_label = comps.properties.iter().map(|p| p.label).max().unwrap_or(0);
    vec![false; max_label as usize + 1]
}

/// Keep the components of `mask` whose area, eccentricity and solidity are within bounds.
/// # Errors
/// `Error::TooManyComponents` if the mask has more than `params.max_component_count` components.
pub fn first_pass(mask: &GrayImage, params: &Params) -> Result<FilterOutcome, Error> {
    let comps = label(mask, params.max_component_count)?;
    let mut keep = keep_table(&comps);
    let mut retained = 0;
    for prop in &comps.properties {
        if is_text_shape(prop, params) {
            keep[prop.label as usize] = true;
            retained += 1;
        }
    }
    debug!("first pass: kept {} of {} components", retained, comps.len());
    Ok(FilterOutcome {
        mask: paint(&comps, &keep),
        total: comps.len(),
        retained,
    })
}

/// Keep the components of the stroke width image whose stroke widths are uniform, that is
/// whose std-dev / mean ratio is at most `params.max_stddev_mean_ratio`.
/// # Errors
/// `Error::TooManyComponents` if the image has more than `params.max_component_count` components.
pub fn second_pass(strokes: &StrokeImage, params: &Params) -> Result<FilterOutcome, Error> {
    let comps = label(strokes, params.max_component_count)?;
    let mut keep = keep_table(&comps);
    let mut values: Vec<Vec<i32>> = vec![Vec::new(); keep.len()];
    for (l, s) in comps.labels.pixels().zip(strokes.pixels()) {
        if l[0] != 0 && s[0] > 0 {
            values[l[0] as usize].push(s[0]);
        }
    }
    let mut retained = 0;
    for prop in &comps.properties {
        let l = prop.label as usize;
        match stddev_mean_ratio(&values[l]) {
            Some(ratio) if ratio <= params.max_stddev_mean_ratio => {
                keep[l] = true;
                retained += 1;
            }
            _ => {}
        }
    }
    debug!("second pass: kept {} of {} components", retained, comps.len());
    Ok(FilterOutcome {
        mask: paint(&comps, &keep),
        total: comps.len(),
        retained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::count_set;
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
    use imageproc::rect::Rect;

    fn white() -> Luma<u8> {
        Luma([255])
    }

    /// A disk, a square, a thin bar and a speck
    fn shapes() -> GrayImage {
        let mut img = GrayImage::new(120, 80);
        draw_filled_circle_mut(&mut img, (20, 20), 10, white());
        draw_filled_rect_mut(&mut img, Rect::at(50, 10).of_size(15, 15), white());
        draw_filled_rect_mut(&mut img, Rect::at(10, 50).of_size(80, 3), white());
        img.put_pixel(110, 70, white());
        img
    }

    #[test]
    fn test_stddev_mean_ratio() {
        assert_eq!(stddev_mean_ratio(&[]), None);
        assert_eq!(stddev_mean_ratio(&[0, 0]), None);
        assert_eq!(stddev_mean_ratio(&[4, 4, 4]), Some(0.0));
        let r = stddev_mean_ratio(&[1, 3]).unwrap();
        assert!((r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_first_pass_bounds() {
        let img = shapes();
        let params = Params {
            min_eccentricity: 0.0,
            ..Params::default()
        };
        let out = first_pass(&img, &params).unwrap();
        assert_eq!(out.total, 4);
        // disk (~317 px) and square (225 px) pass, the bar (240 px) is too elongated, the speck too small
        assert_eq!(out.retained, 2);
        assert_eq!(out.mask.get_pixel(20, 20)[0], 255);
        assert_eq!(out.mask.get_pixel(55, 15)[0], 255);
        assert_eq!(out.mask.get_pixel(40, 51)[0], 0);
        assert_eq!(out.mask.get_pixel(110, 70)[0], 0);
    }

    #[test]
    fn test_round_shapes_rejected_by_default_eccentricity() {
        let img = shapes();
        let out = first_pass(&img, &Params::default()).unwrap();
        assert_eq!(out.retained, 0);
        assert_eq!(count_set(&out.mask), 0);
    }

    #[test]
    fn test_diagonal_line_area_bound() {
        // a 5 px wide diagonal band of about 200 px length, 705 px in total
        let mut img = GrayImage::new(200, 200);
        for offset in 0..5 {
            let o = offset as f32;
            draw_line_segment_mut(&mut img, (10.0 + o, 10.0), (150.0 + o, 150.0), white());
        }
        let loose = Params {
            max_component_area: 1000,
            max_eccentricity: 1.0,
            min_solidity: 0.0,
            ..Params::default()
        };
        assert_eq!(first_pass(&img, &loose).unwrap().retained, 1);
        let bounded = Params {
            max_component_area: 600,
            ..loose.clone()
        };
        assert_eq!(first_pass(&img, &bounded).unwrap().retained, 0);
    }

    #[test]
    fn test_thin_line_rejected_by_defaults() {
        let mut img = GrayImage::new(200, 200);
        draw_line_segment_mut(&mut img, (10.0, 10.0), (150.0, 150.0), white());
        let out = first_pass(&img, &Params::default()).unwrap();
        assert_eq!(out.total, 1);
        assert_eq!(out.retained, 0);
    }

    #[test]
    fn test_tightening_never_keeps_more() {
        let img = shapes();
        let base = Params {
            min_eccentricity: 0.0,
            max_eccentricity: 1.0,
            min_component_area: 1,
            max_component_area: 1000,
            min_solidity: 0.0,
            ..Params::default()
        };
        let mut last = first_pass(&img, &base).unwrap().retained;
        assert_eq!(last, 4);
        let tighter = [
            Params {
                min_component_area: 100,
                ..base.clone()
            },
            Params {
                min_component_area: 100,
                max_component_area: 300,
                ..base.clone()
            },
            Params {
                min_component_area: 100,
                max_component_area: 300,
                max_eccentricity: 0.9,
                ..base.clone()
            },
            Params {
                min_component_area: 100,
                max_component_area: 300,
                max_eccentricity: 0.9,
                min_solidity: 0.99,
                ..base.clone()
            },
        ];
        for params in tighter.iter() {
            let retained = first_pass(&img, params).unwrap().retained;
            assert!(retained <= last);
            last = retained;
        }
    }

    #[test]
    fn test_second_pass_uniformity() {
        let mut strokes = StrokeImage::new(40, 20);
        // uniform component
        for y in 2..8 {
            for x in 2..12 {
                strokes.put_pixel(x, y, Luma([3]));
            }
        }
        // half 1, half 9: std / mean = 4 / 5
        for y in 2..8 {
            for x in 20..30 {
                strokes.put_pixel(x, y, Luma([if x < 25 { 1 } else { 9 }]));
            }
        }
        let out = second_pass(&strokes, &Params::default()).unwrap();
        assert_eq!(out.total, 2);
        assert_eq!(out.retained, 1);
        assert_eq!(out.mask.get_pixel(5, 5)[0], 255);
        assert_eq!(out.mask.get_pixel(22, 5)[0], 0);

        let lenient = Params {
            max_stddev_mean_ratio: 0.8,
            ..Params::default()
        };
        assert_eq!(second_pass(&strokes, &lenient).unwrap().retained, 2);
    }

    #[test]
    fn test_second_pass_sees_whole_component() {
        // one connected block, left half width 1 and right half width 9
        let mut strokes = StrokeImage::new(20, 10);
        for y in 2..8 {
            for x in 2..12 {
                strokes.put_pixel(x, y, Luma([if x < 7 { 1 } else { 9 }]));
            }
        }
        let out = second_pass(&strokes, &Params::default()).unwrap();
        assert_eq!(out.total, 1);
        assert_eq!(out.retained, 0);
        assert_eq!(count_set(&out.mask), 0);
    }

    #[test]
    fn test_component_limit() {
        let mut img = GrayImage::new(20, 20);
        for i in 0..5 {
            img.put_pixel(i * 4, 10, white());
        }
        let params = Params {
            max_component_count: 3,
            ..Params::default()
        };
        assert!(matches!(
            first_pass(&img, &params),
            Err(Error::TooManyComponents { found: 5, max: 3 })
        ));
    }
}
