//! Stroke width estimation from the distance transform of a binary mask.
//!
//! The distance transform peaks on the center line of a stroke. Flooding those ridge values
//! outwards, from the highest level down, gives every pixel of a stroke the width of the stroke
//! it belongs to instead of its own distance to the boundary.
use crate::direction::{Direction, NeighborSet};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use log::debug;

/// Signed 32 bit image holding distances or stroke widths, 0 is background.
pub type StrokeImage = ImageBuffer<Luma<i32>, Vec<i32>>;

/// Euclidean distance from every set pixel of `mask` to the nearest background pixel, rounded.
///
/// Pixels outside the image count as background. Background pixels are 0, set pixels are at least 1.
pub fn distance_map(mask: &GrayImage) -> StrokeImage {
    let (width, height) = mask.dimensions();
    let mut background = GrayImage::from_pixel(width + 2, height + 2, Luma([255]));
    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] != 0 {
            background.put_pixel(x + 1, y + 1, Luma([0]));
        }
    }
    let squared = euclidean_squared_distance_transform(&background);
    let mut dist = StrokeImage::new(width, height);
    for (x, y, p) in dist.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] != 0 {
            let d = squared.get_pixel(x + 1, y + 1)[0].sqrt().round();
            *p = Luma([(d as i32).max(1)]);
        }
    }
    dist
}

/// A zero padded copy of an image, stored row major, so that every original pixel has 8 neighbors.
struct Padded {
    width: usize,
    data: Vec<i32>,
    /// Index offset to the neighbor in each direction
    offsets: [isize; 8],
}

impl Padded {
    fn new(image: &StrokeImage) -> Padded {
        let width = image.width() as usize + 2;
        let height = image.height() as usize + 2;
        let mut data = vec![0; width * height];
        for (x, y, p) in image.enumerate_pixels() {
            data[(y as usize + 1) * width + x as usize + 1] = p[0].max(0);
        }
        let mut offsets = [0isize; 8];
        for d in Direction::ALL.iter() {
            let (dx, dy) = d.offset();
            offsets[d.index()] = dy as isize * width as isize + dx as isize;
        }
        Padded {
            width,
            data,
            offsets,
        }
    }

    fn neighbor(&self, idx: usize, direction: Direction) -> usize {
        (idx as isize + self.offsets[direction.index()]) as usize
    }

    fn interior(&self) -> impl Iterator<Item = usize> + '_ {
        let height = self.data.len() / self.width;
        (1..height - 1).flat_map(move |y| (1..self.width - 1).map(move |x| y * self.width + x))
    }

    /// Neighbors of `idx` holding a positive value smaller than the value at `idx`.
    fn downhill(&self, idx: usize) -> NeighborSet {
        let value = self.data[idx];
        let mut set = NeighborSet::new();
        if value == 0 {
            return set;
        }
        for &d in Direction::ALL.iter() {
            let n = self.data[self.neighbor(idx, d)];
            if n != 0 && n < value {
                set.insert(d);
            }
        }
        set
    }

    fn crop(&self, width: u32, height: u32) -> StrokeImage {
        StrokeImage::from_fn(width, height, |x, y| {
            Luma([self.data[(y as usize + 1) * self.width + x as usize + 1]])
        })
    }
}

/// Propagate the ridge values of a distance image outwards along strictly decreasing paths.
///
/// Levels are processed from the maximum down to 1. Each pixel is assigned exactly once, by
/// the highest level that reaches it, so its final value is the largest distance from which it
/// can be reached downhill and never less than its own distance.
pub fn stroke_width_transform(dist: &StrokeImage) -> StrokeImage {
    let (width, height) = dist.dimensions();
    let mut padded = Padded::new(dist);

    let mut downhill = vec![NeighborSet::new(); padded.data.len()];
    let mut max_level = 0;
    for idx in padded.interior() {
        downhill[idx] = padded.downhill(idx);
        max_level = max_level.max(padded.data[idx]);
    }

    let mut levels: Vec<Vec<usize>> = vec![Vec::new(); max_level as usize + 1];
    for idx in padded.interior() {
        let value = padded.data[idx];
        if value > 0 {
            levels[value as usize].push(idx);
        }
    }

    let mut assigned = vec![false; padded.data.len()];
    let mut frontier = Vec::new();
    let mut next = Vec::new();
    for level in (1..=max_level).rev() {
        frontier.clear();
        for &idx in &levels[level as usize] {
            if !assigned[idx] {
                assigned[idx] = true;
                frontier.push(idx);
            }
        }
        while !frontier.is_empty() {
            next.clear();
            for &idx in &frontier {
                for d in downhill[idx].iter() {
                    let n = padded.neighbor(idx, d);
                    if !assigned[n] {
                        assigned[n] = true;
                        padded.data[n] = level;
                        next.push(n);
                    }
                }
            }
            std::mem::swap(&mut frontier, &mut next);
        }
    }
    debug!("stroke width transform: max level {}", max_level);
    padded.crop(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::stddev_mean_ratio;
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
    use imageproc::rect::Rect;

    fn row(values: &[i32]) -> StrokeImage {
        StrokeImage::from_fn(values.len() as u32, 1, |x, _| Luma([values[x as usize]]))
    }

    fn values(image: &StrokeImage) -> Vec<i32> {
        image.pixels().map(|p| p[0]).collect()
    }

    /// For every pixel the largest value from which it can be reached along strictly
    /// decreasing 8-connected steps.
    fn max_reachable(dist: &StrokeImage) -> Vec<i32> {
        let (w, h) = dist.dimensions();
        let mut order: Vec<(u32, u32)> = dist
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        order.sort_by_key(|&(x, y)| std::cmp::Reverse(dist.get_pixel(x, y)[0]));
        let mut best = values(dist);
        for (x, y) in order {
            let v = dist.get_pixel(x, y)[0];
            for d in Direction::ALL.iter() {
                let (dx, dy) = d.offset();
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                    continue;
                }
                if dist.get_pixel(nx as u32, ny as u32)[0] > v {
                    let up = best[(ny as u32 * w + nx as u32) as usize];
                    let i = (y * w + x) as usize;
                    best[i] = best[i].max(up);
                }
            }
        }
        best
    }

    #[test]
    fn test_distance_map() {
        let mut mask = GrayImage::new(9, 9);
        draw_filled_rect_mut(&mut mask, Rect::at(2, 2).of_size(5, 5), Luma([255]));
        let dist = distance_map(&mask);
        assert_eq!(dist.get_pixel(0, 0)[0], 0);
        assert_eq!(dist.get_pixel(2, 2)[0], 1);
        assert_eq!(dist.get_pixel(3, 3)[0], 2);
        assert_eq!(dist.get_pixel(4, 4)[0], 3);
    }

    #[test]
    fn test_image_border_is_background() {
        let mask = GrayImage::from_pixel(5, 5, Luma([255]));
        let dist = distance_map(&mask);
        assert_eq!(dist.get_pixel(0, 2)[0], 1);
        assert_eq!(dist.get_pixel(2, 2)[0], 3);
    }

    #[test]
    fn test_ridge_floods_outwards() {
        let out = stroke_width_transform(&row(&[1, 2, 3, 2, 1]));
        assert_eq!(values(&out), vec![3, 3, 3, 3, 3]);
    }

    #[test]
    fn test_higher_ridge_wins() {
        let dist = row(&[1, 2, 3, 2, 1, 2, 5, 2, 1, 0, 4]);
        let out = stroke_width_transform(&dist);
        assert_eq!(values(&out), vec![3, 3, 3, 3, 5, 5, 5, 5, 5, 0, 4]);
    }

    #[test]
    fn test_plateau_is_not_crossed() {
        let out = stroke_width_transform(&row(&[1, 2, 2, 1]));
        assert_eq!(values(&out), vec![2, 2, 2, 2]);
        let out = stroke_width_transform(&row(&[1, 3, 3, 2]));
        assert_eq!(values(&out), vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_matches_max_reachable_and_never_decreases() {
        let mut mask = GrayImage::new(60, 40);
        draw_filled_circle_mut(&mut mask, (15, 15), 10, Luma([255]));
        draw_filled_rect_mut(&mut mask, Rect::at(30, 5).of_size(6, 30), Luma([255]));
        draw_filled_rect_mut(&mut mask, Rect::at(36, 18).of_size(20, 3), Luma([255]));
        let dist = distance_map(&mask);
        let out = stroke_width_transform(&dist);
        assert_eq!(out.dimensions(), dist.dimensions());
        for (a, b) in dist.pixels().zip(out.pixels()) {
            assert!(b[0] >= a[0]);
            assert_eq!(a[0] == 0, b[0] == 0);
        }
        assert_eq!(values(&out), max_reachable(&dist));
    }

    #[test]
    fn test_disk_has_uniform_width() {
        let mut mask = GrayImage::new(40, 40);
        draw_filled_circle_mut(&mut mask, (20, 20), 10, Luma([255]));
        let out = stroke_width_transform(&distance_map(&mask));
        let widths: Vec<i32> = out.pixels().map(|p| p[0]).filter(|&v| v > 0).collect();
        let mean = widths.iter().sum::<i32>() as f64 / widths.len() as f64;
        assert!(mean >= 8.5 && mean <= 12.0, "mean {}", mean);
        assert!(stddev_mean_ratio(&widths).unwrap() < 0.25);
    }

    #[test]
    fn test_empty() {
        let dist = StrokeImage::new(7, 3);
        assert_eq!(stroke_width_transform(&dist), dist);
    }
}
