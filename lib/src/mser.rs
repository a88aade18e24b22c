//! Maximally stable extremal regions.
//!
//! The regions are found on a component tree that is built by adding the pixels in order of
//! intensity and merging 4-connected neighbors with a union-find structure. Every gray level at
//! which a component changes yields a tree node. A node is stable when its area grows little
//! between its own level and `level + delta`.
use image::{GrayImage, Luma};
use log::debug;

const NONE: usize = usize::MAX;

/// Parameters of the stable region detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MserParams {
    /// Gray level step used to measure the growth of a region
    pub delta: u8,
    pub min_area: u32,
    pub max_area: u32,
    /// Regions with a larger relative growth over `delta` levels are not stable
    pub max_variation: f64,
    /// A region too similar in area to a larger stable region that contains it is dropped
    pub min_diversity: f64,
}

impl Default for MserParams {
    fn default() -> Self {
        MserParams {
            delta: 8,
            min_area: 10,
            max_area: 2000,
            max_variation: 0.25,
            min_diversity: 0.1,
        }
    }
}

impl MserParams {
    /// The default stability parameters with the given area bounds.
    pub fn with_area(min_area: u32, max_area: u32) -> Self {
        MserParams {
            min_area,
            max_area,
            ..MserParams::default()
        }
    }
}

/// Whether a region is darker or lighter than its surroundings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    DarkOnLight,
    LightOnDark,
}

/// A stable region and its member pixels
#[derive(Debug, Clone)]
pub struct StableRegion {
    pub polarity: Polarity,
    /// The threshold (original intensity) at which the region was taken
    pub level: u8,
    pub variation: f64,
    /// `(x, y)` coordinates of all member pixels
    pub pixels: Vec<(u32, u32)>,
}

impl StableRegion {
    pub fn area(&self) -> usize {
        self.pixels.len()
    }
}

#[derive(Debug, Clone)]
struct Node {
    level: u8,
    area: u32,
    parent: Option<usize>,
}

struct ComponentTree {
    width: usize,
    polarity: Polarity,
    /// Nodes in creation order; a parent always has a larger index than its children
    nodes: Vec<Node>,
    /// The node each pixel joined the tree with
    birth: Vec<usize>,
}

fn find(parent: &mut [usize], mut p: usize) -> usize {
    let mut root = p;
    while parent[root] != root {
        root = parent[root];
    }
    while parent[p] != root {
        let next = parent[p];
        parent[p] = root;
        p = next;
    }
    root
}

impl ComponentTree {
    fn build(grey: &GrayImage, polarity: Polarity) -> ComponentTree {
        let (width, height) = (grey.width() as usize, grey.height() as usize);
        let n = width * height;

        let mut levels: Vec<Vec<usize>> = vec![Vec::new(); 256];
        for (i, &v) in grey.as_raw().iter().enumerate() {
            let level = match polarity {
                Polarity::DarkOnLight => v,
                Polarity::LightOnDark => 255 - v,
            };
            levels[level as usize].push(i);
        }

        let mut parent = vec![NONE; n];
        let mut size = vec![0u32; n];
        let mut root_node = vec![NONE; n];
        let mut birth = vec![NONE; n];
        let mut nodes: Vec<Node> = Vec::new();
        // nodes of components that changed at the current level, with a pixel of that component
        let mut superseded: Vec<(usize, usize)> = Vec::new();

        for (level, pixels) in levels.iter().enumerate() {
            for &p in pixels {
                parent[p] = p;
                size[p] = 1;
                let (x, y) = (p % width, p / width);
                let neighbors = [
                    if x > 0 { Some(p - 1) } else { None },
                    if x + 1 < width { Some(p + 1) } else { None },
                    if y > 0 { Some(p - width) } else { None },
                    if y + 1 < height { Some(p + width) } else { None },
                ];
                for &q in neighbors.iter().flatten() {
                    if parent[q] == NONE {
                        continue;
                    }
                    let rp = find(&mut parent, p);
                    let rq = find(&mut parent, q);
                    if rp == rq {
                        continue;
                    }
                    for &r in &[rp, rq] {
                        if root_node[r] != NONE {
                            superseded.push((root_node[r], r));
                            root_node[r] = NONE;
                        }
                    }
                    let (big, small) = if size[rp] >= size[rq] { (rp, rq) } else { (rq, rp) };
                    parent[small] = big;
                    size[big] += size[small];
                }
            }
            for &p in pixels {
                let r = find(&mut parent, p);
                if root_node[r] == NONE {
                    root_node[r] = nodes.len();
                    nodes.push(Node {
                        level: level as u8,
                        area: size[r],
                        parent: None,
                    });
                }
                birth[p] = root_node[r];
            }
            for (node, r) in superseded.drain(..) {
                let root = find(&mut parent, r);
                nodes[node].parent = Some(root_node[root]);
            }
        }
        ComponentTree {
            width,
            polarity,
            nodes,
            birth,
        }
    }

    /// Relative area growth of each node between its level and `level + delta`.
    fn variations(&self, delta: u8) -> Vec<f64> {
        self.nodes
            .iter()
            .map(|node| {
                let limit = node.level as u32 + delta as u32;
                let mut top = node;
                while let Some(p) = top.parent {
                    let parent = &self.nodes[p];
                    if parent.level as u32 > limit {
                        break;
                    }
                    top = parent;
                }
                (top.area - node.area) as f64 / node.area as f64
            })
            .collect()
    }

    /// Mark the nodes that are maximally stable and pass the area, variation and diversity tests.
    fn select(&self, params: &MserParams) -> (Vec<bool>, Vec<f64>) {
        let variation = self.variations(params.delta);
        let mut min_child = vec![f64::INFINITY; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(p) = node.parent {
                min_child[p] = min_child[p].min(variation[i]);
            }
        }

        let candidate: Vec<bool> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let var = variation[i];
                // the root spans the whole image and has no boundary to be stable at
                let below_parent = match node.parent {
                    Some(p) => var <= variation[p],
                    None => false,
                };
                node.area >= params.min_area
                    && node.area <= params.max_area
                    && var <= params.max_variation
                    && var <= min_child[i]
                    && below_parent
            })
            .collect();

        let mut selected = candidate.clone();
        for (i, node) in self.nodes.iter().enumerate() {
            if !candidate[i] {
                continue;
            }
            let mut ancestor = node.parent;
            while let Some(a) = ancestor {
                let outer = &self.nodes[a];
                if outer.area > params.max_area {
                    break;
                }
                if candidate[a] {
                    let growth = (outer.area - node.area) as f64 / outer.area as f64;
                    if growth < params.min_diversity {
                        selected[i] = false;
                    }
                    break;
                }
                ancestor = outer.parent;
            }
        }
        (selected, variation)
    }

    fn regions(&self, params: &MserParams) -> Vec<StableRegion> {
        let (selected, variation) = self.select(params);
        let mut index = vec![NONE; self.nodes.len()];
        let mut regions = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if selected[i] {
                index[i] = regions.len();
                let level = match self.polarity {
                    Polarity::DarkOnLight => node.level,
                    Polarity::LightOnDark => 255 - node.level,
                };
                regions.push(StableRegion {
                    polarity: self.polarity,
                    level,
                    variation: variation[i],
                    pixels: Vec::with_capacity(node.area as usize),
                });
            }
        }
        for (p, &born) in self.birth.iter().enumerate() {
            let coord = ((p % self.width) as u32, (p / self.width) as u32);
            let mut node = Some(born);
            while let Some(n) = node {
                if self.nodes[n].area > params.max_area {
                    break;
                }
                if selected[n] {
                    regions[index[n]].pixels.push(coord);
                }
                node = self.nodes[n].parent;
            }
        }
        regions
    }

    /// Set every pixel that belongs to at least one selected region.
    fn paint(&self, params: &MserParams, mask: &mut GrayImage) {
        let (selected, _) = self.select(params);
        let mut covered = vec![false; self.nodes.len()];
        for i in (0..self.nodes.len()).rev() {
            covered[i] = selected[i] || self.nodes[i].parent.map_or(false, |p| covered[p]);
        }
        for (pixel, &born) in mask.pixels_mut().zip(self.birth.iter()) {
            if covered[born] {
                *pixel = Luma([255]);
            }
        }
    }
}

/// Detector for maximally stable extremal regions of both polarities.
pub struct MserDetector {
    params: MserParams,
}

impl MserDetector {
    pub fn new(params: MserParams) -> MserDetector {
        MserDetector { params }
    }

    pub fn params(&self) -> &MserParams {
        &self.params
    }

    /// Find the stable regions of `grey`, dark regions first, then light regions.
    pub fn detect(&self, grey: &GrayImage) -> Vec<StableRegion> {
        if grey.width() == 0 || grey.height() == 0 {
            return Vec::new();
        }
        let mut regions = Vec::new();
        for &polarity in &[Polarity::DarkOnLight, Polarity::LightOnDark] {
            let tree = ComponentTree::build(grey, polarity);
            let found = tree.regions(&self.params);
            debug!(
                "{:?}: {} tree nodes, {} stable regions",
                polarity,
                tree.nodes.len(),
                found.len()
            );
            regions.extend(found);
        }
        regions
    }

    /// Binary mask (0 / 255) of all pixels covered by a stable region.
    ///
    /// Equivalent to painting the pixels of [MserDetector::detect], without collecting them.
    pub fn mask(&self, grey: &GrayImage) -> GrayImage {
        let mut mask = GrayImage::new(grey.width(), grey.height());
        if grey.width() == 0 || grey.height() == 0 {
            return mask;
        }
        for &polarity in &[Polarity::DarkOnLight, Polarity::LightOnDark] {
            ComponentTree::build(grey, polarity).paint(&self.params, &mut mask);
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
    use imageproc::rect::Rect;

    fn blob_image() -> GrayImage {
        let mut img = GrayImage::from_pixel(60, 40, Luma([220]));
        draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(10, 12), Luma([30]));
        draw_filled_circle_mut(&mut img, (40, 20), 6, Luma([250]));
        img
    }

    #[test]
    fn test_tree_root_covers_image() {
        let img = blob_image();
        let tree = ComponentTree::build(&img, Polarity::DarkOnLight);
        let roots: Vec<_> = tree.nodes.iter().filter(|n| n.parent.is_none()).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].area, 60 * 40);
        for (i, node) in tree.nodes.iter().enumerate() {
            if let Some(p) = node.parent {
                assert!(p > i);
                assert!(tree.nodes[p].level > node.level);
                assert!(tree.nodes[p].area > node.area);
            }
        }
    }

    #[test]
    fn test_dark_and_light_blobs() {
        let img = blob_image();
        let detector = MserDetector::new(MserParams::default());
        let regions = detector.detect(&img);

        let dark = regions
            .iter()
            .find(|r| r.polarity == Polarity::DarkOnLight)
            .expect("dark region");
        assert_eq!(dark.area(), 120);
        assert!(dark.pixels.contains(&(5, 5)));
        assert!(dark.pixels.contains(&(14, 16)));

        let light = regions
            .iter()
            .find(|r| r.polarity == Polarity::LightOnDark)
            .expect("light region");
        assert!(light.pixels.contains(&(40, 20)));
        assert!(!light.pixels.contains(&(5, 5)));
    }

    #[test]
    fn test_mask_matches_regions() {
        let img = blob_image();
        let detector = MserDetector::new(MserParams::default());
        let mask = detector.mask(&img);
        let mut painted = GrayImage::new(img.width(), img.height());
        for region in detector.detect(&img) {
            for &(x, y) in &region.pixels {
                painted.put_pixel(x, y, Luma([255]));
            }
        }
        assert_eq!(mask, painted);
        assert_eq!(mask.get_pixel(10, 10)[0], 255);
        assert_eq!(mask.get_pixel(30, 35)[0], 0);
    }

    #[test]
    fn test_area_bounds() {
        let img = blob_image();
        let detector = MserDetector::new(MserParams::with_area(10, 50));
        let regions = detector.detect(&img);
        assert!(regions.iter().all(|r| r.area() >= 10 && r.area() <= 50));
    }

    #[test]
    fn test_flat_image_has_no_regions() {
        let img = GrayImage::from_pixel(20, 20, Luma([128]));
        let detector = MserDetector::new(MserParams::default());
        assert!(detector.detect(&img).is_empty());
        assert!(detector.mask(&img).pixels().all(|p| p[0] == 0));
    }
}
