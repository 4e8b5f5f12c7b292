use crate::arrays::{color_distance, ImageBuffer};
use crate::common::{GraphParams, Segmentation};
use crate::connectivity::compact_labels;
use crate::disjoint::DisjointSet;
use crate::error::Error;
use crate::filter::smooth;
use multiversion::multiversion;
use rayon::prelude::*;

/// Weighted link between two pixels, identified by linear index.
#[derive(Clone, Debug)]
pub(crate) struct Edge {
    pub a: u32,
    pub b: u32,
    pub w: f32,
}

/// Grid-graph edge list over the 8-neighborhood.
///
/// Every pixel links right, down, down-right and down-left, so each
/// neighboring pair appears exactly once. Weights are the Euclidean color
/// distance between the endpoints; generation order is row-major, which the
/// stable sort later uses as the tie-break.
#[multiversion(targets = "simd")]
pub(crate) fn build_edges(image: &ImageBuffer) -> Vec<Edge> {
    let width = image.width;
    let height = image.height;
    let mut edges = Vec::with_capacity(4 * width * height);
    for y in 0..height {
        for x in 0..width {
            let index = (y * width + x) as u32;
            let pixel = image.get_pixel(x, y);
            if x + 1 < width {
                edges.push(Edge {
                    a: index,
                    b: index + 1,
                    w: color_distance(pixel, image.get_pixel(x + 1, y)),
                });
            }
            if y + 1 < height {
                edges.push(Edge {
                    a: index,
                    b: index + width as u32,
                    w: color_distance(pixel, image.get_pixel(x, y + 1)),
                });
            }
            if x + 1 < width && y + 1 < height {
                edges.push(Edge {
                    a: index,
                    b: index + width as u32 + 1,
                    w: color_distance(pixel, image.get_pixel(x + 1, y + 1)),
                });
            }
            if x > 0 && y + 1 < height {
                edges.push(Edge {
                    a: index,
                    b: index + width as u32 - 1,
                    w: color_distance(pixel, image.get_pixel(x - 1, y + 1)),
                });
            }
        }
    }
    edges
}

/// Felzenszwalb-Huttenlocher segmentation.
///
/// Merges a disjoint-set forest over the sorted edge list using the adaptive
/// per-component threshold `w + k / size`, then folds components below
/// `min_size` into an adjacent component with a second scan over the same
/// edge order. Fully deterministic: edge order is total (weight, then
/// insertion order via the stable sort).
pub fn segment(image: &ImageBuffer, params: &GraphParams) -> Result<Segmentation, Error> {
    params.validate()?;
    let smoothed;
    let input = if params.sigma > 0.0 {
        smoothed = smooth(image, params.sigma)?;
        &smoothed
    } else {
        image
    };

    let mut edges = build_edges(input);
    // Weights are finite non-negative, total_cmp orders them numerically.
    edges.par_sort_by(|x, y| x.w.total_cmp(&y.w));

    let num_pixels = image.num_pixels();
    let mut ds = DisjointSet::new(num_pixels);
    // Threshold of a singleton is k / 1; indexed by current root.
    let mut threshold = vec![params.k; num_pixels];
    for edge in &edges {
        let root_a = ds.find(edge.a);
        let root_b = ds.find(edge.b);
        if root_a == root_b {
            continue;
        }
        if edge.w <= threshold[root_a as usize].min(threshold[root_b as usize]) {
            let winner = ds.union(root_a, root_b);
            threshold[winner as usize] = edge.w + params.k / ds.size_of(winner) as f32;
        }
    }

    // Minimum-size pass: same edge order, size criterion only.
    if params.min_size > 0 {
        for edge in &edges {
            let root_a = ds.find(edge.a);
            let root_b = ds.find(edge.b);
            if root_a != root_b
                && (ds.size_of(root_a) < params.min_size || ds.size_of(root_b) < params.min_size)
            {
                ds.union(root_a, root_b);
            }
        }
    }

    compact_labels(&mut ds, image.width, image.height)
}
