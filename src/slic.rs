use crate::arrays::{Array2D, ImageBuffer};
use crate::common::{Segmentation, SlicParams};
use crate::connectivity::relabel_components;
use crate::error::Error;
use multiversion::multiversion;

/// SLIC cluster center in continuous (x, y, color) coordinates.
///
/// `x`, `y`, `color` and `num_members` are rewritten by every update step; a
/// center that attracted no pixels keeps its previous values.
#[derive(Clone, Debug)]
pub(crate) struct Cluster {
    pub x: f32,
    pub y: f32,
    /// Channel vector; entries past the image's channel count stay zero.
    pub color: [f32; 4],
    pub num_members: u32,
}

/// Color gradient magnitude (squared) at a pixel, sampled with clamped
/// coordinates. Used to nudge seeds off edges and noise.
fn gradient_sq(image: &ImageBuffer, x: usize, y: usize) -> f32 {
    let right = image.get_pixel((x + 1).min(image.width - 1), y);
    let left = image.get_pixel(x.saturating_sub(1), y);
    let down = image.get_pixel(x, (y + 1).min(image.height - 1));
    let up = image.get_pixel(x, y.saturating_sub(1));
    let mut g = 0.0f32;
    for c in 0..image.channels {
        g += (right[c] - left[c]) * (right[c] - left[c]);
        g += (down[c] - up[c]) * (down[c] - up[c]);
    }
    g
}

/// Places the initial cluster centers on a regular grid with spacing close to
/// `S = sqrt(area / num_superpixels)` and perturbs each one to the
/// lowest-gradient pixel of its 3x3 neighborhood.
pub(crate) fn initialize_clusters(image: &ImageBuffer, params: &SlicParams) -> Vec<Cluster> {
    let grid_step = (image.num_pixels() as f32 / params.num_superpixels as f32).sqrt();
    let n_x = ((image.width as f32 / grid_step).round() as usize).max(1);
    let n_y = ((image.height as f32 / grid_step).round() as usize).max(1);
    let mut clusters = Vec::with_capacity(n_x * n_y);
    for j in 0..n_y {
        let seed_y =
            (((j as f32 + 0.5) * image.height as f32 / n_y as f32) as usize).min(image.height - 1);
        for i in 0..n_x {
            let seed_x = (((i as f32 + 0.5) * image.width as f32 / n_x as f32) as usize)
                .min(image.width - 1);
            let (mut best_x, mut best_y) = (seed_x, seed_y);
            let mut best_g = gradient_sq(image, seed_x, seed_y);
            for ny in seed_y.saturating_sub(1)..=(seed_y + 1).min(image.height - 1) {
                for nx in seed_x.saturating_sub(1)..=(seed_x + 1).min(image.width - 1) {
                    let g = gradient_sq(image, nx, ny);
                    if g < best_g {
                        best_g = g;
                        (best_x, best_y) = (nx, ny);
                    }
                }
            }
            let mut color = [0.0f32; 4];
            color[..image.channels].copy_from_slice(image.get_pixel(best_x, best_y));
            clusters.push(Cluster {
                x: best_x as f32,
                y: best_y as f32,
                color,
                num_members: 0,
            });
        }
    }
    clusters
}

/// Assignment sweep: every center claims the pixels of its `2S x 2S` window
/// that it beats on the combined distance.
///
/// Centers are processed in index order and only a strictly smaller distance
/// steals a pixel, so ties go to the lowest center index.
#[multiversion(targets = "simd")]
pub(crate) fn assign(
    image: &ImageBuffer,
    clusters: &[Cluster],
    grid_step: f32,
    spatial_coef: f32,
    assignments: &mut Array2D<u32>,
    min_distances: &mut Array2D<f32>,
) {
    min_distances.fill(f32::INFINITY);
    let ch = image.channels;
    for (cluster_n, cluster) in clusters.iter().enumerate() {
        let x0 = (cluster.x - grid_step).ceil().max(0.0) as usize;
        let x1 = ((cluster.x + grid_step).floor() as usize).min(image.width - 1);
        let y0 = (cluster.y - grid_step).ceil().max(0.0) as usize;
        let y1 = ((cluster.y + grid_step).floor() as usize).min(image.height - 1);
        if x0 > x1 || y0 > y1 {
            continue;
        }
        for y in y0..=y1 {
            let image_row = image.get_row(y);
            let assignments_row = assignments.get_row_mut(y);
            let min_distances_row = min_distances.get_row_mut(y);
            let dy = y as f32 - cluster.y;
            for x in x0..=x1 {
                let pixel = &image_row[x * ch..x * ch + ch];
                let mut color_dist = 0.0f32;
                for (p, q) in pixel.iter().zip(&cluster.color[..ch]) {
                    color_dist += (p - q) * (p - q);
                }
                let dx = x as f32 - cluster.x;
                let distance =
                    color_dist.sqrt() + spatial_coef * (dx * dx + dy * dy).sqrt();
                if distance < min_distances_row[x] {
                    min_distances_row[x] = distance;
                    assignments_row[x] = cluster_n as u32;
                }
            }
        }
    }
}

/// Full-search fallback for pixels no window covered.
///
/// Seed perturbation can pull every nearby center far enough inward that a
/// border pixel sits outside all `2S x 2S` windows and would never be
/// assigned. Such pixels get the globally nearest center; ties go to the
/// lowest center index, as in [`assign`].
fn assign_orphans(
    image: &ImageBuffer,
    clusters: &[Cluster],
    spatial_coef: f32,
    assignments: &mut Array2D<u32>,
) {
    let ch = image.channels;
    for y in 0..image.height {
        let image_row = image.get_row(y);
        let assignments_row = assignments.get_row_mut(y);
        for x in 0..image.width {
            if assignments_row[x] != u32::MAX {
                continue;
            }
            let pixel = &image_row[x * ch..x * ch + ch];
            let mut best = f32::INFINITY;
            for (cluster_n, cluster) in clusters.iter().enumerate() {
                let mut color_dist = 0.0f32;
                for (p, q) in pixel.iter().zip(&cluster.color[..ch]) {
                    color_dist += (p - q) * (p - q);
                }
                let dx = x as f32 - cluster.x;
                let dy = y as f32 - cluster.y;
                let distance = color_dist.sqrt() + spatial_coef * (dx * dx + dy * dy).sqrt();
                if distance < best {
                    best = distance;
                    assignments_row[x] = cluster_n as u32;
                }
            }
        }
    }
}

/// Update step: each center moves to the mean (x, y, color) of its assigned
/// pixels.
///
/// Sums are accumulated per center in a single pass over the image and
/// divided at the end; centers without members are left untouched.
pub(crate) fn update(image: &ImageBuffer, assignments: &Array2D<u32>, clusters: &mut [Cluster]) {
    let ch = image.channels;
    let mut acc = vec![[0.0f64; 6]; clusters.len()];
    let mut members = vec![0u32; clusters.len()];
    for y in 0..image.height {
        let image_row = image.get_row(y);
        let assignments_row = assignments.get_row(y);
        for (x, &cluster_n) in assignments_row.iter().enumerate() {
            debug_assert!((cluster_n as usize) < clusters.len());
            let a = &mut acc[cluster_n as usize];
            a[0] += x as f64;
            a[1] += y as f64;
            for (c, s) in image_row[x * ch..x * ch + ch].iter().enumerate() {
                a[2 + c] += *s as f64;
            }
            members[cluster_n as usize] += 1;
        }
    }
    for ((cluster, a), &n) in clusters.iter_mut().zip(&acc).zip(&members) {
        if n == 0 {
            cluster.num_members = 0;
            continue;
        }
        let inv = 1.0 / n as f64;
        cluster.x = (a[0] * inv) as f32;
        cluster.y = (a[1] * inv) as f32;
        for c in 0..ch {
            cluster.color[c] = (a[2 + c] * inv) as f32;
        }
        cluster.num_members = n;
    }
}

/// SLIC superpixel segmentation.
///
/// Grid seeding, a fixed number of assign/update rounds restricted to each
/// center's local window, then a connected-component pass that folds regions
/// below `min_size_factor * S * S` into a neighboring label.
pub fn segment(image: &ImageBuffer, params: &SlicParams) -> Result<Segmentation, Error> {
    params.validate(image)?;
    let grid_step = (image.num_pixels() as f32 / params.num_superpixels as f32).sqrt();
    let spatial_coef = params.spatial_weight / grid_step;
    let mut clusters = initialize_clusters(image, params);
    let mut assignments = Array2D::from_fill(u32::MAX, image.width, image.height)?;
    let mut min_distances = Array2D::from_fill(f32::INFINITY, image.width, image.height)?;

    for _ in 0..params.max_iterations.max(1) {
        assign(
            image,
            &clusters,
            grid_step,
            spatial_coef,
            &mut assignments,
            &mut min_distances,
        );
        // After round one every pixel holds some center; a pixel all moving
        // windows abandon in a later round simply keeps its previous one.
        assign_orphans(image, &clusters, spatial_coef, &mut assignments);
        debug_assert!(assignments.data.iter().all(|&a| a != u32::MAX));
        update(image, &assignments, &mut clusters);
    }

    let min_size = (grid_step * grid_step * params.min_size_factor).round() as u32;
    relabel_components(&assignments, min_size)
}
