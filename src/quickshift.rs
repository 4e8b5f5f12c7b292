use crate::arrays::{Array2D, ImageBuffer};
use crate::common::{QuickShiftParams, Segmentation};
use crate::connectivity::compact_labels;
use crate::disjoint::DisjointSet;
use crate::error::Error;
use multiversion::multiversion;
use rayon::prelude::*;

/// Full Quick shift result: the Parzen density estimate, the parent-pointer
/// forest with link lengths, and the superpixel labels after pruning.
///
/// Parents are linear pixel indices; a local density maximum points at itself
/// and carries an infinite distance sentinel.
pub struct QuickShiftOutput {
    pub density: Array2D<f32>,
    pub parent: Array2D<u32>,
    pub dist: Array2D<f32>,
    pub segmentation: Segmentation,
}

/// Squared joint-space distance between pixel (x, y) and (nx, ny) of the
/// color-scaled image.
#[inline(always)]
fn joint_distance_sq(scaled: &ImageBuffer, x: usize, y: usize, nx: usize, ny: usize) -> f32 {
    let dx = x as f32 - nx as f32;
    let dy = y as f32 - ny as f32;
    let mut d2 = dx * dx + dy * dy;
    for (p, q) in scaled.get_pixel(x, y).iter().zip(scaled.get_pixel(nx, ny)) {
        d2 += (p - q) * (p - q);
    }
    d2
}

/// Parzen density of one image row: per pixel, the sum of Gaussian kernel
/// contributions from everything inside the bounded window, self included.
/// The Gaussian normalization constant is dropped since only the relative
/// order of densities matters.
#[multiversion(targets = "simd")]
fn density_row(scaled: &ImageBuffer, y: usize, radius: usize, inv_two_sigma_sq: f32, row: &mut [f32]) {
    let y0 = y.saturating_sub(radius);
    let y1 = (y + radius).min(scaled.height - 1);
    for (x, out) in row.iter_mut().enumerate() {
        let x0 = x.saturating_sub(radius);
        let x1 = (x + radius).min(scaled.width - 1);
        let mut acc = 0.0f32;
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let d2 = joint_distance_sq(scaled, x, y, nx, ny);
                acc += (-d2 * inv_two_sigma_sq).exp();
            }
        }
        *out = acc;
    }
}

/// Parent search of one image row: the nearest windowed neighbor with
/// strictly greater density. The row-major scan keeps the first of equally
/// distant candidates.
#[multiversion(targets = "simd")]
fn parent_row(
    scaled: &ImageBuffer,
    density: &Array2D<f32>,
    y: usize,
    radius: usize,
    parent_out: &mut [u32],
    dist_out: &mut [f32],
) {
    let width = scaled.width;
    let y0 = y.saturating_sub(radius);
    let y1 = (y + radius).min(scaled.height - 1);
    for x in 0..width {
        let index = (y * width + x) as u32;
        let own_density = density[(x, y)];
        let x0 = x.saturating_sub(radius);
        let x1 = (x + radius).min(width - 1);
        let mut best_parent = index;
        let mut best_d2 = f32::INFINITY;
        for ny in y0..=y1 {
            let density_row = density.get_row(ny);
            for nx in x0..=x1 {
                if density_row[nx] > own_density {
                    let d2 = joint_distance_sq(scaled, x, y, nx, ny);
                    if d2 < best_d2 {
                        best_d2 = d2;
                        best_parent = (ny * width + nx) as u32;
                    }
                }
            }
        }
        parent_out[x] = best_parent;
        dist_out[x] = if best_parent == index {
            f32::INFINITY
        } else {
            best_d2.sqrt()
        };
    }
}

/// Quick shift mode-seeking segmentation.
///
/// Channel values are scaled by `color_ratio` up front; density estimation
/// and parent search both scan a square window of radius
/// `ceil(3 * kernel_size)`, which is the documented
/// O(width * height * window area) cost envelope. Superpixels are the trees
/// remaining after cutting every parent link longer than `max_dist`.
pub fn segment(image: &ImageBuffer, params: &QuickShiftParams) -> Result<QuickShiftOutput, Error> {
    params.validate()?;
    let mut scaled = image.like(0.0);
    for (dst, src) in scaled.data.iter_mut().zip(image.data.iter()) {
        *dst = src * params.color_ratio;
    }

    let radius = (3.0 * params.kernel_size).ceil() as usize;
    let inv_two_sigma_sq = 1.0 / (2.0 * params.kernel_size * params.kernel_size);
    let width = image.width;
    let height = image.height;

    let mut density = Array2D::from_fill(0.0f32, width, height)?;
    density
        .data
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| density_row(&scaled, y, radius, inv_two_sigma_sq, row));

    let mut parent = Array2D::from_fill(0u32, width, height)?;
    let mut dist = Array2D::from_fill(0.0f32, width, height)?;
    parent
        .data
        .as_mut_slice()
        .par_chunks_mut(width)
        .zip(dist.data.as_mut_slice().par_chunks_mut(width))
        .enumerate()
        .for_each(|(y, (parent_out, dist_out))| {
            parent_row(&scaled, &density, y, radius, parent_out, dist_out)
        });

    // Cut links longer than max_dist, flood the surviving forest.
    let mut ds = DisjointSet::new(image.num_pixels());
    for i in 0..image.num_pixels() {
        let p = parent.data[i];
        if p != i as u32 && dist.data[i] <= params.max_dist {
            ds.union(i as u32, p);
        }
    }
    let segmentation = compact_labels(&mut ds, width, height)?;

    Ok(QuickShiftOutput {
        density,
        parent,
        dist,
        segmentation,
    })
}

#[cfg(test)]
mod tests {
    use super::segment;
    use crate::arrays::ImageBuffer;
    use crate::common::QuickShiftParams;
    use crate::error::Error;

    fn bright_center_9x9() -> ImageBuffer {
        let mut data = vec![0u8; 9 * 9];
        data[4 * 9 + 4] = 255;
        ImageBuffer::from_u8(&data, 9, 9, 1).unwrap()
    }

    #[test]
    fn rejects_non_positive_kernel_size() {
        let img = bright_center_9x9();
        for kernel_size in [0.0, -1.0] {
            assert!(matches!(
                segment(
                    &img,
                    &QuickShiftParams {
                        kernel_size,
                        ..QuickShiftParams::default()
                    }
                ),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn global_density_maximum_is_its_own_root() {
        let img = bright_center_9x9();
        for max_dist in [0.0, 1.0, 100.0, 1e6] {
            // color_ratio 0 turns the estimate purely spatial, putting the
            // unique maximum at the image center.
            let out = segment(
                &img,
                &QuickShiftParams {
                    kernel_size: 2.0,
                    max_dist,
                    color_ratio: 0.0,
                },
            )
            .unwrap();
            let argmax = out
                .density
                .data
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            assert_eq!(argmax, 4 * 9 + 4);
            assert_eq!(out.parent.data[argmax], argmax as u32);
            assert_eq!(out.dist.data[argmax], f32::INFINITY);
        }
    }

    #[test]
    fn parent_density_is_strictly_greater() {
        let data: Vec<u8> = (0..8 * 4).map(|i| (i % 8 * 30) as u8).collect();
        let img = ImageBuffer::from_u8(&data, 8, 4, 1).unwrap();
        let out = segment(
            &img,
            &QuickShiftParams {
                kernel_size: 1.5,
                max_dist: 100.0,
                color_ratio: 1.0,
            },
        )
        .unwrap();
        for i in 0..img.num_pixels() {
            let p = out.parent.data[i] as usize;
            if p != i {
                assert!(out.density.data[p] > out.density.data[i]);
                assert!(out.dist.data[i] > 0.0);
            } else {
                assert_eq!(out.dist.data[i], f32::INFINITY);
            }
        }
    }

    #[test]
    fn zero_max_dist_yields_singletons() {
        // Ramp image: densities differ, every link has positive length.
        let data: Vec<u8> = (0..8 * 2).map(|i| (i % 8 * 25) as u8).collect();
        let img = ImageBuffer::from_u8(&data, 8, 2, 1).unwrap();
        let out = segment(
            &img,
            &QuickShiftParams {
                kernel_size: 1.0,
                max_dist: 0.0,
                color_ratio: 1.0,
            },
        )
        .unwrap();
        assert_eq!(out.segmentation.num_labels as usize, img.num_pixels());
    }

    #[test]
    fn uniform_image_collapses_to_single_mode() {
        let img = ImageBuffer::from_u8(&[99u8; 9 * 9 * 3], 9, 9, 3).unwrap();
        let out = segment(
            &img,
            &QuickShiftParams {
                kernel_size: 2.0,
                max_dist: 1e6,
                color_ratio: 1.0,
            },
        )
        .unwrap();
        assert_eq!(out.segmentation.num_labels, 1);
    }

    #[test]
    fn half_white_half_black_finds_two_modes() {
        let mut data = Vec::new();
        for _y in 0..2 {
            for x in 0..4 {
                let v = if x < 2 { 255u8 } else { 0 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let img = ImageBuffer::from_u8(&data, 4, 2, 3).unwrap();
        let out = segment(
            &img,
            &QuickShiftParams {
                kernel_size: 1.0,
                max_dist: 1000.0,
                color_ratio: 10.0,
            },
        )
        .unwrap();
        assert!(out.segmentation.num_labels >= 2);
        // No label may span the color boundary.
        let labels = &out.segmentation.labels;
        for y in 0..2 {
            for x in 0..2 {
                for bx in 2..4 {
                    assert_ne!(labels[(x, y)], labels[(bx, y)]);
                    assert_ne!(labels[(x, y)], labels[(bx, 1 - y)]);
                }
            }
        }
    }

    #[test]
    fn label_buffer_is_dense_and_occupied() {
        let data: Vec<u8> = (0..10 * 6 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let img = ImageBuffer::from_u8(&data, 10, 6, 3).unwrap();
        let out = segment(
            &img,
            &QuickShiftParams {
                kernel_size: 1.0,
                max_dist: 20.0,
                color_ratio: 0.5,
            },
        )
        .unwrap();
        let seg = &out.segmentation;
        let mut hist = vec![0u32; seg.num_labels as usize];
        for &l in seg.labels.data.iter() {
            hist[l as usize] += 1;
        }
        assert!(hist.iter().all(|&c| c > 0));
    }
}
