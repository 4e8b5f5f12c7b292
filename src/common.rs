use crate::arrays::{Array2D, ImageBuffer};
use crate::error::Error;
use crate::{graph, quickshift, slic};

/// Parameters of the Felzenszwalb-Huttenlocher graph-merging engine.
///
/// Defaults mirror the usual interactive starting point for 8-bit images.
#[derive(Clone, Debug)]
pub struct GraphParams {
    /// Standard deviation of the Gaussian pre-smoothing. Zero skips the
    /// smoothing pass entirely.
    pub sigma: f32,
    /// Scale of observation. Larger k biases the adaptive merge threshold
    /// towards larger components; it is not a minimum component size.
    pub k: f32,
    /// Components smaller than this are merged into an adjacent component in
    /// a final pass that ignores edge weights.
    pub min_size: u32,
}
impl Default for GraphParams {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            k: 500.0,
            min_size: 20,
        }
    }
}
impl GraphParams {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.k > 0.0) || !self.k.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "k must be a finite positive number, got {}",
                self.k
            )));
        }
        if !(self.sigma >= 0.0) || !self.sigma.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "sigma must be a finite non-negative number, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

/// Parameters of the Quick shift mode-seeking engine.
#[derive(Clone, Debug)]
pub struct QuickShiftParams {
    /// Standard deviation of the Parzen window. Also bounds the search
    /// window: both density estimation and parent search scan a square of
    /// radius `ceil(3 * kernel_size)` pixels.
    pub kernel_size: f32,
    /// Pruning threshold on the joint (x, y, color) distance from a pixel to
    /// its parent. Links longer than this are cut, making the pixel a root of
    /// its own superpixel.
    pub max_dist: f32,
    /// Multiplies all channel values before any distance computation, trading
    /// spatial against color influence. Zero makes the clustering purely
    /// spatial.
    pub color_ratio: f32,
}
impl Default for QuickShiftParams {
    fn default() -> Self {
        Self {
            kernel_size: 5.0,
            max_dist: 10.0,
            color_ratio: 1.0,
        }
    }
}
impl QuickShiftParams {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.kernel_size > 0.0) || !self.kernel_size.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "kernel_size must be a finite positive number, got {}",
                self.kernel_size
            )));
        }
        if !(self.max_dist >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "max_dist must be non-negative, got {}",
                self.max_dist
            )));
        }
        if !(self.color_ratio >= 0.0) || !self.color_ratio.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "color_ratio must be a finite non-negative number, got {}",
                self.color_ratio
            )));
        }
        Ok(())
    }
}

/// Parameters of the SLIC clustering engine.
#[derive(Clone, Debug)]
pub struct SlicParams {
    /// Target number of superpixels. The actual count can differ after grid
    /// seeding and the connectivity pass.
    pub num_superpixels: u32,
    /// Weight of the spatial term relative to the color term. The combined
    /// distance is `color + spatial_weight / S * spatial` with S the seeding
    /// grid step.
    pub spatial_weight: f32,
    /// Fixed number of assign/update rounds; convergence is not checked.
    pub max_iterations: u32,
    /// Connected regions smaller than `min_size_factor * S * S` are relabeled
    /// into an adjacent region. The default 0.25 matches the usual
    /// `area / num_superpixels / 4` rule.
    pub min_size_factor: f32,
}
impl Default for SlicParams {
    fn default() -> Self {
        Self {
            num_superpixels: 200,
            spatial_weight: 5.0,
            max_iterations: 10,
            min_size_factor: 0.25,
        }
    }
}
impl SlicParams {
    pub fn validate(&self, image: &ImageBuffer) -> Result<(), Error> {
        if self.num_superpixels == 0 {
            return Err(Error::InvalidParameter(
                "num_superpixels must be positive".into(),
            ));
        }
        if self.num_superpixels as usize > image.num_pixels() {
            return Err(Error::InvalidParameter(format!(
                "num_superpixels {} exceeds pixel count {}",
                self.num_superpixels,
                image.num_pixels()
            )));
        }
        if !(self.spatial_weight >= 0.0) || !self.spatial_weight.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "spatial_weight must be a finite non-negative number, got {}",
                self.spatial_weight
            )));
        }
        if !(self.min_size_factor >= 0.0) || !self.min_size_factor.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "min_size_factor must be a finite non-negative number, got {}",
                self.min_size_factor
            )));
        }
        Ok(())
    }
}

/// Label buffer plus label count, the common result of all three engines.
///
/// Labels are compacted to `0..num_labels` in row-major first-appearance
/// order; every label value maps to at least one pixel.
pub struct Segmentation {
    pub labels: Array2D<u32>,
    pub num_labels: u32,
}

/// Tagged selection of a segmentation engine.
///
/// Lets the orchestration layer pick among the three algorithms uniformly:
/// configure by constructing the variant, then call
/// [`Segmenter::segment`]. Engine-specific auxiliary outputs (densities,
/// parent forest) stay available through the per-module entry points.
pub enum Segmenter {
    Graph(GraphParams),
    QuickShift(QuickShiftParams),
    Slic(SlicParams),
}

impl Segmenter {
    pub fn segment(&self, image: &ImageBuffer) -> Result<Segmentation, Error> {
        match self {
            Segmenter::Graph(params) => graph::segment(image, params),
            Segmenter::QuickShift(params) => {
                quickshift::segment(image, params).map(|out| out.segmentation)
            }
            Segmenter::Slic(params) => slic::segment(image, params),
        }
    }
}
