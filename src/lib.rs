//! Superpixel segmentation engines for 2-D color images.
//!
//! This crate implements three interchangeable segmentation algorithms over a
//! shared flat-buffer image contract:
//!
//! - [`graph`] — Felzenszwalb-Huttenlocher graph merging: a disjoint-set
//!   forest over the sorted 8-neighborhood edge list with an adaptive
//!   per-component merge threshold.
//! - [`quickshift`] — Quick shift mode seeking: a Parzen density estimate in
//!   joint (x, y, color) space and a parent-pointer forest pruned by a
//!   distance threshold.
//! - [`slic`] — SLIC: iterative spatial-color clustering restricted to local
//!   windows, with a connectivity-enforcing relabeling pass.
//!
//! Each engine is a synchronous, CPU-bound call that consumes an immutable
//! [`arrays::ImageBuffer`] plus a parameter record and returns a dense label
//! buffer; nothing persists between calls. The [`common::Segmenter`] variant
//! lets a caller pick among the three uniformly:
//!
//! ```rust
//! use superpixels::arrays::ImageBuffer;
//! use superpixels::common::{Segmenter, SlicParams};
//! use superpixels::render::colored_image;
//!
//! // Any packed byte image works; the image crate's RGB8 layout fits as-is.
//! let raw = vec![127u8; 64 * 48 * 3];
//! let image = ImageBuffer::from_u8(&raw, 64, 48, 3).unwrap();
//!
//! let segmenter = Segmenter::Slic(SlicParams {
//!     num_superpixels: 32,
//!     ..SlicParams::default()
//! });
//! let segmentation = segmenter.segment(&image).unwrap();
//! assert_eq!(segmentation.labels.data.len(), 64 * 48);
//!
//! // Optional derived output: mean color per superpixel.
//! let colored = colored_image(&image, &segmentation).unwrap();
//! assert_eq!(colored.data.len(), 64 * 48 * 3);
//! ```
//!
//! Density estimation and parent search in Quick shift run on rayon worker
//! threads, but every output pixel is written exactly once from immutable
//! inputs, so results are bit-identical across thread counts. Everything else
//! is single-threaded; repeated runs on the same input produce byte-identical
//! label buffers.
//!
//! GUI, file I/O and threading wrappers are deliberately out of scope; the
//! surrounding application converts its pixel grids to the flat buffer
//! contract before calling in and maps the label buffer back afterwards.

pub mod arrays;
pub mod common;
pub mod connectivity;
pub mod disjoint;
pub mod error;
pub mod filter;
pub mod graph;
pub mod quickshift;
pub mod render;
pub mod slic;
