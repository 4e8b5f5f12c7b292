use thiserror::Error;

/// Errors surfaced synchronously by the segmentation engines.
///
/// No engine retries internally and no partial results are produced: a failed
/// call returns no label buffer at all.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A numeric parameter is outside its documented range, or the image has
    /// zero area.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The image has a channel count the engines do not handle.
    #[error("unsupported channel count {0}, expected 1, 3 or 4")]
    Unsupported(usize),
    /// A working buffer could not be allocated (size overflow on very large
    /// images).
    #[error("cannot allocate buffer of {0} elements")]
    AllocationFailure(usize),
    /// A caller-provided buffer does not match `width * height * channels`.
    #[error("buffer length {got} does not match width * height * channels = {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}
