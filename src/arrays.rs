use crate::error::Error;
use aligned_vec::{AVec, ConstAlign};
use std::ops::{Index, IndexMut};

const ALIGN: usize = 64;

/// Checks that `width * height * channels` elements of `T` fit an allocation
/// before touching the allocator.
#[inline]
fn checked_len<T>(width: usize, height: usize, channels: usize) -> Result<usize, Error> {
    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(Error::AllocationFailure(usize::MAX))?;
    let size_bytes = len
        .checked_mul(std::mem::size_of::<T>())
        .ok_or(Error::AllocationFailure(len))?;
    if size_bytes > usize::MAX - (ALIGN - 1) || (usize::BITS < 64 && size_bytes > isize::MAX as usize)
    {
        return Err(Error::AllocationFailure(len));
    }
    Ok(len)
}

/// Row-major 2D array over 64-byte-aligned storage.
///
/// Used for label planes, density maps, parent-pointer forests and the
/// per-pixel minimal distance plane of the SLIC assignment step.
#[derive(Debug, Clone)]
pub struct Array2D<T> {
    pub data: AVec<T, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
}

impl<T> Array2D<T> {
    pub fn from_fill(value: T, width: usize, height: usize) -> Result<Self, Error>
    where
        T: Clone + Copy,
    {
        let len = checked_len::<T>(width, height, 1)?;
        let data: AVec<T, ConstAlign<ALIGN>> = AVec::from_iter(ALIGN, (0..len).map(|_| value));
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_slice(data: &[T], width: usize, height: usize) -> Result<Self, Error>
    where
        T: Clone,
    {
        if data.len() != width * height {
            return Err(Error::DimensionMismatch {
                expected: width * height,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: AVec::from_slice(ALIGN, data),
        })
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.data.fill(value)
    }

    #[inline(always)]
    pub fn get_row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.height);
        &self.data[(self.width * row)..(self.width * row + self.width)]
    }

    #[inline(always)]
    pub fn get_row_mut(&mut self, row: usize) -> &mut [T] {
        debug_assert!(row < self.height);
        &mut self.data[(self.width * row)..(self.width * row + self.width)]
    }

    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.width > x);
        debug_assert!(self.height > y);
        self.width * y + x
    }

    pub fn get_x_y_index(&self, ind: usize) -> (usize, usize) {
        debug_assert!(ind < self.data.len());
        (ind % self.width, ind / self.width)
    }
}

impl<T> Index<(usize, usize)> for Array2D<T> {
    type Output = T;
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.data[self.get_index(x, y)]
    }
}
impl<T> IndexMut<(usize, usize)> for Array2D<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        let idx = self.get_index(x, y);
        &mut self.data[idx]
    }
}

/// Immutable input image for all three engines.
///
/// Samples are channel-interleaved `f32` in row-major order, no padding.
/// Callers with byte images convert once at the boundary via
/// [`ImageBuffer::from_u8`]; values keep their 0-255 range, no color space
/// conversion is applied. The pixel count is bounded below `u32::MAX` so
/// labels and pixel indices fit `u32`.
pub struct ImageBuffer {
    pub data: AVec<f32, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl ImageBuffer {
    fn check_shape(
        len: usize,
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<usize, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter(format!(
                "image has zero area ({width}x{height})"
            )));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(Error::Unsupported(channels));
        }
        let expected = checked_len::<f32>(width, height, channels)?;
        // Labels and disjoint-set indices are u32.
        if width * height >= u32::MAX as usize {
            return Err(Error::InvalidParameter(format!(
                "image has {} pixels, label indices are 32-bit",
                width * height
            )));
        }
        if len != expected {
            return Err(Error::DimensionMismatch { expected, got: len });
        }
        Ok(expected)
    }

    pub fn from_u8(
        data: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self, Error> {
        Self::check_shape(data.len(), width, height, channels)?;
        let samples = AVec::from_iter(ALIGN, data.iter().map(|&s| s as f32));
        Ok(Self {
            data: samples,
            width,
            height,
            channels,
        })
    }

    pub fn from_f32(
        data: &[f32],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self, Error> {
        Self::check_shape(data.len(), width, height, channels)?;
        Ok(Self {
            data: AVec::from_slice(ALIGN, data),
            width,
            height,
            channels,
        })
    }

    /// Same shape as `self`, every sample set to `fill`.
    pub(crate) fn like(&self, fill: f32) -> Self {
        Self {
            data: AVec::from_iter(ALIGN, (0..self.data.len()).map(|_| fill)),
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    #[inline(always)]
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.width > x);
        debug_assert!(self.height > y);
        (self.width * y + x) * self.channels
    }

    #[inline(always)]
    pub fn get_pixel(&self, x: usize, y: usize) -> &[f32] {
        let idx = self.get_index(x, y);
        &self.data[idx..idx + self.channels]
    }

    /// Pixel by linear index `y * width + x`.
    #[inline(always)]
    pub fn get_pixel_linear(&self, ind: usize) -> &[f32] {
        debug_assert!(ind < self.num_pixels());
        let idx = ind * self.channels;
        &self.data[idx..idx + self.channels]
    }

    #[inline(always)]
    pub fn get_row(&self, row: usize) -> &[f32] {
        debug_assert!(row < self.height);
        let stride = self.width * self.channels;
        &self.data[(stride * row)..(stride * row + stride)]
    }
}

impl Index<(usize, usize)> for ImageBuffer {
    type Output = [f32];
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        let idx = self.get_index(x, y);
        &self.data[idx..idx + self.channels]
    }
}

/// Euclidean distance between two channel vectors.
#[inline(always)]
pub(crate) fn color_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(p, q)| (p - q) * (p - q))
        .sum::<f32>()
        .sqrt()
}
