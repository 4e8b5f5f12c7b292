use crate::arrays::ImageBuffer;
use crate::error::Error;

/// Kernel reach in standard deviations. Contributions beyond 4 sigma are
/// below f32 noise for 8-bit data.
const KERNEL_WIDTH: f32 = 4.0;

/// Half-kernel (center tap first) of a normalized Gaussian.
///
/// The full kernel is even-symmetric, so only `ceil(4*sigma) + 1` taps are
/// stored; normalization accounts for the mirrored half.
pub(crate) fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let sigma = sigma.max(0.01);
    let len = (sigma * KERNEL_WIDTH).ceil() as usize + 1;
    let mut mask: Vec<f32> = (0..len)
        .map(|i| (-0.5 * (i as f32 / sigma) * (i as f32 / sigma)).exp())
        .collect();
    let sum: f32 = 2.0 * mask.iter().skip(1).sum::<f32>() + mask[0];
    for v in mask.iter_mut() {
        *v /= sum;
    }
    mask
}

/// One pass of the separable convolution along a line of `len` pixels.
/// Out-of-range taps clamp to the border sample.
#[inline]
fn convolve_line(
    src: impl Fn(usize) -> f32,
    dst: &mut [f32],
    stride: usize,
    len: usize,
    mask: &[f32],
) {
    for x in 0..len {
        let mut acc = mask[0] * src(x);
        for (i, m) in mask.iter().enumerate().skip(1) {
            let lo = x.saturating_sub(i);
            let hi = (x + i).min(len - 1);
            acc += m * (src(lo) + src(hi));
        }
        dst[x * stride] = acc;
    }
}

/// Separable Gaussian smoothing of every channel.
///
/// Horizontal then vertical pass with an even-symmetric normalized kernel,
/// exactly what the graph-merging engine runs before building its edge list.
pub fn smooth(image: &ImageBuffer, sigma: f32) -> Result<ImageBuffer, Error> {
    if !(sigma >= 0.0) || !sigma.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "sigma must be a finite non-negative number, got {sigma}"
        )));
    }
    let mask = make_gaussian_kernel(sigma);
    let ch = image.channels;
    let row_stride = image.width * ch;
    let mut tmp = image.like(0.0);
    let mut out = image.like(0.0);

    // Horizontal pass, image -> tmp.
    for y in 0..image.height {
        let src_row = image.get_row(y);
        let dst_row = &mut tmp.data[y * row_stride..(y + 1) * row_stride];
        for c in 0..ch {
            convolve_line(
                |x| src_row[x * ch + c],
                &mut dst_row[c..],
                ch,
                image.width,
                &mask,
            );
        }
    }

    // Vertical pass, tmp -> out.
    for x in 0..image.width {
        for c in 0..ch {
            let col = x * ch + c;
            let tmp_ref = &tmp.data;
            convolve_line(
                |y| tmp_ref[y * row_stride + col],
                &mut out.data[col..],
                row_stride,
                image.height,
                &mask,
            );
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{make_gaussian_kernel, smooth};
    use crate::arrays::ImageBuffer;
    use crate::error::Error;

    #[test]
    fn kernel_is_normalized() {
        for sigma in [0.0, 0.5, 1.0, 2.5] {
            let mask = make_gaussian_kernel(sigma);
            let sum = 2.0 * mask.iter().skip(1).sum::<f32>() + mask[0];
            assert!((sum - 1.0).abs() < 1e-5, "sigma={sigma}: sum={sum}");
        }
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let img = ImageBuffer::from_u8(&[77u8; 6 * 4 * 3], 6, 4, 3).unwrap();
        let smoothed = smooth(&img, 1.5).unwrap();
        for s in smoothed.data.iter() {
            assert!((s - 77.0).abs() < 1e-3);
        }
    }

    #[test]
    fn smoothing_spreads_an_impulse() {
        let mut data = vec![0.0f32; 9 * 9];
        data[4 * 9 + 4] = 255.0;
        let img = ImageBuffer::from_f32(&data, 9, 9, 1).unwrap();
        let smoothed = smooth(&img, 1.0).unwrap();
        let center = smoothed.get_pixel(4, 4)[0];
        let next = smoothed.get_pixel(5, 4)[0];
        assert!(center > next && next > 0.0);
        // Mass is preserved up to the clamped borders.
        let total: f32 = smoothed.data.iter().sum();
        assert!((total - 255.0).abs() < 1.0);
    }

    #[test]
    fn single_pixel_image() {
        let img = ImageBuffer::from_u8(&[5, 6, 7], 1, 1, 3).unwrap();
        let smoothed = smooth(&img, 2.0).unwrap();
        assert_eq!(smoothed.get_pixel(0, 0), &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn rejects_bad_sigma() {
        let img = ImageBuffer::from_u8(&[0; 3], 1, 1, 3).unwrap();
        assert!(matches!(
            smooth(&img, f32::NAN),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            smooth(&img, -1.0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
