use crate::arrays::ImageBuffer;
use crate::common::Segmentation;
use crate::error::Error;

fn check_shapes(image: &ImageBuffer, seg: &Segmentation) -> Result<(), Error> {
    if seg.labels.width != image.width || seg.labels.height != image.height {
        return Err(Error::DimensionMismatch {
            expected: image.num_pixels(),
            got: seg.labels.data.len(),
        });
    }
    Ok(())
}

/// Paints every pixel with the mean color of its label.
///
/// The auxiliary output all three engines offer next to the label buffer;
/// useful for a quick visual check of a segmentation.
pub fn colored_image(image: &ImageBuffer, seg: &Segmentation) -> Result<ImageBuffer, Error> {
    check_shapes(image, seg)?;
    let ch = image.channels;
    let mut acc = vec![[0.0f64; 4]; seg.num_labels as usize];
    let mut counts = vec![0u64; seg.num_labels as usize];
    for (i, &label) in seg.labels.data.iter().enumerate() {
        debug_assert!((label as usize) < acc.len());
        let pixel = image.get_pixel_linear(i);
        for (c, s) in pixel.iter().enumerate() {
            acc[label as usize][c] += *s as f64;
        }
        counts[label as usize] += 1;
    }
    let mut mean = vec![[0.0f32; 4]; acc.len()];
    for ((m, a), &n) in mean.iter_mut().zip(&acc).zip(&counts) {
        // Compaction guarantees every label owns at least one pixel.
        debug_assert!(n > 0);
        for c in 0..ch {
            m[c] = (a[c] / n as f64) as f32;
        }
    }
    let mut out = image.like(0.0);
    for (i, &label) in seg.labels.data.iter().enumerate() {
        out.data[i * ch..i * ch + ch].copy_from_slice(&mean[label as usize][..ch]);
    }
    Ok(out)
}

/// Copy of the input with superpixel boundaries overdrawn in `marker` color.
///
/// A pixel is a boundary pixel when its label differs from the right or the
/// down neighbor, which draws a single-pixel-wide contour on the upper-left
/// side of every region border.
pub fn contour_image(
    image: &ImageBuffer,
    seg: &Segmentation,
    marker: &[f32],
) -> Result<ImageBuffer, Error> {
    check_shapes(image, seg)?;
    if marker.len() != image.channels {
        return Err(Error::DimensionMismatch {
            expected: image.channels,
            got: marker.len(),
        });
    }
    let ch = image.channels;
    let mut out = image.like(0.0);
    out.data.copy_from_slice(&image.data);
    for y in 0..image.height {
        let labels_row = seg.labels.get_row(y);
        for x in 0..image.width {
            let right_differs = x + 1 < image.width && labels_row[x] != labels_row[x + 1];
            let down_differs = y + 1 < image.height && labels_row[x] != seg.labels[(x, y + 1)];
            if right_differs || down_differs {
                let idx = (y * image.width + x) * ch;
                out.data[idx..idx + ch].copy_from_slice(marker);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{colored_image, contour_image};
    use crate::arrays::ImageBuffer;
    use crate::common::{GraphParams, Segmenter};
    use crate::error::Error;

    fn half_white_half_black() -> ImageBuffer {
        let mut data = Vec::new();
        for _y in 0..2 {
            for x in 0..4 {
                let v = if x < 2 { 255u8 } else { 0 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        ImageBuffer::from_u8(&data, 4, 2, 3).unwrap()
    }

    fn two_label_segmentation() -> (ImageBuffer, crate::common::Segmentation) {
        let img = half_white_half_black();
        let seg = Segmenter::Graph(GraphParams {
            sigma: 0.0,
            k: 1.0,
            min_size: 0,
        })
        .segment(&img)
        .unwrap();
        (img, seg)
    }

    #[test]
    fn mean_color_of_uniform_regions_is_the_region_color() {
        let (img, seg) = two_label_segmentation();
        let colored = colored_image(&img, &seg).unwrap();
        assert_eq!(colored.get_pixel(0, 0), &[255.0, 255.0, 255.0]);
        assert_eq!(colored.get_pixel(3, 1), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn contours_mark_the_vertical_midline() {
        let (img, seg) = two_label_segmentation();
        let marker = [255.0, 0.0, 0.0];
        let overlay = contour_image(&img, &seg, &marker).unwrap();
        for y in 0..2 {
            assert_eq!(overlay.get_pixel(1, y), &marker);
            // Everything else keeps the input color.
            assert_eq!(overlay.get_pixel(0, y), &[255.0, 255.0, 255.0]);
            assert_eq!(overlay.get_pixel(2, y), &[0.0, 0.0, 0.0]);
            assert_eq!(overlay.get_pixel(3, y), &[0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn marker_must_match_channel_count() {
        let (img, seg) = two_label_segmentation();
        assert!(matches!(
            contour_image(&img, &seg, &[1.0]),
            Err(Error::DimensionMismatch {
                expected: 3,
                got: 1
            })
        ));
    }
}
