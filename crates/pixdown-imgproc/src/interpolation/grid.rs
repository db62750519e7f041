use num_traits::Float;

use crate::error::{cast, DownsampleError};

/// Compute the nominal source-space sampling center of every output pixel along one axis.
///
/// Output pixel `i` covers the source block `[i * scale, (i + 1) * scale)`, whose center lies
/// at `i * scale + 0.5 * scale - 0.5` in pixel-center coordinates.
///
/// # Arguments
///
/// * `out_len` - The number of output pixels along the axis.
/// * `scale` - The integer downsampling factor.
///
/// # Returns
///
/// A vector of `out_len` centers.
pub fn block_centers<F: Float>(out_len: usize, scale: usize) -> Result<Vec<F>, DownsampleError> {
    let scale_f: F = cast(scale)?;
    let half: F = cast(0.5f64)?;
    let shift = half * scale_f - half;

    (0..out_len)
        .map(|i| Ok(cast::<F, _>(i * scale)? + shift))
        .collect()
}

/// Relative positions of the `kernel_size × kernel_size` neighborhood of a sampling center.
///
/// Slots are flattened row-major, so slot `s = dy * kernel_size + dx` maps to the horizontal
/// position `dx - kernel_size / 2` and the vertical position `dy - kernel_size / 2` (integer
/// division). Odd sizes give a symmetric window, even sizes extend one further to the
/// top-left.
///
/// # Returns
///
/// A vector of `kernel_size²` `(x, y)` pairs.
pub fn neighborhood_offsets<F: Float>(
    kernel_size: usize,
) -> Result<Vec<(F, F)>, DownsampleError> {
    let half: F = cast(kernel_size / 2)?;
    let mut offsets = Vec::with_capacity(kernel_size * kernel_size);
    for dy in 0..kernel_size {
        for dx in 0..kernel_size {
            offsets.push((cast::<F, _>(dx)? - half, cast::<F, _>(dy)? - half));
        }
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_per_scale() -> Result<(), DownsampleError> {
        assert_eq!(block_centers::<f32>(3, 1)?, vec![0.0, 1.0, 2.0]);
        assert_eq!(block_centers::<f32>(3, 2)?, vec![0.5, 2.5, 4.5]);
        assert_eq!(block_centers::<f64>(2, 3)?, vec![1.0, 4.0]);
        assert_eq!(block_centers::<f64>(2, 4)?, vec![1.5, 5.5]);
        assert!(block_centers::<f32>(0, 2)?.is_empty());
        Ok(())
    }

    #[test]
    fn neighborhood_3x3_row_major() -> Result<(), DownsampleError> {
        let offsets = neighborhood_offsets::<f32>(3)?;
        assert_eq!(
            offsets,
            vec![
                (-1.0, -1.0),
                (0.0, -1.0),
                (1.0, -1.0),
                (-1.0, 0.0),
                (0.0, 0.0),
                (1.0, 0.0),
                (-1.0, 1.0),
                (0.0, 1.0),
                (1.0, 1.0),
            ]
        );
        // the center slot sits at k² / 2
        assert_eq!(offsets[4], (0.0, 0.0));
        Ok(())
    }

    #[test]
    fn neighborhood_small_and_even() -> Result<(), DownsampleError> {
        assert_eq!(neighborhood_offsets::<f32>(1)?, vec![(0.0, 0.0)]);
        assert_eq!(
            neighborhood_offsets::<f32>(2)?,
            vec![(-1.0, -1.0), (0.0, -1.0), (-1.0, 0.0), (0.0, 0.0)]
        );
        Ok(())
    }
}
