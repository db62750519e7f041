use num_traits::{Float, PrimInt, Signed};
use pixdown_tensor::{Tensor2, Tensor3, Tensor4};

use crate::error::{cast, DownsampleError};
use crate::parallel::{self, ExecutionStrategy};

/// The two clamped grid positions bracketing a coordinate along one axis and their weights.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisTap<F> {
    lo: usize,
    hi: usize,
    w_lo: F,
    w_hi: F,
}

/// Flat offsets of the four corner pixels of one sample and their areal weights.
///
/// Corner order is `(x0, y0)`, `(x1, y0)`, `(x0, y1)`, `(x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CornerTaps<F> {
    offsets: [usize; 4],
    weights: [F; 4],
}

/// Bracket `coord` by the clamped integer positions `floor(coord)` and `floor(coord) + 1`.
///
/// The coordinate is first limited to `[-1, len]`: every value outside that range clamps to
/// the same corners, and the limit keeps the floor representable by the index type `I`.
/// When both corners clamp onto the same pixel the interval has zero width and the axis
/// degenerates to an exact lookup of that pixel.
fn axis_tap<F, I>(coord: F, len: usize) -> Result<AxisTap<F>, DownsampleError>
where
    F: Float,
    I: PrimInt + Signed,
{
    let lower = -F::one();
    let upper: F = cast(len)?;
    let coord = coord.max(lower).min(upper);

    let max_index: I = cast(len - 1)?;
    let clamp = |v: I| v.max(I::zero()).min(max_index);

    let i0: I = cast(coord.floor())?;
    let lo = clamp(i0);
    let hi = clamp(i0 + I::one());

    let (w_lo, w_hi) = if lo == hi {
        (F::one(), F::zero())
    } else {
        let (lo_f, hi_f): (F, F) = (cast(lo)?, cast(hi)?);
        let width = hi_f - lo_f;
        ((hi_f - coord) / width, (coord - lo_f) / width)
    };

    Ok(AxisTap {
        lo: cast(lo)?,
        hi: cast(hi)?,
        w_lo,
        w_hi,
    })
}

fn corner_taps<F, I>(
    x: F,
    y: F,
    batch: usize,
    [height, width, channels]: [usize; 3],
) -> Result<CornerTaps<F>, DownsampleError>
where
    F: Float,
    I: PrimInt + Signed,
{
    let tx = axis_tap::<F, I>(x, width)?;
    let ty = axis_tap::<F, I>(y, height)?;

    let offset = |col: usize, row: usize| ((batch * height + row) * width + col) * channels;

    Ok(CornerTaps {
        offsets: [
            offset(tx.lo, ty.lo),
            offset(tx.hi, ty.lo),
            offset(tx.lo, ty.hi),
            offset(tx.hi, ty.hi),
        ],
        weights: [
            tx.w_lo * ty.w_lo,
            tx.w_hi * ty.w_lo,
            tx.w_lo * ty.w_hi,
            tx.w_hi * ty.w_hi,
        ],
    })
}

/// Sample a batch of channel-last images at arbitrary sub-pixel locations.
///
/// Each coordinate is bracketed by the four grid pixels `(x0, y0)`, `(x1, y0)`, `(x0, y1)` and
/// `(x1, y1)` with `x1 = x0 + 1`, `y1 = y0 + 1`, and the pixel values are blended with areal
/// weights proportional to the distance to the opposite corner.
///
/// # Edge handling
///
/// Corner coordinates are clamped independently into `[0, width - 1]` and `[0, height - 1]`.
/// Samples outside the image therefore return the value of the nearest border pixel; there is
/// no zero padding and no mirroring. Large offsets near the border silently saturate.
///
/// # Arguments
///
/// * `image` - The input images with shape (batch, height, width, channels).
/// * `xs` - The horizontal coordinates with shape (batch, N).
/// * `ys` - The vertical coordinates with shape (batch, N).
/// * `strategy` - How the per-point loop is scheduled.
///
/// # Type Parameters
///
/// * `F` - The floating point type of pixels and coordinates.
/// * `I` - The signed integer type used to compute corner indices.
///
/// # Returns
///
/// The interpolated values with shape (batch, N, channels).
///
/// # Errors
///
/// * [`DownsampleError::ShapeMismatch`] if `xs` and `ys` differ in shape or their batch
///   dimension differs from the image batch.
/// * [`DownsampleError::InvalidImageSize`] if the image has no pixels.
/// * [`DownsampleError::InvalidCoordinate`] if a coordinate is NaN.
///
/// # Example
///
/// ```
/// use pixdown_imgproc::interpolation::bilinear_sample;
/// use pixdown_imgproc::parallel::ExecutionStrategy;
/// use pixdown_tensor::{Tensor2, Tensor4};
///
/// let image = Tensor4::<f32>::from_shape_vec([1, 2, 2, 1], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
/// let xs = Tensor2::from_shape_vec([1, 1], vec![0.5]).unwrap();
/// let ys = Tensor2::from_shape_vec([1, 1], vec![0.5]).unwrap();
///
/// let out = bilinear_sample::<f32, i64>(&image, &xs, &ys, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(out.shape, [1, 1, 1]);
/// assert_eq!(out.as_slice(), &[1.5]);
/// ```
pub fn bilinear_sample<F, I>(
    image: &Tensor4<F>,
    xs: &Tensor2<F>,
    ys: &Tensor2<F>,
    strategy: ExecutionStrategy,
) -> Result<Tensor3<F>, DownsampleError>
where
    F: Float + Send + Sync,
    I: PrimInt + Signed,
{
    if xs.shape != ys.shape {
        return Err(DownsampleError::shape_mismatch(&xs.shape, &ys.shape));
    }

    let [batch, height, width, channels] = image.shape;
    let [coord_batch, num_points] = xs.shape;

    if coord_batch != batch {
        return Err(DownsampleError::shape_mismatch(&[batch, num_points], &xs.shape));
    }

    if height == 0 || width == 0 {
        return Err(DownsampleError::InvalidImageSize(width, height));
    }

    let (x_data, y_data) = (xs.as_slice(), ys.as_slice());

    // resolve the four corners of every (batch, point) pair up front
    let taps = parallel::try_map_indices(batch * num_points, strategy, |p| {
        let (x, y) = (x_data[p], y_data[p]);
        if x.is_nan() || y.is_nan() {
            return Err(DownsampleError::InvalidCoordinate { index: p });
        }
        corner_taps::<F, I>(x, y, p / num_points, [height, width, channels])
    })?;

    // gather and blend the corners in one pass over the output
    let src = image.as_slice();
    let mut out = vec![F::zero(); batch * num_points * channels];

    if channels > 0 {
        parallel::for_each_chunk_mut(&mut out, channels, strategy, |p, dst_pixel| {
            let tap = &taps[p];
            dst_pixel.iter_mut().enumerate().for_each(|(c, v)| {
                *v = tap
                    .offsets
                    .iter()
                    .zip(tap.weights.iter())
                    .fold(F::zero(), |acc, (&o, &w)| acc + w * src[o + c]);
            });
        });
    }

    Ok(Tensor3::from_shape_vec([batch, num_points, channels], out)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pixdown_tensor::{Tensor2, Tensor4};

    use super::bilinear_sample;
    use crate::error::DownsampleError;
    use crate::parallel::ExecutionStrategy;

    // 3x4 single-batch image with 2 channels, values encode (row, col, channel)
    fn test_image() -> Tensor4<f32> {
        Tensor4::from_shape_fn([1, 3, 4, 2], |[_, r, c, ch]| {
            (r * 10 + c) as f32 + ch as f32 * 100.0
        })
    }

    fn sample(
        image: &Tensor4<f32>,
        xs: Vec<f32>,
        ys: Vec<f32>,
    ) -> Result<Vec<f32>, DownsampleError> {
        let n = xs.len();
        let xs = Tensor2::from_shape_vec([1, n], xs)?;
        let ys = Tensor2::from_shape_vec([1, n], ys)?;
        Ok(bilinear_sample::<f32, i64>(image, &xs, &ys, ExecutionStrategy::Serial)?.into_vec())
    }

    #[test]
    fn integer_coordinates_are_exact() -> Result<(), DownsampleError> {
        let image = test_image();
        // interior, right edge, bottom edge and bottom-right corner
        let xs = vec![1.0, 3.0, 0.0, 3.0];
        let ys = vec![1.0, 0.0, 2.0, 2.0];
        let out = sample(&image, xs, ys)?;
        assert_eq!(out, vec![11.0, 111.0, 3.0, 103.0, 20.0, 120.0, 23.0, 123.0]);
        Ok(())
    }

    #[test]
    fn fractional_coordinates_blend_neighbours() -> Result<(), DownsampleError> {
        let image = test_image();
        let out = sample(&image, vec![1.25, 2.5], vec![0.5, 1.0])?;
        assert_relative_eq!(out[0], 6.25, epsilon = 1e-5);
        assert_relative_eq!(out[1], 106.25, epsilon = 1e-5);
        assert_relative_eq!(out[2], 12.5, epsilon = 1e-5);
        assert_relative_eq!(out[3], 112.5, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn horizontal_and_vertical_are_distinct() -> Result<(), DownsampleError> {
        let image = test_image();
        let out = sample(&image, vec![2.0, 0.0], vec![0.0, 2.0])?;
        assert_eq!(out[0], 2.0);
        assert_eq!(out[2], 20.0);
        Ok(())
    }

    #[test]
    fn out_of_bounds_clamps_to_border() -> Result<(), DownsampleError> {
        let image = test_image();
        let outside = sample(
            &image,
            vec![-5.0, 10.0, 1.5, 1.5, -0.5, 1e30],
            vec![1.0, 1.0, -3.0, 7.5, -0.5, -1e30],
        )?;
        let clamped = sample(
            &image,
            vec![0.0, 3.0, 1.5, 1.5, 0.0, 3.0],
            vec![1.0, 1.0, 0.0, 2.0, 0.0, 0.0],
        )?;
        for (a, b) in outside.iter().zip(clamped.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
            assert!(a.is_finite());
        }
        Ok(())
    }

    #[test]
    fn degenerate_interval_on_last_pixel() -> Result<(), DownsampleError> {
        // between the last column and the clamped border both corners collapse
        let image = test_image();
        let out = sample(&image, vec![3.4], vec![2.7])?;
        assert_eq!(out, vec![23.0, 123.0]);
        Ok(())
    }

    #[test]
    fn single_pixel_image() -> Result<(), DownsampleError> {
        let image = Tensor4::from_shape_vec([1, 1, 1, 1], vec![0.25f32])?;
        let out = sample(&image, vec![0.0, 0.7, -2.0], vec![0.3, 0.0, 4.0])?;
        assert_eq!(out, vec![0.25, 0.25, 0.25]);
        Ok(())
    }

    #[test]
    fn batches_sample_their_own_image() -> Result<(), DownsampleError> {
        let image = Tensor4::from_shape_vec([2, 1, 2, 1], vec![1.0f32, 3.0, 10.0, 30.0])?;
        let xs = Tensor2::from_shape_vec([2, 1], vec![0.5, 0.5])?;
        let ys = Tensor2::from_shape_vec([2, 1], vec![0.0, 0.0])?;
        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelElements] {
            let out = bilinear_sample::<f32, i32>(&image, &xs, &ys, strategy)?;
            assert_eq!(out.shape, [2, 1, 1]);
            assert_eq!(out.as_slice(), &[2.0, 20.0]);
        }
        Ok(())
    }

    #[test]
    fn mismatched_coordinates() -> Result<(), DownsampleError> {
        let image = test_image();
        let xs = Tensor2::from_shape_vec([1, 2], vec![0.0, 1.0])?;
        let ys = Tensor2::from_shape_vec([1, 3], vec![0.0, 1.0, 2.0])?;
        let res = bilinear_sample::<f32, i64>(&image, &xs, &ys, ExecutionStrategy::Serial);
        assert_eq!(res, Err(DownsampleError::ShapeMismatch(vec![1, 2], vec![1, 3])));

        let xs = Tensor2::from_shape_vec([2, 1], vec![0.0, 1.0])?;
        let ys = Tensor2::from_shape_vec([2, 1], vec![0.0, 1.0])?;
        let res = bilinear_sample::<f32, i64>(&image, &xs, &ys, ExecutionStrategy::Serial);
        assert!(matches!(res, Err(DownsampleError::ShapeMismatch(..))));
        Ok(())
    }

    #[test]
    fn nan_coordinate_is_rejected() -> Result<(), DownsampleError> {
        let image = test_image();
        let res = sample(&image, vec![0.0, f32::NAN], vec![0.0, 0.0]);
        assert_eq!(res, Err(DownsampleError::InvalidCoordinate { index: 1 }));
        Ok(())
    }
}
