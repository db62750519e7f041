use num_traits::{Float, FloatConst};
use pixdown_tensor::{Tensor2, Tensor4};

use super::softround::soft_round;
use crate::error::{cast, DownsampleError};
use crate::function::Function;
use crate::interpolation::{bilinear_sample, grid};
use crate::parallel::{self, ExecutionStrategy};

/// Parameters of the kernel applicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelApplyParams<F> {
    /// Integer downsampling factor along both axes.
    pub scale: usize,
    /// Side length of the square sampling neighborhood of every output pixel.
    pub kernel_size: usize,
    /// Sharpness of the soft rounding step.
    pub alpha: F,
    /// How the per-pixel loops are scheduled.
    pub strategy: ExecutionStrategy,
    /// When set, reject kernels whose weights deviate from a unit sum by more than this.
    pub kernel_sum_tolerance: Option<F>,
}

impl<F: Float> Default for KernelApplyParams<F> {
    fn default() -> Self {
        Self {
            scale: 2,
            kernel_size: 3,
            alpha: F::one(),
            strategy: ExecutionStrategy::default(),
            kernel_sum_tolerance: None,
        }
    }
}

impl<F: Float> KernelApplyParams<F> {
    /// Check that every parameter is in its valid range.
    pub fn validate(&self) -> Result<(), DownsampleError> {
        if self.scale == 0 {
            return Err(DownsampleError::InvalidParameter {
                name: "scale",
                value: self.scale.to_string(),
            });
        }
        if self.kernel_size == 0 {
            return Err(DownsampleError::InvalidParameter {
                name: "kernel_size",
                value: self.kernel_size.to_string(),
            });
        }
        if !self.alpha.is_finite() {
            return Err(DownsampleError::InvalidParameter {
                name: "alpha",
                value: display_float(self.alpha),
            });
        }
        if let Some(tolerance) = self.kernel_sum_tolerance {
            let valid = tolerance >= F::zero() && tolerance.is_finite();
            if !valid {
                return Err(DownsampleError::InvalidParameter {
                    name: "kernel_sum_tolerance",
                    value: display_float(tolerance),
                });
            }
        }
        Ok(())
    }
}

fn display_float<F: Float>(value: F) -> String {
    value.to_f64().unwrap_or(f64::NAN).to_string()
}

/// Compute the output resolution `(height / scale, width / scale)`.
///
/// Division truncates: trailing rows and columns that do not fill a whole block produce no
/// output pixel.
///
/// # Errors
///
/// * [`DownsampleError::InvalidParameter`] if `scale` is zero.
/// * [`DownsampleError::InvalidImageSize`] if the image is smaller than one block.
pub fn output_size(
    height: usize,
    width: usize,
    scale: usize,
) -> Result<(usize, usize), DownsampleError> {
    if scale == 0 {
        return Err(DownsampleError::InvalidParameter {
            name: "scale",
            value: scale.to_string(),
        });
    }
    let (out_h, out_w) = (height / scale, width / scale);
    if out_h == 0 || out_w == 0 {
        return Err(DownsampleError::InvalidImageSize(width, height));
    }
    Ok((out_h, out_w))
}

/// Inputs of [`KernelApply`], all in channel-first layout.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelApplyInput<F> {
    /// The source images with shape (batch, channels, height, width).
    pub image: Tensor4<F>,
    /// The blending weights with shape (batch, kernel_size², out_h, out_w).
    pub kernels: Tensor4<F>,
    /// The horizontal sub-pixel offsets with shape (batch, 1, out_h, out_w).
    pub offsets_h: Tensor4<F>,
    /// The vertical sub-pixel offsets with shape (batch, 1, out_h, out_w).
    pub offsets_v: Tensor4<F>,
}

/// Gradients of [`KernelApply`] with respect to each input.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelApplyGrad<F> {
    /// Gradient with respect to the source images.
    pub image: Tensor4<F>,
    /// Gradient with respect to the blending weights.
    pub kernels: Tensor4<F>,
    /// Gradient with respect to the horizontal offsets.
    pub offsets_h: Tensor4<F>,
    /// Gradient with respect to the vertical offsets.
    pub offsets_v: Tensor4<F>,
}

/// Kernel-guided downsampling as a [`Function`].
///
/// Only the forward transform is available. [`Function::backward`] always fails with
/// [`DownsampleError::UnsupportedOperation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelApply<F> {
    params: KernelApplyParams<F>,
}

impl<F: Float> KernelApply<F> {
    /// Create a new operator, validating the parameters.
    pub fn new(params: KernelApplyParams<F>) -> Result<Self, DownsampleError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The parameters of the operator.
    pub fn params(&self) -> &KernelApplyParams<F> {
        &self.params
    }
}

impl<F: Float> Default for KernelApply<F> {
    fn default() -> Self {
        Self {
            params: KernelApplyParams::default(),
        }
    }
}

impl<F> Function for KernelApply<F>
where
    F: Float + FloatConst + Send + Sync,
{
    type Input = KernelApplyInput<F>;
    type Output = Tensor4<F>;
    type Gradient = KernelApplyGrad<F>;

    fn forward(&self, input: &Self::Input) -> Result<Self::Output, DownsampleError> {
        apply_kernels(
            &input.image,
            &input.kernels,
            &input.offsets_h,
            &input.offsets_v,
            &self.params,
        )
    }

    fn backward(&self, _grad_output: &Self::Output) -> Result<Self::Gradient, DownsampleError> {
        Err(DownsampleError::unsupported_operation(
            "KernelApply::backward",
            "kernel-guided downsampling does not implement a gradient",
        ))
    }

    fn supports_backward(&self) -> bool {
        false
    }
}

fn check_shape(expected: [usize; 4], actual: [usize; 4]) -> Result<(), DownsampleError> {
    if expected != actual {
        return Err(DownsampleError::shape_mismatch(&expected, &actual));
    }
    Ok(())
}

fn check_kernel_sums<F: Float>(
    kernels: &Tensor4<F>,
    tolerance: F,
) -> Result<(), DownsampleError> {
    let [_, out_h, out_w, k2] = kernels.shape;
    for (p, weights) in kernels.as_slice().chunks_exact(k2).enumerate() {
        let sum = weights.iter().fold(F::zero(), |acc, &w| acc + w);
        let within = (sum - F::one()).abs() <= tolerance;
        if !within {
            return Err(DownsampleError::KernelNotNormalized {
                batch: p / (out_h * out_w),
                row: (p / out_w) % out_h,
                col: p % out_w,
                sum: sum.to_f64().unwrap_or(f64::NAN),
            });
        }
    }
    Ok(())
}

/// Build the absolute source coordinates of every neighborhood slot of every output pixel.
///
/// The offsets are channel-last with shape (batch, out_h, out_w, 1). The horizontal
/// coordinates only depend on the output column and `offsets_h`, the vertical ones only on
/// the output row and `offsets_v`.
///
/// Returns `(xs, ys)` with shape (batch, out_h * out_w * kernel_size²), ordered by output row,
/// output column and then neighborhood slot.
fn sample_coordinates<F: Float>(
    offsets_h: &Tensor4<F>,
    offsets_v: &Tensor4<F>,
    scale: usize,
    kernel_size: usize,
) -> Result<(Tensor2<F>, Tensor2<F>), DownsampleError> {
    let [batch, out_h, out_w, _] = offsets_h.shape;

    let centers_y = grid::block_centers::<F>(out_h, scale)?;
    let centers_x = grid::block_centers::<F>(out_w, scale)?;
    let neighborhood = grid::neighborhood_offsets::<F>(kernel_size)?;

    let num_points = out_h * out_w * neighborhood.len();
    let mut xs = Vec::with_capacity(batch * num_points);
    let mut ys = Vec::with_capacity(batch * num_points);

    for b in 0..batch {
        for (i, &cy) in centers_y.iter().enumerate() {
            for (j, &cx) in centers_x.iter().enumerate() {
                let dx = *offsets_h.get_unchecked([b, i, j, 0]);
                let dy = *offsets_v.get_unchecked([b, i, j, 0]);
                for &(nx, ny) in neighborhood.iter() {
                    xs.push(cx + dx + nx);
                    ys.push(cy + dy + ny);
                }
            }
        }
    }

    Ok((
        Tensor2::from_shape_vec([batch, num_points], xs)?,
        Tensor2::from_shape_vec([batch, num_points], ys)?,
    ))
}

/// Downsample a batch of images with per-pixel kernels and sub-pixel offsets.
///
/// For output pixel `(i, j)` the neighborhood is centered at
/// `(j * scale + 0.5 * scale - 0.5 + offsets_h, i * scale + 0.5 * scale - 0.5 + offsets_v)`
/// in source pixel coordinates. Its `kernel_size²` slots are sampled bilinearly (with border
/// clamping, see [`bilinear_sample`]), weighted by `kernels` and summed. The result is scaled
/// by 255 and soft rounded with `params.alpha`.
///
/// Kernel weights are not required to sum to one unless `params.kernel_sum_tolerance` is set.
/// The output is neither clamped to `[0, 255]` nor cast to an integer type.
///
/// # Arguments
///
/// * `image` - The source images with shape (batch, channels, height, width).
/// * `kernels` - The blending weights with shape (batch, kernel_size², out_h, out_w).
/// * `offsets_h` - The horizontal offsets with shape (batch, 1, out_h, out_w).
/// * `offsets_v` - The vertical offsets with shape (batch, 1, out_h, out_w).
/// * `params` - The operator parameters.
///
/// # Returns
///
/// The downsampled images with shape (batch, out_h, out_w, channels), channel-last.
///
/// # Errors
///
/// * [`DownsampleError::InvalidParameter`] for a zero scale or kernel size, or a non-finite
///   alpha or tolerance.
/// * [`DownsampleError::InvalidImageSize`] if the image is smaller than one block.
/// * [`DownsampleError::ShapeMismatch`] if the kernel or offset fields have the wrong shape.
/// * [`DownsampleError::KernelNotNormalized`] if the sum check is enabled and fails.
/// * [`DownsampleError::InvalidCoordinate`] if an offset is NaN.
pub fn apply_kernels<F>(
    image: &Tensor4<F>,
    kernels: &Tensor4<F>,
    offsets_h: &Tensor4<F>,
    offsets_v: &Tensor4<F>,
    params: &KernelApplyParams<F>,
) -> Result<Tensor4<F>, DownsampleError>
where
    F: Float + FloatConst + Send + Sync,
{
    params.validate()?;

    let (scale, kernel_size) = (params.scale, params.kernel_size);
    let [batch, channels, height, width] = image.shape;
    let (out_h, out_w) = output_size(height, width, scale)?;
    let k2 = kernel_size * kernel_size;

    if height % scale != 0 || width % scale != 0 {
        log::warn!(
            "image size {height}x{width} is not divisible by scale {scale}, \
             trailing rows/columns produce no output pixels"
        );
    }

    check_shape([batch, k2, out_h, out_w], kernels.shape)?;
    check_shape([batch, 1, out_h, out_w], offsets_h.shape)?;
    check_shape([batch, 1, out_h, out_w], offsets_v.shape)?;

    log::debug!(
        "applying {kernel_size}x{kernel_size} kernels: {:?} -> {:?}",
        image.shape,
        [batch, out_h, out_w, channels]
    );

    // move the per-pixel vectors to the innermost dimension
    let image = image.permute_axes([0, 2, 3, 1])?;
    let kernels = kernels.permute_axes([0, 2, 3, 1])?;
    let offsets_h = offsets_h.permute_axes([0, 2, 3, 1])?;
    let offsets_v = offsets_v.permute_axes([0, 2, 3, 1])?;

    if let Some(tolerance) = params.kernel_sum_tolerance {
        check_kernel_sums(&kernels, tolerance)?;
    }

    let (xs, ys) = sample_coordinates(&offsets_h, &offsets_v, scale, kernel_size)?;

    let samples = bilinear_sample::<F, i64>(&image, &xs, &ys, params.strategy)?.reshape([
        batch,
        out_h,
        out_w,
        k2,
        channels,
    ])?;

    let (weights, samples) = (kernels.as_slice(), samples.as_slice());
    let to_8bit: F = cast(255.0f64)?;
    let alpha = params.alpha;

    let mut out = vec![F::zero(); batch * out_h * out_w * channels];

    if channels > 0 {
        parallel::for_each_chunk_mut(&mut out, channels, params.strategy, |p, dst_pixel| {
            let w = &weights[p * k2..(p + 1) * k2];
            let s = &samples[p * k2 * channels..(p + 1) * k2 * channels];
            dst_pixel.iter_mut().enumerate().for_each(|(c, v)| {
                let blended = w
                    .iter()
                    .zip(s.chunks_exact(channels))
                    .fold(F::zero(), |acc, (&wi, px)| acc + wi * px[c]);
                *v = soft_round(blended * to_8bit, alpha);
            });
        });
    }

    Ok(Tensor4::from_shape_vec([batch, out_h, out_w, channels], out)?)
}
