use num_traits::{Float, FloatConst};
use pixdown_imgproc::{
    downsample::{output_size, KernelApply, KernelApplyGrad, KernelApplyInput},
    DownsampleError, Function,
};
use pixdown_tensor::Tensor4;

use crate::config::DownsamplerConfig;

/// Stateless module wrapping the kernel applicator with a fixed configuration.
///
/// The downsampler supports forward evaluation only. Gradient evaluation through
/// [`Function::backward`] fails with [`DownsampleError::UnsupportedOperation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Downsampler<F = f32> {
    config: DownsamplerConfig,
    op: KernelApply<F>,
}

impl<F: Float> Downsampler<F> {
    /// Create a new downsampler, validating the configuration.
    pub fn new(config: DownsamplerConfig) -> Result<Self, DownsampleError> {
        let op = KernelApply::new(config.to_params()?)?;
        log::debug!("created downsampler with {config:?}");
        Ok(Self { config, op })
    }

    /// The configuration of the downsampler.
    pub fn config(&self) -> &DownsamplerConfig {
        &self.config
    }

    /// The output resolution `(height, width)` for a source image of the given size.
    pub fn output_size(
        &self,
        height: usize,
        width: usize,
    ) -> Result<(usize, usize), DownsampleError> {
        output_size(height, width, self.config.scale)
    }
}

impl<F: Float> Default for Downsampler<F> {
    fn default() -> Self {
        Self {
            config: DownsamplerConfig::default(),
            op: KernelApply::default(),
        }
    }
}

impl<F> Downsampler<F>
where
    F: Float + FloatConst + Send + Sync,
{
    /// Downsample a batch of images.
    ///
    /// # Arguments
    ///
    /// * `image` - The source images with shape (batch, channels, height, width).
    /// * `kernels` - The blending weights with shape (batch, kernel_size², out_h, out_w).
    /// * `offsets_h` - The horizontal offsets with shape (batch, 1, out_h, out_w).
    /// * `offsets_v` - The vertical offsets with shape (batch, 1, out_h, out_w).
    ///
    /// # Returns
    ///
    /// The downsampled images with shape (batch, out_h, out_w, channels), scaled to
    /// `[0, 255]` and soft rounded.
    pub fn downsample(
        &self,
        image: &Tensor4<F>,
        kernels: &Tensor4<F>,
        offsets_h: &Tensor4<F>,
        offsets_v: &Tensor4<F>,
    ) -> Result<Tensor4<F>, DownsampleError> {
        pixdown_imgproc::downsample::apply_kernels(
            image,
            kernels,
            offsets_h,
            offsets_v,
            self.op.params(),
        )
    }
}

impl<F> Function for Downsampler<F>
where
    F: Float + FloatConst + Send + Sync,
{
    type Input = KernelApplyInput<F>;
    type Output = Tensor4<F>;
    type Gradient = KernelApplyGrad<F>;

    fn forward(&self, input: &Self::Input) -> Result<Self::Output, DownsampleError> {
        self.op.forward(input)
    }

    fn backward(&self, grad_output: &Self::Output) -> Result<Self::Gradient, DownsampleError> {
        self.op.backward(grad_output)
    }

    fn supports_backward(&self) -> bool {
        self.op.supports_backward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_default_config() -> Result<(), DownsampleError> {
        let a = Downsampler::<f32>::default();
        let b = Downsampler::<f32>::new(DownsamplerConfig::default())?;
        assert_eq!(a, b);
        assert_eq!(a.config().scale, 2);
        assert_eq!(a.output_size(64, 48)?, (32, 24));
        Ok(())
    }

    #[test]
    fn rejects_invalid_config() {
        let config = DownsamplerConfig {
            kernel_size: 0,
            ..Default::default()
        };
        assert!(Downsampler::<f64>::new(config).is_err());
    }

    #[test]
    fn gradient_is_unsupported() {
        let downsampler = Downsampler::<f32>::default();
        assert!(!downsampler.supports_backward());
        let grad = Tensor4::zeros([1, 2, 2, 3]);
        let res = downsampler.backward(&grad);
        assert!(matches!(
            res,
            Err(DownsampleError::UnsupportedOperation { .. })
        ));
    }
}
