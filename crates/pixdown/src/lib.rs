#![deny(missing_docs)]
//! Kernel-guided differentiable image downsampling.
//!
//! The [`Downsampler`] turns a batch of high-resolution images into low-resolution ones by
//! sampling, for every output pixel, a small neighborhood around the center of the source
//! block it covers, shifted by a learned sub-pixel offset, and blending the samples with a
//! learned per-pixel kernel.
//!
//! ```rust
//! use pixdown::{tensor::Tensor4, Downsampler, DownsamplerConfig};
//!
//! let downsampler = Downsampler::<f32>::new(DownsamplerConfig::default()).unwrap();
//!
//! let image = Tensor4::from_shape_val([1, 3, 8, 8], 0.5f32);
//! let kernels = Tensor4::from_shape_val([1, 9, 4, 4], 1.0 / 9.0);
//! let offsets = Tensor4::zeros([1, 1, 4, 4]);
//!
//! let out = downsampler.downsample(&image, &kernels, &offsets, &offsets).unwrap();
//! assert_eq!(out.shape, [1, 4, 4, 3]);
//! ```

/// Downsampler configuration.
pub mod config;

/// The downsampling module wrapper.
pub mod downsampler;

/// Error types for configuration handling.
pub mod error;

#[doc(inline)]
pub use pixdown_tensor as tensor;

#[doc(inline)]
pub use pixdown_imgproc as imgproc;

pub use config::DownsamplerConfig;
pub use downsampler::Downsampler;
pub use error::ConfigError;
