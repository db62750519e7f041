#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// kernel-guided downsampling module.
pub mod downsample;

/// error types for the image processing operators.
pub mod error;

/// forward / backward contract of the operators.
pub mod function;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

pub use error::DownsampleError;
pub use function::Function;
