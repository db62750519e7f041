//! Pixel interpolation methods for kernel-guided resampling.
//!
//! - **Bilinear**: four-corner areal interpolation with border clamping, evaluated for
//!   a whole batch of coordinates at once.
//! - **Grid**: the sampling geometry (block centers and kernel neighborhoods) used by
//!   the downsampling operators.

mod bilinear;

/// Sampling grid generation utilities.
pub mod grid;

pub use bilinear::bilinear_sample;
