//! Kernel-guided downsampling.
//!
//! Every output pixel blends a `kernel_size × kernel_size` neighborhood of bilinear samples
//! placed around the center of the source block it covers, shifted by a per-pixel sub-pixel
//! offset. The blended value is scaled to the 8-bit range and passed through a soft rounding
//! step that keeps the result differentiable.

mod kernel_apply;
mod softround;

pub use kernel_apply::{
    apply_kernels, output_size, KernelApply, KernelApplyGrad, KernelApplyInput,
    KernelApplyParams,
};
pub use softround::{soft_round, soft_round_tensor};
