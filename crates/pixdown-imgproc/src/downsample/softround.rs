use num_traits::{Float, FloatConst};
use pixdown_tensor::Tensor;

/// Differentiable approximation of rounding.
///
/// `soft_round(x) = x - alpha * sin(2πx) / (2π)`. The correction pulls values towards the
/// nearest integer while keeping a non-zero gradient almost everywhere. For `alpha = 1` the
/// result deviates from `x` by at most `1 / (2π)`. Integers are fixed points and are returned
/// unchanged.
///
/// # Arguments
///
/// * `x` - The value to round.
/// * `alpha` - The sharpness of the correction. `0` disables it.
pub fn soft_round<F: Float + FloatConst>(x: F, alpha: F) -> F {
    if x.fract() == F::zero() {
        return x;
    }
    let two_pi = F::PI() + F::PI();
    x - alpha * (two_pi * x).sin() / two_pi
}

/// Apply [`soft_round`] to every element of a tensor.
pub fn soft_round_tensor<F, const N: usize>(tensor: &Tensor<F, N>, alpha: F) -> Tensor<F, N>
where
    F: Float + FloatConst,
{
    tensor.map(|&x| soft_round(x, alpha))
}
