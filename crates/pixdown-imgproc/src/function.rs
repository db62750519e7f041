use crate::error::DownsampleError;

/// An operator with a forward transform and an optional gradient transform.
///
/// Operators that cannot be differentiated still implement [`Function::backward`], returning
/// [`DownsampleError::UnsupportedOperation`]. They must never return zeros or an approximate
/// gradient instead.
pub trait Function {
    /// The inputs consumed by the forward transform.
    type Input;
    /// The result of the forward transform, also the shape of the incoming gradient.
    type Output;
    /// The gradients with respect to the inputs.
    type Gradient;

    /// Evaluate the operator.
    fn forward(&self, input: &Self::Input) -> Result<Self::Output, DownsampleError>;

    /// Propagate `grad_output` back to the inputs.
    fn backward(&self, grad_output: &Self::Output) -> Result<Self::Gradient, DownsampleError>;

    /// Whether [`Function::backward`] is implemented.
    fn supports_backward(&self) -> bool {
        true
    }
}
