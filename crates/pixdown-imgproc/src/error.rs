use pixdown_tensor::TensorError;
use thiserror::Error;

/// An error type for the sampling and downsampling operators.
#[derive(Error, Debug, PartialEq)]
pub enum DownsampleError {
    /// Input tensors have incompatible shapes.
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// The operation is not available for this operator.
    #[error("Unsupported operation: {operation} - {reason}")]
    UnsupportedOperation {
        /// Name of the operation that failed
        operation: String,
        /// Reason why the operation is not supported
        reason: String,
    },

    /// A configuration parameter is out of its valid range.
    #[error("Invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// The image is too small to produce any output pixel.
    #[error("Invalid image size ({0}x{1})")]
    InvalidImageSize(usize, usize),

    /// A sample coordinate is NaN.
    #[error("Sample coordinate at flat index {index} is not a number")]
    InvalidCoordinate {
        /// Flat index of the coordinate in the (batch, N) layout
        index: usize,
    },

    /// The kernel weights of one output pixel do not sum to one.
    #[error("Kernel weights at (batch {batch}, row {row}, col {col}) sum to {sum}")]
    KernelNotNormalized {
        /// Batch element
        batch: usize,
        /// Output row
        row: usize,
        /// Output column
        col: usize,
        /// Actual sum of the weights
        sum: f64,
    },

    /// A numeric conversion between index and floating point types failed.
    #[error("Numeric cast failed: {0}")]
    CastError(String),

    /// Tensor error
    #[error(transparent)]
    TensorError(#[from] TensorError),
}

impl DownsampleError {
    /// Creates an UnsupportedOperation error with context.
    pub fn unsupported_operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Creates a ShapeMismatch error from two shapes.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch(expected.to_vec(), actual.to_vec())
    }
}

/// Cast between primitive numeric types, reporting failures as [`DownsampleError::CastError`].
pub(crate) fn cast<T, U>(value: U) -> Result<T, DownsampleError>
where
    T: num_traits::NumCast,
    U: num_traits::ToPrimitive,
{
    T::from(value).ok_or_else(|| {
        DownsampleError::CastError(format!(
            "{} value cannot be represented as {}",
            std::any::type_name::<U>(),
            std::any::type_name::<T>()
        ))
    })
}
