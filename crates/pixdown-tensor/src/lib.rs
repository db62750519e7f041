#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `pixdown-tensor` provides the owned, row-major tensor type used to pass images,
//! kernel fields and offset fields through the downsampling operators.
//!
//! ```rust
//! use pixdown_tensor::Tensor2;
//!
//! let t = Tensor2::<f32>::from_shape_vec([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(t.get([1, 2]), Some(&6.0));
//!
//! // swap the two axes, materializing a new contiguous tensor
//! let tt = t.permute_axes([1, 0]).unwrap();
//! assert_eq!(tt.shape, [3, 2]);
//! assert_eq!(tt.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
//! ```

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

pub use crate::tensor::{get_strides_from_shape, Tensor, TensorError};

/// Type alias for a 1-dimensional tensor.
pub type Tensor1<T> = Tensor<T, 1>;

/// Type alias for a 2-dimensional tensor.
pub type Tensor2<T> = Tensor<T, 2>;

/// Type alias for a 3-dimensional tensor.
pub type Tensor3<T> = Tensor<T, 3>;

/// Type alias for a 4-dimensional tensor.
pub type Tensor4<T> = Tensor<T, 4>;

/// Type alias for a 5-dimensional tensor.
pub type Tensor5<T> = Tensor<T, 5>;
