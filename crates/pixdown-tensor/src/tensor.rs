use thiserror::Error;

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// Tensor shape does not match the provided data.
    ///
    /// The product of the shape dimensions must equal the number of elements.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds tensor bounds.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: usize,
        /// The size of the dimension being indexed
        size: usize,
    },

    /// The axes passed to a permutation are not a permutation of `0..N`.
    #[error("Invalid axes for permutation: {0:?}")]
    InvalidAxes(Vec<usize>),
}

impl TensorError {
    /// Creates an InvalidShape error with clear context.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error with clear context.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }
}

/// Computes the strides for a row-major (C-contiguous) tensor layout.
///
/// The rightmost dimension has stride 1, and each dimension's stride is the product
/// of all dimensions to its right.
///
/// # Examples
///
/// ```rust
/// use pixdown_tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3]), [3, 1]);
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// A multi-dimensional array (tensor) with owned, contiguous data.
///
/// Data is always stored in row-major order, so `strides` is fully determined by
/// `shape`. Layout-changing operations such as [`Tensor::permute_axes`] materialize
/// a new tensor instead of returning a strided view.
///
/// # Type Parameters
///
/// * `T` - The element type stored in the tensor
/// * `N` - The number of dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T, const N: usize> {
    /// The storage of the tensor.
    pub storage: Vec<T>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// The strides of the tensor data in memory.
    pub strides: [usize; N],
}

impl<T, const N: usize> Tensor<T, N> {
    /// Get the data of the tensor as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// Get the data of the tensor as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.storage
    }

    /// Consumes the tensor and returns the underlying vector.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.storage
    }

    /// Creates a new tensor with the given shape and data.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the number of elements in `data`
    /// does not match the product of `shape`.
    ///
    /// # Example
    ///
    /// ```
    /// use pixdown_tensor::Tensor2;
    ///
    /// let t = Tensor2::<u8>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(t.strides, [2, 1]);
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }

        Ok(Self {
            storage: data,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Creates a new tensor with the given shape, copying the data from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the slice length does not match the shape.
    pub fn from_shape_slice(shape: [usize; N], data: &[T]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec())
    }

    /// Creates a new tensor with every element set to `value`.
    pub fn from_shape_val(shape: [usize; N], value: T) -> Self
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self {
            storage: vec![value; numel],
            shape,
            strides: get_strides_from_shape(shape),
        }
    }

    /// Creates a new tensor by evaluating `f` at every index, in row-major order.
    ///
    /// # Example
    ///
    /// ```
    /// use pixdown_tensor::Tensor2;
    ///
    /// let eye = Tensor2::<f32>::from_shape_fn([2, 2], |[i, j]| if i == j { 1.0 } else { 0.0 });
    /// assert_eq!(eye.as_slice(), &[1.0, 0.0, 0.0, 1.0]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Self
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let strides = get_strides_from_shape(shape);
        let storage = (0..numel)
            .map(|offset| f(unravel_index(offset, shape, strides)))
            .collect();

        Self {
            storage,
            shape,
            strides,
        }
    }

    /// Create a new tensor with all elements set to zero.
    pub fn zeros(shape: [usize; N]) -> Self
    where
        T: Clone + num_traits::Zero,
    {
        Self::from_shape_val(shape, T::zero())
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Get the offset of the element at the given index, or `None` if out of bounds.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, &dim_size), &stride) in index.iter().zip(self.shape.iter()).zip(&self.strides)
        {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the offset of the element at the given index without bounds checking.
    #[inline]
    pub fn get_iter_offset_unchecked(&self, index: [usize; N]) -> usize {
        index
            .iter()
            .zip(self.strides.iter())
            .fold(0, |acc, (&idx, &stride)| acc + idx * stride)
    }

    /// Get the index of the element at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::IndexOutOfBounds`] if the offset is past the end.
    pub fn get_index(&self, offset: usize) -> Result<[usize; N], TensorError> {
        if offset >= self.numel() {
            return Err(TensorError::index_out_of_bounds(offset, self.numel()));
        }
        Ok(unravel_index(offset, self.shape, self.strides))
    }

    /// Get the element at the given index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    pub fn get_unchecked(&self, index: [usize; N]) -> &T {
        &self.storage[self.get_iter_offset_unchecked(index)]
    }

    /// Get the element at the given index, or `None` if out of bounds.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index)
            .and_then(|offset| self.storage.get(offset))
    }

    /// Reshape the tensor to a new shape with the same number of elements.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the element count differs.
    ///
    /// # Example
    ///
    /// ```
    /// use pixdown_tensor::Tensor1;
    ///
    /// let t = Tensor1::<u8>::from_shape_vec([4], vec![1, 2, 3, 4]).unwrap();
    /// let t2 = t.reshape([2, 2]).unwrap();
    /// assert_eq!(t2.shape, [2, 2]);
    /// assert_eq!(t2.strides, [2, 1]);
    /// ```
    pub fn reshape<const M: usize>(self, shape: [usize; M]) -> Result<Tensor<T, M>, TensorError> {
        Tensor::from_shape_vec(shape, self.storage)
    }

    /// Permutes (reorders) the dimensions of the tensor.
    ///
    /// `axes[i]` names the source dimension that becomes the i-th output dimension.
    /// The result is a new contiguous tensor.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidAxes`] if `axes` is not a permutation of `0..N`.
    pub fn permute_axes(&self, axes: [usize; N]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let mut seen = [false; N];
        for &axis in axes.iter() {
            if axis >= N || seen[axis] {
                return Err(TensorError::InvalidAxes(axes.to_vec()));
            }
            seen[axis] = true;
        }

        let mut new_shape = [0; N];
        let mut src_strides = [0; N];
        for (i, &axis) in axes.iter().enumerate() {
            new_shape[i] = self.shape[axis];
            src_strides[i] = self.strides[axis];
        }

        let new_strides = get_strides_from_shape(new_shape);
        let storage = (0..self.numel())
            .map(|offset| {
                let index = unravel_index(offset, new_shape, new_strides);
                let src = index
                    .iter()
                    .zip(src_strides.iter())
                    .fold(0, |acc, (&idx, &stride)| acc + idx * stride);
                self.storage[src].clone()
            })
            .collect();

        Ok(Self {
            storage,
            shape: new_shape,
            strides: new_strides,
        })
    }

    /// Apply a function to each element of the tensor.
    ///
    /// # Example
    ///
    /// ```
    /// use pixdown_tensor::Tensor1;
    ///
    /// let t = Tensor1::<u8>::from_shape_vec([4], vec![1, 2, 3, 4]).unwrap();
    /// let t2 = t.map(|x| *x + 1);
    /// assert_eq!(t2.as_slice(), &[2, 3, 4, 5]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> Tensor<U, N>
    where
        F: Fn(&T) -> U,
    {
        Tensor {
            storage: self.storage.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }
}

fn unravel_index<const N: usize>(
    mut offset: usize,
    shape: [usize; N],
    strides: [usize; N],
) -> [usize; N] {
    let mut index = [0; N];
    for i in 0..N {
        debug_assert!(shape[i] > 0);
        index[i] = offset / strides[i];
        offset %= strides[i];
    }
    index
}
