//! Dense row-major `f32` tensors.

use smallvec::SmallVec;

use crate::error::ObsError;

/// Tensor dimensions, outermost first.
///
/// Uses `SmallVec<[usize; 4]>` so the shapes produced by every encoder
/// (at most three axes) stay on the stack.
pub type Shape = SmallVec<[usize; 4]>;

/// A dense, row-major `f32` tensor.
///
/// # Examples
///
/// ```
/// use lanesight_core::Tensor;
///
/// let mut t = Tensor::zeros(&[2, 3]);
/// t.set(&[1, 2], 5.0);
/// assert_eq!(t.get(&[1, 2]), Some(5.0));
/// assert_eq!(t.row(1), &[0.0, 0.0, 5.0]);
/// assert_eq!(t.len(), 6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// A zero-filled tensor of the given shape.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// A tensor of the given shape with every element set to `value`.
    pub fn full(shape: &[usize], value: f32) -> Self {
        let len = shape.iter().product();
        Self {
            shape: Shape::from_slice(shape),
            data: vec![value; len],
        }
    }

    /// Wrap an existing buffer.
    ///
    /// # Errors
    ///
    /// [`ObsError::ExecutionFailed`] if `data.len()` is not the product
    /// of `shape`.
    pub fn from_vec(shape: &[usize], data: Vec<f32>) -> Result<Self, ObsError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(ObsError::execution(format!(
                "tensor data has {} elements, shape {shape:?} requires {expected}",
                data.len()
            )));
        }
        Ok(Self {
            shape: Shape::from_slice(shape),
            data,
        })
    }

    /// A 1-D tensor holding `data`.
    pub fn vector(data: Vec<f32>) -> Self {
        Self {
            shape: Shape::from_slice(&[data.len()]),
            data,
        }
    }

    /// Tensor dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Flat row-major mutable view.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the tensor, returning its flat buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Flat offset of a multi-index, or `None` if any axis is out of range.
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&i, &dim) in index.iter().zip(self.shape.iter()) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        Some(offset)
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        self.offset(index).map(|o| self.data[o])
    }

    /// Set the element at a multi-index. Out-of-range indices are ignored
    /// and reported by the return value.
    pub fn set(&mut self, index: &[usize], value: f32) -> bool {
        match self.offset(index) {
            Some(o) => {
                self.data[o] = value;
                true
            }
            None => false,
        }
    }

    /// Number of elements spanned by one step along the first axis.
    fn row_len(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    /// The `i`-th slice along the first axis.
    ///
    /// # Panics
    ///
    /// If `i` is out of range of the first axis.
    pub fn row(&self, i: usize) -> &[f32] {
        let n = self.row_len();
        &self.data[i * n..(i + 1) * n]
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Clamp every element into `[low, high]`.
    pub fn clip(&mut self, low: f32, high: f32) {
        for v in &mut self.data {
            *v = v.clamp(low, high);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_vec_checks_length() {
        assert!(Tensor::from_vec(&[2, 2], vec![0.0; 3]).is_err());
        assert!(Tensor::from_vec(&[2, 2], vec![0.0; 4]).is_ok());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut t = Tensor::zeros(&[2, 2]);
        assert_eq!(t.get(&[2, 0]), None);
        assert_eq!(t.get(&[0]), None);
        assert!(!t.set(&[0, 2], 1.0));
        assert!(t.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_sized_axis() {
        let t = Tensor::zeros(&[0, 5]);
        assert!(t.is_empty());
        assert_eq!(t.shape(), &[0, 5]);
    }

    #[test]
    fn clip_bounds_values() {
        let mut t = Tensor::vector(vec![-3.0, 0.5, 2.0]);
        t.clip(-1.0, 1.0);
        assert_eq!(t.as_slice(), &[-1.0, 0.5, 1.0]);
    }

    proptest! {
        #[test]
        fn offset_is_row_major(a in 1usize..5, b in 1usize..5, c in 1usize..5) {
            let t = Tensor::zeros(&[a, b, c]);
            let mut expected = 0;
            for i in 0..a {
                for j in 0..b {
                    for k in 0..c {
                        prop_assert_eq!(t.offset(&[i, j, k]), Some(expected));
                        expected += 1;
                    }
                }
            }
        }
    }
}
