use crate::Error;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Holds a dense array of small matrices at every quadrature point of every element
///
/// The shape is `[n_el, n_qp, nrow, ncol]` and the data is stored in row-major order,
/// i.e., the block of quadrature point `q` of element `e` is contiguous.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QpArray {
    /// The shape `[n_el, n_qp, nrow, ncol]`
    shape: [usize; 4],

    /// All values
    data: Vec<f64>,
}

impl QpArray {
    /// Allocates a new zero-filled instance
    pub fn new(shape: [usize; 4]) -> Self {
        QpArray {
            shape,
            data: vec![0.0; shape.iter().product()],
        }
    }

    /// Allocates a new instance from existing data
    pub fn from_data(shape: [usize; 4], data: Vec<f64>) -> Result<Self, Error> {
        let len: usize = shape.iter().product();
        if data.len() != len {
            return Err(Error::ShapeMismatch(format!(
                "data length {} is incompatible with shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(QpArray { shape, data })
    }

    /// Returns the shape `[n_el, n_qp, nrow, ncol]`
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Returns the number of elements
    pub fn n_el(&self) -> usize {
        self.shape[0]
    }

    /// Returns the number of quadrature points per element
    pub fn n_qp(&self) -> usize {
        self.shape[1]
    }

    /// Returns the number of rows of each block
    pub fn nrow(&self) -> usize {
        self.shape[2]
    }

    /// Returns the number of columns of each block
    pub fn ncol(&self) -> usize {
        self.shape[3]
    }

    /// Returns the number of values in one quadrature-point block
    pub fn block_len(&self) -> usize {
        self.shape[2] * self.shape[3]
    }

    /// Returns the number of values of one element
    pub fn cell_len(&self) -> usize {
        self.shape[1] * self.block_len()
    }

    /// Returns a value
    ///
    /// # Panics
    ///
    /// A panic will occur if the indices are out of range.
    #[inline]
    pub fn get(&self, e: usize, q: usize, i: usize, j: usize) -> f64 {
        self.data[self.offset(e, q, i, j)]
    }

    /// Sets a value
    ///
    /// # Panics
    ///
    /// A panic will occur if the indices are out of range.
    #[inline]
    pub fn set(&mut self, e: usize, q: usize, i: usize, j: usize, value: f64) {
        let k = self.offset(e, q, i, j);
        self.data[k] = value;
    }

    /// Returns the (nrow × ncol, row-major) block of a quadrature point
    pub fn block(&self, e: usize, q: usize) -> &[f64] {
        let len = self.block_len();
        let start = (e * self.shape[1] + q) * len;
        &self.data[start..start + len]
    }

    /// Returns the mutable block of a quadrature point
    pub fn block_mut(&mut self, e: usize, q: usize) -> &mut [f64] {
        let len = self.block_len();
        let start = (e * self.shape[1] + q) * len;
        &mut self.data[start..start + len]
    }

    /// Returns access to all values
    pub fn as_data(&self) -> &[f64] {
        &self.data
    }

    /// Returns mutable access to all values
    pub fn as_mut_data(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Sets all values to the same number
    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Runs a function over the values of each element
    ///
    /// The function receives the element index and the `n_qp × nrow × ncol` values of
    /// that element. With `parallel = true` the elements are processed by the rayon pool.
    pub fn for_each_cell_mut<F>(&mut self, parallel: bool, f: F) -> Result<(), Error>
    where
        F: Fn(usize, &mut [f64]) -> Result<(), Error> + Send + Sync,
    {
        let chunk = self.cell_len();
        if chunk == 0 {
            return Ok(());
        }
        if parallel {
            self.data
                .par_chunks_mut(chunk)
                .enumerate()
                .map(|(e, cell)| f(e, cell))
                .collect()
        } else {
            self.data
                .chunks_mut(chunk)
                .enumerate()
                .map(|(e, cell)| f(e, cell))
                .collect()
        }
    }

    #[inline]
    fn offset(&self, e: usize, q: usize, i: usize, j: usize) -> usize {
        ((e * self.shape[1] + q) * self.shape[2] + i) * self.shape[3] + j
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
