//! ELL (ELLPACK) format (spec §3): a fixed maximum of `E` entries per row,
//! stored column-major as `stride x E` column/value matrices. Rows with
//! fewer than `E` nonzeros are padded with a sentinel column index and a
//! zero value.

use crate::array::Array1;
use crate::errors::{SparseError, SparseResult};
use crate::space::MemorySpace;

use super::shape::Shape;

/// Sentinel column index marking an unused ELL slot.
pub const SENTINEL: isize = -1;

/// ELLPACK-format sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EllMat<V, S: MemorySpace> {
    shape: Shape,
    stride: usize,
    max_row_nnz: usize,
    col_indices: Array1<isize, S>,
    values: Array1<V, S>,
}

impl<V, S: MemorySpace> EllMat<V, S> {
    /// Default-construct: empty, all dimensions zero.
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        EllMat {
            shape: Shape::empty(num_rows, num_cols),
            stride: num_rows,
            max_row_nnz: 0,
            col_indices: Array1::new(),
            values: Array1::new(),
        }
    }

    /// Shape of the matrix.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Leading dimension of the column-major slot matrices (`>= num_rows`).
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Maximum nonzeros stored per row (`E`).
    pub fn max_row_nnz(&self) -> usize {
        self.max_row_nnz
    }

    /// Column index of slot `k` for every row, column-major
    /// (`col_indices[k * stride + row]`); `SENTINEL` marks an unused slot.
    pub fn col_indices(&self) -> &[isize] {
        self.col_indices.as_slice()
    }

    /// Value of slot `k` for every row, column-major.
    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    /// The column index and value stored in row `row`, slot `k`.
    pub fn slot(&self, row: usize, k: usize) -> (isize, V)
    where
        V: Copy,
    {
        let idx = k * self.stride + row;
        (self.col_indices.as_slice()[idx], self.values.as_slice()[idx])
    }

    /// Exchange ownership of the underlying buffers in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.shape, &mut other.shape);
        std::mem::swap(&mut self.stride, &mut other.stride);
        std::mem::swap(&mut self.max_row_nnz, &mut other.max_row_nnz);
        self.col_indices.swap(&mut other.col_indices);
        self.values.swap(&mut other.values);
    }

    /// Verifies spec §3's ELL invariants: `stride >= num_rows`.
    pub fn check_structure(&self) -> SparseResult<()> {
        if self.stride < self.shape.num_rows() {
            return Err(SparseError::InvalidStructure(format!(
                "ELL stride {} is smaller than num_rows {}",
                self.stride,
                self.shape.num_rows()
            )));
        }
        Ok(())
    }
}

impl<V: Copy, S: MemorySpace> EllMat<V, S> {
    /// Shape-and-entry-count construct: allocates `col_indices` (filled
    /// with `SENTINEL`) and `values` (filled with `fill`) at
    /// `stride * max_row_nnz`.
    pub fn with_shape(
        num_rows: usize,
        num_cols: usize,
        max_row_nnz: usize,
        stride: usize,
        fill: V,
    ) -> Self {
        let stride = stride.max(num_rows);
        EllMat {
            shape: Shape::new(num_rows, num_cols, stride * max_row_nnz),
            stride,
            max_row_nnz,
            col_indices: Array1::filled(stride * max_row_nnz, SENTINEL),
            values: Array1::filled(stride * max_row_nnz, fill),
        }
    }

    /// `resize(rows, cols, entries)`: `entries` is interpreted as `E`, the
    /// stride is reset to `rows`, preserving no content.
    pub fn resize(&mut self, num_rows: usize, num_cols: usize, max_row_nnz: usize, fill: V) {
        *self = Self::with_shape(num_rows, num_cols, max_row_nnz, num_rows, fill);
    }

    /// Deep copy into a (possibly different) memory space.
    pub fn to_space<S2: MemorySpace>(&self) -> EllMat<V, S2> {
        EllMat {
            shape: self.shape,
            stride: self.stride,
            max_row_nnz: self.max_row_nnz,
            col_indices: self.col_indices.to_space(),
            values: self.values.to_space(),
        }
    }

    /// Construct directly from raw ELL arrays, checking the structural
    /// invariants.
    pub fn from_raw(
        num_rows: usize,
        num_cols: usize,
        stride: usize,
        max_row_nnz: usize,
        col_indices: Vec<isize>,
        values: Vec<V>,
    ) -> SparseResult<Self> {
        if col_indices.len() != stride * max_row_nnz || values.len() != stride * max_row_nnz {
            return Err(SparseError::InvalidStructure(
                "ELL arrays must have length stride * max_row_nnz".into(),
            ));
        }
        let m = EllMat {
            shape: Shape::new(num_rows, num_cols, stride * max_row_nnz),
            stride,
            max_row_nnz,
            col_indices: Array1::from_vec(col_indices),
            values: Array1::from_vec(values),
        };
        m.check_structure()?;
        Ok(m)
    }
}
