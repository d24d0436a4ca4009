//! DIA (diagonal) format (spec §3): a set of occupied diagonal offsets
//! plus a dense, column-major `stride x D` value matrix. Off-matrix
//! padding positions carry an explicit zero and are ignored by SpMV.

use crate::array::Array1;
use crate::errors::{SparseError, SparseResult};
use crate::space::MemorySpace;

use super::shape::Shape;

/// Diagonal-format sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaMat<V, S: MemorySpace> {
    shape: Shape,
    stride: usize,
    diagonal_offsets: Array1<isize, S>,
    values: Array1<V, S>,
}

impl<V, S: MemorySpace> DiaMat<V, S> {
    /// Default-construct: empty, all dimensions zero.
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        DiaMat {
            shape: Shape::empty(num_rows, num_cols),
            stride: num_rows,
            diagonal_offsets: Array1::new(),
            values: Array1::new(),
        }
    }

    /// Shape of the matrix.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Leading dimension of the column-major value matrix (`>= num_rows`).
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The occupied diagonal offsets, unique and sorted ascending.
    pub fn diagonal_offsets(&self) -> &[isize] {
        self.diagonal_offsets.as_slice()
    }

    /// Number of occupied diagonals (`D`).
    pub fn num_diagonals(&self) -> usize {
        self.diagonal_offsets.len()
    }

    /// Dense `stride x D` value matrix, column-major over diagonals.
    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    /// The stored value at row `row` for the `k`-th diagonal (column-major:
    /// `values[k * stride + row]`).
    pub fn value_at(&self, row: usize, k: usize) -> V
    where
        V: Copy,
    {
        self.values.as_slice()[k * self.stride + row]
    }

    /// Exchange ownership of the underlying buffers in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.shape, &mut other.shape);
        std::mem::swap(&mut self.stride, &mut other.stride);
        self.diagonal_offsets.swap(&mut other.diagonal_offsets);
        self.values.swap(&mut other.values);
    }

    /// Verifies spec §3's DIA invariants: offsets unique and sorted,
    /// `stride >= num_rows`.
    pub fn check_structure(&self) -> SparseResult<()> {
        let offsets = self.diagonal_offsets.as_slice();
        if self.stride < self.shape.num_rows() {
            return Err(SparseError::InvalidStructure(format!(
                "DIA stride {} is smaller than num_rows {}",
                self.stride,
                self.shape.num_rows()
            )));
        }
        if !offsets.windows(2).all(|w| w[0] < w[1]) {
            return Err(SparseError::InvalidStructure(
                "DIA diagonal_offsets must be unique and sorted ascending".into(),
            ));
        }
        Ok(())
    }
}

impl<V: Copy, S: MemorySpace> DiaMat<V, S> {
    /// Shape-and-entry-count construct: allocates `values` at
    /// `stride * num_diagonals`, filled with `fill` (normally zero), and
    /// `diagonal_offsets` sized `num_diagonals` (caller populates the
    /// offsets).
    pub fn with_shape(
        num_rows: usize,
        num_cols: usize,
        num_diagonals: usize,
        stride: usize,
        fill: V,
    ) -> Self {
        let stride = stride.max(num_rows);
        DiaMat {
            shape: Shape::new(num_rows, num_cols, stride * num_diagonals),
            stride,
            diagonal_offsets: Array1::filled(num_diagonals, 0),
            values: Array1::filled(stride * num_diagonals, fill),
        }
    }

    /// `resize(rows, cols, entries)`. `entries` here is interpreted as a
    /// diagonal count; the stride is reset to `rows`, preserving no
    /// content.
    pub fn resize(&mut self, num_rows: usize, num_cols: usize, num_diagonals: usize, fill: V) {
        *self = Self::with_shape(num_rows, num_cols, num_diagonals, num_rows, fill);
    }

    /// Deep copy into a (possibly different) memory space.
    pub fn to_space<S2: MemorySpace>(&self) -> DiaMat<V, S2> {
        DiaMat {
            shape: self.shape,
            stride: self.stride,
            diagonal_offsets: self.diagonal_offsets.to_space(),
            values: self.values.to_space(),
        }
    }

    /// Construct directly from raw DIA arrays, checking the structural
    /// invariants.
    pub fn from_raw(
        num_rows: usize,
        num_cols: usize,
        stride: usize,
        diagonal_offsets: Vec<isize>,
        values: Vec<V>,
    ) -> SparseResult<Self> {
        let num_entries = values.len();
        let m = DiaMat {
            shape: Shape::new(num_rows, num_cols, num_entries),
            stride,
            diagonal_offsets: Array1::from_vec(diagonal_offsets),
            values: Array1::from_vec(values),
        };
        m.check_structure()?;
        Ok(m)
    }
}
