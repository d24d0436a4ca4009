//! COO (coordinate) format (spec §3): parallel arrays of row index, column
//! index and value, sorted lexicographically by `(row, column)` with no
//! duplicate pairs.

use num_traits::Zero;

use crate::array::Array1;
use crate::errors::{SparseError, SparseResult};
use crate::space::MemorySpace;

use super::shape::Shape;

/// Coordinate-format sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CooMat<V, S: MemorySpace> {
    shape: Shape,
    row_indices: Array1<usize, S>,
    col_indices: Array1<usize, S>,
    values: Array1<V, S>,
}

impl<V, S: MemorySpace> CooMat<V, S> {
    /// Default-construct: empty, all dimensions zero.
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        CooMat {
            shape: Shape::empty(num_rows, num_cols),
            row_indices: Array1::new(),
            col_indices: Array1::new(),
            values: Array1::new(),
        }
    }

    /// Shape of the matrix.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Row index of each stored entry, in storage order.
    pub fn row_indices(&self) -> &[usize] {
        self.row_indices.as_slice()
    }

    /// Column index of each stored entry, in storage order.
    pub fn col_indices(&self) -> &[usize] {
        self.col_indices.as_slice()
    }

    /// Value of each stored entry, in storage order.
    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    /// Exchange ownership of the underlying buffers in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.shape, &mut other.shape);
        self.row_indices.swap(&mut other.row_indices);
        self.col_indices.swap(&mut other.col_indices);
        self.values.swap(&mut other.values);
    }
}

impl<V: Copy, S: MemorySpace> CooMat<V, S> {
    /// Shape-and-entry-count construct: allocates the three parallel
    /// arrays at length `num_entries`, content unspecified (zeroed index
    /// `0`, `fill` value). Callers are expected to populate via
    /// [`CooMat::from_triplets`] or direct slice access before relying on
    /// the structural invariants.
    pub fn with_shape(num_rows: usize, num_cols: usize, num_entries: usize, fill: V) -> Self {
        CooMat {
            shape: Shape::new(num_rows, num_cols, num_entries),
            row_indices: Array1::filled(num_entries, 0),
            col_indices: Array1::filled(num_entries, 0),
            values: Array1::filled(num_entries, fill),
        }
    }

    /// `resize(rows, cols, entries)`: reallocates, preserving no content.
    pub fn resize(&mut self, num_rows: usize, num_cols: usize, num_entries: usize, fill: V) {
        *self = Self::with_shape(num_rows, num_cols, num_entries, fill);
    }

    /// Deep copy into a (possibly different) memory space.
    pub fn to_space<S2: MemorySpace>(&self) -> CooMat<V, S2> {
        CooMat {
            shape: self.shape,
            row_indices: self.row_indices.to_space(),
            col_indices: self.col_indices.to_space(),
            values: self.values.to_space(),
        }
    }

    /// Construct from triplets in arbitrary order, sorting them
    /// lexicographically by `(row, col)` and rejecting duplicate pairs or
    /// out-of-bounds indices. This is the primary entry point for building
    /// a [`CooMat`] that satisfies the invariants of spec §3.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        rows: Vec<usize>,
        cols: Vec<usize>,
        values: Vec<V>,
    ) -> SparseResult<Self>
    where
        V: Zero + PartialEq,
    {
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(SparseError::InvalidStructure(
                "COO triplet arrays have mismatched lengths".into(),
            ));
        }
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by_key(|&k| (rows[k], cols[k]));

        let mut out_rows = Vec::with_capacity(rows.len());
        let mut out_cols = Vec::with_capacity(rows.len());
        let mut out_vals = Vec::with_capacity(rows.len());
        for &k in &order {
            let (r, c) = (rows[k], cols[k]);
            if r >= num_rows || c >= num_cols {
                return Err(SparseError::InvalidStructure(format!(
                    "COO index ({r}, {c}) out of bounds for a {num_rows}x{num_cols} matrix"
                )));
            }
            if let (Some(&lr), Some(&lc)) = (out_rows.last(), out_cols.last()) {
                if (lr, lc) == (r, c) {
                    return Err(SparseError::InvalidStructure(format!(
                        "duplicate COO entry at ({r}, {c})"
                    )));
                }
            }
            out_rows.push(r);
            out_cols.push(c);
            out_vals.push(values[k]);
        }

        let num_entries = out_rows.len();
        Ok(CooMat {
            shape: Shape::new(num_rows, num_cols, num_entries),
            row_indices: Array1::from_vec(out_rows),
            col_indices: Array1::from_vec(out_cols),
            values: Array1::from_vec(out_vals),
        })
    }

    /// Whether `(row_indices, col_indices)` is strictly lexicographically
    /// increasing and every index is in bounds -- the COO invariant from
    /// spec §3 and the "Sortedness" property from spec §8.
    pub fn check_structure(&self) -> SparseResult<()> {
        let (nrows, ncols) = self.shape.dims();
        let rows = self.row_indices.as_slice();
        let cols = self.col_indices.as_slice();
        for i in 0..rows.len() {
            if rows[i] >= nrows || cols[i] >= ncols {
                return Err(SparseError::InvalidStructure(format!(
                    "COO index ({}, {}) out of bounds for a {nrows}x{ncols} matrix",
                    rows[i], cols[i]
                )));
            }
            if i > 0 {
                let prev = (rows[i - 1], cols[i - 1]);
                let cur = (rows[i], cols[i]);
                if prev >= cur {
                    return Err(SparseError::InvalidStructure(
                        "COO entries are not strictly sorted by (row, col)".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::space::Host;

    #[test]
    fn from_triplets_sorts() {
        let m: CooMat<f64, Host> = CooMat::from_triplets(
            2,
            2,
            vec![1, 0, 1],
            vec![0, 1, 1],
            vec![3.0, 1.0, 4.0],
        )
        .unwrap();
        assert_eq!(m.row_indices(), &[0, 1, 1]);
        assert_eq!(m.col_indices(), &[1, 0, 1]);
        assert_eq!(m.values(), &[1.0, 3.0, 4.0]);
        m.check_structure().unwrap();
    }

    #[test]
    fn duplicate_entries_rejected() {
        let err = CooMat::<f64, Host>::from_triplets(
            2,
            2,
            vec![0, 0],
            vec![0, 0],
            vec![1.0, 2.0],
        );
        assert!(err.is_err());
    }

    #[test]
    fn out_of_bounds_rejected() {
        let err = CooMat::<f64, Host>::from_triplets(2, 2, vec![5], vec![0], vec![1.0]);
        assert!(err.is_err());
    }
}
