//! CSR (compressed sparse row) format (spec §3): `row_offsets[nrows+1]`,
//! `column_indices[nnz]`, `values[nnz]`, with `row_offsets` monotone
//! non-decreasing and columns strictly increasing within each row.

use crate::array::Array1;
use crate::errors::{SparseError, SparseResult};
use crate::space::MemorySpace;

use super::shape::Shape;

/// Compressed-sparse-row matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMat<V, S: MemorySpace> {
    shape: Shape,
    row_offsets: Array1<usize, S>,
    col_indices: Array1<usize, S>,
    values: Array1<V, S>,
}

impl<V, S: MemorySpace> CsrMat<V, S> {
    /// Default-construct: empty, all dimensions zero.
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        CsrMat {
            shape: Shape::empty(num_rows, num_cols),
            row_offsets: Array1::filled(num_rows + 1, 0),
            col_indices: Array1::new(),
            values: Array1::new(),
        }
    }

    /// Shape of the matrix.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// `row_offsets[i]..row_offsets[i+1]` bounds the entries of row `i`.
    pub fn row_offsets(&self) -> &[usize] {
        self.row_offsets.as_slice()
    }

    /// Column index of each stored entry, grouped by row.
    pub fn col_indices(&self) -> &[usize] {
        self.col_indices.as_slice()
    }

    /// Value of each stored entry, grouped by row.
    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    /// The `(column_indices, values)` slices for row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[V]) {
        let start = self.row_offsets.as_slice()[i];
        let end = self.row_offsets.as_slice()[i + 1];
        (&self.col_indices.as_slice()[start..end], &self.values.as_slice()[start..end])
    }

    /// Exchange ownership of the underlying buffers in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.shape, &mut other.shape);
        self.row_offsets.swap(&mut other.row_offsets);
        self.col_indices.swap(&mut other.col_indices);
        self.values.swap(&mut other.values);
    }

    /// Verifies spec §3's CSR invariants: `row_offsets[0] == 0`,
    /// `row_offsets[num_rows] == num_entries`, monotone non-decreasing,
    /// and within each row, strictly increasing column indices with no
    /// duplicates and no out-of-bounds columns.
    pub fn check_structure(&self) -> SparseResult<()>
    where
        V: Copy,
    {
        let offsets = self.row_offsets.as_slice();
        let (nrows, ncols) = self.shape.dims();
        if offsets.len() != nrows + 1 {
            return Err(SparseError::InvalidStructure(format!(
                "CSR row_offsets has length {}, expected {}",
                offsets.len(),
                nrows + 1
            )));
        }
        if offsets[0] != 0 {
            return Err(SparseError::InvalidStructure(
                "CSR row_offsets[0] must be 0".into(),
            ));
        }
        if offsets[nrows] != self.shape.num_entries() {
            return Err(SparseError::InvalidStructure(
                "CSR row_offsets[num_rows] must equal num_entries".into(),
            ));
        }
        if !offsets.windows(2).all(|w| w[0] <= w[1]) {
            return Err(SparseError::InvalidStructure(
                "CSR row_offsets must be non-decreasing".into(),
            ));
        }
        for i in 0..nrows {
            let (cols, _) = self.row(i);
            for &c in cols {
                if c >= ncols {
                    return Err(SparseError::InvalidStructure(format!(
                        "CSR column index {c} out of bounds for {ncols} columns"
                    )));
                }
            }
            if !cols.windows(2).all(|w| w[0] < w[1]) {
                return Err(SparseError::InvalidStructure(format!(
                    "CSR row {i} columns are not strictly increasing"
                )));
            }
        }
        Ok(())
    }
}

impl<V: Copy, S: MemorySpace> CsrMat<V, S> {
    /// Shape-and-entry-count construct. Allocates `row_offsets` (all
    /// zero), and `col_indices`/`values` sized `num_entries`; callers
    /// populate the structure (e.g. via conversion) before relying on the
    /// invariants.
    pub fn with_shape(num_rows: usize, num_cols: usize, num_entries: usize, fill: V) -> Self {
        CsrMat {
            shape: Shape::new(num_rows, num_cols, num_entries),
            row_offsets: Array1::filled(num_rows + 1, 0),
            col_indices: Array1::filled(num_entries, 0),
            values: Array1::filled(num_entries, fill),
        }
    }

    /// `resize(rows, cols, entries)`: reallocates, preserving no content.
    pub fn resize(&mut self, num_rows: usize, num_cols: usize, num_entries: usize, fill: V) {
        *self = Self::with_shape(num_rows, num_cols, num_entries, fill);
    }

    /// Deep copy into a (possibly different) memory space.
    pub fn to_space<S2: MemorySpace>(&self) -> CsrMat<V, S2> {
        CsrMat {
            shape: self.shape,
            row_offsets: self.row_offsets.to_space(),
            col_indices: self.col_indices.to_space(),
            values: self.values.to_space(),
        }
    }

    /// Construct directly from raw CSR arrays, checking the structural
    /// invariants.
    pub fn from_raw(
        num_rows: usize,
        num_cols: usize,
        row_offsets: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<V>,
    ) -> SparseResult<Self> {
        let num_entries = values.len();
        let m = CsrMat {
            shape: Shape::new(num_rows, num_cols, num_entries),
            row_offsets: Array1::from_vec(row_offsets),
            col_indices: Array1::from_vec(col_indices),
            values: Array1::from_vec(values),
        };
        m.check_structure()?;
        Ok(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::space::Host;

    #[test]
    fn eye_like_structure() {
        let m: CsrMat<f64, Host> = CsrMat::from_raw(
            3,
            3,
            vec![0, 1, 2, 3],
            vec![0, 1, 2],
            vec![1.0, 1.0, 1.0],
        )
        .unwrap();
        assert_eq!(m.row(1), (&[1usize][..], &[1.0][..]));
    }

    #[test]
    fn unsorted_columns_rejected() {
        let err = CsrMat::<f64, Host>::from_raw(
            1,
            3,
            vec![0, 2],
            vec![2, 1],
            vec![1.0, 1.0],
        );
        assert!(err.is_err());
    }

    #[test]
    fn bad_indptr_length_rejected() {
        let err = CsrMat::<f64, Host>::from_raw(3, 3, vec![0, 1, 2], vec![0, 1], vec![1.0, 1.0]);
        assert!(err.is_err());
    }
}
