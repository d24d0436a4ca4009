//! HYB (hybrid ELL+COO) format (spec §3): an ELL portion holding the first
//! `E` nonzeros of every row, and a COO portion holding the overflow.
//! Neither portion shares storage with the other, and together they
//! represent the true sparse matrix exactly.

use crate::errors::{SparseError, SparseResult};
use crate::space::MemorySpace;

use super::coo::CooMat;
use super::ell::EllMat;
use super::shape::Shape;

/// Hybrid ELL+COO sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct HybMat<V, S: MemorySpace> {
    ell: EllMat<V, S>,
    coo: CooMat<V, S>,
}

impl<V, S: MemorySpace> HybMat<V, S> {
    /// Default-construct: empty, all dimensions zero.
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        HybMat { ell: EllMat::empty(num_rows, num_cols), coo: CooMat::empty(num_rows, num_cols) }
    }

    /// Shape of the matrix: rows/cols from either part, `num_entries` the
    /// sum of both parts' stored entries.
    pub fn shape(&self) -> Shape {
        Shape::new(
            self.ell.shape().num_rows(),
            self.ell.shape().num_cols(),
            self.ell.shape().num_entries() + self.coo.shape().num_entries(),
        )
    }

    /// The ELL portion (first `E` nonzeros of every row).
    pub fn ell_part(&self) -> &EllMat<V, S> {
        &self.ell
    }

    /// The COO portion (per-row overflow beyond `E`).
    pub fn coo_part(&self) -> &CooMat<V, S> {
        &self.coo
    }

    /// Exchange ownership of the underlying buffers in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        self.ell.swap(&mut other.ell);
        self.coo.swap(&mut other.coo);
    }

    /// Verifies both parts' structural invariants and that they agree on
    /// the matrix's shape.
    pub fn check_structure(&self) -> SparseResult<()> {
        if self.ell.shape().dims() != self.coo.shape().dims() {
            return Err(SparseError::InvalidStructure(
                "HYB ELL and COO parts disagree on matrix shape".into(),
            ));
        }
        self.ell.check_structure()?;
        self.coo.check_structure()
    }
}

impl<V: Copy, S: MemorySpace> HybMat<V, S> {
    /// Build directly from an ELL part and a COO part over the same
    /// shape.
    pub fn from_parts(ell: EllMat<V, S>, coo: CooMat<V, S>) -> SparseResult<Self> {
        let m = HybMat { ell, coo };
        m.check_structure()?;
        Ok(m)
    }

    /// Deep copy into a (possibly different) memory space.
    pub fn to_space<S2: MemorySpace>(&self) -> HybMat<V, S2> {
        HybMat { ell: self.ell.to_space(), coo: self.coo.to_space() }
    }
}
