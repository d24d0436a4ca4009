//! Sparse matrix-vector multiply kernels (C5): `y <- A * x`, one kernel per
//! format (spec §4.5). Every kernel dispatches elementwise work through
//! `S::Exec` (spec §4.1/C1), so the same code runs sequentially for `Host`
//! and data-parallel for `Device` (behind the `parallel` feature).
//!
//! CSR ships two variants that compute the same result by a different
//! work split: `CsrKernel::Scalar` assigns one executor index per row,
//! `CsrKernel::Vector` assigns one per row but sums each row's nonzeros in
//! fixed-size groups, modeling the warp-cooperative reduction spec §4.5
//! describes for wide rows. A `ReadOnlyView` marker distinguishes calls
//! that would, on a real accelerator, route `x` through a read-only
//! texture/cache path; numerically it is transparent here.

use std::ops::{AddAssign, Mul};

use num_traits::Zero;

use crate::array::Array1;
use crate::errors::{SparseError, SparseResult};
use crate::space::{Executor, MemorySpace};

use super::coo::CooMat;
use super::csr::CsrMat;
use super::dia::DiaMat;
use super::ell::EllMat;
use super::hyb::HybMat;
use super::{AnyMat, Shape};

/// Marks a read-only pass over `x`. Kernels that accept this instead of a
/// plain slice reference are the ones spec §4.5 calls out as candidates
/// for a texture/read-only-cache path on real accelerator hardware; this
/// crate has no such path, so the wrapper is numerically a no-op, but it
/// keeps that call site distinguishable from an ordinary borrow.
#[derive(Debug, Clone, Copy)]
pub struct ReadOnlyView<'a, V>(pub &'a [V]);

impl<'a, V> ReadOnlyView<'a, V> {
    /// Wrap a slice as a read-only view.
    pub fn new(x: &'a [V]) -> Self {
        ReadOnlyView(x)
    }

    /// Borrow the underlying values.
    pub fn as_slice(&self) -> &'a [V] {
        self.0
    }
}

/// Which work split a CSR kernel uses. Both produce identical numeric
/// results in this software model; the distinction only matters for
/// performance on a real device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrKernel {
    /// One executor index per row; that row's nonzeros are summed in
    /// storage order by a single worker.
    Scalar,
    /// One executor index per row; that row's nonzeros are summed in
    /// fixed-size groups (modeling cooperating lanes within a warp), then
    /// the group partials are summed.
    Vector,
}

/// Lanes a [`CsrKernel::Vector`] pass cooperates in. Matches a common
/// device warp width; irrelevant to correctness, only to how the
/// intra-row reduction is grouped.
const VECTOR_GROUP: usize = 32;

fn check_spmv_shapes(shape: Shape, x_len: usize, y_len: usize) -> SparseResult<()> {
    let (nrows, ncols) = shape.dims();
    if x_len != ncols {
        return Err(SparseError::shape("spmv: x", (ncols, 1), (x_len, 1)));
    }
    if y_len != nrows {
        return Err(SparseError::shape("spmv: y", (nrows, 1), (y_len, 1)));
    }
    Ok(())
}

/// Wraps a raw pointer so it can cross into a parallel closure. Safe here
/// because every kernel below only ever hands out one index per logical
/// row/diagonal slot to `S::Exec::for_each_index`, so concurrent writes
/// never alias.
struct SendPtr<V>(*mut V);
unsafe impl<V> Send for SendPtr<V> {}
unsafe impl<V> Sync for SendPtr<V> {}

/// `y <- A * x` for a COO matrix (spec §4.5): a scatter-add over all
/// stored entries, since several entries may share a row and cannot be
/// assigned one executor index apiece without a race.
pub fn spmv_coo<V, S>(a: &CooMat<V, S>, x: &Array1<V, S>, y: &mut Array1<V, S>) -> SparseResult<()>
where
    V: Copy + Zero + AddAssign + Mul<Output = V> + Send + Sync,
    S: MemorySpace,
{
    check_spmv_shapes(a.shape(), x.len(), y.len())?;
    y.as_mut_slice().iter_mut().for_each(|v| *v = V::zero());
    S::Exec::scatter_add(a.row_indices(), a.col_indices(), a.values(), x.as_slice(), y.as_mut_slice());
    Ok(())
}

/// `y <- A * x` for a CSR matrix (spec §4.5), one executor index per row.
pub fn spmv_csr<V, S>(
    a: &CsrMat<V, S>,
    x: &Array1<V, S>,
    y: &mut Array1<V, S>,
    kernel: CsrKernel,
) -> SparseResult<()>
where
    V: Copy + Zero + AddAssign + Mul<Output = V> + Send + Sync,
    S: MemorySpace,
{
    check_spmv_shapes(a.shape(), x.len(), y.len())?;
    let (nrows, _) = a.shape().dims();
    let x_view = ReadOnlyView::new(x.as_slice());
    let y_ptr = SendPtr(y.as_mut_slice().as_mut_ptr());
    S::Exec::for_each_index(nrows, move |i| {
        let (cols, vals) = a.row(i);
        let xs = x_view.as_slice();
        let sum = match kernel {
            CsrKernel::Scalar => {
                let mut acc = V::zero();
                for k in 0..cols.len() {
                    acc += vals[k] * xs[cols[k]];
                }
                acc
            }
            CsrKernel::Vector => {
                let mut acc = V::zero();
                let mut chunk_start = 0;
                while chunk_start < cols.len() {
                    let end = (chunk_start + VECTOR_GROUP).min(cols.len());
                    let mut partial = V::zero();
                    for k in chunk_start..end {
                        partial += vals[k] * xs[cols[k]];
                    }
                    acc += partial;
                    chunk_start = end;
                }
                acc
            }
        };
        unsafe {
            *y_ptr.0.add(i) = sum;
        }
    });
    Ok(())
}

/// `y <- A * x` for a DIA matrix (spec §4.5): one executor index per row,
/// summing over the occupied diagonals that touch it.
pub fn spmv_dia<V, S>(a: &DiaMat<V, S>, x: &Array1<V, S>, y: &mut Array1<V, S>) -> SparseResult<()>
where
    V: Copy + Zero + AddAssign + Mul<Output = V> + Send + Sync,
    S: MemorySpace,
{
    check_spmv_shapes(a.shape(), x.len(), y.len())?;
    let (nrows, ncols) = a.shape().dims();
    let offsets = a.diagonal_offsets();
    let values = a.values();
    let stride = a.stride();
    let x_view = ReadOnlyView::new(x.as_slice());
    let y_ptr = SendPtr(y.as_mut_slice().as_mut_ptr());
    S::Exec::for_each_index(nrows, move |row| {
        let xs = x_view.as_slice();
        let mut acc = V::zero();
        for (k, &offset) in offsets.iter().enumerate() {
            let col = row as isize + offset;
            if col >= 0 && (col as usize) < ncols {
                acc += values[k * stride + row] * xs[col as usize];
            }
        }
        unsafe {
            *y_ptr.0.add(row) = acc;
        }
    });
    Ok(())
}

/// `y <- A * x` for an ELL matrix (spec §4.5): one executor index per row,
/// skipping sentinel slots.
pub fn spmv_ell<V, S>(a: &EllMat<V, S>, x: &Array1<V, S>, y: &mut Array1<V, S>) -> SparseResult<()>
where
    V: Copy + Zero + AddAssign + Mul<Output = V> + Send + Sync,
    S: MemorySpace,
{
    check_spmv_shapes(a.shape(), x.len(), y.len())?;
    let (nrows, _) = a.shape().dims();
    let cols = a.col_indices();
    let values = a.values();
    let stride = a.stride();
    let max_row_nnz = a.max_row_nnz();
    let x_view = ReadOnlyView::new(x.as_slice());
    let y_ptr = SendPtr(y.as_mut_slice().as_mut_ptr());
    S::Exec::for_each_index(nrows, move |row| {
        let xs = x_view.as_slice();
        let mut acc = V::zero();
        for k in 0..max_row_nnz {
            let idx = k * stride + row;
            let c = cols[idx];
            if c >= 0 {
                acc += values[idx] * xs[c as usize];
            }
        }
        unsafe {
            *y_ptr.0.add(row) = acc;
        }
    });
    Ok(())
}

/// `y <- A * x` for a HYB matrix (spec §4.5): the ELL part contributes one
/// term per row directly; the COO overflow is scatter-added on top.
pub fn spmv_hyb<V, S>(a: &HybMat<V, S>, x: &Array1<V, S>, y: &mut Array1<V, S>) -> SparseResult<()>
where
    V: Copy + Zero + AddAssign + Mul<Output = V> + Send + Sync,
    S: MemorySpace,
{
    spmv_ell(a.ell_part(), x, y)?;
    let coo = a.coo_part();
    S::Exec::scatter_add(coo.row_indices(), coo.col_indices(), coo.values(), x.as_slice(), y.as_mut_slice());
    Ok(())
}

/// `y <- A * x` dispatched on `A`'s format tag (spec §4.4/§4.5), using the
/// scalar CSR kernel when `A` is stored as CSR.
pub fn spmv<V, S>(a: &AnyMat<V, S>, x: &Array1<V, S>, y: &mut Array1<V, S>) -> SparseResult<()>
where
    V: Copy + Zero + AddAssign + Mul<Output = V> + Send + Sync,
    S: MemorySpace,
{
    match a {
        AnyMat::Coo(m) => spmv_coo(m, x, y),
        AnyMat::Csr(m) => spmv_csr(m, x, y, CsrKernel::Scalar),
        AnyMat::Dia(m) => spmv_dia(m, x, y),
        AnyMat::Ell(m) => spmv_ell(m, x, y),
        AnyMat::Hyb(m) => spmv_hyb(m, x, y),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::space::Host;
    use crate::sparse::convert::{self, ConvertOptions};
    use crate::sparse::FormatTag;

    // A = [[10, 0, 20], [0, 0, 0], [0, 0, 30], [40, 50, 60]], x = [1, 2, 3]
    fn sample_coo() -> CooMat<f64, Host> {
        CooMat::from_triplets(
            4,
            3,
            vec![0, 0, 2, 3, 3, 3],
            vec![0, 2, 2, 0, 1, 2],
            vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
        )
        .unwrap()
    }

    fn expected() -> Vec<f64> {
        // row0: 10*1 + 20*3 = 70; row1: 0; row2: 30*3 = 90;
        // row3: 40*1 + 50*2 + 60*3 = 320
        vec![70.0, 0.0, 90.0, 320.0]
    }

    #[test]
    fn coo_matches_dense_reference() {
        let a = sample_coo();
        let x: Array1<f64, Host> = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut y: Array1<f64, Host> = Array1::with_len(4);
        spmv_coo(&a, &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), expected().as_slice());
    }

    #[test]
    fn csr_scalar_and_vector_agree_and_match_reference() {
        let csr = convert::coo_to_csr(&sample_coo());
        let x: Array1<f64, Host> = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut y_scalar: Array1<f64, Host> = Array1::with_len(4);
        spmv_csr(&csr, &x, &mut y_scalar, CsrKernel::Scalar).unwrap();
        let mut y_vector: Array1<f64, Host> = Array1::with_len(4);
        spmv_csr(&csr, &x, &mut y_vector, CsrKernel::Vector).unwrap();
        assert_eq!(y_scalar.as_slice(), expected().as_slice());
        assert_eq!(y_scalar.as_slice(), y_vector.as_slice());
    }

    #[test]
    fn ell_matches_reference() {
        let opts = ConvertOptions::default();
        let ell = convert::coo_to_ell(&sample_coo(), &opts).unwrap();
        let x: Array1<f64, Host> = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut y: Array1<f64, Host> = Array1::with_len(4);
        spmv_ell(&ell, &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), expected().as_slice());
    }

    #[test]
    fn hyb_matches_reference() {
        let opts = ConvertOptions::default();
        let hyb = convert::coo_to_hyb(&sample_coo(), &opts).unwrap();
        let x: Array1<f64, Host> = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut y: Array1<f64, Host> = Array1::with_len(4);
        spmv_hyb(&hyb, &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), expected().as_slice());
    }

    #[test]
    fn dia_matches_reference_on_a_banded_matrix() {
        // A = diag(1, 2, 3) plus a superdiagonal(5, 6, _); the last
        // superdiagonal slot (row2 -> col3) is out of bounds and ignored.
        let dia: DiaMat<f64, Host> =
            DiaMat::from_raw(3, 3, 3, vec![0, 1], vec![1.0, 2.0, 3.0, 5.0, 6.0, 0.0]).unwrap();
        let x: Array1<f64, Host> = Array1::from_vec(vec![1.0, 1.0, 1.0]);
        let mut y: Array1<f64, Host> = Array1::with_len(3);
        spmv_dia(&dia, &x, &mut y).unwrap();
        // row0: 1*1 + 5*1 = 6; row1: 2*1 + 6*1 = 8; row2: 3*1 = 3
        assert_eq!(y.as_slice(), &[6.0, 8.0, 3.0]);
    }

    #[test]
    fn dispatch_through_anymat_matches_direct_call() {
        let any = AnyMat::Coo(sample_coo());
        let x: Array1<f64, Host> = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut y: Array1<f64, Host> = Array1::with_len(4);
        spmv(&any, &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), expected().as_slice());

        let opts = ConvertOptions::default();
        let csr_any = super::super::convert(FormatTag::Csr, &any, &opts).unwrap();
        let mut y2: Array1<f64, Host> = Array1::with_len(4);
        spmv(&csr_any, &x, &mut y2).unwrap();
        assert_eq!(y2.as_slice(), y.as_slice());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let a = sample_coo();
        let x: Array1<f64, Host> = Array1::with_len(2);
        let mut y: Array1<f64, Host> = Array1::with_len(4);
        assert!(spmv_coo(&a, &x, &mut y).is_err());
    }
}
