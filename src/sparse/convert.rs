//! Format conversion (C4): a hub-and-spoke graph with COO and CSR as the
//! hubs (spec §4.4). Every format can produce and consume a [`CooMat`] in
//! O(nnz); conversions between any two formats route through COO.
//!
//! DIA and ELL conversions can refuse to produce a destination that would
//! be pathologically padded; the thresholds are [`ConvertOptions`] fields,
//! not hard-coded constants (spec §9, Open Question (b)).

use num_traits::Zero;

use crate::errors::{SparseError, SparseResult};
use crate::space::MemorySpace;

use super::coo::CooMat;
use super::csr::CsrMat;
use super::dia::DiaMat;
use super::ell::{EllMat, SENTINEL};
use super::hyb::HybMat;

/// Tunable thresholds governing when DIA/ELL/HYB conversions refuse to
/// produce a pathologically padded destination, and how HYB chooses its
/// ELL width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    /// DIA conversion fails if `num_diagonals > ratio * (num_rows +
    /// num_cols)`.
    pub dia_max_diagonal_ratio: f64,
    /// ELL conversion fails if `max_row_len > ratio * average_row_len`
    /// (only once the matrix has at least one row).
    pub ell_max_row_length_ratio: f64,
    /// Fraction of the typical row length HYB's ELL part targets; `E` is
    /// derived as `ceil(average_row_len * hyb_target_coverage)`.
    pub hyb_target_coverage: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            dia_max_diagonal_ratio: 0.25,
            ell_max_row_length_ratio: 3.0,
            hyb_target_coverage: 1.0,
        }
    }
}

/// `dst <- src` reinterpreted in CSR: prefix-sum the per-row counts. COO
/// input is assumed already sorted by `(row, col)` (a [`CooMat`]'s
/// invariant), so no separate sort is needed.
pub fn coo_to_csr<V: Copy, S: MemorySpace>(src: &CooMat<V, S>) -> CsrMat<V, S> {
    let (nrows, ncols) = src.shape().dims();
    let rows = src.row_indices();
    let mut row_offsets = vec![0usize; nrows + 1];
    for &r in rows {
        row_offsets[r + 1] += 1;
    }
    for i in 0..nrows {
        row_offsets[i + 1] += row_offsets[i];
    }
    CsrMat::from_raw(
        nrows,
        ncols,
        row_offsets,
        src.col_indices().to_vec(),
        src.values().to_vec(),
    )
    .expect("COO -> CSR preserves all structural invariants by construction")
}

/// `dst <- src` reinterpreted in COO: expand `row_offsets` into an
/// explicit row index per entry.
pub fn csr_to_coo<V: Copy, S: MemorySpace>(src: &CsrMat<V, S>) -> CooMat<V, S> {
    let (nrows, ncols) = src.shape().dims();
    let offsets = src.row_offsets();
    let mut rows = Vec::with_capacity(src.values().len());
    for r in 0..nrows {
        for _ in offsets[r]..offsets[r + 1] {
            rows.push(r);
        }
    }
    CooMat::from_triplets(
        nrows,
        ncols,
        rows,
        src.col_indices().to_vec(),
        src.values().to_vec(),
    )
    .expect("CSR's invariants (sorted, strictly increasing columns) imply valid COO")
}

/// Scan nonzeros to find the occupied diagonals and pack them into a dense
/// `stride x D` value matrix. Fails with [`SparseError::FormatConversionError`]
/// if the matrix is not banded enough (too many distinct diagonals
/// relative to its size) to benefit from DIA storage.
pub fn coo_to_dia<V, S>(src: &CooMat<V, S>, opts: &ConvertOptions) -> SparseResult<DiaMat<V, S>>
where
    V: Copy + Zero,
    S: MemorySpace,
{
    let (nrows, ncols) = src.shape().dims();
    let mut diag_set: Vec<isize> = src
        .row_indices()
        .iter()
        .zip(src.col_indices())
        .map(|(&r, &c)| c as isize - r as isize)
        .collect();
    diag_set.sort_unstable();
    diag_set.dedup();

    let limit = opts.dia_max_diagonal_ratio * (nrows + ncols) as f64;
    if diag_set.len() as f64 > limit {
        return Err(SparseError::FormatConversionError {
            reason: format!(
                "matrix has {} distinct diagonals, exceeding the threshold {:.1} ({:.2} x (rows+cols))",
                diag_set.len(),
                limit,
                opts.dia_max_diagonal_ratio
            ),
        });
    }

    let stride = nrows;
    let d = diag_set.len();
    let mut values = vec![V::zero(); stride * d];
    for ((&r, &c), &v) in src.row_indices().iter().zip(src.col_indices()).zip(src.values()) {
        let diag = c as isize - r as isize;
        let k = diag_set.binary_search(&diag).expect("diag_set was built from these entries");
        values[k * stride + r] = v;
    }

    DiaMat::from_raw(nrows, ncols, stride, diag_set, values)
}

/// Expand a DIA matrix's non-padding entries back into COO.
pub fn dia_to_coo<V, S>(src: &DiaMat<V, S>) -> CooMat<V, S>
where
    V: Copy + Zero + PartialEq,
    S: MemorySpace,
{
    let (nrows, ncols) = src.shape().dims();
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for (k, &d) in src.diagonal_offsets().iter().enumerate() {
        for row in 0..nrows {
            let col = row as isize + d;
            if col < 0 || col as usize >= ncols {
                continue;
            }
            let v = src.value_at(row, k);
            if v != V::zero() {
                rows.push(row);
                cols.push(col as usize);
                values.push(v);
            }
        }
    }
    CooMat::from_triplets(nrows, ncols, rows, cols, values)
        .expect("DIA's row-major diagonal traversal per offset yields sorted, duplicate-free COO")
}

/// Scan nonzeros to find the maximum row length and pack every row's
/// entries into `E` column-major slots, sentinel-padding short rows.
/// Fails with [`SparseError::FormatConversionError`] if the longest row is
/// disproportionately longer than average, which would waste padding.
pub fn coo_to_ell<V, S>(src: &CooMat<V, S>, opts: &ConvertOptions) -> SparseResult<EllMat<V, S>>
where
    V: Copy + Zero,
    S: MemorySpace,
{
    let (nrows, ncols) = src.shape().dims();
    let mut row_len = vec![0usize; nrows];
    for &r in src.row_indices() {
        row_len[r] += 1;
    }
    let max_len = row_len.iter().copied().max().unwrap_or(0);
    let nnz = src.shape().num_entries();

    if nrows > 0 && nnz > 0 {
        let avg = nnz as f64 / nrows as f64;
        if max_len as f64 > opts.ell_max_row_length_ratio * avg {
            return Err(SparseError::FormatConversionError {
                reason: format!(
                    "longest row has {max_len} nonzeros, exceeding {:.1}x the average of {avg:.2}",
                    opts.ell_max_row_length_ratio
                ),
            });
        }
    }

    let stride = nrows;
    let e = max_len;
    let mut col_indices = vec![SENTINEL; stride * e];
    let mut values = vec![V::zero(); stride * e];
    let mut slot = vec![0usize; nrows];
    for ((&r, &c), &v) in src.row_indices().iter().zip(src.col_indices()).zip(src.values()) {
        let k = slot[r];
        col_indices[k * stride + r] = c as isize;
        values[k * stride + r] = v;
        slot[r] += 1;
    }

    EllMat::from_raw(nrows, ncols, stride, e, col_indices, values)
}

/// Expand an ELL matrix's non-sentinel slots back into COO.
pub fn ell_to_coo<V, S>(src: &EllMat<V, S>) -> CooMat<V, S>
where
    V: Copy + Zero,
    S: MemorySpace,
{
    let (nrows, ncols) = src.shape().dims();
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for row in 0..nrows {
        for k in 0..src.max_row_nnz() {
            let (c, v) = src.slot(row, k);
            if c != SENTINEL {
                rows.push(row);
                cols.push(c as usize);
                values.push(v);
            }
        }
    }
    CooMat::from_triplets(nrows, ncols, rows, cols, values)
        .expect("ELL's per-row slot order mirrors the sorted COO it was built from")
}

/// Split every row's nonzeros between an ELL part (first `E` per row) and
/// a COO tail (the rest), `E` chosen from the typical row length scaled by
/// [`ConvertOptions::hyb_target_coverage`]. Never fails: any matrix can be
/// represented as HYB once `E` is chosen.
pub fn coo_to_hyb<V, S>(src: &CooMat<V, S>, opts: &ConvertOptions) -> SparseResult<HybMat<V, S>>
where
    V: Copy + Zero,
    S: MemorySpace,
{
    let (nrows, ncols) = src.shape().dims();
    let nnz = src.shape().num_entries();
    let e = if nrows == 0 || nnz == 0 {
        0
    } else {
        ((nnz as f64 / nrows as f64) * opts.hyb_target_coverage).ceil() as usize
    };

    let stride = nrows;
    let mut ell_cols = vec![SENTINEL; stride * e];
    let mut ell_vals = vec![V::zero(); stride * e];
    let mut slot = vec![0usize; nrows];
    let mut tail_rows = Vec::new();
    let mut tail_cols = Vec::new();
    let mut tail_vals = Vec::new();

    for ((&r, &c), &v) in src.row_indices().iter().zip(src.col_indices()).zip(src.values()) {
        if slot[r] < e {
            let k = slot[r];
            ell_cols[k * stride + r] = c as isize;
            ell_vals[k * stride + r] = v;
            slot[r] += 1;
        } else {
            tail_rows.push(r);
            tail_cols.push(c);
            tail_vals.push(v);
        }
    }

    let ell = EllMat::from_raw(nrows, ncols, stride, e, ell_cols, ell_vals)
        .expect("HYB's ELL part is built with E slots per row, never overflowing");
    let coo_tail = CooMat::from_triplets(nrows, ncols, tail_rows, tail_cols, tail_vals)
        .expect("the COO tail preserves the row-major order of the source COO");
    HybMat::from_parts(ell, coo_tail)
}

/// Concatenate a HYB matrix's ELL part (skipping sentinel slots) with its
/// COO tail to recover the full matrix in COO.
pub fn hyb_to_coo<V, S>(src: &HybMat<V, S>) -> CooMat<V, S>
where
    V: Copy + Zero,
    S: MemorySpace,
{
    let (nrows, ncols) = src.shape().dims();
    let ell = src.ell_part();
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for row in 0..nrows {
        for k in 0..ell.max_row_nnz() {
            let (c, v) = ell.slot(row, k);
            if c != SENTINEL {
                rows.push(row);
                cols.push(c as usize);
                values.push(v);
            }
        }
    }
    rows.extend_from_slice(src.coo_part().row_indices());
    cols.extend_from_slice(src.coo_part().col_indices());
    values.extend_from_slice(src.coo_part().values());
    CooMat::from_triplets(nrows, ncols, rows, cols, values)
        .expect("HYB's ELL-then-COO-tail order recombines into a valid sorted COO")
}
