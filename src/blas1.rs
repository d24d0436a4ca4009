//! Minimal dense BLAS-1 façade consumed by the solver (C7).
//!
//! Spec §1/§6 name this as an external collaborator "assumed as a given
//! capability" / "consumed, not defined here". A buildable crate still
//! needs *something* behind those calls; this module is the minimal
//! concrete thing, generic over memory space via the [`crate::space`]
//! executor, playing the same small companion role a dense-array helper
//! crate plays to a sparse-matrix crate. Nothing here is format-aware or
//! tunable; nothing about `blas1` grows the conversion/SpMV surface.

use num_traits::{Float, NumAssign, Zero};

use crate::array::Array1;
use crate::errors::{SparseError, SparseResult};
use crate::space::MemorySpace;

fn check_len<V, S: MemorySpace>(
    context: &'static str,
    a: &Array1<V, S>,
    b: &Array1<V, S>,
) -> SparseResult<()> {
    if a.len() != b.len() {
        return Err(SparseError::shape(context, (a.len(), 0), (b.len(), 0)));
    }
    Ok(())
}

/// `x[i] <- value` for every `i`.
pub fn fill<V: Copy, S: MemorySpace>(x: &mut Array1<V, S>, value: V) {
    for i in 0..x.len() {
        x[i] = value;
    }
}

/// `dst <- src` (same length, same space).
pub fn copy<V: Copy, S: MemorySpace>(
    dst: &mut Array1<V, S>,
    src: &Array1<V, S>,
) -> SparseResult<()> {
    check_len("blas1::copy", dst, src)?;
    for i in 0..src.len() {
        dst[i] = src[i];
    }
    Ok(())
}

/// `y <- a*x + y`.
pub fn axpy<V: Copy + NumAssign, S: MemorySpace>(
    a: V,
    x: &Array1<V, S>,
    y: &mut Array1<V, S>,
) -> SparseResult<()> {
    check_len("blas1::axpy", x, y)?;
    for i in 0..x.len() {
        y[i] += a * x[i];
    }
    Ok(())
}

/// `y <- a*x + b*y`.
pub fn axpby<V: Copy + NumAssign, S: MemorySpace>(
    a: V,
    x: &Array1<V, S>,
    b: V,
    y: &mut Array1<V, S>,
) -> SparseResult<()> {
    check_len("blas1::axpby", x, y)?;
    for i in 0..x.len() {
        y[i] = a * x[i] + b * y[i];
    }
    Ok(())
}

/// `z <- a*x + b*y + c*z`, the fused triple-axpy BiCGstab step 7 needs
/// (`x <- x + alpha*Mp + omega*Ms`).
pub fn axpbypcz<V: Copy + NumAssign, S: MemorySpace>(
    a: V,
    x: &Array1<V, S>,
    b: V,
    y: &Array1<V, S>,
    c: V,
    z: &mut Array1<V, S>,
) -> SparseResult<()> {
    check_len("blas1::axpbypcz", x, y)?;
    check_len("blas1::axpbypcz", x, z)?;
    for i in 0..x.len() {
        z[i] = a * x[i] + b * y[i] + c * z[i];
    }
    Ok(())
}

/// Conjugate dot product `sum_i conj(x[i]) * y[i]`. For the real-valued
/// `ValueType`s this crate targets, conjugation is the identity (spec's
/// "conjugation is meaningful" non-goal: declared, not specialized).
pub fn dotc<V: Copy + NumAssign + Zero, S: MemorySpace>(
    x: &Array1<V, S>,
    y: &Array1<V, S>,
) -> SparseResult<V> {
    check_len("blas1::dotc", x, y)?;
    let mut acc = V::zero();
    for i in 0..x.len() {
        acc += x[i] * y[i];
    }
    Ok(acc)
}

/// Euclidean norm `sqrt(sum_i x[i]^2)`.
pub fn nrm2<V: Copy + Float, S: MemorySpace>(x: &Array1<V, S>) -> V {
    let mut acc = V::zero();
    for i in 0..x.len() {
        acc = acc + x[i] * x[i];
    }
    acc.sqrt()
}
