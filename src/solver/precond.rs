//! Preconditioner hook for C7. Spec §1/§9 list the capability
//! (`(x, Mx)`) without mandating a concrete implementation beyond the
//! identity; BiCGstab calls it twice per iteration (`Mp`, `Ms`).

use num_traits::NumAssign;

use crate::array::Array1;
use crate::blas1;
use crate::errors::SparseResult;
use crate::space::MemorySpace;

/// `out <- M * x` for some preconditioning operator `M`.
pub trait Preconditioner<V, S: MemorySpace> {
    /// Apply the preconditioner, writing into `out` (resized as needed by
    /// the implementation before this call).
    fn apply(&self, x: &Array1<V, S>, out: &mut Array1<V, S>) -> SparseResult<()>;
}

/// `M = I`: the default preconditioner, a plain copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<V: Copy + NumAssign, S: MemorySpace> Preconditioner<V, S> for Identity {
    fn apply(&self, x: &Array1<V, S>, out: &mut Array1<V, S>) -> SparseResult<()> {
        blas1::copy(out, x)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::space::Host;

    #[test]
    fn identity_copies_input() {
        let x: Array1<f64, Host> = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut out: Array1<f64, Host> = Array1::with_len(3);
        Identity.apply(&x, &mut out).unwrap();
        assert_eq!(out.as_slice(), x.as_slice());
    }
}
