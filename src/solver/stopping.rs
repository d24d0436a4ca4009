//! Stopping criteria (C6): a pluggable predicate set for iterative-solver
//! termination (spec §4.6). `initialize` captures whatever baseline the
//! criterion needs before the first iteration; `has_converged` and
//! `has_reached_iteration_limit` are queried once per BiCGstab iteration
//! and must stay cheap and side-effect-free beyond internal caches.

use num_traits::Float;

use crate::array::Array1;
use crate::space::MemorySpace;

/// A termination predicate for the Krylov loop.
///
/// The full spec signature threads `A` and `x` through `has_converged` as
/// well, for criteria that want to recompute a fresh residual rather than
/// trust the recurrence's running estimate. The only criterion shipped
/// here ([`RelativeResidual`]) only ever needs `‖b‖` and the iteration's
/// residual norm, so those extra parameters are omitted below; a criterion
/// that needs `A`/`x` can still be written against [`crate::sparse::spmv`]
/// directly from inside `has_converged`'s caller.
pub trait StoppingCriterion<V, S: MemorySpace> {
    /// Capture baselines (e.g. `‖b‖`) before the first iteration.
    fn initialize(&mut self, b: &Array1<V, S>);

    /// Whether `residual_norm` (the current `‖r‖₂`) counts as converged.
    fn has_converged(&self, residual_norm: V) -> bool;

    /// Whether iteration `k` (0-based, about to run) exceeds the budget.
    fn has_reached_iteration_limit(&self, k: usize) -> bool;
}

/// Default stopping criterion (spec §4.6): relative residual `‖r‖ / ‖b‖ <
/// tolerance`, with a hard cap `max_iterations` on the iteration count.
#[derive(Debug, Clone, Copy)]
pub struct RelativeResidual<V> {
    tolerance: V,
    max_iterations: usize,
    b_norm: V,
}

impl<V: Float> RelativeResidual<V> {
    /// A new criterion with the given tolerance and iteration cap.
    /// `initialize` must be called before use; until then `b_norm` is 1,
    /// i.e. the criterion behaves as an absolute-residual check.
    pub fn new(tolerance: V, max_iterations: usize) -> Self {
        RelativeResidual { tolerance, max_iterations, b_norm: V::one() }
    }
}

impl<V: Float, S: MemorySpace> StoppingCriterion<V, S> for RelativeResidual<V> {
    fn initialize(&mut self, b: &Array1<V, S>) {
        let norm = crate::blas1::nrm2(b);
        self.b_norm = if norm > V::zero() { norm } else { V::one() };
    }

    fn has_converged(&self, residual_norm: V) -> bool {
        residual_norm / self.b_norm < self.tolerance
    }

    fn has_reached_iteration_limit(&self, k: usize) -> bool {
        k >= self.max_iterations
    }
}
