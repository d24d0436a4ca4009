//! BiCGstab Krylov solver (C7): solves `A x = b` for non-symmetric `A`,
//! updating `x` in place from whatever initial guess it holds on entry.
//! Follows spec §4.7's eleven-step iteration exactly; every scalar there
//! (`α`, `ω`, `β`, the two running `(r,r*)` values) appears below under the
//! same name.

use num_traits::{Float, NumAssign};

use crate::array::Array1;
use crate::blas1;
use crate::errors::{BreakdownReason, SolverError, SolverResult};
use crate::space::MemorySpace;
use crate::sparse::{spmv, AnyMat};

use super::precond::Preconditioner;
use super::stopping::StoppingCriterion;

/// How a [`bicgstab`] call ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveOutcome<V> {
    /// The stopping criterion reported convergence.
    Converged {
        /// Iterations run.
        iterations: usize,
        /// `‖r‖₂` at the last iteration.
        residual_norm: V,
    },
    /// `has_reached_iteration_limit` fired before convergence. Not an
    /// error (spec §7): `x` holds the best estimate found.
    IterationLimitReached {
        /// Iterations run.
        iterations: usize,
        /// `‖r‖₂` at the last iteration.
        residual_norm: V,
    },
}

/// A denominator below this magnitude is treated as a breakdown rather
/// than divided by. Comparing to exact zero would miss the numerically
/// indistinguishable case the spec's "(numerically) zero" phrasing calls
/// out.
fn is_breakdown<V: Float>(denominator: V) -> bool {
    denominator.abs() <= V::epsilon()
}

/// Run BiCGstab until the stopping criterion converges, the iteration
/// limit is reached, or a scalar recurrence breaks down.
///
/// Performs two SpMVs per iteration. The scalar recurrences need four
/// `dotc` reductions (the alpha denominator, the omega numerator and
/// denominator, and the rotated `(r,r*)`) and two `nrm2` calls (the
/// early-exit check on `‖s‖` below, and the end-of-iteration `‖r‖`).
pub fn bicgstab<V, S>(
    a: &AnyMat<V, S>,
    b: &Array1<V, S>,
    x: &mut Array1<V, S>,
    precond: &impl Preconditioner<V, S>,
    stopping: &mut impl StoppingCriterion<V, S>,
) -> SolverResult<SolveOutcome<V>>
where
    V: Copy + Float + NumAssign + Send + Sync + std::fmt::Display,
    S: MemorySpace,
{
    stopping.initialize(b);

    // r0 <- b - A*x0
    let mut r: Array1<V, S> = Array1::with_len(b.len());
    spmv(a, x, &mut r)?;
    blas1::axpby(V::one(), b, -V::one(), &mut r)?;
    let r_star = r.clone();

    let mut residual_norm = blas1::nrm2(&r);
    log::debug!("bicgstab: initial ||r|| = {residual_norm}");
    if stopping.has_converged(residual_norm) {
        return Ok(SolveOutcome::Converged { iterations: 0, residual_norm });
    }

    let mut p = r.clone();
    let mut rr_old = blas1::dotc(&r, &r_star)?;

    let mut mp: Array1<V, S> = Array1::with_len(b.len());
    let mut amp: Array1<V, S> = Array1::with_len(b.len());
    let mut s: Array1<V, S> = Array1::with_len(b.len());
    let mut ms: Array1<V, S> = Array1::with_len(b.len());
    let mut ams: Array1<V, S> = Array1::with_len(b.len());
    let mut p_minus_omega_amp: Array1<V, S> = Array1::with_len(b.len());

    let mut iteration = 0usize;
    loop {
        if stopping.has_reached_iteration_limit(iteration) {
            return Ok(SolveOutcome::IterationLimitReached { iterations: iteration, residual_norm });
        }

        // 1-2: Mp <- M*p, AMp <- A*Mp
        precond.apply(&p, &mut mp)?;
        spmv(a, &mp, &mut amp)?;

        // 3: alpha <- (r,r*) / (AMp,r*)
        let amp_rstar = blas1::dotc(&amp, &r_star)?;
        if is_breakdown(amp_rstar) {
            return Err(SolverError::Breakdown {
                iteration,
                reason: BreakdownReason::AlphaDenominatorZero,
            });
        }
        let alpha = rr_old / amp_rstar;

        // 4: s <- r - alpha*AMp
        blas1::copy(&mut s, &r)?;
        blas1::axpy(-alpha, &amp, &mut s)?;

        // Early exit: if s is already within tolerance, x + alpha*Mp is
        // the converged solution and computing omega would divide a
        // (numerically) zero (AMs,s) by a zero (AMs,AMs) -- a spurious
        // breakdown, not a real one. Every practical BiCGstab (this is
        // the A=I, x0=0 case of spec scenario 6) checks this before step
        // 5 rather than only at the end of step 11.
        let s_norm = blas1::nrm2(&s);
        if stopping.has_converged(s_norm) {
            blas1::axpy(alpha, &mp, x)?;
            iteration += 1;
            log::debug!("bicgstab: iteration {iteration}: converged early on ||s|| = {s_norm}");
            return Ok(SolveOutcome::Converged { iterations: iteration, residual_norm: s_norm });
        }

        // 5: Ms <- M*s, AMs <- A*Ms
        precond.apply(&s, &mut ms)?;
        spmv(a, &ms, &mut ams)?;

        // 6: omega <- (AMs,s) / (AMs,AMs)
        let ams_s = blas1::dotc(&ams, &s)?;
        let ams_ams = blas1::dotc(&ams, &ams)?;
        if is_breakdown(ams_ams) {
            return Err(SolverError::Breakdown {
                iteration,
                reason: BreakdownReason::OmegaDenominatorZero,
            });
        }
        let omega = ams_s / ams_ams;

        // 7: x <- x + alpha*Mp + omega*Ms
        blas1::axpbypcz(alpha, &mp, omega, &ms, V::one(), x)?;

        // 8: r <- s - omega*AMs
        blas1::copy(&mut r, &s)?;
        blas1::axpy(-omega, &ams, &mut r)?;

        // 9: rotate (r,r*)
        let rr_new = blas1::dotc(&r, &r_star)?;
        let beta = (rr_new / rr_old) * (alpha / omega);
        rr_old = rr_new;

        // 10: p <- r + beta*(p - omega*AMp)
        blas1::copy(&mut p_minus_omega_amp, &p)?;
        blas1::axpy(-omega, &amp, &mut p_minus_omega_amp)?;
        blas1::axpby(V::one(), &r, beta, &mut p_minus_omega_amp)?;
        blas1::copy(&mut p, &p_minus_omega_amp)?;

        // 11: recompute ||r|| and consult the stopping criterion
        residual_norm = blas1::nrm2(&r);
        iteration += 1;
        log::debug!(
            "bicgstab: iteration {iteration}: ||r|| = {residual_norm}, alpha = {alpha}, omega = {omega}"
        );

        if stopping.has_converged(residual_norm) {
            return Ok(SolveOutcome::Converged { iterations: iteration, residual_norm });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::precond::Identity;
    use crate::solver::stopping::RelativeResidual;
    use crate::space::Host;
    use crate::sparse::CooMat;

    fn identity_3x3() -> AnyMat<f64, Host> {
        AnyMat::Coo(
            CooMat::from_triplets(3, 3, vec![0, 1, 2], vec![0, 1, 2], vec![1.0, 1.0, 1.0]).unwrap(),
        )
    }

    #[test]
    fn identity_matrix_converges_in_one_iteration() {
        let a = identity_3x3();
        let b: Array1<f64, Host> = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut x: Array1<f64, Host> = Array1::with_len(3);
        let mut stopping = RelativeResidual::new(1e-10, 50);
        let outcome = bicgstab(&a, &b, &mut x, &Identity, &mut stopping).unwrap();
        match outcome {
            SolveOutcome::Converged { iterations, .. } => assert_eq!(iterations, 1),
            other => panic!("expected convergence, got {other:?}"),
        }
        for i in 0..3 {
            assert!((x[i] - b[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn diagonal_system_converges() {
        // A = diag(2, 4, 8), b = (2, 4, 8) => x = (1, 1, 1)
        let a = AnyMat::Coo(
            CooMat::from_triplets(3, 3, vec![0, 1, 2], vec![0, 1, 2], vec![2.0, 4.0, 8.0]).unwrap(),
        );
        let b: Array1<f64, Host> = Array1::from_vec(vec![2.0, 4.0, 8.0]);
        let mut x: Array1<f64, Host> = Array1::with_len(3);
        let mut stopping = RelativeResidual::new(1e-10, 50);
        let outcome = bicgstab(&a, &b, &mut x, &Identity, &mut stopping).unwrap();
        assert!(matches!(outcome, SolveOutcome::Converged { .. }));
        for i in 0..3 {
            assert!((x[i] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn iteration_limit_is_reported_without_error() {
        // A singular-ish, hard-to-converge nudge within a tiny iteration
        // budget; asserts the outcome variant, not convergence itself.
        let a = AnyMat::Coo(
            CooMat::from_triplets(2, 2, vec![0, 0, 1], vec![0, 1, 1], vec![1.0, 1.0, 1.0]).unwrap(),
        );
        let b: Array1<f64, Host> = Array1::from_vec(vec![5.0, 7.0]);
        let mut x: Array1<f64, Host> = Array1::with_len(2);
        let mut stopping = RelativeResidual::new(1e-15, 0);
        let outcome = bicgstab(&a, &b, &mut x, &Identity, &mut stopping).unwrap();
        assert!(matches!(outcome, SolveOutcome::IterationLimitReached { iterations: 0, .. }));
    }
}
