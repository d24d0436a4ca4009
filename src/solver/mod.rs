//! Krylov solver (C7) and its two supporting capability sets: stopping
//! criteria (C6) and the preconditioner hook spec §9 leaves pluggable.

pub mod bicgstab;
pub mod precond;
pub mod stopping;

pub use bicgstab::{bicgstab, SolveOutcome};
pub use precond::{Identity, Preconditioner};
pub use stopping::{RelativeResidual, StoppingCriterion};
