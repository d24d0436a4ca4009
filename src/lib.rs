//! Sparse linear algebra over heterogeneous (host/device) memory.
//!
//! Five closed matrix-format variants ([`sparse::CooMat`], [`sparse::CsrMat`],
//! [`sparse::DiaMat`], [`sparse::EllMat`], [`sparse::HybMat`]) behind one
//! tagged-union type, [`sparse::AnyMat`]; conversions between any pair via
//! [`sparse::convert`]; SpMV kernels per format via [`sparse::spmv`]; and a
//! BiCGstab Krylov solver ([`solver::bicgstab`]) built on top. `Host` and
//! `Device` ([`space`]) are compile-time tags selecting sequential vs
//! data-parallel (rayon, behind the `parallel` feature) execution rather
//! than a real accelerator driver -- see DESIGN.md for the rationale.
//!
//! Dense BLAS-1 ([`blas1`]) is included only as the minimal companion
//! BiCGstab needs to compile and run; it is not a format-aware subsystem
//! the way the sparse containers and kernels are.

pub mod array;
pub mod blas1;
pub mod errors;
pub mod solver;
pub mod space;
pub mod sparse;

pub use array::Array1;
pub use errors::{BreakdownReason, SolverError, SolverResult, SparseError, SparseResult};
pub use space::{Device, Executor, Host, MemorySpace};
