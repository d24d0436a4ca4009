//! Error taxonomy for the sparse-matrix runtime.
//!
//! `SparseError` covers the structural failures shared by containers,
//! conversions and SpMV kernels (§7 of the design: ShapeMismatch,
//! MemorySpaceMismatch, FormatConversionError). Solver breakdowns are a
//! distinct error (`SolverError`) since they carry the best-effort solution
//! found so far rather than simply aborting.

use thiserror::Error;

/// Errors shared by container construction, format conversion and SpMV.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SparseError {
    /// Operand dimensions are incompatible (e.g. `|x| != A.num_cols()`).
    #[error("shape mismatch: {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Where the mismatch was detected.
        context: &'static str,
        /// The shape that was expected.
        expected: (usize, usize),
        /// The shape that was actually supplied.
        got: (usize, usize),
    },

    /// Operands do not reside in the same memory space.
    #[error("memory space mismatch: {context}")]
    MemorySpaceMismatch {
        /// Where the mismatch was detected.
        context: &'static str,
    },

    /// A format conversion was refused because the destination format
    /// cannot represent the source matrix efficiently.
    #[error("format conversion failed: {reason}")]
    FormatConversionError {
        /// Human-readable explanation, including the threshold that was
        /// exceeded and the value observed.
        reason: String,
    },

    /// A structural invariant of a container was violated on construction.
    #[error("invalid sparse structure: {0}")]
    InvalidStructure(String),
}

impl SparseError {
    pub(crate) fn shape(
        context: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    ) -> Self {
        SparseError::ShapeMismatch { context, expected, got }
    }

    pub(crate) fn space(context: &'static str) -> Self {
        SparseError::MemorySpaceMismatch { context }
    }
}

/// Result alias for fallible sparse-matrix operations.
pub type SparseResult<T> = Result<T, SparseError>;

/// Why a BiCGstab iteration could not continue.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownReason {
    /// `(AMp, r*)` was (numerically) zero in the computation of `alpha`.
    #[error("alpha denominator (AMp, r*) vanished")]
    AlphaDenominatorZero,
    /// `(AMs, AMs)` was (numerically) zero in the computation of `omega`.
    #[error("omega denominator (AMs, AMs) vanished")]
    OmegaDenominatorZero,
}

/// Errors specific to the BiCGstab solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A scalar recurrence denominator vanished; no further iteration is
    /// numerically meaningful. The caller still owns the best `x` found so
    /// far (solver returns it alongside this error).
    #[error("solver breakdown at iteration {iteration}: {reason}")]
    Breakdown {
        /// Iteration at which the breakdown was detected.
        iteration: usize,
        /// Which denominator vanished.
        reason: BreakdownReason,
    },

    /// A shape or memory-space error propagated from SpMV/BLAS-1.
    #[error(transparent)]
    Sparse(#[from] SparseError),
}

/// Result alias for the solver.
pub type SolverResult<T> = Result<T, SolverError>;
