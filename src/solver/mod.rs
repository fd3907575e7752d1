//! Iterative solution of the sparse linear systems arising in the curve fit.
//!
//! - [`sparse`] stores a square matrix as its diagonal plus compressed off-diagonal rows
//! - [`bicg`] solves `A x = b` with the Jacobi preconditioned biconjugate gradient method

use thiserror::Error;

pub mod bicg;
pub mod sparse;

#[derive(Error, Debug, PartialEq)]
pub enum SolverError {
    #[error("The system is degenerate, the diagonal entry `{value:e}` in row `{row}` vanishes.")]
    DegenerateSystem { row: usize, value: f64 },

    #[error("A vector of length `{found}` does not match the system dimension `{expected}`.")]
    DimensionMismatch { expected: usize, found: usize },
}
