// src/error.rs

use thiserror::Error;

/// Errors reported by the multigrid Poisson solver.
#[derive(Debug, Error)]
pub enum MgError {
    /// Grid dimensions must both be exact powers of two.
    #[error("multigrid solver only supports 2^n grids, got {width}x{height}")]
    NotPowerOfTwo { width: usize, height: usize },

    /// Both axes must exceed 4 cells so at least one level exists.
    #[error("grid {width}x{height} too small: both axes must exceed 4 cells")]
    TooSmall { width: usize, height: usize },

    /// Level index passed to an operator is out of range.
    #[error("invalid level index {level} (hierarchy has {count} levels)")]
    InvalidLevel { level: usize, count: usize },

    /// FMG retry exhausted without reaching the requested tolerance.
    #[error("FMG did not converge: residual {residual:.3e} > tolerance {tolerance:.3e}")]
    Convergence { residual: f64, tolerance: f64 },
}
