//! Numerical building blocks: interpolation and root finding.

pub mod interpolators;
pub mod solvers;

pub use interpolators::{BilinearInterpolator, InterpolationError, LinearInterpolator};
pub use solvers::{solve_bracketed, SolverConfig};
