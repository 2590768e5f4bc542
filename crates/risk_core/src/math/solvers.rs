//! Bracketed root finding.
//!
//! The yield solver combines bracketed bisection (robust, linear) with a
//! Newton refinement stage (quadratic near the root). Bisection narrows the
//! bracket until Newton's update stays inside it, which keeps the combined
//! scheme globally convergent on monotone pricing functions while reaching
//! the tight tolerances the yield round-trip requires.

use super::super::types::SolverError;

/// Solver configuration: convergence tolerance and iteration budget.
///
/// # Examples
///
/// ```
/// use risk_core::math::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.max_iterations, 50);
///
/// let tight = SolverConfig::new(1e-12, 100);
/// assert_eq!(tight.tolerance, 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Convergence tolerance on the root (absolute, in solution units).
    pub tolerance: f64,
    /// Maximum number of iterations across both stages.
    pub max_iterations: usize,
}

impl SolverConfig {
    /// Creates a solver configuration.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }
}

impl Default for SolverConfig {
    /// Default: tolerance 1e-10, 50 iterations.
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 50,
        }
    }
}

/// Finds a root of `f` in `[lo, hi]` by bisection followed by Newton
/// refinement with the numerical derivative `df`.
///
/// # Arguments
///
/// * `f` - Function whose root is sought
/// * `df` - Derivative of `f`
/// * `lo`, `hi` - Bracketing interval; `f` must change sign across it
/// * `config` - Tolerance and iteration budget
///
/// # Errors
///
/// * `SolverError::NoBracket` - `f(lo)` and `f(hi)` have the same sign
/// * `SolverError::MaxIterationsExceeded` - budget exhausted before
///   `|x_{n+1} - x_n| < tolerance`
/// * `SolverError::NumericalInstability` - a non-finite intermediate appeared
///
/// # Examples
///
/// ```
/// use risk_core::math::{solve_bracketed, SolverConfig};
///
/// // Solve x² = 2 on [0, 2]
/// let root = solve_bracketed(
///     |x| x * x - 2.0,
///     |x| 2.0 * x,
///     0.0,
///     2.0,
///     SolverConfig::default(),
/// )
/// .unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn solve_bracketed<F, G>(
    f: F,
    df: G,
    lo: f64,
    hi: f64,
    config: SolverConfig,
) -> Result<f64, SolverError>
where
    F: Fn(f64) -> f64,
    G: Fn(f64) -> f64,
{
    let mut a = lo;
    let mut b = hi;
    let mut fa = f(a);
    let fb = f(b);

    if !fa.is_finite() || !fb.is_finite() {
        return Err(SolverError::NumericalInstability(
            "non-finite function value at bracket".to_string(),
        ));
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(SolverError::NoBracket { lo, hi });
    }

    // Stage 1: bisection down to a loose bracket, spending at most half the
    // iteration budget.
    let bisection_budget = config.max_iterations / 2;
    let mut x = 0.5 * (a + b);
    for _ in 0..bisection_budget {
        x = 0.5 * (a + b);
        let fx = f(x);
        if !fx.is_finite() {
            return Err(SolverError::NumericalInstability(
                "non-finite function value during bisection".to_string(),
            ));
        }
        if fx == 0.0 || (b - a) < config.tolerance {
            return Ok(x);
        }
        if fx.signum() == fa.signum() {
            a = x;
            fa = fx;
        } else {
            b = x;
        }
    }

    // Stage 2: Newton refinement from the bracket midpoint, falling back to
    // bisection whenever the update leaves the bracket or the derivative
    // degenerates.
    for _ in bisection_budget..config.max_iterations {
        let fx = f(x);
        let dfx = df(x);
        if !fx.is_finite() || !dfx.is_finite() {
            return Err(SolverError::NumericalInstability(
                "non-finite value during Newton refinement".to_string(),
            ));
        }

        let next = if dfx.abs() > 1e-300 {
            x - fx / dfx
        } else {
            0.5 * (a + b)
        };
        let next = if next > a && next < b {
            next
        } else {
            0.5 * (a + b)
        };

        // Maintain the bracket.
        if fx.signum() == fa.signum() {
            a = x;
            fa = fx;
        } else {
            b = x;
        }

        if (next - x).abs() < config.tolerance {
            return Ok(next);
        }
        x = next;
    }

    Err(SolverError::MaxIterationsExceeded {
        iterations: config.max_iterations,
    })
}
