//! Error types for the foundation layer.
//!
//! This module provides:
//! - `DateError`: errors from date construction and parsing
//! - `CurrencyError`: errors from currency parsing
//! - `SolverError`: errors from root-finding solvers

use thiserror::Error;

/// Date-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Invalid date components (e.g. February 30th).
    #[error("invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day component (1-31)
        day: u32,
    },

    /// Failed to parse a date string.
    #[error("date parse error: {0}")]
    ParseError(String),
}

/// Currency-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Unknown ISO 4217 currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Errors from root-finding solvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The function does not change sign over the bracketing interval.
    #[error("no sign change over bracket [{lo}, {hi}]")]
    NoBracket {
        /// Lower bracket bound
        lo: f64,
        /// Upper bracket bound
        hi: f64,
    },

    /// The iteration budget was exhausted before convergence.
    #[error("failed to converge within {iterations} iterations")]
    MaxIterationsExceeded {
        /// Iterations performed
        iterations: usize,
    },

    /// The iteration produced a non-finite intermediate value.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}
