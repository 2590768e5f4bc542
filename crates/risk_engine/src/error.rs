//! Engine error taxonomy.
//!
//! Propagation policy: per-position failures downgrade only that position
//! (it prices as `Unpriced` and the snapshot becomes `Partial`); per-block
//! failures null that block and also yield `Partial`. Only market view
//! construction failure, or cancellation/deadline before any block
//! completed, fails the snapshot. `Internal` always surfaces verbatim.

use risk_core::market_data::MarketDataError;
use risk_models::pricing::PricingError;
use thiserror::Error;

/// Engine-level errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed position, reference data or configuration.
    #[error("input validation failed: {0}")]
    InputValidation(String),

    /// A required market data entry is absent or invalid.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// The bond yield solver failed to converge.
    #[error("yield solve failed: {0}")]
    YtmNotConverged(String),

    /// The P&L history is shorter than the minimum VaR window.
    #[error("insufficient history: {got} observations, need {need}")]
    InsufficientHistory {
        /// Observations available
        got: usize,
        /// Observations required
        need: usize,
    },

    /// The configured stress window holds too few observations.
    #[error("stress window too short: {got} observations, need {need}")]
    StressWindowTooShort {
        /// Observations inside the window
        got: usize,
        /// Observations required
        need: usize,
    },

    /// A non-finite intermediate value appeared.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    /// The caller's cancellation token was set.
    #[error("cancelled")]
    Cancelled,

    /// The caller-supplied deadline elapsed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A bug: an invariant the engine relies on was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PricingError> for EngineError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::MarketData(e) => EngineError::MarketData(e),
            PricingError::YtmNotConverged { .. } => EngineError::YtmNotConverged(err.to_string()),
            PricingError::NumericalInstability(msg) => EngineError::NumericInstability(msg),
            other => EngineError::InputValidation(other.to_string()),
        }
    }
}
