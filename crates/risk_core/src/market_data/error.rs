//! Market data error types.

use thiserror::Error;

use crate::math::interpolators::InterpolationError;

/// Errors raised while constructing or querying market data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketDataError {
    /// A required entry is absent from the snapshot.
    #[error("missing market data: {0}")]
    MissingMarketData(String),

    /// A quote has bid above ask.
    #[error("crossed quote for {isin}: bid {bid} > ask {ask}")]
    CrossedQuote {
        /// Instrument identifier
        isin: String,
        /// Bid price
        bid: f64,
        /// Ask price
        ask: f64,
    },

    /// An FX rate is zero or negative.
    #[error("non-positive FX rate for {pair}: {rate}")]
    NonPositiveFxRate {
        /// Currency pair
        pair: String,
        /// Offending rate
        rate: f64,
    },

    /// A curve failed validation (tenors not strictly increasing, or empty).
    #[error("invalid curve for {key}: {reason}")]
    InvalidCurve {
        /// Curve identifier (currency code)
        key: String,
        /// Failure description
        reason: String,
    },

    /// A vol grid failed validation.
    #[error("invalid vol surface for {key}: {reason}")]
    InvalidSurface {
        /// Surface identifier (underlying)
        key: String,
        /// Failure description
        reason: String,
    },

    /// An interpolation failure bubbled up from the math layer.
    #[error("interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),
}
