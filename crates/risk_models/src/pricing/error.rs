//! Pricing error types.

use risk_core::market_data::MarketDataError;
use risk_core::types::SolverError;
use thiserror::Error;

/// Errors from the bond and derivative pricers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// A required market data entry is missing or invalid.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// The yield solver failed to converge on the market dirty price.
    #[error("YTM did not converge for {isin}: {source}")]
    YtmNotConverged {
        /// Bond identifier
        isin: String,
        /// Underlying solver failure
        source: SolverError,
    },

    /// The instrument has matured relative to the valuation date.
    #[error("instrument matured on or before the valuation date")]
    MaturedInstrument,

    /// A quote exists but lacks the field this pricer needs.
    #[error("quote for {isin} missing {field}")]
    IncompleteQuote {
        /// Instrument identifier
        isin: String,
        /// Missing field name
        field: &'static str,
    },

    /// A non-finite intermediate appeared during valuation.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}
