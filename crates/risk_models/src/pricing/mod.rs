//! Deterministic position pricing.
//!
//! [`price_position`] is the single entry point the engine fans out over:
//! it dispatches to the bond or derivative pricer and returns a uniform
//! [`PositionValuation`]. Pricing never consults anything but the position
//! and the validated view, so identical inputs yield identical outputs.

pub mod bond;
pub mod derivative;
pub mod error;

pub use bond::{analyze_bond, price_from_yield, solve_ytm, BondAnalytics};
pub use derivative::{
    price_cap_floor, price_fx_forward, price_fx_option, price_ir_swap, price_swaption,
};
pub use error::PricingError;

use risk_core::market_data::MarketDataView;
use risk_core::math::SolverConfig;
use risk_core::types::Currency;

use crate::instruments::{Instrument, Position};

/// Uniform valuation result for one position, in the instrument's currency.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Valuation {
    /// Currency the values below are expressed in.
    pub currency: Currency,
    /// Mark-to-market: dirty market value for bonds, contract MtM for
    /// derivatives (signed by direction).
    pub mtm: f64,
    /// First-order sensitivity to the underlying (forward delta for FX,
    /// fixed-leg equivalent for rates; zero for bonds).
    pub delta: f64,
    /// P&L for a +1 bp parallel rate move (signed).
    pub dv01: f64,
    /// Vega per 1.00 vol move (options only).
    pub vega: f64,
    /// Gamma (options only).
    pub gamma: f64,
    /// Theta per year (options only).
    pub theta: f64,
}

impl Valuation {
    /// A valuation with every sensitivity zeroed, in the given currency.
    pub fn flat(currency: Currency, mtm: f64) -> Self {
        Self {
            currency,
            mtm,
            delta: 0.0,
            dv01: 0.0,
            vega: 0.0,
            gamma: 0.0,
            theta: 0.0,
        }
    }
}

/// Full pricing result for one position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionValuation {
    /// Uniform valuation block.
    pub valuation: Valuation,
    /// Bond analytics when the position is a bond.
    pub bond: Option<BondAnalytics>,
}

/// Prices one position against the view.
///
/// # Errors
///
/// Propagates [`PricingError`] from the underlying pricer; the engine maps
/// failures to an `Unpriced` outcome for that position rather than failing
/// the snapshot.
pub fn price_position(
    position: &Position,
    view: &MarketDataView,
    solver: SolverConfig,
) -> Result<PositionValuation, PricingError> {
    let as_of = view.as_of_date();
    match &position.instrument {
        Instrument::Bond(b) => {
            let quote = view.quote(&b.isin)?;
            let analytics = analyze_bond(b, quote, as_of, solver)?;
            Ok(PositionValuation {
                valuation: Valuation {
                    currency: b.currency,
                    mtm: analytics.dirty_value,
                    delta: 0.0,
                    dv01: analytics.dv01,
                    vega: 0.0,
                    gamma: 0.0,
                    theta: 0.0,
                },
                bond: Some(analytics),
            })
        }
        Instrument::FxForward(f) => Ok(PositionValuation {
            valuation: price_fx_forward(f, view)?,
            bond: None,
        }),
        Instrument::FxOption(o) => Ok(PositionValuation {
            valuation: price_fx_option(o, view)?,
            bond: None,
        }),
        Instrument::IrSwap(s) => Ok(PositionValuation {
            valuation: price_ir_swap(s, view)?,
            bond: None,
        }),
        Instrument::CapFloor(c) => Ok(PositionValuation {
            valuation: price_cap_floor(c, view)?,
            bond: None,
        }),
        Instrument::Swaption(s) => Ok(PositionValuation {
            valuation: price_swaption(s, view)?,
            bond: None,
        }),
    }
}
