//! Instrument and position definitions.
//!
//! A [`Position`] couples a portfolio reference with one [`Instrument`] and,
//! for derivatives, a counterparty reference. Counterparty and issuer
//! references are plain identifiers resolved against read-only tables by the
//! engine; positions own nothing beyond their own terms.

pub mod bond;
pub mod fx;
pub mod rates;

pub use bond::FixedCouponBond;
pub use fx::{FxForward, FxOption};
pub use rates::{CapFloor, CapFloorKind, InterestRateSwap, Swaption, SwapDirection};

use risk_core::types::{CounterpartyId, Currency, Date, PortfolioId, PositionId};
use thiserror::Error;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Long the instrument.
    Long,
    /// Short the instrument.
    Short,
}

impl Direction {
    /// Sign convention: +1 for long, -1 for short.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// European option payoff type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Right to buy the underlying at the strike.
    Call,
    /// Right to sell the underlying at the strike.
    Put,
}

/// Instrument construction failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstrumentError {
    /// Notional must be strictly positive.
    #[error("notional must be positive, got {0}")]
    NonPositiveNotional(f64),

    /// Strike or rate outside its meaningful range.
    #[error("invalid {field}: {value}")]
    InvalidField {
        /// Offending field name
        field: &'static str,
        /// Supplied value
        value: f64,
    },

    /// Maturity does not postdate the trade date.
    #[error("maturity {maturity} does not postdate trade date {trade_date}")]
    InvertedDates {
        /// Trade date
        trade_date: Date,
        /// Maturity date
        maturity: Date,
    },
}

/// One tradable instrument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Instrument {
    /// Fixed-coupon bond.
    Bond(FixedCouponBond),
    /// FX forward.
    FxForward(FxForward),
    /// Vanilla European FX option.
    FxOption(FxOption),
    /// Vanilla interest rate swap.
    IrSwap(InterestRateSwap),
    /// Interest rate cap or floor.
    CapFloor(CapFloor),
    /// European swaption.
    Swaption(Swaption),
}

impl Instrument {
    /// The instrument's notional (always positive).
    pub fn notional(&self) -> f64 {
        match self {
            Instrument::Bond(b) => b.notional,
            Instrument::FxForward(f) => f.notional,
            Instrument::FxOption(o) => o.notional,
            Instrument::IrSwap(s) => s.notional,
            Instrument::CapFloor(c) => c.notional,
            Instrument::Swaption(s) => s.notional,
        }
    }

    /// Final maturity or expiry date.
    pub fn maturity(&self) -> Date {
        match self {
            Instrument::Bond(b) => b.maturity_date,
            Instrument::FxForward(f) => f.maturity_date,
            Instrument::FxOption(o) => o.maturity_date,
            Instrument::IrSwap(s) => s.maturity_date,
            Instrument::CapFloor(c) => c.maturity_date,
            Instrument::Swaption(s) => s.expiry_date,
        }
    }

    /// Trade date.
    pub fn trade_date(&self) -> Date {
        match self {
            Instrument::Bond(b) => b.trade_date,
            Instrument::FxForward(f) => f.trade_date,
            Instrument::FxOption(o) => o.trade_date,
            Instrument::IrSwap(s) => s.trade_date,
            Instrument::CapFloor(c) => c.trade_date,
            Instrument::Swaption(s) => s.trade_date,
        }
    }

    /// Whether this is a derivative (everything except bonds).
    #[inline]
    pub fn is_derivative(&self) -> bool {
        !matches!(self, Instrument::Bond(_))
    }

    /// The currency the instrument's values are expressed in.
    pub fn currency(&self) -> Currency {
        match self {
            Instrument::Bond(b) => b.currency,
            Instrument::FxForward(f) => f.pair.quote,
            Instrument::FxOption(o) => o.pair.quote,
            Instrument::IrSwap(s) => s.currency,
            Instrument::CapFloor(c) => c.currency,
            Instrument::Swaption(s) => s.currency,
        }
    }

    /// Short kind label for logging and alert text.
    pub fn kind(&self) -> &'static str {
        match self {
            Instrument::Bond(_) => "Bond",
            Instrument::FxForward(_) => "FxForward",
            Instrument::FxOption(_) => "FxOption",
            Instrument::IrSwap(_) => "IrSwap",
            Instrument::CapFloor(_) => "CapFloor",
            Instrument::Swaption(_) => "Swaption",
        }
    }
}

/// A position held in a portfolio.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Position identifier.
    pub id: PositionId,
    /// Owning portfolio.
    pub portfolio_id: PortfolioId,
    /// The instrument held.
    pub instrument: Instrument,
    /// Counterparty reference, required for derivative positions.
    pub counterparty_id: Option<CounterpartyId>,
}

impl Position {
    /// Creates a position, checking the notional invariant.
    pub fn new(
        id: PositionId,
        portfolio_id: PortfolioId,
        instrument: Instrument,
        counterparty_id: Option<CounterpartyId>,
    ) -> Result<Self, InstrumentError> {
        if instrument.notional() <= 0.0 {
            return Err(InstrumentError::NonPositiveNotional(instrument.notional()));
        }
        Ok(Self {
            id,
            portfolio_id,
            instrument,
            counterparty_id,
        })
    }
}
