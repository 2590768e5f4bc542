//! Interest rate instruments: swaps, caps/floors, European swaptions.

use risk_core::types::{CouponFrequency, Currency, Date};

use super::InstrumentError;

/// Fixed-vs-floating swap direction, seen from the position holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapDirection {
    /// Pay the fixed leg, receive floating.
    PayFixed,
    /// Receive the fixed leg, pay floating.
    ReceiveFixed,
}

/// Vanilla single-currency interest rate swap.
///
/// Both legs share the notional, frequency and maturity; the floating leg
/// projects off the same zero curve that discounts both legs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterestRateSwap {
    /// Leg currency.
    pub currency: Currency,
    /// Notional (always positive).
    pub notional: f64,
    /// Fixed leg rate, decimal.
    pub fixed_rate: f64,
    /// Direction of the fixed leg.
    pub direction: SwapDirection,
    /// Payment frequency of both legs.
    pub frequency: CouponFrequency,
    /// Trade date.
    pub trade_date: Date,
    /// Final payment date.
    pub maturity_date: Date,
}

impl InterestRateSwap {
    /// Creates a swap, validating notional, rate and dates.
    pub fn new(
        currency: Currency,
        notional: f64,
        fixed_rate: f64,
        direction: SwapDirection,
        frequency: CouponFrequency,
        trade_date: Date,
        maturity_date: Date,
    ) -> Result<Self, InstrumentError> {
        if notional <= 0.0 {
            return Err(InstrumentError::NonPositiveNotional(notional));
        }
        if !fixed_rate.is_finite() || fixed_rate.abs() >= 1.0 {
            return Err(InstrumentError::InvalidField {
                field: "fixed_rate",
                value: fixed_rate,
            });
        }
        if maturity_date <= trade_date {
            return Err(InstrumentError::InvertedDates {
                trade_date,
                maturity: maturity_date,
            });
        }
        Ok(Self {
            currency,
            notional,
            fixed_rate,
            direction,
            frequency,
            trade_date,
            maturity_date,
        })
    }
}

/// Cap (payoff on rates above strike) or floor (below strike).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapFloorKind {
    /// Strip of caplets.
    Cap,
    /// Strip of floorlets.
    Floor,
}

/// Interest rate cap or floor: a strip of caplets/floorlets on the forward
/// rate at the given frequency until maturity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapFloor {
    /// Cap or floor.
    pub kind: CapFloorKind,
    /// Leg currency.
    pub currency: Currency,
    /// Notional (always positive).
    pub notional: f64,
    /// Strike rate, decimal.
    pub strike: f64,
    /// Caplet frequency.
    pub frequency: CouponFrequency,
    /// Trade date.
    pub trade_date: Date,
    /// Final caplet payment date.
    pub maturity_date: Date,
}

impl CapFloor {
    /// Creates a cap/floor, validating notional, strike and dates.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: CapFloorKind,
        currency: Currency,
        notional: f64,
        strike: f64,
        frequency: CouponFrequency,
        trade_date: Date,
        maturity_date: Date,
    ) -> Result<Self, InstrumentError> {
        if notional <= 0.0 {
            return Err(InstrumentError::NonPositiveNotional(notional));
        }
        if !strike.is_finite() || strike <= 0.0 || strike >= 1.0 {
            return Err(InstrumentError::InvalidField {
                field: "strike",
                value: strike,
            });
        }
        if maturity_date <= trade_date {
            return Err(InstrumentError::InvertedDates {
                trade_date,
                maturity: maturity_date,
            });
        }
        Ok(Self {
            kind,
            currency,
            notional,
            strike,
            frequency,
            trade_date,
            maturity_date,
        })
    }

    /// Vol surface key for this instrument's underlying.
    pub fn underlying(&self) -> String {
        format!("{}-IRS", self.currency)
    }
}

/// European swaption: the right to enter a swap of `swap_tenor_years` at
/// `strike` on the expiry date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swaption {
    /// Direction of the underlying swap's fixed leg if exercised.
    pub direction: SwapDirection,
    /// Underlying swap currency.
    pub currency: Currency,
    /// Underlying swap notional (always positive).
    pub notional: f64,
    /// Fixed strike rate, decimal.
    pub strike: f64,
    /// Payment frequency of the underlying swap.
    pub frequency: CouponFrequency,
    /// Underlying swap tenor in whole years.
    pub swap_tenor_years: u32,
    /// Trade date.
    pub trade_date: Date,
    /// Option expiry (European exercise only).
    pub expiry_date: Date,
}

impl Swaption {
    /// Creates a swaption, validating notional, strike, tenor and dates.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        direction: SwapDirection,
        currency: Currency,
        notional: f64,
        strike: f64,
        frequency: CouponFrequency,
        swap_tenor_years: u32,
        trade_date: Date,
        expiry_date: Date,
    ) -> Result<Self, InstrumentError> {
        if notional <= 0.0 {
            return Err(InstrumentError::NonPositiveNotional(notional));
        }
        if !strike.is_finite() || strike <= 0.0 || strike >= 1.0 {
            return Err(InstrumentError::InvalidField {
                field: "strike",
                value: strike,
            });
        }
        if swap_tenor_years == 0 {
            return Err(InstrumentError::InvalidField {
                field: "swap_tenor_years",
                value: 0.0,
            });
        }
        if expiry_date <= trade_date {
            return Err(InstrumentError::InvertedDates {
                trade_date,
                maturity: expiry_date,
            });
        }
        Ok(Self {
            direction,
            currency,
            notional,
            strike,
            frequency,
            swap_tenor_years,
            trade_date,
            expiry_date,
        })
    }

    /// Vol surface key for this instrument's underlying.
    pub fn underlying(&self) -> String {
        format!("{}-IRS", self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_validation() {
        let ok = InterestRateSwap::new(
            Currency::EUR,
            10_000_000.0,
            0.031,
            SwapDirection::PayFixed,
            CouponFrequency::Annual,
            Date::from_ymd(2026, 1, 5).unwrap(),
            Date::from_ymd(2031, 1, 5).unwrap(),
        );
        assert!(ok.is_ok());

        let bad = InterestRateSwap::new(
            Currency::EUR,
            10_000_000.0,
            2.0,
            SwapDirection::PayFixed,
            CouponFrequency::Annual,
            Date::from_ymd(2026, 1, 5).unwrap(),
            Date::from_ymd(2031, 1, 5).unwrap(),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_capfloor_underlying_key() {
        let cap = CapFloor::new(
            CapFloorKind::Cap,
            Currency::EUR,
            5_000_000.0,
            0.035,
            CouponFrequency::Quarterly,
            Date::from_ymd(2026, 1, 5).unwrap(),
            Date::from_ymd(2029, 1, 5).unwrap(),
        )
        .unwrap();
        assert_eq!(cap.underlying(), "EUR-IRS");
    }

    #[test]
    fn test_swaption_rejects_zero_tenor() {
        let result = Swaption::new(
            SwapDirection::PayFixed,
            Currency::EUR,
            1_000_000.0,
            0.03,
            CouponFrequency::Annual,
            0,
            Date::from_ymd(2026, 1, 5).unwrap(),
            Date::from_ymd(2027, 1, 5).unwrap(),
        );
        assert!(result.is_err());
    }
}
