//! FX instruments: forwards and vanilla European options.

use risk_core::types::{CurrencyPair, Date};

use super::{Direction, InstrumentError, OptionType};

/// FX forward: exchange `notional` of the base currency at rate `strike`
/// on the maturity date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxForward {
    /// Currency pair, quoted as quote units per base unit.
    pub pair: CurrencyPair,
    /// Base currency notional (always positive).
    pub notional: f64,
    /// Long buys the base currency forward; short sells it.
    pub direction: Direction,
    /// Contracted forward rate.
    pub strike: f64,
    /// Trade date.
    pub trade_date: Date,
    /// Settlement date.
    pub maturity_date: Date,
}

impl FxForward {
    /// Creates an FX forward, validating notional, strike and dates.
    pub fn new(
        pair: CurrencyPair,
        notional: f64,
        direction: Direction,
        strike: f64,
        trade_date: Date,
        maturity_date: Date,
    ) -> Result<Self, InstrumentError> {
        if notional <= 0.0 {
            return Err(InstrumentError::NonPositiveNotional(notional));
        }
        if strike <= 0.0 || !strike.is_finite() {
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
            pair,
            notional,
            direction,
            strike,
            trade_date,
            maturity_date,
        })
    }
}

/// Vanilla European FX option on `notional` of the base currency.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxOption {
    /// Currency pair, quoted as quote units per base unit.
    pub pair: CurrencyPair,
    /// Base currency notional (always positive).
    pub notional: f64,
    /// Long holds the option; short wrote it.
    pub direction: Direction,
    /// Call or put on the base currency.
    pub option_type: OptionType,
    /// Strike rate.
    pub strike: f64,
    /// Trade date.
    pub trade_date: Date,
    /// Expiry date (European exercise only).
    pub maturity_date: Date,
}

impl FxOption {
    /// Creates an FX option, validating notional, strike and dates.
    pub fn new(
        pair: CurrencyPair,
        notional: f64,
        direction: Direction,
        option_type: OptionType,
        strike: f64,
        trade_date: Date,
        maturity_date: Date,
    ) -> Result<Self, InstrumentError> {
        if notional <= 0.0 {
            return Err(InstrumentError::NonPositiveNotional(notional));
        }
        if strike <= 0.0 || !strike.is_finite() {
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
            pair,
            notional,
            direction,
            option_type,
            strike,
            trade_date,
            maturity_date,
        })
    }

    /// Vol surface key for this option's underlying.
    pub fn underlying(&self) -> String {
        self.pair.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::types::Currency;

    fn pair() -> CurrencyPair {
        CurrencyPair::new(Currency::EUR, Currency::USD)
    }

    #[test]
    fn test_forward_validation() {
        let ok = FxForward::new(
            pair(),
            1_000_000.0,
            Direction::Long,
            1.10,
            Date::from_ymd(2026, 1, 5).unwrap(),
            Date::from_ymd(2026, 7, 5).unwrap(),
        );
        assert!(ok.is_ok());

        let bad_strike = FxForward::new(
            pair(),
            1_000_000.0,
            Direction::Long,
            -1.0,
            Date::from_ymd(2026, 1, 5).unwrap(),
            Date::from_ymd(2026, 7, 5).unwrap(),
        );
        assert!(bad_strike.is_err());
    }

    #[test]
    fn test_option_underlying_key() {
        let opt = FxOption::new(
            pair(),
            500_000.0,
            Direction::Long,
            OptionType::Call,
            1.12,
            Date::from_ymd(2026, 1, 5).unwrap(),
            Date::from_ymd(2026, 10, 5).unwrap(),
        )
        .unwrap();
        assert_eq!(opt.underlying(), "EUR/USD");
    }
}
