//! Fixed-coupon bond.

use risk_core::types::{
    CouponFrequency, Currency, Date, DayCountConvention, Isin, IssuerId,
};

use super::InstrumentError;

/// A bullet fixed-coupon bond.
///
/// The coupon schedule is regular, rolled back from maturity at the coupon
/// frequency; the final flow carries the redemption amount.
///
/// # Examples
///
/// ```
/// use risk_models::instruments::FixedCouponBond;
/// use risk_core::types::{CouponFrequency, Currency, Date, DayCountConvention, Isin, IssuerId};
///
/// let bond = FixedCouponBond::new(
///     Isin::new("XS0000000001"),
///     IssuerId::new("ISS-1"),
///     Currency::EUR,
///     1_000_000.0,
///     0.04,
///     CouponFrequency::Annual,
///     DayCountConvention::Act365,
///     Date::from_ymd(2024, 3, 1).unwrap(),
///     Date::from_ymd(2031, 3, 1).unwrap(),
/// ).unwrap();
///
/// let as_of = Date::from_ymd(2026, 3, 2).unwrap();
/// let flows = bond.cashflows(as_of);
/// assert_eq!(flows.len(), 5); // 2027..2031 coupons
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedCouponBond {
    /// Instrument identifier.
    pub isin: Isin,
    /// Issuer reference (weak, resolved against reference data).
    pub issuer_id: IssuerId,
    /// Denomination currency.
    pub currency: Currency,
    /// Face amount held (always positive).
    pub notional: f64,
    /// Annual coupon rate, decimal.
    pub coupon_rate: f64,
    /// Coupon frequency.
    pub frequency: CouponFrequency,
    /// Day count convention for accrual year fractions.
    pub day_count: DayCountConvention,
    /// Trade date.
    pub trade_date: Date,
    /// Maturity date.
    pub maturity_date: Date,
}

impl FixedCouponBond {
    /// Creates a bond, validating notional, coupon and date ordering.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        isin: Isin,
        issuer_id: IssuerId,
        currency: Currency,
        notional: f64,
        coupon_rate: f64,
        frequency: CouponFrequency,
        day_count: DayCountConvention,
        trade_date: Date,
        maturity_date: Date,
    ) -> Result<Self, InstrumentError> {
        if notional <= 0.0 {
            return Err(InstrumentError::NonPositiveNotional(notional));
        }
        if !(0.0..1.0).contains(&coupon_rate) {
            return Err(InstrumentError::InvalidField {
                field: "coupon_rate",
                value: coupon_rate,
            });
        }
        if maturity_date <= trade_date {
            return Err(InstrumentError::InvertedDates {
                trade_date,
                maturity: maturity_date,
            });
        }
        Ok(Self {
            isin,
            issuer_id,
            currency,
            notional,
            coupon_rate,
            frequency,
            day_count,
            trade_date,
            maturity_date,
        })
    }

    /// Whether this is a zero-coupon bond.
    #[inline]
    pub fn is_zero_coupon(&self) -> bool {
        self.coupon_rate == 0.0
    }

    /// Remaining cashflows after `as_of`, in chronological order.
    ///
    /// Each entry is `(year_fraction, amount)`; the year fraction is measured
    /// from `as_of` under the bond's day count. The maturity flow includes
    /// redemption. Empty when the bond has matured.
    pub fn cashflows(&self, as_of: Date) -> Vec<(f64, f64)> {
        let coupon = self.coupon_rate * self.notional
            / f64::from(self.frequency.per_year());
        let step = self.frequency.months_between();

        let mut flows = Vec::new();
        let mut date = self.maturity_date;
        while date > as_of {
            let yf = self.day_count.year_fraction(as_of, date);
            let amount = if date == self.maturity_date {
                coupon + self.notional
            } else {
                coupon
            };
            flows.push((yf, amount));
            date = date.minus_months(step);
        }
        flows.reverse();
        flows
    }

    /// Accrued interest at `as_of`, linear within the running coupon period.
    ///
    /// Zero for zero-coupon bonds and matured bonds.
    pub fn accrued_interest(&self, as_of: Date) -> f64 {
        if self.is_zero_coupon() || as_of >= self.maturity_date {
            return 0.0;
        }
        let step = self.frequency.months_between();

        // Roll back from maturity to the coupon date at or before as_of.
        let mut previous = self.maturity_date;
        while previous > as_of {
            previous = previous.minus_months(step);
        }
        let next = previous.plus_months(step);

        let days_in_period = (next - previous) as f64;
        if days_in_period <= 0.0 {
            return 0.0;
        }
        let days_accrued = (as_of - previous) as f64;

        let coupon = self.coupon_rate * self.notional
            / f64::from(self.frequency.per_year());
        coupon * days_accrued / days_in_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bond(coupon: f64, frequency: CouponFrequency) -> FixedCouponBond {
        FixedCouponBond::new(
            Isin::new("XS0000000001"),
            IssuerId::new("ISS-1"),
            Currency::EUR,
            1_000_000.0,
            coupon,
            frequency,
            DayCountConvention::Act365,
            Date::from_ymd(2024, 3, 1).unwrap(),
            Date::from_ymd(2031, 3, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_inverted_dates() {
        let result = FixedCouponBond::new(
            Isin::new("X"),
            IssuerId::new("I"),
            Currency::EUR,
            100.0,
            0.03,
            CouponFrequency::Annual,
            DayCountConvention::Act365,
            Date::from_ymd(2030, 1, 1).unwrap(),
            Date::from_ymd(2024, 1, 1).unwrap(),
        );
        assert!(matches!(
            result.unwrap_err(),
            InstrumentError::InvertedDates { .. }
        ));
    }

    #[test]
    fn test_rejects_absurd_coupon() {
        let result = FixedCouponBond::new(
            Isin::new("X"),
            IssuerId::new("I"),
            Currency::EUR,
            100.0,
            1.5,
            CouponFrequency::Annual,
            DayCountConvention::Act365,
            Date::from_ymd(2024, 1, 1).unwrap(),
            Date::from_ymd(2030, 1, 1).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_annual_cashflow_schedule() {
        let b = bond(0.04, CouponFrequency::Annual);
        let as_of = Date::from_ymd(2026, 3, 2).unwrap();
        let flows = b.cashflows(as_of);

        assert_eq!(flows.len(), 5);
        // Interim coupons of 40_000, final flow includes redemption.
        for (_, amount) in &flows[..4] {
            assert_relative_eq!(*amount, 40_000.0);
        }
        assert_relative_eq!(flows[4].1, 1_040_000.0);
        // Chronological order.
        assert!(flows.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_semiannual_coupon_amount() {
        let b = bond(0.04, CouponFrequency::SemiAnnual);
        let as_of = Date::from_ymd(2030, 3, 2).unwrap();
        let flows = b.cashflows(as_of);
        assert_eq!(flows.len(), 2);
        assert_relative_eq!(flows[0].1, 20_000.0);
        assert_relative_eq!(flows[1].1, 1_020_000.0);
    }

    #[test]
    fn test_matured_bond_has_no_flows() {
        let b = bond(0.04, CouponFrequency::Annual);
        let flows = b.cashflows(Date::from_ymd(2031, 3, 1).unwrap());
        assert!(flows.is_empty());
    }

    #[test]
    fn test_zero_coupon_single_flow() {
        let b = bond(0.0, CouponFrequency::Annual);
        let as_of = Date::from_ymd(2026, 3, 1).unwrap();
        let flows = b.cashflows(as_of);
        assert_eq!(flows.len(), 5);
        // Interim "coupons" are zero amounts; only redemption pays.
        assert_relative_eq!(flows[4].1, 1_000_000.0);
        assert!(b.is_zero_coupon());
    }

    #[test]
    fn test_accrued_interest_midperiod() {
        let b = bond(0.04, CouponFrequency::Annual);
        // Half-way through the 2026-03-01 .. 2027-03-01 period.
        let as_of = Date::from_ymd(2026, 9, 1).unwrap();
        let accrued = b.accrued_interest(as_of);
        let days_in_period = 365.0;
        let days_accrued = 184.0;
        assert_relative_eq!(
            accrued,
            40_000.0 * days_accrued / days_in_period,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_accrued_zero_on_coupon_date() {
        let b = bond(0.04, CouponFrequency::Annual);
        assert_relative_eq!(
            b.accrued_interest(Date::from_ymd(2027, 3, 1).unwrap()),
            0.0
        );
    }

    #[test]
    fn test_accrued_zero_for_zero_coupon() {
        let b = bond(0.0, CouponFrequency::Annual);
        assert_eq!(b.accrued_interest(Date::from_ymd(2026, 9, 1).unwrap()), 0.0);
    }
}
