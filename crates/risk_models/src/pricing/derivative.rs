//! Derivative pricers: FX forwards and options, IR swaps, caps/floors,
//! European swaptions.
//!
//! Every pricer reads curves, surfaces and FX spots exclusively through the
//! validated view, so interpolation semantics match the market data layer
//! exactly. Rate-sensitive trades report a numeric DV01 from a ±1 bp parallel
//! shift of the discount curve (half-difference); that DV01 also serves as
//! the trade's directional delta for exposure netting.

use risk_core::market_data::{MarketDataView, VolSurface, ZeroCurve};
use risk_core::types::{Date, DayCountConvention};

use crate::analytical::{black76_greeks, black76_price};
use crate::instruments::{
    CapFloor, CapFloorKind, FxForward, FxOption, InterestRateSwap, OptionType, SwapDirection,
    Swaption,
};

use super::error::PricingError;
use super::Valuation;

/// Day count used for derivative time-to-event measures.
const TIME_BASIS: DayCountConvention = DayCountConvention::Act365;

fn time_to(as_of: Date, date: Date) -> f64 {
    TIME_BASIS.year_fraction(as_of, date)
}

/// Prices an FX forward.
///
/// MtM = ±N · (F − K) · DF, with the market forward from covered interest
/// parity, `F = S · DF_base / DF_quote`, and the settlement discount factor
/// read off the base-currency curve. The MtM is expressed in the quote
/// currency; delta is ±N · DF against the forward.
pub fn price_fx_forward(
    forward: &FxForward,
    view: &MarketDataView,
) -> Result<Valuation, PricingError> {
    let t = time_to(view.as_of_date(), forward.maturity_date);
    if t <= 0.0 {
        return Err(PricingError::MaturedInstrument);
    }

    let spot = view.fx_rate(forward.pair)?;
    let df_base = view.curve(forward.pair.base)?.discount_factor(t)?;
    let df_quote = view.curve(forward.pair.quote)?.discount_factor(t)?;
    let market_forward = spot * df_base / df_quote;

    let sign = forward.direction.sign();
    let mtm = sign * forward.notional * (market_forward - forward.strike) * df_base;
    if !mtm.is_finite() {
        return Err(PricingError::NumericalInstability(
            "non-finite FX forward MtM".to_string(),
        ));
    }

    Ok(Valuation {
        currency: forward.pair.quote,
        mtm,
        delta: sign * forward.notional * df_base,
        dv01: 0.0,
        vega: 0.0,
        gamma: 0.0,
        theta: 0.0,
    })
}

/// Prices a vanilla European FX option with Black-76 on the FX forward.
///
/// The vol is interpolated from the pair's surface at (expiry, strike);
/// Greeks are scaled by signed notional.
pub fn price_fx_option(option: &FxOption, view: &MarketDataView) -> Result<Valuation, PricingError> {
    let t = time_to(view.as_of_date(), option.maturity_date);
    if t <= 0.0 {
        return Err(PricingError::MaturedInstrument);
    }

    let spot = view.fx_rate(option.pair)?;
    let df_base = view.curve(option.pair.base)?.discount_factor(t)?;
    let df_quote = view.curve(option.pair.quote)?.discount_factor(t)?;
    let market_forward = spot * df_base / df_quote;

    let vol = view.vol_surface(&option.underlying())?.vol(t, option.strike)?;

    let unit_price = black76_price(
        option.option_type,
        market_forward,
        option.strike,
        vol,
        t,
        df_base,
    );
    let greeks = black76_greeks(
        option.option_type,
        market_forward,
        option.strike,
        vol,
        t,
        df_base,
    );

    let scale = option.direction.sign() * option.notional;
    Ok(Valuation {
        currency: option.pair.quote,
        mtm: scale * unit_price,
        delta: scale * greeks.delta,
        dv01: 0.0,
        vega: scale * greeks.vega,
        gamma: scale * greeks.gamma,
        theta: scale * greeks.theta,
    })
}

/// Remaining payment times of a regular schedule rolled back from maturity,
/// strictly after the valuation date, chronological.
fn payment_dates(as_of: Date, maturity: Date, months: u32) -> Vec<Date> {
    let mut dates = Vec::new();
    let mut date = maturity;
    while date > as_of {
        dates.push(date);
        date = date.minus_months(months);
    }
    dates.reverse();
    dates
}

/// Present value of a vanilla swap on a given curve (positive = receiver of
/// the floating leg is in the money), before applying direction.
fn swap_pv_pay_float_received(
    swap: &InterestRateSwap,
    curve: &ZeroCurve,
    as_of: Date,
) -> Result<f64, PricingError> {
    let months = swap.frequency.months_between();
    let dates = payment_dates(as_of, swap.maturity_date, months);
    if dates.is_empty() {
        return Err(PricingError::MaturedInstrument);
    }

    // Fixed leg: Σ N · K · τᵢ · DF(tᵢ), with the full accrual period of each
    // payment (the running period's start may predate the valuation date).
    let mut fixed_pv = 0.0;
    for date in &dates {
        let period_start = date.minus_months(months);
        let tau = TIME_BASIS.year_fraction(period_start, *date);
        let t = time_to(as_of, *date);
        fixed_pv += swap.notional * swap.fixed_rate * tau * curve.discount_factor(t)?;
    }

    // Floating leg at par from the valuation date: N · (1 − DF(T)).
    let t_final = time_to(as_of, *dates.last().expect("non-empty schedule"));
    let float_pv = swap.notional * (1.0 - curve.discount_factor(t_final)?);

    Ok(float_pv - fixed_pv)
}

/// Prices a vanilla interest rate swap off the single provided zero curve.
///
/// MtM is floating-leg PV minus fixed-leg PV, signed by direction; DV01 is
/// the half-difference of a ±1 bp parallel reprice and doubles as the
/// trade's directional delta.
pub fn price_ir_swap(
    swap: &InterestRateSwap,
    view: &MarketDataView,
) -> Result<Valuation, PricingError> {
    let as_of = view.as_of_date();
    let curve = view.curve(swap.currency)?;

    let sign = match swap.direction {
        SwapDirection::PayFixed => 1.0,
        SwapDirection::ReceiveFixed => -1.0,
    };

    let base = sign * swap_pv_pay_float_received(swap, curve, as_of)?;
    let up = sign * swap_pv_pay_float_received(swap, &curve.shifted(1.0), as_of)?;
    let down = sign * swap_pv_pay_float_received(swap, &curve.shifted(-1.0), as_of)?;
    let dv01 = 0.5 * (up - down);

    if !base.is_finite() {
        return Err(PricingError::NumericalInstability(
            "non-finite swap MtM".to_string(),
        ));
    }

    Ok(Valuation {
        currency: swap.currency,
        mtm: base,
        delta: dv01,
        dv01,
        vega: 0.0,
        gamma: 0.0,
        theta: 0.0,
    })
}

fn capfloor_value(
    capfloor: &CapFloor,
    curve: &ZeroCurve,
    surface: &VolSurface,
    as_of: Date,
) -> Result<(f64, f64), PricingError> {
    let months = capfloor.frequency.months_between();
    let dates = payment_dates(as_of, capfloor.maturity_date, months);
    if dates.is_empty() {
        return Err(PricingError::MaturedInstrument);
    }

    let option_type = match capfloor.kind {
        CapFloorKind::Cap => OptionType::Call,
        CapFloorKind::Floor => OptionType::Put,
    };

    let mut value = 0.0;
    let mut vega = 0.0;
    for date in &dates {
        let reset = date.minus_months(months);
        let t_reset = time_to(as_of, reset);
        // The running period has already fixed; only future resets are optional.
        if t_reset <= 0.0 {
            continue;
        }
        let t_pay = time_to(as_of, *date);
        let tau = TIME_BASIS.year_fraction(reset, *date);

        let fwd = curve.forward_rate(t_reset, t_pay)?;
        let vol = surface.vol(t_reset, capfloor.strike)?;
        let df = curve.discount_factor(t_pay)?;

        let unit = black76_price(option_type, fwd, capfloor.strike, vol, t_reset, df);
        let greeks = black76_greeks(option_type, fwd, capfloor.strike, vol, t_reset, df);
        value += capfloor.notional * tau * unit;
        vega += capfloor.notional * tau * greeks.vega;
    }
    Ok((value, vega))
}

/// Prices a cap or floor as a strip of Black-76 caplets/floorlets on the
/// curve's forward rates, with vols from the rate surface.
///
/// Caplets whose reset has passed are omitted (their fixing is cash, not
/// optionality). DV01 from a ±1 bp parallel curve reprice.
pub fn price_cap_floor(
    capfloor: &CapFloor,
    view: &MarketDataView,
) -> Result<Valuation, PricingError> {
    let as_of = view.as_of_date();
    let curve = view.curve(capfloor.currency)?;
    let surface = view.vol_surface(&capfloor.underlying())?;

    let (base, vega) = capfloor_value(capfloor, curve, surface, as_of)?;
    let (up, _) = capfloor_value(capfloor, &curve.shifted(1.0), surface, as_of)?;
    let (down, _) = capfloor_value(capfloor, &curve.shifted(-1.0), surface, as_of)?;
    let dv01 = 0.5 * (up - down);

    Ok(Valuation {
        currency: capfloor.currency,
        mtm: base,
        delta: dv01,
        dv01,
        vega,
        gamma: 0.0,
        theta: 0.0,
    })
}

fn swaption_value(
    swaption: &Swaption,
    curve: &ZeroCurve,
    surface: &VolSurface,
    t_expiry: f64,
) -> Result<(f64, f64), PricingError> {
    let per_year = f64::from(swaption.frequency.per_year());
    let tau = 1.0 / per_year;
    let n_payments = swaption.swap_tenor_years * swaption.frequency.per_year();

    // Annuity and end discount factor on the forward swap's payment grid.
    let mut annuity = 0.0;
    let mut t_end = t_expiry;
    for i in 1..=n_payments {
        t_end = t_expiry + f64::from(i) * tau;
        annuity += tau * curve.discount_factor(t_end)?;
    }
    if annuity <= 0.0 {
        return Err(PricingError::NumericalInstability(
            "non-positive swaption annuity".to_string(),
        ));
    }

    let forward_swap_rate =
        (curve.discount_factor(t_expiry)? - curve.discount_factor(t_end)?) / annuity;
    if forward_swap_rate <= 0.0 {
        // Black-76 needs a positive forward; negative-rate regimes are out of
        // model scope for this desk.
        return Err(PricingError::NumericalInstability(format!(
            "non-positive forward swap rate {forward_swap_rate}"
        )));
    }

    let option_type = match swaption.direction {
        SwapDirection::PayFixed => OptionType::Call,
        SwapDirection::ReceiveFixed => OptionType::Put,
    };
    let vol = surface.vol(t_expiry, swaption.strike)?;

    let unit = black76_price(
        option_type,
        forward_swap_rate,
        swaption.strike,
        vol,
        t_expiry,
        1.0,
    );
    let greeks = black76_greeks(
        option_type,
        forward_swap_rate,
        swaption.strike,
        vol,
        t_expiry,
        1.0,
    );

    let value = swaption.notional * annuity * unit;
    let vega = swaption.notional * annuity * greeks.vega;
    Ok((value, vega))
}

/// Prices a European swaption with Black-76 on the forward swap rate,
/// discounted by the annuity factor.
pub fn price_swaption(
    swaption: &Swaption,
    view: &MarketDataView,
) -> Result<Valuation, PricingError> {
    let as_of = view.as_of_date();
    let t_expiry = time_to(as_of, swaption.expiry_date);
    if t_expiry <= 0.0 {
        return Err(PricingError::MaturedInstrument);
    }

    let curve = view.curve(swaption.currency)?;
    let surface = view.vol_surface(&swaption.underlying())?;

    let (base, vega) = swaption_value(swaption, curve, surface, t_expiry)?;
    let (up, _) = swaption_value(swaption, &curve.shifted(1.0), surface, t_expiry)?;
    let (down, _) = swaption_value(swaption, &curve.shifted(-1.0), surface, t_expiry)?;
    let dv01 = 0.5 * (up - down);

    Ok(Valuation {
        currency: swaption.currency,
        mtm: base,
        delta: dv01,
        dv01,
        vega,
        gamma: 0.0,
        theta: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use risk_core::market_data::{InstrumentQuote, MarketDataSnapshot, ViewRequirements, VolGrid};
    use risk_core::types::{CouponFrequency, Currency, CurrencyPair, Isin};

    use crate::instruments::Direction;

    fn as_of() -> Date {
        Date::from_ymd(2026, 3, 2).unwrap()
    }

    fn eurusd() -> CurrencyPair {
        CurrencyPair::new(Currency::EUR, Currency::USD)
    }

    fn view() -> MarketDataView {
        let mut s = MarketDataSnapshot::new(as_of());
        s.quotes
            .insert(Isin::new("XS0000000001"), InstrumentQuote::default());
        // Flat 3% EUR curve, flat 4% USD curve.
        s.zero_curves.insert(
            Currency::EUR,
            vec![(0.25, 0.03), (1.0, 0.03), (5.0, 0.03), (10.0, 0.03)],
        );
        s.zero_curves.insert(
            Currency::USD,
            vec![(0.25, 0.04), (1.0, 0.04), (5.0, 0.04), (10.0, 0.04)],
        );
        s.fx_rates.insert(eurusd(), 1.10);
        s.vol_grids.insert(
            "EUR/USD".to_string(),
            VolGrid {
                tenors: vec![0.25, 1.0, 5.0],
                strikes: vec![0.9, 1.1, 1.3],
                vols: vec![
                    vec![0.10, 0.10, 0.10],
                    vec![0.10, 0.10, 0.10],
                    vec![0.10, 0.10, 0.10],
                ],
            },
        );
        s.vol_grids.insert(
            "EUR-IRS".to_string(),
            VolGrid {
                tenors: vec![0.25, 1.0, 5.0],
                strikes: vec![0.01, 0.03, 0.06],
                vols: vec![
                    vec![0.20, 0.20, 0.20],
                    vec![0.20, 0.20, 0.20],
                    vec![0.20, 0.20, 0.20],
                ],
            },
        );
        let requirements = ViewRequirements {
            isins: vec![Isin::new("XS0000000001")],
            currencies: vec![Currency::EUR, Currency::USD],
            pairs: vec![eurusd()],
            underlyings: vec!["EUR/USD".to_string(), "EUR-IRS".to_string()],
        };
        MarketDataView::build(&s, &requirements).unwrap()
    }

    // ========================================
    // FX forward
    // ========================================

    #[test]
    fn test_fx_forward_struck_at_market_is_flat() {
        let v = view();
        let t = 1.0;
        let df_eur = v.curve(Currency::EUR).unwrap().discount_factor(t).unwrap();
        let df_usd = v.curve(Currency::USD).unwrap().discount_factor(t).unwrap();
        let market_forward = 1.10 * df_eur / df_usd;

        let fwd = FxForward::new(
            eurusd(),
            1_000_000.0,
            Direction::Long,
            market_forward,
            as_of().minus_months(1),
            Date::from_ymd(2027, 3, 2).unwrap(),
        )
        .unwrap();
        let valuation = price_fx_forward(&fwd, &v).unwrap();
        assert_abs_diff_eq!(valuation.mtm, 0.0, epsilon = 1e-6);
        assert!(valuation.delta > 0.0);
        assert_eq!(valuation.currency, Currency::USD);
    }

    #[test]
    fn test_fx_forward_short_negates() {
        let v = view();
        let make = |direction| {
            let fwd = FxForward::new(
                eurusd(),
                1_000_000.0,
                direction,
                1.05,
                as_of().minus_months(1),
                Date::from_ymd(2027, 3, 2).unwrap(),
            )
            .unwrap();
            price_fx_forward(&fwd, &v).unwrap()
        };
        let long = make(Direction::Long);
        let short = make(Direction::Short);
        assert_relative_eq!(long.mtm, -short.mtm, epsilon = 1e-9);
        assert_relative_eq!(long.delta, -short.delta, epsilon = 1e-9);
    }

    #[test]
    fn test_matured_forward_fails() {
        let v = view();
        let fwd = FxForward::new(
            eurusd(),
            1_000_000.0,
            Direction::Long,
            1.05,
            Date::from_ymd(2025, 1, 2).unwrap(),
            Date::from_ymd(2026, 1, 2).unwrap(),
        )
        .unwrap();
        assert_eq!(
            price_fx_forward(&fwd, &v).unwrap_err(),
            PricingError::MaturedInstrument
        );
    }

    // ========================================
    // FX option
    // ========================================

    #[test]
    fn test_fx_option_long_call_positive() {
        let v = view();
        let opt = FxOption::new(
            eurusd(),
            1_000_000.0,
            Direction::Long,
            OptionType::Call,
            1.10,
            as_of().minus_months(1),
            Date::from_ymd(2027, 3, 2).unwrap(),
        )
        .unwrap();
        let valuation = price_fx_option(&opt, &v).unwrap();
        assert!(valuation.mtm > 0.0);
        assert!(valuation.delta > 0.0);
        assert!(valuation.vega > 0.0);
        assert!(valuation.theta < 0.0);
    }

    #[test]
    fn test_fx_option_short_flips_signs() {
        let v = view();
        let make = |direction| {
            let opt = FxOption::new(
                eurusd(),
                1_000_000.0,
                direction,
                OptionType::Put,
                1.15,
                as_of().minus_months(1),
                Date::from_ymd(2027, 3, 2).unwrap(),
            )
            .unwrap();
            price_fx_option(&opt, &v).unwrap()
        };
        let long = make(Direction::Long);
        let short = make(Direction::Short);
        assert_relative_eq!(long.mtm, -short.mtm, epsilon = 1e-9);
        assert_relative_eq!(long.vega, -short.vega, epsilon = 1e-9);
    }

    // ========================================
    // IR swap
    // ========================================

    fn swap(fixed_rate: f64, direction: SwapDirection) -> InterestRateSwap {
        InterestRateSwap::new(
            Currency::EUR,
            10_000_000.0,
            fixed_rate,
            direction,
            CouponFrequency::Annual,
            as_of().minus_months(2),
            Date::from_ymd(2031, 3, 2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_payer_swap_above_market_is_negative() {
        // Paying 5% fixed against a 3% curve loses money.
        let valuation = price_ir_swap(&swap(0.05, SwapDirection::PayFixed), &view()).unwrap();
        assert!(valuation.mtm < 0.0);
        // Payer gains when rates rise.
        assert!(valuation.dv01 > 0.0);
    }

    #[test]
    fn test_receiver_mirrors_payer() {
        let payer = price_ir_swap(&swap(0.05, SwapDirection::PayFixed), &view()).unwrap();
        let receiver = price_ir_swap(&swap(0.05, SwapDirection::ReceiveFixed), &view()).unwrap();
        assert_relative_eq!(payer.mtm, -receiver.mtm, epsilon = 1e-9);
        assert_relative_eq!(payer.dv01, -receiver.dv01, epsilon = 1e-9);
    }

    #[test]
    fn test_swap_dv01_magnitude() {
        // A 5y annual payer swap on 10m has a DV01 of a few thousand.
        let valuation = price_ir_swap(&swap(0.03, SwapDirection::PayFixed), &view()).unwrap();
        assert!(valuation.dv01 > 1_000.0 && valuation.dv01 < 10_000.0);
    }

    // ========================================
    // Cap/Floor
    // ========================================

    #[test]
    fn test_cap_and_floor_values_positive() {
        let v = view();
        let make = |kind| {
            let cf = CapFloor::new(
                kind,
                Currency::EUR,
                10_000_000.0,
                0.03,
                CouponFrequency::Annual,
                as_of().minus_months(1),
                Date::from_ymd(2030, 3, 2).unwrap(),
            )
            .unwrap();
            price_cap_floor(&cf, &v).unwrap()
        };
        let cap = make(CapFloorKind::Cap);
        let floor = make(CapFloorKind::Floor);
        assert!(cap.mtm > 0.0);
        assert!(floor.mtm > 0.0);
        assert!(cap.vega > 0.0);
        // Long rates go up: cap gains, floor loses.
        assert!(cap.dv01 > 0.0);
        assert!(floor.dv01 < 0.0);
    }

    // ========================================
    // Swaption
    // ========================================

    #[test]
    fn test_swaption_atm_payer_receiver_parity() {
        let v = view();
        let make = |direction| {
            let sw = Swaption::new(
                direction,
                Currency::EUR,
                10_000_000.0,
                0.03,
                CouponFrequency::Annual,
                5,
                as_of().minus_months(1),
                Date::from_ymd(2027, 3, 2).unwrap(),
            )
            .unwrap();
            price_swaption(&sw, &v).unwrap()
        };
        let payer = make(SwapDirection::PayFixed);
        let receiver = make(SwapDirection::ReceiveFixed);
        assert!(payer.mtm > 0.0);
        assert!(receiver.mtm > 0.0);
        // Payer - receiver = annuity * (S - K); near-ATM strike keeps the
        // difference far below either premium.
        assert!((payer.mtm - receiver.mtm).abs() < payer.mtm);
        assert!(payer.vega > 0.0);
    }

    #[test]
    fn test_expired_swaption_fails() {
        let v = view();
        let sw = Swaption::new(
            SwapDirection::PayFixed,
            Currency::EUR,
            1_000_000.0,
            0.03,
            CouponFrequency::Annual,
            5,
            Date::from_ymd(2024, 1, 2).unwrap(),
            Date::from_ymd(2026, 1, 2).unwrap(),
        )
        .unwrap();
        assert_eq!(
            price_swaption(&sw, &v).unwrap_err(),
            PricingError::MaturedInstrument
        );
    }
}
