#![allow(dead_code)] // each test binary uses its own subset of the fixtures

//! Shared fixtures for the engine integration tests.
//!
//! The base fixture is a EUR bond-dealer portfolio holding a single 5-year
//! zero-coupon sovereign bond priced off a flat 5% curve, a 250-observation
//! arithmetic P&L history, and a simple funding profile. Tests clone and
//! bend it as needed.

use chrono::{DateTime, Utc};
use risk_core::market_data::{InstrumentQuote, MarketDataSnapshot, VolGrid};
use risk_core::types::{
    CouponFrequency, Currency, CurrencyPair, Date, DayCountConvention, Isin, IssuerId,
    PortfolioId, PositionId, Rating, Seniority,
};
use risk_models::instruments::{
    Direction, FixedCouponBond, FxForward, Instrument, Position,
};
use risk_engine::inputs::{
    CapitalInputs, Counterparty, FundingProfile, Issuer, OutflowClass, PnlObservation, Portfolio,
    PortfolioKind, Sector, SnapshotInputs,
};
use risk_engine::limits::{Limit, MetricCode};

/// Calculation date used across the fixtures.
pub fn as_of() -> Date {
    Date::from_ymd(2026, 3, 2).unwrap()
}

pub fn calculation_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-02T19:05:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn portfolio_id() -> PortfolioId {
    PortfolioId::new("PF-BOND-1")
}

/// The 5y zero-coupon bond: 30/360 day count makes the residual maturity
/// exactly 5.0 years from the fixture as-of date.
pub fn zero_coupon_bond() -> FixedCouponBond {
    FixedCouponBond::new(
        Isin::new("DE0001102345"),
        IssuerId::new("SOV-DE"),
        Currency::EUR,
        1_000_000.0,
        0.0,
        CouponFrequency::Annual,
        DayCountConvention::Thirty360,
        Date::from_ymd(2025, 3, 2).unwrap(),
        Date::from_ymd(2031, 3, 2).unwrap(),
    )
    .unwrap()
}

/// Clean price of the zero at a flat 5% annual yield, percent of face.
pub const ZERO_CLEAN_PRICE: f64 = 78.352_616_646_843_57;

pub fn sovereign_issuer() -> Issuer {
    Issuer {
        id: IssuerId::new("SOV-DE"),
        country: "DE".to_string(),
        sector: Sector::Sovereign,
        rating: Some(Rating::AAA),
        seniority: Seniority::SeniorUnsecured,
    }
}

pub fn market_snapshot() -> MarketDataSnapshot {
    let mut snapshot = MarketDataSnapshot::new(as_of());
    snapshot.quotes.insert(
        Isin::new("DE0001102345"),
        InstrumentQuote {
            clean_price: Some(ZERO_CLEAN_PRICE),
            bid: Some(ZERO_CLEAN_PRICE - 0.05),
            ask: Some(ZERO_CLEAN_PRICE + 0.05),
            volume: Some(50_000_000.0),
            days_since_trade: Some(0),
            previous_close: Some(ZERO_CLEAN_PRICE + 0.10),
            ..Default::default()
        },
    );
    snapshot.zero_curves.insert(
        Currency::EUR,
        vec![(0.25, 0.05), (1.0, 0.05), (5.0, 0.05), (10.0, 0.05)],
    );
    snapshot.zero_curves.insert(
        Currency::USD,
        vec![(0.25, 0.04), (1.0, 0.04), (5.0, 0.04), (10.0, 0.04)],
    );
    snapshot
        .fx_rates
        .insert(CurrencyPair::new(Currency::EUR, Currency::USD), 1.10);
    snapshot.vol_grids.insert(
        "EUR/USD".to_string(),
        VolGrid {
            tenors: vec![0.25, 1.0, 5.0],
            strikes: vec![0.9, 1.1, 1.3],
            vols: vec![
                vec![0.10, 0.10, 0.10],
                vec![0.11, 0.11, 0.11],
                vec![0.12, 0.12, 0.12],
            ],
        },
    );
    snapshot.vix = Some(15.0);
    snapshot
}

pub fn bond_position() -> Position {
    Position::new(
        PositionId::new("POS-1"),
        portfolio_id(),
        Instrument::Bond(zero_coupon_bond()),
        None,
    )
    .unwrap()
}

/// 250 dated observations ending the day before as-of: −100, −99, …, +149,
/// oldest first. Sorted index 12 is −88.
pub fn arithmetic_pnl_history() -> Vec<PnlObservation> {
    (0..250)
        .map(|i| {
            let days_back = 250 - i;
            let date = as_of().into_inner() - chrono::Duration::days(days_back);
            PnlObservation {
                date: Date::parse(&date.format("%Y-%m-%d").to_string()).unwrap(),
                pnl: -100.0 + i as f64,
            }
        })
        .collect()
}

pub fn funding_profile() -> FundingProfile {
    let mut profile = FundingProfile {
        expected_inflows_30d: 800.0,
        cash_and_reserves: 1_000.0,
        ..Default::default()
    };
    profile
        .outflow_balances
        .insert(OutflowClass::DebtMaturities, 950.0);
    profile
}

pub fn capital_inputs() -> CapitalInputs {
    CapitalInputs {
        aum_trailing_avg: 0.0,
        client_money_avg: 12_500_000.0,
        client_money_guaranteed: false,
        client_orders_annualized: 150_000_000.0,
        tier1: 900_000.0,
        tier2: 500_000.0,
    }
}

pub fn var_limit() -> Limit {
    Limit::new(portfolio_id(), MetricCode::Var1d95, 100.0, 0.7, 0.9).unwrap()
}

/// The base single-bond fixture.
pub fn base_inputs() -> SnapshotInputs {
    SnapshotInputs {
        portfolio: Portfolio {
            id: portfolio_id(),
            kind: PortfolioKind::BondDealer,
            base_currency: Currency::EUR,
            active: true,
        },
        positions: vec![bond_position()],
        counterparties: Vec::new(),
        issuers: vec![sovereign_issuer()],
        market: market_snapshot(),
        limits: vec![var_limit()],
        pnl_history: arithmetic_pnl_history(),
        funding: funding_profile(),
        capital: capital_inputs(),
        calculation_time: calculation_time(),
    }
}

/// A EUR/USD forward position facing the given counterparty.
pub fn fx_forward_position(id: &str, cpty: &str, strike: f64, direction: Direction) -> Position {
    let forward = FxForward::new(
        CurrencyPair::new(Currency::EUR, Currency::USD),
        1_000_000.0,
        direction,
        strike,
        Date::from_ymd(2025, 9, 1).unwrap(),
        Date::from_ymd(2027, 3, 2).unwrap(),
    )
    .unwrap();
    Position::new(
        PositionId::new(id),
        portfolio_id(),
        Instrument::FxForward(forward),
        Some(id_of(cpty)),
    )
    .unwrap()
}

pub fn id_of(cpty: &str) -> risk_core::types::CounterpartyId {
    risk_core::types::CounterpartyId::new(cpty)
}

pub fn counterparty(id: &str, isda: bool) -> Counterparty {
    Counterparty {
        id: id_of(id),
        country: "GB".to_string(),
        external_rating: Rating::A,
        internal_rating: None,
        isda_netting: isda,
        csa: None,
    }
}
