//! Stress scenarios: declarative shock bundles and their application to a
//! market data snapshot.
//!
//! A scenario shocks curves, credit spreads, FX rates, vols and liquidity
//! parameters. Execution is re-pricing, not approximation: the engine derives
//! a shocked snapshot, rebuilds the market view and re-runs the pricing and
//! capital pipeline against it. Bond quotes, being market-price driven, are
//! shocked through their duration (`ΔP/P = −D·Δy`), which is what ties the
//! shocked price to the curve move; derivatives reprice in full off the
//! shifted curves and scaled surfaces.

use risk_core::market_data::MarketDataSnapshot;
use risk_core::types::{Currency, Isin, Rating};

use crate::liquidity::LiquidityShock;

/// Curve shock shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveShock {
    /// Parallel shift in basis points.
    Parallel(f64),
    /// Two-point slope shift: short-end and long-end basis points, blended
    /// linearly between 1y and 10y.
    Slope {
        /// Shift at the short end (≤ 1y), bps.
        short_bps: f64,
        /// Shift at the long end (≥ 10y), bps.
        long_bps: f64,
    },
}

impl CurveShock {
    /// Effective shift in basis points at a given tenor.
    pub fn shift_at(&self, tenor_years: f64) -> f64 {
        match self {
            CurveShock::Parallel(bps) => *bps,
            CurveShock::Slope {
                short_bps,
                long_bps,
            } => {
                let w = ((tenor_years - 1.0) / 9.0).clamp(0.0, 1.0);
                short_bps + w * (long_bps - short_bps)
            }
        }
    }
}

/// Which rating bucket a credit spread shock hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadScope {
    /// Every rated bond.
    All,
    /// Investment grade only (BBB and better).
    InvestmentGrade,
    /// High yield only (BB and worse).
    HighYield,
}

impl SpreadScope {
    fn applies_to(&self, rating: Option<Rating>) -> bool {
        match self {
            SpreadScope::All => true,
            SpreadScope::InvestmentGrade => rating.is_some_and(|r| r.is_investment_grade()),
            SpreadScope::HighYield => rating.is_some_and(|r| r.is_high_yield()),
        }
    }
}

/// A named, declarative stress scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Scenario code (e.g. `IR-01`).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Zero curve shock.
    pub curve: Option<CurveShock>,
    /// Credit spread widening: scope and basis points.
    pub spread: Option<(SpreadScope, f64)>,
    /// Relative FX appreciation per currency (+0.10 = 10% stronger).
    pub fx: Vec<(Currency, f64)>,
    /// Multiplier applied to every vol surface.
    pub vol_multiplier: Option<f64>,
    /// Liquidity dials forwarded to the liquidity block.
    pub liquidity: Option<LiquidityShock>,
}

impl Scenario {
    fn named(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            curve: None,
            spread: None,
            fx: Vec::new(),
            vol_multiplier: None,
            liquidity: None,
        }
    }
}

/// The built-in scenario catalogue run by every snapshot.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            curve: Some(CurveShock::Parallel(200.0)),
            ..Scenario::named("IR-01", "Rates +200 bps parallel")
        },
        Scenario {
            curve: Some(CurveShock::Parallel(-100.0)),
            ..Scenario::named("IR-02", "Rates -100 bps parallel")
        },
        Scenario {
            curve: Some(CurveShock::Slope {
                short_bps: 50.0,
                long_bps: 150.0,
            }),
            ..Scenario::named("IR-03", "Curve steepening +50/+150 bps")
        },
        Scenario {
            curve: Some(CurveShock::Slope {
                short_bps: 150.0,
                long_bps: 50.0,
            }),
            ..Scenario::named("IR-04", "Curve flattening +150/+50 bps")
        },
        Scenario {
            spread: Some((SpreadScope::All, 100.0)),
            ..Scenario::named("CS-01", "Credit spreads +100 bps, all ratings")
        },
        Scenario {
            spread: Some((SpreadScope::HighYield, 200.0)),
            ..Scenario::named("CS-02", "Credit spreads +200 bps, high yield")
        },
        Scenario {
            spread: Some((SpreadScope::InvestmentGrade, 50.0)),
            ..Scenario::named("CS-03", "Credit spreads +50 bps, investment grade")
        },
        Scenario {
            fx: vec![(Currency::USD, 0.10)],
            ..Scenario::named("FX-01", "USD +10%")
        },
        Scenario {
            fx: vec![(Currency::USD, -0.10)],
            ..Scenario::named("FX-02", "USD -10%")
        },
        Scenario {
            vol_multiplier: Some(1.2),
            ..Scenario::named("VOL-01", "Volatility x1.2")
        },
        Scenario {
            vol_multiplier: Some(1.4),
            ..Scenario::named("VOL-02", "Volatility x1.4")
        },
        Scenario {
            liquidity: Some(LiquidityShock {
                bid_ask_multiplier: 3.0,
                outflow_multiplier: 1.0,
            }),
            ..Scenario::named("LIQ-01", "Bid-ask spreads x3")
        },
        Scenario {
            liquidity: Some(LiquidityShock {
                bid_ask_multiplier: 1.0,
                outflow_multiplier: 1.3,
            }),
            ..Scenario::named("LIQ-02", "Funding outflows x1.3")
        },
    ]
}

/// Duration and classification inputs for shocking one bond's quote.
#[derive(Debug, Clone, PartialEq)]
pub struct BondSensitivity {
    /// Quote to shock.
    pub isin: Isin,
    /// Modified duration from the base run.
    pub modified_duration: f64,
    /// Residual tenor in years (slope shocks).
    pub tenor_years: f64,
    /// Issuer rating (spread shock scoping).
    pub rating: Option<Rating>,
}

/// Derives the shocked snapshot for a scenario.
///
/// Curves shift, vols scale, FX rates move by relative appreciation, and
/// bond clean prices move by `−D·Δy` against the curve and spread shocks.
/// Liquidity dials are not applied here; the engine forwards them to the
/// liquidity block.
pub fn apply(
    scenario: &Scenario,
    snapshot: &MarketDataSnapshot,
    bonds: &[BondSensitivity],
) -> MarketDataSnapshot {
    let mut shocked = snapshot.clone();

    // ---- Curves ----
    if let Some(curve_shock) = scenario.curve {
        for pillars in shocked.zero_curves.values_mut() {
            for (tenor, rate) in pillars.iter_mut() {
                *rate += curve_shock.shift_at(*tenor) / 10_000.0;
            }
        }
    }

    // ---- Vol surfaces ----
    if let Some(multiplier) = scenario.vol_multiplier {
        for grid in shocked.vol_grids.values_mut() {
            for vol in grid.vols.iter_mut().flatten() {
                *vol *= multiplier;
            }
        }
    }

    // ---- FX ----
    for &(currency, shock) in &scenario.fx {
        let factor = 1.0 + shock;
        if factor <= 0.0 {
            continue;
        }
        for (pair, rate) in shocked.fx_rates.iter_mut() {
            if pair.base == currency {
                *rate *= factor;
            } else if pair.quote == currency {
                *rate /= factor;
            }
        }
    }

    // ---- Bond quotes via duration ----
    for bond in bonds {
        let mut delta_yield = 0.0;
        if let Some(curve_shock) = scenario.curve {
            delta_yield += curve_shock.shift_at(bond.tenor_years) / 10_000.0;
        }
        if let Some((scope, bps)) = scenario.spread {
            if scope.applies_to(bond.rating) {
                delta_yield += bps / 10_000.0;
            }
        }
        if delta_yield == 0.0 {
            continue;
        }
        if let Some(quote) = shocked.quotes.get_mut(&bond.isin) {
            let factor = (1.0 - bond.modified_duration * delta_yield).max(0.01);
            if let Some(price) = quote.clean_price.as_mut() {
                *price *= factor;
            }
            if let Some(bid) = quote.bid.as_mut() {
                *bid *= factor;
            }
            if let Some(ask) = quote.ask.as_mut() {
                *ask *= factor;
            }
        }
    }

    shocked
}

/// One position's contribution to a scenario's P&L.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StressContributor {
    /// Position identifier.
    pub position_id: String,
    /// Base market value.
    pub base_value: f64,
    /// Stressed market value.
    pub stressed_value: f64,
    /// Value change.
    pub delta_value: f64,
}

/// Result of one (scenario, portfolio) stress run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StressResult {
    /// Scenario code.
    pub scenario: String,
    /// Scenario description.
    pub description: String,
    /// Portfolio P&L under the scenario.
    pub pnl: f64,
    /// P&L as a fraction of base market value.
    pub pnl_pct: f64,
    /// VaR change (shocked minus base).
    pub delta_var: Option<f64>,
    /// Total capital requirement change.
    pub delta_k_req: f64,
    /// Capital ratio change.
    pub delta_capital_ratio: f64,
    /// LCR change.
    pub delta_lcr: f64,
    /// Top contributors by absolute value change, largest first (at most 10).
    pub top_contributors: Vec<StressContributor>,
}
