//! Liquidity metrics: HQLA, LCR, funding gap, liquidation cost.
//!
//! HQLA classification follows the level/factor scheme (Level 1 full value,
//! Level 2A at 85%, Level 2B at 50% or 75% for eligible corporates) with the
//! 40% / 15% composition caps solved as a fixed point. Outflows apply the
//! run-off table to the funding profile; inflow recognition is capped.
//! Liquidation cost uses the half-spread with a participation-driven depth
//! penalty `f(x) = 1 + min(9, x)` where `x = qty / (days · ADV)`.

use std::collections::BTreeMap;

use risk_core::config::EngineConfig;
use risk_core::market_data::MarketDataView;
use risk_core::types::{Isin, IssuerId, Rating};

use crate::inputs::{FundingProfile, Issuer, MaturityBucket, Sector};
use crate::tables::{self, hqla_factor};

/// Fallback relative bid-ask spread when a quote is one-sided (10 bps).
const DEFAULT_SPREAD_FRACTION: f64 = 0.001;
/// Depth penalty saturation.
const DEPTH_PENALTY_CAP: f64 = 9.0;

/// HQLA classification of one holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HqlaLevel {
    /// Cash, reserves, top-rated sovereigns: full value.
    Level1,
    /// 85% factor.
    Level2A,
    /// 50% factor.
    Level2B,
    /// 75% factor (eligible corporate paper).
    Level2BEligible,
    /// Not eligible as HQLA.
    NonHqla,
}

impl HqlaLevel {
    /// Post-haircut value factor.
    pub fn factor(&self) -> f64 {
        match self {
            HqlaLevel::Level1 => hqla_factor::LEVEL_1,
            HqlaLevel::Level2A => hqla_factor::LEVEL_2A,
            HqlaLevel::Level2B => hqla_factor::LEVEL_2B,
            HqlaLevel::Level2BEligible => hqla_factor::LEVEL_2B_ELIGIBLE,
            HqlaLevel::NonHqla => 0.0,
        }
    }

    /// Liquidity score contribution of this level.
    fn score(&self) -> f64 {
        match self {
            HqlaLevel::Level1 => 1.0,
            HqlaLevel::Level2A => 0.85,
            HqlaLevel::Level2BEligible => 0.6,
            HqlaLevel::Level2B => 0.5,
            HqlaLevel::NonHqla => 0.2,
        }
    }
}

/// Classifies an issuer's paper into an HQLA level.
///
/// Financial issuers are excluded outright; sovereigns split by rating;
/// agencies and strong corporates reach Level 2A; weaker investment grade
/// corporates land in Level 2B.
pub fn classify(issuer: Option<&Issuer>) -> HqlaLevel {
    let Some(issuer) = issuer else {
        return HqlaLevel::NonHqla;
    };
    let rating = issuer.rating;
    match issuer.sector {
        Sector::Financial => HqlaLevel::NonHqla,
        Sector::Sovereign => match rating {
            Some(r) if r <= Rating::AA => HqlaLevel::Level1,
            Some(r) if r <= Rating::BBB => HqlaLevel::Level2A,
            _ => HqlaLevel::NonHqla,
        },
        Sector::Agency => match rating {
            Some(r) if r <= Rating::AA => HqlaLevel::Level2A,
            _ => HqlaLevel::NonHqla,
        },
        Sector::Corporate => match rating {
            Some(r) if r <= Rating::AA => HqlaLevel::Level2A,
            Some(Rating::A) => HqlaLevel::Level2BEligible,
            Some(Rating::BBB) => HqlaLevel::Level2B,
            _ => HqlaLevel::NonHqla,
        },
    }
}

/// One bond holding's inputs to the liquidity block.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityPosition {
    /// Instrument identifier (quote lookup).
    pub isin: Isin,
    /// Issuer reference (HQLA classification).
    pub issuer_id: IssuerId,
    /// Market value in the portfolio base currency.
    pub market_value: f64,
    /// Face amount held (participation measure for the depth model).
    pub notional: f64,
}

/// Stress dials for the liquidity block; unity outside stress runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidityShock {
    /// Multiplier on every bid-ask spread.
    pub bid_ask_multiplier: f64,
    /// Multiplier on every run-off outflow.
    pub outflow_multiplier: f64,
}

impl Default for LiquidityShock {
    fn default() -> Self {
        Self {
            bid_ask_multiplier: 1.0,
            outflow_multiplier: 1.0,
        }
    }
}

/// Liquidity block result.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiquidityMetrics {
    /// Post-haircut, post-cap HQLA stock.
    pub hqla_total: f64,
    /// Level 1 component.
    pub level1: f64,
    /// Level 2A component after the 40% cap.
    pub level2a: f64,
    /// Level 2B component after the 15% cap.
    pub level2b: f64,
    /// 30-day stressed outflows.
    pub outflows_30d: f64,
    /// Inflows recognized after the cap.
    pub inflows_recognized: f64,
    /// Net outflows.
    pub net_outflows: f64,
    /// LCR; the sentinel value when net outflows are non-positive.
    pub lcr_ratio: f64,
    /// Whether the LCR is the non-positive-outflow sentinel.
    #[serde(skip)]
    pub lcr_is_sentinel: bool,
    /// Short-term funding gap (assets − liabilities, 0–30 days).
    pub funding_gap_short_term: f64,
    /// Cost of liquidating the book in one day.
    pub liquidation_cost_1d: f64,
    /// Cost of liquidating the book over five days.
    pub liquidation_cost_5d: f64,
    /// Market-value-weighted liquidity score in [0, 1].
    pub liquidity_score: f64,
}

/// Solves the HQLA composition caps as a fixed point.
///
/// Level 2A is capped at `l2a_cap` of total HQLA and Level 2B at `l2b_cap`;
/// both caps reference the capped total, so the admissible amounts are the
/// fixed point of the joint system.
fn solve_hqla_caps(l1: f64, l2a: f64, l2b: f64, l2a_cap: f64, l2b_cap: f64) -> (f64, f64, f64) {
    let mut total = l1 + l2a + l2b;
    let mut a = l2a;
    let mut b = l2b;
    for _ in 0..100 {
        let next_a = l2a.min(l2a_cap * total);
        let next_b = l2b.min(l2b_cap * total);
        let next_total = l1 + next_a + next_b;
        if (next_total - total).abs() < 1e-9 {
            a = next_a;
            b = next_b;
            total = next_total;
            break;
        }
        a = next_a;
        b = next_b;
        total = next_total;
    }
    (total, a, b)
}

/// Liquidation cost of one holding over a horizon.
///
/// `cost = 0.5 · spread · qty · f(qty / (days · ADV))`, with the spread in
/// value terms and `f(x) = 1 + min(9, x)`. Spreading the sale over more days
/// lowers participation and therefore cost.
fn liquidation_cost(
    market_value: f64,
    notional: f64,
    relative_spread: f64,
    adv: Option<f64>,
    days: f64,
) -> f64 {
    let participation = match adv {
        Some(adv) if adv > 0.0 => notional / (days * adv),
        _ => DEPTH_PENALTY_CAP, // unknown depth: assume the worst
    };
    let penalty = 1.0 + participation.min(DEPTH_PENALTY_CAP);
    0.5 * relative_spread * market_value.abs() * penalty
}

/// Computes the liquidity block.
pub fn compute(
    positions: &[LiquidityPosition],
    view: &MarketDataView,
    issuers: &[Issuer],
    funding: &FundingProfile,
    config: &EngineConfig,
    shock: LiquidityShock,
) -> LiquidityMetrics {
    let issuer_table: BTreeMap<&IssuerId, &Issuer> = issuers.iter().map(|i| (&i.id, i)).collect();

    // ---- HQLA stock ----
    let mut l1 = funding.cash_and_reserves;
    let mut l2a = 0.0;
    let mut l2b = 0.0;
    let mut score_weighted = 0.0;
    let mut mv_total = 0.0;

    let mut cost_1d = 0.0;
    let mut cost_5d = 0.0;

    for position in positions {
        let issuer = issuer_table.get(&position.issuer_id).copied();
        let level = classify(issuer);
        let contribution = position.market_value.max(0.0) * level.factor();
        match level {
            HqlaLevel::Level1 => l1 += contribution,
            HqlaLevel::Level2A => l2a += contribution,
            HqlaLevel::Level2B | HqlaLevel::Level2BEligible => l2b += contribution,
            HqlaLevel::NonHqla => {}
        }

        mv_total += position.market_value.abs();
        score_weighted += position.market_value.abs() * level.score();

        // ---- Liquidation cost ----
        let (relative_spread, adv) = match view.quote(&position.isin) {
            Ok(quote) => {
                let spread = match (quote.bid_ask_spread(), quote.mid()) {
                    (Some(spread), Some(mid)) if mid > 0.0 => spread / mid,
                    _ => DEFAULT_SPREAD_FRACTION,
                };
                (spread, quote.volume)
            }
            Err(_) => (DEFAULT_SPREAD_FRACTION, None),
        };
        let shocked_spread = relative_spread * shock.bid_ask_multiplier;
        cost_1d += liquidation_cost(
            position.market_value,
            position.notional,
            shocked_spread,
            adv,
            1.0,
        );
        cost_5d += liquidation_cost(
            position.market_value,
            position.notional,
            shocked_spread,
            adv,
            5.0,
        );
    }

    let (hqla_total, level2a, level2b) =
        solve_hqla_caps(l1, l2a, l2b, config.lcr_l2a_cap, config.lcr_l2b_cap);

    // ---- Outflows and inflows ----
    let outflows_30d: f64 = funding
        .outflow_balances
        .iter()
        .map(|(&class, &amount)| amount * tables::run_off_rate(class))
        .sum::<f64>()
        * shock.outflow_multiplier;

    let inflows_recognized = funding
        .expected_inflows_30d
        .min(config.lcr_inflow_cap * outflows_30d);
    let net_outflows = outflows_30d - inflows_recognized;

    let (lcr_ratio, lcr_is_sentinel) = if net_outflows <= 0.0 {
        (tables::RATIO_SENTINEL, true)
    } else {
        (hqla_total / net_outflows, false)
    };

    // ---- Funding gap, short term (0–30 days) ----
    let short = [MaturityBucket::UpTo7d, MaturityBucket::From7dTo30d];
    let funding_gap_short_term: f64 = short
        .iter()
        .map(|bucket| {
            funding.assets_by_bucket.get(bucket).copied().unwrap_or(0.0)
                - funding
                    .liabilities_by_bucket
                    .get(bucket)
                    .copied()
                    .unwrap_or(0.0)
        })
        .sum();

    let liquidity_score = if mv_total > 0.0 {
        score_weighted / mv_total
    } else {
        1.0
    };

    LiquidityMetrics {
        hqla_total,
        level1: l1,
        level2a,
        level2b,
        outflows_30d,
        inflows_recognized,
        net_outflows,
        lcr_ratio,
        lcr_is_sentinel,
        funding_gap_short_term,
        liquidation_cost_1d: cost_1d,
        liquidation_cost_5d: cost_5d,
        liquidity_score,
    }
}
