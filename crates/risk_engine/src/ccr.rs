//! Counterparty credit risk: current exposure, PFE add-ons, netting,
//! collateral, EAD and CVA.
//!
//! Add-ons follow the notional × CCF × √(T/250) profile with regime-scaled
//! volatility multipliers. Under an ISDA master agreement per-trade add-ons
//! net as √(ΣPFEᵢ²)·0.6; a CSA then offsets held collateral above the
//! threshold. CVA integrates bucketed exposure against a piecewise default
//! distribution from CDS spreads where quoted, else from the rating table.

use std::collections::BTreeMap;

use risk_core::config::VolRegime;
use risk_core::market_data::MarketDataView;
use risk_core::types::{CounterpartyId, Currency, IssuerId, Seniority};
use risk_models::instruments::{Direction, Instrument, Position};

use crate::error::EngineError;
use crate::inputs::Counterparty;
use crate::tables;

/// One derivative trade's contribution to counterparty exposure.
#[derive(Debug, Clone)]
pub struct TradeExposure {
    /// Counterparty this trade faces.
    pub counterparty_id: CounterpartyId,
    /// The position (for notional, class and maturity).
    pub position: Position,
    /// MtM in the portfolio base currency.
    pub mtm: f64,
    /// Directional sensitivity in base currency (FX delta or signed DV01).
    pub delta: f64,
}

/// Exposure metrics for one counterparty.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CounterpartyCcr {
    /// Counterparty reference.
    pub counterparty_id: CounterpartyId,
    /// Current exposure `max(Σ MtM, 0)`.
    pub current_exposure: f64,
    /// Sum of per-trade add-ons before netting.
    pub gross_addon: f64,
    /// Add-on after netting (and the portfolio factor, when applicable).
    pub net_addon: f64,
    /// Add-on after collateral offset.
    pub adjusted_addon: f64,
    /// Largest single-trade add-on.
    pub pfe_peak: f64,
    /// Exposure at default `CE + adjusted add-on`.
    pub ead: f64,
    /// Credit valuation adjustment.
    pub cva: f64,
    /// Number of trades faced.
    pub trade_count: usize,
}

/// Portfolio CCR block.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CcrMetrics {
    /// Sum of collateral-adjusted add-ons across counterparties.
    pub pfe_current: f64,
    /// Largest single-trade add-on across all counterparties.
    pub pfe_peak: f64,
    /// Total exposure at default.
    pub ead_total: f64,
    /// Total CVA.
    pub cva_total: f64,
    /// Per-counterparty breakdown, sorted by counterparty id.
    pub counterparties: Vec<CounterpartyCcr>,
}

impl CcrMetrics {
    /// The all-zero block for a portfolio without derivatives.
    pub fn empty() -> Self {
        Self {
            pfe_current: 0.0,
            pfe_peak: 0.0,
            ead_total: 0.0,
            cva_total: 0.0,
            counterparties: Vec::new(),
        }
    }
}

/// Resolves the effective volatility regime from the configured override and
/// the snapshot's VIX level.
pub fn resolve_regime(override_regime: VolRegime, vix: Option<f64>) -> VolRegime {
    match override_regime {
        VolRegime::Auto => match vix {
            Some(v) if v > 30.0 => VolRegime::Crisis,
            Some(v) if v > 20.0 => VolRegime::Elevated,
            _ => VolRegime::Normal,
        },
        fixed => fixed,
    }
}

fn fx_vol_multiplier(regime: VolRegime) -> f64 {
    match regime {
        VolRegime::Crisis => 1.5,
        VolRegime::Elevated => 1.3,
        _ => 1.0,
    }
}

fn ir_vol_multiplier(regime: VolRegime) -> f64 {
    match regime {
        VolRegime::Normal | VolRegime::Auto => 1.0,
        _ => 1.2,
    }
}

/// Per-trade PFE add-on.
fn trade_addon(trade: &TradeExposure, days_to_maturity: f64, regime: VolRegime) -> f64 {
    if days_to_maturity <= 0.0 {
        return 0.0;
    }
    let notional = trade.position.instrument.notional();
    let maturity_factor = (days_to_maturity / 250.0).sqrt();
    let tenor_years = days_to_maturity / 365.0;

    match &trade.position.instrument {
        Instrument::FxForward(f) => {
            notional * tables::fx_ccf(f.pair.is_major()) * maturity_factor * fx_vol_multiplier(regime)
        }
        Instrument::IrSwap(_) => {
            notional * tables::ir_ccf(tenor_years) * maturity_factor * ir_vol_multiplier(regime)
        }
        Instrument::FxOption(option) => match option.direction {
            Direction::Long => long_option_addon(trade.mtm, notional),
            Direction::Short => {
                trade.delta.abs() * tables::fx_ccf(option.pair.is_major())
            }
        },
        // Caps/floors and swaptions are held long; their downside is the
        // premium already paid.
        Instrument::CapFloor(_) | Instrument::Swaption(_) => {
            long_option_addon(trade.mtm, notional)
        }
        Instrument::Bond(_) => 0.0,
    }
}

/// Long option add-on: premium at risk, capped by policy.
fn long_option_addon(mtm: f64, notional: f64) -> f64 {
    let premium = mtm.abs();
    premium.min(tables::LONG_OPTION_PFE_CAP_FRACTION * notional)
}

/// Portfolio factor for counterparties with a large trade count.
fn portfolio_factor(deltas: &[f64]) -> f64 {
    let gross: f64 = deltas.iter().map(|d| d.abs()).sum();
    if gross <= 0.0 {
        return 1.0;
    }
    let net: f64 = deltas.iter().sum();
    if net.abs() <= 0.05 * gross {
        // Offsetting book: net delta within 5% of gross.
        0.5
    } else if deltas.iter().all(|d| *d >= 0.0) || deltas.iter().all(|d| *d <= 0.0) {
        0.8
    } else {
        1.0
    }
}

/// Cumulative default probability to horizon `t`.
fn cumulative_pd(t: f64, cds_spread: Option<f64>, pd_1y: f64, lgd: f64) -> f64 {
    match cds_spread {
        Some(s) if s > 0.0 && lgd > 0.0 => 1.0 - (-s * t / lgd).exp(),
        _ => 1.0 - (1.0 - pd_1y).powf(t),
    }
}

/// CVA for one counterparty from its exposure profile.
fn counterparty_cva(
    ce: f64,
    pfe_total: f64,
    t_max: f64,
    cds_spread: Option<f64>,
    pd_1y: f64,
    lgd: f64,
    view: &MarketDataView,
    base_currency: Currency,
) -> Result<f64, EngineError> {
    if t_max <= 0.0 || (ce <= 0.0 && pfe_total <= 0.0) {
        return Ok(0.0);
    }
    let curve = view.curve(base_currency)?;

    // Bucket grid capped at the longest maturity, deduplicated.
    let mut buckets: Vec<f64> = tables::CVA_BUCKETS
        .iter()
        .map(|&t| t.min(t_max))
        .collect();
    buckets.dedup();

    let mut cva = 0.0;
    let mut prev_pd = 0.0;
    for &t in &buckets {
        let ead_t = ce + pfe_total * (t / t_max).sqrt();
        let r = curve.zero_rate(t)?;
        let df = (-r * t).exp();
        let pd_t = cumulative_pd(t, cds_spread, pd_1y, lgd);
        cva += (pd_t - prev_pd) * df * ead_t;
        prev_pd = pd_t;
    }
    Ok((lgd * cva).max(0.0))
}

/// Computes the CCR block from derivative trade exposures.
///
/// Trades must reference known counterparties; the assembler validates
/// references before calling (an unknown id here is an internal error).
pub fn compute(
    trades: &[TradeExposure],
    counterparties: &[Counterparty],
    view: &MarketDataView,
    base_currency: Currency,
    regime: VolRegime,
) -> Result<CcrMetrics, EngineError> {
    if trades.is_empty() {
        return Ok(CcrMetrics::empty());
    }
    let as_of = view.as_of_date();
    let reference: BTreeMap<&CounterpartyId, &Counterparty> =
        counterparties.iter().map(|c| (&c.id, c)).collect();

    let mut by_counterparty: BTreeMap<&CounterpartyId, Vec<&TradeExposure>> = BTreeMap::new();
    for trade in trades {
        by_counterparty
            .entry(&trade.counterparty_id)
            .or_default()
            .push(trade);
    }

    let mut rows = Vec::with_capacity(by_counterparty.len());
    let mut pfe_current = 0.0;
    let mut pfe_peak = 0.0_f64;
    let mut ead_total = 0.0;
    let mut cva_total = 0.0;

    for (counterparty_id, cpty_trades) in by_counterparty {
        let counterparty = reference.get(counterparty_id).ok_or_else(|| {
            EngineError::Internal(format!(
                "trade references unknown counterparty {counterparty_id}"
            ))
        })?;

        let total_mtm: f64 = cpty_trades.iter().map(|t| t.mtm).sum();
        let ce = total_mtm.max(0.0);

        let mut addons = Vec::with_capacity(cpty_trades.len());
        let mut t_max_years = 0.0_f64;
        for trade in &cpty_trades {
            let days = (trade.position.instrument.maturity() - as_of) as f64;
            t_max_years = t_max_years.max(days / 365.0);
            let addon = trade_addon(trade, days, regime);
            pfe_peak = pfe_peak.max(addon);
            addons.push(addon);
        }
        let gross_addon: f64 = addons.iter().sum();

        let mut net_addon = if counterparty.isda_netting && cpty_trades.len() >= 2 {
            let sum_squares: f64 = addons.iter().map(|a| a * a).sum();
            sum_squares.sqrt() * tables::NETTING_FACTOR
        } else {
            gross_addon
        };

        if cpty_trades.len() > tables::PORTFOLIO_FACTOR_TRADE_THRESHOLD {
            let deltas: Vec<f64> = cpty_trades.iter().map(|t| t.delta).collect();
            net_addon *= portfolio_factor(&deltas);
        }

        let adjusted_addon = match counterparty.csa {
            Some(csa) => (net_addon - csa.collateral_held + csa.threshold).max(0.0),
            None => net_addon,
        };

        let ead = ce + adjusted_addon;

        let lgd = tables::lgd_for_seniority(Seniority::SeniorUnsecured);
        let pd_1y = tables::pd_for_rating(counterparty.effective_rating());
        let cds = view.cds_spread(&IssuerId::new(counterparty_id.as_str()));
        let cva = counterparty_cva(
            ce,
            adjusted_addon,
            t_max_years,
            cds,
            pd_1y,
            lgd,
            view,
            base_currency,
        )?;

        pfe_current += adjusted_addon;
        ead_total += ead;
        cva_total += cva;

        rows.push(CounterpartyCcr {
            counterparty_id: (*counterparty_id).clone(),
            current_exposure: ce,
            gross_addon,
            net_addon,
            adjusted_addon,
            pfe_peak: addons.iter().fold(0.0_f64, |acc, a| acc.max(*a)),
            ead,
            cva,
            trade_count: cpty_trades.len(),
        });
    }

    Ok(CcrMetrics {
        pfe_current,
        pfe_peak,
        ead_total,
        cva_total,
        counterparties: rows,
    })
}
