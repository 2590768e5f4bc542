//! Snapshot assembly: the deterministic pipeline behind `compute_snapshot`.
//!
//! Control flow per portfolio: build the market view → evaluate data quality
//! → price positions (parallel) → aggregate market metrics → VaR → credit →
//! CCR/CVA → liquidity → capital → stress scenarios → limits → assemble. A
//! cancellation token and an advisory deadline are checked at component
//! boundaries; per-position and per-block failures degrade the snapshot to
//! `Partial`, and only view construction failure (or cancellation before any
//! block) fails it outright.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use risk_core::config::{ConfigError, EngineConfig};
use risk_core::market_data::{MarketDataSnapshot, MarketDataView, ViewRequirements};
use risk_core::math::SolverConfig;
use risk_core::types::{Currency, CurrencyPair, PositionId};
use risk_models::instruments::{Instrument, Position};
use risk_models::pricing::{price_position, PositionValuation};

use crate::capital::{self, CreditExposure, FxExposure, RateExposure};
use crate::ccr::{self, TradeExposure};
use crate::credit;
use crate::dq::{self, DataQualityIssue};
use crate::error::EngineError;
use crate::inputs::SnapshotInputs;
use crate::limits::{self, Alert, AlertsSummary, MetricValues};
use crate::liquidity::{self, LiquidityPosition, LiquidityShock};
use crate::snapshot::{
    CapitalBlock, CcrBlock, CreditBlock, LiquidityBlock, MarketBlock, RiskSnapshot, SnapshotStatus,
};
use crate::stress::{self, BondSensitivity, Scenario, StressContributor, StressResult};
use crate::var;

/// Cooperative cancellation token, shared with the host.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; checked at component boundaries.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-call run control: cancellation plus an advisory deadline.
#[derive(Debug, Clone)]
pub struct RunControl {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl RunControl {
    /// Control with a cancellation token and an optional deadline from now.
    pub fn new(cancel: CancelToken, deadline_ms: u64) -> Self {
        let deadline = (deadline_ms > 0).then(|| Instant::now() + Duration::from_millis(deadline_ms));
        Self { cancel, deadline }
    }

    /// Control that never cancels nor times out.
    pub fn unbounded() -> Self {
        Self {
            cancel: CancelToken::new(),
            deadline: None,
        }
    }

    fn checkpoint(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() > deadline {
                return Err(EngineError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

/// The result bundle of one snapshot computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedSnapshot {
    /// The stored snapshot document.
    pub snapshot: RiskSnapshot,
    /// Emitted alerts (Yellow and worse), most severe first.
    pub alerts: Vec<Alert>,
    /// Data quality issues detected during the run.
    pub dq_issues: Vec<DataQualityIssue>,
    /// Stress scenario results.
    pub stress: Vec<StressResult>,
}

/// A priced position with its valuation converted to base currency.
struct PricedPosition {
    index: usize,
    mtm_base: f64,
    delta_base: f64,
    dv01_base: f64,
    valuation: PositionValuation,
}

/// Everything the downstream blocks need from the pricing stage.
struct PricedBook {
    priced: Vec<PricedPosition>,
    unpriced: Vec<(PositionId, String)>,
}

/// The deterministic risk engine.
///
/// Holds only validated configuration and a bounded worker pool; every
/// computation is a pure function of its inputs and the engine version.
pub struct RiskEngine {
    config: EngineConfig,
    pool: rayon::ThreadPool,
}

impl RiskEngine {
    /// Creates an engine from validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallelism)
            .build()
            .map_err(|e| ConfigError::OutOfRange {
                field: "parallelism",
                value: e.to_string(),
                reason: "worker pool construction failed",
            })?;
        Ok(Self { config, pool })
    }

    /// The configuration in force.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates the data quality rule table. Pure; never fails.
    pub fn evaluate_dq(
        &self,
        view: &MarketDataView,
        positions: &[Position],
        issuers: &[crate::inputs::Issuer],
    ) -> Vec<DataQualityIssue> {
        dq::evaluate(view, positions, issuers)
    }

    /// Computes one risk snapshot without external control.
    pub fn compute_snapshot(&self, inputs: &SnapshotInputs) -> ComputedSnapshot {
        self.compute_snapshot_with_control(
            inputs,
            &RunControl::new(CancelToken::new(), self.config.deadline_ms),
        )
    }

    /// Computes the nightly batch: one snapshot per active portfolio,
    /// parallelized across portfolios on the bounded pool.
    pub fn compute_batch(&self, batch: &[SnapshotInputs]) -> Vec<ComputedSnapshot> {
        let started = Instant::now();
        let results: Vec<ComputedSnapshot> = self.pool.install(|| {
            batch
                .par_iter()
                .filter(|inputs| inputs.portfolio.active)
                .map(|inputs| self.compute_snapshot(inputs))
                .collect()
        });
        info!(
            portfolios = batch.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch computation finished"
        );
        results
    }

    /// Computes one risk snapshot under explicit run control.
    pub fn compute_snapshot_with_control(
        &self,
        inputs: &SnapshotInputs,
        control: &RunControl,
    ) -> ComputedSnapshot {
        let as_of = inputs.market.as_of_date;
        info!(
            portfolio = %inputs.portfolio.id,
            as_of = %as_of.map(|d| d.to_string()).unwrap_or_default(),
            positions = inputs.positions.len(),
            "snapshot computation started"
        );

        match self.run_pipeline(inputs, control) {
            Ok(computed) => computed,
            Err(err) => {
                warn!(portfolio = %inputs.portfolio.id, error = %err, "snapshot failed");
                self.failed_snapshot(inputs, err)
            }
        }
    }

    // ---- pipeline ----

    fn run_pipeline(
        &self,
        inputs: &SnapshotInputs,
        control: &RunControl,
    ) -> Result<ComputedSnapshot, EngineError> {
        let base_currency = inputs.portfolio.base_currency;
        let mut error_notes: Vec<String> = Vec::new();

        // ---- C1: market view (lenient per-position, strict on the base) ----
        control.checkpoint()?;
        let (view, excluded) = self.build_view(inputs)?;
        for (id, cause) in &excluded {
            warn!(position = %id, cause = %cause, "position excluded from pricing");
            error_notes.push(format!("{id}: {cause}"));
        }

        // ---- C2: data quality ----
        let dq_issues = dq::evaluate(&view, &inputs.positions, &inputs.issuers);
        let mut blocked = dq::blocked_positions(&dq_issues, &inputs.positions);
        for (id, _) in &excluded {
            blocked.insert(id.clone());
        }
        debug!(
            issues = dq_issues.len(),
            blocked = blocked.len(),
            "data quality evaluated"
        );

        // ---- C3/C4: position pricing (parallel) ----
        control.checkpoint()?;
        let book = self.price_book(inputs, &view, &blocked, base_currency, &mut error_notes);
        let as_of = view.as_of_date();

        // ---- Market aggregates ----
        control.checkpoint()?;
        let (dv01_total, duration, convexity, total_bond_mv) = market_aggregates(&book);

        // ---- C5: VaR ----
        let var_result = match var::compute_var(&inputs.pnl_history, &self.config, as_of) {
            Ok(result) => {
                if let Some(cause) = &result.stressed_var_error {
                    error_notes.push(cause.clone());
                }
                Some(result)
            }
            Err(err) => {
                error_notes.push(err.to_string());
                None
            }
        };

        // ---- C6: credit ----
        control.checkpoint()?;
        let issuer_exposures = bond_issuer_exposures(inputs, &book);
        let credit_metrics = credit::compute(&issuer_exposures, &inputs.issuers);

        // ---- C7: CCR / CVA ----
        control.checkpoint()?;
        let regime = ccr::resolve_regime(self.config.vol_regime_override, view.vix());
        let trades = derivative_trades(inputs, &book);
        let ccr_metrics = match ccr::compute(&trades, &inputs.counterparties, &view, base_currency, regime)
        {
            Ok(metrics) => Some(metrics),
            Err(err) => {
                error_notes.push(err.to_string());
                None
            }
        };

        // ---- C8: liquidity ----
        control.checkpoint()?;
        let liquidity_positions = bond_liquidity_positions(inputs, &book);
        let liquidity_metrics = liquidity::compute(
            &liquidity_positions,
            &view,
            &inputs.issuers,
            &inputs.funding,
            &self.config,
            LiquidityShock::default(),
        );
        if liquidity_metrics.lcr_is_sentinel {
            error_notes.push("LCR sentinel: net outflows non-positive".to_string());
        }

        // ---- C9: capital ----
        control.checkpoint()?;
        let (rate_rows, credit_rows, fx_rows) = capital_exposures(inputs, &book, base_currency);
        let capital_metrics = capital::compute(
            &rate_rows,
            &credit_rows,
            &fx_rows,
            &inputs.capital,
            &self.config,
        );

        // ---- C10: stress ----
        control.checkpoint()?;
        let stress_results = self.run_stress(
            inputs,
            &blocked,
            base_currency,
            &book,
            var_result.as_ref().map(|v| v.var_1d_95),
            capital_metrics.total_k_req,
            capital_metrics.capital_ratio,
            liquidity_metrics.lcr_ratio,
            total_bond_mv,
            control,
        )?;

        // ---- C11: limits and alerts ----
        control.checkpoint()?;
        let metric_values = MetricValues {
            dv01_total: Some(dv01_total),
            var_1d_95: var_result.as_ref().map(|v| v.var_1d_95),
            stressed_var: var_result.as_ref().and_then(|v| v.stressed_var),
            expected_loss: Some(credit_metrics.expected_loss),
            cva_total: ccr_metrics.as_ref().map(|m| m.cva_total),
            pfe_total: ccr_metrics.as_ref().map(|m| m.pfe_current),
            ead_total: ccr_metrics.as_ref().map(|m| m.ead_total),
            liquidation_cost_1d: Some(liquidity_metrics.liquidation_cost_1d),
            lcr: Some(liquidity_metrics.lcr_ratio),
            capital_ratio: Some(capital_metrics.capital_ratio),
        };
        let (alerts, alerts_summary) = limits::evaluate(
            &inputs.limits,
            &metric_values,
            &inputs.portfolio.id,
            inputs.calculation_time,
        );

        // ---- C13: assembly ----
        let degraded = !book.unpriced.is_empty()
            || var_result.is_none()
            || var_result
                .as_ref()
                .is_some_and(|v| v.stressed_var.is_none())
            || ccr_metrics.is_none();
        let status = if degraded {
            SnapshotStatus::Partial
        } else {
            SnapshotStatus::Success
        };

        let snapshot = RiskSnapshot {
            portfolio_id: inputs.portfolio.id.clone(),
            as_of_date: as_of,
            engine_version: self.config.engine_version.clone(),
            market_data_snapshot_id: view.snapshot_id().to_string(),
            status,
            market: Some(MarketBlock {
                var_1d_95: var_result.as_ref().map(|v| v.var_1d_95),
                stressed_var: var_result.as_ref().and_then(|v| v.stressed_var),
                dv01_total,
                duration,
                convexity,
            }),
            credit: Some(CreditBlock {
                total_exposure: credit_metrics.total_exposure,
                expected_loss: credit_metrics.expected_loss,
                cva_total: ccr_metrics.as_ref().map_or(0.0, |m| m.cva_total),
            }),
            ccr: ccr_metrics.as_ref().map(|m| CcrBlock {
                pfe_current: m.pfe_current,
                pfe_peak: m.pfe_peak,
                ead_total: m.ead_total,
            }),
            liquidity: Some(LiquidityBlock {
                lcr_ratio: liquidity_metrics.lcr_ratio,
                funding_gap_short_term: liquidity_metrics.funding_gap_short_term,
                liquidation_cost_1d: liquidity_metrics.liquidation_cost_1d,
                liquidation_cost_5d: liquidity_metrics.liquidation_cost_5d,
                liquidity_score: liquidity_metrics.liquidity_score,
            }),
            capital: Some(CapitalBlock {
                k_npr: capital_metrics.k_npr,
                k_aum: capital_metrics.k_aum,
                k_cmh: capital_metrics.k_cmh,
                k_coh: capital_metrics.k_coh,
                total_k_req: capital_metrics.total_k_req,
                own_funds: capital_metrics.own_funds,
                capital_ratio: capital_metrics.capital_ratio,
            }),
            alerts_summary,
            error_message: (!error_notes.is_empty()).then(|| error_notes.join("; ")),
            calculated_at: inputs.calculation_time,
        };

        info!(
            portfolio = %inputs.portfolio.id,
            status = ?status,
            alerts = alerts.len(),
            "snapshot computation finished"
        );

        Ok(ComputedSnapshot {
            snapshot,
            alerts,
            dq_issues,
            stress: stress_results,
        })
    }

    /// Terminal snapshot for a failed run.
    fn failed_snapshot(&self, inputs: &SnapshotInputs, err: EngineError) -> ComputedSnapshot {
        let as_of = inputs
            .market
            .as_of_date
            .unwrap_or_else(|| risk_core::types::Date::from_ymd(1970, 1, 1).expect("epoch"));
        ComputedSnapshot {
            snapshot: RiskSnapshot {
                portfolio_id: inputs.portfolio.id.clone(),
                as_of_date: as_of,
                engine_version: self.config.engine_version.clone(),
                market_data_snapshot_id: inputs.market.content_hash(),
                status: SnapshotStatus::Failed,
                market: None,
                credit: None,
                ccr: None,
                liquidity: None,
                capital: None,
                alerts_summary: AlertsSummary::default(),
                error_message: Some(err.to_string()),
                calculated_at: inputs.calculation_time,
            },
            alerts: Vec::new(),
            dq_issues: Vec::new(),
            stress: Vec::new(),
        }
    }

    /// Builds the market view, excluding positions whose own data is missing
    /// or unusable instead of failing the run.
    ///
    /// Only an unbuildable base (absent as-of date, or a missing/broken
    /// base-currency curve) fails.
    fn build_view(
        &self,
        inputs: &SnapshotInputs,
    ) -> Result<(MarketDataView, Vec<(PositionId, String)>), EngineError> {
        let base = inputs.portfolio.base_currency;
        let known_counterparties: HashSet<_> =
            inputs.counterparties.iter().map(|c| &c.id).collect();

        let mut excluded: Vec<(PositionId, String)> = Vec::new();
        let mut included: Vec<&Position> = Vec::new();
        for position in &inputs.positions {
            if position.instrument.is_derivative() {
                match &position.counterparty_id {
                    Some(id) if known_counterparties.contains(id) => {}
                    Some(id) => {
                        excluded
                            .push((position.id.clone(), format!("unknown counterparty {id}")));
                        continue;
                    }
                    None => {
                        excluded.push((
                            position.id.clone(),
                            "derivative without counterparty reference".to_string(),
                        ));
                        continue;
                    }
                }
            }
            match position_market_cause(position, &inputs.market, base) {
                Some(cause) => excluded.push((position.id.clone(), cause)),
                None => included.push(position),
            }
        }

        let requirements = view_requirements(&included, base);
        let view = MarketDataView::build(&inputs.market, &requirements)?;
        Ok((view, excluded))
    }

    /// Prices the non-blocked positions in parallel on the bounded pool.
    fn price_book(
        &self,
        inputs: &SnapshotInputs,
        view: &MarketDataView,
        blocked: &HashSet<PositionId>,
        base_currency: Currency,
        error_notes: &mut Vec<String>,
    ) -> PricedBook {
        let solver = SolverConfig::new(self.config.ytm_tolerance, self.config.ytm_max_iter);

        let outcomes: Vec<(usize, Result<PositionValuation, String>)> = self.pool.install(|| {
            inputs
                .positions
                .par_iter()
                .enumerate()
                .filter(|(_, p)| !blocked.contains(&p.id))
                .map(|(index, position)| {
                    let outcome = price_position(position, view, solver)
                        .map_err(|e| e.to_string());
                    (index, outcome)
                })
                .collect()
        });

        let mut priced = Vec::new();
        let mut unpriced: Vec<(PositionId, String)> = blocked
            .iter()
            .map(|id| (id.clone(), "blocked by data quality".to_string()))
            .collect();
        unpriced.sort_by(|a, b| a.0.cmp(&b.0));

        for (index, outcome) in outcomes {
            let position = &inputs.positions[index];
            match outcome {
                Ok(valuation) => {
                    let pair = CurrencyPair::new(valuation.valuation.currency, base_currency);
                    match view.fx_rate(pair) {
                        Ok(rate) => priced.push(PricedPosition {
                            index,
                            mtm_base: valuation.valuation.mtm * rate,
                            delta_base: valuation.valuation.delta * rate,
                            dv01_base: valuation.valuation.dv01 * rate,
                            valuation,
                        }),
                        Err(e) => {
                            unpriced.push((position.id.clone(), e.to_string()));
                        }
                    }
                }
                Err(cause) => {
                    debug!(position = %position.id, cause = %cause, "position unpriced");
                    unpriced.push((position.id.clone(), cause));
                }
            }
        }
        priced.sort_by_key(|p| p.index);

        for (id, cause) in &unpriced {
            if cause != "blocked by data quality" {
                error_notes.push(format!("{id}: {cause}"));
            }
        }
        if !unpriced.is_empty() {
            error_notes.push(format!("{} position(s) unpriced", unpriced.len()));
        }

        PricedBook { priced, unpriced }
    }

    /// Re-runs pricing, capital and liquidity under every built-in scenario.
    #[allow(clippy::too_many_arguments)]
    fn run_stress(
        &self,
        inputs: &SnapshotInputs,
        blocked: &HashSet<PositionId>,
        base_currency: Currency,
        base_book: &PricedBook,
        base_var: Option<f64>,
        base_k_req: f64,
        base_capital_ratio: f64,
        base_lcr: f64,
        total_base_mv: f64,
        control: &RunControl,
    ) -> Result<Vec<StressResult>, EngineError> {
        let bond_sensitivities = bond_sensitivities(inputs, base_book);
        let mut results = Vec::new();

        for scenario in stress::builtin_scenarios() {
            control.checkpoint()?;
            match self.run_one_scenario(
                inputs,
                blocked,
                base_currency,
                base_book,
                &bond_sensitivities,
                base_var,
                base_k_req,
                base_capital_ratio,
                base_lcr,
                total_base_mv,
                &scenario,
            ) {
                Ok(result) => results.push(result),
                Err(err) => {
                    warn!(scenario = %scenario.name, error = %err, "stress scenario skipped");
                }
            }
        }
        Ok(results)
    }

    #[allow(clippy::too_many_arguments)]
    fn run_one_scenario(
        &self,
        inputs: &SnapshotInputs,
        blocked: &HashSet<PositionId>,
        base_currency: Currency,
        base_book: &PricedBook,
        bond_sensitivities: &[BondSensitivity],
        base_var: Option<f64>,
        base_k_req: f64,
        base_capital_ratio: f64,
        base_lcr: f64,
        total_base_mv: f64,
        scenario: &Scenario,
    ) -> Result<StressResult, EngineError> {
        let shocked_market = stress::apply(scenario, &inputs.market, bond_sensitivities);
        let shocked_inputs = SnapshotInputs {
            market: shocked_market,
            ..inputs.clone()
        };
        let (shocked_view, _) = self.build_view(&shocked_inputs)?;

        // Reprice the same book against the shocked view.
        let solver = SolverConfig::new(self.config.ytm_tolerance, self.config.ytm_max_iter);
        let mut contributors = Vec::new();
        let mut shocked_book = PricedBook {
            priced: Vec::new(),
            unpriced: Vec::new(),
        };
        let mut pnl = 0.0;

        for base_position in &base_book.priced {
            let position = &inputs.positions[base_position.index];
            if blocked.contains(&position.id) {
                continue;
            }
            let shocked_value = match price_position(position, &shocked_view, solver) {
                Ok(valuation) => {
                    let pair = CurrencyPair::new(valuation.valuation.currency, base_currency);
                    let rate = shocked_view.fx_rate(pair)?;
                    let mtm_base = valuation.valuation.mtm * rate;
                    shocked_book.priced.push(PricedPosition {
                        index: base_position.index,
                        mtm_base,
                        delta_base: valuation.valuation.delta * rate,
                        dv01_base: valuation.valuation.dv01 * rate,
                        valuation,
                    });
                    mtm_base
                }
                // A position that fails to reprice under shock carries its
                // base value (zero contribution).
                Err(_) => base_position.mtm_base,
            };

            let delta = shocked_value - base_position.mtm_base;
            pnl += delta;
            contributors.push(StressContributor {
                position_id: position.id.to_string(),
                base_value: base_position.mtm_base,
                stressed_value: shocked_value,
                delta_value: delta,
            });
        }

        contributors.sort_by(|a, b| {
            b.delta_value
                .abs()
                .partial_cmp(&a.delta_value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        contributors.truncate(10);

        // ΔVaR: the scenario P&L shifts every observation of the series.
        let delta_var = base_var.and_then(|base| {
            let shifted: Vec<crate::inputs::PnlObservation> = inputs
                .pnl_history
                .iter()
                .map(|obs| crate::inputs::PnlObservation {
                    date: obs.date,
                    pnl: obs.pnl + pnl,
                })
                .collect();
            var::compute_var(&shifted, &self.config, shocked_view.as_of_date())
                .ok()
                .map(|r| r.var_1d_95 - base)
        });

        // ΔK and Δratio from the shocked book.
        let (rate_rows, credit_rows, fx_rows) =
            capital_exposures(inputs, &shocked_book, base_currency);
        let shocked_capital = capital::compute(
            &rate_rows,
            &credit_rows,
            &fx_rows,
            &inputs.capital,
            &self.config,
        );

        // ΔLCR with the scenario's liquidity dials and shocked values.
        let liquidity_positions = bond_liquidity_positions(inputs, &shocked_book);
        let shocked_liquidity = liquidity::compute(
            &liquidity_positions,
            &shocked_view,
            &inputs.issuers,
            &inputs.funding,
            &self.config,
            scenario.liquidity.unwrap_or_default(),
        );

        Ok(StressResult {
            scenario: scenario.name.clone(),
            description: scenario.description.clone(),
            pnl,
            pnl_pct: if total_base_mv > 0.0 {
                pnl / total_base_mv
            } else {
                0.0
            },
            delta_var,
            delta_k_req: shocked_capital.total_k_req - base_k_req,
            delta_capital_ratio: shocked_capital.capital_ratio - base_capital_ratio,
            delta_lcr: shocked_liquidity.lcr_ratio - base_lcr,
            top_contributors: contributors,
        })
    }
}

// ---- free helpers (pure, shared between base and stress runs) ----

/// Market data a position needs, checked directly against the raw snapshot;
/// returns the exclusion cause if anything is missing or unusable.
fn position_market_cause(
    position: &Position,
    market: &MarketDataSnapshot,
    base: Currency,
) -> Option<String> {
    let curve_ok = |ccy: Currency| -> Option<String> {
        match market.zero_curves.get(&ccy) {
            None => Some(format!("missing {ccy} curve")),
            Some(pillars) => risk_core::market_data::ZeroCurve::new(pillars.clone())
                .err()
                .map(|e| e.to_string()),
        }
    };
    let fx_ok = |ccy: Currency| -> Option<String> {
        if ccy == base || fx_resolvable(market, CurrencyPair::new(ccy, base)) {
            None
        } else {
            Some(format!("no FX rate {ccy}/{base}"))
        }
    };
    let surface_ok = |key: &str| -> Option<String> {
        if market.vol_grids.contains_key(key) {
            None
        } else {
            Some(format!("missing vol surface {key}"))
        }
    };

    match &position.instrument {
        Instrument::Bond(bond) => {
            match market.quotes.get(&bond.isin) {
                None => return Some(format!("missing quote {}", bond.isin)),
                Some(quote) => {
                    if let (Some(bid), Some(ask)) = (quote.bid, quote.ask) {
                        if bid > ask {
                            return Some(format!("crossed quote {}", bond.isin));
                        }
                    }
                }
            }
            fx_ok(bond.currency)
        }
        Instrument::FxForward(f) => curve_ok(f.pair.base)
            .or_else(|| curve_ok(f.pair.quote))
            .or_else(|| {
                if fx_resolvable(market, f.pair) {
                    None
                } else {
                    Some(format!("no FX rate {}", f.pair))
                }
            })
            .or_else(|| fx_ok(f.pair.quote)),
        Instrument::FxOption(o) => curve_ok(o.pair.base)
            .or_else(|| curve_ok(o.pair.quote))
            .or_else(|| {
                if fx_resolvable(market, o.pair) {
                    None
                } else {
                    Some(format!("no FX rate {}", o.pair))
                }
            })
            .or_else(|| surface_ok(&o.underlying()))
            .or_else(|| fx_ok(o.pair.quote)),
        Instrument::IrSwap(s) => curve_ok(s.currency).or_else(|| fx_ok(s.currency)),
        Instrument::CapFloor(c) => curve_ok(c.currency)
            .or_else(|| surface_ok(&c.underlying()))
            .or_else(|| fx_ok(c.currency)),
        Instrument::Swaption(s) => curve_ok(s.currency)
            .or_else(|| surface_ok(&s.underlying()))
            .or_else(|| fx_ok(s.currency)),
    }
}

/// Whether a pair resolves directly, by inversion, or through USD.
fn fx_resolvable(market: &MarketDataSnapshot, pair: CurrencyPair) -> bool {
    if pair.base == pair.quote
        || market.fx_rates.contains_key(&pair)
        || market.fx_rates.contains_key(&pair.inverse())
    {
        return true;
    }
    let leg = |a: Currency, b: Currency| {
        let p = CurrencyPair::new(a, b);
        market.fx_rates.contains_key(&p) || market.fx_rates.contains_key(&p.inverse())
    };
    leg(pair.base, Currency::USD) && leg(Currency::USD, pair.quote)
}

/// Union of requirements across the included positions, plus the base curve.
fn view_requirements(positions: &[&Position], base: Currency) -> ViewRequirements {
    let mut requirements = ViewRequirements {
        currencies: vec![base],
        ..Default::default()
    };
    let push_ccy = |reqs: &mut ViewRequirements, ccy: Currency| {
        if !reqs.currencies.contains(&ccy) {
            reqs.currencies.push(ccy);
        }
    };

    for position in positions {
        match &position.instrument {
            Instrument::Bond(b) => {
                if !requirements.isins.contains(&b.isin) {
                    requirements.isins.push(b.isin.clone());
                }
            }
            Instrument::FxForward(f) => {
                push_ccy(&mut requirements, f.pair.base);
                push_ccy(&mut requirements, f.pair.quote);
                if !requirements.pairs.contains(&f.pair) {
                    requirements.pairs.push(f.pair);
                }
            }
            Instrument::FxOption(o) => {
                push_ccy(&mut requirements, o.pair.base);
                push_ccy(&mut requirements, o.pair.quote);
                if !requirements.pairs.contains(&o.pair) {
                    requirements.pairs.push(o.pair);
                }
                let key = o.underlying();
                if !requirements.underlyings.contains(&key) {
                    requirements.underlyings.push(key);
                }
            }
            Instrument::IrSwap(s) => push_ccy(&mut requirements, s.currency),
            Instrument::CapFloor(c) => {
                push_ccy(&mut requirements, c.currency);
                let key = c.underlying();
                if !requirements.underlyings.contains(&key) {
                    requirements.underlyings.push(key);
                }
            }
            Instrument::Swaption(s) => {
                push_ccy(&mut requirements, s.currency);
                let key = s.underlying();
                if !requirements.underlyings.contains(&key) {
                    requirements.underlyings.push(key);
                }
            }
        }
    }
    requirements
}

/// DV01 sum plus MV-weighted duration and convexity of the bond book.
fn market_aggregates(book: &PricedBook) -> (f64, f64, f64, f64) {
    let mut dv01_total = 0.0;
    let mut mv_total = 0.0;
    let mut duration_weighted = 0.0;
    let mut convexity_weighted = 0.0;

    for position in &book.priced {
        dv01_total += position.dv01_base;
        if let Some(bond) = &position.valuation.bond {
            let mv = position.mtm_base;
            mv_total += mv;
            duration_weighted += bond.modified_duration * mv;
            convexity_weighted += bond.convexity * mv;
        }
    }

    let (duration, convexity) = if mv_total > 0.0 {
        (duration_weighted / mv_total, convexity_weighted / mv_total)
    } else {
        (0.0, 0.0)
    };
    (dv01_total, duration, convexity, mv_total)
}

/// Per-position (issuer, base-currency MV) rows for the credit block.
fn bond_issuer_exposures(
    inputs: &SnapshotInputs,
    book: &PricedBook,
) -> Vec<(risk_core::types::IssuerId, f64)> {
    book.priced
        .iter()
        .filter_map(|p| match &inputs.positions[p.index].instrument {
            Instrument::Bond(bond) => Some((bond.issuer_id.clone(), p.mtm_base)),
            _ => None,
        })
        .collect()
}

/// Trade exposures for the CCR block.
fn derivative_trades(inputs: &SnapshotInputs, book: &PricedBook) -> Vec<TradeExposure> {
    book.priced
        .iter()
        .filter_map(|p| {
            let position = &inputs.positions[p.index];
            if !position.instrument.is_derivative() {
                return None;
            }
            position.counterparty_id.as_ref().map(|id| TradeExposure {
                counterparty_id: id.clone(),
                position: position.clone(),
                mtm: p.mtm_base,
                delta: p.delta_base,
            })
        })
        .collect()
}

/// Liquidity inputs from the priced bond book.
fn bond_liquidity_positions(inputs: &SnapshotInputs, book: &PricedBook) -> Vec<LiquidityPosition> {
    book.priced
        .iter()
        .filter_map(|p| match &inputs.positions[p.index].instrument {
            Instrument::Bond(bond) => Some(LiquidityPosition {
                isin: bond.isin.clone(),
                issuer_id: bond.issuer_id.clone(),
                market_value: p.mtm_base,
                notional: bond.notional,
            }),
            _ => None,
        })
        .collect()
}

/// Duration inputs for shocking bond quotes in stress scenarios.
fn bond_sensitivities(inputs: &SnapshotInputs, book: &PricedBook) -> Vec<BondSensitivity> {
    let issuer_ratings: std::collections::HashMap<_, _> = inputs
        .issuers
        .iter()
        .map(|i| (&i.id, i.rating))
        .collect();
    book.priced
        .iter()
        .filter_map(|p| {
            let bond_analytics = p.valuation.bond.as_ref()?;
            match &inputs.positions[p.index].instrument {
                Instrument::Bond(bond) => Some(BondSensitivity {
                    isin: bond.isin.clone(),
                    modified_duration: bond_analytics.modified_duration,
                    tenor_years: bond_analytics.time_to_maturity,
                    rating: issuer_ratings.get(&bond.issuer_id).copied().flatten(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// K-factor exposure rows from the priced book.
fn capital_exposures(
    inputs: &SnapshotInputs,
    book: &PricedBook,
    base: Currency,
) -> (Vec<RateExposure>, Vec<CreditExposure>, Vec<FxExposure>) {
    let issuer_ratings: std::collections::HashMap<_, _> = inputs
        .issuers
        .iter()
        .map(|i| (&i.id, i.rating))
        .collect();

    let mut rates = Vec::new();
    let mut credits = Vec::new();
    let mut fx = Vec::new();

    for p in &book.priced {
        let position = &inputs.positions[p.index];
        match &position.instrument {
            Instrument::Bond(bond) => {
                let Some(analytics) = &p.valuation.bond else {
                    continue;
                };
                rates.push(RateExposure {
                    tenor_years: analytics.time_to_maturity,
                    signed_value: p.mtm_base,
                });
                if let Some(rating) = issuer_ratings.get(&bond.issuer_id).copied().flatten() {
                    credits.push(CreditExposure {
                        rating,
                        market_value: p.mtm_base,
                    });
                } else {
                    // Unrated paper carries the worst standardised weight.
                    credits.push(CreditExposure {
                        rating: risk_core::types::Rating::B,
                        market_value: p.mtm_base,
                    });
                }
                if bond.currency != base {
                    fx.push(FxExposure {
                        currency: bond.currency,
                        signed_value: p.mtm_base,
                    });
                }
            }
            Instrument::IrSwap(swap) => {
                // A payer swap is short its tenor bucket; receiver is long.
                let sign = match swap.direction {
                    risk_models::instruments::SwapDirection::PayFixed => -1.0,
                    risk_models::instruments::SwapDirection::ReceiveFixed => 1.0,
                };
                rates.push(RateExposure {
                    tenor_years: years_to(inputs, swap.maturity_date),
                    signed_value: sign * swap.notional,
                });
                if swap.currency != base {
                    fx.push(FxExposure {
                        currency: swap.currency,
                        signed_value: p.mtm_base,
                    });
                }
            }
            Instrument::FxForward(forward) => {
                if forward.pair.base != base {
                    fx.push(FxExposure {
                        currency: forward.pair.base,
                        signed_value: p.delta_base,
                    });
                }
            }
            Instrument::FxOption(option) => {
                if option.pair.base != base {
                    fx.push(FxExposure {
                        currency: option.pair.base,
                        signed_value: p.delta_base,
                    });
                }
            }
            // Rate optionality enters K-IR as a notional-equivalent position
            // signed by its rate sensitivity.
            Instrument::CapFloor(c) => rates.push(RateExposure {
                tenor_years: years_to(inputs, c.maturity_date),
                signed_value: p.dv01_base.signum() * c.notional,
            }),
            Instrument::Swaption(s) => rates.push(RateExposure {
                tenor_years: years_to(inputs, s.expiry_date),
                signed_value: p.dv01_base.signum() * s.notional,
            }),
        }
    }
    (rates, credits, fx)
}

fn years_to(inputs: &SnapshotInputs, date: risk_core::types::Date) -> f64 {
    match inputs.market.as_of_date {
        Some(as_of) => (date - as_of) as f64 / 365.0,
        None => 0.0,
    }
}
