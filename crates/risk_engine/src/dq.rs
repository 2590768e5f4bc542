//! Data quality evaluation.
//!
//! A rule table applied to the market view and the position list. Evaluation
//! never fails and never mutates anything; it returns zero or more issues.
//! Positions touched by an `Error`-severity issue on their price path are
//! excluded from pricing by the assembler and the snapshot downgrades to
//! `Partial`.

use std::collections::{HashMap, HashSet};

use risk_core::market_data::MarketDataView;
use risk_core::types::{CurrencyPair, Date, Isin, PositionId};
use risk_models::instruments::{Instrument, Position};

use crate::inputs::{Issuer, Sector};

/// Day-on-day move above which a price jump is flagged (DQ-01).
const PRICE_JUMP_THRESHOLD: f64 = 0.50;
/// Bid-ask spread over mid above which a quote is flagged wide (DQ-04), bps.
const WIDE_SPREAD_BPS: f64 = 500.0;
/// Days without a trade above which a quote is stale (DQ-05).
const STALE_DAYS: u32 = 5;
/// Quoted yield outside [0, this] is an outlier (DQ-07).
const YIELD_OUTLIER_CEILING: f64 = 0.25;
/// Curve inversion inside this window is tolerated (DQ-20), bps.
const CURVE_INVERSION_TOLERANCE_BPS: f64 = 50.0;

/// Data quality rule codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DqCode {
    /// Price jump beyond the day-on-day threshold.
    Dq01PriceJump,
    /// Zero or missing price.
    Dq02MissingPrice,
    /// Bid above ask.
    Dq03CrossedQuote,
    /// Bid-ask spread beyond the width threshold.
    Dq04WideSpread,
    /// No trade for more days than the staleness threshold.
    Dq05StalePrice,
    /// Quoted yield outside the plausible range.
    Dq07YieldOutlier,
    /// Missing FX rate for a position currency.
    Dq10MissingFx,
    /// Curve inversion beyond the tolerated window.
    Dq20CurveInversion,
    /// Rating missing for a rated issuer.
    Dq30MissingRating,
    /// Duplicate ISIN within one portfolio.
    Dq33DuplicateIsin,
    /// Trade date after the calculation date.
    Dq40TradeDateFuture,
    /// Maturity on or before the calculation date.
    Dq41Matured,
}

impl DqCode {
    /// The published rule code.
    pub fn code(&self) -> &'static str {
        match self {
            DqCode::Dq01PriceJump => "DQ-01",
            DqCode::Dq02MissingPrice => "DQ-02",
            DqCode::Dq03CrossedQuote => "DQ-03",
            DqCode::Dq04WideSpread => "DQ-04",
            DqCode::Dq05StalePrice => "DQ-05",
            DqCode::Dq07YieldOutlier => "DQ-07",
            DqCode::Dq10MissingFx => "DQ-10",
            DqCode::Dq20CurveInversion => "DQ-20",
            DqCode::Dq30MissingRating => "DQ-30",
            DqCode::Dq33DuplicateIsin => "DQ-33",
            DqCode::Dq40TradeDateFuture => "DQ-40",
            DqCode::Dq41Matured => "DQ-41",
        }
    }

    /// Severity this rule carries.
    pub fn severity(&self) -> DqSeverity {
        match self {
            DqCode::Dq02MissingPrice
            | DqCode::Dq03CrossedQuote
            | DqCode::Dq10MissingFx
            | DqCode::Dq40TradeDateFuture
            | DqCode::Dq41Matured => DqSeverity::Error,
            DqCode::Dq01PriceJump
            | DqCode::Dq04WideSpread
            | DqCode::Dq05StalePrice
            | DqCode::Dq07YieldOutlier
            | DqCode::Dq20CurveInversion
            | DqCode::Dq30MissingRating
            | DqCode::Dq33DuplicateIsin => DqSeverity::Warning,
        }
    }
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum DqSeverity {
    /// Informational only.
    Info,
    /// Degraded quality, still usable.
    Warning,
    /// Unusable for pricing.
    Error,
}

/// Where the issue was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DqSource {
    /// Position-level rule.
    Position,
    /// Instrument quote rule.
    Market,
    /// Curve rule.
    Curve,
}

/// One detected data quality issue.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataQualityIssue {
    /// Rule that fired.
    pub code: DqCode,
    /// Severity of this occurrence.
    pub severity: DqSeverity,
    /// Detection source.
    pub source: DqSource,
    /// Referenced instrument, when instrument-scoped.
    pub instrument: Option<Isin>,
    /// Referenced position, when position-scoped.
    pub position: Option<PositionId>,
    /// Human-readable detail.
    pub detail: String,
    /// Detection date (the snapshot's as-of date).
    pub detected_at: Date,
}

impl DataQualityIssue {
    fn market(code: DqCode, isin: &Isin, detail: String, as_of: Date) -> Self {
        Self {
            code,
            severity: code.severity(),
            source: DqSource::Market,
            instrument: Some(isin.clone()),
            position: None,
            detail,
            detected_at: as_of,
        }
    }

    fn position(code: DqCode, position: &Position, detail: String, as_of: Date) -> Self {
        Self {
            code,
            severity: code.severity(),
            source: DqSource::Position,
            instrument: None,
            position: Some(position.id.clone()),
            detail,
            detected_at: as_of,
        }
    }
}

/// Applies the full rule table. Never fails.
///
/// The issuer table feeds the missing-rating rule; everything else reads the
/// view and the positions.
pub fn evaluate(
    view: &MarketDataView,
    positions: &[Position],
    issuers: &[Issuer],
) -> Vec<DataQualityIssue> {
    let as_of = view.as_of_date();
    let mut issues = Vec::new();

    // ---- Quote rules (DQ-01..DQ-07) over every loaded quote ----
    for (isin, quote) in view.quotes() {
        match quote.clean_price {
            None => issues.push(DataQualityIssue::market(
                DqCode::Dq02MissingPrice,
                isin,
                "price is missing".to_string(),
                as_of,
            )),
            Some(price) if price == 0.0 => issues.push(DataQualityIssue::market(
                DqCode::Dq02MissingPrice,
                isin,
                "price is zero".to_string(),
                as_of,
            )),
            Some(price) => {
                if let Some(prev) = quote.previous_close {
                    if prev > 0.0 {
                        let jump = (price - prev).abs() / prev;
                        if jump > PRICE_JUMP_THRESHOLD {
                            issues.push(DataQualityIssue::market(
                                DqCode::Dq01PriceJump,
                                isin,
                                format!("price moved {:.1}% day-on-day", jump * 100.0),
                                as_of,
                            ));
                        }
                    }
                }
            }
        }

        if let (Some(bid), Some(ask)) = (quote.bid, quote.ask) {
            if bid > ask {
                issues.push(DataQualityIssue::market(
                    DqCode::Dq03CrossedQuote,
                    isin,
                    format!("bid {bid} above ask {ask}"),
                    as_of,
                ));
            } else {
                let mid = 0.5 * (bid + ask);
                if mid > 0.0 {
                    let spread_bps = (ask - bid) / mid * 10_000.0;
                    if spread_bps > WIDE_SPREAD_BPS {
                        issues.push(DataQualityIssue::market(
                            DqCode::Dq04WideSpread,
                            isin,
                            format!("bid-ask spread {spread_bps:.0} bps"),
                            as_of,
                        ));
                    }
                }
            }
        }

        if let Some(days) = quote.days_since_trade {
            if days > STALE_DAYS {
                issues.push(DataQualityIssue::market(
                    DqCode::Dq05StalePrice,
                    isin,
                    format!("no trade for {days} days"),
                    as_of,
                ));
            }
        }

        if let Some(ytm) = quote.ytm {
            if !(0.0..=YIELD_OUTLIER_CEILING).contains(&ytm) {
                issues.push(DataQualityIssue::market(
                    DqCode::Dq07YieldOutlier,
                    isin,
                    format!("quoted yield {:.2}% outside [0, 25%]", ytm * 100.0),
                    as_of,
                ));
            }
        }
    }

    // ---- Curve rules (DQ-20) ----
    for (currency, curve) in view.curves() {
        if let Some(worst_bps) = curve.max_inversion_bps(CURVE_INVERSION_TOLERANCE_BPS) {
            issues.push(DataQualityIssue {
                code: DqCode::Dq20CurveInversion,
                severity: DqCode::Dq20CurveInversion.severity(),
                source: DqSource::Curve,
                instrument: None,
                position: None,
                detail: format!("{currency} curve inverts by {worst_bps:.0} bps"),
                detected_at: as_of,
            });
        }
    }

    // ---- Position rules (DQ-10, DQ-30, DQ-33, DQ-40, DQ-41) ----
    let ratings: HashMap<_, _> = issuers.iter().map(|i| (&i.id, i)).collect();
    let mut seen_isins: HashMap<Isin, usize> = HashMap::new();

    for position in positions {
        let instrument = &position.instrument;

        if instrument.trade_date() > as_of {
            issues.push(DataQualityIssue::position(
                DqCode::Dq40TradeDateFuture,
                position,
                format!("trade date {} after as-of {as_of}", instrument.trade_date()),
                as_of,
            ));
        }
        if instrument.maturity() <= as_of {
            issues.push(DataQualityIssue::position(
                DqCode::Dq41Matured,
                position,
                format!("maturity {} on or before as-of {as_of}", instrument.maturity()),
                as_of,
            ));
        }

        match instrument {
            Instrument::Bond(bond) => {
                let count = seen_isins.entry(bond.isin.clone()).or_insert(0);
                *count += 1;
                if *count == 2 {
                    issues.push(DataQualityIssue::position(
                        DqCode::Dq33DuplicateIsin,
                        position,
                        format!("ISIN {} held more than once in portfolio", bond.isin),
                        as_of,
                    ));
                }
                match ratings.get(&bond.issuer_id) {
                    Some(issuer) if issuer.rating.is_none() && issuer.sector != Sector::Agency => {
                        issues.push(DataQualityIssue::position(
                            DqCode::Dq30MissingRating,
                            position,
                            format!("issuer {} has no rating", bond.issuer_id),
                            as_of,
                        ));
                    }
                    _ => {}
                }
            }
            Instrument::FxForward(f) => check_fx(view, position, f.pair, &mut issues),
            Instrument::FxOption(o) => check_fx(view, position, o.pair, &mut issues),
            _ => {}
        }
    }

    issues
}

fn check_fx(
    view: &MarketDataView,
    position: &Position,
    pair: CurrencyPair,
    issues: &mut Vec<DataQualityIssue>,
) {
    if view.fx_rate(pair).is_err() {
        issues.push(DataQualityIssue::position(
            DqCode::Dq10MissingFx,
            position,
            format!("no FX rate resolvable for {pair}"),
            view.as_of_date(),
        ));
    }
}

/// Positions whose price path is touched by an `Error` issue.
///
/// Position-scoped errors block their position directly; market-scoped
/// errors block every position referencing the instrument.
pub fn blocked_positions(
    issues: &[DataQualityIssue],
    positions: &[Position],
) -> HashSet<PositionId> {
    let error_isins: HashSet<&Isin> = issues
        .iter()
        .filter(|i| i.severity == DqSeverity::Error)
        .filter_map(|i| i.instrument.as_ref())
        .collect();

    let mut blocked: HashSet<PositionId> = issues
        .iter()
        .filter(|i| i.severity == DqSeverity::Error)
        .filter_map(|i| i.position.clone())
        .collect();

    for position in positions {
        if let Instrument::Bond(bond) = &position.instrument {
            if error_isins.contains(&bond.isin) {
                blocked.insert(position.id.clone());
            }
        }
    }
    blocked
}
