//! VaR backtesting: exception pairing and traffic-light classification.
//!
//! Each trading day pairs the previous day's VaR forecast with the realized
//! P&L; a loss beyond the forecast is an exception. The rolling 250-day
//! exception count maps to the Basel traffic light, and the Kupiec
//! unconditional-coverage statistic is reported alongside without gating
//! anything.

use risk_core::types::{Date, PortfolioId};
use risk_models::analytical::norm_cdf;

/// Rolling window for exception counting.
pub const BACKTEST_WINDOW: usize = 250;

/// One backtesting observation (append-only; the store lives with the host).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BacktestingRecord {
    /// Portfolio tested.
    pub portfolio_id: PortfolioId,
    /// Observation date.
    pub date: Date,
    /// Previous day's VaR forecast (non-negative).
    pub var_forecast: f64,
    /// Realized P&L on the observation date.
    pub realized_pnl: f64,
    /// Whether the loss exceeded the forecast.
    pub is_exception: bool,
}

impl BacktestingRecord {
    /// Pairs a forecast with the realized P&L, marking the exception flag.
    ///
    /// An exception is a realized loss strictly beyond the forecast:
    /// `pnl < -|VaR|`.
    pub fn pair(
        portfolio_id: PortfolioId,
        date: Date,
        var_forecast: f64,
        realized_pnl: f64,
    ) -> Self {
        let is_exception = realized_pnl < -var_forecast.abs();
        Self {
            portfolio_id,
            date,
            var_forecast,
            realized_pnl,
            is_exception,
        }
    }
}

/// Basel traffic-light zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TrafficLight {
    /// 0–4 exceptions: model accepted.
    Green,
    /// 5–9 exceptions: model under review.
    Yellow,
    /// 10 or more exceptions: model rejected.
    Red,
}

/// Backtesting evaluation over the rolling window.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BacktestResult {
    /// Observations inside the window.
    pub observations: usize,
    /// Exceptions inside the window.
    pub exceptions: usize,
    /// Exception rate.
    pub exception_rate: f64,
    /// Traffic-light zone.
    pub traffic_light: TrafficLight,
    /// Kupiec proportion-of-failures p-value, when computable.
    pub kupiec_p_value: Option<f64>,
}

/// Classifies an exception count into the traffic light.
pub fn traffic_light(exceptions: usize) -> TrafficLight {
    match exceptions {
        0..=4 => TrafficLight::Green,
        5..=9 => TrafficLight::Yellow,
        _ => TrafficLight::Red,
    }
}

/// Kupiec unconditional-coverage likelihood ratio p-value.
///
/// `LR = −2·ln[(1−p)^(N−x)·p^x] + 2·ln[(1−x/N)^(N−x)·(x/N)^x]`, compared
/// against a χ² distribution with one degree of freedom. Returns `None` for
/// degenerate samples (no observations, or an all/none exception split where
/// the statistic is unbounded).
pub fn kupiec_p_value(observations: usize, exceptions: usize, coverage: f64) -> Option<f64> {
    if observations == 0 || exceptions == 0 || exceptions >= observations {
        return None;
    }
    let n = observations as f64;
    let x = exceptions as f64;
    let p = 1.0 - coverage; // expected exception probability
    let rate = x / n;

    let log_null = (n - x) * (1.0 - p).ln() + x * p.ln();
    let log_alt = (n - x) * (1.0 - rate).ln() + x * rate.ln();
    let lr = -2.0 * (log_null - log_alt);
    if !lr.is_finite() || lr < 0.0 {
        return None;
    }

    // χ²(1df) survival: P(X > lr) = 2·(1 − Φ(√lr)).
    let p_value = 2.0 * (1.0 - norm_cdf(lr.sqrt()));
    Some(p_value.clamp(0.0, 1.0))
}

/// Evaluates the rolling window ending at the latest record.
///
/// Records are filtered to the portfolio, ordered by date, and the last
/// [`BACKTEST_WINDOW`] observations are classified. Exceptions never block
/// the current run; this is pure reporting.
pub fn evaluate(
    records: &[BacktestingRecord],
    portfolio_id: &PortfolioId,
    coverage: f64,
) -> BacktestResult {
    let mut window: Vec<&BacktestingRecord> = records
        .iter()
        .filter(|r| &r.portfolio_id == portfolio_id)
        .collect();
    window.sort_by_key(|r| r.date);
    let window: Vec<&BacktestingRecord> = window
        .into_iter()
        .rev()
        .take(BACKTEST_WINDOW)
        .collect();

    let observations = window.len();
    let exceptions = window.iter().filter(|r| r.is_exception).count();
    let exception_rate = if observations > 0 {
        exceptions as f64 / observations as f64
    } else {
        0.0
    };

    BacktestResult {
        observations,
        exceptions,
        exception_rate,
        traffic_light: traffic_light(exceptions),
        kupiec_p_value: kupiec_p_value(observations, exceptions, coverage),
    }
}
