//! Historical Value-at-Risk and stressed VaR.
//!
//! Empirical quantile of a realized P&L series: sort ascending, index
//! `k = ⌊(1 − confidence) · N⌋`, report `−P&L[k]` floored at zero. Stressed
//! VaR runs the identical estimator on the observations falling inside the
//! configured crisis window.

use risk_core::config::EngineConfig;
use risk_core::types::Date;

use crate::error::EngineError;
use crate::inputs::PnlObservation;

/// Minimum number of observations for any VaR estimate.
pub const MIN_OBSERVATIONS: usize = 60;

/// VaR block result.
#[derive(Debug, Clone, PartialEq)]
pub struct VarResult {
    /// 1-day VaR at the configured confidence, non-negative.
    pub var_1d_95: f64,
    /// Stressed VaR over the configured window; `None` when the window holds
    /// too few observations (cause recorded alongside).
    pub stressed_var: Option<f64>,
    /// Cause code when the stressed window was unusable.
    pub stressed_var_error: Option<String>,
    /// Observations used for the headline estimate.
    pub observations: usize,
}

/// Empirical VaR of a raw P&L sample at the given confidence.
///
/// # Errors
///
/// `InsufficientHistory` below [`MIN_OBSERVATIONS`] observations.
pub fn historical_var(pnl: &[f64], confidence: f64) -> Result<f64, EngineError> {
    if pnl.len() < MIN_OBSERVATIONS {
        return Err(EngineError::InsufficientHistory {
            got: pnl.len(),
            need: MIN_OBSERVATIONS,
        });
    }
    if pnl.iter().any(|x| !x.is_finite()) {
        return Err(EngineError::NumericInstability(
            "non-finite P&L observation".to_string(),
        ));
    }

    let mut sorted = pnl.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite values compare"));

    let k = ((1.0 - confidence) * sorted.len() as f64).floor() as usize;
    let k = k.min(sorted.len() - 1);
    Ok((-sorted[k]).max(0.0))
}

/// Computes the VaR block from a dated history.
///
/// The headline estimate uses the last `var_window_days` observations
/// strictly before `as_of`; the stressed estimate uses every observation
/// inside the configured stress window.
pub fn compute_var(
    history: &[PnlObservation],
    config: &EngineConfig,
    as_of: Date,
) -> Result<VarResult, EngineError> {
    let mut dated: Vec<&PnlObservation> =
        history.iter().filter(|obs| obs.date < as_of).collect();
    dated.sort_by_key(|obs| obs.date);

    let window: Vec<f64> = dated
        .iter()
        .rev()
        .take(config.var_window_days)
        .rev()
        .map(|obs| obs.pnl)
        .collect();

    let var_1d_95 = historical_var(&window, config.var_confidence)?;

    let stress_sample: Vec<f64> = history
        .iter()
        .filter(|obs| {
            obs.date >= config.var_stress_window_start && obs.date <= config.var_stress_window_end
        })
        .map(|obs| obs.pnl)
        .collect();

    let (stressed_var, stressed_var_error) =
        match historical_var(&stress_sample, config.var_confidence) {
            Ok(v) => (Some(v), None),
            Err(EngineError::InsufficientHistory { got, need }) => (
                None,
                Some(
                    EngineError::StressWindowTooShort { got, need }.to_string(),
                ),
            ),
            Err(other) => return Err(other),
        };

    Ok(VarResult {
        var_1d_95,
        stressed_var,
        stressed_var_error,
        observations: window.len(),
    })
}
