//! Limit evaluation and alert generation.
//!
//! Each configured limit maps a snapshot metric to a usage fraction and a
//! severity band. Floor-type metrics (LCR, capital ratio) invert the usage so
//! that falling below the limit raises it. Regulatory floors for the capital
//! ratio and the LCR apply independently of any configured limit.

use chrono::{DateTime, Utc};
use risk_core::types::PortfolioId;
use thiserror::Error;

/// Metric codes a limit can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MetricCode {
    /// Total portfolio DV01.
    Dv01Total,
    /// 1-day 95% VaR.
    Var1d95,
    /// Stressed VaR.
    StressedVar,
    /// Expected credit loss.
    ExpectedLoss,
    /// Total CVA.
    CvaTotal,
    /// Collateral-adjusted PFE.
    PfeTotal,
    /// Counterparty EAD.
    EadTotal,
    /// One-day liquidation cost.
    LiquidationCost1d,
    /// Liquidity coverage ratio (floor metric).
    Lcr,
    /// Capital ratio (floor metric).
    CapitalRatio,
}

impl MetricCode {
    /// Whether breaching means falling below the limit rather than above.
    pub fn is_floor(&self) -> bool {
        matches!(self, MetricCode::Lcr | MetricCode::CapitalRatio)
    }

    /// Display name used in alert descriptions.
    pub fn name(&self) -> &'static str {
        match self {
            MetricCode::Dv01Total => "DV01",
            MetricCode::Var1d95 => "VaR 1d 95%",
            MetricCode::StressedVar => "Stressed VaR",
            MetricCode::ExpectedLoss => "Expected loss",
            MetricCode::CvaTotal => "CVA",
            MetricCode::PfeTotal => "PFE",
            MetricCode::EadTotal => "Counterparty EAD",
            MetricCode::LiquidationCost1d => "Liquidation cost (1d)",
            MetricCode::Lcr => "LCR",
            MetricCode::CapitalRatio => "Capital ratio",
        }
    }
}

/// Limit configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitError {
    /// Thresholds must satisfy `0 < warning < critical ≤ 1`.
    #[error("invalid thresholds: warning {warning}, critical {critical}")]
    InvalidThresholds {
        /// Warning threshold supplied
        warning: f64,
        /// Critical threshold supplied
        critical: f64,
    },

    /// Limit value must be strictly positive.
    #[error("limit value must be positive, got {0}")]
    NonPositiveLimit(f64),
}

/// One configured limit.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Limit {
    /// Portfolio this limit applies to.
    pub portfolio_id: PortfolioId,
    /// Metric being limited.
    pub metric: MetricCode,
    /// The limit value, in the metric's own units.
    pub limit_value: f64,
    /// Usage fraction above which the limit turns yellow, in (0, 1].
    pub warning_threshold: f64,
    /// Usage fraction above which the limit turns red, in (warning, 1].
    pub critical_threshold: f64,
}

impl Limit {
    /// Creates a validated limit.
    pub fn new(
        portfolio_id: PortfolioId,
        metric: MetricCode,
        limit_value: f64,
        warning_threshold: f64,
        critical_threshold: f64,
    ) -> Result<Self, LimitError> {
        if limit_value <= 0.0 {
            return Err(LimitError::NonPositiveLimit(limit_value));
        }
        if !(warning_threshold > 0.0
            && warning_threshold < critical_threshold
            && critical_threshold <= 1.0)
        {
            return Err(LimitError::InvalidThresholds {
                warning: warning_threshold,
                critical: critical_threshold,
            });
        }
        Ok(Self {
            portfolio_id,
            metric,
            limit_value,
            warning_threshold,
            critical_threshold,
        })
    }
}

/// Alert severity, ordered from benign to breach.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum AlertSeverity {
    /// Inside the limit.
    Green,
    /// Above the warning threshold.
    Yellow,
    /// Above the critical threshold.
    Red,
    /// At or beyond the limit (breach).
    Critical,
}

/// One emitted alert.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Alert {
    /// Portfolio the alert belongs to.
    pub portfolio_id: PortfolioId,
    /// Metric that triggered.
    pub metric: MetricCode,
    /// Metric value at evaluation.
    pub current_value: f64,
    /// Limit or floor value compared against.
    pub limit_value: f64,
    /// Usage fraction driving the severity.
    pub usage: f64,
    /// Severity.
    pub severity: AlertSeverity,
    /// Human-readable description (structured fields remain authoritative).
    pub description: String,
    /// Evaluation timestamp.
    pub created_at: DateTime<Utc>,
    /// Acknowledgement flag; only ever mutated by the host.
    pub acknowledged: bool,
}

/// Alert counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AlertsSummary {
    /// Limits evaluated green (no alert emitted).
    #[serde(rename = "GREEN")]
    pub green: usize,
    /// Yellow alerts.
    #[serde(rename = "YELLOW")]
    pub yellow: usize,
    /// Red alerts.
    #[serde(rename = "RED")]
    pub red: usize,
    /// Critical alerts.
    #[serde(rename = "CRITICAL")]
    pub critical: usize,
}

impl AlertsSummary {
    fn count(&mut self, severity: AlertSeverity) {
        match severity {
            AlertSeverity::Green => self.green += 1,
            AlertSeverity::Yellow => self.yellow += 1,
            AlertSeverity::Red => self.red += 1,
            AlertSeverity::Critical => self.critical += 1,
        }
    }
}

/// Metric values available for limit evaluation; absent metrics (nulled
/// sub-blocks) are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricValues {
    /// Total DV01.
    pub dv01_total: Option<f64>,
    /// 1-day VaR.
    pub var_1d_95: Option<f64>,
    /// Stressed VaR.
    pub stressed_var: Option<f64>,
    /// Expected loss.
    pub expected_loss: Option<f64>,
    /// CVA total.
    pub cva_total: Option<f64>,
    /// PFE total.
    pub pfe_total: Option<f64>,
    /// EAD total.
    pub ead_total: Option<f64>,
    /// Liquidation cost, one day.
    pub liquidation_cost_1d: Option<f64>,
    /// LCR (`None` also when the sentinel applies).
    pub lcr: Option<f64>,
    /// Capital ratio.
    pub capital_ratio: Option<f64>,
}

impl MetricValues {
    fn get(&self, metric: MetricCode) -> Option<f64> {
        match metric {
            MetricCode::Dv01Total => self.dv01_total,
            MetricCode::Var1d95 => self.var_1d_95,
            MetricCode::StressedVar => self.stressed_var,
            MetricCode::ExpectedLoss => self.expected_loss,
            MetricCode::CvaTotal => self.cva_total,
            MetricCode::PfeTotal => self.pfe_total,
            MetricCode::EadTotal => self.ead_total,
            MetricCode::LiquidationCost1d => self.liquidation_cost_1d,
            MetricCode::Lcr => self.lcr,
            MetricCode::CapitalRatio => self.capital_ratio,
        }
    }
}

/// Usage fraction of a limit: `current / limit` for ceilings,
/// `limit / current` for floors.
fn usage_fraction(metric: MetricCode, current: f64, limit: f64) -> f64 {
    if metric.is_floor() {
        if current <= 0.0 {
            f64::INFINITY
        } else {
            limit / current
        }
    } else {
        current.abs() / limit
    }
}

fn severity_for_usage(usage: f64, warning: f64, critical: f64) -> AlertSeverity {
    if usage >= 1.0 {
        AlertSeverity::Critical
    } else if usage >= critical {
        AlertSeverity::Red
    } else if usage >= warning {
        AlertSeverity::Yellow
    } else {
        AlertSeverity::Green
    }
}

/// Evaluates configured limits plus the regulatory floors.
///
/// Returns the emitted alerts (Yellow and worse) and the full severity
/// summary including greens.
pub fn evaluate(
    limits: &[Limit],
    values: &MetricValues,
    portfolio_id: &PortfolioId,
    created_at: DateTime<Utc>,
) -> (Vec<Alert>, AlertsSummary) {
    let mut alerts = Vec::new();
    let mut summary = AlertsSummary::default();

    for limit in limits {
        if &limit.portfolio_id != portfolio_id {
            continue;
        }
        let Some(current) = values.get(limit.metric) else {
            continue;
        };
        let usage = usage_fraction(limit.metric, current, limit.limit_value);
        let severity =
            severity_for_usage(usage, limit.warning_threshold, limit.critical_threshold);
        summary.count(severity);

        if severity > AlertSeverity::Green {
            alerts.push(Alert {
                portfolio_id: portfolio_id.clone(),
                metric: limit.metric,
                current_value: current,
                limit_value: limit.limit_value,
                usage,
                severity,
                description: format!(
                    "{} at {:.2} against limit {:.2} ({:.0}% used)",
                    limit.metric.name(),
                    current,
                    limit.limit_value,
                    usage * 100.0
                ),
                created_at,
                acknowledged: false,
            });
        }
    }

    // ---- Regulatory floors, independent of configured limits ----
    if let Some(ratio) = values.capital_ratio {
        if ratio < 1.0 {
            summary.count(AlertSeverity::Critical);
            alerts.push(Alert {
                portfolio_id: portfolio_id.clone(),
                metric: MetricCode::CapitalRatio,
                current_value: ratio,
                limit_value: 1.0,
                usage: usage_fraction(MetricCode::CapitalRatio, ratio, 1.0),
                severity: AlertSeverity::Critical,
                description: format!(
                    "Capital ratio {ratio:.3} below the regulatory minimum of 1.00"
                ),
                created_at,
                acknowledged: false,
            });
        }
    }

    if let Some(lcr) = values.lcr {
        let floor_severity = if lcr < 1.0 {
            Some((AlertSeverity::Critical, 1.0))
        } else if lcr < 1.05 {
            Some((AlertSeverity::Red, 1.05))
        } else if lcr < 1.10 {
            Some((AlertSeverity::Yellow, 1.10))
        } else {
            None
        };
        if let Some((severity, floor)) = floor_severity {
            summary.count(severity);
            alerts.push(Alert {
                portfolio_id: portfolio_id.clone(),
                metric: MetricCode::Lcr,
                current_value: lcr,
                limit_value: floor,
                usage: usage_fraction(MetricCode::Lcr, lcr, floor),
                severity,
                description: format!("LCR {lcr:.3} below the {floor:.2} supervisory band"),
                created_at,
                acknowledged: false,
            });
        }
    }

    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    (alerts, summary)
}
