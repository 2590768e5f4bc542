//! Engine configuration.
//!
//! A flat, immutable record of every recognized option. Deserialization
//! rejects unknown fields so a typo or a stale option cannot silently change
//! calculation semantics between engine versions; `validate()` enforces the
//! numeric ranges once at construction.

use thiserror::Error;

use crate::types::Date;

/// Compile-time identity tag of the calculation semantics.
///
/// Any change to parameter tables or algorithms requires bumping this so
/// recomputation produces a distinct snapshot identity.
pub const ENGINE_VERSION: &str = "1.4.0";

/// Volatility regime for counterparty exposure add-ons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VolRegime {
    /// Derive the regime from the snapshot's VIX level.
    #[default]
    Auto,
    /// Calm markets.
    Normal,
    /// Elevated volatility (VIX above 20).
    Elevated,
    /// Crisis volatility (VIX above 30).
    Crisis,
}

/// Configuration validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A numeric option is outside its permitted range.
    #[error("invalid config: {field} = {value} ({reason})")]
    OutOfRange {
        /// Option name
        field: &'static str,
        /// Supplied value, rendered
        value: String,
        /// Range description
        reason: &'static str,
    },
}

/// Flat engine configuration record.
///
/// # Examples
///
/// ```
/// use risk_core::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.var_window_days, 250);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields, default))]
pub struct EngineConfig {
    /// Identity tag of the calculation semantics.
    pub engine_version: String,
    /// Rolling VaR window in trading days.
    pub var_window_days: usize,
    /// VaR confidence level, in (0, 1).
    pub var_confidence: f64,
    /// Start of the stressed VaR window (inclusive).
    pub var_stress_window_start: Date,
    /// End of the stressed VaR window (inclusive).
    pub var_stress_window_end: Date,
    /// Volatility regime override for exposure add-ons.
    pub vol_regime_override: VolRegime,
    /// Level 2A share cap within HQLA.
    pub lcr_l2a_cap: f64,
    /// Level 2B share cap within HQLA.
    pub lcr_l2b_cap: f64,
    /// Inflow recognition cap as a fraction of outflows.
    pub lcr_inflow_cap: f64,
    /// Permanent minimum capital floor, EUR.
    pub permanent_min_capital_eur: f64,
    /// Yield solver convergence tolerance.
    pub ytm_tolerance: f64,
    /// Yield solver iteration budget.
    pub ytm_max_iter: usize,
    /// K-COH rate applied to annualized client order volume.
    pub k_coh_rate: f64,
    /// Worker threads for position and portfolio fan-out (≥ 1).
    pub parallelism: usize,
    /// Per-call deadline in milliseconds; 0 disables the deadline.
    pub deadline_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_version: ENGINE_VERSION.to_string(),
            var_window_days: 250,
            var_confidence: 0.95,
            // Default stress window: the 2008-2009 credit crisis.
            var_stress_window_start: Date::from_ymd(2008, 9, 1).expect("valid constant date"),
            var_stress_window_end: Date::from_ymd(2009, 3, 31).expect("valid constant date"),
            vol_regime_override: VolRegime::Auto,
            lcr_l2a_cap: 0.40,
            lcr_l2b_cap: 0.15,
            lcr_inflow_cap: 0.75,
            permanent_min_capital_eur: 75_000.0,
            ytm_tolerance: 1e-10,
            ytm_max_iter: 50,
            k_coh_rate: 0.001,
            parallelism: 1,
            deadline_ms: 0,
        }
    }
}

impl EngineConfig {
    /// Validates every numeric option against its permitted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.var_window_days == 0 {
            return Err(ConfigError::OutOfRange {
                field: "var_window_days",
                value: self.var_window_days.to_string(),
                reason: "must be positive",
            });
        }
        if !(self.var_confidence > 0.0 && self.var_confidence < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "var_confidence",
                value: self.var_confidence.to_string(),
                reason: "must be in (0, 1)",
            });
        }
        if self.var_stress_window_end < self.var_stress_window_start {
            return Err(ConfigError::OutOfRange {
                field: "var_stress_window_end",
                value: self.var_stress_window_end.to_string(),
                reason: "must not precede the window start",
            });
        }
        for (field, value) in [
            ("lcr_l2a_cap", self.lcr_l2a_cap),
            ("lcr_l2b_cap", self.lcr_l2b_cap),
            ("lcr_inflow_cap", self.lcr_inflow_cap),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value.to_string(),
                    reason: "must be in (0, 1]",
                });
            }
        }
        if self.permanent_min_capital_eur < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "permanent_min_capital_eur",
                value: self.permanent_min_capital_eur.to_string(),
                reason: "must be non-negative",
            });
        }
        if !(self.ytm_tolerance > 0.0 && self.ytm_tolerance < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "ytm_tolerance",
                value: self.ytm_tolerance.to_string(),
                reason: "must be in (0, 1)",
            });
        }
        if self.ytm_max_iter == 0 {
            return Err(ConfigError::OutOfRange {
                field: "ytm_max_iter",
                value: self.ytm_max_iter.to_string(),
                reason: "must be positive",
            });
        }
        if !(0.0..1.0).contains(&self.k_coh_rate) {
            return Err(ConfigError::OutOfRange {
                field: "k_coh_rate",
                value: self.k_coh_rate.to_string(),
                reason: "must be in [0, 1)",
            });
        }
        if self.parallelism == 0 {
            return Err(ConfigError::OutOfRange {
                field: "parallelism",
                value: self.parallelism.to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_confidence() {
        let config = EngineConfig {
            var_confidence: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::OutOfRange {
                field: "var_confidence",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_stress_window() {
        let config = EngineConfig {
            var_stress_window_start: Date::from_ymd(2009, 1, 1).unwrap(),
            var_stress_window_end: Date::from_ymd(2008, 1, 1).unwrap(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_parallelism() {
        let config = EngineConfig {
            parallelism: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"engine_version": "1.4.0", "no_such_option": 1}"#;
        let result: Result<EngineConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{"var_window_days": 125}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.var_window_days, 125);
        assert_eq!(config.var_confidence, 0.95);
    }
}
