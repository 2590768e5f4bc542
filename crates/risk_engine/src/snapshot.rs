//! Risk snapshot output types and their stored JSON form.
//!
//! The serialized document is a stored format: top-level keys, block keys and
//! rounding are stable for a given engine version. Currency amounts round to
//! two decimals at serialization only; ratios and durations serialize at full
//! precision. Sub-blocks that could not be computed serialize as `null` with
//! the cause recorded in `error_message`.

use chrono::{DateTime, Utc};
use risk_core::types::{Date, PortfolioId};

use crate::limits::AlertsSummary;

/// Terminal snapshot status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SnapshotStatus {
    /// Every sub-block computed.
    Success,
    /// At least one position or sub-block degraded.
    Partial,
    /// The market view could not be built, or the run was cancelled before
    /// any sub-block completed.
    Failed,
}

/// Serialization helpers for currency amounts (2 decimal places, applied at
/// the boundary only; in-memory values keep full precision).
mod round2 {
    use serde::{Serialize, Serializer};

    fn round(v: f64) -> f64 {
        (v * 100.0).round() / 100.0
    }

    pub(super) fn amount<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        round(*v).serialize(serializer)
    }

    pub(super) fn amount_opt<S: Serializer>(
        v: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        v.map(round).serialize(serializer)
    }
}

/// Market risk block.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarketBlock {
    /// 1-day 95% VaR; `null` when history was insufficient.
    #[serde(serialize_with = "round2::amount_opt")]
    pub var_1d_95: Option<f64>,
    /// Stressed VaR; `null` when the stress window was unusable.
    #[serde(serialize_with = "round2::amount_opt")]
    pub stressed_var: Option<f64>,
    /// Sum of position DV01s.
    #[serde(serialize_with = "round2::amount")]
    pub dv01_total: f64,
    /// Market-value-weighted modified duration of the bond book.
    pub duration: f64,
    /// Market-value-weighted convexity of the bond book.
    pub convexity: f64,
}

/// Credit risk block.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreditBlock {
    /// Total issuer exposure.
    #[serde(serialize_with = "round2::amount")]
    pub total_exposure: f64,
    /// Expected loss.
    #[serde(serialize_with = "round2::amount")]
    pub expected_loss: f64,
    /// CVA across counterparties.
    #[serde(serialize_with = "round2::amount")]
    pub cva_total: f64,
}

/// Counterparty exposure block.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CcrBlock {
    /// Collateral-adjusted PFE.
    #[serde(serialize_with = "round2::amount")]
    pub pfe_current: f64,
    /// Largest single-trade add-on.
    #[serde(serialize_with = "round2::amount")]
    pub pfe_peak: f64,
    /// Total counterparty EAD.
    #[serde(serialize_with = "round2::amount")]
    pub ead_total: f64,
}

/// Liquidity block.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiquidityBlock {
    /// LCR as a ratio (sentinel when outflows are non-positive).
    pub lcr_ratio: f64,
    /// Short-term funding gap.
    #[serde(serialize_with = "round2::amount")]
    pub funding_gap_short_term: f64,
    /// One-day liquidation cost.
    #[serde(serialize_with = "round2::amount")]
    pub liquidation_cost_1d: f64,
    /// Five-day liquidation cost.
    #[serde(serialize_with = "round2::amount")]
    pub liquidation_cost_5d: f64,
    /// Weighted liquidity score in [0, 1].
    pub liquidity_score: f64,
}

/// Capital block.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CapitalBlock {
    /// Net position risk.
    #[serde(serialize_with = "round2::amount")]
    pub k_npr: f64,
    /// Assets-under-management factor.
    #[serde(serialize_with = "round2::amount")]
    pub k_aum: f64,
    /// Client-money factor.
    #[serde(serialize_with = "round2::amount")]
    pub k_cmh: f64,
    /// Client-orders factor.
    #[serde(serialize_with = "round2::amount")]
    pub k_coh: f64,
    /// Binding capital requirement.
    #[serde(serialize_with = "round2::amount")]
    pub total_k_req: f64,
    /// Own funds.
    #[serde(serialize_with = "round2::amount")]
    pub own_funds: f64,
    /// Capital ratio as a dimensionless fraction.
    pub capital_ratio: f64,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// The immutable output root, identified by
/// `(portfolio_id, as_of_date, engine_version)`.
///
/// Recomputation with identical inputs and engine version reproduces every
/// sub-block to within 1e-9 on all scalar outputs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskSnapshot {
    /// Portfolio identity.
    pub portfolio_id: PortfolioId,
    /// Calculation date.
    pub as_of_date: Date,
    /// Engine semantics version.
    pub engine_version: String,
    /// Content hash of the market data snapshot consumed.
    pub market_data_snapshot_id: String,
    /// Terminal status.
    pub status: SnapshotStatus,
    /// Market risk block, `null` when pricing failed outright.
    pub market: Option<MarketBlock>,
    /// Credit block.
    pub credit: Option<CreditBlock>,
    /// Counterparty exposure block.
    pub ccr: Option<CcrBlock>,
    /// Liquidity block.
    pub liquidity: Option<LiquidityBlock>,
    /// Capital block.
    pub capital: Option<CapitalBlock>,
    /// Alert counts by severity.
    pub alerts_summary: AlertsSummary,
    /// Accumulated cause codes for nulled blocks and degraded positions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_message: Option<String>,
    /// Calculation timestamp (caller-supplied; not part of the stored
    /// document or the snapshot identity).
    #[serde(skip_serializing, default = "unix_epoch")]
    pub calculated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RiskSnapshot {
        RiskSnapshot {
            portfolio_id: PortfolioId::new("PF-1"),
            as_of_date: Date::from_ymd(2026, 3, 2).unwrap(),
            engine_version: "1.4.0".to_string(),
            market_data_snapshot_id: "ab".repeat(32),
            status: SnapshotStatus::Success,
            market: Some(MarketBlock {
                var_1d_95: Some(88.123456),
                stressed_var: None,
                dv01_total: 373.109876,
                duration: 4.761904761904,
                convexity: 27.2108843537,
            }),
            credit: Some(CreditBlock {
                total_exposure: 1_000_000.005,
                expected_loss: 2_000.004,
                cva_total: 150.555,
            }),
            ccr: None,
            liquidity: None,
            capital: None,
            alerts_summary: AlertsSummary::default(),
            error_message: Some("stress window too short: 0 observations, need 60".to_string()),
            calculated_at: unix_epoch(),
        }
    }

    #[test]
    fn test_stored_document_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        let top: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(
            top,
            vec![
                "portfolio_id",
                "as_of_date",
                "engine_version",
                "market_data_snapshot_id",
                "status",
                "market",
                "credit",
                "ccr",
                "liquidity",
                "capital",
                "alerts_summary",
                "error_message",
            ]
        );
        assert_eq!(json["status"], "Success");
        assert!(json["ccr"].is_null());
        assert!(json["market"]["stressed_var"].is_null());
    }

    #[test]
    fn test_currency_amounts_round_to_cents() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["market"]["var_1d_95"], 88.12);
        assert_eq!(json["market"]["dv01_total"], 373.11);
        assert_eq!(json["credit"]["total_exposure"], 1_000_000.01);
        assert_eq!(json["credit"]["expected_loss"], 2_000.0);
    }

    #[test]
    fn test_ratios_keep_full_precision() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["market"]["duration"], 4.761904761904);
    }

    #[test]
    fn test_in_memory_values_unrounded() {
        // Rounding applies at the serialization boundary only.
        let snapshot = sample();
        assert_eq!(snapshot.market.as_ref().unwrap().dv01_total, 373.109876);
    }

    #[test]
    fn test_alerts_summary_keys_uppercase() {
        let json = serde_json::to_value(sample()).unwrap();
        let keys: Vec<&str> = json["alerts_summary"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["GREEN", "YELLOW", "RED", "CRITICAL"]);
    }

    #[test]
    fn test_error_message_omitted_when_clean() {
        let mut snapshot = sample();
        snapshot.error_message = None;
        let json = serde_json::to_value(snapshot).unwrap();
        assert!(json.get("error_message").is_none());
    }

    #[test]
    fn test_roundtrip_through_stored_form() {
        let snapshot = sample();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: RiskSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, SnapshotStatus::Success);
        assert_eq!(parsed.portfolio_id, snapshot.portfolio_id);
        // Amounts come back rounded; the document is the source of truth.
        assert_eq!(parsed.market.unwrap().dv01_total, 373.11);
    }
}
