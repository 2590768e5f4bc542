//! Capital adequacy under the K-factor framework.
//!
//! K-NPR takes the standardised path: interest rate risk from net tenor-bucket
//! positions, credit risk from rating-weighted market values, FX risk from the
//! larger of net long and net short open currency exposure. K-AUM, K-CMH and
//! K-COH apply flat rates to firm-level activity measures. The requirement is
//! the K-factor sum floored at the permanent minimum capital, and own funds
//! recognize Tier 2 only up to a quarter of Tier 1.

use risk_core::config::EngineConfig;
use risk_core::types::{Currency, Rating};

use crate::inputs::CapitalInputs;
use crate::tables;

/// One rate-sensitive exposure for K-IR bucketing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateExposure {
    /// Residual tenor in years.
    pub tenor_years: f64,
    /// Signed market value equivalent in base currency (payer swaps are
    /// short the bucket).
    pub signed_value: f64,
}

/// One rated credit exposure for K-CREDNR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditExposure {
    /// Issue rating (fallback applied upstream).
    pub rating: Rating,
    /// Market value in base currency.
    pub market_value: f64,
}

/// One open currency exposure for K-FX.
#[derive(Debug, Clone, PartialEq)]
pub struct FxExposure {
    /// Exposure currency (never the base currency).
    pub currency: Currency,
    /// Signed exposure in base currency.
    pub signed_value: f64,
}

/// Capital block result.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CapitalMetrics {
    /// Interest rate component of K-NPR.
    pub k_ir: f64,
    /// Credit component of K-NPR.
    pub k_crednr: f64,
    /// FX component of K-NPR.
    pub k_fx: f64,
    /// Net position risk: `k_ir + k_crednr + k_fx`.
    pub k_npr: f64,
    /// Assets-under-management factor.
    pub k_aum: f64,
    /// Client-money-held factor.
    pub k_cmh: f64,
    /// Client-orders-handled factor.
    pub k_coh: f64,
    /// Sum of all K-factors before the floor.
    pub sum_k: f64,
    /// Binding requirement: `max(permanent minimum, sum_k)`.
    pub total_k_req: f64,
    /// Own funds: `Tier1 + min(Tier2, 0.25·Tier1)`.
    pub own_funds: f64,
    /// Capital ratio as a dimensionless fraction (1.00 = 100%).
    pub capital_ratio: f64,
}

/// Computes the capital block.
pub fn compute(
    rate_exposures: &[RateExposure],
    credit_exposures: &[CreditExposure],
    fx_exposures: &[FxExposure],
    inputs: &CapitalInputs,
    config: &EngineConfig,
) -> CapitalMetrics {
    // ---- K-IR: net within buckets, weight, sum of absolutes ----
    let mut buckets = [0.0_f64; tables::IR_BUCKET_COUNT];
    for exposure in rate_exposures {
        buckets[tables::ir_bucket_index(exposure.tenor_years)] += exposure.signed_value;
    }
    let k_ir: f64 = buckets
        .iter()
        .enumerate()
        .map(|(index, net)| net.abs() * tables::ir_bucket_weight_by_index(index))
        .sum();

    // ---- K-CREDNR ----
    let k_crednr: f64 = credit_exposures
        .iter()
        .map(|e| e.market_value.abs() * tables::credit_risk_weight(e.rating))
        .sum();

    // ---- K-FX: larger leg of the net open position per direction ----
    let mut net_long = 0.0;
    let mut net_short = 0.0;
    for exposure in fx_exposures {
        if exposure.signed_value >= 0.0 {
            net_long += exposure.signed_value;
        } else {
            net_short += exposure.signed_value;
        }
    }
    let k_fx = tables::K_FX_RATE * net_long.max(net_short.abs());

    let k_npr = k_ir + k_crednr + k_fx;
    let k_aum = tables::K_AUM_RATE * inputs.aum_trailing_avg;
    let k_cmh = if inputs.client_money_guaranteed {
        tables::K_CMH_RATE_GUARANTEED
    } else {
        tables::K_CMH_RATE
    } * inputs.client_money_avg;
    let k_coh = config.k_coh_rate * inputs.client_orders_annualized;

    let sum_k = k_npr + k_aum + k_cmh + k_coh;
    let total_k_req = sum_k.max(config.permanent_min_capital_eur);

    let own_funds = inputs.tier1 + inputs.tier2.min(0.25 * inputs.tier1);
    let capital_ratio = if total_k_req > 0.0 {
        own_funds / total_k_req
    } else {
        // Possible only with a zero permanent minimum; report a neutral 0.
        0.0
    };

    CapitalMetrics {
        k_ir,
        k_crednr,
        k_fx,
        k_npr,
        k_aum,
        k_cmh,
        k_coh,
        sum_k,
        total_k_req,
        own_funds,
        capital_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn no_positions() -> (Vec<RateExposure>, Vec<CreditExposure>, Vec<FxExposure>) {
        (Vec::new(), Vec::new(), Vec::new())
    }

    #[test]
    fn test_reference_capital_computation() {
        // K-NPR 800k via a synthetic credit book, K-CMH 50k, K-COH 150k,
        // Tier1 900k, Tier2 500k → OwnFunds 1,125k, Required 1,000k,
        // ratio 1.125.
        let credit = [CreditExposure {
            rating: Rating::BB,
            market_value: 20_000_000.0,
        }];
        let inputs = CapitalInputs {
            aum_trailing_avg: 0.0,
            client_money_avg: 12_500_000.0, // × 0.004 = 50k
            client_money_guaranteed: false,
            client_orders_annualized: 150_000_000.0, // × 0.001 = 150k
            tier1: 900_000.0,
            tier2: 500_000.0,
        };
        let metrics = compute(&[], &credit, &[], &inputs, &EngineConfig::default());

        assert_relative_eq!(metrics.k_npr, 800_000.0);
        assert_relative_eq!(metrics.k_cmh, 50_000.0);
        assert_relative_eq!(metrics.k_coh, 150_000.0);
        assert_relative_eq!(metrics.total_k_req, 1_000_000.0);
        assert_relative_eq!(metrics.own_funds, 1_125_000.0);
        assert_relative_eq!(metrics.capital_ratio, 1.125);
    }

    #[test]
    fn test_tier1_drop_breaches() {
        let credit = [CreditExposure {
            rating: Rating::BB,
            market_value: 20_000_000.0,
        }];
        let inputs = CapitalInputs {
            client_money_avg: 12_500_000.0,
            client_orders_annualized: 150_000_000.0,
            tier1: 500_000.0,
            tier2: 500_000.0,
            ..Default::default()
        };
        let metrics = compute(&[], &credit, &[], &inputs, &EngineConfig::default());
        // OwnFunds = 500k + min(500k, 125k) = 625k; ratio = 0.625.
        assert_relative_eq!(metrics.own_funds, 625_000.0);
        assert_relative_eq!(metrics.capital_ratio, 0.625);
    }

    #[test]
    fn test_permanent_minimum_floor() {
        let (r, c, f) = no_positions();
        let inputs = CapitalInputs {
            tier1: 100_000.0,
            ..Default::default()
        };
        let metrics = compute(&r, &c, &f, &inputs, &EngineConfig::default());
        assert_relative_eq!(metrics.total_k_req, 75_000.0);
        assert_relative_eq!(metrics.capital_ratio, 100_000.0 / 75_000.0);
    }

    #[test]
    fn test_k_ir_nets_within_buckets() {
        // Equal and opposite exposures in the same bucket cancel.
        let rates = [
            RateExposure {
                tenor_years: 2.0,
                signed_value: 10_000_000.0,
            },
            RateExposure {
                tenor_years: 2.5,
                signed_value: -10_000_000.0,
            },
        ];
        let metrics = compute(
            &rates,
            &[],
            &[],
            &CapitalInputs::default(),
            &EngineConfig::default(),
        );
        assert_relative_eq!(metrics.k_ir, 0.0);

        // Different buckets do not net.
        let cross = [
            RateExposure {
                tenor_years: 0.5,
                signed_value: 10_000_000.0,
            },
            RateExposure {
                tenor_years: 7.0,
                signed_value: -10_000_000.0,
            },
        ];
        let metrics = compute(
            &cross,
            &[],
            &[],
            &CapitalInputs::default(),
            &EngineConfig::default(),
        );
        assert_relative_eq!(metrics.k_ir, 10_000_000.0 * (0.007 + 0.015));
    }

    #[test]
    fn test_k_fx_takes_larger_leg() {
        let fx = [
            FxExposure {
                currency: Currency::USD,
                signed_value: 3_000_000.0,
            },
            FxExposure {
                currency: Currency::GBP,
                signed_value: -5_000_000.0,
            },
        ];
        let metrics = compute(
            &[],
            &[],
            &fx,
            &CapitalInputs::default(),
            &EngineConfig::default(),
        );
        assert_relative_eq!(metrics.k_fx, 0.08 * 5_000_000.0);
    }

    #[test]
    fn test_guaranteed_client_money_rate() {
        let inputs = CapitalInputs {
            client_money_avg: 10_000_000.0,
            client_money_guaranteed: true,
            ..Default::default()
        };
        let metrics = compute(&[], &[], &[], &inputs, &EngineConfig::default());
        assert_relative_eq!(metrics.k_cmh, 30_000.0);
    }

    #[test]
    fn test_ratio_monotone_in_own_funds() {
        let base = CapitalInputs {
            tier1: 500_000.0,
            ..Default::default()
        };
        let more = CapitalInputs {
            tier1: 600_000.0,
            ..Default::default()
        };
        let a = compute(&[], &[], &[], &base, &EngineConfig::default());
        let b = compute(&[], &[], &[], &more, &EngineConfig::default());
        assert!(b.capital_ratio > a.capital_ratio);
    }

    #[test]
    fn test_ratio_decreasing_in_k() {
        let inputs = CapitalInputs {
            tier1: 1_000_000.0,
            aum_trailing_avg: 500_000_000.0, // K-AUM = 100k > floor
            ..Default::default()
        };
        let small = compute(&[], &[], &[], &inputs, &EngineConfig::default());
        let bigger = CapitalInputs {
            aum_trailing_avg: 1_000_000_000.0,
            ..inputs
        };
        let large = compute(&[], &[], &[], &bigger, &EngineConfig::default());
        assert!(large.capital_ratio < small.capital_ratio);
    }
}
