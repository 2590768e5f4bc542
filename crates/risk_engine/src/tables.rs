//! Read-only parameter tables.
//!
//! These are configuration, not state: loaded once, shared by every
//! computation, and covered by the engine version tag. Any change here is a
//! methodology change and requires bumping [`risk_core::config::ENGINE_VERSION`].

use risk_core::types::{Rating, Seniority};

use crate::inputs::OutflowClass;

/// One-year probability of default by rating.
///
/// Monotonically increasing from AAA to D.
pub fn pd_for_rating(rating: Rating) -> f64 {
    match rating {
        Rating::AAA => 0.0002,
        Rating::AA => 0.0005,
        Rating::A => 0.0010,
        Rating::BBB => 0.0050,
        Rating::BB => 0.0200,
        Rating::B => 0.1000,
        Rating::CCC => 0.3500,
        Rating::CC => 0.8000,
        Rating::C => 0.9000,
        Rating::D => 1.0000,
    }
}

/// Loss given default by seniority.
pub fn lgd_for_seniority(seniority: Seniority) -> f64 {
    match seniority {
        Seniority::SeniorSecured => 0.25,
        Seniority::SeniorUnsecured => 0.40,
        Seniority::Subordinated => 0.60,
        Seniority::Junior => 0.75,
    }
}

/// Net position risk weight by rating bucket (K-CREDNR).
pub fn credit_risk_weight(rating: Rating) -> f64 {
    match rating {
        Rating::AAA | Rating::AA => 0.005,
        Rating::A => 0.010,
        Rating::BBB => 0.020,
        Rating::BB => 0.040,
        _ => 0.080,
    }
}

/// Interest rate risk weight by tenor bucket in years (K-IR).
pub fn ir_bucket_weight(tenor_years: f64) -> f64 {
    if tenor_years <= 1.0 {
        0.007
    } else if tenor_years <= 3.0 {
        0.010
    } else if tenor_years <= 5.0 {
        0.0125
    } else if tenor_years <= 10.0 {
        0.015
    } else {
        0.020
    }
}

/// Index of the K-IR tenor bucket a position falls into (for netting
/// within buckets before weighting).
pub fn ir_bucket_index(tenor_years: f64) -> usize {
    if tenor_years <= 1.0 {
        0
    } else if tenor_years <= 3.0 {
        1
    } else if tenor_years <= 5.0 {
        2
    } else if tenor_years <= 10.0 {
        3
    } else {
        4
    }
}

/// Weight applied to a K-IR bucket by index.
pub fn ir_bucket_weight_by_index(index: usize) -> f64 {
    [0.007, 0.010, 0.0125, 0.015, 0.020][index.min(4)]
}

/// Number of K-IR tenor buckets.
pub const IR_BUCKET_COUNT: usize = 5;

/// FX credit conversion factor for exposure add-ons.
pub fn fx_ccf(is_major_pair: bool) -> f64 {
    if is_major_pair {
        0.010
    } else {
        0.025
    }
}

/// IR credit conversion factor by residual tenor bucket.
pub fn ir_ccf(tenor_years: f64) -> f64 {
    if tenor_years <= 1.0 {
        0.0
    } else if tenor_years <= 5.0 {
        0.005
    } else if tenor_years <= 10.0 {
        0.010
    } else {
        0.015
    }
}

/// PFE cap for long options, as a fraction of notional.
pub const LONG_OPTION_PFE_CAP_FRACTION: f64 = 0.05;

/// Netting factor applied to the root-sum-square of per-trade add-ons under
/// an ISDA master agreement.
pub const NETTING_FACTOR: f64 = 0.6;

/// Trade count above which the counterparty portfolio factor applies.
pub const PORTFOLIO_FACTOR_TRADE_THRESHOLD: usize = 10;

/// CVA time buckets in years (capped at the longest trade maturity).
pub const CVA_BUCKETS: [f64; 6] = [0.25, 0.5, 1.0, 2.0, 3.0, 5.0];

/// LCR run-off rate by outflow class.
pub fn run_off_rate(class: OutflowClass) -> f64 {
    match class {
        OutflowClass::RetailStable => 0.05,
        OutflowClass::RetailLessStable => 0.10,
        OutflowClass::WholesaleOperational => 0.25,
        OutflowClass::WholesaleNonOperational => 0.40,
        OutflowClass::SecuredLevel1 => 0.0,
        OutflowClass::SecuredLevel2A => 0.15,
        OutflowClass::SecuredLevel2B => 0.25,
        OutflowClass::SecuredOther => 1.0,
        OutflowClass::DerivativeCollateral => 1.0,
        OutflowClass::CommittedCredit => 0.30,
        OutflowClass::CommittedLiquidity => 1.0,
        OutflowClass::DebtMaturities => 1.0,
    }
}

/// HQLA haircut factor by level.
pub mod hqla_factor {
    /// Level 1: no haircut.
    pub const LEVEL_1: f64 = 1.0;
    /// Level 2A: 15% haircut.
    pub const LEVEL_2A: f64 = 0.85;
    /// Level 2B standard: 50% haircut.
    pub const LEVEL_2B: f64 = 0.50;
    /// Level 2B eligible corporates/equities: 25% haircut.
    pub const LEVEL_2B_ELIGIBLE: f64 = 0.75;
}

/// K-AUM rate on trailing average AUM.
pub const K_AUM_RATE: f64 = 0.0002;
/// K-CMH rate on average client money held.
pub const K_CMH_RATE: f64 = 0.004;
/// K-CMH rate when client money is held under guarantee arrangements.
pub const K_CMH_RATE_GUARANTEED: f64 = 0.003;
/// K-FX rate on net open currency exposure.
pub const K_FX_RATE: f64 = 0.08;

/// Sentinel reported for ratios whose denominator is non-positive.
pub const RATIO_SENTINEL: f64 = 999.9;
