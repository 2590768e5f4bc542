//! Issuer credit risk: PD / LGD / EAD and expected loss.

use std::collections::BTreeMap;

use risk_core::types::IssuerId;

use crate::inputs::Issuer;
use crate::tables;

/// Fallback annual PD when an issuer has no usable rating.
const FALLBACK_PD: f64 = 0.01;
/// Fallback LGD when an issuer is unknown.
const FALLBACK_LGD: f64 = 0.45;

/// Exposure and loss statistics for one issuer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IssuerExposure {
    /// Issuer reference.
    pub issuer_id: IssuerId,
    /// Exposure at default: sum of bond market values.
    pub ead: f64,
    /// Annual probability of default applied.
    pub pd: f64,
    /// Loss given default applied.
    pub lgd: f64,
    /// Expected loss `PD · LGD · EAD`.
    pub expected_loss: f64,
}

/// Portfolio credit block.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreditMetrics {
    /// Total issuer exposure.
    pub total_exposure: f64,
    /// Total expected loss.
    pub expected_loss: f64,
    /// Exposure-weighted average PD.
    pub weighted_pd: f64,
    /// Exposure-weighted average LGD.
    pub weighted_lgd: f64,
    /// Per-issuer breakdown, sorted by issuer id.
    pub issuers: Vec<IssuerExposure>,
}

impl CreditMetrics {
    /// The all-zero block for an empty portfolio.
    pub fn empty() -> Self {
        Self {
            total_exposure: 0.0,
            expected_loss: 0.0,
            weighted_pd: 0.0,
            weighted_lgd: 0.0,
            issuers: Vec::new(),
        }
    }
}

/// Computes the credit block from per-position issuer exposures.
///
/// `exposures` pairs each bond position's issuer with its market value in
/// the portfolio base currency; values for the same issuer are summed into
/// one EAD. Issuers without a rating fall back to conservative defaults
/// (the data quality layer flags them separately).
pub fn compute(exposures: &[(IssuerId, f64)], issuers: &[Issuer]) -> CreditMetrics {
    if exposures.is_empty() {
        return CreditMetrics::empty();
    }

    let reference: BTreeMap<&IssuerId, &Issuer> = issuers.iter().map(|i| (&i.id, i)).collect();

    let mut eads: BTreeMap<&IssuerId, f64> = BTreeMap::new();
    for (issuer_id, mv) in exposures {
        *eads.entry(issuer_id).or_insert(0.0) += mv;
    }

    let mut rows = Vec::with_capacity(eads.len());
    let mut total_exposure = 0.0;
    let mut expected_loss = 0.0;
    let mut pd_weighted = 0.0;
    let mut lgd_weighted = 0.0;

    for (issuer_id, ead) in eads {
        let (pd, lgd) = match reference.get(issuer_id) {
            Some(issuer) => (
                issuer
                    .rating
                    .map_or(FALLBACK_PD, tables::pd_for_rating),
                tables::lgd_for_seniority(issuer.seniority),
            ),
            None => (FALLBACK_PD, FALLBACK_LGD),
        };
        let el = pd * lgd * ead;

        total_exposure += ead;
        expected_loss += el;
        pd_weighted += pd * ead;
        lgd_weighted += lgd * ead;

        rows.push(IssuerExposure {
            issuer_id: issuer_id.clone(),
            ead,
            pd,
            lgd,
            expected_loss: el,
        });
    }

    let (weighted_pd, weighted_lgd) = if total_exposure > 0.0 {
        (pd_weighted / total_exposure, lgd_weighted / total_exposure)
    } else {
        (0.0, 0.0)
    };

    CreditMetrics {
        total_exposure,
        expected_loss,
        weighted_pd,
        weighted_lgd,
        issuers: rows,
    }
}
