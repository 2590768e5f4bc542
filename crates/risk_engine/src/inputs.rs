//! Engine input bundle.
//!
//! Everything a snapshot computation needs arrives here as finished,
//! immutable data: the collaborator performs all fetching up front and the
//! engine never touches the network, filesystem or clock. Counterparties and
//! issuers are read-only tables the positions reference by id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use risk_core::market_data::MarketDataSnapshot;
use risk_core::types::{CounterpartyId, Currency, Date, IssuerId, PortfolioId, Rating, Seniority};
use risk_models::instruments::Position;

use crate::limits::Limit;

/// Portfolio business type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PortfolioKind {
    /// Bond dealing book.
    BondDealer,
    /// Client derivatives book.
    DerivativesClient,
    /// Proprietary trading book.
    Proprietary,
}

/// Portfolio master record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Portfolio {
    /// Stable identifier.
    pub id: PortfolioId,
    /// Business type.
    pub kind: PortfolioKind,
    /// Reporting currency of every aggregate.
    pub base_currency: Currency,
    /// Inactive portfolios are skipped by the nightly batch.
    pub active: bool,
}

/// Credit support annex terms for a counterparty.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CsaTerms {
    /// Collateral currently held against the counterparty.
    pub collateral_held: f64,
    /// Exposure threshold below which no collateral is called.
    pub threshold: f64,
    /// Minimum transfer amount.
    pub minimum_transfer_amount: f64,
}

/// Counterparty master record (read-only reference table row).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Counterparty {
    /// Stable identifier referenced by derivative positions.
    pub id: CounterpartyId,
    /// Country of incorporation, ISO 3166 alpha-2.
    pub country: String,
    /// External agency rating.
    pub external_rating: Rating,
    /// Internal rating override, when the desk maintains one.
    pub internal_rating: Option<Rating>,
    /// Whether an ISDA master agreement with close-out netting is in place.
    pub isda_netting: bool,
    /// CSA terms, when collateralised.
    pub csa: Option<CsaTerms>,
}

impl Counterparty {
    /// The rating credit calculations use: internal override, else external.
    pub fn effective_rating(&self) -> Rating {
        self.internal_rating.unwrap_or(self.external_rating)
    }
}

/// Issuer sector, driving HQLA classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Sector {
    /// Central government debt.
    Sovereign,
    /// Supranational and agency debt.
    Agency,
    /// Bank and insurance debt.
    Financial,
    /// Non-financial corporate debt.
    Corporate,
}

/// Issuer reference data (read-only reference table row).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Issuer {
    /// Stable identifier referenced by bond positions.
    pub id: IssuerId,
    /// Country of risk, ISO 3166 alpha-2.
    pub country: String,
    /// Sector.
    pub sector: Sector,
    /// Agency rating; `None` is flagged by data quality for rated sectors.
    pub rating: Option<Rating>,
    /// Seniority of the issuer's debt held.
    pub seniority: Seniority,
}

/// One dated realized P&L observation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PnlObservation {
    /// Observation date.
    pub date: Date,
    /// Realized daily P&L in the portfolio base currency.
    pub pnl: f64,
}

/// Liquidity run-off class for 30-day outflow projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum OutflowClass {
    /// Stable retail deposits.
    RetailStable,
    /// Less stable retail deposits.
    RetailLessStable,
    /// Operational wholesale unsecured funding.
    WholesaleOperational,
    /// Non-operational wholesale unsecured funding.
    WholesaleNonOperational,
    /// Secured funding backed by Level 1 collateral.
    SecuredLevel1,
    /// Secured funding backed by Level 2A collateral.
    SecuredLevel2A,
    /// Secured funding backed by Level 2B collateral.
    SecuredLevel2B,
    /// Secured funding backed by non-HQLA collateral.
    SecuredOther,
    /// Projected derivative collateral outflows.
    DerivativeCollateral,
    /// Committed credit facilities extended to clients.
    CommittedCredit,
    /// Committed liquidity facilities extended to clients.
    CommittedLiquidity,
    /// Own debt maturing within 30 days.
    DebtMaturities,
}

/// Maturity bucket for funding gap analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum MaturityBucket {
    /// Zero to seven days.
    UpTo7d,
    /// Seven to thirty days.
    From7dTo30d,
    /// Thirty to ninety days.
    From30dTo90d,
    /// Beyond ninety days.
    Over90d,
}

/// Balance-sheet side of the liquidity inputs.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FundingProfile {
    /// Funding balances subject to run-off, by class.
    pub outflow_balances: BTreeMap<OutflowClass, f64>,
    /// Contractual inflows expected within 30 days.
    pub expected_inflows_30d: f64,
    /// Cash and central bank reserves (Level 1 HQLA on top of bonds).
    pub cash_and_reserves: f64,
    /// Assets by residual maturity bucket.
    pub assets_by_bucket: BTreeMap<MaturityBucket, f64>,
    /// Liabilities by residual maturity bucket.
    pub liabilities_by_bucket: BTreeMap<MaturityBucket, f64>,
}

/// Firm-level inputs to the K-factor capital block.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CapitalInputs {
    /// Trailing quarterly average assets under management.
    pub aum_trailing_avg: f64,
    /// Average segregated client money held.
    pub client_money_avg: f64,
    /// Whether client money is held under guarantee arrangements.
    pub client_money_guaranteed: bool,
    /// Annualized client order volume handled.
    pub client_orders_annualized: f64,
    /// Tier 1 own funds.
    pub tier1: f64,
    /// Tier 2 own funds.
    pub tier2: f64,
}

/// The complete immutable input bundle for one snapshot computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInputs {
    /// Portfolio master record.
    pub portfolio: Portfolio,
    /// Positions of this portfolio.
    pub positions: Vec<Position>,
    /// Counterparty reference table.
    pub counterparties: Vec<Counterparty>,
    /// Issuer reference table.
    pub issuers: Vec<Issuer>,
    /// Raw market data snapshot; the engine builds and validates the view.
    pub market: MarketDataSnapshot,
    /// Configured limits for this portfolio.
    pub limits: Vec<Limit>,
    /// Realized daily P&L history ending the day before `as_of`.
    pub pnl_history: Vec<PnlObservation>,
    /// Balance-sheet liquidity inputs.
    pub funding: FundingProfile,
    /// Firm-level capital inputs.
    pub capital: CapitalInputs,
    /// Caller-supplied calculation timestamp (keeps the engine clock-free).
    pub calculation_time: DateTime<Utc>,
}
