//! Validated market data view.
//!
//! A [`MarketDataView`] is built once per `(snapshot, portfolio)` run from
//! the raw [`MarketDataSnapshot`] plus the set of identifiers the portfolio's
//! positions actually reference. Construction front-loads every validation
//! the pricers rely on; after it succeeds, lookups are O(1) hash probes and
//! only fail for entries that genuinely were not requested up front.

use std::collections::HashMap;

use crate::types::{Currency, CurrencyPair, Date, Isin, IssuerId};

use super::curve::ZeroCurve;
use super::error::MarketDataError;
use super::snapshot::{InstrumentQuote, MarketDataSnapshot};
use super::surface::VolSurface;

/// The identifiers a portfolio requires from a snapshot.
///
/// The engine derives this from the position list before building the view,
/// so that a missing entry is caught at construction with a precise
/// `MissingMarketData` cause rather than mid-pricing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRequirements {
    /// ISINs of all bond positions.
    pub isins: Vec<Isin>,
    /// Currencies needing a zero curve (base currency plus every leg currency).
    pub currencies: Vec<Currency>,
    /// FX pairs needing a rate.
    pub pairs: Vec<CurrencyPair>,
    /// Underlyings needing a vol surface.
    pub underlyings: Vec<String>,
}

/// Immutable, validated access to one snapshot's market data.
///
/// Two views built from equal raw data compare equal.
///
/// # Examples
///
/// ```
/// use risk_core::market_data::{MarketDataSnapshot, MarketDataView, ViewRequirements};
/// use risk_core::types::{Currency, Date};
///
/// let mut snapshot = MarketDataSnapshot::new(Date::from_ymd(2026, 3, 2).unwrap());
/// snapshot
///     .zero_curves
///     .insert(Currency::EUR, vec![(1.0, 0.03), (5.0, 0.035)]);
///
/// let requirements = ViewRequirements {
///     currencies: vec![Currency::EUR],
///     ..Default::default()
/// };
/// let view = MarketDataView::build(&snapshot, &requirements).unwrap();
/// assert!(view.curve(Currency::EUR).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataView {
    as_of_date: Date,
    snapshot_id: String,
    quotes: HashMap<Isin, InstrumentQuote>,
    curves: HashMap<Currency, ZeroCurve>,
    surfaces: HashMap<String, VolSurface>,
    fx_rates: HashMap<CurrencyPair, f64>,
    cds_spreads: HashMap<IssuerId, f64>,
    vix: Option<f64>,
}

impl MarketDataView {
    /// Builds and validates a view from a raw snapshot.
    ///
    /// Validation performed here:
    /// - every required ISIN resolves to a quote;
    /// - every quote with both sides satisfies bid ≤ ask;
    /// - every FX rate is strictly positive, and every required pair
    ///   resolves directly, by inversion, or by triangulation through USD;
    /// - every required curve exists with strictly increasing tenors;
    /// - every required vol surface exists and passes grid validation.
    ///
    /// # Errors
    ///
    /// `MissingMarketData` for absent entries; `CrossedQuote`,
    /// `NonPositiveFxRate`, `InvalidCurve`, `InvalidSurface` for content
    /// failures.
    pub fn build(
        snapshot: &MarketDataSnapshot,
        requirements: &ViewRequirements,
    ) -> Result<Self, MarketDataError> {
        let as_of_date = snapshot
            .as_of_date
            .ok_or_else(|| MarketDataError::MissingMarketData("as_of_date".to_string()))?;

        // FX rates first: they are shared state and validate unconditionally.
        let mut fx_rates = HashMap::new();
        for (&pair, &rate) in &snapshot.fx_rates {
            if rate <= 0.0 || !rate.is_finite() {
                return Err(MarketDataError::NonPositiveFxRate {
                    pair: pair.to_string(),
                    rate,
                });
            }
            fx_rates.insert(pair, rate);
        }

        let mut quotes = HashMap::new();
        for isin in &requirements.isins {
            let quote = snapshot
                .quotes
                .get(isin)
                .copied()
                .ok_or_else(|| MarketDataError::MissingMarketData(isin.to_string()))?;
            if let (Some(bid), Some(ask)) = (quote.bid, quote.ask) {
                if bid > ask {
                    return Err(MarketDataError::CrossedQuote {
                        isin: isin.to_string(),
                        bid,
                        ask,
                    });
                }
            }
            quotes.insert(isin.clone(), quote);
        }

        let mut curves = HashMap::new();
        for &ccy in &requirements.currencies {
            let pillars = snapshot
                .zero_curves
                .get(&ccy)
                .ok_or_else(|| MarketDataError::MissingMarketData(format!("curve {ccy}")))?;
            let curve = ZeroCurve::new(pillars.clone()).map_err(|e| match e {
                MarketDataError::InvalidCurve { reason, .. } => MarketDataError::InvalidCurve {
                    key: ccy.to_string(),
                    reason,
                },
                other => other,
            })?;
            curves.insert(ccy, curve);
        }

        let mut surfaces = HashMap::new();
        for underlying in &requirements.underlyings {
            let grid = snapshot
                .vol_grids
                .get(underlying)
                .ok_or_else(|| MarketDataError::MissingMarketData(format!("vol {underlying}")))?;
            let surface = VolSurface::new(
                underlying.clone(),
                grid.tenors.clone(),
                grid.strikes.clone(),
                grid.vols.clone(),
            )?;
            surfaces.insert(underlying.clone(), surface);
        }

        let view = Self {
            as_of_date,
            snapshot_id: snapshot.content_hash(),
            quotes,
            curves,
            surfaces,
            fx_rates,
            cds_spreads: snapshot
                .cds_spreads
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            vix: snapshot.vix,
        };

        // Required pairs must be resolvable now, not at pricing time.
        for pair in &requirements.pairs {
            view.fx_rate(*pair)?;
        }

        Ok(view)
    }

    /// Observation date of the underlying snapshot.
    #[inline]
    pub fn as_of_date(&self) -> Date {
        self.as_of_date
    }

    /// Content hash identifying the underlying snapshot.
    #[inline]
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    /// Quote for an ISIN.
    pub fn quote(&self, isin: &Isin) -> Result<&InstrumentQuote, MarketDataError> {
        self.quotes
            .get(isin)
            .ok_or_else(|| MarketDataError::MissingMarketData(isin.to_string()))
    }

    /// Zero curve for a currency.
    pub fn curve(&self, currency: Currency) -> Result<&ZeroCurve, MarketDataError> {
        self.curves
            .get(&currency)
            .ok_or_else(|| MarketDataError::MissingMarketData(format!("curve {currency}")))
    }

    /// Vol surface for an underlying.
    pub fn vol_surface(&self, underlying: &str) -> Result<&VolSurface, MarketDataError> {
        self.surfaces
            .get(underlying)
            .ok_or_else(|| MarketDataError::MissingMarketData(format!("vol {underlying}")))
    }

    /// Spot FX rate for a pair: direct, inverted, or triangulated via USD.
    pub fn fx_rate(&self, pair: CurrencyPair) -> Result<f64, MarketDataError> {
        if pair.base == pair.quote {
            return Ok(1.0);
        }
        if let Some(&rate) = self.fx_rates.get(&pair) {
            return Ok(rate);
        }
        if let Some(&rate) = self.fx_rates.get(&pair.inverse()) {
            return Ok(1.0 / rate);
        }
        // Triangulate through USD.
        let leg1 = CurrencyPair::new(pair.base, Currency::USD);
        let leg2 = CurrencyPair::new(Currency::USD, pair.quote);
        let r1 = self
            .fx_rates
            .get(&leg1)
            .copied()
            .or_else(|| self.fx_rates.get(&leg1.inverse()).map(|r| 1.0 / r));
        let r2 = self
            .fx_rates
            .get(&leg2)
            .copied()
            .or_else(|| self.fx_rates.get(&leg2.inverse()).map(|r| 1.0 / r));
        match (r1, r2) {
            (Some(a), Some(b)) => Ok(a * b),
            _ => Err(MarketDataError::MissingMarketData(format!("fx {pair}"))),
        }
    }

    /// CDS spread for an issuer (decimal), if quoted.
    pub fn cds_spread(&self, issuer: &IssuerId) -> Option<f64> {
        self.cds_spreads.get(issuer).copied()
    }

    /// VIX close, if present in the snapshot.
    #[inline]
    pub fn vix(&self) -> Option<f64> {
        self.vix
    }

    /// Iterates over all loaded quotes.
    pub fn quotes(&self) -> impl Iterator<Item = (&Isin, &InstrumentQuote)> {
        self.quotes.iter()
    }

    /// Iterates over all loaded curves.
    pub fn curves(&self) -> impl Iterator<Item = (&Currency, &ZeroCurve)> {
        self.curves.iter()
    }
}
