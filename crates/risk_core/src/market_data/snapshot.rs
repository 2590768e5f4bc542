//! Raw market data snapshot and its content hash.
//!
//! The snapshot is the immutable input bundle a nightly or on-demand run is
//! keyed on. Its identity is a SHA-256 hash over a canonical serialization:
//! sections and keys in lexicographic order (the `BTreeMap` layout gives this
//! for free), floats rendered in `%.15g` form. Two snapshots with equal
//! content therefore share an identity regardless of construction order.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::types::{Currency, CurrencyPair, Date, Isin, IssuerId};

/// A single instrument quote.
///
/// Optional fields model feed gaps explicitly; the data quality rules decide
/// which gaps are fatal for which consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentQuote {
    /// Clean price, as percent of face for bonds.
    pub clean_price: Option<f64>,
    /// Quoted yield to maturity (decimal).
    pub ytm: Option<f64>,
    /// Credit spread over the benchmark curve, basis points.
    pub spread_bps: Option<f64>,
    /// Bid price.
    pub bid: Option<f64>,
    /// Ask price.
    pub ask: Option<f64>,
    /// Traded volume, in units of face (serves as ADV in the depth model).
    pub volume: Option<f64>,
    /// Days since the instrument last traded.
    pub days_since_trade: Option<u32>,
    /// Previous session close, feeding the day-on-day jump check.
    pub previous_close: Option<f64>,
}

impl InstrumentQuote {
    /// Mid price when both sides are quoted, else the clean price.
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some(0.5 * (b + a)),
            _ => self.clean_price,
        }
    }

    /// Bid-ask spread in price units, when both sides are quoted.
    pub fn bid_ask_spread(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some(a - b),
            _ => None,
        }
    }
}

/// Raw volatility grid for one underlying, prior to surface validation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolGrid {
    /// Tenor axis in years, strictly increasing.
    pub tenors: Vec<f64>,
    /// Strike axis, strictly increasing.
    pub strikes: Vec<f64>,
    /// Vol matrix, `tenors × strikes` row-major.
    pub vols: Vec<Vec<f64>>,
}

/// Immutable market data snapshot for one `as_of_date`.
///
/// # Examples
///
/// ```
/// use risk_core::market_data::MarketDataSnapshot;
/// use risk_core::types::{Currency, Date};
///
/// let mut snapshot = MarketDataSnapshot::new(Date::from_ymd(2026, 3, 2).unwrap());
/// snapshot
///     .zero_curves
///     .insert(Currency::EUR, vec![(1.0, 0.03), (5.0, 0.035)]);
///
/// let id = snapshot.content_hash();
/// assert_eq!(id.len(), 64); // hex SHA-256
/// assert_eq!(id, snapshot.content_hash()); // stable
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketDataSnapshot {
    /// Observation date of every entry in this snapshot.
    pub as_of_date: Option<Date>,
    /// Instrument quotes keyed by ISIN.
    pub quotes: BTreeMap<Isin, InstrumentQuote>,
    /// Zero curve pillars `(tenor_years, zero_rate)` per currency.
    pub zero_curves: BTreeMap<Currency, Vec<(f64, f64)>>,
    /// Vol grids keyed by underlying (e.g. `EUR/USD`, `EUR-IRS`).
    pub vol_grids: BTreeMap<String, VolGrid>,
    /// Spot FX rates, quote units per base unit.
    pub fx_rates: BTreeMap<CurrencyPair, f64>,
    /// CDS spreads per issuer, decimal (0.01 = 100 bps).
    pub cds_spreads: BTreeMap<IssuerId, f64>,
    /// VIX close, driving the volatility regime when set to `Auto`.
    pub vix: Option<f64>,
}

impl MarketDataSnapshot {
    /// Creates an empty snapshot for a date.
    pub fn new(as_of_date: Date) -> Self {
        Self {
            as_of_date: Some(as_of_date),
            ..Self::default()
        }
    }

    /// Computes the snapshot identity: lowercase hex SHA-256 of the
    /// canonical serialization.
    pub fn content_hash(&self) -> String {
        let mut canonical = String::new();
        let w = &mut canonical;

        if let Some(d) = self.as_of_date {
            let _ = writeln!(w, "as_of={d}");
        }
        for (isin, q) in &self.quotes {
            let _ = writeln!(
                w,
                "quote:{}={},{},{},{},{},{},{},{}",
                isin,
                fmt_opt(q.clean_price),
                fmt_opt(q.ytm),
                fmt_opt(q.spread_bps),
                fmt_opt(q.bid),
                fmt_opt(q.ask),
                fmt_opt(q.volume),
                q.days_since_trade.map_or(String::new(), |d| d.to_string()),
                fmt_opt(q.previous_close),
            );
        }
        for (ccy, pillars) in &self.zero_curves {
            let _ = write!(w, "curve:{ccy}=");
            for (t, r) in pillars {
                let _ = write!(w, "({},{})", format_g15(*t), format_g15(*r));
            }
            let _ = writeln!(w);
        }
        for (key, grid) in &self.vol_grids {
            let _ = write!(w, "vol:{key}=");
            for t in &grid.tenors {
                let _ = write!(w, "{};", format_g15(*t));
            }
            for k in &grid.strikes {
                let _ = write!(w, "{};", format_g15(*k));
            }
            for v in grid.vols.iter().flatten() {
                let _ = write!(w, "{};", format_g15(*v));
            }
            let _ = writeln!(w);
        }
        for (pair, rate) in &self.fx_rates {
            let _ = writeln!(w, "fx:{pair}={}", format_g15(*rate));
        }
        for (issuer, spread) in &self.cds_spreads {
            let _ = writeln!(w, "cds:{issuer}={}", format_g15(*spread));
        }
        if let Some(vix) = self.vix {
            let _ = writeln!(w, "vix={}", format_g15(vix));
        }

        let digest = Sha256::digest(canonical.as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or(String::new(), format_g15)
}

/// Formats a float in C `%.15g` style: up to 15 significant digits, the
/// shorter of fixed and scientific notation, trailing zeros trimmed.
pub fn format_g15(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let exp = x.abs().log10().floor() as i32;
    if exp < -4 || exp >= 15 {
        // Scientific branch: 14 fractional mantissa digits, trimmed, with a
        // sign-and-two-digit exponent.
        let s = format!("{x:.14e}");
        let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        let mantissa = trim_trailing_zeros(mantissa);
        let exp_val: i32 = exponent.parse().unwrap_or(0);
        format!(
            "{mantissa}e{}{:02}",
            if exp_val < 0 { '-' } else { '+' },
            exp_val.abs()
        )
    } else {
        let decimals = (14 - exp).max(0) as usize;
        let s = format!("{x:.decimals$}");
        trim_trailing_zeros(&s).to_string()
    }
}

fn trim_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarketDataSnapshot {
        let mut snapshot = MarketDataSnapshot::new(Date::from_ymd(2026, 3, 2).unwrap());
        snapshot.quotes.insert(
            Isin::new("XS0000000001"),
            InstrumentQuote {
                clean_price: Some(99.5),
                ytm: Some(0.034),
                spread_bps: Some(85.0),
                bid: Some(99.4),
                ask: Some(99.6),
                volume: Some(5_000_000.0),
                days_since_trade: Some(1),
                previous_close: Some(99.2),
            },
        );
        snapshot
            .zero_curves
            .insert(Currency::EUR, vec![(1.0, 0.03), (5.0, 0.035)]);
        snapshot.fx_rates.insert(
            CurrencyPair::new(Currency::EUR, Currency::USD),
            1.0825,
        );
        snapshot.vix = Some(17.5);
        snapshot
    }

    // ========================================
    // %.15g formatting
    // ========================================

    #[test]
    fn test_format_g15_basic() {
        assert_eq!(format_g15(0.0), "0");
        assert_eq!(format_g15(1.0), "1");
        assert_eq!(format_g15(-2.5), "-2.5");
        assert_eq!(format_g15(0.05), "0.05");
        assert_eq!(format_g15(100.0), "100");
    }

    #[test]
    fn test_format_g15_scientific_branch() {
        assert_eq!(format_g15(1e-5), "1e-05");
        assert_eq!(format_g15(1e16), "1e+16");
        assert_eq!(format_g15(1.5e-7), "1.5e-07");
    }

    #[test]
    fn test_format_g15_significant_digits() {
        assert_eq!(format_g15(783526.166468436), "783526.166468436");
        assert_eq!(format_g15(0.333333333333333), "0.333333333333333");
    }

    // ========================================
    // Content hash
    // ========================================

    #[test]
    fn test_hash_is_hex_sha256() {
        let id = sample().content_hash();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(sample().content_hash(), sample().content_hash());
    }

    #[test]
    fn test_hash_insertion_order_independent() {
        let mut a = MarketDataSnapshot::new(Date::from_ymd(2026, 3, 2).unwrap());
        a.cds_spreads.insert(IssuerId::new("ISS-A"), 0.012);
        a.cds_spreads.insert(IssuerId::new("ISS-B"), 0.034);

        let mut b = MarketDataSnapshot::new(Date::from_ymd(2026, 3, 2).unwrap());
        b.cds_spreads.insert(IssuerId::new("ISS-B"), 0.034);
        b.cds_spreads.insert(IssuerId::new("ISS-A"), 0.012);

        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_hash_sensitive_to_content() {
        let base = sample();
        let mut changed = base.clone();
        changed.vix = Some(17.6);
        assert_ne!(base.content_hash(), changed.content_hash());
    }

    #[test]
    fn test_quote_mid_and_spread() {
        let q = InstrumentQuote {
            bid: Some(99.0),
            ask: Some(101.0),
            ..Default::default()
        };
        assert_eq!(q.mid(), Some(100.0));
        assert_eq!(q.bid_ask_spread(), Some(2.0));

        let one_sided = InstrumentQuote {
            clean_price: Some(98.0),
            ..Default::default()
        };
        assert_eq!(one_sided.mid(), Some(98.0));
        assert_eq!(one_sided.bid_ask_spread(), None);
    }
}
