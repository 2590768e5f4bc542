//! # risk_core: Foundation Layer for the Risk Engine
//!
//! `risk_core` is the bottom layer of the three-crate workspace, providing:
//! - Time types: `Date`, `DayCountConvention`, `CouponFrequency` (`types::time`)
//! - Currency types: `Currency`, `CurrencyPair` (`types::currency`)
//! - Identifier newtypes: `PortfolioId`, `Isin`, `CounterpartyId`, ... (`types::ids`)
//! - Rating and seniority scales (`types::credit`)
//! - Interpolators and root solvers (`math`)
//! - Validated, immutable market data access (`market_data`)
//! - The flat engine configuration record (`config`)
//!
//! ## Purity
//!
//! Nothing in this crate touches the network, filesystem or clock (apart from
//! the explicit `Date::today` convenience, which the engine never calls).
//! A `MarketDataView` is a referentially transparent function of the raw
//! snapshot it was built from: two views built from equal snapshots compare
//! equal, and the snapshot itself is identified by a SHA-256 content hash.
//!
//! ## Example
//!
//! ```
//! use risk_core::types::time::{Date, DayCountConvention};
//! use risk_core::market_data::ZeroCurve;
//!
//! let start = Date::from_ymd(2026, 1, 2).unwrap();
//! let end = Date::from_ymd(2026, 7, 2).unwrap();
//! let yf = DayCountConvention::Act365.year_fraction(start, end);
//! assert!((yf - 0.4959).abs() < 1e-3);
//!
//! let curve = ZeroCurve::new(vec![(0.25, 0.031), (1.0, 0.033), (5.0, 0.035)]).unwrap();
//! let df = curve.discount_factor(2.0).unwrap();
//! assert!(df > 0.0 && df < 1.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod market_data;
pub mod math;
pub mod types;
