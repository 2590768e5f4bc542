//! # risk_engine: The Deterministic Daily Risk Pipeline
//!
//! Top layer of the workspace. Given an immutable input bundle (portfolio,
//! positions, reference tables, a market data snapshot, limits, P&L history,
//! funding and capital inputs) it produces a [`snapshot::RiskSnapshot`] plus
//! alerts, data quality issues and stress results.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                risk_engine                   │
//! ├──────────────────────────────────────────────┤
//! │  dq/           - data quality rule table     │
//! │  var/          - historical + stressed VaR   │
//! │  credit/       - PD/LGD/EAD, expected loss   │
//! │  ccr/          - PFE, netting, CSA, CVA      │
//! │  liquidity/    - HQLA, LCR, liquidation cost │
//! │  capital/      - K-factors, capital ratio    │
//! │  stress/       - scenario shocks             │
//! │  limits/       - alert severity bands        │
//! │  backtesting/  - exceptions, traffic light   │
//! │  engine/       - the snapshot assembler      │
//! └──────────────────────────────────────────────┘
//!          ↓
//! ┌──────────────────────────────────────────────┐
//! │  risk_models: instruments and pricers        │
//! │  risk_core:   market data, math, config      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Purity and determinism
//!
//! The engine holds no state beyond validated configuration and read-only
//! parameter tables. `compute_snapshot` is referentially transparent: the
//! same inputs and engine version reproduce every scalar to within 1e-9.
//! All I/O (fetching, persistence, scheduling, rendering) belongs to the
//! host. Position pricing fans out across a bounded rayon pool; portfolios
//! in the nightly batch are independent tasks on the same pool.
//!
//! ## Example
//!
//! ```no_run
//! use risk_core::config::EngineConfig;
//! use risk_engine::engine::RiskEngine;
//! # fn inputs() -> risk_engine::inputs::SnapshotInputs { unimplemented!() }
//!
//! let engine = RiskEngine::new(EngineConfig::default()).unwrap();
//! let computed = engine.compute_snapshot(&inputs());
//! println!("{}", serde_json::to_string_pretty(&computed.snapshot).unwrap());
//! ```

pub mod backtesting;
pub mod capital;
pub mod ccr;
pub mod credit;
pub mod dq;
pub mod engine;
pub mod error;
pub mod inputs;
pub mod limits;
pub mod liquidity;
pub mod snapshot;
pub mod stress;
pub mod tables;
pub mod var;

pub use engine::{CancelToken, ComputedSnapshot, RiskEngine, RunControl};
pub use error::EngineError;
pub use snapshot::{RiskSnapshot, SnapshotStatus};
