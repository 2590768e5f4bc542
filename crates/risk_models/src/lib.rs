//! # risk_models: Instruments and Pricers
//!
//! The middle layer of the workspace. Defines the instrument set the desk
//! trades (fixed-coupon bonds, FX forwards and vanilla FX options, interest
//! rate swaps, caps/floors and European swaptions) and the deterministic
//! pricers that value them off a validated [`risk_core::market_data::MarketDataView`].
//!
//! Every pricer is a pure function of the instrument and the view: identical
//! inputs produce bit-identical outputs, which the snapshot determinism
//! guarantee depends on. Interpolation semantics are exactly those of the
//! view's curves and surfaces; the pricers never interpolate on their own.
//!
//! ## Modules
//!
//! - [`instruments`]: instrument and position definitions
//! - [`analytical`]: normal distribution and the Black-76 forward model
//! - [`pricing`]: bond analytics (price/YTM/duration/DV01/convexity) and
//!   derivative MtM/Greeks

pub mod analytical;
pub mod instruments;
pub mod pricing;
