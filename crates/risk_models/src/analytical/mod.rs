//! Closed-form analytics: the standard normal distribution and the
//! Black-76 forward model underpinning every option pricer in the crate.

pub mod black76;
pub mod distributions;

pub use black76::{black76_greeks, black76_price, Black76Greeks};
pub use distributions::{norm_cdf, norm_pdf};
