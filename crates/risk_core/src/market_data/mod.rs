//! Immutable, validated market data access.
//!
//! The raw [`MarketDataSnapshot`] is a plain data bundle identified by a
//! SHA-256 content hash. The [`MarketDataView`] is built from a snapshot plus
//! the set of identifiers a portfolio actually references; construction
//! validates everything once so that lookups during pricing are O(1) and
//! infallible apart from genuinely missing entries.

pub mod curve;
pub mod error;
pub mod snapshot;
pub mod surface;
pub mod view;

pub use curve::ZeroCurve;
pub use error::MarketDataError;
pub use snapshot::{InstrumentQuote, MarketDataSnapshot, VolGrid};
pub use surface::VolSurface;
pub use view::{MarketDataView, ViewRequirements};
