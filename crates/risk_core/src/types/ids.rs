//! Identifier newtypes for engine entities.
//!
//! Strongly-typed identifiers prevent accidental cross-wiring of portfolio,
//! position, counterparty and issuer references. All references between
//! entities are id-based weak lookups into read-only tables; nothing owns
//! anything across entity boundaries.

use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Unique identifier for a portfolio.
    PortfolioId
}

string_id! {
    /// Unique identifier for a position within a portfolio.
    PositionId
}

string_id! {
    /// Unique identifier for a counterparty.
    CounterpartyId
}

string_id! {
    /// Unique identifier for a bond issuer.
    IssuerId
}

string_id! {
    /// International Securities Identification Number.
    Isin
}
