//! Credit rating and seniority scales.

use std::fmt;
use std::str::FromStr;

/// Credit rating on the standard agency scale, AAA (best) to D (default).
///
/// Ordered so that `Rating::AAA < Rating::D`; a *higher* variant means
/// *worse* credit. Parsing tolerates notch suffixes (`AA-`, `BBB+` map to
/// their letter grade), which is how external feeds deliver ratings.
///
/// # Examples
///
/// ```
/// use risk_core::types::Rating;
///
/// let r: Rating = "BBB+".parse().unwrap();
/// assert_eq!(r, Rating::BBB);
/// assert!(r.is_investment_grade());
/// assert!(Rating::AAA < Rating::BB);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rating {
    /// Highest quality (prime)
    AAA,
    /// High quality
    AA,
    /// Upper medium grade
    A,
    /// Lower medium grade (investment grade threshold)
    BBB,
    /// Non-investment grade speculative
    BB,
    /// Highly speculative
    B,
    /// Substantial risks
    CCC,
    /// Extremely speculative
    CC,
    /// Near default
    C,
    /// In default
    D,
}

impl Rating {
    /// Whether this rating is investment grade (BBB or better).
    #[inline]
    pub fn is_investment_grade(&self) -> bool {
        matches!(self, Rating::AAA | Rating::AA | Rating::A | Rating::BBB)
    }

    /// Whether this rating is high yield (BB or worse, excluding default).
    #[inline]
    pub fn is_high_yield(&self) -> bool {
        !self.is_investment_grade() && *self != Rating::D
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rating::AAA => "AAA",
            Rating::AA => "AA",
            Rating::A => "A",
            Rating::BBB => "BBB",
            Rating::BB => "BB",
            Rating::B => "B",
            Rating::CCC => "CCC",
            Rating::CC => "CC",
            Rating::C => "C",
            Rating::D => "D",
        };
        f.write_str(s)
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['+', '-']).to_ascii_uppercase();
        match trimmed.as_str() {
            "AAA" => Ok(Rating::AAA),
            "AA" => Ok(Rating::AA),
            "A" => Ok(Rating::A),
            "BBB" => Ok(Rating::BBB),
            "BB" => Ok(Rating::BB),
            "B" => Ok(Rating::B),
            "CCC" => Ok(Rating::CCC),
            "CC" => Ok(Rating::CC),
            "C" => Ok(Rating::C),
            "D" => Ok(Rating::D),
            other => Err(format!("unknown rating: {other}")),
        }
    }
}

/// Debt seniority, driving loss-given-default assumptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Seniority {
    /// Senior secured debt.
    SeniorSecured,
    /// Senior unsecured debt.
    SeniorUnsecured,
    /// Subordinated debt.
    Subordinated,
    /// Junior / deeply subordinated debt.
    Junior,
}
