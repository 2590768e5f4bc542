//! Implied volatility surface.

use crate::math::interpolators::BilinearInterpolator;

use super::error::MarketDataError;

/// Implied volatility surface on a rectangular (tenor, strike) grid.
///
/// Interpolation is bilinear on `(√tenor, log-moneyness)`. For a query at a
/// single forward level, log-moneyness `ln(K/F)` differs from `ln(K)` by the
/// constant `ln(F)`, which drops out of the linear weights, so the surface
/// interpolates on `(√tenor, ln(strike))` and the result is identical for
/// any positive forward.
///
/// # Examples
///
/// ```
/// use risk_core::market_data::VolSurface;
///
/// let surface = VolSurface::new(
///     "EUR/USD".to_string(),
///     vec![0.5, 1.0],
///     vec![0.9, 1.0, 1.1],
///     vec![
///         vec![0.11, 0.10, 0.11],
///         vec![0.12, 0.11, 0.12],
///     ],
/// ).unwrap();
/// let vol = surface.vol(0.75, 1.0).unwrap();
/// assert!(vol > 0.10 && vol < 0.11);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VolSurface {
    underlying: String,
    tenors: Vec<f64>,
    strikes: Vec<f64>,
    interp: BilinearInterpolator<f64>,
}

impl VolSurface {
    /// Constructs a surface from grid axes and a `tenors × strikes` vol matrix.
    ///
    /// Tenors and strikes must be positive and strictly increasing; all vols
    /// must be strictly positive.
    pub fn new(
        underlying: String,
        tenors: Vec<f64>,
        strikes: Vec<f64>,
        vols: Vec<Vec<f64>>,
    ) -> Result<Self, MarketDataError> {
        if tenors.first().copied().unwrap_or(0.0) <= 0.0 {
            return Err(MarketDataError::InvalidSurface {
                key: underlying,
                reason: "tenors must be positive".to_string(),
            });
        }
        if strikes.first().copied().unwrap_or(0.0) <= 0.0 {
            return Err(MarketDataError::InvalidSurface {
                key: underlying,
                reason: "strikes must be positive".to_string(),
            });
        }
        if vols.iter().flatten().any(|&v| v <= 0.0 || !v.is_finite()) {
            return Err(MarketDataError::InvalidSurface {
                key: underlying,
                reason: "vols must be positive and finite".to_string(),
            });
        }

        let sqrt_tenors: Vec<f64> = tenors.iter().map(|t| t.sqrt()).collect();
        let log_strikes: Vec<f64> = strikes.iter().map(|k| k.ln()).collect();
        let interp = BilinearInterpolator::new(sqrt_tenors, log_strikes, vols).map_err(|e| {
            MarketDataError::InvalidSurface {
                key: underlying.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            underlying,
            tenors,
            strikes,
            interp,
        })
    }

    /// Returns the underlying identifier this surface belongs to.
    #[inline]
    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    /// Returns the tenor axis.
    #[inline]
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Returns the strike axis.
    #[inline]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Interpolated vol at `(tenor, strike)`, clamped to the grid boundary.
    pub fn vol(&self, tenor: f64, strike: f64) -> Result<f64, MarketDataError> {
        if tenor <= 0.0 || strike <= 0.0 || !tenor.is_finite() || !strike.is_finite() {
            return Err(MarketDataError::InvalidSurface {
                key: self.underlying.clone(),
                reason: format!("invalid query (tenor {tenor}, strike {strike})"),
            });
        }
        Ok(self.interp.interpolate(tenor.sqrt(), strike.ln()))
    }

    /// Returns the surface with every vol multiplied by `multiplier`.
    ///
    /// Used by stress scenarios; the multiplier must be positive.
    pub fn scaled(&self, multiplier: f64) -> Result<Self, MarketDataError> {
        if multiplier <= 0.0 {
            return Err(MarketDataError::InvalidSurface {
                key: self.underlying.clone(),
                reason: format!("non-positive vol multiplier {multiplier}"),
            });
        }
        // Rebuild from the original axes with scaled values.
        let vols: Vec<Vec<f64>> = self
            .tenors
            .iter()
            .map(|&t| {
                self.strikes
                    .iter()
                    .map(|&k| {
                        // vol() cannot fail on grid points
                        self.vol(t, k).unwrap_or(0.0) * multiplier
                    })
                    .collect()
            })
            .collect();
        Self::new(
            self.underlying.clone(),
            self.tenors.clone(),
            self.strikes.clone(),
            vols,
        )
    }
}
