//! Zero-coupon yield curve.

use crate::math::interpolators::LinearInterpolator;

use super::error::MarketDataError;

/// Zero-coupon yield curve over strictly increasing tenors.
///
/// Rates are continuously compounded annualised zero rates; interpolation is
/// linear in the zero rate with flat extrapolation beyond the pillar range,
/// and discount factors are `exp(-r(t) * t)`.
///
/// # Examples
///
/// ```
/// use risk_core::market_data::ZeroCurve;
///
/// let curve = ZeroCurve::new(vec![(1.0, 0.03), (2.0, 0.05)]).unwrap();
/// let r = curve.zero_rate(1.5).unwrap();
/// assert!((r - 0.04).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCurve {
    pillars: Vec<(f64, f64)>,
    interp: LinearInterpolator<f64>,
}

impl ZeroCurve {
    /// Constructs a curve from `(tenor_years, zero_rate)` pillars.
    ///
    /// Tenors must be positive and strictly increasing, with at least two
    /// pillars.
    pub fn new(pillars: Vec<(f64, f64)>) -> Result<Self, MarketDataError> {
        if pillars.len() < 2 {
            return Err(MarketDataError::InvalidCurve {
                key: String::new(),
                reason: format!("need at least 2 pillars, got {}", pillars.len()),
            });
        }
        if pillars[0].0 <= 0.0 {
            return Err(MarketDataError::InvalidCurve {
                key: String::new(),
                reason: format!("non-positive tenor {}", pillars[0].0),
            });
        }
        for window in pillars.windows(2) {
            if window[1].0 <= window[0].0 {
                return Err(MarketDataError::InvalidCurve {
                    key: String::new(),
                    reason: format!(
                        "tenors not strictly increasing: {} then {}",
                        window[0].0, window[1].0
                    ),
                });
            }
        }
        let xs: Vec<f64> = pillars.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pillars.iter().map(|p| p.1).collect();
        let interp = LinearInterpolator::new(xs, ys)?;
        Ok(Self { pillars, interp })
    }

    /// Returns the pillar points.
    #[inline]
    pub fn pillars(&self) -> &[(f64, f64)] {
        &self.pillars
    }

    /// Interpolated zero rate at tenor `t` (years).
    ///
    /// `t` must be non-negative; `t = 0` returns the first pillar rate
    /// (flat short end).
    pub fn zero_rate(&self, t: f64) -> Result<f64, MarketDataError> {
        if t < 0.0 || !t.is_finite() {
            return Err(MarketDataError::InvalidCurve {
                key: String::new(),
                reason: format!("invalid tenor {t}"),
            });
        }
        Ok(self.interp.interpolate(t))
    }

    /// Discount factor at tenor `t`: `exp(-r(t) * t)`.
    pub fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        if t == 0.0 {
            return Ok(1.0);
        }
        let r = self.zero_rate(t)?;
        Ok((-r * t).exp())
    }

    /// Continuously compounded forward rate between `t1` and `t2`.
    pub fn forward_rate(&self, t1: f64, t2: f64) -> Result<f64, MarketDataError> {
        if t2 <= t1 {
            return Err(MarketDataError::InvalidCurve {
                key: String::new(),
                reason: format!("forward period inverted: [{t1}, {t2}]"),
            });
        }
        let r1 = self.zero_rate(t1)?;
        let r2 = self.zero_rate(t2)?;
        Ok((r2 * t2 - r1 * t1) / (t2 - t1))
    }

    /// Returns the curve shifted in parallel by `bps` basis points.
    pub fn shifted(&self, bps: f64) -> Self {
        let shift = bps / 10_000.0;
        let pillars: Vec<(f64, f64)> = self.pillars.iter().map(|&(t, r)| (t, r + shift)).collect();
        // Shifting rates preserves tenor ordering, so reconstruction cannot fail.
        Self::new(pillars).unwrap_or_else(|_| self.clone())
    }

    /// Returns the curve with a two-point slope shift: `short_bps` applied at
    /// tenors up to `short_tenor`, `long_bps` at tenors from `long_tenor`,
    /// linearly blended in between.
    ///
    /// A steepening scenario uses `short_bps < long_bps`; a flattening one
    /// reverses them.
    pub fn shifted_slope(&self, short_bps: f64, long_bps: f64, short_tenor: f64, long_tenor: f64) -> Self {
        let pillars: Vec<(f64, f64)> = self
            .pillars
            .iter()
            .map(|&(t, r)| {
                let w = ((t - short_tenor) / (long_tenor - short_tenor)).clamp(0.0, 1.0);
                let shift_bps = short_bps + w * (long_bps - short_bps);
                (t, r + shift_bps / 10_000.0)
            })
            .collect();
        Self::new(pillars).unwrap_or_else(|_| self.clone())
    }

    /// Detects inversion: returns the largest negative rate step between
    /// consecutive pillars, if any exceeds `tolerance_bps`.
    pub fn max_inversion_bps(&self, tolerance_bps: f64) -> Option<f64> {
        let mut worst: Option<f64> = None;
        for window in self.pillars.windows(2) {
            let step_bps = (window[1].1 - window[0].1) * 10_000.0;
            if step_bps < -tolerance_bps {
                let inv = -step_bps;
                worst = Some(worst.map_or(inv, |w: f64| w.max(inv)));
            }
        }
        worst
    }
}
