//! Detection significance for on/off Poisson counts and its inversion
//!
//! Significance follows Li & Ma (1983), ApJ 272, 317, equation 17:
//!
//! ```text
//! S = √2 · √( n_on · ln[ (1 + α)/α · n_on / (n_on + n_off) ]
//!           + n_off · ln[ (1 + α) · n_off / (n_on + n_off) ] )
//! ```
//!
//! signed by the excess `n_on − α·n_off`, with `0 · ln 0 = 0`.
//!
//! The relative sensitivity is the factor φ the signal excess must be scaled
//! by so that `S(φ · (n_on − α·n_off) + α·n_off, n_off, α)` equals the target
//! significance. S grows monotonically with the excess, so φ is found by
//! expanding a bracket and bisecting it.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const DEFAULT_TARGET_SIGNIFICANCE: f64 = 5.0;
pub const DEFAULT_ALPHA: f64 = 1.0;

const MAX_BISECTIONS: usize = 200;
const MAX_BRACKET_DOUBLINGS: usize = 2048;
const RELATIVE_TOLERANCE: f64 = 1e-12;

/// `x · ln(y)` with the convention `0 · ln 0 = 0`
fn x_ln(x: f64, y: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x * y.ln() }
}

/// Li & Ma eq. 17 significance, negative for a deficit
#[must_use]
pub fn li_ma_significance(n_on: f64, n_off: f64, alpha: f64) -> f64 {
    let total = n_on + n_off;
    if total <= 0.0 {
        return 0.0;
    }
    let term_on = x_ln(n_on, (1.0 + alpha) / alpha * n_on / total);
    let term_off = x_ln(n_off, (1.0 + alpha) * n_off / total);
    // Rounding can make the sum slightly negative when there is no excess
    let s = (2.0 * (term_on + term_off)).max(0.0).sqrt();

    let excess = n_on - alpha * n_off;
    if excess < 0.0 { -s } else { s }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceSolver {
    /// Significance a detection must reach, in σ
    pub target_significance: f64,
    /// Ratio of on to off exposure
    pub alpha: f64,
}

impl Default for SignificanceSolver {
    fn default() -> Self {
        Self {
            target_significance: DEFAULT_TARGET_SIGNIFICANCE,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SignificanceSolver {
    pub fn new(target_significance: f64, alpha: f64) -> Result<Self, DomainError> {
        let solver = Self {
            target_significance,
            alpha,
        };
        solver.validate()?;
        Ok(solver)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.target_significance > 0.0 && self.target_significance.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name: "target_significance",
                value: self.target_significance,
                reason: "must be positive",
            });
        }
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name: "alpha",
                value: self.alpha,
                reason: "must be positive",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn significance(&self, n_on: f64, n_off: f64) -> f64 {
        li_ma_significance(n_on, n_off, self.alpha)
    }

    /// Factor the signal must be scaled by to reach the target significance.
    ///
    /// Returns `f64::INFINITY` when there is no excess, i.e. the source is
    /// undetectable at any scale.
    pub fn relative_flux(&self, n_on: f64, n_off: f64) -> Result<f64, DomainError> {
        if !(n_on >= 0.0 && n_off >= 0.0 && n_on.is_finite() && n_off.is_finite()) {
            return Err(DomainError::InvalidCounts { n_on, n_off });
        }
        let background = self.alpha * n_off;
        let n_signal = n_on - background;
        if n_signal <= 0.0 {
            return Ok(f64::INFINITY);
        }

        let residual = |phi: f64| {
            li_ma_significance(n_signal * phi + background, n_off, self.alpha)
                - self.target_significance
        };

        // residual(0) = -target < 0; grow the upper end until it is positive
        let mut lo = 0.0;
        let mut hi = 1.0;
        let mut doublings = 0;
        while residual(hi) < 0.0 {
            lo = hi;
            hi *= 2.0;
            doublings += 1;
            if doublings > MAX_BRACKET_DOUBLINGS || !hi.is_finite() {
                return Ok(f64::INFINITY);
            }
        }

        for _ in 0..MAX_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            if residual(mid) < 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= RELATIVE_TOLERANCE * hi {
                break;
            }
        }
        Ok(0.5 * (lo + hi))
    }

    /// Whether the counts are significant at the target level without scaling
    #[must_use]
    pub fn is_detection(&self, n_on: f64, n_off: f64) -> bool {
        self.significance(n_on, n_off) >= self.target_significance
    }
}
