//! Cut grid and optimizer configuration

use serde::{Deserialize, Serialize};

use crate::counting::{DEFAULT_OFF_REGION_EXTENT, RegionCounter};
use crate::error::DomainError;
use crate::significance::{DEFAULT_ALPHA, DEFAULT_TARGET_SIGNIFICANCE, SignificanceSolver};

/// A pair of selection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutPoint {
    /// Minimum classifier score, inclusive
    pub gammaness_threshold: f64,
    /// theta² threshold in deg², exclusive
    pub angular_cut: f64,
}

impl CutPoint {
    #[must_use]
    pub const fn new(gammaness_threshold: f64, angular_cut: f64) -> Self {
        Self {
            gammaness_threshold,
            angular_cut,
        }
    }
}

/// Evenly spaced values `start, start + step, …` below `stop`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl GridAxis {
    #[must_use]
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Number of points; the tolerance keeps `stop` out when rounding puts the
    /// ratio a hair above an integer
    #[must_use]
    pub fn len(&self) -> usize {
        if !(self.step > 0.0) || !(self.stop > self.start) {
            return 0;
        }
        ((self.stop - self.start) / self.step - 1e-9).ceil().max(0.0) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn points(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }

    /// Whether `value` lies within `[start, stop)`
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value < self.stop
    }

    fn validate(&self, name: &'static str) -> Result<(), DomainError> {
        if !(self.start.is_finite() && self.stop.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name,
                value: self.start,
                reason: "grid bounds must be finite",
            });
        }
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name,
                value: self.step,
                reason: "grid step must be positive",
            });
        }
        if self.is_empty() {
            return Err(DomainError::InvalidParameter {
                name,
                value: self.stop,
                reason: "grid stop must be above start",
            });
        }
        Ok(())
    }
}

fn default_gammaness_axis() -> GridAxis {
    GridAxis::new(0.5, 1.0, 0.05)
}

fn default_theta_squared_axis() -> GridAxis {
    GridAxis::new(0.001, 0.04, 0.002)
}

/// Two-dimensional grid of cut points searched per energy bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutGrid {
    #[serde(default = "default_gammaness_axis")]
    pub gammaness: GridAxis,
    /// theta² thresholds in deg²
    #[serde(default = "default_theta_squared_axis")]
    pub theta_squared: GridAxis,
}

impl Default for CutGrid {
    fn default() -> Self {
        Self {
            gammaness: default_gammaness_axis(),
            theta_squared: default_theta_squared_axis(),
        }
    }
}

impl CutGrid {
    #[must_use]
    pub fn len(&self) -> usize {
        self.gammaness.len() * self.theta_squared.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All cut points, gammaness varying slowest
    #[must_use]
    pub fn points(&self) -> Vec<CutPoint> {
        let thetas = self.theta_squared.points();
        self.gammaness
            .points()
            .into_iter()
            .flat_map(|g| thetas.iter().map(move |&t| CutPoint::new(g, t)))
            .collect()
    }

    #[must_use]
    pub fn contains(&self, cut: &CutPoint) -> bool {
        self.gammaness.contains(cut.gammaness_threshold)
            && self.theta_squared.contains(cut.angular_cut)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.gammaness.validate("gammaness grid")?;
        self.theta_squared.validate("theta_squared grid")?;
        if self.theta_squared.start < 0.0 {
            return Err(DomainError::InvalidParameter {
                name: "theta_squared grid",
                value: self.theta_squared.start,
                reason: "angular cuts cannot be negative",
            });
        }
        Ok(())
    }
}

fn default_target_significance() -> f64 {
    DEFAULT_TARGET_SIGNIFICANCE
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_off_region_extent() -> f64 {
    DEFAULT_OFF_REGION_EXTENT
}

/// Settings shared by every per-bin optimization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub grid: CutGrid,
    /// Detection threshold in σ
    #[serde(default = "default_target_significance")]
    pub target_significance: f64,
    /// On/off exposure ratio
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// theta² extent in deg² of the off-region histogram
    #[serde(default = "default_off_region_extent")]
    pub off_region_extent: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            grid: CutGrid::default(),
            target_significance: default_target_significance(),
            alpha: default_alpha(),
            off_region_extent: default_off_region_extent(),
        }
    }
}

impl OptimizerConfig {
    #[must_use]
    pub fn solver(&self) -> SignificanceSolver {
        SignificanceSolver {
            target_significance: self.target_significance,
            alpha: self.alpha,
        }
    }

    #[must_use]
    pub fn counter(&self) -> RegionCounter {
        RegionCounter::new(self.off_region_extent)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.grid.validate()?;
        self.solver().validate()?;
        if !(self.off_region_extent > 0.0 && self.off_region_extent.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name: "off_region_extent",
                value: self.off_region_extent,
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
