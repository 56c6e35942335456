//! Configuration of a sensitivity curve build

use serde::{Deserialize, Serialize};

use crate::binning::BinSpacing;
use crate::curve::WorkerPool;
use crate::error::DomainError;
use crate::optimization::OptimizerConfig;
use crate::units::{Time, TimeExt};

fn default_n_bins() -> usize {
    4
}

fn default_observation_time_hours() -> f64 {
    50.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Number of energy bins of the curve
    #[serde(default = "default_n_bins")]
    pub n_bins: usize,
    #[serde(default)]
    pub spacing: BinSpacing,
    /// Observation time the sample weights are scaled to
    #[serde(default = "default_observation_time_hours")]
    pub observation_time_hours: f64,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Worker threads; the machine's parallelism when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            n_bins: default_n_bins(),
            spacing: BinSpacing::default(),
            observation_time_hours: default_observation_time_hours(),
            optimizer: OptimizerConfig::default(),
            workers: None,
        }
    }
}

impl SensitivityConfig {
    #[must_use]
    pub fn observation_time(&self) -> Time {
        Time::from_hours(self.observation_time_hours)
    }

    #[must_use]
    pub fn pool(&self) -> WorkerPool {
        match self.workers {
            Some(n) => WorkerPool::new(n),
            None => WorkerPool::default(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.n_bins == 0 {
            return Err(DomainError::InvalidBinCount(self.n_bins));
        }
        if !(self.observation_time_hours > 0.0 && self.observation_time_hours.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name: "observation_time_hours",
                value: self.observation_time_hours,
                reason: "must be positive",
            });
        }
        self.optimizer.validate()
    }
}
