//! Per-bin cut optimization
//!
//! For one energy bin, find the gammaness and theta² cuts that minimize the
//! flux a source needs to be detected at the target significance.
//!
//! # Example
//!
//! ```ignore
//! use sensitivity_core::optimization::{BinOptimizer, OptimizerConfig};
//!
//! let optimizer = BinOptimizer::new(OptimizerConfig::default())?;
//! let optimum = optimizer.optimize(signal_bin, background_bin, &Spectrum::crab())?;
//! println!("{} at {:?}", optimum.flux, optimum.best.cut);
//! ```

mod config;
mod evaluator;
mod grid_search;
mod result;

pub use config::{CutGrid, CutPoint, GridAxis, OptimizerConfig};
pub use evaluator::{Evaluation, SensitivityEvaluator};
pub use grid_search::search_grid;
pub use result::{BinOptimum, EvaluationRecord, PointStatus, SearchHistory, SensitivityResult};

use crate::error::{DomainError, SensitivityError};
use crate::events::ShowerEvent;
use crate::spectrum::Spectrum;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinOptimizer {
    config: OptimizerConfig,
}

impl BinOptimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Best cut for the events of one energy bin.
    ///
    /// The bin slices are read only; `target` is the spectrum whose scaled
    /// flux is reported.
    pub fn optimize(
        &self,
        signal: &[ShowerEvent],
        background: &[ShowerEvent],
        target: &Spectrum,
    ) -> Result<BinOptimum, SensitivityError> {
        let evaluator = SensitivityEvaluator::new(
            signal,
            background,
            target,
            self.config.counter(),
            self.config.solver(),
        )?;
        let (best, history) = search_grid(&evaluator, &self.config.grid)?;

        Ok(BinOptimum {
            flux: evaluator.target_flux() * best.relative_flux,
            representative_energy: evaluator.representative_energy(),
            best,
            history,
        })
    }
}
