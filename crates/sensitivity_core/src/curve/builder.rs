use tracing::{debug, info, warn};

use crate::binning::EnergyBinning;
use crate::config::SensitivityConfig;
use crate::error::SensitivityError;
use crate::events::{ShowerEvent, SimulatedSample};
use crate::optimization::BinOptimizer;
use crate::spectrum::Spectrum;

use super::{BinFailure, BinOutcome, CurveProgress, SensitivityCurve, WorkerPool};

/// Builds a sensitivity curve by optimizing every energy bin independently.
///
/// Bins run as separate tasks on the worker pool. Samples are shared by
/// reference and never copied. Domain errors abort the build; a bin that
/// only lacks data ends up as an `Undetermined` slot and does not affect
/// its siblings.
#[derive(Debug, Clone)]
pub struct SensitivityCurveBuilder {
    config: SensitivityConfig,
    pool: WorkerPool,
    progress: Option<CurveProgress>,
    binning: Option<EnergyBinning>,
}

impl SensitivityCurveBuilder {
    #[must_use]
    pub fn new(config: SensitivityConfig) -> Self {
        Self {
            pool: config.pool(),
            config,
            progress: None,
            binning: None,
        }
    }

    #[must_use]
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: CurveProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Use fixed bin edges instead of spanning the samples' energy range
    #[must_use]
    pub fn with_binning(mut self, binning: EnergyBinning) -> Self {
        self.binning = Some(binning);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SensitivityConfig {
        &self.config
    }

    pub fn build(
        &self,
        signal: &SimulatedSample,
        background: &SimulatedSample,
        target: &Spectrum,
    ) -> Result<SensitivityCurve, SensitivityError> {
        self.config.validate()?;
        let optimizer = BinOptimizer::new(self.config.optimizer)?;

        let binning = match &self.binning {
            Some(binning) => binning.clone(),
            None => EnergyBinning::from_samples(
                signal,
                background,
                self.config.n_bins,
                self.config.spacing,
            )?,
        };
        let tasks: Vec<(&[ShowerEvent], &[ShowerEvent])> = binning
            .partition(signal)
            .into_iter()
            .zip(binning.partition(background))
            .collect();

        if let Some(progress) = &self.progress {
            progress.reset(tasks.len());
        }
        debug!(
            bins = tasks.len(),
            threads = self.pool.threads(),
            "building sensitivity curve"
        );

        let per_bin = self.pool.map_ordered(&tasks, |bin_index, &(signal_bin, background_bin)| {
            if self.progress.as_ref().is_some_and(CurveProgress::is_cancelled) {
                return Err(SensitivityError::Cancelled);
            }
            let result = optimizer
                .optimize(signal_bin, background_bin, target)
                .map(|optimum| optimum.into_result(bin_index));
            if let Some(progress) = &self.progress {
                progress.increment();
            }
            result
        })?;

        let mut outcomes = Vec::with_capacity(per_bin.len());
        for (bin_index, result) in per_bin.into_iter().enumerate() {
            let reason = match result {
                Ok(result) => {
                    debug!(
                        bin = bin_index,
                        flux = result.flux.value(),
                        gammaness = result.cut.gammaness_threshold,
                        theta2 = result.cut.angular_cut,
                        "bin optimized"
                    );
                    outcomes.push(BinOutcome::Determined(result));
                    continue;
                }
                Err(SensitivityError::Optimization(failure)) => BinFailure::NoValidCut(failure),
                Err(SensitivityError::InsufficientData(e)) => BinFailure::InsufficientData(e),
                Err(SensitivityError::Cancelled) => BinFailure::Cancelled,
                Err(fatal) => return Err(fatal),
            };
            warn!(bin = bin_index, %reason, "bin undetermined");
            outcomes.push(BinOutcome::Undetermined { bin_index, reason });
        }

        let curve = SensitivityCurve::new(binning, outcomes);
        info!(
            determined = curve.n_determined(),
            bins = curve.outcomes().len(),
            "sensitivity curve built"
        );
        Ok(curve)
    }
}
