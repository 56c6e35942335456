//! Sensitivity curves
//!
//! A curve holds one outcome per energy bin, in bin order. Bins whose
//! optimization found no usable cut are kept as `Undetermined` slots so the
//! curve always lines up with its binning.

mod builder;
mod ensemble;
mod pool;
mod progress;

pub use builder::SensitivityCurveBuilder;
pub use ensemble::{BinSummary, CurveSummary};
pub use pool::WorkerPool;
pub use progress::CurveProgress;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binning::EnergyBinning;
use crate::error::{DomainError, InsufficientDataError, OptimizationFailure};
use crate::optimization::SensitivityResult;
use crate::units::{Energy, FluxDensity};

/// Why a bin has no sensitivity value
#[derive(Debug, Clone, PartialEq)]
pub enum BinFailure {
    /// Every grid point was invalid or undetectable
    NoValidCut(OptimizationFailure),
    /// The bin itself had too few events
    InsufficientData(InsufficientDataError),
    /// The build was cancelled before the bin started
    Cancelled,
}

impl fmt::Display for BinFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinFailure::NoValidCut(e) => write!(f, "{e}"),
            BinFailure::InsufficientData(e) => write!(f, "{e}"),
            BinFailure::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinOutcome {
    Determined(SensitivityResult),
    Undetermined { bin_index: usize, reason: BinFailure },
}

impl BinOutcome {
    #[must_use]
    pub fn bin_index(&self) -> usize {
        match self {
            BinOutcome::Determined(result) => result.bin_index,
            BinOutcome::Undetermined { bin_index, .. } => *bin_index,
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&SensitivityResult> {
        match self {
            BinOutcome::Determined(result) => Some(result),
            BinOutcome::Undetermined { .. } => None,
        }
    }

    #[must_use]
    pub fn is_determined(&self) -> bool {
        matches!(self, BinOutcome::Determined(_))
    }
}

/// How fluxes are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluxScale {
    /// dN/dE in TeV⁻¹ cm⁻² s⁻¹
    #[default]
    Differential,
    /// E² · dN/dE in erg cm⁻² s⁻¹ at the bin centre
    EnergySquared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityCurve {
    binning: EnergyBinning,
    outcomes: Vec<BinOutcome>,
}

impl SensitivityCurve {
    pub(crate) fn new(binning: EnergyBinning, outcomes: Vec<BinOutcome>) -> Self {
        debug_assert_eq!(binning.n_bins(), outcomes.len());
        Self { binning, outcomes }
    }

    #[must_use]
    pub fn binning(&self) -> &EnergyBinning {
        &self.binning
    }

    #[must_use]
    pub fn edges(&self) -> &[Energy] {
        self.binning.edges()
    }

    #[must_use]
    pub fn outcomes(&self) -> &[BinOutcome] {
        &self.outcomes
    }

    /// Minimum detectable flux per bin, `None` for undetermined bins
    #[must_use]
    pub fn fluxes(&self) -> Vec<Option<FluxDensity>> {
        self.outcomes
            .iter()
            .map(|outcome| outcome.result().map(|r| r.flux))
            .collect()
    }

    /// Flux values per bin in the requested scale.
    ///
    /// Fails for diffuse target spectra, whose fluxes have no point-source
    /// unit.
    pub fn flux_values(&self, scale: FluxScale) -> Result<Vec<Option<f64>>, DomainError> {
        let centers = self.binning.centers();
        self.outcomes
            .iter()
            .zip(centers)
            .map(|(outcome, center)| {
                outcome
                    .result()
                    .map(|r| match scale {
                        FluxScale::Differential => r.flux.as_per_tev_cm2_s(),
                        FluxScale::EnergySquared => r.flux.energy_flux_erg_cm2_s(center),
                    })
                    .transpose()
            })
            .collect()
    }

    #[must_use]
    pub fn n_determined(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_determined()).count()
    }

    /// Whether every bin has a sensitivity value
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.n_determined() == self.outcomes.len()
    }
}
