//! Flux required for a detection at a single cut point

use serde::{Deserialize, Serialize};

use crate::counting::{OnOffCounts, RegionCounter};
use crate::error::{InsufficientDataError, SensitivityError};
use crate::events::{ShowerEvent, energy_span, select_gammaness};
use crate::significance::SignificanceSolver;
use crate::spectrum::Spectrum;
use crate::units::{Energy, FluxDensity};

use super::config::CutPoint;

/// Outcome of evaluating one cut point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub cut: CutPoint,
    pub counts: OnOffCounts,
    /// Scale factor of the target flux needed for a detection
    pub relative_flux: f64,
    /// Differential flux in TeV⁻¹ cm⁻² s⁻¹, infinite when undetectable
    pub flux_value: f64,
}

impl Evaluation {
    #[must_use]
    pub fn is_detectable(&self) -> bool {
        self.relative_flux.is_finite()
    }
}

/// Evaluates cut points for the events of one energy bin
#[derive(Debug, Clone, Copy)]
pub struct SensitivityEvaluator<'a> {
    signal: &'a [ShowerEvent],
    background: &'a [ShowerEvent],
    counter: RegionCounter,
    solver: SignificanceSolver,
    representative_energy: Energy,
    target_flux: FluxDensity,
}

impl<'a> SensitivityEvaluator<'a> {
    /// The flux is quoted at the midpoint of the lowest and highest energy
    /// found in either sample before any cut.
    pub fn new(
        signal: &'a [ShowerEvent],
        background: &'a [ShowerEvent],
        target: &Spectrum,
        counter: RegionCounter,
        solver: SignificanceSolver,
    ) -> Result<Self, SensitivityError> {
        let (lo, hi) = energy_span(signal, background).ok_or(InsufficientDataError::EmptyBin)?;
        let representative_energy = (lo + hi) / 2.0;
        let target_flux = target.flux(representative_energy)?;
        Ok(Self {
            signal,
            background,
            counter,
            solver,
            representative_energy,
            target_flux,
        })
    }

    #[must_use]
    pub fn representative_energy(&self) -> Energy {
        self.representative_energy
    }

    /// Target spectrum flux at the representative energy
    #[must_use]
    pub fn target_flux(&self) -> FluxDensity {
        self.target_flux
    }

    pub fn evaluate(&self, cut: CutPoint) -> Result<Evaluation, SensitivityError> {
        let selected_signal = select_gammaness(self.signal, cut.gammaness_threshold);
        let selected_background = select_gammaness(self.background, cut.gammaness_threshold);

        let counts = self
            .counter
            .count(&selected_background, &selected_signal, cut.angular_cut)?;
        let relative_flux = self.solver.relative_flux(counts.n_on, counts.n_off)?;

        Ok(Evaluation {
            cut,
            counts,
            relative_flux,
            flux_value: self.target_flux.value() * relative_flux,
        })
    }

    /// Flux to minimize; cut points without enough data score `+∞`
    pub fn objective(&self, cut: CutPoint) -> Result<f64, SensitivityError> {
        match self.evaluate(cut) {
            Ok(evaluation) => Ok(evaluation.flux_value),
            Err(SensitivityError::InsufficientData(_)) => Ok(f64::INFINITY),
            Err(e) => Err(e),
        }
    }
}
