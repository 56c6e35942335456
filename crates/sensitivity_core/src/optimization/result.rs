//! Optimization result types

use serde::{Deserialize, Serialize};

use crate::counting::OnOffCounts;
use crate::units::{Energy, FluxDensity};

use super::config::CutPoint;
use super::evaluator::Evaluation;

/// How a single grid point turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointStatus {
    /// Finite flux
    Valid,
    /// Counts were fine but there was no signal excess
    Undetectable,
    /// Too few events to estimate counts
    InsufficientData,
}

/// A single evaluation during the search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub cut: CutPoint,
    /// Objective value, `+∞` unless the status is `Valid`
    pub flux_value: f64,
    pub status: PointStatus,
}

/// Every grid point visited in evaluation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHistory {
    pub evaluations: Vec<EvaluationRecord>,
}

impl SearchHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: EvaluationRecord) {
        self.evaluations.push(record);
    }

    #[must_use]
    pub fn num_evaluations(&self) -> usize {
        self.evaluations.len()
    }

    fn count(&self, status: PointStatus) -> usize {
        self.evaluations.iter().filter(|r| r.status == status).count()
    }

    #[must_use]
    pub fn num_valid(&self) -> usize {
        self.count(PointStatus::Valid)
    }

    #[must_use]
    pub fn num_undetectable(&self) -> usize {
        self.count(PointStatus::Undetectable)
    }

    #[must_use]
    pub fn num_invalid(&self) -> usize {
        self.count(PointStatus::InsufficientData)
    }
}

/// Best cut of one energy bin, before it is placed on the curve
#[derive(Debug, Clone, PartialEq)]
pub struct BinOptimum {
    pub best: Evaluation,
    /// Differential flux at the representative energy
    pub flux: FluxDensity,
    pub representative_energy: Energy,
    pub history: SearchHistory,
}

impl BinOptimum {
    #[must_use]
    pub fn into_result(self, bin_index: usize) -> SensitivityResult {
        SensitivityResult {
            bin_index,
            flux: self.flux,
            representative_energy: self.representative_energy,
            cut: self.best.cut,
            counts: self.best.counts,
            relative_flux: self.best.relative_flux,
        }
    }
}

/// Minimum detectable flux of one energy bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityResult {
    pub bin_index: usize,
    /// Differential flux required for a detection
    pub flux: FluxDensity,
    /// Energy the flux is quoted at
    pub representative_energy: Energy,
    pub cut: CutPoint,
    pub counts: OnOffCounts,
    pub relative_flux: f64,
}
