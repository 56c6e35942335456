//! Aggregation of curves from independent trials

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::units::EnergyExt;

use super::{FluxScale, SensitivityCurve};

/// Spread of one bin's flux across trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSummary {
    pub bin_index: usize,
    pub e_min_tev: f64,
    pub e_max_tev: f64,
    pub e_center_tev: f64,
    /// Mean flux over the trials that determined this bin
    pub mean: Option<f64>,
    /// Half the population standard deviation
    pub uncertainty: Option<f64>,
    /// Number of trials that determined this bin
    pub n_determined: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSummary {
    pub scale: FluxScale,
    pub n_trials: usize,
    pub bins: Vec<BinSummary>,
}

impl CurveSummary {
    /// Summarize curves that share the same binning
    pub fn from_trials(curves: &[SensitivityCurve], scale: FluxScale) -> Result<Self, DomainError> {
        let Some(first) = curves.first() else {
            return Err(DomainError::InvalidParameter {
                name: "trials",
                value: 0.0,
                reason: "at least one curve is required",
            });
        };
        if let Some(index) = curves
            .iter()
            .position(|c| c.binning() != first.binning())
        {
            return Err(DomainError::InvalidParameter {
                name: "trials",
                value: index as f64,
                reason: "every trial must use the same binning",
            });
        }

        let per_trial = curves
            .iter()
            .map(|c| c.flux_values(scale))
            .collect::<Result<Vec<_>, _>>()?;

        let edges = first.edges();
        let centers = first.binning().centers();
        let bins = (0..first.outcomes().len())
            .map(|i| {
                let values: Vec<f64> = per_trial.iter().filter_map(|trial| trial[i]).collect();
                let (mean, uncertainty) = mean_and_half_std(&values).unzip();
                BinSummary {
                    bin_index: i,
                    e_min_tev: edges[i].as_tev(),
                    e_max_tev: edges[i + 1].as_tev(),
                    e_center_tev: centers[i].as_tev(),
                    mean,
                    uncertainty,
                    n_determined: values.len(),
                }
            })
            .collect();

        Ok(Self {
            scale,
            n_trials: curves.len(),
            bins,
        })
    }
}

fn mean_and_half_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt() / 2.0))
}
