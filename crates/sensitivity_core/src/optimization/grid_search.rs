//! Exhaustive search over the cut grid
//!
//! Every grid point is evaluated in row-major order. The objective surface is
//! piecewise constant in the cuts, so there is nothing for a local refinement
//! to follow and the best grid point is the answer.

use crate::error::{OptimizationFailure, SensitivityError};

use super::config::CutGrid;
use super::evaluator::{Evaluation, SensitivityEvaluator};
use super::result::{EvaluationRecord, PointStatus, SearchHistory};

/// Evaluate all points of `grid` and return the one with the lowest flux.
///
/// Ties keep the first point in evaluation order.
pub fn search_grid(
    evaluator: &SensitivityEvaluator<'_>,
    grid: &CutGrid,
) -> Result<(Evaluation, SearchHistory), SensitivityError> {
    let mut history = SearchHistory::new();
    let mut best: Option<Evaluation> = None;

    for cut in grid.points() {
        let record = match evaluator.evaluate(cut) {
            Ok(evaluation) => {
                let status = if evaluation.is_detectable() {
                    PointStatus::Valid
                } else {
                    PointStatus::Undetectable
                };
                if status == PointStatus::Valid
                    && best.is_none_or(|b| evaluation.flux_value < b.flux_value)
                {
                    best = Some(evaluation);
                }
                EvaluationRecord {
                    cut,
                    flux_value: evaluation.flux_value,
                    status,
                }
            }
            Err(SensitivityError::InsufficientData(reason)) => {
                tracing::trace!(
                    gammaness = cut.gammaness_threshold,
                    theta2 = cut.angular_cut,
                    %reason,
                    "cut point skipped"
                );
                EvaluationRecord {
                    cut,
                    flux_value: f64::INFINITY,
                    status: PointStatus::InsufficientData,
                }
            }
            Err(e) => return Err(e),
        };
        history.record(record);
    }

    match best {
        Some(evaluation) if evaluation.flux_value.is_finite() => Ok((evaluation, history)),
        _ => Err(OptimizationFailure {
            evaluated: history.num_evaluations(),
            invalid: history.num_invalid(),
            undetectable: history.num_undetectable(),
        }
        .into()),
    }
}
