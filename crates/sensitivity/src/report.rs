//! Rendering of a finished run

use std::fmt::Write;

use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::Serialize;

use sensitivity_core::{BinOutcome, CurveSummary, FluxScale, SensitivityCurve};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One energy bin of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub bin_index: usize,
    pub e_min_tev: f64,
    pub e_max_tev: f64,
    pub e_center_tev: f64,
    /// Mean differential sensitivity over trials, TeV⁻¹ cm⁻² s⁻¹
    pub flux: Option<f64>,
    pub flux_uncertainty: Option<f64>,
    /// Mean E² sensitivity over trials, erg cm⁻² s⁻¹
    pub energy_flux: Option<f64>,
    pub energy_flux_uncertainty: Option<f64>,
    /// Trials in which the bin was determined
    pub n_determined: usize,
    /// Cuts and counts of the first trial
    pub gammaness_threshold: Option<f64>,
    pub angular_cut: Option<f64>,
    pub n_on: Option<f64>,
    pub n_off: Option<f64>,
    /// Why the bin of the first trial stayed undetermined
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveReport {
    pub observation_time_hours: f64,
    pub n_trials: usize,
    pub rows: Vec<ReportRow>,
}

impl CurveReport {
    pub fn from_curves(curves: &[SensitivityCurve], observation_time_hours: f64) -> Result<Self> {
        let differential = CurveSummary::from_trials(curves, FluxScale::Differential)
            .wrap_err("failed to summarize differential sensitivity")?;
        let energy_squared = CurveSummary::from_trials(curves, FluxScale::EnergySquared)
            .wrap_err("failed to summarize E² sensitivity")?;
        let first = curves
            .first()
            .ok_or_else(|| eyre!("no curves to report"))?;

        let rows = differential
            .bins
            .iter()
            .zip(&energy_squared.bins)
            .zip(first.outcomes())
            .map(|((diff, e2), outcome)| {
                let result = outcome.result();
                ReportRow {
                    bin_index: diff.bin_index,
                    e_min_tev: diff.e_min_tev,
                    e_max_tev: diff.e_max_tev,
                    e_center_tev: diff.e_center_tev,
                    flux: diff.mean,
                    flux_uncertainty: diff.uncertainty,
                    energy_flux: e2.mean,
                    energy_flux_uncertainty: e2.uncertainty,
                    n_determined: diff.n_determined,
                    gammaness_threshold: result.map(|r| r.cut.gammaness_threshold),
                    angular_cut: result.map(|r| r.cut.angular_cut),
                    n_on: result.map(|r| r.counts.n_on),
                    n_off: result.map(|r| r.counts.n_off),
                    status: match outcome {
                        BinOutcome::Determined(_) => "ok".to_string(),
                        BinOutcome::Undetermined { reason, .. } => reason.to_string(),
                    },
                }
            })
            .collect();

        Ok(Self {
            observation_time_hours,
            n_trials: differential.n_trials,
            rows,
        })
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render_table()),
            OutputFormat::Json => self.render_json(),
        }
    }

    pub fn render_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).wrap_err("failed to serialize report")
    }

    #[must_use]
    pub fn render_table(&self) -> String {
        fn sci(value: Option<f64>) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("{v:.3e}"))
        }
        fn fixed(value: Option<f64>, digits: usize) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("{v:.digits$}"))
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Sensitivity for {} h, {} trial(s)",
            self.observation_time_hours, self.n_trials
        );
        let _ = writeln!(
            out,
            "{:>4} {:>9} {:>9} {:>11} {:>11} {:>11} {:>5} {:>6} {:>7} {:>10} {:>10}  status",
            "bin", "e_min", "e_max", "dN/dE", "E2 dN/dE", "+/-", "det", "g_cut", "t2_cut", "n_on", "n_off"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:>4} {:>9.4} {:>9.4} {:>11} {:>11} {:>11} {:>5} {:>6} {:>7} {:>10} {:>10}  {}",
                row.bin_index,
                row.e_min_tev,
                row.e_max_tev,
                sci(row.flux),
                sci(row.energy_flux),
                sci(row.energy_flux_uncertainty),
                row.n_determined,
                fixed(row.gammaness_threshold, 2),
                fixed(row.angular_cut, 3),
                fixed(row.n_on, 2),
                fixed(row.n_off, 2),
                row.status,
            );
        }
        out
    }
}
