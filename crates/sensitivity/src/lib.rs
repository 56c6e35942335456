//! Command-line driver for `sensitivity_core`
//!
//! Reads a YAML run file, draws synthetic gamma-ray and proton event tables,
//! weights them to the configured spectra and reports the resulting
//! sensitivity curve, averaged over independent trials.

pub mod config;
pub mod logging;
pub mod report;
pub mod run;
pub mod synthetic;

pub use config::{Overrides, RunConfig};
pub use logging::init_logging;
pub use report::{CurveReport, OutputFormat};
pub use run::run;
