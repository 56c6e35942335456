//! Sensitivity curve estimation for imaging atmospheric Cherenkov telescopes
//!
//! This crate computes the minimum gamma-ray flux an array can detect as a
//! function of reconstructed energy, from simulated gamma-ray and cosmic-ray
//! showers. It supports:
//! - Power-law flux models, analytic event-count integrals and reweighting of
//!   simulated showers to an assumed spectrum
//! - On/off counting from the theta² distribution
//! - Li & Ma significance and its inversion into a required flux scale
//! - Brute-force cut optimization per energy bin, run concurrently across bins
//!
//! # Example
//!
//! ```ignore
//! use sensitivity_core::{FluxScale, SensitivityConfig, SensitivityCurveBuilder, Spectrum};
//!
//! let curve = SensitivityCurveBuilder::new(SensitivityConfig::default())
//!     .build(&gammas, &protons, &Spectrum::crab())?;
//! for flux in curve.flux_values(FluxScale::EnergySquared)? {
//!     println!("{flux:?}");
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod binning;
pub mod counting;
pub mod curve;
pub mod events;
pub mod optimization;
pub mod significance;
pub mod spectrum;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod error;
pub mod units;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use binning::{BinSpacing, EnergyBinning};
pub use config::SensitivityConfig;
pub use curve::{
    BinFailure, BinOutcome, CurveProgress, CurveSummary, FluxScale, SensitivityCurve,
    SensitivityCurveBuilder, WorkerPool,
};
pub use error::{DomainError, InsufficientDataError, OptimizationFailure, SensitivityError};
pub use events::{EventTable, SampleKind, ShowerEvent, SimulatedSample};
pub use optimization::{BinOptimizer, CutPoint, OptimizerConfig, SensitivityResult};
pub use spectrum::{McProduction, Spectrum, SpectrumParameters};
