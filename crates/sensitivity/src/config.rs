//! YAML run configuration
//!
//! Every field has a default, so a run file only needs to name what it
//! changes. Command-line flags are applied on top through [`Overrides`].

use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use sensitivity_core::units::{Area, AreaExt, Energy, EnergyExt};
use sensitivity_core::{McProduction, SensitivityConfig, SpectrumParameters};

/// Monte-Carlo production a synthetic sample is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionConfig {
    /// Showers thrown by the simulation
    pub n_simulated: u64,
    /// Showers surviving trigger and reconstruction, i.e. rows drawn
    pub n_events: usize,
    pub e_min_tev: f64,
    pub e_max_tev: f64,
    /// Area the shower cores were scattered over, in m²
    pub area_m2: f64,
    #[serde(default = "default_production_index")]
    pub spectral_index: f64,
    /// Part of the production left after classifier training
    #[serde(default = "default_sample_fraction")]
    pub sample_fraction: f64,
}

fn default_production_index() -> f64 {
    -2.0
}

fn default_sample_fraction() -> f64 {
    0.5
}

fn default_signal_production() -> ProductionConfig {
    ProductionConfig {
        n_simulated: 1_000_000,
        n_events: 50_000,
        e_min_tev: 0.01,
        e_max_tev: 100.0,
        area_m2: 1e6,
        spectral_index: default_production_index(),
        sample_fraction: default_sample_fraction(),
    }
}

fn default_background_production() -> ProductionConfig {
    ProductionConfig {
        n_simulated: 5_000_000,
        n_events: 300_000,
        e_min_tev: 0.01,
        e_max_tev: 100.0,
        area_m2: 1e6,
        spectral_index: default_production_index(),
        sample_fraction: default_sample_fraction(),
    }
}

impl ProductionConfig {
    #[must_use]
    pub fn production(&self) -> McProduction {
        McProduction::new(
            self.n_simulated,
            Energy::from_tev(self.e_min_tev),
            Energy::from_tev(self.e_max_tev),
            Area::from_square_meters(self.area_m2),
            self.spectral_index,
        )
        .with_sample_fraction(self.sample_fraction)
    }
}

/// Shape parameters of a Beta distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaShape {
    pub alpha: f64,
    pub beta: f64,
}

fn default_signal_gammaness() -> BetaShape {
    BetaShape {
        alpha: 5.0,
        beta: 1.5,
    }
}

fn default_background_gammaness() -> BetaShape {
    BetaShape {
        alpha: 1.5,
        beta: 5.0,
    }
}

fn default_psf_theta2() -> f64 {
    0.005
}

fn default_background_max_theta() -> f64 {
    6.0
}

/// Toy instrument response used by the synthetic event source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Classifier score distribution of gamma rays
    #[serde(default = "default_signal_gammaness")]
    pub signal_gammaness: BetaShape,
    /// Classifier score distribution of protons
    #[serde(default = "default_background_gammaness")]
    pub background_gammaness: BetaShape,
    /// Mean theta² of gamma rays in deg²; theta² is exponential
    #[serde(default = "default_psf_theta2")]
    pub psf_theta2_deg2: f64,
    /// Protons are spread uniformly in theta² up to this angle
    #[serde(default = "default_background_max_theta")]
    pub background_max_theta_deg: f64,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            signal_gammaness: default_signal_gammaness(),
            background_gammaness: default_background_gammaness(),
            psf_theta2_deg2: default_psf_theta2(),
            background_max_theta_deg: default_background_max_theta(),
        }
    }
}

fn default_signal_spectrum() -> SpectrumParameters {
    SpectrumParameters::crab()
}

fn default_background_spectrum() -> SpectrumParameters {
    SpectrumParameters::cosmic_ray()
}

fn default_trials() -> usize {
    1
}

/// Everything a run needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
    #[serde(default = "default_signal_production")]
    pub signal: ProductionConfig,
    #[serde(default = "default_background_production")]
    pub background: ProductionConfig,
    /// Spectrum gamma rays are weighted to, and the one the sensitivity is
    /// expressed in
    #[serde(default = "default_signal_spectrum")]
    pub signal_spectrum: SpectrumParameters,
    #[serde(default = "default_background_spectrum")]
    pub background_spectrum: SpectrumParameters,
    #[serde(default)]
    pub response: ResponseConfig,
    #[serde(default)]
    pub seed: u64,
    /// Independent realizations to average over
    #[serde(default = "default_trials")]
    pub trials: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sensitivity: SensitivityConfig::default(),
            signal: default_signal_production(),
            background: default_background_production(),
            signal_spectrum: default_signal_spectrum(),
            background_spectrum: default_background_spectrum(),
            response: ResponseConfig::default(),
            seed: 0,
            trials: default_trials(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read run config {}", path.display()))?;
        Self::from_yaml(&content)
            .wrap_err_with(|| format!("failed to parse run config {}", path.display()))
    }
}

/// Command-line values that take precedence over the run file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub n_bins: Option<usize>,
    pub workers: Option<usize>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub observation_time_hours: Option<f64>,
}

impl Overrides {
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(n_bins) = self.n_bins {
            config.sensitivity.n_bins = n_bins;
        }
        if let Some(workers) = self.workers {
            config.sensitivity.workers = Some(workers);
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(hours) = self.observation_time_hours {
            config.sensitivity.observation_time_hours = hours;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(RunConfig::from_yaml("").unwrap(), RunConfig::default());
        assert_eq!(RunConfig::from_yaml("  \n").unwrap(), RunConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "\
seed: 7
trials: 3
sensitivity:
  n_bins: 6
  spacing: linear
  optimizer:
    target_significance: 3.0
signal:
  n_simulated: 2000
  n_events: 100
  e_min_tev: 0.1
  e_max_tev: 10.0
  area_m2: 50000.0
";
        let config = RunConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.trials, 3);
        assert_eq!(config.sensitivity.n_bins, 6);
        assert_eq!(config.sensitivity.optimizer.target_significance, 3.0);
        assert_eq!(config.sensitivity.optimizer.alpha, 1.0);
        assert_eq!(config.sensitivity.observation_time_hours, 50.0);
        assert_eq!(config.signal.n_events, 100);
        assert_eq!(config.signal.sample_fraction, 0.5);
        assert_eq!(config.background, default_background_production());
        assert_eq!(config.signal_spectrum, SpectrumParameters::crab());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed: 99").unwrap();
        writeln!(file, "response:").unwrap();
        writeln!(file, "  psf_theta2_deg2: 0.01").unwrap();

        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.response.psf_theta2_deg2, 0.01);
        assert_eq!(config.response.background_max_theta_deg, 6.0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RunConfig::load(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = RunConfig {
            seed: 3,
            ..RunConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(RunConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = RunConfig::default();
        Overrides {
            n_bins: Some(8),
            workers: Some(2),
            trials: None,
            seed: Some(11),
            observation_time_hours: Some(5.0),
        }
        .apply(&mut config);

        assert_eq!(config.sensitivity.n_bins, 8);
        assert_eq!(config.sensitivity.workers, Some(2));
        assert_eq!(config.trials, 1);
        assert_eq!(config.seed, 11);
        assert_eq!(config.sensitivity.observation_time_hours, 5.0);
    }

    #[test]
    fn test_production_applies_sample_fraction() {
        let production = default_signal_production().production();
        assert_eq!(production.n_simulated, 500_000.0);
        assert!(production.validate().is_ok());
    }
}
