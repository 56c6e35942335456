use crate::error::DomainError;
use crate::units::{Area, AreaExt, Energy};

use super::validate_range;

/// Description of a Monte-Carlo shower production
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McProduction {
    /// Number of showers thrown, before trigger and reconstruction
    pub n_simulated: f64,
    pub e_min: Energy,
    pub e_max: Energy,
    /// Area the shower cores were scattered over
    pub area: Area,
    /// Index of the power law energies were drawn from
    pub spectral_index: f64,
}

impl McProduction {
    #[must_use]
    pub fn new(
        n_simulated: u64,
        e_min: Energy,
        e_max: Energy,
        area: Area,
        spectral_index: f64,
    ) -> Self {
        Self {
            n_simulated: n_simulated as f64,
            e_min,
            e_max,
            area,
            spectral_index,
        }
    }

    /// Account for only a fraction of the production being available,
    /// e.g. when the rest was used to train the classifier
    #[must_use]
    pub fn with_sample_fraction(self, fraction: f64) -> Self {
        Self {
            n_simulated: self.n_simulated * fraction,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.n_simulated > 0.0 && self.n_simulated.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name: "n_simulated",
                value: self.n_simulated,
                reason: "number of simulated showers must be positive",
            });
        }
        validate_range(self.e_min, self.e_max)?;
        let m2 = self.area.as_square_meters();
        if !(m2 > 0.0 && m2.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name: "generation_area",
                value: m2,
                reason: "must be positive",
            });
        }
        if !self.spectral_index.is_finite() {
            return Err(DomainError::UnsupportedSpectralIndex(self.spectral_index));
        }
        Ok(())
    }
}
