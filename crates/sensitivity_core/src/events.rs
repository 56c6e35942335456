//! Simulated shower samples
//!
//! Event tables arrive already decoded from the simulation reader. They are
//! validated, reweighted to a target spectrum once, sorted by energy and then
//! only ever read. Energy bins are borrowed sub-slices of a sample and cut
//! selections are vectors of references, so nothing downstream copies or
//! mutates events.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::spectrum::{McProduction, Spectrum};
use crate::units::{Energy, EnergyExt, Time};

/// Which population a sample simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    /// Gamma rays from the source
    Signal,
    /// Cosmic-ray protons
    Background,
}

/// Decoded event columns as delivered by the event reader
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    /// Reconstructed energy in TeV
    pub energy: Vec<f64>,
    /// Classifier score in [0, 1]
    pub gammaness: Vec<f64>,
    /// Angular separation to the source position in degrees
    pub theta_deg: Vec<f64>,
    /// Squared angular separation in deg²
    pub theta_deg_squared: Vec<f64>,
}

impl EventTable {
    #[must_use]
    pub fn new(
        energy: Vec<f64>,
        gammaness: Vec<f64>,
        theta_deg: Vec<f64>,
        theta_deg_squared: Vec<f64>,
    ) -> Self {
        Self {
            energy,
            gammaness,
            theta_deg,
            theta_deg_squared,
        }
    }

    /// Build a table from theta, deriving the squared column
    #[must_use]
    pub fn from_theta(energy: Vec<f64>, gammaness: Vec<f64>, theta_deg: Vec<f64>) -> Self {
        let theta_deg_squared = theta_deg.iter().map(|t| t * t).collect();
        Self::new(energy, gammaness, theta_deg, theta_deg_squared)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    /// Check column lengths and value ranges
    pub fn validate(&self) -> Result<(), DomainError> {
        let expected = self.energy.len();
        for (column, len) in [
            ("gammaness", self.gammaness.len()),
            ("theta_deg", self.theta_deg.len()),
            ("theta_deg_squared", self.theta_deg_squared.len()),
        ] {
            if len != expected {
                return Err(DomainError::ColumnLengthMismatch {
                    column,
                    expected,
                    found: len,
                });
            }
        }

        for (row, &value) in self.energy.iter().enumerate() {
            if !(value > 0.0 && value.is_finite()) {
                return Err(DomainError::InvalidColumn {
                    column: "energy",
                    row,
                    value,
                });
            }
        }
        for (row, &value) in self.gammaness.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidColumn {
                    column: "gammaness",
                    row,
                    value,
                });
            }
        }
        for (row, &value) in self.theta_deg_squared.iter().enumerate() {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(DomainError::InvalidColumn {
                    column: "theta_deg_squared",
                    row,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// A single reconstructed, weighted shower
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowerEvent {
    pub energy: Energy,
    pub gammaness: f64,
    /// Squared angular separation in deg²
    pub theta_squared: f64,
    /// Expected number of such events during the observation
    pub weight: f64,
}

/// An immutable, energy-sorted collection of weighted showers
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSample {
    kind: SampleKind,
    events: Vec<ShowerEvent>,
}

impl SimulatedSample {
    /// Validate a decoded table and weight it to `spectrum` for an
    /// observation of length `t_obs`
    pub fn reweighted(
        kind: SampleKind,
        table: &EventTable,
        production: &McProduction,
        spectrum: &Spectrum,
        t_obs: Time,
    ) -> Result<Self, DomainError> {
        table.validate()?;
        let energies: Vec<Energy> = table.energy.iter().map(|&e| Energy::from_tev(e)).collect();
        let weights = spectrum.weight_for_observation(&energies, production, t_obs)?;

        let events = energies
            .into_iter()
            .zip(weights)
            .enumerate()
            .map(|(i, (energy, weight))| ShowerEvent {
                energy,
                gammaness: table.gammaness[i],
                theta_squared: table.theta_deg_squared[i],
                weight,
            })
            .collect();
        Self::from_events(kind, events)
    }

    /// Wrap already weighted events
    pub fn from_events(kind: SampleKind, mut events: Vec<ShowerEvent>) -> Result<Self, DomainError> {
        for (row, event) in events.iter().enumerate() {
            let tev = event.energy.as_tev();
            if !(tev > 0.0 && tev.is_finite()) {
                return Err(DomainError::NonPositiveEnergy { energy_tev: tev });
            }
            if !(0.0..=1.0).contains(&event.gammaness) {
                return Err(DomainError::InvalidColumn {
                    column: "gammaness",
                    row,
                    value: event.gammaness,
                });
            }
            if !(event.theta_squared >= 0.0 && event.theta_squared.is_finite()) {
                return Err(DomainError::InvalidColumn {
                    column: "theta_deg_squared",
                    row,
                    value: event.theta_squared,
                });
            }
            if !(event.weight >= 0.0 && event.weight.is_finite()) {
                return Err(DomainError::InvalidColumn {
                    column: "weight",
                    row,
                    value: event.weight,
                });
            }
        }
        events.sort_by(|a, b| a.energy.as_tev().total_cmp(&b.energy.as_tev()));
        Ok(Self { kind, events })
    }

    #[must_use]
    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    /// Events sorted by ascending energy
    #[must_use]
    pub fn events(&self) -> &[ShowerEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of all weights, the expected number of events
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.events.iter().map(|e| e.weight).sum()
    }
}

/// Events passing `gammaness >= threshold`
#[must_use]
pub fn select_gammaness(events: &[ShowerEvent], threshold: f64) -> Vec<&ShowerEvent> {
    events.iter().filter(|e| e.gammaness >= threshold).collect()
}

/// Minimum and maximum energy across two event slices
#[must_use]
pub fn energy_span(a: &[ShowerEvent], b: &[ShowerEvent]) -> Option<(Energy, Energy)> {
    a.iter().chain(b.iter()).fold(None, |span, event| match span {
        None => Some((event.energy, event.energy)),
        Some((lo, hi)) => Some((
            if event.energy < lo { event.energy } else { lo },
            if event.energy > hi { event.energy } else { hi },
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Area, AreaExt, TimeExt};
    use approx::assert_relative_eq;

    fn table() -> EventTable {
        EventTable::from_theta(
            vec![2.0, 0.5, 1.0],
            vec![0.9, 0.2, 0.6],
            vec![0.1, 0.3, 0.05],
        )
    }

    #[test]
    fn test_from_theta_squares() {
        let t = table();
        assert_relative_eq!(t.theta_deg_squared[1], 0.09, max_relative = 1e-12);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_columns() {
        let mut t = table();
        t.gammaness.pop();
        assert!(matches!(
            t.validate(),
            Err(DomainError::ColumnLengthMismatch { column: "gammaness", .. })
        ));

        let mut t = table();
        t.energy[2] = 0.0;
        assert!(matches!(
            t.validate(),
            Err(DomainError::InvalidColumn { column: "energy", row: 2, .. })
        ));

        let mut t = table();
        t.gammaness[0] = 1.5;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_reweighted_sample_is_sorted_and_conserves_weight() {
        let spectrum = Spectrum::crab();
        let production = McProduction::new(
            3,
            Energy::from_tev(0.1),
            Energy::from_tev(10.0),
            Area::from_square_meters(1e5),
            -2.0,
        );
        let t_obs = Time::from_hours(1.0);
        let sample =
            SimulatedSample::reweighted(SampleKind::Signal, &table(), &production, &spectrum, t_obs)
                .unwrap();

        let energies: Vec<f64> = sample.events().iter().map(|e| e.energy.as_tev()).collect();
        for (actual, expected) in energies.iter().zip([0.5, 1.0, 2.0]) {
            assert_relative_eq!(*actual, expected, max_relative = 1e-12);
        }
        // Gammaness travels with its event through the sort
        assert_relative_eq!(sample.events()[0].gammaness, 0.2);

        let expected = spectrum
            .expected_events(production.e_min, production.e_max, production.area, t_obs)
            .unwrap();
        assert_relative_eq!(sample.total_weight(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_select_and_span() {
        let events: Vec<ShowerEvent> = [(1.0, 0.3), (3.0, 0.7), (0.2, 0.9)]
            .iter()
            .map(|&(e, g)| ShowerEvent {
                energy: Energy::from_tev(e),
                gammaness: g,
                theta_squared: 0.0,
                weight: 1.0,
            })
            .collect();

        assert_eq!(select_gammaness(&events, 0.7).len(), 2);
        assert_eq!(select_gammaness(&events, 0.95).len(), 0);

        let (lo, hi) = energy_span(&events[..1], &events[1..]).unwrap();
        assert_relative_eq!(lo.as_tev(), 0.2, max_relative = 1e-12);
        assert_relative_eq!(hi.as_tev(), 3.0, max_relative = 1e-12);
        assert!(energy_span(&[], &[]).is_none());
    }
}
