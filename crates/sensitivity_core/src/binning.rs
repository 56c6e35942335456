//! Energy binning
//!
//! Bins are half-open `[lo, hi)` except for the last one, which also contains
//! its upper edge so that the highest observed energy is not lost. Events
//! outside the outer edges belong to no bin.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{ShowerEvent, SimulatedSample, energy_span};
use crate::units::{Energy, EnergyExt};

/// Spacing of bin edges between the outer edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinSpacing {
    #[default]
    Logarithmic,
    Linear,
}

/// Compute `n_bins + 1` edges between `e_min` and `e_max`.
///
/// The outer edges are exactly `e_min` and `e_max`.
pub fn bin_edges(
    e_min: Energy,
    e_max: Energy,
    n_bins: usize,
    spacing: BinSpacing,
) -> Result<Vec<Energy>, DomainError> {
    if n_bins == 0 {
        return Err(DomainError::InvalidBinCount(n_bins));
    }
    let (lo, hi) = (e_min.as_tev(), e_max.as_tev());
    if !(lo > 0.0 && lo.is_finite()) {
        return Err(DomainError::NonPositiveEnergy { energy_tev: lo });
    }
    if !(hi.is_finite() && lo < hi) {
        return Err(DomainError::EmptyEnergyRange {
            e_min_tev: lo,
            e_max_tev: hi,
        });
    }

    let mut edges: Vec<Energy> = (0..=n_bins)
        .map(|i| {
            let t = i as f64 / n_bins as f64;
            let tev = match spacing {
                BinSpacing::Logarithmic => {
                    10f64.powf(lo.log10() + t * (hi.log10() - lo.log10()))
                }
                BinSpacing::Linear => lo + t * (hi - lo),
            };
            Energy::from_tev(tev)
        })
        .collect();
    edges[0] = e_min;
    edges[n_bins] = e_max;
    Ok(edges)
}

/// Ordered energy bin edges defining `n_bins` bins
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBinning {
    edges: Vec<Energy>,
}

impl EnergyBinning {
    /// Create a binning from explicit edges, which must be positive and
    /// strictly increasing
    pub fn new(edges: Vec<Energy>) -> Result<Self, DomainError> {
        if edges.len() < 2 {
            return Err(DomainError::InvalidBinCount(edges.len().saturating_sub(1)));
        }
        for edge in &edges {
            let tev = edge.as_tev();
            if !(tev > 0.0 && tev.is_finite()) {
                return Err(DomainError::NonPositiveEnergy { energy_tev: tev });
            }
        }
        for pair in edges.windows(2) {
            if pair[0] >= pair[1] {
                return Err(DomainError::EmptyEnergyRange {
                    e_min_tev: pair[0].as_tev(),
                    e_max_tev: pair[1].as_tev(),
                });
            }
        }
        Ok(Self { edges })
    }

    pub fn logarithmic(e_min: Energy, e_max: Energy, n_bins: usize) -> Result<Self, DomainError> {
        Self::new(bin_edges(e_min, e_max, n_bins, BinSpacing::Logarithmic)?)
    }

    pub fn linear(e_min: Energy, e_max: Energy, n_bins: usize) -> Result<Self, DomainError> {
        Self::new(bin_edges(e_min, e_max, n_bins, BinSpacing::Linear)?)
    }

    /// Binning over the union energy range of both samples
    pub fn from_samples(
        signal: &SimulatedSample,
        background: &SimulatedSample,
        n_bins: usize,
        spacing: BinSpacing,
    ) -> Result<Self, DomainError> {
        let (e_min, e_max) =
            energy_span(signal.events(), background.events()).ok_or(DomainError::NoEvents)?;
        Self::new(bin_edges(e_min, e_max, n_bins, spacing)?)
    }

    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    #[must_use]
    pub fn edges(&self) -> &[Energy] {
        &self.edges
    }

    /// Lower and upper edge of bin `index`
    #[must_use]
    pub fn bounds(&self, index: usize) -> Option<(Energy, Energy)> {
        Some((*self.edges.get(index)?, *self.edges.get(index + 1)?))
    }

    /// Arithmetic bin centres
    #[must_use]
    pub fn centers(&self) -> Vec<Energy> {
        self.edges
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect()
    }

    #[must_use]
    pub fn widths(&self) -> Vec<Energy> {
        self.edges.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    /// Index of the bin containing `energy`, if any
    #[must_use]
    pub fn bin_index(&self, energy: Energy) -> Option<usize> {
        let n = self.n_bins();
        if energy < self.edges[0] || energy > self.edges[n] {
            return None;
        }
        if energy == self.edges[n] {
            return Some(n - 1);
        }
        // Number of edges <= energy, minus the lower outer edge
        let upper = self.edges.partition_point(|edge| *edge <= energy);
        Some(upper - 1)
    }

    /// Split a sample into one borrowed slice per bin.
    ///
    /// Relies on samples being sorted by energy, which `SimulatedSample`
    /// guarantees.
    #[must_use]
    pub fn partition<'a>(&self, sample: &'a SimulatedSample) -> Vec<&'a [ShowerEvent]> {
        let events = sample.events();
        let n = self.n_bins();
        (0..n)
            .map(|i| {
                let (lo, hi) = (self.edges[i], self.edges[i + 1]);
                let start = events.partition_point(|e| e.energy < lo);
                let end = if i + 1 == n {
                    events.partition_point(|e| e.energy <= hi)
                } else {
                    events.partition_point(|e| e.energy < hi)
                };
                &events[start..end.max(start)]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{SampleKind, ShowerEvent};
    use approx::assert_relative_eq;

    fn event(tev: f64) -> ShowerEvent {
        ShowerEvent {
            energy: Energy::from_tev(tev),
            gammaness: 0.9,
            theta_squared: 0.01,
            weight: 1.0,
        }
    }

    #[test]
    fn test_log_edges() {
        let binning =
            EnergyBinning::logarithmic(Energy::from_tev(0.1), Energy::from_tev(100.0), 3).unwrap();
        let edges: Vec<f64> = binning.edges().iter().map(|e| e.as_tev()).collect();
        assert_eq!(edges.len(), 4);
        assert_relative_eq!(edges[0], 0.1, max_relative = 1e-12);
        assert_relative_eq!(edges[1], 1.0, max_relative = 1e-9);
        assert_relative_eq!(edges[2], 10.0, max_relative = 1e-9);
        assert_relative_eq!(edges[3], 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_binning() {
        let lo = Energy::from_tev(1.0);
        let hi = Energy::from_tev(10.0);
        assert!(EnergyBinning::logarithmic(lo, hi, 0).is_err());
        assert!(EnergyBinning::logarithmic(hi, lo, 2).is_err());
        assert!(EnergyBinning::logarithmic(lo, lo, 2).is_err());
        assert!(EnergyBinning::new(vec![lo, hi, hi]).is_err());
        assert!(EnergyBinning::new(vec![Energy::from_tev(-1.0), hi]).is_err());
    }

    #[test]
    fn test_bin_index_half_open() {
        let binning = EnergyBinning::new(vec![
            Energy::from_tev(1.0),
            Energy::from_tev(2.0),
            Energy::from_tev(4.0),
        ])
        .unwrap();

        assert_eq!(binning.bin_index(Energy::from_tev(0.5)), None);
        assert_eq!(binning.bin_index(Energy::from_tev(1.0)), Some(0));
        assert_eq!(binning.bin_index(Energy::from_tev(1.999)), Some(0));
        assert_eq!(binning.bin_index(Energy::from_tev(2.0)), Some(1));
        // Upper outer edge belongs to the last bin
        assert_eq!(binning.bin_index(Energy::from_tev(4.0)), Some(1));
        assert_eq!(binning.bin_index(Energy::from_tev(4.001)), None);
    }

    #[test]
    fn test_partition_matches_bin_index() {
        let energies = [0.5, 1.0, 1.5, 2.0, 3.0, 4.0, 5.0];
        let sample = SimulatedSample::from_events(
            SampleKind::Signal,
            energies.iter().map(|&e| event(e)).collect(),
        )
        .unwrap();
        let binning = EnergyBinning::new(vec![
            Energy::from_tev(1.0),
            Energy::from_tev(2.0),
            Energy::from_tev(4.0),
        ])
        .unwrap();

        let parts = binning.partition(&sample);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 2); // 1.0, 1.5
        assert_eq!(parts[1].len(), 3); // 2.0, 3.0, 4.0

        for (i, part) in parts.iter().enumerate() {
            for e in part.iter() {
                assert_eq!(binning.bin_index(e.energy), Some(i));
            }
        }
    }

    #[test]
    fn test_from_samples_uses_union_range() {
        let signal =
            SimulatedSample::from_events(SampleKind::Signal, vec![event(1.0), event(2.0)]).unwrap();
        let background =
            SimulatedSample::from_events(SampleKind::Background, vec![event(0.5), event(8.0)])
                .unwrap();

        let binning =
            EnergyBinning::from_samples(&signal, &background, 4, BinSpacing::Logarithmic).unwrap();
        assert_eq!(binning.n_bins(), 4);
        assert_relative_eq!(binning.edges()[0].as_tev(), 0.5, max_relative = 1e-12);
        assert_relative_eq!(binning.edges()[4].as_tev(), 8.0, max_relative = 1e-12);

        let total: usize = binning.partition(&signal).iter().map(|p| p.len()).sum::<usize>()
            + binning.partition(&background).iter().map(|p| p.len()).sum::<usize>();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_from_empty_samples() {
        let empty = SimulatedSample::from_events(SampleKind::Signal, vec![]).unwrap();
        let result = EnergyBinning::from_samples(&empty, &empty, 2, BinSpacing::Logarithmic);
        assert_eq!(result, Err(DomainError::NoEvents));
    }
}
