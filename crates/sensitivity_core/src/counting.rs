//! On/off region counting with a theta² cut
//!
//! The on region is everything closer than the angular cut. The background
//! is estimated by assuming its rate is flat in theta² near the source: the
//! theta² distribution of the selected background is histogrammed over a
//! fixed outer extent with bins as wide as the cut, and the mean bin content
//! is taken as `n_off`. Averaging over many bins gives a far more stable
//! estimate than counting the single bin at the source.
//!
//! The outer extent does not depend on the cut.

use serde::{Deserialize, Serialize};

use crate::error::InsufficientDataError;
use crate::events::ShowerEvent;

/// Outer theta² extent (deg²) of the off-region histogram
pub const DEFAULT_OFF_REGION_EXTENT: f64 = 0.2;

/// Weighted event counts in the on and off regions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnOffCounts {
    pub n_on: f64,
    pub n_off: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionCounter {
    /// theta² extent in deg² averaged over for `n_off`
    pub off_region_extent: f64,
}

impl Default for RegionCounter {
    fn default() -> Self {
        Self {
            off_region_extent: DEFAULT_OFF_REGION_EXTENT,
        }
    }
}

impl RegionCounter {
    #[must_use]
    pub fn new(off_region_extent: f64) -> Self {
        Self { off_region_extent }
    }

    /// Weighted number of signal events with `theta² < angular_cut`
    #[must_use]
    pub fn on_counts(&self, signal: &[&ShowerEvent], angular_cut: f64) -> f64 {
        signal
            .iter()
            .filter(|e| e.theta_squared < angular_cut)
            .map(|e| e.weight)
            .sum()
    }

    /// Mean content of the weighted background theta² histogram with bin
    /// width `angular_cut` over `[0, off_region_extent)`
    pub fn off_counts(
        &self,
        background: &[&ShowerEvent],
        angular_cut: f64,
    ) -> Result<f64, InsufficientDataError> {
        if background.is_empty() {
            return Err(InsufficientDataError::EmptyBackground);
        }
        let n_bins = self.histogram_bins(angular_cut)?;
        let last_edge = n_bins as f64 * angular_cut;

        let mut total = 0.0;
        for event in background {
            let t = event.theta_squared;
            // Last bin is closed on the right
            if (0.0..=last_edge).contains(&t) {
                total += event.weight;
            }
        }

        let n_off = total / n_bins as f64;
        if !n_off.is_finite() {
            return Err(InsufficientDataError::NonFiniteCounts {
                n_on: f64::NAN,
                n_off,
            });
        }
        if n_off <= 0.0 {
            return Err(InsufficientDataError::ZeroBackgroundRate);
        }
        Ok(n_off)
    }

    /// Number of histogram bins for a cut: the edges are `0, cut, 2·cut, …`
    /// up to but excluding the outer extent
    fn histogram_bins(&self, angular_cut: f64) -> Result<usize, InsufficientDataError> {
        if !(angular_cut > 0.0 && angular_cut.is_finite()) {
            return Err(InsufficientDataError::NoOffRegionBins { angular_cut });
        }
        let n_edges = (self.off_region_extent / angular_cut).ceil() as usize;
        if n_edges < 2 {
            return Err(InsufficientDataError::NoOffRegionBins { angular_cut });
        }
        Ok(n_edges - 1)
    }

    /// On and off counts for already selected events
    ///
    /// A zero angular cut has an empty on region (`n_on = 0`) but also no
    /// off-region histogram bins, so it returns `NoOffRegionBins` rather
    /// than counts.
    pub fn count(
        &self,
        selected_background: &[&ShowerEvent],
        selected_signal: &[&ShowerEvent],
        angular_cut: f64,
    ) -> Result<OnOffCounts, InsufficientDataError> {
        let n_off = self.off_counts(selected_background, angular_cut)?;
        let n_on = self.on_counts(selected_signal, angular_cut);
        if !n_on.is_finite() {
            return Err(InsufficientDataError::NonFiniteCounts { n_on, n_off });
        }
        Ok(OnOffCounts { n_on, n_off })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Energy, EnergyExt};
    use approx::assert_relative_eq;

    fn events(theta_squared: &[f64], weights: &[f64]) -> Vec<ShowerEvent> {
        theta_squared
            .iter()
            .zip(weights)
            .map(|(&t, &w)| ShowerEvent {
                energy: Energy::from_tev(1.0),
                gammaness: 0.9,
                theta_squared: t,
                weight: w,
            })
            .collect()
    }

    #[test]
    fn test_on_counts_strict_cut() {
        let signal = events(&[0.001, 0.005, 0.01, 0.02], &[1.0, 2.0, 4.0, 8.0]);
        let refs: Vec<&ShowerEvent> = signal.iter().collect();
        let counter = RegionCounter::default();

        assert_relative_eq!(counter.on_counts(&refs, 0.01), 3.0);
        assert_relative_eq!(counter.on_counts(&refs, 0.1), 15.0);
    }

    #[test]
    fn test_on_counts_zero_cut_is_empty() {
        let signal = events(&[0.0, 0.0, 0.001], &[1.0, 1.0, 1.0]);
        let refs: Vec<&ShowerEvent> = signal.iter().collect();
        assert_eq!(RegionCounter::default().on_counts(&refs, 0.0), 0.0);
    }

    #[test]
    fn test_off_counts_is_histogram_mean() {
        // Width 0.05 gives edges 0, 0.05, 0.1, 0.15 and three bins
        let background = events(&[0.01, 0.07, 0.12, 0.3], &[1.0, 1.0, 1.0, 1.0]);
        let refs: Vec<&ShowerEvent> = background.iter().collect();
        let n_off = RegionCounter::default().off_counts(&refs, 0.05).unwrap();
        assert_relative_eq!(n_off, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_off_counts_uses_weights() {
        let background = events(&[0.01, 0.03], &[2.0, 4.0]);
        let refs: Vec<&ShowerEvent> = background.iter().collect();
        // Width 0.1 gives edges 0, 0.1 and a single bin
        let n_off = RegionCounter::default().off_counts(&refs, 0.1).unwrap();
        assert_relative_eq!(n_off, 6.0, max_relative = 1e-12);
    }

    #[test]
    fn test_off_counts_degenerate() {
        let counter = RegionCounter::default();
        assert_eq!(
            counter.off_counts(&[], 0.01),
            Err(InsufficientDataError::EmptyBackground)
        );

        let background = events(&[0.5], &[1.0]);
        let refs: Vec<&ShowerEvent> = background.iter().collect();
        assert_eq!(
            counter.off_counts(&refs, 0.01),
            Err(InsufficientDataError::ZeroBackgroundRate)
        );
        assert!(matches!(
            counter.off_counts(&refs, 0.0),
            Err(InsufficientDataError::NoOffRegionBins { .. })
        ));
        assert!(matches!(
            counter.off_counts(&refs, 0.25),
            Err(InsufficientDataError::NoOffRegionBins { .. })
        ));
    }

    #[test]
    fn test_count_combines_regions() {
        let signal = events(&[0.001, 0.02], &[1.0, 1.0]);
        let background = events(&[0.015, 0.05, 0.11], &[1.0, 1.0, 1.0]);
        let s: Vec<&ShowerEvent> = signal.iter().collect();
        let b: Vec<&ShowerEvent> = background.iter().collect();

        let counts = RegionCounter::default().count(&b, &s, 0.01).unwrap();
        assert_relative_eq!(counts.n_on, 1.0);
        // 20 edges from 0 to 0.19, so 19 bins holding three events
        assert_relative_eq!(counts.n_off, 3.0 / 19.0, max_relative = 1e-12);
    }

    #[test]
    fn test_count_with_zero_cut_has_no_off_region() {
        let signal = events(&[0.0, 0.001], &[1.0, 1.0]);
        let background = events(&[0.015, 0.05], &[1.0, 1.0]);
        let s: Vec<&ShowerEvent> = signal.iter().collect();
        let b: Vec<&ShowerEvent> = background.iter().collect();
        let counter = RegionCounter::default();

        assert_eq!(counter.on_counts(&s, 0.0), 0.0);
        assert_eq!(
            counter.count(&b, &s, 0.0),
            Err(InsufficientDataError::NoOffRegionBins { angular_cut: 0.0 })
        );
    }
}
