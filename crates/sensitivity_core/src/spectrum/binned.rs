use std::iter::FusedIterator;

use crate::units::{Area, Energy, Time};

use super::Spectrum;

/// Expected events of a spectrum in consecutive energy bins.
///
/// Counts are computed lazily; `iter` can be called any number of times.
#[derive(Debug, Clone)]
pub struct ExpectedEventsPerBin<'a> {
    spectrum: &'a Spectrum,
    edges: Vec<Energy>,
    area: Area,
    t_obs: Time,
}

impl<'a> ExpectedEventsPerBin<'a> {
    pub(super) fn new(spectrum: &'a Spectrum, edges: Vec<Energy>, area: Area, t_obs: Time) -> Self {
        Self {
            spectrum,
            edges,
            area,
            t_obs,
        }
    }

    /// The `n_bins + 1` bin edges
    #[must_use]
    pub fn edges(&self) -> &[Energy] {
        &self.edges
    }

    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    #[must_use]
    pub fn iter(&self) -> BinnedExpectedEvents<'_> {
        BinnedExpectedEvents {
            source: self,
            next: 0,
        }
    }

    #[must_use]
    pub fn counts(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

impl<'s, 'a> IntoIterator for &'s ExpectedEventsPerBin<'a> {
    type Item = f64;
    type IntoIter = BinnedExpectedEvents<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct BinnedExpectedEvents<'s> {
    source: &'s ExpectedEventsPerBin<'s>,
    next: usize,
}

impl Iterator for BinnedExpectedEvents<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let source = self.source;
        if self.next >= source.n_bins() {
            return None;
        }
        let (lo, hi) = (source.edges[self.next], source.edges[self.next + 1]);
        self.next += 1;
        // Edges and exposure were validated when the binning was created
        Some(
            source
                .spectrum
                .expected_events_unchecked(lo, hi, source.area, source.t_obs),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.n_bins().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BinnedExpectedEvents<'_> {}

impl FusedIterator for BinnedExpectedEvents<'_> {}
