//! Synthetic event tables
//!
//! Stands in for the instrument's DL2 reader: energies follow the production
//! power law, classifier scores a Beta distribution per particle type, and
//! theta² is exponential for gamma rays around the source and flat for
//! protons.

use color_eyre::eyre::{Result, eyre};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::{Beta, Distribution, Exp, Uniform};

use sensitivity_core::spectrum::draw_power_law;
use sensitivity_core::units::EnergyExt;
use sensitivity_core::{EventTable, McProduction, SampleKind};

use crate::config::{BetaShape, ResponseConfig};

fn beta(shape: BetaShape) -> Result<Beta<f64>> {
    Beta::new(shape.alpha, shape.beta).map_err(|e| {
        eyre!(
            "invalid gammaness distribution Beta({}, {}): {e}",
            shape.alpha,
            shape.beta
        )
    })
}

pub struct SyntheticSource {
    response: ResponseConfig,
    rng: SmallRng,
}

impl SyntheticSource {
    #[must_use]
    pub fn new(response: ResponseConfig, seed: u64) -> Self {
        Self {
            response,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Draw `n_events` rows for `kind` from `production`
    pub fn event_table(
        &mut self,
        kind: SampleKind,
        production: &McProduction,
        n_events: usize,
    ) -> Result<EventTable> {
        let energy: Vec<f64> = draw_power_law(
            &mut self.rng,
            production.e_min,
            production.e_max,
            n_events,
            production.spectral_index,
        )?
        .into_iter()
        .map(|e| e.as_tev())
        .collect();

        let shape = match kind {
            SampleKind::Signal => self.response.signal_gammaness,
            SampleKind::Background => self.response.background_gammaness,
        };
        let scores = beta(shape)?;
        let gammaness: Vec<f64> = (0..n_events)
            .map(|_| scores.sample(&mut self.rng))
            .collect();

        let theta_deg_squared: Vec<f64> = match kind {
            SampleKind::Signal => {
                let mean = self.response.psf_theta2_deg2;
                let psf = Exp::new(1.0 / mean)
                    .map_err(|e| eyre!("invalid point spread mean {mean} deg²: {e}"))?;
                (0..n_events).map(|_| psf.sample(&mut self.rng)).collect()
            }
            SampleKind::Background => {
                let max = self.response.background_max_theta_deg;
                let flat = Uniform::new_inclusive(0.0, max * max)
                    .map_err(|e| eyre!("invalid background extent {max} deg: {e}"))?;
                (0..n_events).map(|_| flat.sample(&mut self.rng)).collect()
            }
        };
        let theta_deg = theta_deg_squared.iter().map(|t2| t2.sqrt()).collect();

        tracing::debug!(?kind, n_events, "drew synthetic event table");
        Ok(EventTable::new(energy, gammaness, theta_deg, theta_deg_squared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensitivity_core::units::{Area, AreaExt, Energy};

    fn production() -> McProduction {
        McProduction::new(
            10_000,
            Energy::from_tev(0.1),
            Energy::from_tev(10.0),
            Area::from_square_meters(1e5),
            -2.0,
        )
    }

    #[test]
    fn test_same_seed_same_table() {
        let mut a = SyntheticSource::new(ResponseConfig::default(), 5);
        let mut b = SyntheticSource::new(ResponseConfig::default(), 5);
        let first = a.event_table(SampleKind::Signal, &production(), 500).unwrap();
        let second = b.event_table(SampleKind::Signal, &production(), 500).unwrap();
        assert_eq!(first, second);

        let mut c = SyntheticSource::new(ResponseConfig::default(), 6);
        let third = c.event_table(SampleKind::Signal, &production(), 500).unwrap();
        assert_ne!(first, third);
    }

    #[test]
    fn test_columns_are_valid() {
        let mut source = SyntheticSource::new(ResponseConfig::default(), 1);
        for kind in [SampleKind::Signal, SampleKind::Background] {
            let table = source.event_table(kind, &production(), 2_000).unwrap();
            assert_eq!(table.len(), 2_000);
            assert!(table.validate().is_ok());
            assert!(table.energy.iter().all(|e| (0.1..=10.0).contains(e)));
            assert!(table.gammaness.iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn test_background_is_wider_than_signal() {
        let mut source = SyntheticSource::new(ResponseConfig::default(), 2);
        let signal = source.event_table(SampleKind::Signal, &production(), 2_000).unwrap();
        let background = source
            .event_table(SampleKind::Background, &production(), 2_000)
            .unwrap();

        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        assert!(mean(&background.theta_deg_squared) > 100.0 * mean(&signal.theta_deg_squared));
        assert!(mean(&signal.gammaness) > mean(&background.gammaness));
        assert!(background.theta_deg.iter().all(|t| *t <= 6.0));
    }

    #[test]
    fn test_bad_shape_is_reported() {
        let response = ResponseConfig {
            signal_gammaness: BetaShape {
                alpha: -1.0,
                beta: 1.0,
            },
            ..ResponseConfig::default()
        };
        let mut source = SyntheticSource::new(response, 0);
        assert!(source.event_table(SampleKind::Signal, &production(), 10).is_err());
    }
}
