//! Power-law flux models
//!
//! A spectrum `dN/dE = N · (E / E_ref)^Γ` is used three ways:
//! - to evaluate the differential flux a sensitivity is expressed in
//! - to integrate expected event counts analytically
//! - to reweight simulated showers from their generation spectrum to it
//!
//! Diffuse spectra (cosmic rays) carry a generator solid angle; their
//! normalization is per steradian and event counts include the solid angle of
//! the generation cone.

mod binned;
mod production;
mod sampling;

pub use binned::{BinnedExpectedEvents, ExpectedEventsPerBin};
pub use production::McProduction;
pub use sampling::draw_power_law;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::units::{
    Angle, AngleExt, Area, AreaExt, Energy, EnergyExt, FluxDensity, FluxUnit, Time, TimeExt,
};

fn default_reference_energy_tev() -> f64 {
    1.0
}

/// Parameters of a power-law spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumParameters {
    /// Spectral index Γ (negative)
    pub index: f64,
    /// Flux density at the reference energy, in TeV⁻¹ cm⁻² s⁻¹, or
    /// TeV⁻¹ cm⁻² s⁻¹ sr⁻¹ when a generator solid angle is set
    pub normalization: f64,
    /// Half-opening angle of the generation cone for diffuse spectra
    #[serde(default)]
    pub generator_solid_angle_deg: Option<f64>,
    #[serde(default = "default_reference_energy_tev")]
    pub reference_energy_tev: f64,
}

impl SpectrumParameters {
    /// Crab Nebula as measured by HEGRA
    #[must_use]
    pub const fn crab() -> Self {
        Self {
            index: -2.62,
            normalization: 2.83e-11,
            generator_solid_angle_deg: None,
            reference_energy_tev: 1.0,
        }
    }

    /// Diffuse cosmic-ray protons thrown into a 6° cone
    #[must_use]
    pub const fn cosmic_ray() -> Self {
        Self {
            index: -2.7,
            normalization: 9.6e-6,
            generator_solid_angle_deg: Some(6.0),
            reference_energy_tev: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spectrum {
    index: f64,
    normalization: FluxDensity,
    reference: Energy,
    generator_solid_angle: Option<Angle>,
}

impl Spectrum {
    pub fn new(params: &SpectrumParameters) -> Result<Self, DomainError> {
        if !params.index.is_finite() || (params.index + 1.0).abs() < 1e-9 {
            return Err(DomainError::UnsupportedSpectralIndex(params.index));
        }
        if !(params.normalization > 0.0 && params.normalization.is_finite()) {
            return Err(DomainError::InvalidParameter {
                name: "normalization",
                value: params.normalization,
                reason: "must be positive and finite",
            });
        }
        if !(params.reference_energy_tev > 0.0 && params.reference_energy_tev.is_finite()) {
            return Err(DomainError::NonPositiveEnergy {
                energy_tev: params.reference_energy_tev,
            });
        }
        if let Some(deg) = params.generator_solid_angle_deg
            && !(deg > 0.0 && deg <= 180.0)
        {
            return Err(DomainError::InvalidParameter {
                name: "generator_solid_angle_deg",
                value: deg,
                reason: "must be in (0, 180]",
            });
        }
        Ok(Self::from_valid(params))
    }

    fn from_valid(params: &SpectrumParameters) -> Self {
        let unit = if params.generator_solid_angle_deg.is_some() {
            FluxUnit::PerEnergyAreaTimeSolidAngle
        } else {
            FluxUnit::PerEnergyAreaTime
        };
        Self {
            index: params.index,
            normalization: FluxDensity::new(params.normalization, unit),
            reference: Energy::from_tev(params.reference_energy_tev),
            generator_solid_angle: params.generator_solid_angle_deg.map(Angle::from_degrees),
        }
    }

    #[must_use]
    pub fn crab() -> Self {
        Self::from_valid(&SpectrumParameters::crab())
    }

    #[must_use]
    pub fn cosmic_ray() -> Self {
        Self::from_valid(&SpectrumParameters::cosmic_ray())
    }

    #[must_use]
    pub fn index(&self) -> f64 {
        self.index
    }

    #[must_use]
    pub fn normalization(&self) -> FluxDensity {
        self.normalization
    }

    #[must_use]
    pub fn reference_energy(&self) -> Energy {
        self.reference
    }

    #[must_use]
    pub fn generator_solid_angle(&self) -> Option<Angle> {
        self.generator_solid_angle
    }

    #[must_use]
    pub fn is_diffuse(&self) -> bool {
        self.generator_solid_angle.is_some()
    }

    /// Differential flux at `energy`
    pub fn flux(&self, energy: Energy) -> Result<FluxDensity, DomainError> {
        let tev = energy.as_tev();
        if !(tev > 0.0 && tev.is_finite()) {
            return Err(DomainError::NonPositiveEnergy { energy_tev: tev });
        }
        let x = tev / self.reference.as_tev();
        Ok(self.normalization * x.powf(self.index))
    }

    /// Number of events expected in `[e_min, e_max]` for collection area
    /// `area` and observation time `t_obs`
    pub fn expected_events(
        &self,
        e_min: Energy,
        e_max: Energy,
        area: Area,
        t_obs: Time,
    ) -> Result<f64, DomainError> {
        validate_range(e_min, e_max)?;
        validate_exposure(area, t_obs)?;
        Ok(self.expected_events_unchecked(e_min, e_max, area, t_obs))
    }

    pub(crate) fn expected_events_unchecked(
        &self,
        e_min: Energy,
        e_max: Energy,
        area: Area,
        t_obs: Time,
    ) -> f64 {
        let events =
            self.integral(e_min, e_max) * area.as_square_centimeters() * t_obs.as_seconds();
        match self.generator_solid_angle {
            Some(angle) => events * angle.cone_solid_angle(),
            None => events,
        }
    }

    /// `∫ dN/dE dE` over `[e_min, e_max]` in cm⁻² s⁻¹ (sr⁻¹)
    fn integral(&self, e_min: Energy, e_max: Energy) -> f64 {
        let e_ref = self.reference.as_tev();
        let a = e_min.as_tev() / e_ref;
        let b = e_max.as_tev() / e_ref;
        let k = self.index + 1.0;
        self.normalization.value() * e_ref * (b.powf(k) - a.powf(k)) / k
    }

    /// Expected events per energy bin between `e_min` and `e_max`
    pub fn expected_events_per_bin(
        &self,
        e_min: Energy,
        e_max: Energy,
        area: Area,
        t_obs: Time,
        n_bins: usize,
        spacing: crate::binning::BinSpacing,
    ) -> Result<ExpectedEventsPerBin<'_>, DomainError> {
        validate_exposure(area, t_obs)?;
        let edges = crate::binning::bin_edges(e_min, e_max, n_bins, spacing)?;
        Ok(ExpectedEventsPerBin::new(self, edges, area, t_obs))
    }

    /// Weights turning a simulated sample into expected events per second
    pub fn weight(
        &self,
        energies: &[Energy],
        production: &McProduction,
    ) -> Result<Vec<f64>, DomainError> {
        self.weight_for_observation(energies, production, Time::from_seconds(1.0))
    }

    /// Weights turning a simulated sample into expected events during `t_obs`.
    ///
    /// Each shower gets `(E / E_ref)^(Γ − Γ_sim)`, normalized so that the
    /// weights sum to `(N_events / N_simulated) · expected_events` over the
    /// production's energy range.
    pub fn weight_for_observation(
        &self,
        energies: &[Energy],
        production: &McProduction,
        t_obs: Time,
    ) -> Result<Vec<f64>, DomainError> {
        production.validate()?;
        if energies.is_empty() {
            return Ok(Vec::new());
        }

        let expected = self.expected_events(production.e_min, production.e_max, production.area, t_obs)?;

        let e_ref = self.reference.as_tev();
        let exponent = self.index - production.spectral_index;
        let raw = energies
            .iter()
            .map(|energy| {
                let tev = energy.as_tev();
                if tev > 0.0 && tev.is_finite() {
                    Ok((tev / e_ref).powf(exponent))
                } else {
                    Err(DomainError::NonPositiveEnergy { energy_tev: tev })
                }
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let raw_sum: f64 = raw.iter().sum();
        let total = (energies.len() as f64 / production.n_simulated) * expected;
        let weights: Vec<f64> = raw.iter().map(|w| total * w / raw_sum).collect();

        debug_assert!(
            (weights.iter().sum::<f64>() - total).abs() <= 1e-9 * total.abs(),
            "weights must sum to the expected event count"
        );
        Ok(weights)
    }

    /// Draw energies following this spectrum
    pub fn draw_energies<R: rand::Rng + ?Sized>(
        &self,
        rng: &mut R,
        e_min: Energy,
        e_max: Energy,
        n: usize,
    ) -> Result<Vec<Energy>, DomainError> {
        draw_power_law(rng, e_min, e_max, n, self.index)
    }
}

pub(crate) fn validate_range(e_min: Energy, e_max: Energy) -> Result<(), DomainError> {
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
    Ok(())
}

fn validate_exposure(area: Area, t_obs: Time) -> Result<(), DomainError> {
    let cm2 = area.as_square_centimeters();
    if !(cm2 > 0.0 && cm2.is_finite()) {
        return Err(DomainError::InvalidParameter {
            name: "area",
            value: area.as_square_meters(),
            reason: "collection area must be positive",
        });
    }
    let s = t_obs.as_seconds();
    if !(s > 0.0 && s.is_finite()) {
        return Err(DomainError::InvalidParameter {
            name: "t_obs",
            value: s,
            reason: "observation time must be positive",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_m2() -> Area {
        Area::from_square_meters(1.0)
    }

    #[test]
    fn test_crab_flux_at_reference() {
        let crab = Spectrum::crab();
        let flux = crab.flux(Energy::from_tev(1.0)).unwrap();
        assert_relative_eq!(flux.as_per_tev_cm2_s().unwrap(), 2.83e-11, max_relative = 1e-12);

        let flux_10 = crab.flux(Energy::from_tev(10.0)).unwrap();
        assert_relative_eq!(
            flux_10.value(),
            2.83e-11 * 10f64.powf(-2.62),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_diffuse_flux_is_per_steradian() {
        let cr = Spectrum::cosmic_ray();
        let flux = cr.flux(Energy::from_tev(1.0)).unwrap();
        assert!(flux.is_diffuse());
        assert!(flux.as_per_tev_cm2_s().is_err());
    }

    #[test]
    fn test_flux_rejects_non_positive_energy() {
        let crab = Spectrum::crab();
        assert!(matches!(
            crab.flux(Energy::from_tev(0.0)),
            Err(DomainError::NonPositiveEnergy { .. })
        ));
        assert!(crab.flux(Energy::from_tev(-1.0)).is_err());
    }

    #[test]
    fn test_index_minus_one_rejected() {
        let params = SpectrumParameters {
            index: -1.0,
            ..SpectrumParameters::crab()
        };
        assert_eq!(
            Spectrum::new(&params),
            Err(DomainError::UnsupportedSpectralIndex(-1.0))
        );
    }

    #[test]
    fn test_expected_events_closed_form() {
        // N · 1 TeV · (10^-1.62 − 1) / −1.62 · 1e4 cm² · 1 s
        let crab = Spectrum::crab();
        let events = crab
            .expected_events(
                Energy::from_tev(1.0),
                Energy::from_tev(10.0),
                one_m2(),
                Time::from_seconds(1.0),
            )
            .unwrap();
        assert_relative_eq!(events, 1.705_01e-7, max_relative = 1e-4);
    }

    #[test]
    fn test_expected_events_diffuse_includes_cone() {
        let cr = Spectrum::cosmic_ray();
        let point_like = Spectrum::new(&SpectrumParameters {
            generator_solid_angle_deg: None,
            ..SpectrumParameters::cosmic_ray()
        })
        .unwrap();

        let args = (
            Energy::from_tev(0.1),
            Energy::from_tev(10.0),
            one_m2(),
            Time::from_seconds(1.0),
        );
        let diffuse = cr.expected_events(args.0, args.1, args.2, args.3).unwrap();
        let point = point_like.expected_events(args.0, args.1, args.2, args.3).unwrap();
        assert_relative_eq!(
            diffuse / point,
            Angle::from_degrees(6.0).cone_solid_angle(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_expected_events_invalid_input() {
        let crab = Spectrum::crab();
        let t = Time::from_seconds(1.0);
        let e1 = Energy::from_tev(1.0);
        let e2 = Energy::from_tev(2.0);

        assert!(crab.expected_events(e2, e1, one_m2(), t).is_err());
        assert!(crab.expected_events(e1, e1, one_m2(), t).is_err());
        assert!(crab.expected_events(Energy::from_tev(0.0), e2, one_m2(), t).is_err());
        assert!(crab.expected_events(e1, e2, Area::from_square_meters(0.0), t).is_err());
        assert!(crab.expected_events(e1, e2, one_m2(), Time::from_seconds(-1.0)).is_err());
    }

    #[test]
    fn test_weights_sum_to_expected_events() {
        let crab = Spectrum::crab();
        let production = McProduction::new(
            4,
            Energy::from_tev(0.1),
            Energy::from_tev(100.0),
            Area::from_square_kilometers(1.0),
            -2.0,
        );
        let energies: Vec<Energy> = [0.2, 1.0, 5.0, 40.0]
            .iter()
            .map(|&e| Energy::from_tev(e))
            .collect();

        let weights = crab.weight(&energies, &production).unwrap();
        let expected = crab
            .expected_events(
                production.e_min,
                production.e_max,
                production.area,
                Time::from_seconds(1.0),
            )
            .unwrap();
        assert_relative_eq!(weights.iter().sum::<f64>(), expected, max_relative = 1e-9);

        // Steeper target than generation spectrum: low energies gain weight
        assert!(weights[0] > weights[1]);
        assert!(weights[2] > weights[3]);
    }

    #[test]
    fn test_weights_scale_with_sample_fraction_and_time() {
        let crab = Spectrum::crab();
        let production = McProduction::new(
            10,
            Energy::from_tev(0.1),
            Energy::from_tev(100.0),
            Area::from_square_meters(1e5),
            -2.0,
        );
        let energies = vec![Energy::from_tev(1.0); 5];
        let one_second = crab.weight(&energies, &production).unwrap();
        let expected = crab
            .expected_events(
                production.e_min,
                production.e_max,
                production.area,
                Time::from_seconds(1.0),
            )
            .unwrap();
        // Only half of the simulated showers are present
        assert_relative_eq!(one_second.iter().sum::<f64>(), 0.5 * expected, max_relative = 1e-9);

        let one_hour = crab
            .weight_for_observation(&energies, &production, Time::from_hours(1.0))
            .unwrap();
        assert_relative_eq!(
            one_hour.iter().sum::<f64>(),
            3600.0 * one_second.iter().sum::<f64>(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_weight_empty_and_invalid() {
        let crab = Spectrum::crab();
        let production = McProduction::new(
            10,
            Energy::from_tev(0.1),
            Energy::from_tev(100.0),
            one_m2(),
            -2.0,
        );
        assert!(crab.weight(&[], &production).unwrap().is_empty());
        assert!(crab.weight(&[Energy::from_tev(0.0)], &production).is_err());

        let no_showers = McProduction {
            n_simulated: 0.0,
            ..production
        };
        assert!(crab.weight(&[Energy::from_tev(1.0)], &no_showers).is_err());
    }
}
