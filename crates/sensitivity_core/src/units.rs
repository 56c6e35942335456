//! Type-safe physical units for spectra and event samples
//!
//! Energies, areas, times and angles use the `uom` crate so that unit
//! confusion is caught at compile time. Differential flux densities have
//! dimensions `uom` does not model conveniently (1 / (energy area time),
//! optionally per steradian), so they get a small value type with a run-time
//! unit tag instead.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};
use uom::si::angle::{degree, radian};
use uom::si::area::{square_centimeter, square_kilometer, square_meter};
use uom::si::energy::{erg, gigaelectronvolt, teraelectronvolt};
use uom::si::time::{hour, second};

use crate::error::DomainError;

pub type Energy = uom::si::f64::Energy;
pub type Area = uom::si::f64::Area;
pub type Time = uom::si::f64::Time;
pub type Angle = uom::si::f64::Angle;

/// Extension trait for the energy units used in gamma-ray astronomy
pub trait EnergyExt {
    fn from_tev(tev: f64) -> Self;
    fn as_tev(&self) -> f64;
    fn from_gev(gev: f64) -> Self;
    fn as_gev(&self) -> f64;
    fn as_erg(&self) -> f64;
}

impl EnergyExt for Energy {
    fn from_tev(tev: f64) -> Self {
        Energy::new::<teraelectronvolt>(tev)
    }

    fn as_tev(&self) -> f64 {
        self.get::<teraelectronvolt>()
    }

    fn from_gev(gev: f64) -> Self {
        Energy::new::<gigaelectronvolt>(gev)
    }

    fn as_gev(&self) -> f64 {
        self.get::<gigaelectronvolt>()
    }

    fn as_erg(&self) -> f64 {
        self.get::<erg>()
    }
}

/// Extension trait for collection areas
pub trait AreaExt {
    fn from_square_meters(m2: f64) -> Self;
    fn as_square_meters(&self) -> f64;
    fn from_square_centimeters(cm2: f64) -> Self;
    fn as_square_centimeters(&self) -> f64;
    fn from_square_kilometers(km2: f64) -> Self;
}

impl AreaExt for Area {
    fn from_square_meters(m2: f64) -> Self {
        Area::new::<square_meter>(m2)
    }

    fn as_square_meters(&self) -> f64 {
        self.get::<square_meter>()
    }

    fn from_square_centimeters(cm2: f64) -> Self {
        Area::new::<square_centimeter>(cm2)
    }

    fn as_square_centimeters(&self) -> f64 {
        self.get::<square_centimeter>()
    }

    fn from_square_kilometers(km2: f64) -> Self {
        Area::new::<square_kilometer>(km2)
    }
}

/// Extension trait for observation times
pub trait TimeExt {
    fn from_seconds(s: f64) -> Self;
    fn as_seconds(&self) -> f64;
    fn from_hours(h: f64) -> Self;
    fn as_hours(&self) -> f64;
}

impl TimeExt for Time {
    fn from_seconds(s: f64) -> Self {
        Time::new::<second>(s)
    }

    fn as_seconds(&self) -> f64 {
        self.get::<second>()
    }

    fn from_hours(h: f64) -> Self {
        Time::new::<hour>(h)
    }

    fn as_hours(&self) -> f64 {
        self.get::<hour>()
    }
}

/// Extension trait for angles, including the solid angle of a cone
pub trait AngleExt {
    fn from_degrees(deg: f64) -> Self;
    fn as_degrees(&self) -> f64;
    fn as_radians(&self) -> f64;

    /// Solid angle in steradian of a cone with this half-opening angle,
    /// `2π(1 − cos θ)`
    fn cone_solid_angle(&self) -> f64;
}

impl AngleExt for Angle {
    fn from_degrees(deg: f64) -> Self {
        Angle::new::<degree>(deg)
    }

    fn as_degrees(&self) -> f64 {
        self.get::<degree>()
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }

    fn cone_solid_angle(&self) -> f64 {
        2.0 * std::f64::consts::PI * (1.0 - self.as_radians().cos())
    }
}

/// Unit of a differential flux density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FluxUnit {
    /// TeV⁻¹ cm⁻² s⁻¹ (point source)
    PerEnergyAreaTime,
    /// TeV⁻¹ cm⁻² s⁻¹ sr⁻¹ (diffuse emission)
    PerEnergyAreaTimeSolidAngle,
}

impl fmt::Display for FluxUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluxUnit::PerEnergyAreaTime => write!(f, "1 / (TeV cm2 s)"),
            FluxUnit::PerEnergyAreaTimeSolidAngle => write!(f, "1 / (TeV cm2 s sr)"),
        }
    }
}

/// Differential flux density, stored in TeV⁻¹ cm⁻² s⁻¹ (sr⁻¹)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxDensity {
    value: f64,
    unit: FluxUnit,
}

impl FluxDensity {
    #[must_use]
    pub const fn new(value: f64, unit: FluxUnit) -> Self {
        Self { value, unit }
    }

    #[must_use]
    pub const fn per_tev_cm2_s(value: f64) -> Self {
        Self::new(value, FluxUnit::PerEnergyAreaTime)
    }

    #[must_use]
    pub const fn per_tev_cm2_s_sr(value: f64) -> Self {
        Self::new(value, FluxUnit::PerEnergyAreaTimeSolidAngle)
    }

    /// 1 GeV⁻¹ = 1000 TeV⁻¹
    #[must_use]
    pub const fn per_gev_cm2_s(value: f64) -> Self {
        Self::per_tev_cm2_s(value * 1e3)
    }

    #[must_use]
    pub const fn per_gev_cm2_s_sr(value: f64) -> Self {
        Self::per_tev_cm2_s_sr(value * 1e3)
    }

    #[must_use]
    pub fn unit(&self) -> FluxUnit {
        self.unit
    }

    /// Raw value in this density's own unit
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn is_diffuse(&self) -> bool {
        self.unit == FluxUnit::PerEnergyAreaTimeSolidAngle
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }

    fn expect_unit(&self, expected: FluxUnit) -> Result<(), DomainError> {
        if self.unit == expected {
            Ok(())
        } else {
            Err(DomainError::UnitMismatch {
                expected,
                found: self.unit,
            })
        }
    }

    /// Value in TeV⁻¹ cm⁻² s⁻¹; fails for diffuse densities
    pub fn as_per_tev_cm2_s(&self) -> Result<f64, DomainError> {
        self.expect_unit(FluxUnit::PerEnergyAreaTime)?;
        Ok(self.value)
    }

    /// Value in erg⁻¹ cm⁻² s⁻¹; fails for diffuse densities
    pub fn as_per_erg_cm2_s(&self) -> Result<f64, DomainError> {
        let per_tev = self.as_per_tev_cm2_s()?;
        Ok(per_tev / Energy::from_tev(1.0).as_erg())
    }

    /// Energy-squared scaled flux `E² · dN/dE` in erg cm⁻² s⁻¹
    pub fn energy_flux_erg_cm2_s(&self, energy: Energy) -> Result<f64, DomainError> {
        let e_erg = energy.as_erg();
        Ok(self.as_per_erg_cm2_s()? * e_erg * e_erg)
    }

    /// Unit-checked sum
    pub fn checked_add(self, other: FluxDensity) -> Result<FluxDensity, DomainError> {
        other.expect_unit(self.unit)?;
        Ok(Self::new(self.value + other.value, self.unit))
    }
}

impl Mul<f64> for FluxDensity {
    type Output = FluxDensity;

    fn mul(self, rhs: f64) -> FluxDensity {
        FluxDensity::new(self.value * rhs, self.unit)
    }
}

impl Div<f64> for FluxDensity {
    type Output = FluxDensity;

    fn div(self, rhs: f64) -> FluxDensity {
        FluxDensity::new(self.value / rhs, self.unit)
    }
}

/// Flux densities of different units are incomparable
impl PartialOrd for FluxDensity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.unit != other.unit {
            return None;
        }
        self.value.partial_cmp(&other.value)
    }
}

impl fmt::Display for FluxDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e} {}", self.value, self.unit)
    }
}
