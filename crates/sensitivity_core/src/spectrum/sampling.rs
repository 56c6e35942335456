use rand::Rng;

use crate::error::DomainError;
use crate::units::{Energy, EnergyExt};

use super::validate_range;

/// Draw `n` energies from a power law with `index` between `e_min` and
/// `e_max` by inverting its cumulative distribution.
pub fn draw_power_law<R: Rng + ?Sized>(
    rng: &mut R,
    e_min: Energy,
    e_max: Energy,
    n: usize,
    index: f64,
) -> Result<Vec<Energy>, DomainError> {
    validate_range(e_min, e_max)?;
    if !index.is_finite() || (index + 1.0).abs() < 1e-9 {
        return Err(DomainError::UnsupportedSpectralIndex(index));
    }

    let k = index + 1.0;
    let a = e_min.as_tev().powf(k);
    let b = e_max.as_tev().powf(k);
    let (lo, hi) = (e_min.as_tev(), e_max.as_tev());

    Ok((0..n)
        .map(|_| {
            let r: f64 = rng.random();
            // Rounding can push the inverse a hair outside the range
            let tev = (a + (b - a) * r).powf(1.0 / k).clamp(lo, hi);
            Energy::from_tev(tev)
        })
        .collect())
}
