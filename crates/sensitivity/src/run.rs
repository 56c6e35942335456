//! Trial loop: draw, reweight, build

use color_eyre::eyre::{Result, bail};

use sensitivity_core::binning::bin_edges;
use sensitivity_core::units::{Energy, EnergyExt};
use sensitivity_core::{
    CurveProgress, EnergyBinning, McProduction, SampleKind, SensitivityConfig, SensitivityCurve,
    SensitivityCurveBuilder, SimulatedSample, Spectrum,
};

use crate::config::RunConfig;
use crate::synthetic::SyntheticSource;

/// Edges over the union of both production ranges.
///
/// Every drawn energy lies inside its production range, so trials binned
/// this way share edges and can be averaged.
fn production_binning(
    config: &SensitivityConfig,
    signal: &McProduction,
    background: &McProduction,
) -> Result<EnergyBinning> {
    let e_min = signal.e_min.as_tev().min(background.e_min.as_tev());
    let e_max = signal.e_max.as_tev().max(background.e_max.as_tev());
    let edges = bin_edges(
        Energy::from_tev(e_min),
        Energy::from_tev(e_max),
        config.n_bins,
        config.spacing,
    )?;
    Ok(EnergyBinning::new(edges)?)
}

/// Build one sensitivity curve per trial, each from freshly drawn samples.
///
/// Trial `i` draws from seed `seed + i`, so a run is reproducible and its
/// trials independent. All trials share one binning.
pub fn run(config: &RunConfig, progress: Option<CurveProgress>) -> Result<Vec<SensitivityCurve>> {
    if config.trials == 0 {
        bail!("trials must be at least 1");
    }
    config.sensitivity.validate()?;

    let signal_spectrum = Spectrum::new(&config.signal_spectrum)?;
    let background_spectrum = Spectrum::new(&config.background_spectrum)?;
    let signal_production = config.signal.production();
    let background_production = config.background.production();
    signal_production.validate()?;
    background_production.validate()?;
    let t_obs = config.sensitivity.observation_time();

    let binning =
        production_binning(&config.sensitivity, &signal_production, &background_production)?;
    let mut builder = SensitivityCurveBuilder::new(config.sensitivity).with_binning(binning);
    if let Some(progress) = progress {
        builder = builder.with_progress(progress);
    }

    let mut curves = Vec::with_capacity(config.trials);
    for trial in 0..config.trials {
        let seed = config.seed.wrapping_add(trial as u64);
        let mut source = SyntheticSource::new(config.response, seed);

        let gamma_table =
            source.event_table(SampleKind::Signal, &signal_production, config.signal.n_events)?;
        let proton_table = source.event_table(
            SampleKind::Background,
            &background_production,
            config.background.n_events,
        )?;

        let signal = SimulatedSample::reweighted(
            SampleKind::Signal,
            &gamma_table,
            &signal_production,
            &signal_spectrum,
            t_obs,
        )?;
        let background = SimulatedSample::reweighted(
            SampleKind::Background,
            &proton_table,
            &background_production,
            &background_spectrum,
            t_obs,
        )?;

        let curve = builder.build(&signal, &background, &signal_spectrum)?;
        tracing::info!(
            trial,
            seed,
            determined = curve.n_determined(),
            n_bins = curve.outcomes().len(),
            "trial finished"
        );
        curves.push(curve);
    }

    Ok(curves)
}
