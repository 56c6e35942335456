use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;

use sensitivity::{CurveReport, OutputFormat, Overrides, RunConfig, init_logging, run};

#[derive(Parser, Debug)]
#[command(name = "sensitivity")]
#[command(about = "Differential point-source sensitivity of a Cherenkov telescope array")]
struct Args {
    /// YAML run file; built-in defaults when omitted
    config: Option<PathBuf>,

    /// Number of energy bins
    #[arg(short, long)]
    n_bins: Option<usize>,

    /// Worker threads for the per-bin optimization
    #[arg(short, long)]
    workers: Option<usize>,

    /// Independent trials to average over
    #[arg(short, long)]
    trials: Option<usize>,

    /// Seed of the first trial
    #[arg(short, long)]
    seed: Option<u64>,

    /// Observation time in hours
    #[arg(long)]
    hours: Option<f64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also append logs to sensitivity.log in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _guard = init_logging(&args.log_level, args.log_dir.as_deref())?;

    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    Overrides {
        n_bins: args.n_bins,
        workers: args.workers,
        trials: args.trials,
        seed: args.seed,
        observation_time_hours: args.hours,
    }
    .apply(&mut config);

    tracing::info!(
        n_bins = config.sensitivity.n_bins,
        trials = config.trials,
        seed = config.seed,
        hours = config.sensitivity.observation_time_hours,
        "starting run"
    );

    let curves = run(&config, None)?;
    let report = CurveReport::from_curves(&curves, config.sensitivity.observation_time_hours)?;
    let rendered = report.render(args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .wrap_err_with(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
