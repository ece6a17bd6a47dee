//! Wind-plant electrical losses entry point: CLI wiring and report output.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wind_losses::LossError;
use wind_losses::config::AnalysisConfig;
use wind_losses::io::export::{export_monthly_csv, export_trials_csv};
use wind_losses::io::import::{read_meter_csv, read_scada_csv};
use wind_losses::losses::{ElectricalLosses, LossSummary};
use wind_losses::plant::{AnalysisType, PlantData};

/// Estimate average electrical losses from SCADA and revenue-meter energy.
#[derive(Debug, Parser)]
#[command(name = "wind-losses", version)]
struct Args {
    /// SCADA CSV with columns `time,asset_id,energy_kwh`
    #[arg(long)]
    scada: PathBuf,

    /// Revenue-meter CSV with columns `time,energy_kwh`
    #[arg(long)]
    meter: PathBuf,

    /// Load analysis configuration from a TOML file
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Use a built-in preset (baseline, monte_carlo)
    #[arg(long)]
    preset: Option<String>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of Monte Carlo trials
    #[arg(long)]
    num_sim: Option<usize>,

    /// Export per-trial losses to CSV
    #[arg(long)]
    losses_out: Option<PathBuf>,

    /// Export the monthly loss series to CSV
    #[arg(long)]
    monthly_out: Option<PathBuf>,

    /// Print the summary as JSON on stdout instead of text
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<AnalysisConfig, LossError> {
    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => AnalysisConfig::from_toml_file(path),
        (None, Some(name)) => AnalysisConfig::from_preset(name),
        (None, None) => Ok(AnalysisConfig::baseline()),
    }
    .map_err(|e| LossError::Config(vec![e]))?;

    if let Some(seed) = args.seed {
        config.analysis.seed = Some(seed);
    }
    if let Some(n) = args.num_sim {
        config.analysis.num_sim = n;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(LossError::Config(errors));
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), LossError> {
    let config = load_config(args)?;

    let scada = read_scada_csv(&args.scada)?;
    let meter = read_meter_csv(&args.meter)?;
    let metadata = config.plant.metadata()?;
    let plant = PlantData::validated(scada, meter, metadata, &[AnalysisType::ElectricalLosses])?;

    let mut analysis = ElectricalLosses::new(&plant, &config)?;
    analysis.run()?;

    let summary = LossSummary::from_losses(analysis.electrical_losses().unwrap_or_default());
    let monthly = analysis.monthly_losses().unwrap_or_default();

    if args.json {
        let report = serde_json::json!({
            "mode": analysis.mode(),
            "summary": summary,
            "monthly": monthly,
        });
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| LossError::Io(std::io::Error::other(e)))?;
        println!("{text}");
    } else {
        println!("{summary}");
        if !monthly.is_empty() {
            println!();
            println!("--- Monthly ({}) ---", analysis.mode());
            for m in &monthly {
                println!("{m}");
            }
        }
    }

    if let Some(path) = &args.losses_out {
        let trials = analysis.inputs().map(|i| i.trials()).unwrap_or_default();
        let losses = analysis.electrical_losses().unwrap_or_default();
        export_trials_csv(trials, losses, path)?;
        info!(path = %path.display(), rows = losses.len(), "per-trial losses exported");
    }
    if let Some(path) = &args.monthly_out {
        export_monthly_csv(&monthly, path)?;
        info!(path = %path.display(), rows = monthly.len(), "monthly losses exported");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
