//! CSV export of per-trial losses and the monthly loss series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::losses::{MonthlyLoss, SimulationTrial};

/// Column header for per-trial loss export.
const TRIAL_HEADER: &str = "trial,meter_data_fraction,scada_data_fraction,\
                            correction_threshold,electrical_loss";

/// Column header for monthly loss export.
const MONTHLY_HEADER: &str = "month,turbine_energy_kwh,meter_energy_kwh,loss";

/// Exports per-trial parameters and losses to a CSV file.
///
/// # Arguments
///
/// * `trials` - Trial table, in index order
/// * `losses` - Loss per trial, same order as `trials`
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_trials_csv(
    trials: &[SimulationTrial],
    losses: &[f64],
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_trials_csv(trials, losses, io::BufWriter::new(file))
}

/// Writes per-trial parameters and losses as CSV to any writer.
///
/// Rows stop at the shorter of `trials` and `losses`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_trials_csv(
    trials: &[SimulationTrial],
    losses: &[f64],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TRIAL_HEADER.split(','))?;

    for (t, loss) in trials.iter().zip(losses) {
        wtr.write_record(&[
            t.index.to_string(),
            format!("{:.6}", t.meter_data_fraction),
            format!("{:.6}", t.scada_data_fraction),
            t.correction_threshold.to_string(),
            format!("{loss:.6}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the monthly loss series to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_monthly_csv(monthly: &[MonthlyLoss], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_monthly_csv(monthly, io::BufWriter::new(file))
}

/// Writes the monthly loss series as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_monthly_csv(monthly: &[MonthlyLoss], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(MONTHLY_HEADER.split(','))?;

    for m in monthly {
        wtr.write_record(&[
            m.month.format("%Y-%m-%d").to_string(),
            format!("{:.3}", m.turbine_energy_kwh),
            format!("{:.3}", m.meter_energy_kwh),
            format!("{:.6}", m.loss),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
