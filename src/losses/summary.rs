//! Distribution statistics and monthly loss series for reporting.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use super::types::ReconciledTable;
use crate::plant::frequency::month_start;

/// Summary of the per-trial loss distribution.
///
/// The standard deviation is the uncertainty of the estimate; it is zero for
/// a single deterministic trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossSummary {
    /// Number of trials summarized.
    pub num_sim: usize,
    /// Mean loss (fraction).
    pub mean: f64,
    /// Sample standard deviation of the loss (fraction).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// 5th percentile.
    pub p5: f64,
    /// Median.
    pub p50: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl LossSummary {
    /// Computes the summary; all fields are zero for an empty slice.
    pub fn from_losses(losses: &[f64]) -> Self {
        if losses.is_empty() {
            return Self {
                num_sim: 0,
                mean: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
                p5: 0.0,
                p50: 0.0,
                p95: 0.0,
            };
        }

        let std_dev = if losses.len() > 1 {
            losses.std_dev()
        } else {
            0.0
        };
        let mut data = Data::new(losses.to_vec());

        Self {
            num_sim: losses.len(),
            mean: losses.mean(),
            std_dev,
            min: Statistics::min(losses),
            max: Statistics::max(losses),
            p5: data.percentile(5),
            p50: data.median(),
            p95: data.percentile(95),
        }
    }
}

impl fmt::Display for LossSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Electrical Losses ---")?;
        writeln!(f, "Trials:              {}", self.num_sim)?;
        writeln!(f, "Mean loss:           {:.3}%", self.mean * 100.0)?;
        writeln!(f, "Std deviation:       {:.3}%", self.std_dev * 100.0)?;
        writeln!(
            f,
            "5th-95th percentile: {:.3}% .. {:.3}%",
            self.p5 * 100.0,
            self.p95 * 100.0
        )?;
        write!(
            f,
            "Range:               {:.3}% .. {:.3}%",
            self.min * 100.0,
            self.max * 100.0
        )
    }
}

/// Turbine and meter energy with the resulting loss for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyLoss {
    /// First day of the month.
    pub month: NaiveDate,
    pub turbine_energy_kwh: f64,
    pub meter_energy_kwh: f64,
    /// `(turbine - meter) / turbine`.
    pub loss: f64,
}

impl fmt::Display for MonthlyLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | turbine={:>12.1} kWh  meter={:>12.1} kWh  loss={:>6.2}%",
            self.month.format("%Y-%m"),
            self.turbine_energy_kwh,
            self.meter_energy_kwh,
            self.loss * 100.0
        )
    }
}

/// Groups a reconciled table by month and computes each month's loss.
///
/// Scale factors are not applied. Months without turbine energy are skipped.
pub fn monthly_losses(table: &ReconciledTable) -> Vec<MonthlyLoss> {
    let mut by_month: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for p in &table.periods {
        let entry = by_month.entry(month_start(p.period)).or_insert((0.0, 0.0));
        entry.0 += p.turbine_energy_kwh;
        entry.1 += p.meter_energy_kwh;
    }

    by_month
        .into_iter()
        .filter(|(_, (turbine, _))| *turbine > 0.0)
        .map(|(month, (turbine_energy_kwh, meter_energy_kwh))| MonthlyLoss {
            month,
            turbine_energy_kwh,
            meter_energy_kwh,
            loss: (turbine_energy_kwh - meter_energy_kwh) / turbine_energy_kwh,
        })
        .collect()
}
