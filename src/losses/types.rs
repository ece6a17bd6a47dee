//! Aggregate records, simulation trials and reconciled periods.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Temporal basis on which turbine and meter energy are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// Sub-monthly meter: fully-reporting days on both sides.
    Daily,
    /// Monthly meter: SCADA months above the completeness threshold.
    Monthly,
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// Plant-wide SCADA energy for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadaDaily {
    pub day: NaiveDate,
    /// Summed turbine energy as reported (kWh).
    pub energy_kwh: f64,
    /// Observed readings across all turbines.
    pub count: usize,
    /// Readings expected with every turbine reporting at every step.
    pub expected_count: f64,
    /// `energy_kwh * expected_count / count`.
    pub corrected_energy_kwh: f64,
    /// `count / expected_count`.
    pub completeness: f64,
}

impl ScadaDaily {
    /// Every turbine reported at every timestep of the day.
    pub fn is_full_count(&self) -> bool {
        self.count as f64 == self.expected_count
    }
}

/// Completeness-corrected SCADA energy for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadaMonthly {
    /// First day of the month.
    pub month: NaiveDate,
    /// Sum of daily corrected energy (kWh).
    pub corrected_energy_kwh: f64,
    /// Observed readings across all turbines.
    pub count: usize,
    /// Readings expected over the whole month.
    pub expected_count: f64,
    /// `count / expected_count`.
    pub completeness: f64,
}

/// Revenue-meter energy for one fully-reporting day.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterDaily {
    pub day: NaiveDate,
    pub energy_kwh: f64,
    pub count: usize,
}

/// Revenue-meter energy for one month at native monthly granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterMonthly {
    /// First day of the month.
    pub month: NaiveDate,
    pub energy_kwh: f64,
}

/// Parameters of one Monte Carlo trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationTrial {
    /// Position in the trial table.
    pub index: usize,
    /// Scale applied to total meter energy.
    pub meter_data_fraction: f64,
    /// Scale applied to total turbine energy.
    pub scada_data_fraction: f64,
    /// Minimum monthly SCADA completeness retained.
    pub correction_threshold: f64,
}

/// One concurrent period in the reconciled table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledPeriod {
    /// Day, or first day of the month in monthly mode.
    pub period: NaiveDate,
    /// Completeness-corrected turbine energy (kWh).
    pub turbine_energy_kwh: f64,
    /// Revenue-meter energy (kWh).
    pub meter_energy_kwh: f64,
    /// SCADA completeness of the period.
    pub completeness: f64,
}

impl fmt::Display for ReconciledPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | turbine={:>12.1} kWh  meter={:>12.1} kWh  completeness={:.1}%",
            self.period,
            self.turbine_energy_kwh,
            self.meter_energy_kwh,
            self.completeness * 100.0,
        )
    }
}

/// Inner join of SCADA and meter aggregates for one trial.
///
/// Every row carries both a turbine and a meter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledTable {
    pub mode: ReconcileMode,
    pub periods: Vec<ReconciledPeriod>,
}

impl ReconciledTable {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Turbine energy summed over all concurrent periods (kWh).
    pub fn total_turbine_energy_kwh(&self) -> f64 {
        self.periods.iter().map(|p| p.turbine_energy_kwh).sum()
    }

    /// Meter energy summed over all concurrent periods (kWh).
    pub fn total_meter_energy_kwh(&self) -> f64 {
        self.periods.iter().map(|p| p.meter_energy_kwh).sum()
    }
}

/// Scaled totals and loss for one evaluated trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialOutcome {
    pub trial: usize,
    /// Number of concurrent periods used.
    pub periods: usize,
    /// Turbine total after the SCADA scale factor (kWh).
    pub total_turbine_energy_kwh: f64,
    /// Meter total after the meter scale factor (kWh).
    pub total_meter_energy_kwh: f64,
    /// `1 - meter / turbine`.
    pub loss: f64,
}
