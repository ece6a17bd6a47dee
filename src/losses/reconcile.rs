//! Joins SCADA and meter aggregates on a common period and computes the loss.
//!
//! The reconciler holds only aggregates computed once per analysis; every
//! trial re-derives its own reconciled table from them without mutation, so
//! trials can be evaluated in any order or in parallel.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{
    MeterDaily, MeterMonthly, ReconcileMode, ReconciledPeriod, ReconciledTable, ScadaDaily,
    ScadaMonthly, SimulationTrial, TrialOutcome,
};
use crate::error::LossError;

/// Precomputed aggregates for one meter granularity.
#[derive(Debug, Clone)]
pub enum Reconciler {
    /// Sub-monthly meter: fully-reporting days on both sides.
    Daily {
        scada_full_count: Vec<ScadaDaily>,
        meter_daily: Vec<MeterDaily>,
    },
    /// Monthly meter: SCADA months filtered by completeness threshold.
    Monthly {
        scada_monthly: Vec<ScadaMonthly>,
        meter_monthly: Vec<MeterMonthly>,
    },
}

impl Reconciler {
    pub fn mode(&self) -> ReconcileMode {
        match self {
            Self::Daily { .. } => ReconcileMode::Daily,
            Self::Monthly { .. } => ReconcileMode::Monthly,
        }
    }

    /// Builds the reconciled table for a completeness threshold.
    ///
    /// The threshold only applies in monthly mode, where a month is kept if
    /// its completeness is `>= threshold`. Daily mode uses the exact
    /// full-count subsets and ignores it.
    pub fn reconcile(&self, threshold: f64) -> ReconciledTable {
        match self {
            Self::Daily {
                scada_full_count,
                meter_daily,
            } => reconcile_daily(scada_full_count, meter_daily),
            Self::Monthly {
                scada_monthly,
                meter_monthly,
            } => reconcile_monthly(scada_monthly, meter_monthly, threshold),
        }
    }

    /// Reconciles and computes the loss for one trial.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::InsufficientData`] if no period is concurrent,
    /// or [`LossError::NonPositiveTurbineEnergy`] if the scaled turbine total
    /// is not strictly positive.
    pub fn evaluate(&self, trial: &SimulationTrial) -> Result<TrialOutcome, LossError> {
        let table = self.reconcile(trial.correction_threshold);
        estimate_loss(&table, trial)
    }
}

/// Inner-joins fully-reporting meter days with fully-reporting SCADA days.
pub fn reconcile_daily(
    scada_full_count: &[ScadaDaily],
    meter_daily: &[MeterDaily],
) -> ReconciledTable {
    let meter: BTreeMap<NaiveDate, f64> = meter_daily
        .iter()
        .map(|m| (m.day, m.energy_kwh))
        .collect();

    let periods = scada_full_count
        .iter()
        .filter_map(|s| {
            meter.get(&s.day).map(|&meter_energy_kwh| ReconciledPeriod {
                period: s.day,
                turbine_energy_kwh: s.corrected_energy_kwh,
                meter_energy_kwh,
                completeness: s.completeness,
            })
        })
        .collect();

    ReconciledTable {
        mode: ReconcileMode::Daily,
        periods,
    }
}

/// Keeps SCADA months with completeness `>= threshold` and inner-joins them
/// with the native monthly meter series.
pub fn reconcile_monthly(
    scada_monthly: &[ScadaMonthly],
    meter_monthly: &[MeterMonthly],
    threshold: f64,
) -> ReconciledTable {
    let meter: BTreeMap<NaiveDate, f64> = meter_monthly
        .iter()
        .map(|m| (m.month, m.energy_kwh))
        .collect();

    let periods = scada_monthly
        .iter()
        .filter(|s| s.completeness >= threshold)
        .filter_map(|s| {
            meter.get(&s.month).map(|&meter_energy_kwh| ReconciledPeriod {
                period: s.month,
                turbine_energy_kwh: s.corrected_energy_kwh,
                meter_energy_kwh,
                completeness: s.completeness,
            })
        })
        .collect();

    ReconciledTable {
        mode: ReconcileMode::Monthly,
        periods,
    }
}

/// Computes `1 - (meter * meter_fraction) / (turbine * scada_fraction)`.
///
/// # Errors
///
/// Returns [`LossError::InsufficientData`] for an empty table and
/// [`LossError::NonPositiveTurbineEnergy`] when the scaled turbine total is
/// not strictly positive.
pub fn estimate_loss(
    table: &ReconciledTable,
    trial: &SimulationTrial,
) -> Result<TrialOutcome, LossError> {
    if table.is_empty() {
        return Err(LossError::InsufficientData {
            trial: trial.index,
            threshold: trial.correction_threshold,
            mode: table.mode,
        });
    }

    let total_turbine_energy_kwh = table.total_turbine_energy_kwh() * trial.scada_data_fraction;
    let total_meter_energy_kwh = table.total_meter_energy_kwh() * trial.meter_data_fraction;
    if total_turbine_energy_kwh.is_nan() || total_turbine_energy_kwh <= 0.0 {
        return Err(LossError::NonPositiveTurbineEnergy {
            trial: trial.index,
            periods: table.len(),
            total_kwh: total_turbine_energy_kwh,
        });
    }

    Ok(TrialOutcome {
        trial: trial.index,
        periods: table.len(),
        total_turbine_energy_kwh,
        total_meter_energy_kwh,
        loss: 1.0 - total_meter_energy_kwh / total_turbine_energy_kwh,
    })
}
