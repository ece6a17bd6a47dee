//! Daily and monthly reduction of SCADA and revenue-meter readings.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::{debug, warn};

use super::types::{MeterDaily, MeterMonthly, ScadaDaily, ScadaMonthly};
use crate::error::LossError;
use crate::plant::frequency::{expected_daily_count, expected_monthly_count, month_start};
use crate::plant::{MeterReading, ScadaReading};

/// Plant-wide energy at one timestamp, summed across turbines.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampSum {
    pub time: NaiveDateTime,
    pub energy_kwh: f64,
    /// Turbines that reported a value at this timestamp.
    pub count: usize,
}

/// Output of [`aggregate_scada`].
#[derive(Debug, Clone, Default)]
pub struct ScadaAggregates {
    /// Corrected daily energy for every day with at least one reading.
    pub daily: Vec<ScadaDaily>,
    /// Days on which every turbine reported at every timestep.
    pub full_count: Vec<ScadaDaily>,
    /// Corrected monthly energy with completeness, before any threshold.
    pub monthly: Vec<ScadaMonthly>,
}

/// Scales observed energy up to perfect reporting.
///
/// Returns `None` when nothing was observed; such periods are missing, not
/// zero. When `count` equals `expected` the energy is returned unchanged.
///
/// # Examples
///
/// ```
/// use wind_losses::losses::aggregate::corrected_energy;
///
/// assert_eq!(corrected_energy(50.0, 144, 288.0), Some(100.0));
/// assert_eq!(corrected_energy(50.0, 288, 288.0), Some(50.0));
/// assert_eq!(corrected_energy(0.0, 0, 288.0), None);
/// ```
pub fn corrected_energy(energy_kwh: f64, count: usize, expected: f64) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(energy_kwh * (expected / count as f64))
}

/// Sums energy and counts reporting turbines at each timestamp.
///
/// Missing values are neither summed nor counted.
pub fn sum_by_timestamp(readings: &[ScadaReading]) -> Vec<TimestampSum> {
    let mut sums: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    for r in readings {
        let entry = sums.entry(r.time).or_insert((0.0, 0));
        if let Some(e) = r.energy_kwh {
            entry.0 += e;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(time, (energy_kwh, count))| TimestampSum {
            time,
            energy_kwh,
            count,
        })
        .collect()
}

/// Reduces per-turbine SCADA readings to corrected daily and monthly energy.
///
/// # Arguments
///
/// * `readings` - Per-turbine, per-timestep readings
/// * `interval` - SCADA sampling interval
/// * `n_turbines` - Turbines expected to report
///
/// # Errors
///
/// Returns [`LossError::Config`] for a non-positive interval or zero turbines.
pub fn aggregate_scada(
    readings: &[ScadaReading],
    interval: TimeDelta,
    n_turbines: usize,
) -> Result<ScadaAggregates, LossError> {
    let expected = expected_daily_count(interval, n_turbines)?;

    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for s in sum_by_timestamp(readings) {
        let entry = by_day.entry(s.time.date()).or_insert((0.0, 0));
        entry.0 += s.energy_kwh;
        entry.1 += s.count;
    }

    let mut daily = Vec::with_capacity(by_day.len());
    let mut empty_days = 0_usize;
    for (day, (energy_kwh, count)) in by_day {
        let Some(corrected_energy_kwh) = corrected_energy(energy_kwh, count, expected) else {
            empty_days += 1;
            continue;
        };
        daily.push(ScadaDaily {
            day,
            energy_kwh,
            count,
            expected_count: expected,
            corrected_energy_kwh,
            completeness: count as f64 / expected,
        });
    }
    if empty_days > 0 {
        warn!(empty_days, "days without SCADA values treated as missing");
    }

    let full_count: Vec<ScadaDaily> = daily.iter().filter(|d| d.is_full_count()).cloned().collect();
    let monthly = resample_scada_monthly(&daily, interval, n_turbines)?;
    debug!(
        days = daily.len(),
        full_days = full_count.len(),
        months = monthly.len(),
        expected_daily = expected,
        "SCADA aggregated"
    );

    Ok(ScadaAggregates {
        daily,
        full_count,
        monthly,
    })
}

/// Sums corrected daily energy and counts into calendar months.
///
/// # Errors
///
/// Returns [`LossError::Config`] for a non-positive interval or zero turbines.
pub fn resample_scada_monthly(
    daily: &[ScadaDaily],
    interval: TimeDelta,
    n_turbines: usize,
) -> Result<Vec<ScadaMonthly>, LossError> {
    let mut by_month: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for d in daily {
        let entry = by_month.entry(month_start(d.day)).or_insert((0.0, 0));
        entry.0 += d.corrected_energy_kwh;
        entry.1 += d.count;
    }

    by_month
        .into_iter()
        .map(|(month, (corrected_energy_kwh, count))| {
            let expected_count = expected_monthly_count(interval, month, n_turbines)?;
            Ok(ScadaMonthly {
                month,
                corrected_energy_kwh,
                count,
                expected_count,
                completeness: count as f64 / expected_count,
            })
        })
        .collect()
}

/// Reduces sub-monthly meter readings to fully-reporting days.
///
/// No correction is applied: a day is kept only if the observed count equals
/// the expected count for one meter at `interval`.
///
/// # Errors
///
/// Returns [`LossError::Config`] for a non-positive interval.
pub fn aggregate_meter_daily(
    readings: &[MeterReading],
    interval: TimeDelta,
) -> Result<Vec<MeterDaily>, LossError> {
    let expected = expected_daily_count(interval, 1)?;

    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for r in readings {
        let entry = by_day.entry(r.time.date()).or_insert((0.0, 0));
        if let Some(e) = r.energy_kwh {
            entry.0 += e;
            entry.1 += 1;
        }
    }

    let total_days = by_day.len();
    let complete: Vec<MeterDaily> = by_day
        .into_iter()
        .filter(|(_, (_, count))| *count as f64 == expected)
        .map(|(day, (energy_kwh, count))| MeterDaily {
            day,
            energy_kwh,
            count,
        })
        .collect();
    debug!(
        days = total_days,
        complete_days = complete.len(),
        expected_daily = expected,
        "meter aggregated"
    );

    Ok(complete)
}

/// Keys native monthly meter readings by month start.
///
/// Readings stamped anywhere in a month (start or end) land on that month;
/// several readings in one month are summed. Months with no reported value
/// are dropped.
pub fn aggregate_meter_monthly(readings: &[MeterReading]) -> Vec<MeterMonthly> {
    let mut by_month: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for r in readings {
        let entry = by_month.entry(month_start(r.time.date())).or_insert(None);
        if let Some(e) = r.energy_kwh {
            *entry = Some(entry.unwrap_or(0.0) + e);
        }
    }

    let total_months = by_month.len();
    let months: Vec<MeterMonthly> = by_month
        .into_iter()
        .filter_map(|(month, energy)| energy.map(|energy_kwh| MeterMonthly { month, energy_kwh }))
        .collect();
    if months.len() < total_months {
        warn!(
            missing = total_months - months.len(),
            "meter months without a value dropped"
        );
    }
    months
}
