//! Shared plant fixtures for integration tests.
//!
//! Energies are whole kWh so hand-computed ratios match the engine exactly.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use wind_losses::config::{AnalysisConfig, CorrectionThreshold};
use wind_losses::plant::{
    AnalysisType, Frequency, MeterReading, PlantData, PlantMetadata, ScadaReading,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(0, 0, 0).unwrap()
}

pub fn validated(
    scada: Vec<ScadaReading>,
    meter: Vec<MeterReading>,
    scada_freq: &str,
    meter_freq: &str,
    n_turbines: usize,
) -> PlantData {
    let metadata = PlantMetadata {
        scada_frequency: Frequency::parse(scada_freq).unwrap(),
        meter_frequency: Frequency::parse(meter_freq).unwrap(),
        n_turbines,
    };
    PlantData::validated(scada, meter, metadata, &[AnalysisType::ElectricalLosses]).unwrap()
}

/// Baseline configuration with a fixed completeness threshold.
pub fn deterministic_config(threshold: f64) -> AnalysisConfig {
    let mut config = AnalysisConfig::baseline();
    config.uncertainty.correction_threshold = CorrectionThreshold::Fixed(threshold);
    config
}

/// Monte Carlo configuration with a seed and trial count.
pub fn uq_config(num_sim: usize, seed: u64) -> AnalysisConfig {
    let mut config = AnalysisConfig::monte_carlo();
    config.analysis.num_sim = num_sim;
    config.analysis.seed = Some(seed);
    config
}

/// Three days of 10-minute data for two turbines (2 kWh and 3 kWh per interval).
///
/// Day 2 only reports its first 72 intervals for both SCADA and meter.
/// The meter records 4 kWh per interval.
pub fn scenario_a_readings() -> (Vec<ScadaReading>, Vec<MeterReading>) {
    let mut scada = Vec::new();
    let mut meter = Vec::new();
    for day in 1..=3 {
        let start = midnight(2021, 1, day);
        let intervals = if day == 2 { 72 } else { 144 };
        for i in 0..intervals {
            let time = start + TimeDelta::minutes(10 * i);
            scada.push(ScadaReading {
                time,
                asset_id: "T1".to_string(),
                energy_kwh: Some(2.0),
            });
            scada.push(ScadaReading {
                time,
                asset_id: "T2".to_string(),
                energy_kwh: Some(3.0),
            });
            meter.push(MeterReading {
                time,
                energy_kwh: Some(4.0),
            });
        }
    }
    (scada, meter)
}

pub fn scenario_a() -> PlantData {
    let (scada, meter) = scenario_a_readings();
    validated(scada, meter, "10min", "10min", 2)
}

/// Turbine and meter totals over days 1 and 3 of scenario A.
pub const SCENARIO_A_TURBINE_KWH: f64 = 2.0 * 144.0 * 5.0;
pub const SCENARIO_A_METER_KWH: f64 = 2.0 * 144.0 * 4.0;

/// Daily SCADA for five turbines at 100 kWh/day with a monthly meter.
///
/// January 2021 is complete. February 2021 is missing turbine `T5`
/// throughout, so its completeness is 0.8.
pub fn scenario_b_readings() -> (Vec<ScadaReading>, Vec<MeterReading>) {
    let mut scada = Vec::new();
    for (month, days, turbines) in [(1, 31, 5), (2, 28, 4)] {
        for day in 1..=days {
            for t in 1..=turbines {
                scada.push(ScadaReading {
                    time: midnight(2021, month, day),
                    asset_id: format!("T{t}"),
                    energy_kwh: Some(100.0),
                });
            }
        }
    }
    let meter = vec![
        MeterReading {
            time: midnight(2021, 1, 1),
            energy_kwh: Some(15_000.0),
        },
        MeterReading {
            time: midnight(2021, 2, 1),
            energy_kwh: Some(13_580.0),
        },
    ];
    (scada, meter)
}

pub fn scenario_b() -> PlantData {
    let (scada, meter) = scenario_b_readings();
    validated(scada, meter, "1D", "MS", 5)
}

/// January turbine energy and the completeness-corrected February energy.
pub const SCENARIO_B_JAN_TURBINE_KWH: f64 = 31.0 * 500.0;
pub const SCENARIO_B_FEB_TURBINE_KWH: f64 = 28.0 * 500.0;
pub const SCENARIO_B_JAN_METER_KWH: f64 = 15_000.0;
pub const SCENARIO_B_FEB_METER_KWH: f64 = 13_580.0;

/// Scenario B restricted to the incomplete February.
pub fn scenario_c() -> PlantData {
    let (scada, meter) = scenario_b_readings();
    let feb = midnight(2021, 2, 1);
    let scada = scada.into_iter().filter(|s| s.time >= feb).collect();
    let meter = meter.into_iter().filter(|m| m.time >= feb).collect();
    validated(scada, meter, "1D", "MS", 5)
}
