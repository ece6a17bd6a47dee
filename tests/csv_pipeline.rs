//! Integration tests for the file-based pipeline: TOML config, CSV in, CSV out.

mod common;

use std::fs;
use std::io::Write;

use wind_losses::config::{AnalysisConfig, CorrectionThreshold};
use wind_losses::io::export::{export_monthly_csv, export_trials_csv};
use wind_losses::io::import::{read_meter_csv, read_scada_csv};
use wind_losses::losses::ElectricalLosses;
use wind_losses::plant::{AnalysisType, PlantData};

fn write_scenario_b(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let (scada, meter) = common::scenario_b_readings();

    let scada_path = dir.join("scada.csv");
    let mut f = fs::File::create(&scada_path).unwrap();
    writeln!(f, "time,asset_id,energy_kwh").unwrap();
    for r in &scada {
        let time = r.time.format("%Y-%m-%d %H:%M:%S");
        writeln!(f, "{time},{},{}", r.asset_id, r.energy_kwh.unwrap()).unwrap();
    }
    // Unreported turbine rows are read as missing values.
    writeln!(f, "2021-02-01 00:00:00,T5,").unwrap();

    let meter_path = dir.join("meter.csv");
    let mut f = fs::File::create(&meter_path).unwrap();
    writeln!(f, "time,energy_kwh").unwrap();
    for r in &meter {
        let time = r.time.format("%Y-%m-%dT%H:%M:%S");
        writeln!(f, "{time},{}", r.energy_kwh.unwrap()).unwrap();
    }
    (scada_path, meter_path)
}

const CONFIG_TOML: &str = r#"
[analysis]
uq = false

[uncertainty]
correction_threshold = 0.8

[plant]
scada_frequency = "1D"
meter_frequency = "MS"
n_turbines = 5
"#;

#[test]
fn config_file_drives_csv_run() {
    let dir = tempfile::tempdir().unwrap();
    let (scada_path, meter_path) = write_scenario_b(dir.path());
    let config_path = dir.path().join("analysis.toml");
    fs::write(&config_path, CONFIG_TOML).unwrap();

    let config = AnalysisConfig::from_toml_file(&config_path).unwrap();
    assert!(config.validate().is_empty());
    let threshold = config.uncertainty.correction_threshold;
    assert_eq!(threshold, CorrectionThreshold::Fixed(0.8));

    let plant = PlantData::validated(
        read_scada_csv(&scada_path).unwrap(),
        read_meter_csv(&meter_path).unwrap(),
        config.plant.metadata().unwrap(),
        &[AnalysisType::ElectricalLosses],
    )
    .unwrap();
    let mut analysis = ElectricalLosses::new(&plant, &config).unwrap();
    let results = analysis.run().unwrap();

    let turbine = common::SCENARIO_B_JAN_TURBINE_KWH + common::SCENARIO_B_FEB_TURBINE_KWH;
    let meter = common::SCENARIO_B_JAN_METER_KWH + common::SCENARIO_B_FEB_METER_KWH;
    assert!((results.losses[0] - (1.0 - meter / turbine)).abs() < 1e-12);
}

#[test]
fn results_export_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let plant = common::scenario_b();
    let mut analysis = ElectricalLosses::new(&plant, &common::uq_config(25, 5)).unwrap();
    analysis.run().unwrap();

    let losses_path = dir.path().join("losses.csv");
    export_trials_csv(
        analysis.inputs().unwrap().trials(),
        analysis.electrical_losses().unwrap(),
        &losses_path,
    )
    .unwrap();
    let rows = fs::read_to_string(&losses_path).unwrap().lines().count();
    assert_eq!(rows, 26);

    let monthly_path = dir.path().join("monthly.csv");
    export_monthly_csv(&analysis.monthly_losses().unwrap(), &monthly_path).unwrap();
    let monthly = fs::read_to_string(&monthly_path).unwrap();
    assert!(monthly.starts_with("month,turbine_energy_kwh,meter_energy_kwh,loss"));
    assert!(monthly.contains("2021-01-01"));
}

#[test]
fn unknown_config_field_is_rejected() {
    let err = AnalysisConfig::from_toml_str("[analysis]\nnum_sims = 10\n").unwrap_err();
    assert_eq!(err.field, "toml");
}
