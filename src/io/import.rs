//! CSV import of SCADA and revenue-meter readings.
//!
//! SCADA files carry `time,asset_id,energy_kwh`; meter files carry
//! `time,energy_kwh`. An empty energy cell is a missing value.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::info;

use crate::error::LossError;
use crate::plant::{MeterReading, ScadaReading};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Deserialize)]
struct ScadaRecord {
    time: String,
    asset_id: String,
    energy_kwh: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MeterRecord {
    time: String,
    energy_kwh: Option<f64>,
}

/// Parses a plant-local timestamp; a bare date means midnight.
///
/// # Errors
///
/// Returns [`LossError::Parse`] if no supported format matches.
pub fn parse_timestamp(s: &str, line: u64) -> Result<NaiveDateTime, LossError> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| date_only(s))
        .ok_or_else(|| LossError::Parse {
            line,
            message: format!("unrecognised timestamp \"{s}\""),
        })
}

fn date_only(s: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source)
}

/// Reads SCADA readings from any CSV source.
///
/// # Errors
///
/// Returns [`LossError::Csv`] for malformed rows and [`LossError::Parse`]
/// for unrecognised timestamps.
pub fn read_scada<R: Read>(source: R) -> Result<Vec<ScadaReading>, LossError> {
    let mut rdr = reader(source);
    let mut readings = Vec::new();
    for (i, record) in rdr.deserialize::<ScadaRecord>().enumerate() {
        let record = record?;
        readings.push(ScadaReading {
            time: parse_timestamp(&record.time, i as u64 + 2)?,
            asset_id: record.asset_id,
            energy_kwh: record.energy_kwh,
        });
    }
    Ok(readings)
}

/// Reads revenue-meter readings from any CSV source.
///
/// # Errors
///
/// Returns [`LossError::Csv`] for malformed rows and [`LossError::Parse`]
/// for unrecognised timestamps.
pub fn read_meter<R: Read>(source: R) -> Result<Vec<MeterReading>, LossError> {
    let mut rdr = reader(source);
    let mut readings = Vec::new();
    for (i, record) in rdr.deserialize::<MeterRecord>().enumerate() {
        let record = record?;
        readings.push(MeterReading {
            time: parse_timestamp(&record.time, i as u64 + 2)?,
            energy_kwh: record.energy_kwh,
        });
    }
    Ok(readings)
}

/// Reads SCADA readings from a CSV file.
///
/// # Errors
///
/// See [`read_scada`]; also returns [`LossError::Io`] if the file cannot be opened.
pub fn read_scada_csv(path: &Path) -> Result<Vec<ScadaReading>, LossError> {
    let readings = read_scada(File::open(path)?)?;
    info!(path = %path.display(), rows = readings.len(), "SCADA readings loaded");
    Ok(readings)
}

/// Reads revenue-meter readings from a CSV file.
///
/// # Errors
///
/// See [`read_meter`]; also returns [`LossError::Io`] if the file cannot be opened.
pub fn read_meter_csv(path: &Path) -> Result<Vec<MeterReading>, LossError> {
    let readings = read_meter(File::open(path)?)?;
    info!(path = %path.display(), rows = readings.len(), "meter readings loaded");
    Ok(readings)
}
