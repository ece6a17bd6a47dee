//! Plant dataset and sampling-frequency handling.

/// Validated SCADA and revenue-meter readings with plant metadata.
pub mod data;
pub mod frequency;

pub use data::{AnalysisType, MeterReading, PlantData, PlantMetadata, ScadaReading};
pub use frequency::Frequency;
