use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use super::frequency::Frequency;
use crate::config::ConfigError;
use crate::error::LossError;

/// Analyses a plant dataset can be validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisType {
    /// Turbine-vs-meter electrical-loss estimation.
    ElectricalLosses,
    /// Every supported analysis.
    All,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElectricalLosses => write!(f, "ElectricalLosses"),
            Self::All => write!(f, "all"),
        }
    }
}

/// One turbine's energy observation at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadaReading {
    /// Timestamp at the start of the sampling interval (plant-local).
    pub time: NaiveDateTime,
    /// Turbine identifier.
    pub asset_id: String,
    /// Energy produced over the interval (kWh); `None` when not reported.
    pub energy_kwh: Option<f64>,
}

/// One revenue-meter energy observation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterReading {
    /// Timestamp at the start of the sampling interval (plant-local).
    pub time: NaiveDateTime,
    /// Energy delivered over the interval (kWh); `None` when not reported.
    pub energy_kwh: Option<f64>,
}

/// Declared sampling cadences and turbine count.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantMetadata {
    /// SCADA sampling frequency (fixed, at most daily).
    pub scada_frequency: Frequency,
    /// Revenue-meter sampling frequency (fixed or monthly).
    pub meter_frequency: Frequency,
    /// Number of turbines expected to report.
    pub n_turbines: usize,
}

/// Plant dataset: SCADA and revenue-meter readings plus metadata.
///
/// Built unvalidated with [`PlantData::new`]; [`PlantData::validate`] checks
/// the tables and records which analyses the data may feed. The loss engine
/// only reads from it.
#[derive(Debug, Clone)]
pub struct PlantData {
    scada: Vec<ScadaReading>,
    meter: Vec<MeterReading>,
    metadata: PlantMetadata,
    analysis_types: BTreeSet<AnalysisType>,
}

impl PlantData {
    /// Creates an unvalidated dataset.
    pub fn new(
        scada: Vec<ScadaReading>,
        meter: Vec<MeterReading>,
        metadata: PlantMetadata,
    ) -> Self {
        Self {
            scada,
            meter,
            metadata,
            analysis_types: BTreeSet::new(),
        }
    }

    /// Creates a dataset and validates it for `analyses` in one step.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::InvalidPlant`] listing every violated constraint.
    pub fn validated(
        scada: Vec<ScadaReading>,
        meter: Vec<MeterReading>,
        metadata: PlantMetadata,
        analyses: &[AnalysisType],
    ) -> Result<Self, LossError> {
        let mut plant = Self::new(scada, meter, metadata);
        plant.validate(analyses)?;
        Ok(plant)
    }

    /// Validates the tables and tags the dataset with `analyses`.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::InvalidPlant`] listing every violated constraint.
    /// The dataset keeps its previous tags on failure.
    pub fn validate(&mut self, analyses: &[AnalysisType]) -> Result<(), LossError> {
        let errors = self.check();
        if !errors.is_empty() {
            return Err(LossError::InvalidPlant(errors));
        }
        self.analysis_types.extend(analyses.iter().copied());
        info!(
            scada_rows = self.scada.len(),
            meter_rows = self.meter.len(),
            n_turbines = self.metadata.n_turbines,
            "plant data validated"
        );
        Ok(())
    }

    fn check(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let meta = &self.metadata;

        if self.scada.is_empty() {
            errors.push(ConfigError::new("scada", "must contain at least one reading"));
        }
        if self.meter.is_empty() {
            errors.push(ConfigError::new("meter", "must contain at least one reading"));
        }
        if meta.n_turbines == 0 {
            errors.push(ConfigError::new("n_turbines", "must be > 0"));
        }
        if !meta.scada_frequency.is_at_most_daily() {
            errors.push(ConfigError::new(
                "scada_frequency",
                format!(
                    "must be a fixed cadence of at most 1 day, got {}",
                    meta.scada_frequency
                ),
            ));
        }
        if let Frequency::Fixed(interval) = meta.meter_frequency {
            if interval > TimeDelta::days(1) {
                errors.push(ConfigError::new(
                    "meter_frequency",
                    format!(
                        "must be monthly or at most 1 day, got {}",
                        meta.meter_frequency
                    ),
                ));
            }
        }

        let assets: HashSet<&str> = self.scada.iter().map(|r| r.asset_id.as_str()).collect();
        debug!(assets = assets.len(), "distinct SCADA assets");
        if meta.n_turbines > 0 && assets.len() > meta.n_turbines {
            errors.push(ConfigError::new(
                "scada.asset_id",
                format!(
                    "{} distinct assets exceed n_turbines = {}",
                    assets.len(),
                    meta.n_turbines
                ),
            ));
        }

        let bad_value = |v: f64| !v.is_finite() || v < 0.0;
        if let Some(r) = self.scada.iter().find(|r| r.energy_kwh.is_some_and(bad_value)) {
            errors.push(ConfigError::new(
                "scada.energy_kwh",
                format!(
                    "must be finite and >= 0 (asset {} at {})",
                    r.asset_id, r.time
                ),
            ));
        }
        if let Some(r) = self.meter.iter().find(|r| r.energy_kwh.is_some_and(bad_value)) {
            errors.push(ConfigError::new(
                "meter.energy_kwh",
                format!("must be finite and >= 0 (at {})", r.time),
            ));
        }

        errors
    }

    /// Returns `true` if the dataset was validated for `analysis` (or for all).
    pub fn is_validated_for(&self, analysis: AnalysisType) -> bool {
        self.analysis_types.contains(&analysis) || self.analysis_types.contains(&AnalysisType::All)
    }

    /// Analyses recorded by successful validation.
    pub fn analysis_types(&self) -> &BTreeSet<AnalysisType> {
        &self.analysis_types
    }

    /// Per-turbine SCADA readings.
    pub fn scada(&self) -> &[ScadaReading] {
        &self.scada
    }

    /// Revenue-meter readings.
    pub fn meter(&self) -> &[MeterReading] {
        &self.meter
    }

    /// Declared frequencies and turbine count.
    pub fn metadata(&self) -> &PlantMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 1).and_then(|d| d.and_hms_opt(h, 0, 0)).unwrap()
    }

    fn metadata(n_turbines: usize) -> PlantMetadata {
        PlantMetadata {
            scada_frequency: Frequency::parse("1H").unwrap(),
            meter_frequency: Frequency::parse("1H").unwrap(),
            n_turbines,
        }
    }

    fn scada(asset: &str, energy: Option<f64>) -> ScadaReading {
        ScadaReading {
            time: t(0),
            asset_id: asset.to_string(),
            energy_kwh: energy,
        }
    }

    fn meter(energy: Option<f64>) -> MeterReading {
        MeterReading {
            time: t(0),
            energy_kwh: energy,
        }
    }

    #[test]
    fn validation_tags_dataset() {
        let plant = PlantData::validated(
            vec![scada("T1", Some(1.0))],
            vec![meter(Some(1.0))],
            metadata(1),
            &[AnalysisType::ElectricalLosses],
        )
        .unwrap();
        assert!(plant.is_validated_for(AnalysisType::ElectricalLosses));
    }

    #[test]
    fn all_tag_covers_electrical_losses() {
        let plant = PlantData::validated(
            vec![scada("T1", None)],
            vec![meter(None)],
            metadata(1),
            &[AnalysisType::All],
        )
        .unwrap();
        assert!(plant.is_validated_for(AnalysisType::ElectricalLosses));
    }

    #[test]
    fn unvalidated_dataset_has_no_tags() {
        let plant = PlantData::new(vec![scada("T1", Some(1.0))], vec![], metadata(1));
        assert!(!plant.is_validated_for(AnalysisType::ElectricalLosses));
    }

    #[test]
    fn validation_collects_every_violation() {
        let mut plant = PlantData::new(
            vec![scada("T1", Some(-1.0)), scada("T2", Some(1.0))],
            vec![],
            PlantMetadata {
                scada_frequency: Frequency::Monthly,
                ..metadata(1)
            },
        );
        let err = plant.validate(&[AnalysisType::ElectricalLosses]).unwrap_err();
        let LossError::InvalidPlant(errors) = err else {
            panic!("expected InvalidPlant");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"meter"));
        assert!(fields.contains(&"scada_frequency"));
        assert!(fields.contains(&"scada.asset_id"));
        assert!(fields.contains(&"scada.energy_kwh"));
        assert!(!plant.is_validated_for(AnalysisType::ElectricalLosses));
    }

    #[test]
    fn rejects_nan_meter_energy() {
        let err = PlantData::validated(
            vec![scada("T1", Some(1.0))],
            vec![meter(Some(f64::NAN))],
            metadata(1),
            &[AnalysisType::ElectricalLosses],
        )
        .unwrap_err();
        assert!(err.to_string().contains("meter.energy_kwh"));
    }
}
