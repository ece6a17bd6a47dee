//! TOML-based analysis configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::LossError;
use crate::losses::trials::ThresholdGrid;
use crate::plant::{Frequency, PlantMetadata};

/// Top-level analysis configuration parsed from TOML.
///
/// All fields have defaults matching the baseline (no uncertainty
/// quantification) analysis. Load from TOML with
/// [`AnalysisConfig::from_toml_file`] or use [`AnalysisConfig::baseline`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Monte Carlo switches and trial count.
    #[serde(default)]
    pub analysis: RunConfig,
    /// Imposed measurement uncertainty and completeness threshold.
    #[serde(default)]
    pub uncertainty: UncertaintyConfig,
    /// Plant metadata used when loading readings from CSV.
    #[serde(default)]
    pub plant: PlantConfig,
}

/// Monte Carlo switches and trial count.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Perform uncertainty quantification.
    pub uq: bool,
    /// Number of Monte Carlo trials (forced to 1 when `uq` is off).
    pub num_sim: usize,
    /// Seed for the trial table; OS entropy when absent.
    pub seed: Option<u64>,
    /// Evaluate trials on the rayon thread pool.
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            uq: false,
            num_sim: 20_000,
            seed: None,
            parallel: true,
        }
    }
}

/// Imposed measurement uncertainty and completeness threshold.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UncertaintyConfig {
    /// Standard deviation of the revenue-meter scale factor, in (0, 1).
    pub meter: f64,
    /// Standard deviation of the SCADA scale factor, in (0, 1).
    pub scada: f64,
    /// Monthly completeness threshold: a scalar without UQ, `[lower, upper]` with UQ.
    pub correction_threshold: CorrectionThreshold,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            meter: 0.005,
            scada: 0.005,
            correction_threshold: CorrectionThreshold::Fixed(0.95),
        }
    }
}

/// Completeness threshold, either fixed or sampled between two bounds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorrectionThreshold {
    /// Single threshold used by the deterministic run.
    Fixed(f64),
    /// `[lower, upper]` bounds sampled per trial.
    Range([f64; 2]),
}

impl fmt::Display for CorrectionThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(t) => write!(f, "{t}"),
            Self::Range([lo, hi]) => write!(f, "[{lo}, {hi}]"),
        }
    }
}

/// Plant metadata used when loading readings from CSV.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// SCADA frequency code (e.g. `"10min"`).
    pub scada_frequency: String,
    /// Meter frequency code (e.g. `"10min"` or `"MS"`).
    pub meter_frequency: String,
    /// Number of turbines at the plant.
    pub n_turbines: usize,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            scada_frequency: "10min".to_string(),
            meter_frequency: "10min".to_string(),
            n_turbines: 1,
        }
    }
}

impl PlantConfig {
    /// Parses the frequency codes into plant metadata.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::Frequency`] for an unrecognised code.
    pub fn metadata(&self) -> Result<PlantMetadata, LossError> {
        Ok(PlantMetadata {
            scada_frequency: Frequency::parse(&self.scada_frequency)?,
            meter_frequency: Frequency::parse(&self.meter_frequency)?,
            n_turbines: self.n_turbines,
        })
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"uncertainty.meter"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn in_open_unit_interval(x: f64) -> bool {
    x > 0.0 && x < 1.0
}

impl AnalysisConfig {
    /// Returns the baseline analysis: no uncertainty quantification, threshold 0.95.
    pub fn baseline() -> Self {
        Self {
            analysis: RunConfig::default(),
            uncertainty: UncertaintyConfig::default(),
            plant: PlantConfig::default(),
        }
    }

    /// Returns the Monte Carlo preset: 20 000 trials, thresholds sampled in [0.9, 0.995].
    pub fn monte_carlo() -> Self {
        Self {
            analysis: RunConfig {
                uq: true,
                ..RunConfig::default()
            },
            uncertainty: UncertaintyConfig {
                correction_threshold: CorrectionThreshold::Range([0.9, 0.995]),
                ..UncertaintyConfig::default()
            },
            plant: PlantConfig::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "monte_carlo"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "monte_carlo" => Ok(Self::monte_carlo()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let run = &self.analysis;
        let unc = &self.uncertainty;

        if run.uq && run.num_sim == 0 {
            errors.push(ConfigError::new("analysis.num_sim", "must be > 0"));
        }

        if !in_open_unit_interval(unc.meter) {
            errors.push(ConfigError::new(
                "uncertainty.meter",
                format!("must be in the open interval (0, 1), got {}", unc.meter),
            ));
        }
        if !in_open_unit_interval(unc.scada) {
            errors.push(ConfigError::new(
                "uncertainty.scada",
                format!("must be in the open interval (0, 1), got {}", unc.scada),
            ));
        }

        let field = "uncertainty.correction_threshold";
        match (run.uq, unc.correction_threshold) {
            (true, CorrectionThreshold::Fixed(_)) => errors.push(ConfigError::new(
                field,
                "must be a [lower, upper] pair when analysis.uq = true",
            )),
            (false, CorrectionThreshold::Range(_)) => errors.push(ConfigError::new(
                field,
                "must be a single value when analysis.uq = false",
            )),
            (_, CorrectionThreshold::Fixed(t)) => {
                if !in_open_unit_interval(t) {
                    errors.push(ConfigError::new(
                        field,
                        format!("must be in the open interval (0, 1), got {t}"),
                    ));
                }
            }
            (_, CorrectionThreshold::Range([lo, hi])) => {
                if !in_open_unit_interval(lo) || !in_open_unit_interval(hi) {
                    errors.push(ConfigError::new(
                        field,
                        format!("bounds must be in the open interval (0, 1), got [{lo}, {hi}]"),
                    ));
                } else if lo >= hi {
                    errors.push(ConfigError::new(
                        field,
                        format!("lower bound must be < upper bound, got [{lo}, {hi}]"),
                    ));
                } else if let Err(e) = ThresholdGrid::new(lo, hi) {
                    errors.push(e);
                }
            }
        }

        let plant = &self.plant;
        if plant.n_turbines == 0 {
            errors.push(ConfigError::new("plant.n_turbines", "must be > 0"));
        }
        if let Err(e) = Frequency::parse(&plant.scada_frequency) {
            errors.push(ConfigError::new("plant.scada_frequency", e.to_string()));
        }
        if let Err(e) = Frequency::parse(&plant.meter_frequency) {
            errors.push(ConfigError::new("plant.meter_frequency", e.to_string()));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_metadata_parses_codes() {
        let plant = PlantConfig {
            scada_frequency: "10min".to_string(),
            meter_frequency: "MS".to_string(),
            n_turbines: 4,
        };
        let meta = plant.metadata().unwrap();
        assert!(meta.meter_frequency.is_monthly());
        assert_eq!(meta.n_turbines, 4);
    }

    #[test]
    fn baseline_preset_valid() {
        let cfg = AnalysisConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let e = AnalysisConfig::from_preset("nonexistent").unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in AnalysisConfig::PRESETS {
            let cfg = AnalysisConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[analysis]
uq = true
num_sim = 500
seed = 7
parallel = false

[uncertainty]
meter = 0.01
scada = 0.002
correction_threshold = [0.85, 0.975]

[plant]
scada_frequency = "10T"
meter_frequency = "MS"
n_turbines = 12
"#;
        let cfg = AnalysisConfig::from_toml_str(toml).unwrap();
        assert!(cfg.analysis.uq);
        assert_eq!(cfg.analysis.num_sim, 500);
        assert_eq!(cfg.analysis.seed, Some(7));
        assert_eq!(
            cfg.uncertainty.correction_threshold,
            CorrectionThreshold::Range([0.85, 0.975])
        );
        assert_eq!(cfg.plant.n_turbines, 12);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn scalar_threshold_parses() {
        let cfg = AnalysisConfig::from_toml_str("[uncertainty]\ncorrection_threshold = 0.9\n")
            .unwrap();
        assert_eq!(
            cfg.uncertainty.correction_threshold,
            CorrectionThreshold::Fixed(0.9)
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[analysis]
uq = false
bogus_field = true
"#;
        assert!(AnalysisConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = AnalysisConfig::from_toml_str("[analysis]\nseed = 99\n").unwrap();
        assert_eq!(cfg.analysis.seed, Some(99));
        assert!(!cfg.analysis.uq);
        assert_eq!(cfg.uncertainty.meter, 0.005);
        assert_eq!(cfg.plant.scada_frequency, "10min");
    }

    #[test]
    fn validation_catches_uncertainty_outside_open_interval() {
        let mut cfg = AnalysisConfig::baseline();
        cfg.uncertainty.meter = 0.0;
        cfg.uncertainty.scada = 1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "uncertainty.meter"));
        assert!(errors.iter().any(|e| e.field == "uncertainty.scada"));
    }

    #[test]
    fn validation_requires_range_with_uq() {
        let mut cfg = AnalysisConfig::baseline();
        cfg.analysis.uq = true;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "uncertainty.correction_threshold")
        );
    }

    #[test]
    fn validation_requires_scalar_without_uq() {
        let mut cfg = AnalysisConfig::monte_carlo();
        cfg.analysis.uq = false;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "uncertainty.correction_threshold")
        );
    }

    #[test]
    fn validation_catches_inverted_bounds() {
        let mut cfg = AnalysisConfig::monte_carlo();
        cfg.uncertainty.correction_threshold = CorrectionThreshold::Range([0.99, 0.9]);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message.contains("lower bound")));
    }

    #[test]
    fn validation_rejects_unrepresentable_threshold_bounds() {
        let mut cfg = AnalysisConfig::monte_carlo();
        cfg.uncertainty.correction_threshold = CorrectionThreshold::Range([1e-20, 0.5]);
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "uncertainty.correction_threshold");
        assert!(errors[0].message.contains("decimal places"));
    }

    #[test]
    fn validation_catches_bad_frequency_and_turbines() {
        let mut cfg = AnalysisConfig::baseline();
        cfg.plant.meter_frequency = "fortnightly".to_string();
        cfg.plant.n_turbines = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "plant.meter_frequency"));
        assert!(errors.iter().any(|e| e.field == "plant.n_turbines"));
    }
}
