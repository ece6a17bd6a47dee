//! Error taxonomy for the electrical-loss analysis.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::losses::types::ReconcileMode;

/// Errors raised while configuring or running the loss analysis.
#[derive(Debug, Error)]
pub enum LossError {
    /// One or more configuration fields violate their constraints.
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ConfigError>),

    /// A sampling-frequency code could not be interpreted.
    #[error("unrecognised frequency code \"{code}\": {reason}")]
    Frequency { code: String, reason: String },

    /// The plant dataset has not been validated for this analysis.
    #[error(
        "plant data must be validated for electrical losses (validated for: {found})"
    )]
    Precondition { found: String },

    /// Plant dataset validation failed.
    #[error("invalid plant data: {}", join_errors(.0))]
    InvalidPlant(Vec<ConfigError>),

    /// The trial loop was started before the trial table existed.
    #[error("simulation inputs have not been generated, call setup_inputs first")]
    InputsNotGenerated,

    /// No period was concurrent and complete enough for this trial.
    ///
    /// Daily reconciliation ignores `threshold`, so its message omits it.
    #[error("trial {trial}: {}", insufficient_reason(.mode, .threshold))]
    InsufficientData {
        trial: usize,
        threshold: f64,
        mode: ReconcileMode,
    },

    /// Reconciled periods exist but carry no turbine energy to compare against.
    #[error(
        "trial {trial}: total turbine energy over {periods} concurrent periods is {total_kwh} kWh"
    )]
    NonPositiveTurbineEnergy {
        trial: usize,
        periods: usize,
        total_kwh: f64,
    },

    /// A CSV row could not be interpreted.
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn insufficient_reason(mode: &ReconcileMode, threshold: &f64) -> String {
    match mode {
        ReconcileMode::Daily => "no concurrent fully-reporting days".to_string(),
        ReconcileMode::Monthly => {
            format!("no concurrent monthly periods meet completeness threshold {threshold}")
        }
    }
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_lists_every_field() {
        let err = LossError::Config(vec![
            ConfigError::new("uncertainty.meter", "must be in (0, 1)"),
            ConfigError::new("analysis.num_sim", "must be > 0"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("uncertainty.meter"));
        assert!(msg.contains("analysis.num_sim"));
    }

    #[test]
    fn daily_insufficient_data_omits_threshold() {
        let err = LossError::InsufficientData {
            trial: 3,
            threshold: 0.999,
            mode: ReconcileMode::Daily,
        };
        let msg = err.to_string();
        assert_eq!(msg, "trial 3: no concurrent fully-reporting days");
        assert!(!msg.contains("threshold"));
    }

    #[test]
    fn insufficient_data_names_trial_and_threshold() {
        let err = LossError::InsufficientData {
            trial: 7,
            threshold: 0.999,
            mode: ReconcileMode::Monthly,
        };
        let msg = err.to_string();
        assert!(msg.contains("trial 7"));
        assert!(msg.contains("0.999"));
        assert!(msg.contains("monthly"));
    }
}
