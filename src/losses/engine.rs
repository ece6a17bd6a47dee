//! Electrical-loss engine: aggregation once, then one reconciliation per trial.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info};

use super::aggregate::{
    ScadaAggregates, aggregate_meter_daily, aggregate_meter_monthly, aggregate_scada,
};
use super::reconcile::Reconciler;
use super::summary::{LossSummary, MonthlyLoss, monthly_losses};
use super::trials::SimulationInputs;
use super::types::{ReconcileMode, ReconciledTable, SimulationTrial, TrialOutcome};
use crate::config::{AnalysisConfig, ConfigError, CorrectionThreshold, RunConfig, UncertaintyConfig};
use crate::error::LossError;
use crate::plant::{AnalysisType, Frequency, PlantData};

/// Lifecycle of an [`ElectricalLosses`] analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Aggregates computed; no trial table yet.
    Unconfigured,
    /// Trial table generated; losses not yet computed.
    InputsGenerated,
    /// Every trial evaluated.
    Complete,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::InputsGenerated => write!(f, "inputs generated"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Results of a completed run.
#[derive(Debug, Clone)]
pub struct LossResults {
    /// Loss per trial, indexed like the trial table.
    pub losses: Vec<f64>,
    /// Reconciled table of the last trial.
    pub combined_energy: ReconciledTable,
    /// Totals and loss of the last trial.
    pub last_outcome: TrialOutcome,
}

/// Average electrical losses of a wind plant with Monte Carlo uncertainty.
///
/// Compares turbine SCADA energy with revenue-meter energy over concurrent,
/// fully reporting periods. Daily sums are compared when the meter reports
/// sub-monthly; otherwise completeness-corrected SCADA energy is summed per
/// month and months below the completeness threshold are dropped.
///
/// With uncertainty quantification, each trial scales meter and SCADA totals
/// by factors drawn from `Normal(1, σ)` and samples its own completeness
/// threshold. Without it, exactly one trial runs with unit factors.
///
/// The plant dataset is only read during construction; all aggregates are
/// owned by the engine.
#[derive(Debug)]
pub struct ElectricalLosses {
    run: RunConfig,
    uncertainty: UncertaintyConfig,
    num_sim: usize,
    scada: ScadaAggregates,
    reconciler: Reconciler,
    inputs: Option<SimulationInputs>,
    results: Option<LossResults>,
}

impl ElectricalLosses {
    /// Validates the configuration and plant, then aggregates SCADA and meter data.
    ///
    /// # Arguments
    ///
    /// * `plant` - Dataset validated for [`AnalysisType::ElectricalLosses`]
    /// * `config` - Analysis configuration
    ///
    /// # Errors
    ///
    /// Returns [`LossError::Config`] for invalid configuration and
    /// [`LossError::Precondition`] if `plant` was not validated for this
    /// analysis. Both are checked before any aggregation.
    pub fn new(plant: &PlantData, config: &AnalysisConfig) -> Result<Self, LossError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(LossError::Config(errors));
        }
        if !plant.is_validated_for(AnalysisType::ElectricalLosses) {
            let found = plant
                .analysis_types()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let found = if found.is_empty() {
                "nothing".to_string()
            } else {
                found
            };
            return Err(LossError::Precondition { found });
        }

        info!("initializing electrical losses analysis");
        let num_sim = if config.analysis.uq {
            let num_sim = config.analysis.num_sim;
            info!(num_sim, "uncertainty quantification will be performed");
            num_sim
        } else {
            info!("uncertainty quantification will NOT be performed");
            1
        };

        let meta = plant.metadata();
        let Some(scada_interval) = meta.scada_frequency.interval() else {
            return Err(LossError::Config(vec![ConfigError::new(
                "plant.scada_frequency",
                "must be a fixed cadence",
            )]));
        };

        info!("processing SCADA data");
        let scada = aggregate_scada(plant.scada(), scada_interval, meta.n_turbines)?;

        let reconciler = match meta.meter_frequency {
            Frequency::Monthly => Reconciler::Monthly {
                scada_monthly: scada.monthly.clone(),
                meter_monthly: aggregate_meter_monthly(plant.meter()),
            },
            Frequency::Fixed(meter_interval) => {
                info!("processing meter data");
                Reconciler::Daily {
                    scada_full_count: scada.full_count.clone(),
                    meter_daily: aggregate_meter_daily(plant.meter(), meter_interval)?,
                }
            }
        };
        debug!(mode = %reconciler.mode(), "reconciliation basis selected");

        Ok(Self {
            run: config.analysis.clone(),
            uncertainty: config.uncertainty.clone(),
            num_sim,
            scada,
            reconciler,
            inputs: None,
            results: None,
        })
    }

    /// Generates the trial table and computes every trial's loss.
    ///
    /// # Errors
    ///
    /// See [`Self::setup_inputs`] and [`Self::calculate_electrical_losses`].
    pub fn run(&mut self) -> Result<&LossResults, LossError> {
        self.setup_inputs()?;
        self.calculate_electrical_losses()
    }

    /// Builds the trial table, discarding any earlier results.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::Config`] if the uncertainty settings cannot be sampled.
    pub fn setup_inputs(&mut self) -> Result<(), LossError> {
        let inputs = if self.run.uq {
            let mut rng = match self.run.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            SimulationInputs::sample(&self.uncertainty, self.num_sim, &mut rng)?
        } else {
            let threshold = self.uncertainty.correction_threshold;
            let CorrectionThreshold::Fixed(threshold) = threshold else {
                return Err(LossError::Config(vec![ConfigError::new(
                    "uncertainty.correction_threshold",
                    "must be a single value when analysis.uq = false",
                )]));
            };
            SimulationInputs::deterministic(threshold)
        };
        debug!(trials = inputs.len(), "simulation inputs generated");
        self.inputs = Some(inputs);
        self.results = None;
        Ok(())
    }

    /// Evaluates every trial and stores the loss at the trial's index.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::InputsNotGenerated`] if called before
    /// [`Self::setup_inputs`], or the error of the lowest-index failing trial.
    pub fn calculate_electrical_losses(&mut self) -> Result<&LossResults, LossError> {
        let inputs = self.inputs.as_ref().ok_or(LossError::InputsNotGenerated)?;
        let trials = inputs.trials();
        info!(
            trials = trials.len(),
            mode = %self.reconciler.mode(),
            parallel = self.run.parallel,
            "calculating electrical losses"
        );

        let reconciler = &self.reconciler;
        let evaluate = |t: &SimulationTrial| reconciler.evaluate(t).map(|o| o.loss);
        let outcomes: Vec<Result<f64, LossError>> = if self.run.parallel {
            trials.par_iter().map(evaluate).collect()
        } else {
            trials.iter().map(evaluate).collect()
        };
        let losses: Vec<f64> = outcomes.into_iter().collect::<Result<_, _>>()?;

        let last = trials.last().ok_or(LossError::InputsNotGenerated)?;
        let combined_energy = reconciler.reconcile(last.correction_threshold);
        let last_outcome = super::reconcile::estimate_loss(&combined_energy, last)?;

        let results = self.results.insert(LossResults {
            losses,
            combined_energy,
            last_outcome,
        });
        info!(
            periods = results.combined_energy.len(),
            "electrical losses calculated"
        );
        Ok(results)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        match (&self.inputs, &self.results) {
            (_, Some(_)) => RunState::Complete,
            (Some(_), None) => RunState::InputsGenerated,
            (None, None) => RunState::Unconfigured,
        }
    }

    /// Number of trials run (1 without uncertainty quantification).
    pub fn num_sim(&self) -> usize {
        self.num_sim
    }

    /// Comparison basis chosen from the meter frequency.
    pub fn mode(&self) -> ReconcileMode {
        self.reconciler.mode()
    }

    /// SCADA daily, full-count and monthly aggregates.
    pub fn scada_aggregates(&self) -> &ScadaAggregates {
        &self.scada
    }

    /// The trial table, once generated.
    pub fn inputs(&self) -> Option<&SimulationInputs> {
        self.inputs.as_ref()
    }

    /// Results of the last completed run.
    pub fn results(&self) -> Option<&LossResults> {
        self.results.as_ref()
    }

    /// Per-trial loss estimates.
    pub fn electrical_losses(&self) -> Option<&[f64]> {
        self.results.as_ref().map(|r| r.losses.as_slice())
    }

    /// Reconciled table of the last trial executed.
    pub fn combined_energy(&self) -> Option<&ReconciledTable> {
        self.results.as_ref().map(|r| &r.combined_energy)
    }

    /// Distribution statistics over all trials.
    pub fn summary(&self) -> Option<LossSummary> {
        self.electrical_losses().map(LossSummary::from_losses)
    }

    /// Monthly loss series from the last trial's reconciled table.
    pub fn monthly_losses(&self) -> Option<Vec<MonthlyLoss>> {
        self.combined_energy().map(monthly_losses)
    }
}
