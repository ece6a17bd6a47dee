//! Monte Carlo trial table: one row of scale factors and threshold per trial.

use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use super::types::SimulationTrial;
use crate::config::{ConfigError, CorrectionThreshold, UncertaintyConfig};
use crate::error::LossError;

/// Table of trial parameters, generated once before the trial loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInputs {
    trials: Vec<SimulationTrial>,
}

impl SimulationInputs {
    /// The single deterministic trial: unit scale factors and a fixed threshold.
    pub fn deterministic(correction_threshold: f64) -> Self {
        Self {
            trials: vec![SimulationTrial {
                index: 0,
                meter_data_fraction: 1.0,
                scada_data_fraction: 1.0,
                correction_threshold,
            }],
        }
    }

    /// Draws `num_sim` trials.
    ///
    /// Meter and SCADA scale factors come from independent `Normal(1, σ)`
    /// distributions; thresholds are drawn uniformly on a grid matching the
    /// decimal resolution of the configured bounds. All meter factors are
    /// drawn first, then all SCADA factors, then all thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::Config`] if σ is not a valid standard deviation,
    /// the threshold is not a `[lower, upper]` pair, or the bounds collapse
    /// to an empty grid.
    pub fn sample(
        uncertainty: &UncertaintyConfig,
        num_sim: usize,
        rng: &mut StdRng,
    ) -> Result<Self, LossError> {
        let CorrectionThreshold::Range([lower, upper]) = uncertainty.correction_threshold else {
            return Err(LossError::Config(vec![ConfigError::new(
                "uncertainty.correction_threshold",
                "must be a [lower, upper] pair for Monte Carlo sampling",
            )]));
        };

        let meter = normal("uncertainty.meter", uncertainty.meter)?;
        let scada = normal("uncertainty.scada", uncertainty.scada)?;
        let grid = ThresholdGrid::new(lower, upper).map_err(|e| LossError::Config(vec![e]))?;

        let meter_fractions: Vec<f64> = (0..num_sim).map(|_| meter.sample(rng)).collect();
        let scada_fractions: Vec<f64> = (0..num_sim).map(|_| scada.sample(rng)).collect();
        let thresholds: Vec<f64> = (0..num_sim).map(|_| grid.sample(rng)).collect();

        let trials = meter_fractions
            .into_iter()
            .zip(scada_fractions)
            .zip(thresholds)
            .enumerate()
            .map(
                |(index, ((meter_data_fraction, scada_data_fraction), correction_threshold))| {
                    SimulationTrial {
                        index,
                        meter_data_fraction,
                        scada_data_fraction,
                        correction_threshold,
                    }
                },
            )
            .collect();

        Ok(Self { trials })
    }

    pub fn trials(&self) -> &[SimulationTrial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

fn normal(field: &str, std_dev: f64) -> Result<Normal<f64>, LossError> {
    Normal::new(1.0, std_dev)
        .map_err(|e| LossError::Config(vec![ConfigError::new(field, e.to_string())]))
}

/// Finest threshold resolution; `10^15` keeps scaled bounds exact in an `f64`.
const MAX_THRESHOLD_DECIMALS: u32 = 15;

/// Integer grid `[lo, hi)` scaled by `10^decimals`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ThresholdGrid {
    lo: i64,
    hi: i64,
    scale: f64,
}

impl ThresholdGrid {
    /// Builds the grid for bounds inside `(0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if either bound needs more than
    /// [`MAX_THRESHOLD_DECIMALS`] decimal places or the grid is empty.
    pub(crate) fn new(lower: f64, upper: f64) -> Result<Self, ConfigError> {
        let field = "uncertainty.correction_threshold";
        let decimals = decimal_places(lower).max(decimal_places(upper));
        if decimals > MAX_THRESHOLD_DECIMALS {
            return Err(ConfigError::new(
                field,
                format!(
                    "bounds [{lower}, {upper}] need {decimals} decimal places, \
                     at most {MAX_THRESHOLD_DECIMALS} are supported"
                ),
            ));
        }

        let scale = 10_f64.powi(decimals as i32);
        let lo = (lower * scale).round() as i64;
        let hi = (upper * scale).round() as i64;
        if lo >= hi {
            return Err(ConfigError::new(
                field,
                format!("bounds [{lower}, {upper}] leave no threshold to sample"),
            ));
        }
        Ok(Self { lo, hi, scale })
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        rng.random_range(self.lo..self.hi) as f64 / self.scale
    }
}

/// Digits after the decimal point in the shortest representation of `x`.
fn decimal_places(x: f64) -> u32 {
    let repr = x.to_string();
    repr.split_once('.').map_or(0, |(_, frac)| frac.len() as u32)
}
