/// Daily and monthly SCADA and meter aggregation.
pub mod aggregate;
pub mod engine;
/// Reconciliation of turbine and meter aggregates per trial.
pub mod reconcile;
pub mod summary;
/// Monte Carlo trial table generation.
pub mod trials;
pub mod types;

pub use engine::{ElectricalLosses, LossResults, RunState};
pub use summary::{LossSummary, MonthlyLoss};
pub use types::{ReconcileMode, ReconciledPeriod, ReconciledTable, SimulationTrial};
