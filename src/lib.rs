//! Wind plant electrical-loss estimation from turbine SCADA and revenue-meter energy.

pub mod config;
pub mod error;
/// CSV import of readings and export of results.
pub mod io;
/// Aggregation, reconciliation and Monte Carlo loss estimation.
pub mod losses;
pub mod plant;

pub use error::LossError;
