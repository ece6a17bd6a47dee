//! Sampling-frequency codes and expected-count arithmetic.
//!
//! Frequencies use pandas-style offset codes (`10min`, `10T`, `1H`, `D`) for
//! fixed cadences and a small set of markers (`MS`, `M`, `1MS`, `1M`) for
//! monthly revenue-meter data.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::config::ConfigError;
use crate::error::LossError;

/// Codes that mark a monthly reporting cadence.
pub const MONTHLY_MARKERS: &[&str] = &["MS", "M", "1MS", "1M"];

/// Sampling cadence of a SCADA or meter series.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use wind_losses::plant::frequency::Frequency;
///
/// let f: Frequency = "10min".parse().unwrap();
/// assert_eq!(f.interval(), Some(TimeDelta::minutes(10)));
/// assert!("MS".parse::<Frequency>().unwrap().is_monthly());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Fixed sampling interval.
    Fixed(TimeDelta),
    /// One value per calendar month.
    Monthly,
}

impl Frequency {
    /// Parses a frequency code.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::Frequency`] for an unknown unit, a zero
    /// multiplier, or an interval too large to represent.
    pub fn parse(code: &str) -> Result<Self, LossError> {
        let code = code.trim();
        if MONTHLY_MARKERS.contains(&code) {
            return Ok(Self::Monthly);
        }

        let invalid = |reason: &str| LossError::Frequency {
            code: code.to_string(),
            reason: reason.to_string(),
        };

        let split = code.find(|c: char| !c.is_ascii_digit()).unwrap_or(code.len());
        let (digits, unit) = code.split_at(split);
        let multiplier: i64 = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| invalid("multiplier is not an integer"))?
        };
        if multiplier == 0 {
            return Err(invalid("multiplier must be > 0"));
        }

        let unit_seconds: i64 = match unit {
            "S" | "s" | "sec" => 1,
            "T" | "min" => 60,
            "H" | "h" => 3_600,
            "D" => 86_400,
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unit must be one of S, T/min, H, D or a monthly marker")),
        };

        multiplier
            .checked_mul(unit_seconds)
            .and_then(TimeDelta::try_seconds)
            .map(Self::Fixed)
            .ok_or_else(|| invalid("interval is out of range"))
    }

    /// Returns `true` for monthly cadence.
    pub fn is_monthly(&self) -> bool {
        matches!(self, Self::Monthly)
    }

    /// The fixed sampling interval, or `None` for monthly data.
    pub fn interval(&self) -> Option<TimeDelta> {
        match self {
            Self::Fixed(interval) => Some(*interval),
            Self::Monthly => None,
        }
    }

    /// Returns `true` if at least one sample per day is expected.
    pub fn is_at_most_daily(&self) -> bool {
        self.interval().is_some_and(|i| i <= TimeDelta::days(1))
    }
}

impl FromStr for Frequency {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self::Fixed(interval) = self else {
            return write!(f, "MS");
        };
        let secs = interval.num_seconds();
        if secs % 86_400 == 0 {
            write!(f, "{}D", secs / 86_400)
        } else if secs % 3_600 == 0 {
            write!(f, "{}H", secs / 3_600)
        } else if secs % 60 == 0 {
            write!(f, "{}min", secs / 60)
        } else {
            write!(f, "{secs}S")
        }
    }
}

/// Expected number of samples for perfect reporting over `period`.
///
/// Computed as `period / interval * units`. The result is not rounded: a
/// cadence that does not divide the period evenly can never be matched by an
/// observed count.
///
/// # Arguments
///
/// * `interval` - Nominal sampling interval
/// * `period` - Length of the reporting period (a day, a month)
/// * `units` - Number of reporting units (turbines, or 1 for the meter)
///
/// # Errors
///
/// Returns [`LossError::Config`] if `interval` or `period` is not positive or
/// `units` is zero.
pub fn expected_count(
    interval: TimeDelta,
    period: TimeDelta,
    units: usize,
) -> Result<f64, LossError> {
    let mut errors = Vec::new();
    if interval <= TimeDelta::zero() {
        errors.push(ConfigError::new("frequency.interval", "must be > 0"));
    }
    if period <= TimeDelta::zero() {
        errors.push(ConfigError::new("frequency.period", "must be > 0"));
    }
    if units == 0 {
        errors.push(ConfigError::new("frequency.units", "must be > 0"));
    }
    if !errors.is_empty() {
        return Err(LossError::Config(errors));
    }

    let per_unit = period.num_milliseconds() as f64 / interval.num_milliseconds() as f64;
    Ok(per_unit * units as f64)
}

/// Expected samples in one calendar day.
///
/// # Errors
///
/// See [`expected_count`].
pub fn expected_daily_count(interval: TimeDelta, units: usize) -> Result<f64, LossError> {
    expected_count(interval, TimeDelta::days(1), units)
}

/// Expected samples in the calendar month containing `date`.
///
/// # Errors
///
/// See [`expected_count`].
pub fn expected_monthly_count(
    interval: TimeDelta,
    date: NaiveDate,
    units: usize,
) -> Result<f64, LossError> {
    let days = TimeDelta::days(i64::from(days_in_month(date)));
    expected_count(interval, days, units)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(i64::from(date.day0()))
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let start = month_start(date);
    // day 32 after the 1st always lands in the following month
    let next = month_start(start + TimeDelta::days(31));
    (next - start).num_days() as u32
}
