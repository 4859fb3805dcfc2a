//! Business-day calendar and per-day arrival rates
//!
//! The driver turns a base arrival rate into one rate per business day by
//! applying month, weekday and week-of-month multipliers, a linear trend across
//! the year and additive Gaussian noise.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::simulation::{SimulationError, SimulationResult};
use crate::types::CalendarCoefficients;

/// Mixed into the base seed so calendar noise never shares a stream with a day
const NOISE_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Every Monday to Friday date of `year`, in order
///
/// Public holidays are not removed.
pub fn business_days(year: i32) -> SimulationResult<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| SimulationError::calendar_error(format!("year {} is out of range", year)))?;

    Ok(first
        .iter_days()
        .take_while(|date| date.year() == year)
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .collect())
}

/// Zero-based week-of-month position (days 1-7 are week 0, 29-31 week 4)
pub fn week_of_month(date: NaiveDate) -> usize {
    (date.day0() / 7) as usize
}

/// Share of the year elapsed before `date`, in `[0, 1)`
pub fn year_fraction(date: NaiveDate) -> f64 {
    let days_in_year = if is_leap_year(date.year()) { 366.0 } else { 365.0 };
    date.ordinal0() as f64 / days_in_year
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// One business day to simulate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Zero-based position in the run
    pub index: usize,
    /// Calendar date
    pub date: NaiveDate,
    /// Arrival rate in calls per minute, strictly positive
    pub arrival_rate: f64,
}

/// Calendar-driven arrival rates for one year
#[derive(Debug, Clone)]
pub struct CalendarDriver {
    base_rate: f64,
    coefficients: CalendarCoefficients,
    year: i32,
    days_limit: Option<usize>,
}

impl CalendarDriver {
    /// Create a driver for `year`, optionally limited to its first `days_limit` business days
    pub fn new(
        base_rate: f64,
        coefficients: CalendarCoefficients,
        year: i32,
        days_limit: Option<usize>,
    ) -> SimulationResult<Self> {
        if !base_rate.is_finite() || base_rate <= 0.0 {
            return Err(SimulationError::calendar_error(format!(
                "base arrival rate must be positive, got {}",
                base_rate
            )));
        }
        if !coefficients.noise_std.is_finite() || coefficients.noise_std < 0.0 {
            return Err(SimulationError::calendar_error(format!(
                "noise standard deviation must be non-negative, got {}",
                coefficients.noise_std
            )));
        }
        if !coefficients.min_rate_fraction.is_finite() || coefficients.min_rate_fraction <= 0.0 {
            return Err(SimulationError::calendar_error(format!(
                "minimum rate fraction must be positive, got {}",
                coefficients.min_rate_fraction
            )));
        }
        Ok(Self { base_rate, coefficients, year, days_limit })
    }

    /// Base arrival rate before calendar effects
    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    /// Lowest rate any day can be given
    pub fn rate_floor(&self) -> f64 {
        self.coefficients.min_rate_fraction * self.base_rate
    }

    /// Deterministic part of the rate for `date`
    pub fn expected_rate(&self, date: NaiveDate) -> f64 {
        let c = &self.coefficients;
        let month = c.month[date.month0() as usize];
        // Weekend dates borrow the Friday multiplier
        let weekday = c.weekday[(date.weekday().num_days_from_monday() as usize).min(4)];
        let week = c.week_of_month[week_of_month(date)];
        self.base_rate * month * weekday * week * (1.0 + c.trend * year_fraction(date))
    }

    /// Rate for `date` given a noise draw, floored to stay strictly positive
    pub fn arrival_rate(&self, date: NaiveDate, noise: f64) -> f64 {
        let rate = self.expected_rate(date) + noise;
        if rate.is_nan() {
            return self.rate_floor();
        }
        rate.max(self.rate_floor())
    }

    /// Ordered day plans for the run
    ///
    /// Noise is drawn from a stream seeded from `seed` alone, in date order,
    /// so the plan does not depend on how days are later scheduled.
    #[instrument(skip(self), fields(year = self.year))]
    pub fn plan(&self, seed: u64) -> SimulationResult<Vec<DayPlan>> {
        let mut dates = business_days(self.year)?;
        if let Some(limit) = self.days_limit {
            dates.truncate(limit);
        }

        let noise = Normal::new(0.0, self.coefficients.noise_std * self.base_rate)
            .map_err(|e| SimulationError::calendar_error(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(seed ^ NOISE_STREAM_SALT);

        let plans: Vec<DayPlan> = dates
            .into_iter()
            .enumerate()
            .map(|(index, date)| DayPlan {
                index,
                date,
                arrival_rate: self.arrival_rate(date, noise.sample(&mut rng)),
            })
            .collect();

        debug!("Planned {} business days", plans.len());
        Ok(plans)
    }
}
