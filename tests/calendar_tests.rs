//! Tests for the calendar driver
//!
//! These tests verify business-day enumeration and that daily arrival rates
//! follow the calendar coefficients, stay positive and are reproducible.

use callcentre_simulator::simulation::{business_days, CalendarDriver};
use callcentre_simulator::types::CalendarCoefficients;
use chrono::{Datelike, NaiveDate, Weekday};

fn quiet_coefficients() -> CalendarCoefficients {
    CalendarCoefficients { noise_std: 0.0, ..Default::default() }
}

#[test]
fn test_default_year_has_261_business_days() {
    let days = business_days(2021).unwrap();
    assert_eq!(days.len(), 261);
    assert!(days
        .iter()
        .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
    assert!(days.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_plan_covers_every_business_day_in_order() {
    let driver = CalendarDriver::new(1.5, CalendarCoefficients::default(), 2021, None).unwrap();
    let plans = driver.plan(42).unwrap();

    let days = business_days(2021).unwrap();
    assert_eq!(plans.len(), days.len());
    for (index, (plan, date)) in plans.iter().zip(&days).enumerate() {
        assert_eq!(plan.index, index);
        assert_eq!(plan.date, *date);
        assert!(plan.arrival_rate > 0.0);
    }
}

#[test]
fn test_rates_without_noise_follow_coefficients() {
    let coefficients = quiet_coefficients();
    let driver = CalendarDriver::new(2.0, coefficients.clone(), 2021, None).unwrap();
    let plans = driver.plan(1).unwrap();

    for plan in &plans {
        assert_eq!(plan.arrival_rate, driver.expected_rate(plan.date));
    }

    // Monday 4 January 2021: January, Monday, first week, start of the year
    let monday = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    let expected = 2.0
        * coefficients.month[0]
        * coefficients.weekday[0]
        * coefficients.week_of_month[0]
        * (1.0 + coefficients.trend * 3.0 / 365.0);
    assert!((driver.expected_rate(monday) - expected).abs() < 1e-12);
}

#[test]
fn test_monday_is_busier_than_friday_by_default() {
    let driver = CalendarDriver::new(1.5, quiet_coefficients(), 2021, None).unwrap();
    let monday = NaiveDate::from_ymd_opt(2021, 3, 8).unwrap();
    let friday = NaiveDate::from_ymd_opt(2021, 3, 12).unwrap();
    assert!(driver.expected_rate(monday) > driver.expected_rate(friday));
}

#[test]
fn test_rates_stay_positive_under_heavy_noise() {
    let coefficients = CalendarCoefficients { noise_std: 5.0, ..Default::default() };
    let driver = CalendarDriver::new(1.5, coefficients, 2021, None).unwrap();

    for seed in 0..5 {
        let plans = driver.plan(seed).unwrap();
        assert!(plans.iter().all(|p| p.arrival_rate >= driver.rate_floor()));
        // With this much noise some days must hit the floor
        assert!(plans.iter().any(|p| p.arrival_rate == driver.rate_floor()));
    }
}

#[test]
fn test_noise_has_zero_mean() {
    let noisy = CalendarDriver::new(1.5, CalendarCoefficients::default(), 2021, None).unwrap();
    let plans = noisy.plan(7).unwrap();

    let deviation: f64 = plans
        .iter()
        .map(|p| p.arrival_rate - noisy.expected_rate(p.date))
        .sum::<f64>()
        / plans.len() as f64;
    // Noise std is 0.15 calls/min, so the mean over 261 days is within 0.05
    assert!(deviation.abs() < 0.05, "mean deviation {}", deviation);
}

#[test]
fn test_days_limit_is_a_prefix_of_the_full_plan() {
    let coefficients = CalendarCoefficients::default();
    let full = CalendarDriver::new(1.5, coefficients.clone(), 2021, None)
        .unwrap()
        .plan(99)
        .unwrap();
    let limited = CalendarDriver::new(1.5, coefficients, 2021, Some(10))
        .unwrap()
        .plan(99)
        .unwrap();

    assert_eq!(limited.len(), 10);
    assert_eq!(limited[..], full[..10]);
}

#[test]
fn test_plan_is_reproducible() {
    let driver = CalendarDriver::new(1.5, CalendarCoefficients::default(), 2022, None).unwrap();
    assert_eq!(driver.plan(5).unwrap(), driver.plan(5).unwrap());
    assert_ne!(driver.plan(5).unwrap(), driver.plan(6).unwrap());
}
