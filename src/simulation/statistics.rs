//! Statistics collection and reporting
//!
//! This module contains per-day service statistics and the run-level totals
//! printed at the end of a simulation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::simulation::{DayLog, DayPlan};

/// Service statistics of one simulated (day, replication)
///
/// Serialized as one line of the daily summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStatistics {
    /// Business day
    pub date: NaiveDate,
    /// 1-based replication number
    pub replication: usize,
    /// Arrival rate used for the day in calls per minute
    pub arrival_rate: f64,
    /// Exported calls
    pub calls: usize,
    /// Calls that reached completion
    pub completed: usize,
    /// Calls dropped at the cutoff
    pub unserved: usize,
    /// Calls answered within the target wait
    pub within_target: usize,
    /// Share of calls answered within the target wait
    pub service_level: Option<f64>,
    /// Sum of waiting times in minutes
    pub total_wait: f64,
    /// Mean waiting time in minutes
    pub mean_wait: Option<f64>,
    /// Longest waiting time in minutes
    pub max_wait: Option<f64>,
    /// Share of agent time spent handling calls
    pub utilization: f64,
    /// Most calls in service at one instant
    pub peak_concurrency: usize,
    /// Whether the arrival cap was reached
    pub saturated: bool,
}

impl DayStatistics {
    /// Summarize the log of one replication of `plan`
    pub fn from_log(plan: &DayPlan, replication: usize, log: &DayLog, agents: usize) -> Self {
        Self {
            date: plan.date,
            replication,
            arrival_rate: plan.arrival_rate,
            calls: log.len(),
            completed: log.completed(),
            unserved: log.unserved,
            within_target: log.within_target(),
            service_level: log.service_level(),
            total_wait: log.calls.iter().filter_map(|call| call.waiting_time()).sum(),
            mean_wait: log.mean_wait(),
            max_wait: log.max_wait(),
            utilization: log.utilization(agents),
            peak_concurrency: log.peak_concurrency(),
            saturated: log.saturated,
        }
    }

    /// Share of calls answered within the target, `None` for a day without calls
    pub fn service_level(&self) -> Option<f64> {
        self.service_level
    }

    /// Whether the day met `goal`, `None` for a day without calls
    pub fn meets_goal(&self, goal: f64) -> Option<bool> {
        self.service_level.map(|level| level >= goal)
    }
}

/// A day that could not be simulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedDay {
    /// Business day
    pub date: NaiveDate,
    /// Error message
    pub reason: String,
}

/// Totals across a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatistics {
    /// Business days in the plan
    pub days_planned: usize,
    /// Days whose every replication was simulated
    pub days_simulated: usize,
    /// Replications per day
    pub replications: usize,
    /// Base seed of the run
    pub base_seed: u64,
    /// Service level goal the days are compared against
    pub service_level_goal: f64,
    /// Days skipped because of an error
    pub failed_days: Vec<FailedDay>,
    /// Replications that hit the arrival cap
    pub saturated_days: usize,
    /// Replications that reached the service level goal
    pub days_meeting_goal: usize,
    /// Replications with at least one call
    pub days_with_calls: usize,
    /// Exported calls
    pub total_calls: usize,
    /// Calls that reached completion
    pub completed_calls: usize,
    /// Calls dropped at the cutoff
    pub unserved_calls: usize,
    /// Calls answered within the target
    pub within_target_calls: usize,
    /// Sum of waiting times in minutes
    pub total_wait: f64,
    /// Longest waiting time in minutes
    pub max_wait: f64,
    /// Wall-clock duration of the run
    pub simulation_duration: Duration,
}

impl SimulationStatistics {
    /// Create empty totals for a run
    pub fn new(days_planned: usize, replications: usize, base_seed: u64, service_level_goal: f64) -> Self {
        Self {
            days_planned,
            days_simulated: 0,
            replications,
            base_seed,
            service_level_goal,
            failed_days: Vec::new(),
            saturated_days: 0,
            days_meeting_goal: 0,
            days_with_calls: 0,
            total_calls: 0,
            completed_calls: 0,
            unserved_calls: 0,
            within_target_calls: 0,
            total_wait: 0.0,
            max_wait: 0.0,
            simulation_duration: Duration::ZERO,
        }
    }

    /// Add one simulated replication
    pub fn record_replication(&mut self, day: &DayStatistics) {
        self.total_calls += day.calls;
        self.completed_calls += day.completed;
        self.unserved_calls += day.unserved;
        self.within_target_calls += day.within_target;
        self.total_wait += day.total_wait;
        if let Some(max_wait) = day.max_wait {
            self.max_wait = self.max_wait.max(max_wait);
        }
        if day.saturated {
            self.saturated_days += 1;
        }
        if day.calls > 0 {
            self.days_with_calls += 1;
        }
        if day.meets_goal(self.service_level_goal) == Some(true) {
            self.days_meeting_goal += 1;
        }
    }

    /// Count a day whose replications were all recorded
    pub fn record_day_completed(&mut self) {
        self.days_simulated += 1;
    }

    /// Count a day that was skipped
    pub fn record_failure(&mut self, date: NaiveDate, reason: impl Into<String>) {
        self.failed_days.push(FailedDay { date, reason: reason.into() });
    }

    /// Set the wall-clock duration of the run
    pub fn set_simulation_duration(&mut self, duration: Duration) {
        self.simulation_duration = duration;
    }

    /// Share of all calls answered within the target
    pub fn service_level(&self) -> Option<f64> {
        if self.total_calls == 0 {
            return None;
        }
        Some(self.within_target_calls as f64 / self.total_calls as f64)
    }

    /// Mean waiting time over all calls
    pub fn mean_wait(&self) -> Option<f64> {
        if self.total_calls == 0 {
            return None;
        }
        Some(self.total_wait / self.total_calls as f64)
    }

    /// Average exported calls per simulated replication
    pub fn average_calls_per_day(&self) -> f64 {
        let replications = self.days_simulated * self.replications;
        if replications == 0 {
            return 0.0;
        }
        self.total_calls as f64 / replications as f64
    }

    /// Share of replications with calls that reached the goal
    pub fn goal_attainment(&self) -> Option<f64> {
        if self.days_with_calls == 0 {
            return None;
        }
        Some(self.days_meeting_goal as f64 / self.days_with_calls as f64)
    }

    /// One-line summary
    pub fn compact_summary(&self) -> String {
        format!(
            "{} days, {} calls, service level {}, mean wait {}",
            self.days_simulated,
            self.total_calls,
            percentage(self.service_level()),
            minutes(self.mean_wait()),
        )
    }

    /// Generate a comprehensive summary report
    pub fn generate_summary_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Simulation Summary Report ===\n\n");

        report.push_str(&format!(
            "Simulation Duration: {:.2} seconds\n",
            self.simulation_duration.as_secs_f64()
        ));
        report.push_str(&format!("Base Seed: {}\n", self.base_seed));
        report.push_str(&format!(
            "Days Simulated: {} of {} ({} replication(s) per day)\n\n",
            self.days_simulated, self.days_planned, self.replications
        ));

        report.push_str("Call Statistics:\n");
        report.push_str(&format!(
            "  • Total Calls: {} (avg {:.1}/day)\n",
            self.total_calls,
            self.average_calls_per_day()
        ));
        report.push_str(&format!("  • Completed Calls: {}\n", self.completed_calls));
        if self.unserved_calls > 0 {
            report.push_str(&format!("  • Unserved Calls: {}\n", self.unserved_calls));
        }
        report.push_str(&format!("  • Mean Wait: {}\n", minutes(self.mean_wait())));
        report.push_str(&format!("  • Max Wait: {:.2} min\n\n", self.max_wait));

        report.push_str("Service Level:\n");
        report.push_str(&format!(
            "  • Within Target: {} ({})\n",
            self.within_target_calls,
            percentage(self.service_level())
        ));
        report.push_str(&format!(
            "  • Days Meeting {:.0}% Goal: {} ({})\n",
            self.service_level_goal * 100.0,
            self.days_meeting_goal,
            percentage(self.goal_attainment())
        ));
        report.push_str(&format!("  • Saturated Days: {}\n", self.saturated_days));

        if !self.failed_days.is_empty() {
            report.push_str(&format!("\nFailed Days: {}\n", self.failed_days.len()));
            for failed in &self.failed_days {
                report.push_str(&format!("  • {}: {}\n", failed.date, failed.reason));
            }
        }

        report
    }
}

fn percentage(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn minutes(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2} min", v))
}

impl fmt::Display for SimulationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate_summary_report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(calls: usize, within_target: usize, saturated: bool) -> DayStatistics {
        DayStatistics {
            date: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            replication: 1,
            arrival_rate: 1.0,
            calls,
            completed: calls,
            unserved: 0,
            within_target,
            service_level: (calls > 0).then(|| within_target as f64 / calls as f64),
            total_wait: calls as f64 * 0.5,
            mean_wait: (calls > 0).then_some(0.5),
            max_wait: (calls > 0).then_some(2.0),
            utilization: 0.5,
            peak_concurrency: 1,
            saturated,
        }
    }

    #[test]
    fn test_empty_statistics_have_no_rates() {
        let stats = SimulationStatistics::new(10, 1, 7, 0.9);
        assert_eq!(stats.service_level(), None);
        assert_eq!(stats.mean_wait(), None);
        assert_eq!(stats.goal_attainment(), None);
        assert_eq!(stats.average_calls_per_day(), 0.0);
        assert!(stats.compact_summary().contains("n/a"));
    }

    #[test]
    fn test_record_replication_accumulates() {
        let mut stats = SimulationStatistics::new(3, 1, 7, 0.9);
        stats.record_replication(&day(10, 10, false));
        stats.record_day_completed();
        stats.record_replication(&day(10, 5, true));
        stats.record_day_completed();
        stats.record_replication(&day(0, 0, false));
        stats.record_day_completed();

        assert_eq!(stats.days_simulated, 3);
        assert_eq!(stats.total_calls, 20);
        assert_eq!(stats.within_target_calls, 15);
        assert_eq!(stats.service_level(), Some(0.75));
        assert_eq!(stats.mean_wait(), Some(0.5));
        assert_eq!(stats.max_wait, 2.0);
        assert_eq!(stats.saturated_days, 1);
        assert_eq!(stats.days_with_calls, 2);
        assert_eq!(stats.days_meeting_goal, 1);
        assert_eq!(stats.goal_attainment(), Some(0.5));
    }

    #[test]
    fn test_day_without_calls_does_not_meet_or_miss_goal() {
        assert_eq!(day(0, 0, false).meets_goal(0.9), None);
        assert_eq!(day(10, 9, false).meets_goal(0.9), Some(true));
        assert_eq!(day(10, 8, false).meets_goal(0.9), Some(false));
    }

    #[test]
    fn test_report_lists_failed_days() {
        let mut stats = SimulationStatistics::new(2, 1, 7, 0.9);
        stats.record_replication(&day(4, 4, false));
        stats.record_day_completed();
        stats.record_failure(NaiveDate::from_ymd_opt(2021, 1, 5).unwrap(), "bad rate");

        let report = stats.to_string();
        assert!(report.contains("Days Simulated: 1 of 2"));
        assert!(report.contains("Failed Days: 1"));
        assert!(report.contains("2021-01-05: bad rate"));
        assert!(report.contains("Base Seed: 7"));
    }

    #[test]
    fn test_day_statistics_json_fields() {
        let value = serde_json::to_value(day(0, 0, false)).unwrap();
        assert_eq!(value["date"], "2021-01-04");
        assert!(value["service_level"].is_null());
        assert_eq!(value["saturated"], false);
    }
}
