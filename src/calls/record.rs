//! Exported call rows
//!
//! This module contains the flat row written to the call table, in the column
//! order downstream notebooks expect, along with its CSV encoding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Call;
use crate::types::CallId;

/// Header of the CSV call table
pub const CSV_HEADER: &str =
    "name,start_time,end_time,activity_time,finished,replication,waiting_time,date,arrival_time,within_target";

const CSV_COLUMNS: usize = 10;

/// One row of the exported call table
///
/// The first eight fields are the dataset contract. `arrival_time` and
/// `within_target` follow so the derived columns can be recomputed from the
/// table alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Call identifier (`customer<N>`)
    pub name: CallId,
    /// Service start in minutes since the day window opened
    pub start_time: f64,
    /// Service end in minutes since the day window opened
    pub end_time: f64,
    /// Handled duration in minutes
    pub activity_time: f64,
    /// Whether the call completed
    pub finished: bool,
    /// 1-based replication number within the day
    pub replication: usize,
    /// Minutes spent queueing
    pub waiting_time: f64,
    /// Business day the call belongs to
    pub date: NaiveDate,
    /// Arrival in minutes since the day window opened
    pub arrival_time: f64,
    /// Whether the wait met the target threshold
    pub within_target: bool,
}

impl CallRecord {
    /// Build the exported row for a served call
    ///
    /// Returns `None` for calls that never reached an agent.
    pub fn from_call(call: &Call, date: NaiveDate, replication: usize, target_wait: f64) -> Option<Self> {
        let start_time = call.start_time?;
        let end_time = call.end_time?;
        let activity_time = call.service_time?;
        let waiting_time = start_time - call.arrival_time;

        Some(Self {
            name: call.id,
            start_time,
            end_time,
            activity_time,
            finished: call.is_finished(),
            replication,
            waiting_time,
            date,
            arrival_time: call.arrival_time,
            within_target: waiting_time <= target_wait,
        })
    }

    /// Encode this row as one CSV line (without the trailing newline)
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            self.name,
            self.start_time,
            self.end_time,
            self.activity_time,
            self.finished,
            self.replication,
            self.waiting_time,
            self.date.format("%Y-%m-%d"),
            self.arrival_time,
            self.within_target,
        )
    }

    /// Decode one CSV line produced by [`CallRecord::to_csv_row`]
    pub fn from_csv_row(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.trim_end().split(',').collect();
        if fields.len() != CSV_COLUMNS {
            return Err(format!("expected {} columns, got {}", CSV_COLUMNS, fields.len()));
        }

        let float = |index: usize| -> Result<f64, String> {
            fields[index]
                .parse::<f64>()
                .map_err(|e| format!("column {}: {}", index, e))
        };
        let flag = |index: usize| -> Result<bool, String> {
            fields[index]
                .parse::<bool>()
                .map_err(|e| format!("column {}: {}", index, e))
        };

        let name = fields[0]
            .strip_prefix(crate::types::CALL_ID_PREFIX)
            .and_then(|digits| digits.parse::<u64>().ok())
            .map(CallId::new)
            .ok_or_else(|| format!("invalid call name: {}", fields[0]))?;
        let replication = fields[5]
            .parse::<usize>()
            .map_err(|e| format!("column 5: {}", e))?;
        let date = NaiveDate::parse_from_str(fields[7], "%Y-%m-%d")
            .map_err(|e| format!("column 7: {}", e))?;

        Ok(Self {
            name,
            start_time: float(1)?,
            end_time: float(2)?,
            activity_time: float(3)?,
            finished: flag(4)?,
            replication,
            waiting_time: float(6)?,
            date,
            arrival_time: float(8)?,
            within_target: flag(9)?,
        })
    }

    /// Recompute the waiting time from the stored timestamps
    pub fn derived_waiting_time(&self) -> f64 {
        self.start_time - self.arrival_time
    }

    /// Recompute the target flag from the stored timestamps
    pub fn derived_within_target(&self, target_wait: f64) -> bool {
        self.derived_waiting_time() <= target_wait
    }
}
