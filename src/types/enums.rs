//! Enumeration types for the call-centre simulator
//!
//! This module contains the call lifecycle states, end-of-day modes and output
//! formats used throughout the simulation system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a single call
///
/// Transitions only move forward: `Arrived -> Waiting -> InService -> Completed`.
/// `Waiting` may last zero minutes when an agent is free on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CallState {
    /// The call has entered the system
    Arrived,
    /// The call is queued until an agent frees up
    Waiting,
    /// An agent is handling the call
    InService,
    /// The call has been fully handled
    Completed,
}

impl CallState {
    /// Whether the call may move from this state to `next`
    pub fn can_transition_to(self, next: CallState) -> bool {
        next > self
    }

    /// Whether this is the terminal state
    pub fn is_terminal(self) -> bool {
        self == CallState::Completed
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallState::Arrived => write!(f, "Arrived"),
            CallState::Waiting => write!(f, "Waiting"),
            CallState::InService => write!(f, "In Service"),
            CallState::Completed => write!(f, "Completed"),
        }
    }
}

/// What happens to calls still in the system when the day window closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndOfDayMode {
    /// Queued and in-service calls run to completion
    Complete,
    /// Service is cut off at a configured instant
    Truncate,
}

impl fmt::Display for EndOfDayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndOfDayMode::Complete => write!(f, "complete"),
            EndOfDayMode::Truncate => write!(f, "truncate"),
        }
    }
}

impl FromStr for EndOfDayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" | "completion" | "run-to-completion" => Ok(EndOfDayMode::Complete),
            "truncate" | "cutoff" => Ok(EndOfDayMode::Truncate),
            _ => Err(format!("Unknown end-of-day policy: {}", s)),
        }
    }
}

/// Output format options for the exported call table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// JSON lines, one object per call
    Json,
    /// CSV with a header row
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
