//! Error types and handling
//!
//! A failure while simulating one business day is isolated to that day:
//! the [`ErrorHandler`] decides whether the run skips the day or stops.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::types::ConfigValidationError;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// Arrival generation failed
    #[error("Arrival generation failed: {0}")]
    ArrivalGenerationError(String),

    /// A call was moved through an invalid lifecycle transition
    #[error("Invalid call state transition: {0}")]
    CallStateError(String),

    /// Calendar planning failed
    #[error("Calendar error: {0}")]
    CalendarError(String),

    /// A single day could not be simulated
    #[error("Day simulation failed: {0}")]
    DaySimulationError(String),

    /// Writing the export failed
    #[error("Output error: {0}")]
    OutputError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an arrival generation error
    pub fn arrival_generation_error(msg: impl Into<String>) -> Self {
        Self::ArrivalGenerationError(msg.into())
    }

    /// Create a call state error
    pub fn call_state_error(msg: impl Into<String>) -> Self {
        Self::CallStateError(msg.into())
    }

    /// Create a calendar error
    pub fn calendar_error(msg: impl Into<String>) -> Self {
        Self::CalendarError(msg.into())
    }

    /// Create a day simulation error
    pub fn day_simulation_error(msg: impl Into<String>) -> Self {
        Self::DaySimulationError(msg.into())
    }

    /// Create an output error
    pub fn output_error(msg: impl Into<String>) -> Self {
        Self::OutputError(msg.into())
    }

    /// Whether the error only affects the day it was raised on
    ///
    /// Configuration, calendar and output errors are fatal for the whole run.
    pub fn is_day_scoped(&self) -> bool {
        matches!(
            self,
            SimulationError::ArrivalGenerationError(_)
                | SimulationError::CallStateError(_)
                | SimulationError::DaySimulationError(_)
        )
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::ArrivalGenerationError(_) => "Arrival Generation",
            SimulationError::CallStateError(_) => "Call State",
            SimulationError::CalendarError(_) => "Calendar",
            SimulationError::DaySimulationError(_) => "Day Simulation",
            SimulationError::OutputError(_) => "Output",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// What the run does after a failed day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Skip the day and continue with the next one
    Skip,
    /// Stop the run
    Abort,
}

/// Where an error happened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryContext {
    /// Business day being simulated
    pub date: Option<NaiveDate>,
}

impl RecoveryContext {
    /// Context for a failure while simulating `date`
    pub fn for_day(date: NaiveDate) -> Self {
        Self { date: Some(date) }
    }
}

/// Maps failed days to a [`RecoveryStrategy`]
///
/// Day-scoped errors skip the day, every other error aborts the run.
#[derive(Debug, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    /// Create a new error handler
    pub fn new() -> Self {
        Self
    }

    /// Log `error` and decide how the run continues
    pub fn handle_error(
        &self,
        error: &SimulationError,
        context: &RecoveryContext,
    ) -> RecoveryStrategy {
        if let Some(date) = context.date {
            debug!("Failed business day: {}", date);
        }

        if error.is_day_scoped() {
            warn!("Recoverable error in {}: {}", error.category(), error);
            RecoveryStrategy::Skip
        } else {
            error!("Critical error in {}: {}", error.category(), error);
            RecoveryStrategy::Abort
        }
    }
}
