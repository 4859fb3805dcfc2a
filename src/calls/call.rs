//! Calls and their lifecycle
//!
//! A [`Call`] is created when it arrives, is assigned a service start and a
//! service duration exactly once, and never moves backwards through its states.

use serde::{Deserialize, Serialize};

use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{CallId, CallState};

/// One arrival into the call centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Arrival sequence identifier
    pub id: CallId,
    /// Minutes since the start of the day window
    pub arrival_time: f64,
    /// Minutes at which an agent picked the call up
    pub start_time: Option<f64>,
    /// Sampled handling duration in minutes
    pub service_time: Option<f64>,
    /// Minutes at which the agent released the call
    pub end_time: Option<f64>,
    /// Current lifecycle state
    pub state: CallState,
}

impl Call {
    /// Create a call that has just arrived
    pub fn new(id: CallId, arrival_time: f64) -> Self {
        Self {
            id,
            arrival_time,
            start_time: None,
            service_time: None,
            end_time: None,
            state: CallState::Arrived,
        }
    }

    fn transition(&mut self, next: CallState) -> SimulationResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(SimulationError::call_state_error(format!(
                "{} cannot move from {} to {}",
                self.id, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }

    /// Put the call in the queue because no agent is free
    pub fn enqueue(&mut self) -> SimulationResult<()> {
        self.transition(CallState::Waiting)
    }

    /// Hand the call to an agent
    ///
    /// Fails if the call is already being served or if service would start
    /// before the call arrived.
    pub fn begin_service(&mut self, start_time: f64, service_time: f64) -> SimulationResult<()> {
        if start_time < self.arrival_time {
            return Err(SimulationError::call_state_error(format!(
                "{} cannot start service at {} before arriving at {}",
                self.id, start_time, self.arrival_time
            )));
        }
        if service_time.is_nan() || service_time <= 0.0 {
            return Err(SimulationError::call_state_error(format!(
                "{} has non-positive service time {}",
                self.id, service_time
            )));
        }

        self.transition(CallState::InService)?;
        self.start_time = Some(start_time);
        self.service_time = Some(service_time);
        self.end_time = Some(start_time + service_time);
        Ok(())
    }

    /// Mark the call as fully handled
    pub fn complete(&mut self) -> SimulationResult<()> {
        if self.state != CallState::InService {
            return Err(SimulationError::call_state_error(format!(
                "{} cannot complete from {}",
                self.id, self.state
            )));
        }
        self.transition(CallState::Completed)
    }

    /// Clip an in-service call at `cutoff`
    ///
    /// The call keeps its start time and stays `InService`; its end time and
    /// handled duration are shortened to the cutoff.
    pub fn truncate_at(&mut self, cutoff: f64) {
        if self.state != CallState::InService {
            return;
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end > cutoff {
                self.end_time = Some(cutoff);
                self.service_time = Some(cutoff - start);
            }
        }
    }

    /// Time spent queueing before an agent picked up
    pub fn waiting_time(&self) -> Option<f64> {
        self.start_time.map(|start| start - self.arrival_time)
    }

    /// Whether the wait stayed within `threshold` minutes
    pub fn within_target(&self, threshold: f64) -> Option<bool> {
        self.waiting_time().map(|wait| wait <= threshold)
    }

    /// Whether the call reached its terminal state
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether an agent is handling this call at instant `t`
    pub fn in_service_at(&self, t: f64) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start <= t && t < end,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_lifecycle_without_waiting() {
        let mut call = Call::new(CallId::new(0), 12.5);
        assert_eq!(call.state, CallState::Arrived);
        assert!(call.waiting_time().is_none());

        call.begin_service(12.5, 4.0).unwrap();
        assert_eq!(call.state, CallState::InService);
        assert_eq!(call.end_time, Some(16.5));
        assert_eq!(call.waiting_time(), Some(0.0));
        assert_eq!(call.within_target(1.0), Some(true));

        call.complete().unwrap();
        assert!(call.is_finished());
    }

    #[test]
    fn test_call_lifecycle_with_waiting() {
        let mut call = Call::new(CallId::new(1), 10.0);
        call.enqueue().unwrap();
        assert_eq!(call.state, CallState::Waiting);

        call.begin_service(13.0, 2.0).unwrap();
        assert_eq!(call.waiting_time(), Some(3.0));
        assert_eq!(call.within_target(1.0), Some(false));
        assert!(call.in_service_at(13.0));
        assert!(call.in_service_at(14.9));
        assert!(!call.in_service_at(15.0));
    }

    #[test]
    fn test_call_rejects_backwards_transitions() {
        let mut call = Call::new(CallId::new(2), 5.0);
        call.begin_service(5.0, 1.0).unwrap();
        call.complete().unwrap();

        assert!(call.enqueue().is_err());
        assert!(call.begin_service(6.0, 1.0).is_err());
        assert!(call.complete().is_err());
    }

    #[test]
    fn test_call_rejects_service_before_arrival() {
        let mut call = Call::new(CallId::new(3), 5.0);
        assert!(call.begin_service(4.0, 1.0).is_err());
        assert_eq!(call.state, CallState::Arrived);
    }

    #[test]
    fn test_call_rejects_non_positive_service() {
        let mut call = Call::new(CallId::new(4), 5.0);
        assert!(call.begin_service(5.0, 0.0).is_err());
        assert!(call.begin_service(5.0, f64::NAN).is_err());
    }

    #[test]
    fn test_truncate_in_service_call() {
        let mut call = Call::new(CallId::new(5), 590.0);
        call.begin_service(595.0, 10.0).unwrap();
        call.truncate_at(600.0);

        assert_eq!(call.start_time, Some(595.0));
        assert_eq!(call.end_time, Some(600.0));
        assert_eq!(call.service_time, Some(5.0));
        assert_eq!(call.state, CallState::InService);
        assert!(!call.is_finished());
    }

    #[test]
    fn test_truncate_ignores_calls_ending_before_cutoff() {
        let mut call = Call::new(CallId::new(6), 100.0);
        call.begin_service(100.0, 3.0).unwrap();
        call.truncate_at(600.0);
        assert_eq!(call.end_time, Some(103.0));
    }
}
