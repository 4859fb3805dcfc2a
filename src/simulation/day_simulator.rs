//! Single-day queueing simulation
//!
//! One FIFO queue in front of a fixed pool of agents. All arrivals of the day
//! are drawn first; each call in arrival order then goes to the agent that
//! frees up earliest, and starts at `max(arrival, earliest_free_time)`. Since
//! arrivals are the only events that change state, no general event queue is
//! needed.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::calls::{Call, CallRecord};
use crate::simulation::sampling::{generate_arrivals, ServiceSampler};
use crate::simulation::{ServerPool, SimulationError, SimulationResult};
use crate::types::{CallId, SimulationConfig};

/// Treatment of calls still in the system when the arrival window closes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EndOfDayPolicy {
    /// Queued and in-service calls run to completion
    Complete,
    /// Calls not picked up before `cutoff` are dropped, calls in service at
    /// `cutoff` are clipped and left unfinished
    Truncate {
        /// Instant in minutes at which service stops
        cutoff: f64,
    },
}

/// Parameters of one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayParameters {
    /// Number of agents
    pub agents: usize,
    /// Arrival rate in calls per minute
    pub arrival_rate: f64,
    /// Mean handling time in minutes
    pub service_mean: f64,
    /// Length of the arrival window in minutes
    pub day_length: f64,
    /// Cap on arrivals for the day
    pub max_calls: usize,
    /// Wait threshold for the performance target
    pub target_wait: f64,
    /// End-of-day policy
    pub end_of_day: EndOfDayPolicy,
}

impl DayParameters {
    /// Build the parameters of a day from the run configuration and that day's rate
    pub fn from_config(config: &SimulationConfig, arrival_rate: f64) -> SimulationResult<Self> {
        let end_of_day = config.end_of_day_policy().map_err(SimulationError::configuration_error)?;
        Ok(Self {
            agents: config.agents,
            arrival_rate,
            service_mean: config.service_mean,
            day_length: config.day_length,
            max_calls: config.max_calls,
            target_wait: config.target_wait,
            end_of_day,
        })
    }

    /// Reject parameters that cannot produce a meaningful day
    pub fn validate(&self) -> SimulationResult<()> {
        if self.agents == 0 {
            return Err(SimulationError::configuration_error(
                "agents must be at least 1, no call could ever be served",
            ));
        }
        if self.max_calls == 0 {
            return Err(SimulationError::configuration_error(
                "max calls per day must be at least 1",
            ));
        }
        if !self.arrival_rate.is_finite() || self.arrival_rate <= 0.0 {
            return Err(SimulationError::day_simulation_error(format!(
                "arrival rate must be positive, got {}",
                self.arrival_rate
            )));
        }
        if !self.service_mean.is_finite() || self.service_mean <= 0.0 {
            return Err(SimulationError::configuration_error(format!(
                "service mean must be positive, got {}",
                self.service_mean
            )));
        }
        if !self.day_length.is_finite() || self.day_length <= 0.0 {
            return Err(SimulationError::configuration_error(format!(
                "day length must be positive, got {}",
                self.day_length
            )));
        }
        if !self.target_wait.is_finite() || self.target_wait < 0.0 {
            return Err(SimulationError::configuration_error(format!(
                "target wait must be non-negative, got {}",
                self.target_wait
            )));
        }
        if let EndOfDayPolicy::Truncate { cutoff } = self.end_of_day {
            if !cutoff.is_finite() || cutoff < self.day_length {
                return Err(SimulationError::configuration_error(format!(
                    "truncate cutoff {} is earlier than the day length {}",
                    cutoff, self.day_length
                )));
            }
        }
        Ok(())
    }
}

/// Ordered call log of one simulated day
#[derive(Debug, Clone, PartialEq)]
pub struct DayLog {
    /// Served calls in arrival order
    pub calls: Vec<Call>,
    /// Whether the arrival cap was hit before the window closed
    pub saturated: bool,
    /// Calls dropped because service would have started after the cutoff
    pub unserved: usize,
    /// Wait threshold used for `within_target`
    pub target_wait: f64,
    /// Length of the arrival window in minutes
    pub day_length: f64,
}

impl DayLog {
    /// Number of exported calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether no call was exported
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Calls that arrived in the window, served or not
    pub fn arrivals(&self) -> usize {
        self.calls.len() + self.unserved
    }

    /// Calls that reached `Completed`
    pub fn completed(&self) -> usize {
        self.calls.iter().filter(|call| call.is_finished()).count()
    }

    /// Calls whose wait met the target
    pub fn within_target(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| call.within_target(self.target_wait).unwrap_or(false))
            .count()
    }

    /// Share of calls answered within the target, `None` for a day without calls
    pub fn service_level(&self) -> Option<f64> {
        if self.calls.is_empty() {
            return None;
        }
        Some(self.within_target() as f64 / self.calls.len() as f64)
    }

    /// Mean waiting time, `None` for a day without calls
    pub fn mean_wait(&self) -> Option<f64> {
        if self.calls.is_empty() {
            return None;
        }
        let total: f64 = self.calls.iter().filter_map(Call::waiting_time).sum();
        Some(total / self.calls.len() as f64)
    }

    /// Longest waiting time, `None` for a day without calls
    pub fn max_wait(&self) -> Option<f64> {
        self.calls.iter().filter_map(Call::waiting_time).reduce(f64::max)
    }

    /// Instant at which the last call left an agent
    pub fn last_departure(&self) -> f64 {
        self.calls.iter().filter_map(|call| call.end_time).fold(0.0, f64::max)
    }

    /// Largest number of calls in service at the same instant
    pub fn peak_concurrency(&self) -> usize {
        let mut changes: Vec<(f64, i64)> = Vec::with_capacity(self.calls.len() * 2);
        for call in &self.calls {
            if let (Some(start), Some(end)) = (call.start_time, call.end_time) {
                changes.push((start, 1));
                changes.push((end, -1));
            }
        }
        // Service intervals are half-open, so releases at an instant go first
        changes.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut current = 0i64;
        let mut peak = 0i64;
        for (_, delta) in changes {
            current += delta;
            peak = peak.max(current);
        }
        peak as usize
    }

    /// Share of agent time spent handling calls over the operating horizon
    ///
    /// The horizon runs from the window opening to the later of the window
    /// closing and the last departure.
    pub fn utilization(&self, agents: usize) -> f64 {
        let horizon = self.day_length.max(self.last_departure());
        if agents == 0 || horizon <= 0.0 {
            return 0.0;
        }
        let busy: f64 = self.calls.iter().filter_map(|call| call.service_time).sum();
        busy / (agents as f64 * horizon)
    }

    /// Exported rows of this day, in arrival order
    pub fn records(&self, date: NaiveDate, replication: usize) -> Vec<CallRecord> {
        self.calls
            .iter()
            .filter_map(|call| CallRecord::from_call(call, date, replication, self.target_wait))
            .collect()
    }
}

/// Simulator for one day window
///
/// Owns its agent pool exclusively; the pool is consumed with the simulator.
#[derive(Debug)]
pub struct DaySimulator {
    params: DayParameters,
    pool: ServerPool,
    service: ServiceSampler,
}

impl DaySimulator {
    /// Validate the parameters and set up an idle agent pool
    pub fn new(params: DayParameters) -> SimulationResult<Self> {
        params.validate()?;
        let pool = ServerPool::new(params.agents)?;
        let service = ServiceSampler::new(params.service_mean)?;
        Ok(Self { params, pool, service })
    }

    /// Simulate the day and return its call log
    #[instrument(skip(self, rng), fields(agents = self.params.agents, arrival_rate = self.params.arrival_rate))]
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> SimulationResult<DayLog> {
        let arrivals = generate_arrivals(
            self.params.arrival_rate,
            self.params.day_length,
            self.params.max_calls,
            rng,
        )?;

        if arrivals.saturated {
            warn!(
                "Arrival cap of {} calls reached before the {:.0}-minute window closed",
                self.params.max_calls, self.params.day_length
            );
        }

        let mut calls = Vec::with_capacity(arrivals.len());
        let mut unserved = 0;

        for (sequence, &arrival) in arrivals.times.iter().enumerate() {
            let mut call = Call::new(CallId::new(sequence as u64), arrival);

            let (agent, free_at) = self.pool.earliest();
            let start = arrival.max(free_at);
            if start > arrival {
                call.enqueue()?;
            }

            if let EndOfDayPolicy::Truncate { cutoff } = self.params.end_of_day {
                if start >= cutoff {
                    unserved += 1;
                    continue;
                }
            }

            let service_time = self.service.sample(rng);
            call.begin_service(start, service_time)?;
            self.pool.seize(agent, start + service_time);

            match self.params.end_of_day {
                EndOfDayPolicy::Truncate { cutoff } if start + service_time > cutoff => {
                    call.truncate_at(cutoff);
                }
                _ => call.complete()?,
            }

            calls.push(call);
        }

        debug!(
            "Simulated {} arrivals: {} exported, {} unserved, last agent free at {:.2}",
            arrivals.len(),
            calls.len(),
            unserved,
            self.pool.last_release()
        );

        Ok(DayLog {
            calls,
            saturated: arrivals.saturated,
            unserved,
            target_wait: self.params.target_wait,
            day_length: self.params.day_length,
        })
    }
}

/// Simulate one day with the given parameters and random source
pub fn simulate_day<R: Rng + ?Sized>(params: &DayParameters, rng: &mut R) -> SimulationResult<DayLog> {
    DaySimulator::new(params.clone())?.run(rng)
}
