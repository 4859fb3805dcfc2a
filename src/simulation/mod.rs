//! Simulation of call-centre days
//!
//! This module contains the single-day queueing model, the calendar driver,
//! the batch generator running a whole year, statistics collection and error
//! handling.
//!
//! # Overview
//!
//! - **DaySimulator**: one FIFO queue in front of a fixed pool of agents for one day
//! - **CalendarDriver**: business days of a year and their arrival rates
//! - **BatchGenerator**: runs every planned day with a derived seed, in parallel if asked
//! - **SimulationStatistics**: run totals and the end-of-run report
//! - **SimulationError**: error handling with per-day isolation
//!
//! # Usage Example
//!
//! ```rust
//! use callcentre_simulator::simulation::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let params = DayParameters {
//!     agents: 2,
//!     arrival_rate: 0.5,
//!     service_mean: 3.0,
//!     day_length: 60.0,
//!     max_calls: 500,
//!     target_wait: 1.0,
//!     end_of_day: EndOfDayPolicy::Complete,
//! };
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let log = simulate_day(&params, &mut rng).unwrap();
//! assert!(log.peak_concurrency() <= 2);
//! ```

pub mod batch_generator;
pub mod calendar;
pub mod day_simulator;
pub mod error;
pub mod logging;
pub mod sampling;
pub mod server_pool;
pub mod statistics;

// Re-export all public types for convenience
pub use batch_generator::*;
pub use calendar::*;
pub use day_simulator::*;
pub use error::*;
pub use logging::*;
pub use sampling::*;
pub use server_pool::*;
pub use statistics::*;
