//! Call Centre Simulator
//!
//! A synthetic call-centre event log generator: a fixed pool of agents serves
//! one FIFO queue of calls, day after day, over the business days of a year.
//!
//! # Overview
//!
//! Each business day is simulated as a multi-server queue with exponential
//! inter-arrival and handling times. The arrival rate of every day comes from
//! calendar coefficients (month, weekday, week of month, trend) plus Gaussian
//! noise. The result is a flat call table with one row per call, suitable for
//! teaching forecasting and staffing analysis.
//!
//! ## Key Features
//!
//! - **Deterministic**: one base seed reproduces the whole table, sequential or parallel
//! - **Calendar-driven load**: seasonal, weekly and intra-month patterns plus noise
//! - **End-of-day policies**: run queued calls to completion or cut service off
//! - **Daily statistics**: service level, waits and utilization per day
//! - **Configurable**: defaults, JSON config file and command line overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use callcentre_simulator::*;
//!
//! let config = SimulationConfig {
//!     agents: 4,
//!     base_arrival_rate: 0.5,
//!     day_length: 120.0,
//!     days: Some(3),
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let generator = BatchGenerator::new(config)?;
//! let mut sink = MemorySink::default();
//! let stats = generator.run(&mut sink)?;
//! println!("Simulated {} days with {} calls", stats.days_simulated, stats.total_calls);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, enums and configuration
//! - [`calls`]: Calls and exported call rows
//! - [`simulation`]: Day simulator, calendar, batch generator and statistics
//! - [`output`]: Call table and daily summary writers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │   Calls     │    │   Output    │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Call        │◄───┤ CSV / JSONL │
//! │ Enums       │    │ CallRecord  │    │ Sinks       │
//! │ Config      │    │             │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//!        │           ┌───────────────────────────┴──┐
//!        │           │         Simulation           │
//!        └───────────┤ Calendar → Batch → Day       │
//!                    │ Statistics, Errors, Logging  │
//!                    └──────────────────────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod calls;
pub mod output;
pub mod simulation;

pub mod types;

// Core types and identifiers
pub use types::{
    CalendarCoefficients,
    // Identifiers
    CallId,
    // Enums
    CallState,
    ConfigValidationError,
    EndOfDayMode,
    OutputFormat,
    // Configuration
    SimulationConfig,
};

// Calls
pub use calls::{Call, CallRecord, CSV_HEADER};

// Output
pub use output::{CallTableWriter, DaySink, MemorySink, OutputSink, SummaryWriter};

// Simulation types and functionality
pub use simulation::{
    business_days, simulate_day, BatchGenerator, CalendarDriver, DayLog, DayOutput,
    DayParameters, DayPlan, DaySimulator, DayStatistics, EndOfDayPolicy, SimulationError,
    SimulationResult, SimulationStatistics,
};
