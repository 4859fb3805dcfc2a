//! Core types and identifiers for the call-centre simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: sequential call identifiers exported as `customer<N>`
//! - **Enums**: call lifecycle states, end-of-day modes and output formats
//! - **Configuration**: simulation configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use callcentre_simulator::types::*;
//!
//! let id = CallId::new(3);
//! assert_eq!(id.to_string(), "customer3");
//!
//! let config = SimulationConfig {
//!     agents: 4,
//!     days: Some(5),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
