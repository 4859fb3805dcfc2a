//! Calls and exported call rows
//!
//! # Overview
//!
//! - **Call**: one arrival with its lifecycle state and timestamps
//! - **CallRecord**: the flat row written to the call table
//!
//! # Usage Example
//!
//! ```rust
//! use callcentre_simulator::calls::*;
//! use callcentre_simulator::types::CallId;
//! use chrono::NaiveDate;
//!
//! let mut call = Call::new(CallId::new(0), 3.0);
//! call.begin_service(3.0, 4.5).unwrap();
//! call.complete().unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
//! let record = CallRecord::from_call(&call, date, 1, 1.0).unwrap();
//! assert!(record.within_target);
//! ```

pub mod call;
pub mod record;

// Re-export all public types for convenience
pub use call::*;
pub use record::*;
