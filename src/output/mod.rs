//! Export of the call table and daily summary
//!
//! # Overview
//!
//! - **CallTableWriter**: CSV with header or JSON lines, one row per call
//! - **SummaryWriter**: JSON lines, one object per simulated (day, replication)
//! - **DaySink**: destination the batch generator hands finished days to
//! - **OutputSink**: file or stdout sink built from the configuration
//!
//! # Usage Example
//!
//! ```rust
//! use callcentre_simulator::output::*;
//! use callcentre_simulator::types::OutputFormat;
//!
//! let mut writer = CallTableWriter::new(Vec::new(), OutputFormat::Csv);
//! writer.finish().unwrap();
//! let text = String::from_utf8(writer.into_inner()).unwrap();
//! assert!(text.starts_with("name,start_time,end_time"));
//! ```

pub mod sink;
pub mod writer;

// Re-export all public types for convenience
pub use sink::*;
pub use writer::*;
