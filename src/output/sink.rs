//! Destinations for finished days

use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

use super::{CallTableWriter, SummaryWriter};
use crate::simulation::{DayOutput, SimulationError, SimulationResult};
use crate::types::{OutputFormat, SimulationConfig};

/// Receives each finished day, in date order
pub trait DaySink {
    /// Write one day
    fn write_day(&mut self, day: &DayOutput) -> SimulationResult<()>;

    /// Called once after the last day
    fn finish(&mut self) -> SimulationResult<()> {
        Ok(())
    }
}

/// Keeps every day in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Days received so far
    pub days: Vec<DayOutput>,
    /// Whether `finish` was called
    pub finished: bool,
}

impl DaySink for MemorySink {
    fn write_day(&mut self, day: &DayOutput) -> SimulationResult<()> {
        self.days.push(day.clone());
        Ok(())
    }

    fn finish(&mut self) -> SimulationResult<()> {
        self.finished = true;
        Ok(())
    }
}

type BoxedWriter = BufWriter<Box<dyn Write>>;

fn open_writer(path: Option<&str>) -> SimulationResult<BoxedWriter> {
    let inner: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SimulationError::output_error(format!("Failed to create output file '{}': {}", path, e))
            })?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };
    Ok(BufWriter::new(inner))
}

/// Writes the call table and the optional daily summary
pub struct OutputSink {
    calls: CallTableWriter<BoxedWriter>,
    summary: Option<SummaryWriter<BoxedWriter>>,
    destination: String,
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink")
            .field("format", &self.calls.format())
            .field("destination", &self.destination)
            .field("rows_written", &self.calls.rows_written())
            .field("summary", &self.summary.is_some())
            .finish()
    }
}

impl OutputSink {
    /// Open the call table at `output` (stdout when `None`) and the summary at `summary`
    pub fn open(output: Option<&str>, format: OutputFormat, summary: Option<&str>) -> SimulationResult<Self> {
        let calls = CallTableWriter::new(open_writer(output)?, format);
        let summary = match summary {
            Some(path) => Some(SummaryWriter::new(open_writer(Some(path))?)),
            None => None,
        };
        let destination = output.unwrap_or("stdout").to_string();
        Ok(Self { calls, summary, destination })
    }

    /// Open the destinations named by the configuration
    pub fn from_config(config: &SimulationConfig) -> SimulationResult<Self> {
        let format = config.get_output_format().map_err(SimulationError::configuration_error)?;
        Self::open(config.output.as_deref(), format, config.summary_output.as_deref())
    }

    /// Rows written to the call table so far
    pub fn rows_written(&self) -> usize {
        self.calls.rows_written()
    }
}

impl DaySink for OutputSink {
    fn write_day(&mut self, day: &DayOutput) -> SimulationResult<()> {
        self.calls.write_records(&day.records)?;
        if let Some(summary) = self.summary.as_mut() {
            summary.write_statistics(&day.statistics)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> SimulationResult<()> {
        self.calls.finish()?;
        if let Some(summary) = self.summary.as_mut() {
            summary.finish()?;
        }
        info!("Wrote {} rows to {}", self.calls.rows_written(), self.destination);
        if let Some(summary) = &self.summary {
            info!("Wrote {} daily summary lines", summary.lines_written());
        }
        Ok(())
    }
}
