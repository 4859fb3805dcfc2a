//! Call table and daily summary writers
//!
//! Both writers wrap any [`Write`] and buffer nothing themselves; callers pass
//! a `BufWriter` when writing to files or stdout.

use serde::Serialize;
use std::io::Write;

use crate::calls::{CallRecord, CSV_HEADER};
use crate::simulation::{DayStatistics, SimulationResult};
use crate::types::OutputFormat;

/// Writer for the flat call table
#[derive(Debug)]
pub struct CallTableWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    header_written: bool,
    rows_written: usize,
}

impl<W: Write> CallTableWriter<W> {
    /// Create a writer emitting `format` into `writer`
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format, header_written: false, rows_written: 0 }
    }

    /// Output format of the table
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn write_header(&mut self) -> SimulationResult<()> {
        if self.format == OutputFormat::Csv && !self.header_written {
            writeln!(self.writer, "{}", CSV_HEADER)?;
        }
        self.header_written = true;
        Ok(())
    }

    /// Append one row
    pub fn write_record(&mut self, record: &CallRecord) -> SimulationResult<()> {
        self.write_header()?;
        match self.format {
            OutputFormat::Csv => writeln!(self.writer, "{}", record.to_csv_row())?,
            OutputFormat::Json => write_json_line(&mut self.writer, record)?,
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Append rows in order
    pub fn write_records(&mut self, records: &[CallRecord]) -> SimulationResult<()> {
        records.iter().try_for_each(|record| self.write_record(record))
    }

    /// Write the CSV header if no row was written, then flush
    pub fn finish(&mut self) -> SimulationResult<()> {
        self.write_header()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// JSON lines writer for per-day statistics
#[derive(Debug)]
pub struct SummaryWriter<W: Write> {
    writer: W,
    lines_written: usize,
}

impl<W: Write> SummaryWriter<W> {
    /// Create a summary writer over `writer`
    pub fn new(writer: W) -> Self {
        Self { writer, lines_written: 0 }
    }

    /// Lines written so far
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Append one line per replication
    pub fn write_statistics(&mut self, statistics: &[DayStatistics]) -> SimulationResult<()> {
        for day in statistics {
            write_json_line(&mut self.writer, day)?;
            self.lines_written += 1;
        }
        Ok(())
    }

    /// Flush the underlying writer
    pub fn finish(&mut self) -> SimulationResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn write_json_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> SimulationResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}
