//! Configuration structures for the call-centre simulator
//!
//! This module contains the simulation configuration structure and validation logic
//! used to control the queueing model, the calendar driver and the export.

use super::{EndOfDayMode, OutputFormat};
use crate::simulation::EndOfDayPolicy;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Reference dataset constants
pub mod defaults {
    /// Number of agents answering calls
    pub const AGENTS: usize = 10;

    /// Base arrival rate in calls per minute before calendar effects
    pub const BASE_ARRIVAL_RATE: f64 = 1.5;

    /// Mean handling time in minutes
    pub const SERVICE_MEAN: f64 = 5.0;

    /// Length of the arrival window in minutes (10 opening hours)
    pub const DAY_LENGTH: f64 = 600.0;

    /// Safety cap on arrivals per day
    pub const MAX_CALLS: usize = 2000;

    /// Wait threshold in minutes for the performance target
    pub const TARGET_WAIT: f64 = 1.0;

    /// Share of calls that should be answered within the target
    pub const SERVICE_LEVEL_GOAL: f64 = 0.9;

    /// Simulated year (2021 has 261 business days)
    pub const YEAR: i32 = 2021;
}

/// Calendar coefficients used to derive each business day's arrival rate
///
/// The daily rate is
/// `base * month[m] * weekday[d] * week_of_month[w] * (1 + trend * year_fraction) + noise`
/// with `noise ~ Normal(0, noise_std * base)`, floored at `min_rate_fraction * base`.
/// Keys missing from a config file keep their default values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarCoefficients {
    /// Multiplier per month, January first
    pub month: [f64; 12],
    /// Multiplier per weekday, Monday first
    pub weekday: [f64; 5],
    /// Multiplier per week-of-month position, first week first
    pub week_of_month: [f64; 5],
    /// Linear growth of the arrival rate across the year
    pub trend: f64,
    /// Standard deviation of the additive noise, relative to the base rate
    pub noise_std: f64,
    /// Lower bound of the daily rate, relative to the base rate
    pub min_rate_fraction: f64,
}

impl Default for CalendarCoefficients {
    fn default() -> Self {
        Self {
            month: [1.15, 1.10, 1.05, 1.00, 0.95, 0.90, 0.80, 0.75, 1.00, 1.05, 1.10, 0.95],
            weekday: [1.25, 1.05, 1.00, 0.95, 0.85],
            week_of_month: [1.10, 1.00, 0.95, 0.95, 1.05],
            trend: 0.05,
            noise_std: 0.1,
            min_rate_fraction: 0.05,
        }
    }
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "callcentre-simulator",
    version = "0.1.0",
    about = "Call Centre Simulator - Generates a synthetic call-centre event log",
    long_about = "Simulates one year of business days in a call centre with a fixed pool of agents, a calendar-driven arrival rate and exponential handling times, and exports one row per call with arrival, service start and completion times.

EXAMPLES:
    # Run with default settings and write CSV to stdout
    callcentre-simulator --seed 42 > calls.csv

    # Use a configuration file
    callcentre-simulator --config config.json

    # Override specific settings
    callcentre-simulator --agents 12 --base-arrival-rate 2.0 --output calls.csv

    # Generate configuration template
    callcentre-simulator --print-config > my-config.json

    # Validate configuration without running
    callcentre-simulator --config my-config.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)

    Use --print-config to generate a template configuration file."
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Number of agents
    #[arg(
        long,
        help = "Number of agents answering calls",
        long_help = "Size of the agent pool. Must be greater than 0. Default: 10"
    )]
    pub agents: Option<usize>,

    /// Base arrival rate in calls per minute
    #[arg(
        long,
        help = "Base arrival rate (calls per minute)",
        long_help = "Arrival rate before calendar coefficients and noise are applied. Must be greater than 0. Default: 1.5"
    )]
    pub base_arrival_rate: Option<f64>,

    /// Mean handling time in minutes
    #[arg(long, help = "Mean service time in minutes")]
    pub service_mean: Option<f64>,

    /// Length of the arrival window in minutes
    #[arg(long, help = "Length of the daily arrival window in minutes")]
    pub day_length: Option<f64>,

    /// Safety cap on arrivals per day
    #[arg(long, help = "Maximum number of calls per day")]
    pub max_calls: Option<usize>,

    /// Wait threshold in minutes for the performance target
    #[arg(long, help = "Wait threshold in minutes for the performance target")]
    pub target_wait: Option<f64>,

    /// Share of calls that should meet the wait threshold (0.0-1.0)
    #[arg(long, help = "Service level goal (0.0-1.0)")]
    pub service_level_goal: Option<f64>,

    /// Simulated year
    #[arg(long, help = "Calendar year to simulate")]
    pub year: Option<i32>,

    /// Only simulate the first N business days
    #[arg(
        long,
        help = "Number of business days to simulate",
        long_help = "Limit the run to the first N business days of the year. Must be greater than 0. Default: all business days"
    )]
    pub days: Option<usize>,

    /// Independent replications per day
    #[arg(long, help = "Number of replications per day")]
    pub replications: Option<usize>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// End-of-day policy
    #[arg(
        long,
        help = "End-of-day policy (complete or truncate)",
        long_help = "What happens to calls still in the system when the arrival window closes. 'complete' lets them finish, 'truncate' cuts service at --truncate-cutoff. Default: complete"
    )]
    pub end_of_day: Option<String>,

    /// Cutoff for the truncate policy in minutes
    #[arg(long, help = "Service cutoff in minutes for the truncate policy")]
    pub truncate_cutoff: Option<f64>,

    /// Standard deviation of the daily rate noise, relative to the base rate
    #[arg(long, help = "Relative standard deviation of the daily arrival rate noise")]
    pub noise_std: Option<f64>,

    /// Worker threads used to simulate days
    #[arg(long, help = "Worker threads for simulating days in parallel")]
    pub worker_threads: Option<usize>,

    /// Output path for the call table
    #[arg(short, long, help = "Output file for the call table (default: stdout)")]
    pub output: Option<String>,

    /// Output format for the call table
    #[arg(
        long,
        help = "Output format (csv or json)",
        long_help = "Output format for the call table. Supported formats: csv, json (JSON lines). Default: csv"
    )]
    pub output_format: Option<String>,

    /// Output path for the per-day summary
    #[arg(long, help = "Output path for the per-day summary JSONL file")]
    pub summary_output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Directory for rolling log files
    #[arg(long, help = "Also write JSON logs to daily rolling files in this directory")]
    pub log_dir: Option<String>,

    /// JSON console logs
    #[arg(long, help = "Write console logs as JSON lines")]
    pub log_json: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Number of agents
    pub agents: Option<usize>,

    /// Base arrival rate in calls per minute
    pub base_arrival_rate: Option<f64>,

    /// Mean handling time in minutes
    pub service_mean: Option<f64>,

    /// Length of the arrival window in minutes
    pub day_length: Option<f64>,

    /// Safety cap on arrivals per day
    pub max_calls: Option<usize>,

    /// Wait threshold in minutes
    pub target_wait: Option<f64>,

    /// Service level goal (0.0-1.0)
    pub service_level_goal: Option<f64>,

    /// Simulated year
    pub year: Option<i32>,

    /// Business days limit
    pub days: Option<usize>,

    /// Replications per day
    pub replications: Option<usize>,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// End-of-day policy
    pub end_of_day: Option<String>,

    /// Cutoff for the truncate policy in minutes
    pub truncate_cutoff: Option<f64>,

    /// Calendar coefficients
    pub calendar: Option<CalendarCoefficients>,

    /// Worker threads used to simulate days
    pub worker_threads: Option<usize>,

    /// Output path for the call table
    pub output: Option<String>,

    /// Output format for the call table
    pub output_format: Option<String>,

    /// Output path for the per-day summary
    pub summary_output: Option<String>,
}

/// Configuration for the call-centre simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of agents
    pub agents: usize,

    /// Base arrival rate in calls per minute
    pub base_arrival_rate: f64,

    /// Mean handling time in minutes
    pub service_mean: f64,

    /// Length of the arrival window in minutes
    pub day_length: f64,

    /// Safety cap on arrivals per day
    pub max_calls: usize,

    /// Wait threshold in minutes
    pub target_wait: f64,

    /// Service level goal (0.0-1.0)
    pub service_level_goal: f64,

    /// Simulated year
    pub year: i32,

    /// Business days limit (all business days of the year when unset)
    pub days: Option<usize>,

    /// Replications per day
    pub replications: usize,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// End-of-day policy ("complete" or "truncate")
    pub end_of_day: String,

    /// Cutoff for the truncate policy in minutes (defaults to the day length)
    pub truncate_cutoff: Option<f64>,

    /// Calendar coefficients
    pub calendar: CalendarCoefficients,

    /// Worker threads used to simulate days
    pub worker_threads: usize,

    /// Output path for the call table (stdout when unset)
    pub output: Option<String>,

    /// Output format for the call table
    pub output_format: String,

    /// Output path for the per-day summary
    pub summary_output: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Agent count is invalid
    #[error("Agent count must be greater than 0, got {0}")]
    InvalidAgentCount(usize),

    /// A rate, duration or length is not strictly positive
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositiveValue {
        /// Name of the offending field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A value that may be zero is negative or not finite
    #[error("{field} must be a non-negative finite number, got {value}")]
    NegativeValue {
        /// Name of the offending field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A value is NaN or infinite
    #[error("{field} must be finite, got {value}")]
    NonFiniteValue {
        /// Name of the offending field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Max calls is invalid
    #[error("Max calls per day must be greater than 0, got {0}")]
    InvalidMaxCalls(usize),

    /// Days count is invalid
    #[error("Days count must be greater than 0, got {0}")]
    InvalidDaysCount(usize),

    /// Replication count is invalid
    #[error("Replications must be greater than 0, got {0}")]
    InvalidReplications(usize),

    /// Worker thread count is invalid
    #[error("Worker threads must be greater than 0, got {0}")]
    InvalidWorkerThreads(usize),

    /// Year is outside the supported calendar range
    #[error("Year must be between 1 and 9999, got {0}")]
    InvalidYear(i32),

    /// Percentage value is out of range
    #[error("Invalid percentage for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidPercentage {
        /// Name of the field with invalid percentage
        field: String,
        /// The invalid percentage value
        value: f64,
    },

    /// Calendar coefficient is not a positive finite number
    #[error("Calendar coefficient {field}[{index}] must be positive and finite, got {value}")]
    InvalidCoefficient {
        /// Coefficient table name
        field: String,
        /// Position in the table
        index: usize,
        /// The invalid value
        value: f64,
    },

    /// Truncate cutoff falls inside the arrival window
    #[error("Truncate cutoff ({cutoff}) must not be earlier than the day length ({day_length})")]
    InvalidTruncateCutoff {
        /// Configured cutoff
        cutoff: f64,
        /// Configured day length
        day_length: f64,
    },

    /// Unknown output format
    #[error("Unknown output format: {0} (supported: csv, json)")]
    InvalidOutputFormat(String),

    /// Unknown end-of-day policy
    #[error("Unknown end-of-day policy: {0} (supported: complete, truncate)")]
    InvalidEndOfDay(String),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agents: defaults::AGENTS,
            base_arrival_rate: defaults::BASE_ARRIVAL_RATE,
            service_mean: defaults::SERVICE_MEAN,
            day_length: defaults::DAY_LENGTH,
            max_calls: defaults::MAX_CALLS,
            target_wait: defaults::TARGET_WAIT,
            service_level_goal: defaults::SERVICE_LEVEL_GOAL,
            year: defaults::YEAR,
            days: None,
            replications: 1,
            seed: None,
            end_of_day: "complete".to_string(),
            truncate_cutoff: None,
            calendar: CalendarCoefficients::default(),
            worker_threads: 1,
            output: None,
            output_format: "csv".to_string(),
            summary_output: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            agents: config_file.agents.unwrap_or(defaults.agents),
            base_arrival_rate: config_file
                .base_arrival_rate
                .unwrap_or(defaults.base_arrival_rate),
            service_mean: config_file.service_mean.unwrap_or(defaults.service_mean),
            day_length: config_file.day_length.unwrap_or(defaults.day_length),
            max_calls: config_file.max_calls.unwrap_or(defaults.max_calls),
            target_wait: config_file.target_wait.unwrap_or(defaults.target_wait),
            service_level_goal: config_file
                .service_level_goal
                .unwrap_or(defaults.service_level_goal),
            year: config_file.year.unwrap_or(defaults.year),
            days: config_file.days.or(defaults.days),
            replications: config_file.replications.unwrap_or(defaults.replications),
            seed: config_file.seed.or(defaults.seed),
            end_of_day: config_file.end_of_day.unwrap_or(defaults.end_of_day),
            truncate_cutoff: config_file.truncate_cutoff.or(defaults.truncate_cutoff),
            calendar: config_file.calendar.unwrap_or(defaults.calendar),
            worker_threads: config_file.worker_threads.unwrap_or(defaults.worker_threads),
            output: config_file.output.or(defaults.output),
            output_format: config_file.output_format.unwrap_or(defaults.output_format),
            summary_output: config_file.summary_output.or(defaults.summary_output),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.agents {
            config.agents = value;
        }
        if let Some(value) = args.base_arrival_rate {
            config.base_arrival_rate = value;
        }
        if let Some(value) = args.service_mean {
            config.service_mean = value;
        }
        if let Some(value) = args.day_length {
            config.day_length = value;
        }
        if let Some(value) = args.max_calls {
            config.max_calls = value;
        }
        if let Some(value) = args.target_wait {
            config.target_wait = value;
        }
        if let Some(value) = args.service_level_goal {
            config.service_level_goal = value;
        }
        if let Some(value) = args.year {
            config.year = value;
        }
        if let Some(value) = args.days {
            config.days = Some(value);
        }
        if let Some(value) = args.replications {
            config.replications = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.end_of_day {
            config.end_of_day = value;
        }
        if let Some(value) = args.truncate_cutoff {
            config.truncate_cutoff = Some(value);
        }
        if let Some(value) = args.noise_std {
            config.calendar.noise_std = value;
        }
        if let Some(value) = args.worker_threads {
            config.worker_threads = value;
        }
        if let Some(value) = args.output {
            config.output = Some(value);
        }
        if let Some(value) = args.output_format {
            config.output_format = value;
        }
        if let Some(value) = args.summary_output {
            config.summary_output = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.agents == 0 {
            return Err(ConfigValidationError::InvalidAgentCount(self.agents));
        }

        validate_positive("base_arrival_rate", self.base_arrival_rate)?;
        validate_positive("service_mean", self.service_mean)?;
        validate_positive("day_length", self.day_length)?;
        validate_non_negative("target_wait", self.target_wait)?;

        if self.max_calls == 0 {
            return Err(ConfigValidationError::InvalidMaxCalls(self.max_calls));
        }

        if let Some(days) = self.days {
            if days == 0 {
                return Err(ConfigValidationError::InvalidDaysCount(days));
            }
        }

        if self.replications == 0 {
            return Err(ConfigValidationError::InvalidReplications(self.replications));
        }

        if self.worker_threads == 0 {
            return Err(ConfigValidationError::InvalidWorkerThreads(self.worker_threads));
        }

        if !(1..=9999).contains(&self.year) {
            return Err(ConfigValidationError::InvalidYear(self.year));
        }

        validate_percentage("service_level_goal", self.service_level_goal)?;

        self.validate_calendar()?;

        self.get_output_format()
            .map_err(|_| ConfigValidationError::InvalidOutputFormat(self.output_format.clone()))?;

        let mode = self
            .get_end_of_day_mode()
            .map_err(|_| ConfigValidationError::InvalidEndOfDay(self.end_of_day.clone()))?;

        if mode == EndOfDayMode::Truncate {
            let cutoff = self.effective_cutoff();
            if !cutoff.is_finite() || cutoff < self.day_length {
                return Err(ConfigValidationError::InvalidTruncateCutoff {
                    cutoff,
                    day_length: self.day_length,
                });
            }
        }

        Ok(())
    }

    fn validate_calendar(&self) -> Result<(), ConfigValidationError> {
        let tables: [(&str, &[f64]); 3] = [
            ("month", &self.calendar.month),
            ("weekday", &self.calendar.weekday),
            ("week_of_month", &self.calendar.week_of_month),
        ];

        for (field, values) in tables {
            for (index, &value) in values.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigValidationError::InvalidCoefficient {
                        field: field.to_string(),
                        index,
                        value,
                    });
                }
            }
        }

        if !self.calendar.trend.is_finite() {
            return Err(ConfigValidationError::NonFiniteValue {
                field: "calendar.trend".to_string(),
                value: self.calendar.trend,
            });
        }

        validate_non_negative("calendar.noise_std", self.calendar.noise_std)?;

        let floor = self.calendar.min_rate_fraction;
        if !floor.is_finite() || floor <= 0.0 || floor > 1.0 {
            return Err(ConfigValidationError::InvalidPercentage {
                field: "calendar.min_rate_fraction".to_string(),
                value: floor,
            });
        }

        Ok(())
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, String> {
        self.output_format.parse()
    }

    /// Get the end-of-day mode as an enum value
    pub fn get_end_of_day_mode(&self) -> Result<EndOfDayMode, String> {
        self.end_of_day.parse()
    }

    /// Service cutoff for the truncate policy, defaulting to the day length
    pub fn effective_cutoff(&self) -> f64 {
        self.truncate_cutoff.unwrap_or(self.day_length)
    }

    /// Resolve the end-of-day policy used by the day simulator
    pub fn end_of_day_policy(&self) -> Result<EndOfDayPolicy, String> {
        Ok(match self.get_end_of_day_mode()? {
            EndOfDayMode::Complete => EndOfDayPolicy::Complete,
            EndOfDayMode::Truncate => EndOfDayPolicy::Truncate { cutoff: self.effective_cutoff() },
        })
    }

    /// Offered load in Erlangs at the base arrival rate
    pub fn offered_load(&self) -> f64 {
        self.base_arrival_rate * self.service_mean
    }

    /// Offered load per agent at the base arrival rate
    pub fn base_utilization(&self) -> f64 {
        if self.agents == 0 {
            return f64::INFINITY;
        }
        self.offered_load() / self.agents as f64
    }
}

fn validate_positive(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigValidationError::NonPositiveValue { field: field.to_string(), value });
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigValidationError::NegativeValue { field: field.to_string(), value });
    }
    Ok(())
}

fn validate_percentage(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigValidationError::InvalidPercentage { field: field.to_string(), value });
    }
    Ok(())
}
