//! Logging and tracing configuration
//!
//! This module provides centralized logging configuration for the simulator.
//! Console output always goes to stderr so the call table can be streamed to
//! stdout.

use std::io;
use tracing::{debug, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Prefix of rolling log files
pub const LOG_FILE_PREFIX: &str = "callcentre-simulator";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Whether to enable JSON formatting on the console
    pub json_format: bool,
    /// Log file directory, file logging is off when unset
    pub log_directory: Option<String>,
    /// Whether to log span open and close events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            log_directory: None,
            enable_span_events: false,
            enable_ansi: true,
        }
    }
}

/// Keeps background log writers alive; drop it last
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for the command line flags
    ///
    /// `debug` wins over `verbose`; neither leaves the level at WARN.
    pub fn from_flags(verbose: bool, debug: bool, log_dir: Option<&str>) -> Self {
        let mut config = Self::new();
        if debug {
            config = config.with_level(Level::DEBUG).with_span_events();
        } else if verbose {
            config = config.with_level(Level::INFO);
        }
        if let Some(dir) = log_dir {
            config = config.with_file_logging(dir);
        }
        config
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable daily rolling file logging in `directory`
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> String {
        format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level)
    }

    /// Initialize the global tracing subscriber
    ///
    /// The returned guard must outlive all logging.
    pub fn init(self) -> Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()));

        let mut guard = LoggingGuard::default();

        // File records are always JSON
        let file_layer = match &self.log_directory {
            Some(dir) => {
                let (writer, file_guard) = non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
                guard._guards.push(file_guard);
                Some(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_span_events(self.span_events()),
                )
            }
            None => None,
        };

        let registry = Registry::default().with(env_filter).with(file_layer);

        if self.json_format {
            let console_layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(self.span_events());
            registry.with(console_layer).try_init()?;
        } else {
            let console_layer = fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events());
            registry.with(console_layer).try_init()?;
        }

        debug!("Logging initialized: {:?}", self);
        Ok(guard)
    }
}
