// Call Centre Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/callcentre-simulator --seed 42 > calls.csv
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/callcentre-simulator --agents 12 --worker-threads 4 --output calls.csv --verbose
// ```

use anyhow::Context;
use callcentre_simulator::output::OutputSink;
use callcentre_simulator::simulation::{BatchGenerator, LoggingConfig, SimulationStatistics};
use callcentre_simulator::types::config::CliArgs;
use callcentre_simulator::types::SimulationConfig;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let _logging_guard = match logging_config(&args).init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Call Centre Simulator");

    let config = match load_configuration(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    // Handle dry run mode
    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return;
    }

    print_startup_banner(&config);

    match run_simulation(config) {
        Ok(statistics) => {
            eprintln!("{}", statistics);
            info!("Call Centre Simulator completed: {}", statistics.compact_summary());
        }
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Logging setup for the command line flags
fn logging_config(args: &CliArgs) -> LoggingConfig {
    let mut config = LoggingConfig::from_flags(args.verbose, args.debug, args.log_dir.as_deref());
    if args.log_json {
        config = config.with_json_format();
    }
    if !io::stderr().is_terminal() {
        config = config.without_ansi();
    }
    config
}

/// Load the layered configuration and validate it
fn load_configuration(args: CliArgs) -> anyhow::Result<SimulationConfig> {
    let config = SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");
    Ok(config)
}

/// Plan the calendar, simulate every day and write the call table
fn run_simulation(config: SimulationConfig) -> anyhow::Result<SimulationStatistics> {
    let generator = BatchGenerator::new(config).context("Failed to initialize simulation")?;
    let mut sink = OutputSink::from_config(generator.config()).context("Failed to open output")?;

    eprintln!(
        "Simulating {} business days (base seed {})...",
        generator.plans().len(),
        generator.base_seed()
    );

    let statistics = generator.run(&mut sink).context("Simulation aborted")?;
    Ok(statistics)
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("Call Centre Simulator");
    eprintln!("=====================");
    eprintln!("A synthetic call-centre event log generator");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulationConfig) {
    eprintln!("Configuration:");
    eprintln!("  Agents: {}", config.agents);
    eprintln!("  Base Arrival Rate: {:.2} calls/min", config.base_arrival_rate);
    eprintln!("  Mean Handling Time: {:.2} min", config.service_mean);
    eprintln!("  Day Length: {:.0} min", config.day_length);
    eprintln!("  Max Calls per Day: {}", config.max_calls);
    eprintln!(
        "  Target: {:.0}% within {:.1} min",
        config.service_level_goal * 100.0,
        config.target_wait
    );
    eprintln!("  Year: {}", config.year);
    if let Some(days) = config.days {
        eprintln!("  Days: first {} business days", days);
    }
    eprintln!("  Replications: {}", config.replications);
    eprintln!("  End of Day: {}", config.end_of_day);
    eprintln!("  Worker Threads: {}", config.worker_threads);
    eprintln!("  Output Format: {}", config.output_format);
    eprintln!("  Output: {}", config.output.as_deref().unwrap_or("stdout"));
    if let Some(summary) = &config.summary_output {
        eprintln!("  Daily Summary: {}", summary);
    }
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }

    eprintln!("\nEstimated Load:");
    eprintln!("  Offered Load: {:.2} Erlang", config.offered_load());
    eprintln!("  Agent Utilization: {:.1}%", config.base_utilization() * 100.0);
    if config.base_utilization() >= 1.0 {
        eprintln!("  Warning: offered load exceeds capacity, queues will grow through the day");
    }
    eprintln!();
}
