//! Batch generator running every business day of the run
//!
//! This module contains the BatchGenerator that plans the calendar, simulates
//! each day with its own derived seed and hands finished days to a sink in
//! date order.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::calls::CallRecord;
use crate::output::DaySink;
use crate::simulation::{
    simulate_day, CalendarDriver, DayParameters, DayPlan, DayStatistics, ErrorHandler,
    RecoveryContext, RecoveryStrategy, SimulationError, SimulationResult, SimulationStatistics,
};
use crate::types::SimulationConfig;

/// Days handed to the thread pool per worker before results are written
const DAYS_PER_WORKER_CHUNK: usize = 4;

/// Everything produced for one business day
#[derive(Debug, Clone, PartialEq)]
pub struct DayOutput {
    /// The planned day
    pub plan: DayPlan,
    /// Exported rows of every replication, replication by replication
    pub records: Vec<CallRecord>,
    /// One entry per replication
    pub statistics: Vec<DayStatistics>,
}

/// Seed of one (day, replication) pair
///
/// `base_seed + day_index * replications + replication_index`, wrapping.
pub fn derive_seed(base_seed: u64, day_index: usize, replications: usize, replication_index: usize) -> u64 {
    base_seed
        .wrapping_add((day_index as u64).wrapping_mul(replications as u64))
        .wrapping_add(replication_index as u64)
}

/// Use the configured seed, or draw one from entropy and log it
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!("No seed configured, using {} (pass --seed {} to reproduce)", seed, seed);
            seed
        }
    }
}

/// Batch generator that simulates the planned days and writes them in order
#[derive(Debug)]
pub struct BatchGenerator {
    config: SimulationConfig,
    base_seed: u64,
    plans: Vec<DayPlan>,
    error_handler: ErrorHandler,
    pool: Option<rayon::ThreadPool>,
}

impl BatchGenerator {
    /// Validate the configuration and plan the calendar
    ///
    /// Configuration problems are reported here, before any day runs.
    #[instrument(skip(config), fields(agents = config.agents, year = config.year))]
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let base_seed = resolve_seed(config.seed);
        let driver = CalendarDriver::new(
            config.base_arrival_rate,
            config.calendar.clone(),
            config.year,
            config.days,
        )?;
        let plans = driver.plan(base_seed)?;

        let pool = if config.worker_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .build()
                .map_err(|e| SimulationError::configuration_error(format!("thread pool: {}", e)))?;
            Some(pool)
        } else {
            None
        };

        info!(
            "Planned {} business days of {} with base seed {} ({} worker thread(s))",
            plans.len(),
            config.year,
            base_seed,
            config.worker_threads
        );

        Ok(Self { config, base_seed, plans, error_handler: ErrorHandler::new(), pool })
    }

    /// Base seed every day seed is derived from
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Planned days in date order
    pub fn plans(&self) -> &[DayPlan] {
        &self.plans
    }

    /// Configuration of the run
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate every replication of one planned day
    #[instrument(skip(self, plan), fields(date = %plan.date, arrival_rate = plan.arrival_rate))]
    pub fn simulate_plan(&self, plan: &DayPlan) -> SimulationResult<DayOutput> {
        let params = DayParameters::from_config(&self.config, plan.arrival_rate)?;
        let replications = self.config.replications;

        let mut records = Vec::new();
        let mut statistics = Vec::with_capacity(replications);

        for replication_index in 0..replications {
            let seed = derive_seed(self.base_seed, plan.index, replications, replication_index);
            let mut rng = StdRng::seed_from_u64(seed);
            let log = simulate_day(&params, &mut rng)?;

            let replication = replication_index + 1;
            statistics.push(DayStatistics::from_log(plan, replication, &log, params.agents));
            records.extend(log.records(plan.date, replication));
        }

        debug!("Simulated {} with {} rows", plan.date, records.len());
        Ok(DayOutput { plan: *plan, records, statistics })
    }

    /// Simulate all planned days and write them to `sink`
    pub fn run(&self, sink: &mut dyn DaySink) -> SimulationResult<SimulationStatistics> {
        self.run_plans(&self.plans, sink)
    }

    /// Simulate the given days and write them to `sink` in the order given
    ///
    /// A day that fails with a recoverable error is logged, counted and
    /// skipped; any other error stops the run after the days already written.
    #[instrument(skip(self, plans, sink), fields(days = plans.len(), replications = self.config.replications))]
    pub fn run_plans(
        &self,
        plans: &[DayPlan],
        sink: &mut dyn DaySink,
    ) -> SimulationResult<SimulationStatistics> {
        info!("Starting simulation of {} days", plans.len());
        let start_time = Instant::now();

        let mut statistics = SimulationStatistics::new(
            plans.len(),
            self.config.replications,
            self.base_seed,
            self.config.service_level_goal,
        );

        let chunk_size = match &self.pool {
            Some(pool) => pool.current_num_threads() * DAYS_PER_WORKER_CHUNK,
            None => 1,
        };

        for chunk in plans.chunks(chunk_size.max(1)) {
            for (plan, result) in chunk.iter().zip(self.simulate_chunk(chunk)) {
                match result {
                    Ok(output) => {
                        for day in &output.statistics {
                            statistics.record_replication(day);
                        }
                        statistics.record_day_completed();
                        sink.write_day(&output)?;
                    }
                    Err(error) => {
                        let context = RecoveryContext::for_day(plan.date);
                        match self.error_handler.handle_error(&error, &context) {
                            RecoveryStrategy::Skip => statistics.record_failure(plan.date, error.to_string()),
                            RecoveryStrategy::Abort => return Err(error),
                        }
                    }
                }
            }
        }

        sink.finish()?;
        statistics.set_simulation_duration(start_time.elapsed());

        info!(
            "Simulation completed: {} days, {} calls in {:.2} seconds",
            statistics.days_simulated,
            statistics.total_calls,
            start_time.elapsed().as_secs_f64()
        );

        Ok(statistics)
    }

    /// Results for `chunk`, in the same order as `chunk`
    fn simulate_chunk(&self, chunk: &[DayPlan]) -> Vec<SimulationResult<DayOutput>> {
        match &self.pool {
            Some(pool) if chunk.len() > 1 => {
                let mut results = pool.install(|| {
                    chunk
                        .par_iter()
                        .map(|plan| (plan.index, self.simulate_plan(plan)))
                        .collect::<Vec<_>>()
                });
                // Stable sort keeps duplicate indexes in input order
                results.sort_by_key(|(index, _)| *index);
                results.into_iter().map(|(_, result)| result).collect()
            }
            _ => chunk.iter().map(|plan| self.simulate_plan(plan)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            agents: 3,
            base_arrival_rate: 0.5,
            service_mean: 4.0,
            day_length: 120.0,
            days: Some(4),
            seed: Some(17),
            ..Default::default()
        }
    }

    #[test]
    fn test_derive_seed() {
        assert_eq!(derive_seed(100, 0, 1, 0), 100);
        assert_eq!(derive_seed(100, 5, 1, 0), 105);
        assert_eq!(derive_seed(100, 5, 3, 2), 117);
        assert_eq!(derive_seed(u64::MAX, 1, 1, 0), 0);
    }

    #[test]
    fn test_resolve_seed_prefers_configured_value() {
        assert_eq!(resolve_seed(Some(9)), 9);
    }

    #[test]
    fn test_new_rejects_invalid_configuration() {
        let config = SimulationConfig { agents: 0, ..small_config() };
        assert!(matches!(BatchGenerator::new(config), Err(SimulationError::ConfigurationError(_))));
    }

    #[test]
    fn test_simulate_plan_attaches_date_and_replication() {
        let config = SimulationConfig { replications: 2, ..small_config() };
        let generator = BatchGenerator::new(config).unwrap();
        let plan = generator.plans()[1];

        let output = generator.simulate_plan(&plan).unwrap();
        assert_eq!(output.statistics.len(), 2);
        assert_eq!(output.statistics[0].replication, 1);
        assert_eq!(output.statistics[1].replication, 2);
        assert!(output.records.iter().all(|r| r.date == plan.date));
        assert!(output.records.windows(2).all(|w| w[0].replication <= w[1].replication));
    }

    #[test]
    fn test_run_writes_days_in_order() {
        let generator = BatchGenerator::new(small_config()).unwrap();
        let mut sink = MemorySink::default();

        let stats = generator.run(&mut sink).unwrap();
        assert_eq!(stats.days_simulated, 4);
        assert!(sink.finished);
        let dates: Vec<_> = sink.days.iter().map(|day| day.plan.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_failing_day_is_skipped() {
        let generator = BatchGenerator::new(small_config()).unwrap();
        let mut plans = generator.plans().to_vec();
        plans[1].arrival_rate = 0.0;

        let mut sink = MemorySink::default();
        let stats = generator.run_plans(&plans, &mut sink).unwrap();

        assert_eq!(stats.days_simulated, 3);
        assert_eq!(stats.failed_days.len(), 1);
        assert_eq!(stats.failed_days[0].date, plans[1].date);
        assert_eq!(sink.days.len(), 3);
        assert_eq!(sink.days[0], generator.simulate_plan(&plans[0]).unwrap());
    }
}
