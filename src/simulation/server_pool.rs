//! Agent availability tracking
//!
//! The pool only records the instant at which each agent next becomes free.
//! Arrivals are processed in order, so the earliest free time is all that is
//! needed to decide when the next call starts.

use crate::simulation::{SimulationError, SimulationResult};

/// Fixed pool of interchangeable agents
#[derive(Debug, Clone)]
pub struct ServerPool {
    next_free: Vec<f64>,
}

impl ServerPool {
    /// Create a pool of `agents` agents, all free at time zero
    pub fn new(agents: usize) -> SimulationResult<Self> {
        if agents == 0 {
            return Err(SimulationError::configuration_error(
                "a server pool needs at least one agent",
            ));
        }
        Ok(Self { next_free: vec![0.0; agents] })
    }

    /// Number of agents in the pool
    pub fn agents(&self) -> usize {
        self.next_free.len()
    }

    /// Agent with the earliest free time and that time
    ///
    /// Ties go to the lowest index.
    pub fn earliest(&self) -> (usize, f64) {
        let mut best = (0, self.next_free[0]);
        for (index, &free_at) in self.next_free.iter().enumerate().skip(1) {
            if free_at < best.1 {
                best = (index, free_at);
            }
        }
        best
    }

    /// Occupy agent `index` until `until`
    pub fn seize(&mut self, index: usize, until: f64) {
        debug_assert!(until >= self.next_free[index]);
        self.next_free[index] = until;
    }

    /// Instant at which the last agent finishes its current call
    pub fn last_release(&self) -> f64 {
        self.next_free.iter().copied().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_requires_agents() {
        assert!(ServerPool::new(0).is_err());
        assert_eq!(ServerPool::new(3).unwrap().agents(), 3);
    }

    #[test]
    fn test_earliest_prefers_lowest_index_on_ties() {
        let pool = ServerPool::new(4).unwrap();
        assert_eq!(pool.earliest(), (0, 0.0));
    }

    #[test]
    fn test_seize_moves_earliest() {
        let mut pool = ServerPool::new(3).unwrap();
        pool.seize(0, 5.0);
        assert_eq!(pool.earliest(), (1, 0.0));

        pool.seize(1, 2.0);
        pool.seize(2, 2.0);
        assert_eq!(pool.earliest(), (1, 2.0));
        assert_eq!(pool.last_release(), 5.0);
    }
}
