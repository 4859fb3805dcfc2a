//! Random draws for arrivals and handling times
//!
//! Inter-arrival gaps and handling times are both exponential. Arrivals for a
//! whole day are drawn up front; handling times are drawn when a call is
//! picked up by an agent.

use rand::Rng;
use rand_distr::{Distribution, Exp};
use tracing::trace;

use crate::simulation::{SimulationError, SimulationResult};

/// Arrival instants for one day window
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalStream {
    /// Arrival instants in minutes, non-decreasing
    pub times: Vec<f64>,
    /// Whether the per-day cap stopped generation before the window closed
    pub saturated: bool,
}

impl ArrivalStream {
    /// Number of arrivals
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether no call arrived
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Draw the arrivals of one day window
///
/// Gaps are exponential with rate `arrival_rate` (calls per minute). The first
/// arrival at or after `day_length` is discarded and ends the stream; so does
/// reaching `max_calls` arrivals.
pub fn generate_arrivals<R: Rng + ?Sized>(
    arrival_rate: f64,
    day_length: f64,
    max_calls: usize,
    rng: &mut R,
) -> SimulationResult<ArrivalStream> {
    if !arrival_rate.is_finite() || arrival_rate <= 0.0 {
        return Err(SimulationError::arrival_generation_error(format!(
            "arrival rate must be positive, got {}",
            arrival_rate
        )));
    }

    let gaps = Exp::new(arrival_rate)
        .map_err(|e| SimulationError::arrival_generation_error(e.to_string()))?;

    let mut times = Vec::new();
    let mut clock = 0.0;
    while times.len() < max_calls {
        clock += gaps.sample(rng);
        if clock >= day_length {
            return Ok(ArrivalStream { times, saturated: false });
        }
        times.push(clock);
    }

    trace!("Arrival cap of {} reached at {:.2} minutes", max_calls, clock);
    Ok(ArrivalStream { times, saturated: true })
}

/// Exponential handling-time sampler that never returns a non-positive duration
#[derive(Debug, Clone, Copy)]
pub struct ServiceSampler {
    distribution: Exp<f64>,
}

impl ServiceSampler {
    /// Create a sampler with the given mean handling time in minutes
    pub fn new(mean: f64) -> SimulationResult<Self> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(SimulationError::configuration_error(format!(
                "service mean must be positive, got {}",
                mean
            )));
        }
        let distribution = Exp::new(1.0 / mean)
            .map_err(|e| SimulationError::configuration_error(e.to_string()))?;
        Ok(Self { distribution })
    }

    /// Draw one handling time, resampling until it is strictly positive
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        loop {
            let duration = self.distribution.sample(rng);
            if duration > 0.0 {
                return duration;
            }
            trace!("Resampling non-positive service time {}", duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_arrivals_stay_inside_window() {
        let mut rng = StdRng::seed_from_u64(11);
        let stream = generate_arrivals(2.0, 60.0, 10_000, &mut rng).unwrap();

        assert!(!stream.saturated);
        assert!(!stream.is_empty());
        assert!(stream.times.iter().all(|&t| (0.0..60.0).contains(&t)));
        assert!(stream.times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_arrivals_respect_cap() {
        let mut rng = StdRng::seed_from_u64(11);
        let stream = generate_arrivals(10.0, 600.0, 25, &mut rng).unwrap();

        assert_eq!(stream.len(), 25);
        assert!(stream.saturated);
    }

    #[test]
    fn test_arrival_count_tracks_rate() {
        let mut rng = StdRng::seed_from_u64(3);
        let stream = generate_arrivals(1.0, 10_000.0, 1_000_000, &mut rng).unwrap();
        // Poisson with mean 10000 has standard deviation 100
        assert!((9_500..=10_500).contains(&stream.len()), "got {}", stream.len());
    }

    #[test]
    fn test_arrivals_reject_invalid_rate() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_arrivals(0.0, 60.0, 10, &mut rng).is_err());
        assert!(generate_arrivals(-1.0, 60.0, 10, &mut rng).is_err());
        assert!(generate_arrivals(f64::NAN, 60.0, 10, &mut rng).is_err());
    }

    #[test]
    fn test_arrivals_are_reproducible() {
        let a = generate_arrivals(0.5, 600.0, 1000, &mut StdRng::seed_from_u64(8)).unwrap();
        let b = generate_arrivals(0.5, 600.0, 1000, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_service_sampler_is_positive_with_expected_mean() {
        let sampler = ServiceSampler::new(5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        let draws: Vec<f64> = (0..20_000).map(|_| sampler.sample(&mut rng)).collect();
        assert!(draws.iter().all(|&d| d > 0.0));

        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 5.0).abs() < 0.2, "mean was {}", mean);
    }

    #[test]
    fn test_service_sampler_rejects_invalid_mean() {
        assert!(ServiceSampler::new(0.0).is_err());
        assert!(ServiceSampler::new(-2.0).is_err());
        assert!(ServiceSampler::new(f64::INFINITY).is_err());
    }
}
