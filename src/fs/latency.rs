//! Simulated I/O latency
//!
//! Every [`TestingFs`](super::TestingFs) operation waits for one
//! [`Latency::resolve_time`] sample before it touches the map.

use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound of the default resolve time, in milliseconds.
pub const DEFAULT_MAX_LATENCY_MS: f64 = 6.0;

/// Largest accepted upper bound, in milliseconds. Larger values are clamped.
pub const MAX_LATENCY_CEILING_MS: f64 = 60_000.0;

/// Source of jittered delays.
#[derive(Debug)]
pub struct Latency {
    max_ms: f64,
    rng: Mutex<StdRng>,
}

impl Latency {
    /// Delays uniform in `[0, max_ms)`, with `max_ms` clamped to
    /// `[0, MAX_LATENCY_CEILING_MS]`. With a seed the sequence of delays is
    /// reproducible; without one it is drawn from entropy.
    pub fn new(max_ms: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            max_ms: if max_ms.is_nan() {
                DEFAULT_MAX_LATENCY_MS
            } else {
                max_ms.clamp(0.0, MAX_LATENCY_CEILING_MS)
            },
            rng: Mutex::new(rng),
        }
    }

    /// No delay at all.
    pub fn none() -> Self {
        Self::new(0.0, Some(0))
    }

    pub fn max_ms(&self) -> f64 {
        self.max_ms
    }

    /// Draw the next delay.
    pub fn resolve_time(&self) -> Duration {
        if self.max_ms <= 0.0 {
            return Duration::ZERO;
        }
        let ms = self.rng.lock().gen_range(0.0..self.max_ms);
        Duration::from_secs_f64(ms / 1000.0)
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LATENCY_MS, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_time_in_range() {
        let latency = Latency::default();
        for _ in 0..1000 {
            let d = latency.resolve_time();
            assert!(d < Duration::from_millis(6));
        }
    }

    #[test]
    fn test_seeded_sequences_match() {
        let a = Latency::new(6.0, Some(42));
        let b = Latency::new(6.0, Some(42));
        let xs: Vec<Duration> = (0..20).map(|_| a.resolve_time()).collect();
        let ys: Vec<Duration> = (0..20).map(|_| b.resolve_time()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_zero_max_disables_delay() {
        let latency = Latency::none();
        assert_eq!(latency.resolve_time(), Duration::ZERO);

        let negative = Latency::new(-1.0, None);
        assert_eq!(negative.max_ms(), 0.0);
        assert_eq!(negative.resolve_time(), Duration::ZERO);
    }

    #[test]
    fn test_huge_max_is_clamped() {
        let latency = Latency::new(1e30, Some(3));
        assert_eq!(latency.max_ms(), MAX_LATENCY_CEILING_MS);
        for _ in 0..100 {
            assert!(latency.resolve_time() < Duration::from_secs(60));
        }

        assert_eq!(Latency::new(f64::INFINITY, None).max_ms(), MAX_LATENCY_CEILING_MS);
        assert_eq!(Latency::new(f64::NAN, None).max_ms(), DEFAULT_MAX_LATENCY_MS);
    }
}
