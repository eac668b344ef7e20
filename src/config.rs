//! Configuration for the in-memory filesystem double.

use serde::Deserialize;

use crate::fs::latency::{Latency, DEFAULT_MAX_LATENCY_MS};

/// Options for creating a [`TestingFs`](crate::fs::TestingFs).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestingFsOptions {
    /// Upper bound of the per-operation delay in ms (default: 6). `0` disables it.
    pub max_latency_ms: Option<f64>,
    /// Seed for the delay generator. Unseeded instances draw from entropy.
    pub seed: Option<u64>,
}

impl TestingFsOptions {
    /// Options with latency switched off.
    pub fn instant() -> Self {
        Self {
            max_latency_ms: Some(0.0),
            seed: None,
        }
    }

    pub(crate) fn latency(&self) -> Latency {
        Latency::new(self.max_latency_ms.unwrap_or(DEFAULT_MAX_LATENCY_MS), self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TestingFsOptions::default();
        assert_eq!(opts.latency().max_ms(), DEFAULT_MAX_LATENCY_MS);
        assert_eq!(TestingFsOptions::instant().latency().max_ms(), 0.0);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let opts: TestingFsOptions = toml::from_str("max_latency_ms = 2.5\nseed = 7\n").unwrap();
        assert_eq!(opts.max_latency_ms, Some(2.5));
        assert_eq!(opts.seed, Some(7));

        assert!(toml::from_str::<TestingFsOptions>("latency = 1").is_err());
    }
}
