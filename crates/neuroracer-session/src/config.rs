use std::time::Duration;

use neuroracer_engine::TrackConfig;
use neuroracer_training::genetic::EvolutionParams;

/// Parameters of a single run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub evolution: EvolutionParams,
    pub track: TrackConfig,
    /// Number of generations to run, or `None` to run until stopped.
    pub generations: Option<usize>,
    /// Pause between generations, to keep the host responsive.
    pub generation_delay: Duration,
    /// Seed for a reproducible run. A random seed is used if `None`.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionParams::default(),
            track: TrackConfig::default(),
            generations: Some(100),
            generation_delay: Duration::from_millis(100),
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Default configuration with a different population size.
    #[must_use]
    pub fn with_population_size(population_size: usize) -> Self {
        Self {
            evolution: EvolutionParams::with_population_size(population_size),
            ..Self::default()
        }
    }
}
