//! Training system for evolving racing controllers with a genetic algorithm.
//!
//! Each [`Agent`](agent::Agent) owns a [`CarNetwork`](neuroracer_network::CarNetwork).
//! Agents are scored by driving a [`RaceEnvironment`](neuroracer_engine::RaceEnvironment)
//! and the [`EvolutionEngine`](genetic::EvolutionEngine) breeds the next generation from
//! those scores. No gradients are involved: networks only change through crossover and
//! mutation of their flat weight vectors.
//!
//! # How Training Works
//!
//! 1. **Population** - Create `population_size` agents with randomly initialized networks
//! 2. **Evaluation** - Each agent drives the track once; the accumulated reward is its fitness
//! 3. **Elitism** - The best agent is carried over unchanged
//! 4. **Selection** - Tournament selection builds a mating pool
//! 5. **Reproduction** - Uniform crossover and Gaussian mutation fill the rest of the population
//! 6. **Repeat** - One generation per evaluate/evolve cycle
//!
//! # Architecture
//!
//! ```text
//! GenerationRunner
//!     ↓ drives every agent through
//! RaceEnvironment (neuroracer-engine)
//!     ↓ produces
//! Fitness scores
//!     ↓ fed to
//! EvolutionEngine::evaluate → EvolutionEngine::evolve
//!     ↓ produces
//! Next population
//! ```
//!
//! # Example
//!
//! ```
//! use neuroracer_training::{
//!     genetic::{EvolutionEngine, EvolutionParams},
//!     runner::GenerationRunner,
//! };
//!
//! let params = EvolutionParams::with_population_size(10);
//! let mut engine = EvolutionEngine::with_seed(params, 42);
//! let mut runner = GenerationRunner::default();
//!
//! for _ in 0..3 {
//!     let stats = runner.run_generation(&mut engine).unwrap();
//!     assert!(stats.best_fitness >= stats.worst_fitness);
//! }
//! assert_eq!(engine.generation(), 3);
//! assert_eq!(engine.population().len(), 10);
//! ```
//!
//! # Current Limitations
//!
//! - **Single elite**: Only the best agent survives unchanged; the rest are always offspring
//! - **Fixed operators**: Rates are constant for the lifetime of an engine
//! - **Sequential evaluation**: Agents are evaluated one after another

use neuroracer_network::ShapeMismatchError;

pub mod agent;
pub mod genetic;
pub mod runner;
pub mod stats;
pub mod weights;

/// Errors raised by the evolutionary loop.
///
/// None of them are retried: the loop stops and reports the error to its caller.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvolutionError {
    /// A child weight vector did not fit the network topology.
    #[display("{_0}")]
    ShapeMismatch(ShapeMismatchError),
    /// `evaluate` received a different number of scores than there are agents.
    #[display("expected {expected} fitness scores, got {actual}")]
    ScoreCountMismatch { expected: usize, actual: usize },
    #[display("population is empty")]
    EmptyPopulation,
    #[display(
        "tournament size {tournament_size} must be between 1 and the population size {population_size}"
    )]
    InvalidTournamentSize {
        tournament_size: usize,
        population_size: usize,
    },
    #[display("mutation sigma must be finite and non-negative, got {sigma}")]
    InvalidMutationSigma { sigma: f32 },
}

impl From<ShapeMismatchError> for EvolutionError {
    fn from(err: ShapeMismatchError) -> Self {
        Self::ShapeMismatch(err)
    }
}

impl EvolutionError {
    /// Returns `true` for errors caused by a population that cannot be evolved.
    #[must_use]
    pub fn is_invalid_population_state(&self) -> bool {
        matches!(
            self,
            Self::EmptyPopulation
                | Self::InvalidTournamentSize { .. }
                | Self::InvalidMutationSigma { .. }
        )
    }
}
