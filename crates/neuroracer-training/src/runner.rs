//! Drives one generation: score every agent, then hand the scores to the engine.

use neuroracer_engine::{RaceEnvironment, TrackConfig};

use crate::{EvolutionError, agent::Agent, genetic::EvolutionEngine, stats::GenerationStats};

/// Evaluates populations on a single [`RaceEnvironment`].
///
/// The environment is reset before every agent, so agents are scored independently
/// of the order in which they run.
#[derive(Debug, Clone, Default)]
pub struct GenerationRunner {
    environment: RaceEnvironment,
}

impl GenerationRunner {
    #[must_use]
    pub fn new(track: TrackConfig) -> Self {
        Self {
            environment: RaceEnvironment::new(track),
        }
    }

    #[must_use]
    pub fn environment(&self) -> &RaceEnvironment {
        &self.environment
    }

    /// Runs every agent through the environment and returns their fitness in order.
    pub fn evaluate_agents(&mut self, agents: &[Agent]) -> Vec<f32> {
        agents
            .iter()
            .map(|agent| self.environment.run(agent))
            .collect()
    }

    /// Scores the current population and records the scores in `engine`.
    ///
    /// The engine is not evolved, so the caller can publish the statistics before the
    /// population is replaced.
    pub fn evaluate_generation(
        &mut self,
        engine: &mut EvolutionEngine,
    ) -> Result<GenerationStats, EvolutionError> {
        let scores = self.evaluate_agents(engine.population());
        engine.evaluate(&scores)?;
        GenerationStats::from_scores(engine.generation(), &scores)
            .ok_or(EvolutionError::EmptyPopulation)
    }

    /// Evaluates the current population and evolves it into the next generation.
    ///
    /// Returns the statistics of the generation that was evaluated.
    pub fn run_generation(
        &mut self,
        engine: &mut EvolutionEngine,
    ) -> Result<GenerationStats, EvolutionError> {
        let stats = self.evaluate_generation(engine)?;
        engine.evolve()?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use neuroracer_network::CarNetwork;

    use crate::{agent::AgentId, genetic::EvolutionParams};

    use super::*;

    #[test]
    fn evaluate_agents_is_order_independent() {
        let engine = EvolutionEngine::with_seed(EvolutionParams::with_population_size(8), 1);
        let mut runner = GenerationRunner::default();

        let forward = runner.evaluate_agents(engine.population());
        let reversed = engine.population().iter().rev().cloned().collect::<Vec<_>>();
        let mut backward = runner.evaluate_agents(&reversed);
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn idle_agent_scores_completion() {
        let agents = [Agent::new(AgentId::new(0), CarNetwork::zeroed())];
        let mut runner = GenerationRunner::default();
        assert_eq!(runner.evaluate_agents(&agents), vec![1200.0]);
    }

    #[test]
    fn evaluate_generation_records_fitness_without_evolving() {
        let mut engine = EvolutionEngine::with_seed(EvolutionParams::with_population_size(6), 2);
        let mut runner = GenerationRunner::default();

        let stats = runner.evaluate_generation(&mut engine).unwrap();

        assert_eq!(engine.generation(), 0);
        assert_eq!(stats.generation, 0);
        assert_eq!(stats.population_size, 6);
        let best = engine.best_agent().unwrap().fitness();
        assert_eq!(stats.best_fitness, best);
        assert!(stats.worst_fitness <= stats.avg_fitness);
        assert!(stats.avg_fitness <= stats.best_fitness);
        assert!(engine.population().iter().all(|a| a.fitness() >= 1.0));
    }

    #[test]
    fn run_generation_advances_engine() {
        let mut engine = EvolutionEngine::with_seed(EvolutionParams::with_population_size(10), 3);
        let mut runner = GenerationRunner::default();

        for generation in 0..5 {
            let stats = runner.run_generation(&mut engine).unwrap();
            assert_eq!(stats.generation, generation);
            assert_eq!(engine.population().len(), 10);
        }
        assert_eq!(engine.generation(), 5);
    }

    #[test]
    fn elite_fitness_never_regresses() {
        let mut engine = EvolutionEngine::with_seed(EvolutionParams::with_population_size(12), 4);
        let mut runner = GenerationRunner::default();

        let mut last_best = f32::MIN;
        for _ in 0..6 {
            let stats = runner.run_generation(&mut engine).unwrap();
            assert!(stats.best_fitness >= last_best);
            last_best = stats.best_fitness;
        }
    }

    #[test]
    fn invalid_population_surfaces_error() {
        let mut engine = EvolutionEngine::with_seed(EvolutionParams::with_population_size(2), 5);
        let mut runner = GenerationRunner::default();
        let err = runner.run_generation(&mut engine).unwrap_err();
        assert!(err.is_invalid_population_state());
    }
}
