//! Genetic algorithm evolving the weights of racing controllers.
//!
//! The engine owns the population and produces one generation per [`EvolutionEngine::evolve`]
//! call. Fitness comes from outside through [`EvolutionEngine::evaluate`]; the engine
//! itself never runs the simulation.
//!
//! # Genetic Operators
//!
//! ## Tournament Selection
//!
//! `population_size` tournaments are held. Each draws `tournament_size` distinct agents
//! uniformly at random from the whole population and keeps the fittest one (the first
//! drawn wins a tie). Tournaments are independent, so one agent can win many of them.
//!
//! ## Elitism
//!
//! The fittest agent of the current population (first in population order on a tie) is
//! copied into the next population unchanged, including its id and its now stale
//! fitness. It always occupies index 0 of the evolved population.
//!
//! ## Uniform Crossover
//!
//! Two parents are drawn independently from the tournament winners. The child takes
//! each weight from the first parent with probability `crossover_rate`, otherwise from
//! the second.
//!
//! ## Gaussian Mutation
//!
//! Every child (never the elite) has each weight perturbed by `N(0, mutation_sigma²)`
//! with probability `mutation_rate`.
//!
//! # Determinism
//!
//! All randomness comes from a [`Pcg32`] owned by the engine. Two engines created with
//! [`EvolutionEngine::with_seed`] and the same seed produce the same populations when
//! given the same scores.

use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_distr::Normal;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use neuroracer_network::CarNetwork;

use crate::{
    EvolutionError,
    agent::{Agent, AgentId, AgentSnapshot},
    weights,
};

/// Parameters of the genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionParams {
    /// Number of agents in every generation
    pub population_size: usize,
    /// Agents drawn per tournament (larger = stronger selection pressure)
    pub tournament_size: usize,
    /// Probability of taking a weight from the first parent
    pub crossover_rate: f32,
    /// Probability of mutating each weight of a child
    pub mutation_rate: f32,
    /// Standard deviation of the Gaussian mutation noise
    pub mutation_sigma: f32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            tournament_size: 5,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            mutation_sigma: 0.1,
        }
    }
}

impl EvolutionParams {
    /// Default parameters with a different population size.
    #[must_use]
    pub fn with_population_size(population_size: usize) -> Self {
        Self {
            population_size,
            ..Self::default()
        }
    }

    /// Checks that a population built from these parameters can be evolved.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        check_tournament(self.population_size, self.tournament_size)?;
        self.mutation_noise()?;
        Ok(())
    }

    fn mutation_noise(&self) -> Result<Normal<f32>, EvolutionError> {
        let sigma = self.mutation_sigma;
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(EvolutionError::InvalidMutationSigma { sigma });
        }
        Normal::new(0.0, sigma).map_err(|_| EvolutionError::InvalidMutationSigma { sigma })
    }
}

/// Owns the population and advances it one generation at a time.
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    params: EvolutionParams,
    population: Vec<Agent>,
    generation: usize,
    next_id: u64,
    rng: Pcg32,
}

impl EvolutionEngine {
    /// Creates an engine with a random population, seeded from the thread-local RNG.
    #[must_use]
    pub fn new(params: EvolutionParams) -> Self {
        Self::with_seed(params, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for reproducible runs.
    #[must_use]
    pub fn with_seed(params: EvolutionParams, seed: u64) -> Self {
        let mut this = Self {
            params,
            population: Vec::with_capacity(params.population_size),
            generation: 0,
            next_id: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        for _ in 0..params.population_size {
            let id = this.allocate_id();
            let agent = Agent::random(id, &mut this.rng);
            this.population.push(agent);
        }
        this
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    #[must_use]
    pub fn population(&self) -> &[Agent] {
        &self.population
    }

    /// Number of completed [`Self::evolve`] calls.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the fittest agent, first in population order on a tie.
    #[must_use]
    pub fn best_agent(&self) -> Option<&Agent> {
        best_index(&self.population).map(|i| &self.population[i])
    }

    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            generation: self.generation,
            agents: self.population.iter().map(Agent::snapshot).collect(),
        }
    }

    /// Assigns fitness scores to the population, in population order.
    ///
    /// On error the population is left untouched.
    pub fn evaluate(&mut self, scores: &[f32]) -> Result<(), EvolutionError> {
        if scores.len() != self.population.len() {
            return Err(EvolutionError::ScoreCountMismatch {
                expected: self.population.len(),
                actual: scores.len(),
            });
        }
        for (agent, &score) in self.population.iter_mut().zip(scores) {
            agent.set_fitness(score);
        }
        Ok(())
    }

    /// Runs `population_size` tournaments and returns the indices of the winners.
    pub fn selection(&mut self) -> Result<Vec<usize>, EvolutionError> {
        check_tournament(self.population.len(), self.params.tournament_size)?;
        let winners = (0..self.population.len())
            .map(|_| {
                tournament_select(&self.population, self.params.tournament_size, &mut self.rng)
            })
            .collect();
        Ok(winners)
    }

    /// Replaces the population with the next generation.
    ///
    /// The elite is kept at index 0; the remaining slots are filled with mutated
    /// offspring of tournament winners.
    pub fn evolve(&mut self) -> Result<(), EvolutionError> {
        let noise = self.params.mutation_noise()?;
        let selected = self.selection()?;
        let elite = best_index(&self.population).ok_or(EvolutionError::EmptyPopulation)?;

        let mut next_population = Vec::with_capacity(self.params.population_size);
        next_population.push(self.population[elite].clone());

        while next_population.len() < self.params.population_size {
            let (Some(&i1), Some(&i2)) = (
                selected.choose(&mut self.rng),
                selected.choose(&mut self.rng),
            ) else {
                return Err(EvolutionError::EmptyPopulation);
            };
            let mut child = weights::uniform_crossover(
                &self.population[i1].weights(),
                &self.population[i2].weights(),
                self.params.crossover_rate,
                &mut self.rng,
            );
            weights::mutate(&mut child, self.params.mutation_rate, noise, &mut self.rng);

            let network = CarNetwork::restore(&child)?;
            let id = self.allocate_id();
            next_population.push(Agent::new(id, network));
        }

        self.population = next_population;
        self.generation += 1;
        Ok(())
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Fitness and weights of every agent, for visualization or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub generation: usize,
    pub agents: Vec<AgentSnapshot>,
}

fn check_tournament(population_size: usize, tournament_size: usize) -> Result<(), EvolutionError> {
    if population_size == 0 {
        return Err(EvolutionError::EmptyPopulation);
    }
    if tournament_size == 0 || tournament_size > population_size {
        return Err(EvolutionError::InvalidTournamentSize {
            tournament_size,
            population_size,
        });
    }
    Ok(())
}

/// Index of the fittest agent, first one wins a tie.
fn best_index(population: &[Agent]) -> Option<usize> {
    (0..population.len()).reduce(|best, i| {
        if population[i].fitness() > population[best].fitness() {
            i
        } else {
            best
        }
    })
}

/// Selects an agent using tournament selection.
///
/// Draws `tournament_size` distinct agents and returns the index of the fittest one.
///
/// # Panics
///
/// Panics if `tournament_size` is zero or larger than the population.
fn tournament_select<R>(population: &[Agent], tournament_size: usize, rng: &mut R) -> usize
where
    R: rand::Rng + ?Sized,
{
    assert!(tournament_size > 0 && tournament_size <= population.len());
    rand::seq::index::sample(rng, population.len(), tournament_size)
        .into_iter()
        .reduce(|best, i| {
            if population[i].fitness() > population[best].fitness() {
                i
            } else {
                best
            }
        })
        .expect("tournament should never be empty")
}
