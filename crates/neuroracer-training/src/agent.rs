//! Agents: a decision network plus its bookkeeping.

use neuroracer_engine::{Action, Controller, Observation};
use neuroracer_network::CarNetwork;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identity of an agent, unique within one [`EvolutionEngine`](crate::genetic::EvolutionEngine).
///
/// Offspring always receive a fresh id. The elite keeps its id when it is carried over,
/// so the same id appearing in consecutive generations means the same network.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("agent#{_0}")]
#[serde(transparent)]
pub struct AgentId(u64);

impl AgentId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A candidate controller in the population.
///
/// The network is only ever replaced as a whole. Crossover and mutation build new agents
/// instead of modifying a parent.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    network: CarNetwork,
    fitness: f32,
}

impl Agent {
    /// Creates an agent with fitness 0.
    #[must_use]
    pub fn new(id: AgentId, network: CarNetwork) -> Self {
        Self {
            id,
            network,
            fitness: 0.0,
        }
    }

    /// Creates an agent with a randomly initialized network.
    #[must_use]
    pub fn random<R>(id: AgentId, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(id, CarNetwork::random(rng))
    }

    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[must_use]
    pub fn network(&self) -> &CarNetwork {
        &self.network
    }

    /// Returns the most recently evaluated fitness.
    ///
    /// For a carried-over elite this is the score from the previous generation until the
    /// agent is evaluated again.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    #[must_use]
    pub fn predict(&self, observation: &Observation) -> Action {
        self.network.act(observation)
    }

    /// Returns the flat weight vector of this agent's network.
    #[must_use]
    pub fn weights(&self) -> Vec<f32> {
        self.network.flatten()
    }

    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            fitness: self.fitness,
            weights: self.weights(),
        }
    }
}

impl Controller for Agent {
    fn act(&self, observation: &Observation) -> Action {
        self.predict(observation)
    }
}

/// Transferable view of an agent for visualization clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub fitness: f32,
    pub weights: Vec<f32>,
}
