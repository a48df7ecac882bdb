//! Fixed-topology feedforward networks used as racing controllers.
//!
//! This crate provides the decision network evolved by the training system and the
//! codec that converts its parameters to and from a flat weight vector.
//!
//! # Architecture
//!
//! ```text
//! observation [IN]
//!     ↓ · W1 [IN × HIDDEN] + b1 [HIDDEN], ReLU
//! hidden [HIDDEN]
//!     ↓ · W2 [HIDDEN × OUT] + b2 [OUT], tanh
//! action [OUT]
//! ```
//!
//! The topology is fixed at compile time through const generics. [`CarNetwork`] is the
//! 4 → 8 → 2 topology used by the racing environment.
//!
//! # Weight Vector
//!
//! Genetic operators work on a flat `Vec<f32>` rather than on per-layer tensors. The
//! canonical order is:
//!
//! 1. `W1` row-major (`IN * HIDDEN` values)
//! 2. `b1` (`HIDDEN` values)
//! 3. `W2` row-major (`HIDDEN * OUT` values)
//! 4. `b2` (`OUT` values)
//!
//! [`DecisionNetwork::flatten`] and [`DecisionNetwork::restore`] are exact inverses of
//! each other. Restoring from a vector of the wrong length fails with
//! [`ShapeMismatchError`].
//!
//! # Example
//!
//! ```
//! use neuroracer_network::CarNetwork;
//!
//! let network = CarNetwork::random(&mut rand::rng());
//! let weights = network.flatten();
//! assert_eq!(weights.len(), CarNetwork::WEIGHT_COUNT);
//!
//! let restored = CarNetwork::restore(&weights).unwrap();
//! assert_eq!(restored, network);
//!
//! let action = restored.forward(&[50.0, 50.0, 5.0, 0.0]);
//! assert!(action.iter().all(|a| (-1.0..=1.0).contains(a)));
//! ```

pub use self::{activation::*, network::*};

pub mod activation;
mod codec;
mod network;

/// Error returned when a weight vector does not match the network topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("weight vector has {actual} elements, but the network expects {expected}")]
pub struct ShapeMismatchError {
    /// Number of parameters required by the topology.
    pub expected: usize,
    /// Number of values that were supplied.
    pub actual: usize,
}
