//! Genetic operators on flat weight vectors.
//!
//! Operators never look at the layer structure of a network. Parents are combined
//! element by element on their flattened representation, and the result is turned back
//! into a network with [`DecisionNetwork::restore`](neuroracer_network::DecisionNetwork::restore).
//!
//! # Operations
//!
//! - **Crossover**: [`uniform_crossover`] picks each weight from one of two parents
//! - **Mutation**: [`mutate`] adds Gaussian noise to a random subset of weights

use rand::Rng;
use rand_distr::Normal;

/// Creates a weight vector by applying a function to each index.
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Performs uniform crossover between two parent weight vectors.
///
/// At each index the child takes the value of `p1` with probability `rate`, otherwise
/// the value of `p2`. Every index is decided independently.
///
/// # Panics
///
/// Panics if parent vectors have different lengths.
pub fn uniform_crossover<R>(p1: &[f32], p2: &[f32], rate: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    from_fn(
        |i| {
            if rng.random::<f32>() < rate {
                p1[i]
            } else {
                p2[i]
            }
        },
        p1.len(),
    )
}

/// Applies Gaussian mutation to a weight vector in-place.
///
/// Each weight is perturbed by a sample from `noise` with probability `rate` and left
/// unchanged otherwise. Weights are not clamped.
pub fn mutate<R>(weights: &mut [f32], rate: f32, noise: Normal<f32>, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for w in weights {
        if rng.random::<f32>() < rate {
            *w += rng.sample(noise);
        }
    }
}
