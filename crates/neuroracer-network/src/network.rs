//! The feedforward network that maps an observation to an action.
//!
//! Layers are stored as fixed-size arrays whose dimensions are const generic
//! parameters, so a network of the wrong topology is a type error rather than a
//! runtime check. [`DecisionNetwork::flatten`] and [`DecisionNetwork::restore`] provide
//! the flat weight vector view used by training.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::activation::{self, relu};

/// Scale applied to standard normal samples when initializing weights.
const INIT_SCALE: f32 = 0.5;

/// Number of observation values the racing controller receives.
pub const CAR_INPUT_SIZE: usize = 4;
/// Number of hidden units in the racing controller.
pub const CAR_HIDDEN_SIZE: usize = 8;
/// Number of action values the racing controller produces.
pub const CAR_OUTPUT_SIZE: usize = 2;

/// The 4 → 8 → 2 network that drives a car.
pub type CarNetwork = DecisionNetwork<CAR_INPUT_SIZE, CAR_HIDDEN_SIZE, CAR_OUTPUT_SIZE>;

/// Layer sizes of a [`DecisionNetwork`].
///
/// Stored alongside exported weights so that a weight vector can be checked against the
/// topology it was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkShape {
    /// Number of observation values fed to the network.
    pub input: usize,
    /// Number of ReLU units in the hidden layer.
    pub hidden: usize,
    /// Number of tanh outputs.
    pub output: usize,
}

impl NetworkShape {
    /// Total number of learnable parameters for this shape.
    #[must_use]
    pub const fn weight_count(&self) -> usize {
        self.input * self.hidden + self.hidden + self.hidden * self.output + self.output
    }
}

/// Feedforward network with one hidden layer.
///
/// `hidden = ReLU(observation · W1 + b1)`, `output = tanh(hidden · W2 + b2)`.
///
/// Parameters are never updated in place by training. New parameter sets are produced
/// as flat weight vectors and turned into networks with [`Self::restore`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNetwork<const IN: usize, const HIDDEN: usize, const OUT: usize> {
    pub(crate) w1: [[f32; HIDDEN]; IN],
    pub(crate) b1: [f32; HIDDEN],
    pub(crate) w2: [[f32; OUT]; HIDDEN],
    pub(crate) b2: [f32; OUT],
}

impl<const IN: usize, const HIDDEN: usize, const OUT: usize> DecisionNetwork<IN, HIDDEN, OUT> {
    /// Layer sizes of this topology.
    pub const SHAPE: NetworkShape = NetworkShape {
        input: IN,
        hidden: HIDDEN,
        output: OUT,
    };

    /// Creates a network with every parameter set to zero.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            w1: [[0.0; HIDDEN]; IN],
            b1: [0.0; HIDDEN],
            w2: [[0.0; OUT]; HIDDEN],
            b2: [0.0; OUT],
        }
    }

    /// Creates a network with randomly initialized weights.
    ///
    /// Every weight is drawn independently from `N(0, 1)` and scaled by 0.5.
    /// Biases start at zero.
    #[must_use]
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut network = Self::zeroed();
        let weights = network
            .w1
            .iter_mut()
            .flatten()
            .chain(network.w2.iter_mut().flatten());
        for w in weights {
            let noise: f32 = rng.sample(StandardNormal);
            *w = noise * INIT_SCALE;
        }
        network
    }

    /// Maps an observation to an action vector.
    ///
    /// Outputs are squashed by `tanh`, so every coordinate lies in `[-1, 1]` (strictly
    /// inside unless the pre-activation is large enough to round to ±1 in `f32`).
    #[must_use]
    pub fn forward(&self, observation: &[f32; IN]) -> [f32; OUT] {
        let mut hidden = self.b1;
        for (&x, row) in observation.iter().zip(&self.w1) {
            for (h, &w) in hidden.iter_mut().zip(row) {
                *h += x * w;
            }
        }
        activation::apply(&mut hidden, relu);

        let mut output = self.b2;
        for (&h, row) in hidden.iter().zip(&self.w2) {
            for (o, &w) in output.iter_mut().zip(row) {
                *o += h * w;
            }
        }
        activation::apply(&mut output, f32::tanh);
        output
    }

    /// Input-to-hidden weights, indexed `[input][hidden]`.
    #[must_use]
    pub fn input_weights(&self) -> &[[f32; HIDDEN]; IN] {
        &self.w1
    }

    /// Biases of the hidden layer.
    #[must_use]
    pub fn hidden_biases(&self) -> &[f32; HIDDEN] {
        &self.b1
    }

    /// Hidden-to-output weights, indexed `[hidden][output]`.
    #[must_use]
    pub fn output_weights(&self) -> &[[f32; OUT]; HIDDEN] {
        &self.w2
    }

    /// Biases of the output layer.
    #[must_use]
    pub fn output_biases(&self) -> &[f32; OUT] {
        &self.b2
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn random_network_has_zero_biases() {
        let mut rng = Pcg32::seed_from_u64(7);
        let network = CarNetwork::random(&mut rng);
        assert!(network.hidden_biases().iter().all(|&b| b == 0.0));
        assert!(network.output_biases().iter().all(|&b| b == 0.0));
        assert!(network.input_weights().iter().flatten().any(|&w| w != 0.0));
        assert!(network.output_weights().iter().flatten().any(|&w| w != 0.0));
    }

    #[test]
    fn random_network_is_deterministic_for_fixed_seed() {
        let a = CarNetwork::random(&mut Pcg32::seed_from_u64(42));
        let b = CarNetwork::random(&mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn zeroed_network_outputs_zero() {
        let network = CarNetwork::zeroed();
        assert_eq!(network.forward(&[10.0, -3.0, 5.0, 0.5]), [0.0, 0.0]);
    }

    #[test]
    fn forward_matches_hand_computed_values() {
        let mut network = DecisionNetwork::<2, 2, 1>::zeroed();
        network.w1 = [[1.0, -1.0], [0.5, 2.0]];
        network.b1 = [0.0, 1.0];
        network.w2 = [[0.25], [0.5]];
        network.b2 = [-0.5];

        // hidden = relu([1*1 + 2*0.5 + 0, 1*-1 + 2*2 + 1]) = [2, 4]
        // output = tanh(2*0.25 + 4*0.5 - 0.5) = tanh(2)
        let output = network.forward(&[1.0, 2.0]);
        assert!((output[0] - 2.0_f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn hidden_layer_drops_negative_activations() {
        let mut network = DecisionNetwork::<1, 1, 1>::zeroed();
        network.w1 = [[-1.0]];
        network.w2 = [[3.0]];
        network.b2 = [0.25];
        // negative hidden pre-activation is clipped, leaving only the output bias
        let output = network.forward(&[4.0]);
        assert!((output[0] - 0.25_f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn outputs_stay_within_unit_interval() {
        let mut rng = Pcg32::seed_from_u64(3);
        let observations = [
            [0.0, 100.0, 1.0, 0.0],
            [50.0, 50.0, 5.0, 0.5],
            [-20.0, 120.0, 10.0, 1.0],
            [1.0e6, -1.0e6, 1.0e3, -4.0],
        ];
        for _ in 0..50 {
            let network = CarNetwork::random(&mut rng);
            for observation in &observations {
                for v in network.forward(observation) {
                    assert!((-1.0..=1.0).contains(&v), "{v} out of range");
                }
            }
        }
    }

    #[test]
    fn small_inputs_stay_strictly_inside_unit_interval() {
        let mut rng = Pcg32::seed_from_u64(11);
        let network = CarNetwork::random(&mut rng);
        for v in network.forward(&[0.1, 0.2, 0.3, 0.4]) {
            assert!(v > -1.0 && v < 1.0);
        }
    }

    #[test]
    fn shape_weight_count_matches_topology() {
        assert_eq!(CarNetwork::SHAPE.weight_count(), 4 * 8 + 8 + 8 * 2 + 2);
        assert_eq!(
            DecisionNetwork::<3, 5, 7>::SHAPE.weight_count(),
            3 * 5 + 5 + 5 * 7 + 7
        );
    }

    #[test]
    fn shape_serializes_with_named_fields() {
        let json = serde_json::to_string(&CarNetwork::SHAPE).unwrap();
        assert_eq!(json, r#"{"input":4,"hidden":8,"output":2}"#);
    }
}
