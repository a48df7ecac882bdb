//! Conversion between a [`DecisionNetwork`] and its flat weight vector.

use crate::{DecisionNetwork, ShapeMismatchError};

impl<const IN: usize, const HIDDEN: usize, const OUT: usize> DecisionNetwork<IN, HIDDEN, OUT> {
    /// Length of the flat weight vector for this topology.
    pub const WEIGHT_COUNT: usize = IN * HIDDEN + HIDDEN + HIDDEN * OUT + OUT;

    /// Iterates over every parameter in canonical order (`W1`, `b1`, `W2`, `b2`).
    pub fn parameters(&self) -> impl Iterator<Item = &f32> + '_ {
        self.w1
            .iter()
            .flatten()
            .chain(&self.b1)
            .chain(self.w2.iter().flatten())
            .chain(&self.b2)
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f32> + '_ {
        self.w1
            .iter_mut()
            .flatten()
            .chain(&mut self.b1)
            .chain(self.w2.iter_mut().flatten())
            .chain(&mut self.b2)
    }

    /// Flattens all parameters into a weight vector of length [`Self::WEIGHT_COUNT`].
    #[must_use]
    pub fn flatten(&self) -> Vec<f32> {
        let mut weights = Vec::with_capacity(Self::WEIGHT_COUNT);
        weights.extend(self.parameters().copied());
        weights
    }

    /// Builds a network from a weight vector produced by [`Self::flatten`].
    ///
    /// The vector must contain exactly [`Self::WEIGHT_COUNT`] elements. Shorter or
    /// longer vectors are rejected rather than truncated or padded.
    pub fn restore(weights: &[f32]) -> Result<Self, ShapeMismatchError> {
        if weights.len() != Self::WEIGHT_COUNT {
            return Err(ShapeMismatchError {
                expected: Self::WEIGHT_COUNT,
                actual: weights.len(),
            });
        }
        let mut network = Self::zeroed();
        for (slot, &w) in network.parameters_mut().zip(weights) {
            *slot = w;
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::CarNetwork;

    use super::*;

    #[test]
    fn flatten_has_topology_length() {
        let network = CarNetwork::random(&mut Pcg32::seed_from_u64(1));
        assert_eq!(network.flatten().len(), 58);
        assert_eq!(CarNetwork::WEIGHT_COUNT, 58);
        assert_eq!(CarNetwork::WEIGHT_COUNT, CarNetwork::SHAPE.weight_count());
    }

    #[test]
    fn restore_reproduces_every_tensor() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..10 {
            let network = CarNetwork::random(&mut rng);
            let restored = CarNetwork::restore(&network.flatten()).unwrap();
            assert_eq!(restored.input_weights(), network.input_weights());
            assert_eq!(restored.hidden_biases(), network.hidden_biases());
            assert_eq!(restored.output_weights(), network.output_weights());
            assert_eq!(restored.output_biases(), network.output_biases());
        }
    }

    #[test]
    fn canonical_order_is_w1_b1_w2_b2() {
        let weights = (0..DecisionNetwork::<2, 3, 2>::WEIGHT_COUNT)
            .map(|i| f32::from(u8::try_from(i).unwrap()))
            .collect::<Vec<_>>();
        let network = DecisionNetwork::<2, 3, 2>::restore(&weights).unwrap();
        assert_eq!(network.input_weights(), &[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]);
        assert_eq!(network.hidden_biases(), &[6.0, 7.0, 8.0]);
        assert_eq!(
            network.output_weights(),
            &[[9.0, 10.0], [11.0, 12.0], [13.0, 14.0]]
        );
        assert_eq!(network.output_biases(), &[15.0, 16.0]);
        assert_eq!(network.flatten(), weights);
    }

    #[test]
    fn restore_rejects_short_vector() {
        let err = CarNetwork::restore(&[0.0; 57]).unwrap_err();
        assert_eq!(
            err,
            ShapeMismatchError {
                expected: 58,
                actual: 57
            }
        );
    }

    #[test]
    fn restore_rejects_long_vector() {
        let err = CarNetwork::restore(&[0.0; 59]).unwrap_err();
        assert_eq!(err.actual, 59);
        assert_eq!(
            err.to_string(),
            "weight vector has 59 elements, but the network expects 58"
        );
    }

    #[test]
    fn restore_rejects_empty_vector() {
        assert!(CarNetwork::restore(&[]).is_err());
    }
}
