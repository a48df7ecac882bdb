use std::path::Path;

use anyhow::{Context, ensure};
use chrono::{DateTime, Utc};
use neuroracer_network::{CarNetwork, NetworkShape};
use serde::{Deserialize, Serialize};

use crate::util;

/// Trained driver exported by `train` and loaded by `drive`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RacerModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation the driver was taken from.
    pub generation: usize,
    pub final_fitness: f32,
    pub shape: NetworkShape,
    pub weights: Vec<f32>,
}

impl RacerModel {
    pub fn new(
        name: String,
        generation: usize,
        final_fitness: f32,
        network: &CarNetwork,
    ) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            generation,
            final_fitness,
            shape: CarNetwork::SHAPE,
            weights: network.flatten(),
        }
    }

    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("racer model", path)
    }

    pub fn to_network(&self) -> anyhow::Result<CarNetwork> {
        ensure!(
            self.shape == CarNetwork::SHAPE,
            "Model {} has shape {:?}, but the car network is {:?}",
            self.name,
            self.shape,
            CarNetwork::SHAPE,
        );
        CarNetwork::restore(&self.weights)
            .with_context(|| format!("Failed to restore weights of model {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use neuroracer_network::CAR_HIDDEN_SIZE;

    use super::*;

    #[test]
    fn model_restores_exported_network() {
        #[expect(clippy::cast_precision_loss)]
        let weights = (0..CarNetwork::WEIGHT_COUNT)
            .map(|i| i as f32 / 100.0)
            .collect::<Vec<_>>();
        let network = CarNetwork::restore(&weights).unwrap();
        let model = RacerModel::new("racer".to_owned(), 7, 1200.0, &network);
        let json = serde_json::to_string(&model).unwrap();
        let loaded: RacerModel = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.generation, 7);
        assert_eq!(loaded.weights, weights);
        assert_eq!(loaded.to_network().unwrap(), network);
    }

    #[test]
    fn mismatched_shape_is_rejected() {
        let mut model = RacerModel::new("racer".to_owned(), 0, 0.0, &CarNetwork::zeroed());
        model.shape.hidden = CAR_HIDDEN_SIZE + 1;
        assert!(model.to_network().is_err());
    }

    #[test]
    fn truncated_weights_are_rejected() {
        let mut model = RacerModel::new("racer".to_owned(), 0, 0.0, &CarNetwork::zeroed());
        model.weights.pop();
        assert!(model.to_network().is_err());
    }
}
