//! Observation likelihood estimator.
//!
//! Scores an encoded observation with a belief update weight:
//!  fc(128, relu)
//!  fc(128, relu)
//!  fc(1, sigmoid)
//!
//! The sigmoid is rescaled into [min_observation_likelihood, 1] so a particle weight never collapses to zero.

use candle_core::{Device, Tensor};
use log::{debug, trace};
use rand_core::RngCore;

use crate::config::LikelihoodConfig;
use crate::error::{check_dims, Result};
use crate::init::{apply_initializer, init_xavier_normal};
use crate::layers::{relu, Dense};
use crate::models::{Gradient, Parameterized, WeightLayer};

const FC1_FEATURES: usize = 128;
const FC2_FEATURES: usize = 128;

pub struct ObservationLikelihoodEstimator {
    min_observation_likelihood: f64,
    fc1: Dense,
    fc2: Dense,
    fc3: Dense,
}

impl ObservationLikelihoodEstimator {
    pub fn new(config: &LikelihoodConfig, device: &Device, rng: &mut dyn RngCore) -> Result<ObservationLikelihoodEstimator> {
        config.validate()?;
        let estimator = ObservationLikelihoodEstimator {
            min_observation_likelihood: config.min_observation_likelihood,
            fc1: Dense::new("likelihood.fc1", config.in_features, FC1_FEATURES, device)?,
            fc2: Dense::new("likelihood.fc2", FC1_FEATURES, FC2_FEATURES, device)?,
            fc3: Dense::new("likelihood.fc3", FC2_FEATURES, 1, device)?,
        };
        apply_initializer(&estimator, init_xavier_normal, rng)?;
        debug!(
            "observation likelihood estimator, floor {}, {} parameters",
            config.min_observation_likelihood,
            estimator.num_parameters()
        );
        Ok(estimator)
    }

    pub fn in_features(&self) -> usize {
        self.fc1.in_features()
    }

    pub fn min_observation_likelihood(&self) -> f64 {
        self.min_observation_likelihood
    }

    /// Likelihood `(B, 1)` of `(B, in_features)` features.
    pub fn forward(&self, features: &Tensor) -> Result<Tensor> {
        let dims = features.dims();
        let batch = dims.first().copied().unwrap_or(0);
        check_dims("likelihood input", dims, &[batch, self.in_features()])?;
        trace!("scoring {} observations", batch);

        let x = relu(&self.fc1.forward(features, Gradient::Tracked)?)?;
        let x = relu(&self.fc2.forward(&x, Gradient::Tracked)?)?;
        let x = candle_nn::ops::sigmoid(&self.fc3.forward(&x, Gradient::Tracked)?)?;

        let min = self.min_observation_likelihood;
        let x = x.affine(1. - min, min)?;
        // f32 rounding must not leave [min, 1]
        Ok(x.clamp(min as f32, 1f32)?)
    }
}

impl Parameterized for ObservationLikelihoodEstimator {
    fn weight_layers(&self) -> Vec<&dyn WeightLayer> {
        vec![&self.fc1, &self.fc2, &self.fc3]
    }
}
