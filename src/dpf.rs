//! Differentiable Particle Filter model for the SE(2) state space.
//!
//! Owns the three learned models and composes them for the filter's prediction and observation steps.
//! The recursion itself (weighting, resampling) is driven by the caller.

use candle_core::{Device, Tensor};
use log::debug;
use rand_core::RngCore;

use crate::config::DpfConfig;
use crate::error::Result;
use crate::init::{apply_initializer, init_xavier_normal};
use crate::models::{Mode, Parameterized, WeightLayer};
use crate::networks::{ActionSampler, ObservationEncoder, ObservationLikelihoodEstimator};
use crate::se2;

pub struct DpfSe2 {
    encoder: ObservationEncoder,
    likelihood: ObservationLikelihoodEstimator,
    action_sampler: ActionSampler,
}

impl DpfSe2 {
    pub fn new(config: &DpfConfig, device: &Device, rng: &mut dyn RngCore) -> Result<DpfSe2> {
        // Also checks the encoder feature width feeds the likelihood estimator
        config.validate()?;
        let encoder = ObservationEncoder::new(&config.encoder, device, rng)?;
        let likelihood = ObservationLikelihoodEstimator::new(&config.likelihood, device, rng)?;
        let action_sampler = ActionSampler::new(&config.action_sampler, device, rng)?;
        let dpf = DpfSe2 {
            encoder,
            likelihood,
            action_sampler,
        };
        debug!("DPF SE(2) model, {} parameters", dpf.num_parameters());
        Ok(dpf)
    }

    pub fn encoder(&self) -> &ObservationEncoder {
        &self.encoder
    }

    pub fn likelihood(&self) -> &ObservationLikelihoodEstimator {
        &self.likelihood
    }

    pub fn action_sampler(&self) -> &ActionSampler {
        &self.action_sampler
    }

    /// Features `(B, 128)` of an image batch.
    pub fn encode(&self, images: &Tensor, mode: Mode, rng: &mut dyn RngCore) -> Result<Tensor> {
        self.encoder.forward(images, mode, rng)
    }

    /// Observation likelihood `(B, 1)` of an image batch.
    pub fn observation_likelihood(&self, images: &Tensor, mode: Mode, rng: &mut dyn RngCore) -> Result<Tensor> {
        let features = self.encoder.forward(images, mode, rng)?;
        self.likelihood.forward(&features)
    }

    /// Noisy per particle actions `(B, P, 3)`.
    pub fn sample_actions(&self, actions: &Tensor, stds: &Tensor, particles: &Tensor, rng: &mut dyn RngCore) -> Result<Tensor> {
        self.action_sampler.forward(actions, stds, particles, rng)
    }

    /// Prediction step: moves every particle by its own noisy sample of the nominal action.
    pub fn predict(&self, particles: &Tensor, actions: &Tensor, stds: &Tensor, rng: &mut dyn RngCore) -> Result<Tensor> {
        let motions = self.action_sampler.forward(actions, stds, particles, rng)?;
        se2::propagate_particles(particles, &motions)
    }

    /// Re-runs Xavier normal initialization over all three models.
    pub fn initialize(&self, rng: &mut dyn RngCore) -> Result<usize> {
        apply_initializer(self, init_xavier_normal, rng)
    }
}

impl Parameterized for DpfSe2 {
    fn weight_layers(&self) -> Vec<&dyn WeightLayer> {
        let mut layers = self.encoder.weight_layers();
        layers.extend(self.likelihood.weight_layers());
        layers.extend(self.action_sampler.weight_layers());
        layers
    }
}
