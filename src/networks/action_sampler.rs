//! Action sampler.
//!
//! Turns a nominal action into one noisy action per particle. The motion noise network
//!  2 x fc(32, relu), fc(state_dim)
//! maps the normalized action concatenated with standard normal noise to a delta,
//! which is centred across the particles so the ensemble mean stays the nominal action.
//!
//! The delta is generated behind a no-gradient boundary: no gradient reaches the motion noise
//! network through [`ActionSampler::forward`], only through the nominal action.

use candle_core::{Device, Tensor};
use log::{debug, trace};
use rand_core::RngCore;

use crate::config::ActionSamplerConfig;
use crate::error::{check_dims, DpfError, Result};
use crate::init::{apply_initializer, init_xavier_normal};
use crate::layers::{relu, Dense};
use crate::models::{Gradient, Parameterized, WeightLayer};
use crate::noise;

const FC1_FEATURES: usize = 32;
const FC2_FEATURES: usize = 32;

pub struct ActionSampler {
    action_dim: usize,
    state_dim: usize,
    noise_dim: usize,
    fc1: Dense,
    fc2: Dense,
    fc3: Dense,
}

impl ActionSampler {
    pub fn new(config: &ActionSamplerConfig, device: &Device, rng: &mut dyn RngCore) -> Result<ActionSampler> {
        config.validate()?;
        let noise_dim = config.resolved_noise_dim();
        let sampler = ActionSampler {
            action_dim: config.action_dim,
            state_dim: config.state_dim,
            noise_dim,
            fc1: Dense::new("action_sampler.fc1", config.action_dim + noise_dim, FC1_FEATURES, device)?,
            fc2: Dense::new("action_sampler.fc2", FC1_FEATURES, FC2_FEATURES, device)?,
            fc3: Dense::new("action_sampler.fc3", FC2_FEATURES, config.state_dim, device)?,
        };
        if sampler.fc1.in_features() != sampler.action_dim + sampler.noise_dim {
            return Err(DpfError::InvalidConfig("action_dim + noise_dim must equal the motion noise input width"));
        }
        apply_initializer(&sampler, init_xavier_normal, rng)?;
        debug!(
            "action sampler action_dim {} noise_dim {} state_dim {}, {} parameters",
            sampler.action_dim,
            sampler.noise_dim,
            sampler.state_dim,
            sampler.num_parameters()
        );
        Ok(sampler)
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn noise_dim(&self) -> usize {
        self.noise_dim
    }

    /// Motion noise network output `(.., state_dim)` for `(.., action_dim + noise_dim)` input.
    pub fn generate_motion_noise(&self, x: &Tensor, gradient: Gradient) -> Result<Tensor> {
        let width = x.dims().last().copied().unwrap_or(0);
        check_dims("motion noise input", &[width], &[self.action_dim + self.noise_dim])?;
        let x = relu(&self.fc1.forward(x, gradient)?)?;
        let x = relu(&self.fc2.forward(&x, gradient)?)?;
        self.fc3.forward(&x, gradient)
    }

    /// Noisy actions `(B, P, state_dim)`.
    ///
    /// `actions` is `(B, action_dim)`, `stds` the `(B,)` normalization scale and `particles` the
    /// `(B, P, state_dim)` particle state, used for the particle count.
    /// A zero in `stds` is not checked, the non finite normalized action propagates into the motion noise network.
    pub fn forward(&self, actions: &Tensor, stds: &Tensor, particles: &Tensor, rng: &mut dyn RngCore) -> Result<Tensor> {
        let batch = actions.dims().first().copied().unwrap_or(0);
        check_dims("actions", actions.dims(), &[batch, self.action_dim])?;
        check_dims("stds", stds.dims(), &[batch])?;
        let num_particles = particles.dims().get(1).copied().unwrap_or(0);
        check_dims("particles", particles.dims(), &[batch, num_particles, self.state_dim])?;
        trace!("sampling actions for {} x {} particles", batch, num_particles);

        let normalized = actions.broadcast_div(&stds.unsqueeze(1)?)?;
        let expanded = normalized
            .unsqueeze(1)?
            .broadcast_as((batch, num_particles, self.action_dim))?
            .contiguous()?;
        let random_input = noise::standard_normal(&[batch, num_particles, self.noise_dim], actions.device(), rng)?;
        let x = Tensor::cat(&[&expanded, &random_input], 2)?;

        let delta = self.generate_motion_noise(&x, Gradient::Detached)?;
        let delta = delta.broadcast_sub(&delta.mean_keepdim(1)?)?;

        Ok(actions.unsqueeze(1)?.broadcast_add(&delta)?)
    }
}

impl Parameterized for ActionSampler {
    fn weight_layers(&self) -> Vec<&dyn WeightLayer> {
        vec![&self.fc1, &self.fc2, &self.fc3]
    }
}
