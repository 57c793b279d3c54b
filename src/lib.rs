//! DPF SE(2), the learned models of a Differentiable Particle Filter.
//!
//! A Differentiable Particle Filter is a particle filter whose observation and motion models are neural networks
//! trained end to end through the filter. Particles are hypotheses of a planar pose, (x, y, θ) on SE(2).
//!
//! The crate provides the three learned models:
//!  an observation encoder mapping an image to a 128 wide feature,
//!  an observation likelihood estimator scoring a feature with a weight in [min_observation_likelihood, 1],
//!  an action sampler producing zero mean noisy actions, one per particle.
//! [`dpf::DpfSe2`] composes them with SE(2) particle motion for the filter's predict and observe steps.
//!
//! Tensors are candle tensors, parameters candle variables, so gradients flow with `Tensor::backward`.
//! All randomness is drawn from a caller supplied generator.
//!
//! # Licensing
//!
//! Released under the MIT license.

pub mod config;
pub mod dpf;
pub mod error;
pub mod init;
pub mod layers;
pub mod models;
pub mod networks;
pub mod noise;
pub mod se2;

pub use error::{DpfError, Result};
