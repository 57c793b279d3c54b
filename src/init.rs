//! Weight initialization.
//!
//! Initialization is an explicit pass over the layers a network reports through [`Parameterized`],
//! applying one named [`Initializer`] to each of them.

use log::debug;
use rand_core::RngCore;

use crate::error::Result;
use crate::models::{Parameterized, WeightLayer};
use crate::noise;

/// An initialization function for a single weight-bearing layer.
pub type Initializer = fn(&dyn WeightLayer, &mut dyn RngCore) -> Result<()>;

/// Standard deviation of the Xavier/Glorot normal distribution.
pub fn xavier_normal_std(fan_in: usize, fan_out: usize) -> f64 {
    (2. / (fan_in + fan_out) as f64).sqrt()
}

/// Xavier/Glorot normal initialization.
///
/// Weights are drawn from N(0, 2/(fan_in+fan_out)), the bias is zeroed.
pub fn init_xavier_normal(layer: &dyn WeightLayer, rng: &mut dyn RngCore) -> Result<()> {
    let (fan_in, fan_out) = layer.fans();
    let weight = layer.weight();
    let w = noise::normal(weight.dims(), xavier_normal_std(fan_in, fan_out), weight.device(), rng)?;
    weight.set(&w)?;
    let bias = layer.bias();
    bias.set(&bias.zeros_like()?)?;
    Ok(())
}

/// Applies `initializer` to every weight-bearing layer of `module`.
///
/// Returns the number of layers initialized.
pub fn apply_initializer(module: &dyn Parameterized, initializer: Initializer, rng: &mut dyn RngCore) -> Result<usize> {
    let layers = module.weight_layers();
    for layer in &layers {
        initializer(*layer, rng)?;
        debug!("initialized {} with fans {:?}", layer.name(), layer.fans());
    }
    Ok(layers.len())
}
