//! Random tensors.
//!
//! Every draw is made from a caller supplied generator so seeding remains the caller's responsibility.

use candle_core::{DType, Device, Tensor};
use rand_core::RngCore;
use rand_distr::{Bernoulli, Distribution, Normal, StandardNormal};

use crate::error::{DpfError, Result};

/// Independent standard normal samples of the given shape.
pub fn standard_normal(shape: &[usize], device: &Device, rng: &mut dyn RngCore) -> Result<Tensor> {
    let n: usize = shape.iter().product();
    let mut data = Vec::with_capacity(n);
    for _ in 0..n {
        let v: f32 = StandardNormal.sample(&mut *rng);
        data.push(v);
    }
    Ok(Tensor::from_vec(data, shape.to_vec(), device)?)
}

/// Zero mean normal samples with standard deviation `std`.
pub fn normal(shape: &[usize], std: f64, device: &Device, rng: &mut dyn RngCore) -> Result<Tensor> {
    let dist = Normal::new(0f32, std as f32).map_err(|_| DpfError::InvalidConfig("normal std must be finite and non negative"))?;
    let n: usize = shape.iter().product();
    let data: Vec<f32> = (0..n).map(|_| dist.sample(&mut *rng)).collect();
    Ok(Tensor::from_vec(data, shape.to_vec(), device)?)
}

/// Inverted dropout mask.
///
/// Each element is `1/keep` with probability `keep`, otherwise zero. A zero `keep` gives an all zero mask.
pub fn dropout_mask(shape: &[usize], keep: f64, device: &Device, rng: &mut dyn RngCore) -> Result<Tensor> {
    let dist = Bernoulli::new(keep).map_err(|_| DpfError::InvalidConfig("keep probability must be in [0, 1]"))?;
    if keep == 0. {
        return Ok(Tensor::zeros(shape.to_vec(), DType::F32, device)?);
    }
    let scale = (1. / keep) as f32;
    let n: usize = shape.iter().product();
    let data: Vec<f32> = (0..n)
        .map(|_| if dist.sample(&mut *rng) { scale } else { 0. })
        .collect();
    Ok(Tensor::from_vec(data, shape.to_vec(), device)?)
}
