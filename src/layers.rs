//! Network layers.
//!
//! Parameters are held as [`Var`]s so gradients computed by `Tensor::backward` reach them,
//! and so an initialization pass can overwrite them in place.

use candle_core::{DType, Device, Module, Tensor, Var};
use candle_nn::{Conv2dConfig, Linear};
use rand_core::RngCore;

use crate::error::{check_dims, Result};
use crate::models::{Gradient, Mode, WeightLayer};
use crate::noise;

fn parameters(weight: &Var, bias: &Var, gradient: Gradient) -> (Tensor, Tensor) {
    match gradient {
        Gradient::Tracked => (weight.as_tensor().clone(), bias.as_tensor().clone()),
        Gradient::Detached => (weight.as_detached_tensor(), bias.as_detached_tensor()),
    }
}

fn input(x: &Tensor, gradient: Gradient) -> Tensor {
    match gradient {
        Gradient::Tracked => x.clone(),
        Gradient::Detached => x.detach(),
    }
}

/// Rectified linear unit that keeps NaN, unlike `Tensor::relu`.
pub fn relu(x: &Tensor) -> Result<Tensor> {
    Ok(x.maximum(0f32)?)
}

/// Fully connected layer, `y = x.W' + b` over the last dimension.
pub struct Dense {
    name: &'static str,
    in_features: usize,
    out_features: usize,
    weight: Var,
    bias: Var,
}

impl Dense {
    /// A zero layer; networks initialize it afterwards.
    pub fn new(name: &'static str, in_features: usize, out_features: usize, device: &Device) -> Result<Dense> {
        Ok(Dense {
            name,
            in_features,
            out_features,
            weight: Var::zeros((out_features, in_features), DType::F32, device)?,
            bias: Var::zeros(out_features, DType::F32, device)?,
        })
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn forward(&self, x: &Tensor, gradient: Gradient) -> Result<Tensor> {
        let last = x.dims().last().copied().unwrap_or(0);
        check_dims(self.name, &[last], &[self.in_features])?;
        let (w, b) = parameters(&self.weight, &self.bias, gradient);
        Ok(Linear::new(w, Some(b)).forward(&input(x, gradient))?)
    }
}

impl WeightLayer for Dense {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fans(&self) -> (usize, usize) {
        (self.in_features, self.out_features)
    }

    fn weight(&self) -> &Var {
        &self.weight
    }

    fn bias(&self) -> &Var {
        &self.bias
    }
}

/// Square kernel 2D convolution over `(B, C, H, W)` input.
pub struct Conv2d {
    name: &'static str,
    in_channels: usize,
    out_channels: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
    weight: Var,
    bias: Var,
}

impl Conv2d {
    /// 'Same' padded convolution: with an odd kernel each side `n` maps to `ceil(n / stride)`.
    pub fn same(
        name: &'static str,
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        device: &Device,
    ) -> Result<Conv2d> {
        Ok(Conv2d {
            name,
            in_channels,
            out_channels,
            kernel,
            stride,
            padding: kernel / 2,
            weight: Var::zeros((out_channels, in_channels, kernel, kernel), DType::F32, device)?,
            bias: Var::zeros(out_channels, DType::F32, device)?,
        })
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Output length of a side of length `n`.
    pub fn out_size(&self, n: usize) -> usize {
        (n + 2 * self.padding - self.kernel) / self.stride + 1
    }

    pub fn forward(&self, x: &Tensor, gradient: Gradient) -> Result<Tensor> {
        let channels = x.dims().get(1).copied().unwrap_or(0);
        check_dims(self.name, &[channels], &[self.in_channels])?;
        let (w, b) = parameters(&self.weight, &self.bias, gradient);
        let config = Conv2dConfig {
            padding: self.padding,
            stride: self.stride,
            ..Default::default()
        };
        Ok(candle_nn::Conv2d::new(w, Some(b), config).forward(&input(x, gradient))?)
    }
}

impl WeightLayer for Conv2d {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fans(&self) -> (usize, usize) {
        let area = self.kernel * self.kernel;
        (self.in_channels * area, self.out_channels * area)
    }

    fn weight(&self) -> &Var {
        &self.weight
    }

    fn bias(&self) -> &Var {
        &self.bias
    }
}

/// Inverted dropout, active only in [`Mode::Training`].
pub struct Dropout {
    rate: f64,
}

impl Dropout {
    pub fn new(rate: f64) -> Dropout {
        Dropout { rate }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn forward(&self, x: &Tensor, mode: Mode, rng: &mut dyn RngCore) -> Result<Tensor> {
        if mode == Mode::Evaluation || self.rate == 0. {
            return Ok(x.clone());
        }
        let mask = noise::dropout_mask(x.dims(), 1. - self.rate, x.device(), rng)?;
        Ok(x.mul(&mask)?)
    }
}
