//! Observation encoder.
//!
//! Maps an image to a fixed width feature vector:
//!  conv(3x3, 16, stride 2, relu)
//!  conv(3x3, 32, stride 2, relu)
//!  conv(3x3, 64, stride 2, relu)
//!  dropout
//!  fc(128, relu)

use candle_core::{Device, Tensor};
use log::{debug, trace};
use rand_core::RngCore;

use crate::config::EncoderConfig;
use crate::error::{check_dims, DpfError, Result};
use crate::init::{apply_initializer, init_xavier_normal};
use crate::layers::{relu, Conv2d, Dense, Dropout};
use crate::models::{Gradient, Mode, Parameterized, WeightLayer};
use crate::networks::FEATURE_DIM;

const CONV1_FILTERS: usize = 16;
const CONV2_FILTERS: usize = 32;
const CONV3_FILTERS: usize = 64;

pub struct ObservationEncoder {
    height: usize,
    width: usize,
    in_channels: usize,
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    dropout: Dropout,
    fc: Dense,
}

impl ObservationEncoder {
    pub fn new(config: &EncoderConfig, device: &Device, rng: &mut dyn RngCore) -> Result<ObservationEncoder> {
        config.validate()?;
        let conv1 = Conv2d::same("encoder.conv1", config.in_channels, CONV1_FILTERS, 3, 2, device)?;
        let conv2 = Conv2d::same("encoder.conv2", CONV1_FILTERS, CONV2_FILTERS, 3, 2, device)?;
        let conv3 = Conv2d::same("encoder.conv3", CONV2_FILTERS, CONV3_FILTERS, 3, 2, device)?;

        // Feature map after the convolutions must be H/8 x W/8
        let out_h = conv3.out_size(conv2.out_size(conv1.out_size(config.height)));
        let out_w = conv3.out_size(conv2.out_size(conv1.out_size(config.width)));
        if out_h != config.height / 8 || out_w != config.width / 8 {
            return Err(DpfError::InvalidConfig("convolution output does not match H/8 x W/8"));
        }
        let fc_in = conv3.out_channels() * out_h * out_w;

        let encoder = ObservationEncoder {
            height: config.height,
            width: config.width,
            in_channels: config.in_channels,
            conv1,
            conv2,
            conv3,
            dropout: Dropout::new(config.dropout_rate),
            fc: Dense::new("encoder.fc", fc_in, FEATURE_DIM, device)?,
        };
        apply_initializer(&encoder, init_xavier_normal, rng)?;
        debug!(
            "observation encoder {}x{}x{}, {} parameters",
            config.in_channels,
            config.height,
            config.width,
            encoder.num_parameters()
        );
        Ok(encoder)
    }

    /// Input width of the dense layer, 64 * (H/8) * (W/8).
    pub fn fc_in_features(&self) -> usize {
        self.fc.in_features()
    }

    pub fn dropout_rate(&self) -> f64 {
        self.dropout.rate()
    }

    /// Encodes a `(B, C, H, W)` image batch into `(B, 128)` features.
    ///
    /// `rng` is only drawn from in [`Mode::Training`].
    pub fn forward(&self, images: &Tensor, mode: Mode, rng: &mut dyn RngCore) -> Result<Tensor> {
        let dims = images.dims();
        let batch = dims.first().copied().unwrap_or(0);
        check_dims("encoder input", dims, &[batch, self.in_channels, self.height, self.width])?;
        trace!("encoding {} images in {:?} mode", batch, mode);

        let x = relu(&self.conv1.forward(images, Gradient::Tracked)?)?;
        let x = relu(&self.conv2.forward(&x, Gradient::Tracked)?)?;
        let x = relu(&self.conv3.forward(&x, Gradient::Tracked)?)?;
        let x = self.dropout.forward(&x, mode, rng)?;
        let x = x.flatten_from(1)?;
        relu(&self.fc.forward(&x, Gradient::Tracked)?)
    }
}

impl Parameterized for ObservationEncoder {
    fn weight_layers(&self) -> Vec<&dyn WeightLayer> {
        vec![&self.conv1, &self.conv2, &self.conv3, &self.fc]
    }
}
