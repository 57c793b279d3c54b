//! Network configuration.
//!
//! Each network is built from a serde section with defaults, so a partial JSON
//! document selects only the values that differ.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{DpfError, Result};

/// Default values of the configuration sections.
pub mod defaults {
    pub fn in_channels() -> usize {
        3
    }

    pub fn dropout_rate() -> f64 {
        0.3
    }

    pub fn in_features() -> usize {
        crate::networks::FEATURE_DIM
    }

    pub fn min_observation_likelihood() -> f64 {
        0.004
    }

    pub fn action_dim() -> usize {
        3
    }

    pub fn state_dim() -> usize {
        crate::se2::STATE_DIM
    }
}

/// Observation encoder settings.
///
/// `height` and `width` must be those of the images later given to the encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Image height (pixels)
    pub height: usize,
    /// Image width (pixels)
    pub width: usize,
    #[serde(default = "defaults::in_channels")]
    pub in_channels: usize,
    /// Probability of zeroing an activation in training mode, 1 drops every activation
    #[serde(default = "defaults::dropout_rate")]
    pub dropout_rate: f64,
}

impl EncoderConfig {
    pub fn new(height: usize, width: usize) -> Self {
        EncoderConfig {
            height,
            width,
            in_channels: defaults::in_channels(),
            dropout_rate: defaults::dropout_rate(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(DpfError::InvalidConfig("image height and width must be non zero"));
        }
        // Three stride 2 'same' convolutions map n to ceil(n/8), the dense layer expects n/8
        if self.height % 8 != 0 || self.width % 8 != 0 {
            return Err(DpfError::InvalidConfig("image height and width must be multiples of 8"));
        }
        if self.in_channels == 0 {
            return Err(DpfError::InvalidConfig("in_channels must be non zero"));
        }
        if !(0.0..=1.0).contains(&self.dropout_rate) {
            return Err(DpfError::InvalidConfig("dropout_rate must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Observation likelihood estimator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodConfig {
    #[serde(default = "defaults::in_features")]
    pub in_features: usize,
    /// Floor of the estimated likelihood
    #[serde(default = "defaults::min_observation_likelihood")]
    pub min_observation_likelihood: f64,
}

impl Default for LikelihoodConfig {
    fn default() -> Self {
        LikelihoodConfig {
            in_features: defaults::in_features(),
            min_observation_likelihood: defaults::min_observation_likelihood(),
        }
    }
}

impl LikelihoodConfig {
    pub fn validate(&self) -> Result<()> {
        if self.in_features == 0 {
            return Err(DpfError::InvalidConfig("in_features must be non zero"));
        }
        if !(0.0..1.0).contains(&self.min_observation_likelihood) {
            return Err(DpfError::InvalidConfig("min_observation_likelihood must be in [0, 1)"));
        }
        Ok(())
    }
}

/// Action sampler settings.
///
/// `noise_dim` defaults to `action_dim` when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionSamplerConfig {
    #[serde(default = "defaults::action_dim")]
    pub action_dim: usize,
    #[serde(default = "defaults::state_dim")]
    pub state_dim: usize,
    #[serde(default)]
    pub noise_dim: Option<usize>,
}

impl Default for ActionSamplerConfig {
    fn default() -> Self {
        ActionSamplerConfig {
            action_dim: defaults::action_dim(),
            state_dim: defaults::state_dim(),
            noise_dim: None,
        }
    }
}

impl ActionSamplerConfig {
    /// The noise width fed to the motion noise network.
    pub fn resolved_noise_dim(&self) -> usize {
        self.noise_dim.unwrap_or(self.action_dim)
    }

    pub fn validate(&self) -> Result<()> {
        if self.action_dim == 0 || self.state_dim == 0 || self.resolved_noise_dim() == 0 {
            return Err(DpfError::InvalidConfig("action, state and noise dimensions must be non zero"));
        }
        // The delta is added to the nominal action
        if self.action_dim != self.state_dim {
            return Err(DpfError::InvalidConfig("action_dim must equal state_dim"));
        }
        Ok(())
    }
}

/// Configuration of the complete [`DpfSe2`](crate::dpf::DpfSe2) model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DpfConfig {
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub likelihood: LikelihoodConfig,
    #[serde(default)]
    pub action_sampler: ActionSamplerConfig,
}

impl DpfConfig {
    pub fn new(height: usize, width: usize) -> Self {
        DpfConfig {
            encoder: EncoderConfig::new(height, width),
            likelihood: LikelihoodConfig::default(),
            action_sampler: ActionSamplerConfig::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DpfConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading DPF configuration from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.encoder.validate()?;
        self.likelihood.validate()?;
        self.action_sampler.validate()?;
        if self.likelihood.in_features != crate::networks::FEATURE_DIM {
            return Err(DpfError::InvalidConfig("likelihood in_features must equal the encoder feature width"));
        }
        Ok(())
    }
}
