//! The learned models of the particle filter.

pub mod action_sampler;
pub mod encoder;
pub mod likelihood;

pub use action_sampler::ActionSampler;
pub use encoder::ObservationEncoder;
pub use likelihood::ObservationLikelihoodEstimator;

/// Width of the encoded observation.
pub const FEATURE_DIM: usize = 128;
