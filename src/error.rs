//! Errors of the DPF networks.
//!
//! Failures are fatal to the single call that raised them.

use thiserror::Error;

/// Error raised by construction or forward evaluation of a network.
#[derive(Debug, Error)]
pub enum DpfError {
    /// Declared dimensions do not match the tensor handed to a forward call.
    #[error("shape mismatch in {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A configuration that can never produce a valid forward pass.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error(transparent)]
    Tensor(#[from] candle_core::Error),

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("configuration read error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DpfError>;

/// Checks a tensor's dims equal `expected`.
pub fn check_dims(what: &'static str, actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(DpfError::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}
