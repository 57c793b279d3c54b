//! DPF network models.
//!
//! Evaluation modes and gradient tracking are modelled as enums.
//! Common operations over the weight-bearing layers of a network are defined as traits.

use candle_core::Var;

/// Execution mode of a forward pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Stochastic layers (dropout) are active.
    Training,
    /// Deterministic evaluation.
    Evaluation,
}

/// Gradient bookkeeping of a sub-computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gradient {
    /// Operations are recorded for backpropagation.
    Tracked,
    /// Inputs and parameters are detached, nothing is recorded.
    Detached,
}

/// A layer owning a weight and a bias.
pub trait WeightLayer {
    fn name(&self) -> &'static str;

    /// Fan-in and fan-out of the layer's weight.
    fn fans(&self) -> (usize, usize);

    fn weight(&self) -> &Var;

    fn bias(&self) -> &Var;
}

/// A network made of weight-bearing layers.
///
/// The layers are reported explicitly, in forward order.
pub trait Parameterized {
    fn weight_layers(&self) -> Vec<&dyn WeightLayer>;

    /// Every trainable variable, weight then bias, layer by layer.
    fn vars(&self) -> Vec<Var> {
        self.weight_layers()
            .into_iter()
            .flat_map(|layer| vec![layer.weight().clone(), layer.bias().clone()])
            .collect()
    }

    /// Number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.weight_layers()
            .iter()
            .map(|layer| layer.weight().elem_count() + layer.bias().elem_count())
            .sum()
    }
}
