use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::RecurrentCell;
use crate::error::{ActError, ActResult};
use crate::state::{CellState, StateLayout};

/// Standard LSTM cell
///
/// Implements the standard LSTM equations:
/// - j = tanh(W_xj @ x + b_j + W_hj @ h)
/// - i = sigmoid(W_xi @ x + b_i + W_hi @ h)
/// - f = sigmoid(W_xf @ x + b_f + W_hf @ h + 1)
/// - o = sigmoid(W_xo @ x + b_o + W_ho @ h)
/// - c' = f * c + i * j
/// - h' = o * tanh(c')
///
/// State is a [`CellState::LstmPair`] of (c, h); the output is h'.
#[derive(Module, Debug)]
pub struct LSTMCell<B: Backend> {
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    input_map: Linear<B>,     // Maps input to 4 * hidden_size (with bias)
    recurrent_map: Linear<B>, // Maps hidden state to 4 * hidden_size (no bias)
}

impl<B: Backend> LSTMCell<B> {
    /// Create a new LSTM cell
    ///
    /// # Arguments
    /// * `input_size` - Size of the input features
    /// * `hidden_size` - Size of each state half
    /// * `device` - Device to create the module on
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let input_map = LinearConfig::new(input_size, 4 * hidden_size)
            .with_bias(true)
            .init(device);

        let recurrent_map = LinearConfig::new(hidden_size, 4 * hidden_size)
            .with_bias(false)
            .init(device);

        Self {
            input_size,
            hidden_size,
            input_map,
            recurrent_map,
        }
    }

    /// Forward pass on raw tensors
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, input_size]`
    /// * `cell_state` - Cell state of shape `[batch_size, hidden_size]`
    /// * `hidden_state` - Hidden state of shape `[batch_size, hidden_size]`
    ///
    /// # Returns
    /// Tuple of (new_cell_state, new_hidden_state)
    pub fn forward(
        &self,
        input: Tensor<B, 2>,
        cell_state: Tensor<B, 2>,
        hidden_state: Tensor<B, 2>,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let z = self.input_map.forward(input) + self.recurrent_map.forward(hidden_state);

        let gates = z.chunk(4, 1);
        let candidate = gates[0].clone().tanh();
        let input_gate = activation::sigmoid(gates[1].clone());
        let forget_gate = activation::sigmoid(gates[2].clone() + 1.0);
        let output_gate = activation::sigmoid(gates[3].clone());

        let new_cell = cell_state * forget_gate + candidate * input_gate;
        let new_hidden = new_cell.clone().tanh() * output_gate;

        (new_cell, new_hidden)
    }
}

impl<B: Backend> RecurrentCell<B> for LSTMCell<B> {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn state_layout(&self) -> StateLayout {
        StateLayout::LstmPair
    }

    fn step(
        &self,
        input: Tensor<B, 2>,
        state: CellState<B>,
    ) -> ActResult<(Tensor<B, 2>, CellState<B>)> {
        let (cell, hidden) = match state {
            CellState::LstmPair { cell, hidden } => (cell, hidden),
            other => {
                return Err(ActError::StateLayoutMismatch {
                    expected: StateLayout::LstmPair,
                    got: other.layout(),
                })
            }
        };

        let (new_cell, new_hidden) = self.forward(input, cell, hidden);
        Ok((
            new_hidden.clone(),
            CellState::LstmPair {
                cell: new_cell,
                hidden: new_hidden,
            },
        ))
    }
}
