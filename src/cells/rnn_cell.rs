use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::RecurrentCell;
use crate::error::ActResult;
use crate::state::{CellState, StateLayout};

/// Basic tanh recurrent cell
///
/// - h' = tanh(W @ [x, h] + b)
///
/// The output is the new hidden state.
#[derive(Module, Debug)]
pub struct RnnCell<B: Backend> {
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    /// Maps [input, hidden] to hidden_size (with bias)
    pub linear: Linear<B>,
}

impl<B: Backend> RnnCell<B> {
    /// Create a new tanh RNN cell
    ///
    /// # Arguments
    /// * `input_size` - Size of the input features
    /// * `hidden_size` - Size of the hidden state
    /// * `device` - Device to create the module on
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let linear = LinearConfig::new(input_size + hidden_size, hidden_size)
            .with_bias(true)
            .init(device);

        Self {
            input_size,
            hidden_size,
            linear,
        }
    }

    /// Forward pass on raw tensors
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, input_size]`
    /// * `hx` - Hidden state of shape `[batch_size, hidden_size]`
    ///
    /// # Returns
    /// New hidden state of shape `[batch_size, hidden_size]`
    pub fn forward(&self, input: Tensor<B, 2>, hx: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = Tensor::cat(vec![input, hx], 1);
        self.linear.forward(x).tanh()
    }
}

impl<B: Backend> RecurrentCell<B> for RnnCell<B> {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn state_layout(&self) -> StateLayout {
        StateLayout::Plain
    }

    fn step(
        &self,
        input: Tensor<B, 2>,
        state: CellState<B>,
    ) -> ActResult<(Tensor<B, 2>, CellState<B>)> {
        state.expect_layout(StateLayout::Plain)?;
        let new_hidden = self.forward(input, state.into_concat());
        Ok((new_hidden.clone(), CellState::Plain(new_hidden)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActError;
    use burn::backend::NdArray;
    use burn::tensor::backend::Backend as BurnBackend;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;
    type TestDevice = <TestBackend as BurnBackend>::Device;

    fn get_test_device() -> TestDevice {
        Default::default()
    }

    #[test]
    fn test_rnn_cell_creation() {
        let device = get_test_device();
        let cell = RnnCell::<TestBackend>::new(6, 12, &device);

        assert_eq!(cell.input_size(), 6);
        assert_eq!(cell.hidden_size(), 12);
        assert_eq!(cell.output_size(), 12);
        assert_eq!(cell.state_layout(), StateLayout::Plain);
    }

    #[test]
    fn test_rnn_step_output_is_state() {
        let device = get_test_device();
        let cell = RnnCell::<TestBackend>::new(6, 12, &device);

        let input = Tensor::<TestBackend, 2>::random([3, 6], Distribution::Uniform(-1.0, 1.0), &device);
        let state = CellState::zeros(StateLayout::Plain, 3, 12, &device);

        let (output, new_state) = cell.step(input, state).unwrap();
        assert_eq!(output.dims(), [3, 12]);

        let diff = (output - new_state.into_concat()).abs().sum().into_scalar();
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_rnn_rejects_lstm_state() {
        let device = get_test_device();
        let cell = RnnCell::<TestBackend>::new(6, 12, &device);

        let input = Tensor::<TestBackend, 2>::zeros([3, 6], &device);
        let state = CellState::zeros(StateLayout::LstmPair, 3, 12, &device);

        let result = cell.step(input, state);
        assert!(matches!(result, Err(ActError::StateLayoutMismatch { .. })));
    }
}
