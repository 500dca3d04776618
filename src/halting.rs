//! Halting-probability estimator.
//!
//! Maps a hidden state `[batch, hidden]` to one halting probability per batch
//! element:
//!
//! ```text
//! x_{k+1} = relu(W_k · x_k + b_k)       (num_hidden_layers times, width = hidden)
//! p       = sigmoid(w_out · x + b_out)  (b_out starts at 1.0)
//! ```
//!
//! Starting the output bias at 1.0 centres the initial probabilities around
//! sigmoid(1) ~ 0.73.

use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Configuration for [`HaltingUnit`]
#[derive(Config, Debug)]
pub struct HaltingUnitConfig {
    /// Width of the hidden state fed to the estimator
    pub input_size: usize,
    /// Number of ReLU layers before the sigmoid output (0 = single affine map)
    #[config(default = 0)]
    pub num_hidden_layers: usize,
    /// Initial value of the output bias
    #[config(default = 1.0)]
    pub initial_bias: f64,
}

impl HaltingUnitConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> HaltingUnit<B> {
        let hidden = (0..self.num_hidden_layers)
            .map(|_| {
                LinearConfig::new(self.input_size, self.input_size)
                    .with_bias(true)
                    .init(device)
            })
            .collect();

        let mut output = LinearConfig::new(self.input_size, 1)
            .with_bias(true)
            .init(device);
        output.bias = Some(Param::from_tensor(Tensor::full(
            [1],
            self.initial_bias,
            device,
        )));

        HaltingUnit {
            hidden,
            output,
            input_size: self.input_size,
        }
    }
}

/// Learned halting-probability estimator
#[derive(Module, Debug)]
pub struct HaltingUnit<B: Backend> {
    /// ReLU layers applied before the output projection
    pub hidden: Vec<Linear<B>>,
    /// Projection to a single logit
    pub output: Linear<B>,
    #[module(skip)]
    input_size: usize,
}

impl<B: Backend> HaltingUnit<B> {
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn num_hidden_layers(&self) -> usize {
        self.hidden.len()
    }

    /// Halting probability for each batch element.
    ///
    /// # Arguments
    /// * `hidden_state` - Tensor of shape `[batch, input_size]`
    ///
    /// # Returns
    /// Tensor of shape `[batch]` with values in (0, 1)
    pub fn forward(&self, hidden_state: Tensor<B, 2>) -> Tensor<B, 1> {
        let x = self
            .hidden
            .iter()
            .fold(hidden_state, |x, layer| activation::relu(layer.forward(x)));

        activation::sigmoid(self.output.forward(x)).squeeze_dim(1)
    }

    /// Pin the output to a constant probability `sigmoid(logit)` by zeroing the
    /// output weights. Useful for controlled experiments on halting behaviour.
    pub fn with_constant_logit(mut self, logit: f64) -> Self {
        let device = self.output.weight.device();
        let weight_dims = self.output.weight.dims();
        self.output.weight = Param::from_tensor(Tensor::zeros(weight_dims, &device));
        self.output.bias = Some(Param::from_tensor(Tensor::full([1], logit, &device)));
        self
    }
}
