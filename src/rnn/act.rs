//! Adaptive Computation Time (ACT) RNN Layer
//!
//! Full RNN layer that unrolls an [`ACTCell`] over a sequence, threading the
//! recurrent state and recording ponder statistics for every timestep.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::{ACTCell, RecurrentCell};
use crate::error::{ActError, ActResult};
use crate::ponder::PonderTracker;
use crate::state::CellState;

/// ACT RNN Layer
///
/// # Type Parameters
/// * `B` - The backend type
/// * `C` - The cell wrapped by the ACT cell
#[derive(Module, Debug)]
pub struct ACT<B: Backend, C> {
    /// The ACT cell for processing individual timesteps
    cell: ACTCell<B, C>,
    /// Whether input is batch-first
    #[module(skip)]
    batch_first: bool,
    /// Whether to return full sequence or just last timestep
    #[module(skip)]
    return_sequences: bool,
}

impl<B: Backend, C: RecurrentCell<B>> ACT<B, C> {
    /// Create a new ACT RNN layer around an initialized ACT cell
    pub fn new(cell: ACTCell<B, C>) -> Self {
        Self {
            cell,
            batch_first: true,
            return_sequences: true,
        }
    }

    /// Set whether input is batch-first (default: true)
    pub fn with_batch_first(mut self, batch_first: bool) -> Self {
        self.batch_first = batch_first;
        self
    }

    /// Set whether to return full sequences (default: true)
    pub fn with_return_sequences(mut self, return_sequences: bool) -> Self {
        self.return_sequences = return_sequences;
        self
    }

    pub fn cell(&self) -> &ACTCell<B, C> {
        &self.cell
    }

    pub fn input_size(&self) -> usize {
        self.cell.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.cell.hidden_size()
    }

    pub fn output_size(&self) -> usize {
        self.cell.output_size()
    }

    /// Forward pass through the ACT RNN layer
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape:
    ///   - 3D: [batch, seq, features] if batch_first=true
    ///   - 3D: [seq, batch, features] if batch_first=false
    /// * `state` - Optional initial state (zeros if None)
    /// * `tracker` - Receives one ponder entry per timestep
    ///
    /// # Returns
    /// Tuple of (output, final_state) where output is
    /// [batch, seq, output_size], or [batch, 1, output_size] when
    /// return_sequences=false
    pub fn forward(
        &self,
        input: Tensor<B, 3>,
        state: Option<CellState<B>>,
        tracker: &mut PonderTracker<B>,
    ) -> ActResult<(Tensor<B, 3>, CellState<B>)> {
        let device = input.device();
        let dims = input.dims();
        let (batch_size, seq_len) = if self.batch_first {
            (dims[0], dims[1])
        } else {
            (dims[1], dims[0])
        };

        if seq_len == 0 {
            return Err(ActError::shape_mismatch(
                "a sequence of at least one timestep",
                format!("{:?}", dims),
            ));
        }

        tracing::debug!(batch_size, seq_len, "ACT sequence forward");

        let mut current_state = state.unwrap_or_else(|| self.cell.initial_state(&device));
        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(seq_len);

        for t in 0..seq_len {
            let step_input = if self.batch_first {
                // input[batch, t, features] -> [batch, features]
                input.clone().narrow(1, t, 1).squeeze_dim(1)
            } else {
                // input[t, batch, features] -> [batch, features]
                input.clone().narrow(0, t, 1).squeeze_dim(0)
            };

            let (output, new_state) = self.cell.forward(step_input, current_state, tracker)?;
            current_state = new_state;

            if self.return_sequences || t == seq_len - 1 {
                outputs.push(output);
            }
        }

        let output = Tensor::stack(outputs, 1); // [batch, seq, output_size]
        Ok((output, current_state))
    }
}
