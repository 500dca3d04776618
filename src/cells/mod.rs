//! # Recurrent Cells
//!
//! Single-timestep cells. Base cells implement [`RecurrentCell`] and can be
//! wrapped by [`ACTCell`], which runs them a variable number of times per input
//! timestep. The higher-level [`ACT`](crate::rnn::ACT) layer in [`crate::rnn`]
//! unrolls an ACT cell over a whole sequence.
//!
//! ## Cell Types
//!
//! | Cell | State layout | Description |
//! |------|--------------|-------------|
//! | [`RnnCell`] | [`StateLayout::Plain`] | `h' = tanh(W·[x, h] + b)` |
//! | [`LSTMCell`] | [`StateLayout::LstmPair`] | Standard LSTM, forget bias +1 |
//! | [`ACTCell`] | same as wrapped cell | Adaptive Computation Time wrapper |
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape | Description |
//! |--------|-------|-------------|
//! | `input` | `[batch, input_size]` | Input features |
//! | `state` | [`CellState`] with halves of `[batch, hidden_size]` | Previous state |
//! | `output` | `[batch, output_size]` | Cell output |
//!
//! ## Example: Wrapping a Cell with ACT
//!
//! ```ignore
//! use act_rnn::prelude::*;
//!
//! let device = Default::default();
//! let base = RnnCell::<Backend>::new(16, 32, &device);
//! let act = ACTCellConfig::new(32, 4)
//!     .with_epsilon(0.01)
//!     .with_max_computation(10)
//!     .init(base, &device)?;
//!
//! let mut tracker = PonderTracker::new();
//! let state = CellState::zeros(StateLayout::Plain, 4, 32, &device);
//! let (output, state) = act.forward(input, state, &mut tracker)?;
//! let cost = tracker.compute_ponder_cost(0.01)?;
//! ```

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::ActResult;
use crate::state::{CellState, StateLayout};

pub mod act_cell;
pub mod lstm_cell;
pub mod rnn_cell;

pub use act_cell::{ACTCell, ACTCellConfig, ACTCellOutput};
pub use lstm_cell::LSTMCell;
pub use rnn_cell::RnnCell;

/// A recurrent cell that advances one step: `(input, state) -> (output, new_state)`.
///
/// Implementations must be deterministic and shape-stable: the same input and
/// state shapes always produce the same output and state shapes.
pub trait RecurrentCell<B: Backend>: Module<B> {
    /// Number of input features
    fn input_size(&self) -> usize;

    /// Width of the state (of each half for [`StateLayout::LstmPair`])
    fn hidden_size(&self) -> usize;

    /// Width of the emitted output
    fn output_size(&self) -> usize {
        self.hidden_size()
    }

    /// Which [`CellState`] variant this cell consumes and produces
    fn state_layout(&self) -> StateLayout;

    /// Advance one step.
    ///
    /// Fails if `state` does not have this cell's layout.
    fn step(&self, input: Tensor<B, 2>, state: CellState<B>)
        -> ActResult<(Tensor<B, 2>, CellState<B>)>;
}
