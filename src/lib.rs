//! # ACT-RNN - Adaptive Computation Time for recurrent cells (Rust)
//!
//! Graves' Adaptive Computation Time on top of the Burn framework.
//!
//! ## Features
//!
//! - **ACTCell**: wraps any [`RecurrentCell`](cells::RecurrentCell) and runs it a
//!   learned, per-element number of micro-steps (1..=N) for every input timestep
//! - **Halting unit**: affine or MLP estimator of the per-step halting probability
//! - **Ponder cost**: caller-owned [`PonderTracker`](ponder::PonderTracker) that
//!   turns a sequence's remainders and step counts into a regularisation term
//! - **Base cells**: tanh [`RnnCell`](cells::RnnCell) and [`LSTMCell`](cells::LSTMCell)
//! - **Sequence layer**: [`ACT`](rnn::ACT) unrolls an ACT cell over `[batch, seq, features]`
//!
//! ## Quick Start
//!
//! ```rust
//! use act_rnn::prelude::*;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let act = ACTCellConfig::new(8, 2)
//!     .with_epsilon(0.01)
//!     .with_max_computation(5)
//!     .init(RnnCell::<Backend>::new(4, 8, &device), &device)
//!     .unwrap();
//!
//! let mut tracker = PonderTracker::new();
//! let input = Tensor::<Backend, 2>::ones([2, 4], &device);
//! let state = act.initial_state(&device);
//!
//! let (output, _state) = act.forward(input, state, &mut tracker).unwrap();
//! assert_eq!(output.dims(), [2, 8]);
//!
//! let cost = tracker.compute_ponder_cost(0.01).unwrap();
//! assert_eq!(cost.dims(), [1]);
//! ```

pub mod cells;
pub mod error;
pub mod halting;
pub mod ponder;
pub mod rnn;
pub mod state;

pub mod prelude {
    pub use crate::cells::{ACTCell, ACTCellConfig, ACTCellOutput, LSTMCell, RecurrentCell, RnnCell};
    pub use crate::error::{ActError, ActResult};
    pub use crate::halting::{HaltingUnit, HaltingUnitConfig};
    pub use crate::ponder::{PonderSummary, PonderTracker};
    pub use crate::rnn::ACT;
    pub use crate::state::{CellState, StateLayout};
}
