//! # RNN Layers for Sequence Processing
//!
//! [`ACT`] unrolls an [`ACTCell`](crate::cells::ACTCell) over a whole sequence.
//!
//! ## Quick Start
//!
//! ```ignore
//! use act_rnn::prelude::*;
//!
//! let cell = ACTCellConfig::new(32, 4)
//!     .with_max_computation(10)
//!     .init(RnnCell::<Backend>::new(16, 32, &device), &device)?;
//! let layer = ACT::new(cell);
//!
//! // Process sequence: [batch=4, seq_len=10, features=16]
//! let mut tracker = PonderTracker::new();
//! let (output, final_state) = layer.forward(input, None, &mut tracker)?;
//!
//! // output: [4, 10, 32]
//! // tracker: 10 entries, one per timestep
//! let loss = task_loss + tracker.compute_ponder_cost(0.001)?;
//! ```
//!
//! ## Tensor Shapes
//!
//! | Format | Shape | Default |
//! |--------|-------|---------|
//! | Batch-first | `[batch, seq_len, features]` | ✓ Yes |
//! | Sequence-first | `[seq_len, batch, features]` | No |
//!
//! Output is always batch-first: `[batch, seq_len, output_size]`, or
//! `[batch, 1, output_size]` with `.with_return_sequences(false)`.
//!
//! ## Stateful Processing
//!
//! ```ignore
//! let (out1, state) = layer.forward(batch1, None, &mut tracker)?;
//! let (out2, state) = layer.forward(batch2, Some(state), &mut tracker)?;
//! ```
//!
//! The tracker is owned by the caller: call
//! [`PonderTracker::reset`](crate::ponder::PonderTracker::reset) between
//! independent sequences.

pub mod act;

pub use act::ACT;
