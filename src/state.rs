//! Recurrent state representation shared by base cells and the ACT wrapper.
//!
//! Plain cells carry a single `[batch, hidden]` tensor. LSTM-style cells carry
//! a cell-state half and a hidden-state half, which many frameworks store as one
//! `[batch, 2 * hidden]` tensor. Keeping the two apart as a tagged variant means
//! a layout mismatch is reported instead of silently slicing the wrong columns.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::error::{ActError, ActResult};

/// Shape family of a recurrent state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateLayout {
    /// Single hidden vector of width `hidden_size`
    #[default]
    Plain,
    /// (cell state, hidden state) pair, each of width `hidden_size`
    LstmPair,
}

impl StateLayout {
    /// Width of the concatenated state in units of `hidden_size`
    pub fn width_factor(&self) -> usize {
        match self {
            StateLayout::Plain => 1,
            StateLayout::LstmPair => 2,
        }
    }
}

/// Recurrent state for one timestep, batched along dimension 0
#[derive(Debug, Clone)]
pub enum CellState<B: Backend> {
    Plain(Tensor<B, 2>),
    LstmPair {
        cell: Tensor<B, 2>,
        hidden: Tensor<B, 2>,
    },
}

impl<B: Backend> CellState<B> {
    /// Zero state for the given layout
    pub fn zeros(
        layout: StateLayout,
        batch_size: usize,
        hidden_size: usize,
        device: &B::Device,
    ) -> Self {
        match layout {
            StateLayout::Plain => {
                CellState::Plain(Tensor::zeros([batch_size, hidden_size], device))
            }
            StateLayout::LstmPair => CellState::LstmPair {
                cell: Tensor::zeros([batch_size, hidden_size], device),
                hidden: Tensor::zeros([batch_size, hidden_size], device),
            },
        }
    }

    /// Split a `[batch, width]` tensor into a state of the requested layout.
    ///
    /// For [`StateLayout::LstmPair`] the first half of the columns is the cell
    /// state and the second half the hidden state. Odd widths are rejected.
    pub fn from_concat(tensor: Tensor<B, 2>, layout: StateLayout) -> ActResult<Self> {
        match layout {
            StateLayout::Plain => Ok(CellState::Plain(tensor)),
            StateLayout::LstmPair => {
                let [batch_size, width] = tensor.dims();
                if width % 2 != 0 {
                    return Err(ActError::shape_mismatch(
                        "even state width for an LSTM pair",
                        format!("[{}, {}]", batch_size, width),
                    ));
                }
                let half = width / 2;
                let cell = tensor.clone().narrow(1, 0, half);
                let hidden = tensor.narrow(1, half, half);
                Ok(CellState::LstmPair { cell, hidden })
            }
        }
    }

    /// Concatenate back into a single `[batch, width]` tensor (cell half first)
    pub fn into_concat(self) -> Tensor<B, 2> {
        match self {
            CellState::Plain(state) => state,
            CellState::LstmPair { cell, hidden } => Tensor::cat(vec![cell, hidden], 1),
        }
    }

    pub fn layout(&self) -> StateLayout {
        match self {
            CellState::Plain(_) => StateLayout::Plain,
            CellState::LstmPair { .. } => StateLayout::LstmPair,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.primary().dims()[0]
    }

    /// Width of one half (or of the whole state for plain layouts)
    pub fn hidden_size(&self) -> usize {
        self.primary().dims()[1]
    }

    /// Input for the halting estimator: the whole plain state, or the cell
    /// half of an LSTM pair.
    pub fn halting_input(&self) -> Tensor<B, 2> {
        self.primary().clone()
    }

    /// Zeros with the same layout and shape
    pub fn zeros_like(&self) -> Self {
        match self {
            CellState::Plain(state) => CellState::Plain(Tensor::zeros_like(state)),
            CellState::LstmPair { cell, hidden } => CellState::LstmPair {
                cell: Tensor::zeros_like(cell),
                hidden: Tensor::zeros_like(hidden),
            },
        }
    }

    /// Fail with [`ActError::StateLayoutMismatch`] unless the layout matches
    pub fn expect_layout(&self, expected: StateLayout) -> ActResult<()> {
        let got = self.layout();
        if got != expected {
            return Err(ActError::StateLayoutMismatch { expected, got });
        }
        Ok(())
    }

    /// Check layout and the `[batch, hidden]` shape of every half
    pub fn validate(
        &self,
        layout: StateLayout,
        batch_size: usize,
        hidden_size: usize,
    ) -> ActResult<()> {
        self.expect_layout(layout)?;
        let expected = [batch_size, hidden_size];
        let halves: Vec<&Tensor<B, 2>> = match self {
            CellState::Plain(state) => vec![state],
            CellState::LstmPair { cell, hidden } => vec![cell, hidden],
        };
        for half in halves {
            let got = half.dims();
            if got != expected {
                return Err(ActError::shape_mismatch(
                    format!("{:?}", expected),
                    format!("{:?}", got),
                ));
            }
        }
        Ok(())
    }

    /// `self + other * weight`, with `weight` of shape `[batch]` broadcast
    /// across the feature dimension of every half.
    pub fn weighted_add(self, other: &Self, weight: Tensor<B, 1>) -> ActResult<Self> {
        match (self, other) {
            (CellState::Plain(acc), CellState::Plain(value)) => Ok(CellState::Plain(
                acc + scale_rows(value.clone(), weight),
            )),
            (
                CellState::LstmPair { cell, hidden },
                CellState::LstmPair {
                    cell: value_cell,
                    hidden: value_hidden,
                },
            ) => Ok(CellState::LstmPair {
                cell: cell + scale_rows(value_cell.clone(), weight.clone()),
                hidden: hidden + scale_rows(value_hidden.clone(), weight),
            }),
            (acc, value) => Err(ActError::StateLayoutMismatch {
                expected: acc.layout(),
                got: value.layout(),
            }),
        }
    }

    fn primary(&self) -> &Tensor<B, 2> {
        match self {
            CellState::Plain(state) => state,
            CellState::LstmPair { cell, .. } => cell,
        }
    }
}

/// Multiply each row of `value` by the matching entry of `weight`
pub(crate) fn scale_rows<B: Backend>(value: Tensor<B, 2>, weight: Tensor<B, 1>) -> Tensor<B, 2> {
    value * weight.unsqueeze_dim::<2>(1)
}
