//! Adaptive Computation Time (ACT) Cell Implementation
//!
//! Reference: Graves, "Adaptive Computation Time for Recurrent Neural Networks", 2016
//!
//! For every input timestep the wrapped cell is stepped repeatedly on the same
//! input. After each micro-step a halting unit emits a probability `p` per batch
//! element; an element stops accumulating once its running sum would reach
//! `1 - epsilon`, or once it has used `max_computation` micro-steps. The
//! timestep's output and state are the weighted sum of every micro-step's
//! output and state:
//!
//! ```text
//! normal step:     weight = p              (element still active)
//!                  weight = 0              (element already halted)
//! final step:      weight = 1 - Σ(weights applied so far)
//! ```
//!
//! so the weights of every element sum to one. The loop keeps running while
//! *any* element is active; halted elements are masked out rather than removed,
//! which keeps every tensor the same shape for the whole batch.

use burn::config::Config;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::{Bool, ElementConversion, Tensor};

use super::RecurrentCell;
use crate::error::{ActError, ActResult};
use crate::halting::{HaltingUnit, HaltingUnitConfig};
use crate::ponder::PonderTracker;
use crate::state::{scale_rows, CellState, StateLayout};

/// Configuration for [`ACTCell`]
#[derive(Config, Debug)]
pub struct ACTCellConfig {
    /// Hidden size H of the wrapped cell
    pub hidden_size: usize,
    /// Number of sequences processed together
    pub batch_size: usize,
    /// Halting threshold is `1 - epsilon`; must lie in (0, 1)
    #[config(default = 0.01)]
    pub epsilon: f64,
    /// Maximum micro-steps per timestep (N); must be at least 1
    #[config(default = 100)]
    pub max_computation: usize,
    /// Whether the wrapped cell carries an LSTM (cell, hidden) state pair
    #[config(default = false)]
    pub use_lstm: bool,
    /// Use an MLP instead of a single affine map for the halting probability
    #[config(default = false)]
    pub use_mlp_halting: bool,
    /// Depth of the halting MLP, counting the output layer
    #[config(default = 2)]
    pub num_perceptron_layers: usize,
}

impl ACTCellConfig {
    /// State layout implied by `use_lstm`
    pub fn state_layout(&self) -> StateLayout {
        if self.use_lstm {
            StateLayout::LstmPair
        } else {
            StateLayout::Plain
        }
    }

    /// Reject parameters for which the halting loop is not well defined
    pub fn validate(&self) -> ActResult<()> {
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(ActError::invalid_config(format!(
                "epsilon must lie in (0, 1), got {}",
                self.epsilon
            )));
        }
        if self.max_computation == 0 {
            return Err(ActError::invalid_config(
                "max_computation must be at least 1",
            ));
        }
        if self.hidden_size == 0 {
            return Err(ActError::invalid_config("hidden_size must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(ActError::invalid_config("batch_size must be at least 1"));
        }
        if self.use_mlp_halting && self.num_perceptron_layers == 0 {
            return Err(ActError::invalid_config(
                "num_perceptron_layers must be at least 1 when use_mlp_halting is set",
            ));
        }
        Ok(())
    }

    /// Wrap `cell` in an ACT cell.
    ///
    /// Fails if the configuration is invalid or does not describe `cell`
    /// (hidden size or state layout differ).
    pub fn init<B: Backend, C: RecurrentCell<B>>(
        &self,
        cell: C,
        device: &B::Device,
    ) -> ActResult<ACTCell<B, C>> {
        self.validate()?;

        if cell.hidden_size() != self.hidden_size {
            return Err(ActError::invalid_config(format!(
                "hidden_size is {} but the wrapped cell has {}",
                self.hidden_size,
                cell.hidden_size()
            )));
        }
        if cell.state_layout() != self.state_layout() {
            return Err(ActError::invalid_config(format!(
                "use_lstm = {} but the wrapped cell uses a {:?} state",
                self.use_lstm,
                cell.state_layout()
            )));
        }

        let num_hidden_layers = if self.use_mlp_halting {
            self.num_perceptron_layers - 1
        } else {
            0
        };
        let halting = HaltingUnitConfig::new(self.hidden_size)
            .with_num_hidden_layers(num_hidden_layers)
            .init(device);

        tracing::debug!(
            hidden_size = self.hidden_size,
            batch_size = self.batch_size,
            epsilon = self.epsilon,
            max_computation = self.max_computation,
            use_lstm = self.use_lstm,
            halting_layers = num_hidden_layers + 1,
            "ACT cell initialized"
        );

        Ok(ACTCell {
            cell,
            halting,
            hidden_size: self.hidden_size,
            batch_size: self.batch_size,
            epsilon: self.epsilon,
            max_computation: self.max_computation,
            use_lstm: self.use_lstm,
        })
    }
}

/// Adaptive Computation Time wrapper around a [`RecurrentCell`]
///
/// # Type Parameters
/// * `B` - The backend type
/// * `C` - The wrapped cell
#[derive(Module, Debug)]
pub struct ACTCell<B: Backend, C> {
    cell: C,
    halting: HaltingUnit<B>,
    #[module(skip)]
    hidden_size: usize,
    #[module(skip)]
    batch_size: usize,
    #[module(skip)]
    epsilon: f64,
    #[module(skip)]
    max_computation: usize,
    #[module(skip)]
    use_lstm: bool,
}

/// Everything one ACT timestep produces
#[derive(Debug, Clone)]
pub struct ACTCellOutput<B: Backend> {
    /// Weighted output, `[batch, output_size]`
    pub output: Tensor<B, 2>,
    /// Weighted state
    pub state: CellState<B>,
    /// Halting mass applied before the final (remainder) micro-step, `[batch]`
    pub prob: Tensor<B, 1>,
    /// Micro-steps counted while each element was active, `[batch]`
    pub iterations: Tensor<B, 1>,
    /// Micro-steps executed for the batch as a whole
    pub micro_steps: usize,
}

impl<B: Backend> ACTCellOutput<B> {
    /// Weight given to the final micro-step, `1 - prob`
    pub fn remainder(&self) -> Tensor<B, 1> {
        self.prob.clone().neg().add_scalar(1.0)
    }
}

/// Loop-carried state of one timestep's micro-step loop
#[derive(Debug, Clone)]
struct PonderState<B: Backend> {
    batch_mask: Tensor<B, 1, Bool>,
    prob_compare: Tensor<B, 1>,
    prob: Tensor<B, 1>,
    counter: Tensor<B, 1>,
    state: CellState<B>,
    acc_output: Tensor<B, 2>,
    acc_state: CellState<B>,
    halted_prob: Tensor<B, 1>,
    micro_steps: usize,
}

impl<B: Backend> PonderState<B> {
    fn new(state: CellState<B>, batch_size: usize, output_size: usize, device: &B::Device) -> Self {
        let zeros = Tensor::<B, 1>::zeros([batch_size], device);
        Self {
            batch_mask: zeros.clone().equal_elem(0.0),
            prob_compare: zeros.clone(),
            prob: zeros.clone(),
            counter: zeros.clone(),
            acc_output: Tensor::zeros([batch_size, output_size], device),
            acc_state: state.zeros_like(),
            state,
            halted_prob: zeros,
            micro_steps: 0,
        }
    }
}

impl<B: Backend, C: RecurrentCell<B>> ACTCell<B, C> {
    pub fn input_size(&self) -> usize {
        self.cell.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn output_size(&self) -> usize {
        self.cell.output_size()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn max_computation(&self) -> usize {
        self.max_computation
    }

    pub fn use_lstm(&self) -> bool {
        self.use_lstm
    }

    pub fn state_layout(&self) -> StateLayout {
        if self.use_lstm {
            StateLayout::LstmPair
        } else {
            StateLayout::Plain
        }
    }

    /// The wrapped cell
    pub fn cell(&self) -> &C {
        &self.cell
    }

    /// The halting-probability estimator
    pub fn halting(&self) -> &HaltingUnit<B> {
        &self.halting
    }

    /// Replace the halting estimator
    pub fn with_halting(mut self, halting: HaltingUnit<B>) -> ActResult<Self> {
        if halting.input_size() != self.hidden_size {
            return Err(ActError::shape_mismatch(
                format!("halting unit with input_size {}", self.hidden_size),
                format!("input_size {}", halting.input_size()),
            ));
        }
        self.halting = halting;
        Ok(self)
    }

    /// Zero state with this cell's layout and batch size
    pub fn initial_state(&self, device: &B::Device) -> CellState<B> {
        CellState::zeros(self.state_layout(), self.batch_size, self.hidden_size, device)
    }

    /// Run one timestep and record its ponder statistics into `tracker`.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, input_size]`
    /// * `state` - Previous state, halves of shape `[batch_size, hidden_size]`
    /// * `tracker` - Caller-owned ponder statistics for the current sequence
    ///
    /// # Returns
    /// Tuple of (output, new_state)
    pub fn forward(
        &self,
        input: Tensor<B, 2>,
        state: CellState<B>,
        tracker: &mut PonderTracker<B>,
    ) -> ActResult<(Tensor<B, 2>, CellState<B>)> {
        let step = self.forward_detailed(input, state)?;
        tracker.record(step.prob, step.iterations);
        Ok((step.output, step.state))
    }

    /// Run one timestep and return the outputs together with its ponder
    /// statistics, without recording them anywhere.
    pub fn forward_detailed(
        &self,
        input: Tensor<B, 2>,
        state: CellState<B>,
    ) -> ActResult<ACTCellOutput<B>> {
        let expected = [self.batch_size, self.input_size()];
        if input.dims() != expected {
            return Err(ActError::shape_mismatch(
                format!("input {:?}", expected),
                format!("input {:?}", input.dims()),
            ));
        }
        state.validate(self.state_layout(), self.batch_size, self.hidden_size)?;

        let device = input.device();
        let mut ponder = PonderState::new(state, self.batch_size, self.output_size(), &device);

        // At least one micro-step always runs: with epsilon < 1 and N >= 1 the
        // continuation predicate holds before the first step.
        loop {
            ponder = self.micro_step(&input, ponder)?;
            tracing::trace!(micro_step = ponder.micro_steps, "ACT micro-step");
            if !self.should_continue(&ponder) {
                break;
            }
        }

        tracing::debug!(micro_steps = ponder.micro_steps, "ACT timestep complete");

        Ok(ACTCellOutput {
            output: ponder.acc_output,
            state: ponder.acc_state,
            prob: ponder.halted_prob,
            iterations: ponder.counter,
            micro_steps: ponder.micro_steps,
        })
    }

    fn one_minus_epsilon(&self) -> f64 {
        1.0 - self.epsilon
    }

    /// `ANY(prob_compare < 1 - epsilon AND counter < N)`
    fn should_continue(&self, ponder: &PonderState<B>) -> bool {
        let below_threshold = ponder
            .prob_compare
            .clone()
            .lower_elem(self.one_minus_epsilon());
        let has_budget = ponder
            .counter
            .clone()
            .lower_elem(self.max_computation as f64);
        any(below_threshold.bool_and(has_budget))
    }

    /// One transition of the micro-step state machine
    fn micro_step(&self, input: &Tensor<B, 2>, ponder: PonderState<B>) -> ActResult<PonderState<B>> {
        let PonderState {
            batch_mask,
            prob_compare,
            prob,
            counter,
            state,
            acc_output,
            acc_state,
            micro_steps,
            ..
        } = ponder;

        let (output, new_state) = self.cell.step(input.clone(), state)?;
        let p = self.halting.forward(new_state.halting_input());

        // An element stays active only if this step keeps it below the threshold
        let new_batch_mask = (prob.clone() + p.clone())
            .lower_elem(self.one_minus_epsilon())
            .bool_and(batch_mask.clone());
        let float_mask = new_batch_mask.clone().float();

        let prob_before = prob.clone();
        let prob = prob + p.clone() * float_mask.clone();
        let prob_compare = prob_compare + p.clone() * batch_mask.float();
        let counter = counter + float_mask.clone();

        let has_budget = counter.clone().lower_elem(self.max_computation as f64);
        let use_normal = any(new_batch_mask.clone().bool_and(has_budget));

        // Normal steps spend exactly the mass added to `prob_before`, so the
        // remainder is measured against it rather than against this step's `prob`.
        let (weight, halted_prob) = if use_normal {
            (p * float_mask, prob.clone())
        } else {
            (prob_before.clone().neg().add_scalar(1.0), prob_before)
        };

        let acc_output = acc_output + scale_rows(output, weight.clone());
        let acc_state = acc_state.weighted_add(&new_state, weight)?;

        Ok(PonderState {
            batch_mask: new_batch_mask,
            prob_compare,
            prob,
            counter,
            state: new_state,
            acc_output,
            acc_state,
            halted_prob,
            micro_steps: micro_steps + 1,
        })
    }
}

fn any<B: Backend>(mask: Tensor<B, 1, Bool>) -> bool {
    mask.float().sum().into_scalar().elem::<f32>() > 0.0
}
