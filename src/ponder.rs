//! Ponder-cost tracking.
//!
//! Every ACT timestep leaves two statistics behind: the unspent halting mass
//! (remainder) and the number of micro-steps taken (iterations), both averaged
//! over the batch. The tracker keeps them in order so a training loop can turn
//! a whole sequence into one regularisation term:
//!
//! ```text
//! cost = time_penalty * (mean(remainder_1..T) + mean(iterations_1..T))
//! ```
//!
//! The iteration term is a raw count and is not normalised by the step budget.

use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{ActError, ActResult};

/// Caller-owned history of per-timestep ponder statistics
#[derive(Debug, Clone)]
pub struct PonderTracker<B: Backend> {
    remainders: Vec<Tensor<B, 1>>,
    iterations: Vec<Tensor<B, 1>>,
}

/// Plain snapshot of a [`PonderTracker`], e.g. for training logs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PonderSummary {
    pub timesteps: usize,
    pub mean_remainder: f32,
    pub mean_iterations: f32,
}

impl<B: Backend> Default for PonderTracker<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> PonderTracker<B> {
    pub fn new() -> Self {
        Self {
            remainders: Vec::new(),
            iterations: Vec::new(),
        }
    }

    /// Record one timestep.
    ///
    /// # Arguments
    /// * `prob` - Halting mass spent before the remainder, shape `[batch]`
    /// * `iterations` - Micro-step counter per element, shape `[batch]`
    pub fn record(&mut self, prob: Tensor<B, 1>, iterations: Tensor<B, 1>) {
        self.remainders.push(prob.neg().add_scalar(1.0).mean());
        self.iterations.push(iterations.mean());
    }

    /// Number of recorded timesteps
    pub fn len(&self) -> usize {
        self.remainders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remainders.is_empty()
    }

    /// Forget everything recorded so far (start of a new sequence)
    pub fn reset(&mut self) {
        self.remainders.clear();
        self.iterations.clear();
    }

    /// Batch-mean remainder of each recorded timestep, each of shape `[1]`
    pub fn remainders(&self) -> &[Tensor<B, 1>] {
        &self.remainders
    }

    /// Batch-mean iteration count of each recorded timestep, each of shape `[1]`
    pub fn iterations(&self) -> &[Tensor<B, 1>] {
        &self.iterations
    }

    /// Total ponder cost as a differentiable one-element tensor.
    ///
    /// Fails with [`ActError::NoTimestepsRecorded`] if nothing was recorded.
    pub fn compute_ponder_cost(&self, time_penalty: f64) -> ActResult<Tensor<B, 1>> {
        let (remainder, iterations) = self.means()?;
        Ok((remainder + iterations).mul_scalar(time_penalty))
    }

    pub fn summary(&self) -> ActResult<PonderSummary> {
        let (remainder, iterations) = self.means()?;
        Ok(PonderSummary {
            timesteps: self.len(),
            mean_remainder: remainder.into_scalar().elem::<f32>(),
            mean_iterations: iterations.into_scalar().elem::<f32>(),
        })
    }

    fn means(&self) -> ActResult<(Tensor<B, 1>, Tensor<B, 1>)> {
        if self.is_empty() {
            return Err(ActError::NoTimestepsRecorded);
        }
        let remainder = Tensor::cat(self.remainders.clone(), 0).mean();
        let iterations = Tensor::cat(self.iterations.clone(), 0).mean();
        Ok((remainder, iterations))
    }
}
