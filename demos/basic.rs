//! Basic usage example of ACT-RNN
//!
//! Wraps a tanh RNN cell and an LSTM cell in Adaptive Computation Time and
//! prints how much "pondering" each timestep used.
//!
//! Run with `RUST_LOG=act_rnn=debug` to see per-timestep micro-step counts.

use act_rnn::prelude::*;
use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ActError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== ACT-RNN Basic Example ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    // Example 1: single timestep with a tanh RNN cell
    println!("Example 1: Single ACT timestep");
    let act = ACTCellConfig::new(32, 4)
        .with_epsilon(0.01)
        .with_max_computation(10)
        .init(RnnCell::<Backend>::new(16, 32, &device), &device)?;

    let input = Tensor::<Backend, 2>::random([4, 16], Distribution::Uniform(-1.0, 1.0), &device);
    let step = act.forward_detailed(input, act.initial_state(&device))?;

    println!("  Output shape:      {:?}", step.output.dims());
    println!("  Micro-steps taken: {}", step.micro_steps);
    println!("  Iterations:        {:?}", step.iterations.to_data());
    println!("  Remainders:        {:?}", step.remainder().to_data());
    println!();

    // Example 2: a sequence through an LSTM cell with an MLP halting unit
    println!("Example 2: LSTM sequence with MLP halting");
    let lstm_act = ACTCellConfig::new(24, 2)
        .with_use_lstm(true)
        .with_use_mlp_halting(true)
        .with_num_perceptron_layers(3)
        .with_max_computation(8)
        .init(LSTMCell::<Backend>::new(6, 24, &device), &device)?;
    let layer = ACT::new(lstm_act);

    let mut tracker = PonderTracker::new();
    let sequence = Tensor::<Backend, 3>::random([2, 12, 6], Distribution::Uniform(-1.0, 1.0), &device);
    let (outputs, state) = layer.forward(sequence, None, &mut tracker)?;

    println!("  Input shape:  [2, 12, 6]");
    println!("  Output shape: {:?}", outputs.dims());
    println!("  State layout: {:?}", state.layout());

    let summary = tracker.summary()?;
    println!("  Timesteps recorded: {}", summary.timesteps);
    println!("  Mean remainder:     {:.4}", summary.mean_remainder);
    println!("  Mean iterations:    {:.4}", summary.mean_iterations);

    // Example 3: the ponder cost a training loop would add to its loss
    println!();
    println!("Example 3: Ponder cost");
    for time_penalty in [0.001, 0.01, 0.1] {
        let cost = tracker.compute_ponder_cost(time_penalty)?;
        println!("  time_penalty = {:<6} -> cost = {:.5}", time_penalty, cost.into_scalar());
    }

    println!("\n=== Example completed! ===");
    Ok(())
}
