//! Integration tests for ponder-cost tracking across a sequence

use act_rnn::prelude::*;
use burn::backend::{Autodiff, NdArray};
use burn::tensor::{Distribution, Tensor};

type Backend = NdArray<f32>;
type TrainBackend = Autodiff<NdArray<f32>>;

fn half_probability_layer() -> ACT<Backend, RnnCell<Backend>> {
    let device = Default::default();
    let cell = ACTCellConfig::new(4, 2)
        .with_epsilon(0.01)
        .with_max_computation(3)
        .init(RnnCell::<Backend>::new(3, 4, &device), &device)
        .unwrap();
    let halting = cell.halting().clone().with_constant_logit(0.0);
    ACT::new(cell.with_halting(halting).unwrap())
}

#[test]
fn test_ponder_cost_over_sequence() {
    let device = Default::default();
    let layer = half_probability_layer();
    let mut tracker = PonderTracker::new();

    let input = Tensor::<Backend, 3>::random([2, 7, 3], Distribution::Uniform(-1.0, 1.0), &device);
    layer.forward(input, None, &mut tracker).unwrap();

    // Every timestep: remainder 0.5, one counted iteration
    assert_eq!(tracker.len(), 7);
    let cost = tracker.compute_ponder_cost(0.01).unwrap().into_scalar();
    assert!((cost - 0.015).abs() < 1e-6, "cost = {}", cost);
}

#[test]
fn test_ponder_cost_scales_linearly_with_penalty() {
    let device = Default::default();
    let cell = ACTCellConfig::new(8, 3)
        .with_max_computation(6)
        .init(RnnCell::<Backend>::new(3, 8, &device), &device)
        .unwrap();
    let layer = ACT::new(cell);
    let mut tracker = PonderTracker::new();

    let input = Tensor::<Backend, 3>::random([3, 5, 3], Distribution::Uniform(-1.0, 1.0), &device);
    layer.forward(input, None, &mut tracker).unwrap();

    let base = tracker.compute_ponder_cost(1.0).unwrap().into_scalar();
    for penalty in [0.0, 0.001, 0.5, 3.0] {
        let cost = tracker.compute_ponder_cost(penalty).unwrap().into_scalar();
        assert!(
            (cost - base * penalty as f32).abs() < 1e-5,
            "penalty {} gave {} (base {})",
            penalty,
            cost,
            base
        );
    }

    // Cost = mean(remainder) + mean(iterations) at unit penalty
    let summary = tracker.summary().unwrap();
    assert!((base - (summary.mean_remainder + summary.mean_iterations)).abs() < 1e-5);
}

#[test]
fn test_tracker_accumulates_across_calls_until_reset() {
    let device = Default::default();
    let layer = half_probability_layer();
    let mut tracker = PonderTracker::new();

    let first = Tensor::<Backend, 3>::zeros([2, 3, 3], &device);
    let (_, state) = layer.forward(first, None, &mut tracker).unwrap();
    let second = Tensor::<Backend, 3>::ones([2, 4, 3], &device);
    layer.forward(second, Some(state), &mut tracker).unwrap();

    assert_eq!(tracker.len(), 7);

    tracker.reset();
    assert!(matches!(
        tracker.compute_ponder_cost(0.01),
        Err(ActError::NoTimestepsRecorded)
    ));
}

#[test]
fn test_summary_serializes() {
    let summary = PonderSummary {
        timesteps: 3,
        mean_remainder: 0.25,
        mean_iterations: 2.0,
    };

    let json = serde_json::to_string(&summary).unwrap();
    let back: PonderSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}

#[test]
fn test_ponder_cost_reaches_halting_parameters() {
    let device = Default::default();
    let cell = ACTCellConfig::new(8, 2)
        .with_max_computation(5)
        .init(RnnCell::<TrainBackend>::new(3, 8, &device), &device)
        .unwrap();
    let layer = ACT::new(cell);
    let mut tracker = PonderTracker::new();

    let input = Tensor::<TrainBackend, 3>::random([2, 4, 3], Distribution::Uniform(-1.0, 1.0), &device);
    let (output, _) = layer.forward(input, None, &mut tracker).unwrap();

    let loss = output.powf_scalar(2.0).mean() + tracker.compute_ponder_cost(0.01).unwrap();
    let grads = loss.backward();

    let halting = layer.cell().halting();
    assert!(halting.output.weight.grad(&grads).is_some());
    assert!(halting.output.bias.as_ref().unwrap().grad(&grads).is_some());
}
