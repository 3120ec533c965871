//! Function-approximator capability injected into the trainer.
//!
//! The core never computes gradients or inspects network internals; it only
//! drives the estimators through this trait and copies/blends/persists their
//! parameter sets. Concrete implementations wrap whatever numeric-autodiff
//! mechanism the caller chooses.

use crate::core::replay_buffer::TransitionBatch;
use crate::core::target_sync::ParameterSet;

/// A trainable function approximator (policy or value network).
pub trait Estimator {
    /// Map an observation to an action vector in the estimator's native
    /// output range.
    fn act(&self, state: &[f32]) -> Vec<f32>;

    /// Estimate the value of taking `action` in `state`.
    fn evaluate(&self, state: &[f32], action: &[f32]) -> f32;

    /// Run one gradient step on a sampled batch.
    ///
    /// Returns `(policy_loss, value_loss)`; an estimator that only computes
    /// one of the two reports the other as its last known value. The call is
    /// atomic from the trainer's perspective: no parameter reads or target
    /// blends happen while it is in flight.
    fn train_step(&mut self, batch: &TransitionBatch) -> (f64, f64);

    /// Snapshot the current parameters as an ordered named-tensor set.
    fn parameters(&self) -> ParameterSet;

    /// Replace the current parameters with `params`.
    ///
    /// The set must be shape-compatible with [`Estimator::parameters`] in
    /// iteration order.
    fn set_parameters(&mut self, params: &ParameterSet);
}
