//! Transition type for off-policy experience.
//!
//! One `(state, action, reward, next_state, done)` tuple of experience.
//! Transitions are immutable once recorded into the replay buffer.

use crate::core::spec::ACTION_DIM;

/// One step of experience.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Observation before the action (flattened 84x84x3, values in [0, 1]).
    pub state: Vec<f32>,
    /// Action actually executed (speed, steering angle).
    pub action: [f32; ACTION_DIM],
    /// Reward received.
    pub reward: f64,
    /// Observation after the action.
    pub next_state: Vec<f32>,
    /// Episode ended at this step (collision or solid-lane crossing).
    pub done: bool,
}

impl Transition {
    /// Create a new transition.
    pub fn new(
        state: Vec<f32>,
        action: [f32; ACTION_DIM],
        reward: f64,
        next_state: Vec<f32>,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_new() {
        let t = Transition::new(vec![0.1, 0.2], [1.0, -0.5], 0.001, vec![0.3, 0.4], false);
        assert_eq!(t.action, [1.0, -0.5]);
        assert!((t.reward - 0.001).abs() < 1e-12);
        assert!(!t.done);
    }
}
