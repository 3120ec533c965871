//! Experience replay buffer with circular overwrite.
//!
//! Key characteristics:
//! - Fixed capacity, four parallel flat arrays (state / action / reward /
//!   next_state) indexed by `count % capacity`
//! - FIFO eviction by construction: once full, each record overwrites the
//!   oldest slot
//! - Uniform random sampling with replacement over the usable range
//! - Seeded sampling is reproducible

use crate::core::spec::ACTION_DIM;
use crate::core::transition::Transition;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Configuration for the replay buffer.
#[derive(Debug, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of transitions retained.
    pub capacity: usize,
    /// Flattened observation length per state.
    pub obs_len: usize,
    /// RNG seed for sampling.
    pub seed: u64,
}

impl ReplayBufferConfig {
    /// Create a config for the given capacity and observation length.
    pub fn new(capacity: usize, obs_len: usize) -> Self {
        Self {
            capacity,
            obs_len,
            seed: 0,
        }
    }

    /// Set the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Error type for buffer operations.
#[derive(Debug, PartialEq, Eq)]
pub enum BufferError {
    /// `sample` was called before any transition was recorded.
    Empty,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Empty => write!(f, "cannot sample from an empty replay buffer"),
        }
    }
}

impl std::error::Error for BufferError {}

/// A sampled batch, gathered into parallel flat arrays.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// States, `batch_size * obs_len` floats.
    pub states: Vec<f32>,
    /// Actions, `batch_size * ACTION_DIM` floats.
    pub actions: Vec<f32>,
    /// Rewards, `batch_size` values.
    pub rewards: Vec<f64>,
    /// Next states, `batch_size * obs_len` floats.
    pub next_states: Vec<f32>,
    /// Number of transitions in the batch.
    pub batch_size: usize,
    /// Flattened observation length per state.
    pub obs_len: usize,
}

impl TransitionBatch {
    /// State slice for batch element `i`.
    pub fn state(&self, i: usize) -> &[f32] {
        &self.states[i * self.obs_len..(i + 1) * self.obs_len]
    }

    /// Action slice for batch element `i`.
    pub fn action(&self, i: usize) -> &[f32] {
        &self.actions[i * ACTION_DIM..(i + 1) * ACTION_DIM]
    }

    /// Next-state slice for batch element `i`.
    pub fn next_state(&self, i: usize) -> &[f32] {
        &self.next_states[i * self.obs_len..(i + 1) * self.obs_len]
    }
}

/// Fixed-capacity circular experience store with uniform sampling.
pub struct ReplayBuffer {
    config: ReplayBufferConfig,
    /// Monotonic record counter; the write index is `count % capacity`.
    count: u64,
    states: Vec<f32>,
    actions: Vec<f32>,
    rewards: Vec<f64>,
    next_states: Vec<f32>,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Create a new buffer with pre-allocated storage.
    pub fn new(config: ReplayBufferConfig) -> Self {
        let cap = config.capacity;
        let obs_len = config.obs_len;
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            count: 0,
            states: vec![0.0; cap * obs_len],
            actions: vec![0.0; cap * ACTION_DIM],
            rewards: vec![0.0; cap],
            next_states: vec![0.0; cap * obs_len],
            rng,
        }
    }

    /// Record a transition, overwriting the oldest slot once full.
    pub fn record(&mut self, transition: &Transition) {
        debug_assert_eq!(transition.state.len(), self.config.obs_len);
        debug_assert_eq!(transition.next_state.len(), self.config.obs_len);

        let index = (self.count % self.config.capacity as u64) as usize;
        let obs_len = self.config.obs_len;

        self.states[index * obs_len..(index + 1) * obs_len].copy_from_slice(&transition.state);
        self.actions[index * ACTION_DIM..(index + 1) * ACTION_DIM]
            .copy_from_slice(&transition.action);
        self.rewards[index] = transition.reward;
        self.next_states[index * obs_len..(index + 1) * obs_len]
            .copy_from_slice(&transition.next_state);

        self.count += 1;
    }

    /// Number of transitions available for sampling: `min(count, capacity)`.
    pub fn usable_count(&self) -> usize {
        self.count.min(self.config.capacity as u64) as usize
    }

    /// Total number of `record` calls so far.
    pub fn record_count(&self) -> u64 {
        self.count
    }

    /// Check whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Sample `batch_size` transitions uniformly with replacement.
    ///
    /// Indices are drawn independently from `[0, usable_count())`; entries
    /// beyond the usable range are never returned.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch, BufferError> {
        let range = self.usable_count();
        if range == 0 {
            return Err(BufferError::Empty);
        }

        let obs_len = self.config.obs_len;
        let mut batch = TransitionBatch {
            states: Vec::with_capacity(batch_size * obs_len),
            actions: Vec::with_capacity(batch_size * ACTION_DIM),
            rewards: Vec::with_capacity(batch_size),
            next_states: Vec::with_capacity(batch_size * obs_len),
            batch_size,
            obs_len,
        };

        for _ in 0..batch_size {
            let i = self.rng.gen_range(0..range);
            batch
                .states
                .extend_from_slice(&self.states[i * obs_len..(i + 1) * obs_len]);
            batch
                .actions
                .extend_from_slice(&self.actions[i * ACTION_DIM..(i + 1) * ACTION_DIM]);
            batch.rewards.push(self.rewards[i]);
            batch
                .next_states
                .extend_from_slice(&self.next_states[i * obs_len..(i + 1) * obs_len]);
        }

        Ok(batch)
    }
}
