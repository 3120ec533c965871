//! Training orchestration.
//!
//! The [`Trainer`] owns the full loop: episode resets, per-tick action
//! selection with exploration noise, experience recording, gradient steps
//! on both estimators, target soft updates, periodic checkpoints, and
//! per-episode metrics.
//!
//! ## Loop shape
//!
//! ```text
//! for episode in 1..=total_episodes:
//!     reset bridge + noise
//!     for tick in 0..max_steps:
//!         action  = policy.act(obs) + noise
//!         outcome = bridge.step(action, autopilot)
//!         buffer.record(obs, executed, reward, next_obs)
//!         value.train_step(batch); policy.train_step(batch)
//!         soft_update targets
//!         break on terminal
//!     log snapshot, checkpoint on interval, toggle autopilot
//! save "final" checkpoint, shut the bridge down
//! ```

mod trainer;


pub use trainer::{TrainError, Trainer, TrainerConfig};
