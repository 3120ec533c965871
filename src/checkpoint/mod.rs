//! Parameter-set checkpointing.
//!
//! Persists the four network parameter sets (policy, value, target policy,
//! target value) under named tags and restores them on resume.
//!
//! ## Example
//!
//! ```rust,ignore
//! use drive_rl::checkpoint::{CheckpointManager, CheckpointConfig, FINAL_TAG};
//!
//! let manager = CheckpointManager::new(CheckpointConfig::new("./checkpoints"))?;
//!
//! // In the training loop:
//! manager.save(&CheckpointManager::episode_tag(ep), &bundle)?;
//!
//! // On startup:
//! if let Some(bundle) = manager.load_if_present(FINAL_TAG)? {
//!     policy.set_parameters(&bundle.policy);
//! }
//! ```

pub mod checkpointer;

pub use checkpointer::{
    CheckpointBundle,
    CheckpointConfig,
    CheckpointError,
    CheckpointManager,
    FINAL_TAG,
};
