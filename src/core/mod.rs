//! Core components: transitions, specs, noise, replay, target sync.

pub mod ou_noise;
pub mod replay_buffer;
pub mod spec;
pub mod target_sync;
pub mod transition;

pub use ou_noise::{OuNoise, OuNoiseConfig};
pub use replay_buffer::{BufferError, ReplayBuffer, ReplayBufferConfig, TransitionBatch};
pub use spec::{ActionSpec, BoundedSpec, ObservationSpec, ACTION_DIM, OBS_LEN};
pub use target_sync::{hard_copy, soft_update, ParameterSet, ParameterTensor, SyncError};
pub use transition::Transition;
