//! # drive_rl: Off-Policy Actor-Critic Driving Agent
//!
//! Training orchestration and environment-synchronization layer for a
//! DDPG-style agent that steers a simulated vehicle from first-person
//! camera frames.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Trainer                                │
//! │  • episode/step loop        • learn + target soft update        │
//! │  • exploration noise        • checkpointing + metrics           │
//! └──────┬──────────────────────────────────────────────┬───────────┘
//!        │ step / reset                                 │ record / sample
//!        ▼                                              ▼
//! ┌──────────────────┐                        ┌──────────────────┐
//! │ EnvironmentBridge│                        │   ReplayBuffer   │
//! │  • phase machine │                        │  • ring storage  │
//! │  • reward rule   │                        │  • uniform sample│
//! │  • tick pairing  │                        └──────────────────┘
//! └──────┬───────────┘
//!        │ command + advance            sensor callbacks (event thread)
//!        ▼                                              │
//! ┌──────────────────┐                        ┌─────────▼────────┐
//! │  SimulatorLink   │ ──── frames/events ──▶ │    SensorHub     │
//! │  (external sim)  │                        │  • latest frame  │
//! └──────────────────┘                        │  • terminal flags│
//!                                             └──────────────────┘
//! ```
//!
//! ## Timing Domains
//!
//! The simulator delivers camera frames, collision events, and lane-invasion
//! events asynchronously; the control loop emits exactly one command per
//! fixed tick. [`SensorHub`] absorbs the asynchronous writes so that the
//! control thread, after its tick wait, observes the freshest sensor values.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drive_rl::{Trainer, TrainerConfig, EnvironmentBridge};
//!
//! let config = TrainerConfig::new("./checkpoints")
//!     .with_total_episodes(2000)
//!     .with_max_steps_per_episode(250)
//!     .with_batch_size(16);
//!
//! let bridge = EnvironmentBridge::new(link, sensors, tick_period);
//! let mut trainer = Trainer::new(config, bridge, policy, value, logger)?;
//! trainer.run()?;
//! ```

pub mod checkpoint;
pub mod core;
pub mod env;
pub mod estimator;
pub mod metrics;
pub mod trainer;

pub use crate::core::ou_noise::{OuNoise, OuNoiseConfig};
pub use crate::core::replay_buffer::{
    BufferError, ReplayBuffer, ReplayBufferConfig, TransitionBatch,
};
pub use crate::core::spec::{ActionSpec, BoundedSpec, ObservationSpec, ACTION_DIM, OBS_LEN};
pub use crate::core::target_sync::{
    hard_copy, soft_update, ParameterSet, ParameterTensor, SyncError,
};
pub use crate::core::transition::Transition;

pub use crate::estimator::Estimator;

pub use crate::env::bridge::{EnvironmentBridge, Phase, StepOutcome};
pub use crate::env::sensors::{LaneMarking, SensorHub, SharedSensorHub};
pub use crate::env::simulator::{DriveCommand, SimulatorError, SimulatorLink, TickClock};

pub use crate::checkpoint::{
    CheckpointBundle, CheckpointConfig, CheckpointError, CheckpointManager, FINAL_TAG,
};

pub use crate::metrics::logger::{
    CSVLogger, ConsoleLogger, EpisodeSnapshot, MetricsLogger, MultiLogger,
};

pub use crate::trainer::{TrainError, Trainer, TrainerConfig};
