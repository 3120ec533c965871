use crate::checkpoint::{
    CheckpointBundle, CheckpointConfig, CheckpointError, CheckpointManager, FINAL_TAG,
};
use crate::core::ou_noise::{OuNoise, OuNoiseConfig};
use crate::core::replay_buffer::{BufferError, ReplayBuffer, ReplayBufferConfig};
use crate::core::spec::{ACTION_DIM, OBS_LEN};
use crate::core::target_sync::{soft_update, ParameterSet, SyncError};
use crate::core::transition::Transition;
use crate::env::bridge::EnvironmentBridge;
use crate::env::simulator::{SimulatorError, SimulatorLink};
use crate::estimator::Estimator;
use crate::metrics::logger::{EpisodeSnapshot, MetricsLogger};
use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a training run.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Checkpoint root directory.
    pub checkpoint_dir: PathBuf,
    /// Number of episodes to run.
    pub total_episodes: usize,
    /// Step cap per episode.
    pub max_steps_per_episode: usize,
    /// Transitions per gradient step.
    pub batch_size: usize,
    /// Target soft-update rate.
    pub tau: f32,
    /// Replay buffer capacity.
    pub buffer_capacity: usize,
    /// Exploration noise process parameters.
    pub noise: OuNoiseConfig,
    /// Episodes between interval checkpoints; 0 disables interval saves.
    pub save_interval: usize,
    /// Episodes between autopilot flips; 0 keeps autopilot off.
    pub autopilot_toggle_interval: usize,
    /// Window length for the trailing reward average.
    pub reward_window: usize,
    /// Seed for buffer sampling and noise draws.
    pub seed: u64,
}

impl TrainerConfig {
    /// Create a config with the standard run parameters.
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            total_episodes: 2000,
            max_steps_per_episode: 250,
            batch_size: 16,
            tau: 0.005,
            buffer_capacity: 6000,
            noise: OuNoiseConfig::default(),
            save_interval: 500,
            autopilot_toggle_interval: 2,
            reward_window: 40,
            seed: 0,
        }
    }

    /// Set the episode count.
    pub fn with_total_episodes(mut self, total_episodes: usize) -> Self {
        self.total_episodes = total_episodes;
        self
    }

    /// Set the per-episode step cap.
    pub fn with_max_steps_per_episode(mut self, max_steps: usize) -> Self {
        self.max_steps_per_episode = max_steps;
        self
    }

    /// Set the gradient batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the target soft-update rate.
    pub fn with_tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    /// Set the replay buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the exploration noise parameters.
    pub fn with_noise(mut self, noise: OuNoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    /// Set the interval-checkpoint cadence.
    pub fn with_save_interval(mut self, save_interval: usize) -> Self {
        self.save_interval = save_interval;
        self
    }

    /// Set the autopilot flip cadence.
    pub fn with_autopilot_toggle_interval(mut self, interval: usize) -> Self {
        self.autopilot_toggle_interval = interval;
        self
    }

    /// Set the trailing reward window length.
    pub fn with_reward_window(mut self, window: usize) -> Self {
        self.reward_window = window;
        self
    }

    /// Set the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Error type covering every failure mode of a training run.
#[derive(Debug)]
pub enum TrainError {
    /// Replay buffer failure.
    Buffer(BufferError),
    /// Target synchronization failure.
    Sync(SyncError),
    /// Simulator transport failure.
    Simulator(SimulatorError),
    /// Checkpoint persistence failure.
    Checkpoint(CheckpointError),
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::Buffer(e) => write!(f, "replay buffer error: {}", e),
            TrainError::Sync(e) => write!(f, "target sync error: {}", e),
            TrainError::Simulator(e) => write!(f, "simulator error: {}", e),
            TrainError::Checkpoint(e) => write!(f, "checkpoint error: {}", e),
        }
    }
}

impl std::error::Error for TrainError {}

impl From<BufferError> for TrainError {
    fn from(e: BufferError) -> Self {
        TrainError::Buffer(e)
    }
}

impl From<SyncError> for TrainError {
    fn from(e: SyncError) -> Self {
        TrainError::Sync(e)
    }
}

impl From<SimulatorError> for TrainError {
    fn from(e: SimulatorError) -> Self {
        TrainError::Simulator(e)
    }
}

impl From<CheckpointError> for TrainError {
    fn from(e: CheckpointError) -> Self {
        TrainError::Checkpoint(e)
    }
}

/// Orchestrates the full training run.
///
/// Owns the environment bridge, both estimators, their target parameter
/// sets, the exploration noise, the replay buffer, the checkpoint manager,
/// and the metrics logger.
pub struct Trainer<L: SimulatorLink, P: Estimator, V: Estimator> {
    config: TrainerConfig,
    bridge: EnvironmentBridge<L>,
    policy: P,
    value: V,
    target_policy: ParameterSet,
    target_value: ParameterSet,
    noise: OuNoise,
    buffer: ReplayBuffer,
    checkpoints: CheckpointManager,
    logger: Box<dyn MetricsLogger>,
    recent_rewards: VecDeque<f64>,
    autopilot: bool,
    policy_loss: f64,
    value_loss: f64,
    shutdown: Option<Receiver<()>>,
}

impl<L: SimulatorLink, P: Estimator, V: Estimator> Trainer<L, P, V> {
    /// Create a trainer, resuming from the `final` checkpoint when present.
    ///
    /// On resume the live networks are restored from disk. Either way the
    /// targets start as exact copies of the live networks so the first
    /// bootstrap targets are consistent.
    pub fn new(
        config: TrainerConfig,
        bridge: EnvironmentBridge<L>,
        mut policy: P,
        mut value: V,
        logger: Box<dyn MetricsLogger>,
    ) -> Result<Self, TrainError> {
        let checkpoints =
            CheckpointManager::new(CheckpointConfig::new(config.checkpoint_dir.clone()))?;

        if let Some(bundle) = checkpoints.load_if_present(FINAL_TAG)? {
            policy.set_parameters(&bundle.policy);
            value.set_parameters(&bundle.value);
        }
        let target_policy = policy.parameters();
        let target_value = value.parameters();

        let buffer = ReplayBuffer::new(
            ReplayBufferConfig::new(config.buffer_capacity, OBS_LEN).with_seed(config.seed),
        );
        let noise = OuNoise::new(config.noise.clone(), config.seed.wrapping_add(1));
        let window = config.reward_window;

        Ok(Self {
            config,
            bridge,
            policy,
            value,
            target_policy,
            target_value,
            noise,
            buffer,
            checkpoints,
            logger,
            recent_rewards: VecDeque::with_capacity(window),
            // The learned policy drives first; the toggle cadence switches
            // to the external driver later.
            autopilot: false,
            policy_loss: 0.0,
            value_loss: 0.0,
            shutdown: None,
        })
    }

    /// Attach a channel whose messages stop the run at the next episode
    /// boundary.
    pub fn with_shutdown(mut self, shutdown: Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Target policy parameters.
    pub fn target_policy(&self) -> &ParameterSet {
        &self.target_policy
    }

    /// Target value parameters.
    pub fn target_value(&self) -> &ParameterSet {
        &self.target_value
    }

    /// Whether the next episode runs under autopilot.
    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Number of transitions recorded so far.
    pub fn experience_count(&self) -> u64 {
        self.buffer.record_count()
    }

    /// Trailing average of episodic reward over the configured window.
    pub fn trailing_avg_reward(&self) -> f64 {
        if self.recent_rewards.is_empty() {
            return 0.0;
        }
        self.recent_rewards.iter().sum::<f64>() / self.recent_rewards.len() as f64
    }

    /// Run the configured number of episodes, then save the `final`
    /// checkpoint and shut the bridge down.
    pub fn run(&mut self) -> Result<(), TrainError> {
        for episode in 1..=self.config.total_episodes {
            if self.stop_requested() {
                break;
            }

            let episode_reward = self.run_episode()?;

            self.recent_rewards.push_back(episode_reward);
            if self.recent_rewards.len() > self.config.reward_window {
                self.recent_rewards.pop_front();
            }

            self.logger.log(&EpisodeSnapshot {
                episode,
                avg_reward: self.trailing_avg_reward(),
                episode_reward,
                autopilot: self.autopilot,
                policy_loss: self.policy_loss,
                value_loss: self.value_loss,
            });

            if self.config.save_interval != 0 && episode % self.config.save_interval == 0 {
                self.checkpoints
                    .save(&CheckpointManager::episode_tag(episode), &self.bundle())?;
            }

            if self.config.autopilot_toggle_interval != 0
                && episode % self.config.autopilot_toggle_interval == 0
            {
                self.autopilot = !self.autopilot;
            }
        }

        self.checkpoints.save(FINAL_TAG, &self.bundle())?;
        self.logger.flush();
        self.bridge.shutdown()?;
        Ok(())
    }

    /// Run one episode and return its accumulated reward.
    fn run_episode(&mut self) -> Result<f64, TrainError> {
        self.noise.reset();
        let mut observation = self.bridge.reset()?;

        for _ in 0..self.config.max_steps_per_episode {
            let action = self.select_action(&observation);
            let outcome = self.bridge.step(action, self.autopilot)?;
            if outcome.restarted {
                observation = outcome.observation;
                continue;
            }

            // The executed command is what the simulator actually received,
            // after clipping and any autopilot override.
            self.buffer.record(&Transition::new(
                observation,
                outcome.executed_action,
                outcome.reward,
                outcome.observation.clone(),
                outcome.done,
            ));

            self.learn_step()?;

            observation = outcome.observation;
            if outcome.done {
                break;
            }
        }

        Ok(self.bridge.cumulative_reward())
    }

    /// Policy action perturbed by the noise process.
    ///
    /// The bridge clips before dispatch, so the noisy action may sit
    /// slightly outside the actuator bounds here.
    fn select_action(&mut self, observation: &[f32]) -> [f32; ACTION_DIM] {
        let raw = self.policy.act(observation);
        debug_assert_eq!(raw.len(), ACTION_DIM);
        let noise = self.noise.sample();

        let mut action = [0.0; ACTION_DIM];
        for i in 0..ACTION_DIM {
            action[i] = (raw[i] as f64 + noise[i]) as f32;
        }
        action
    }

    /// One gradient step on each estimator, then blend both targets.
    ///
    /// The value net trains first so the policy step sees its update, as in
    /// standard actor-critic ordering. Target blends happen strictly after
    /// both train steps.
    fn learn_step(&mut self) -> Result<(), TrainError> {
        let batch = self.buffer.sample(self.config.batch_size)?;

        let (_, value_loss) = self.value.train_step(&batch);
        let (policy_loss, _) = self.policy.train_step(&batch);
        self.value_loss = value_loss;
        self.policy_loss = policy_loss;

        soft_update(
            &mut self.target_policy,
            &self.policy.parameters(),
            self.config.tau,
        )?;
        soft_update(
            &mut self.target_value,
            &self.value.parameters(),
            self.config.tau,
        )?;
        Ok(())
    }

    fn bundle(&self) -> CheckpointBundle {
        CheckpointBundle {
            policy: self.policy.parameters(),
            value: self.value.parameters(),
            target_policy: self.target_policy.clone(),
            target_value: self.target_value.clone(),
        }
    }

    fn stop_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| rx.try_recv().is_ok())
            .unwrap_or(false)
    }
}
